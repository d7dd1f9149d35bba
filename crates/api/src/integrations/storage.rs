//! Local-disk storage for uploaded images.

use std::path::PathBuf;

use estate_core::upload::{public_url, stored_name, ImageFormat};

use crate::config::UploadConfig;

/// URL prefix the upload directory is served under.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// A file written by [`ImageStore::save`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredImage {
    pub name: String,
    pub url: String,
    pub content_type: &'static str,
    pub size_bytes: u64,
}

pub struct ImageStore {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: u64,
}

impl ImageStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            public_base_url: config.public_base_url.clone(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Write already-validated bytes under a generated name.
    pub async fn save(&self, format: ImageFormat, bytes: &[u8]) -> std::io::Result<StoredImage> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = stored_name(format);
        tokio::fs::write(self.dir.join(&name), bytes).await?;

        Ok(StoredImage {
            url: public_url(&self.public_base_url, UPLOADS_PREFIX, &name),
            name,
            content_type: format.mime(),
            size_bytes: bytes.len() as u64,
        })
    }

    /// Write a batch. If any write fails, the files already written are removed.
    pub async fn save_all<B: AsRef<[u8]>>(
        &self,
        files: &[(ImageFormat, B)],
    ) -> std::io::Result<Vec<StoredImage>> {
        let mut stored = Vec::with_capacity(files.len());
        for (format, bytes) in files {
            match self.save(*format, bytes.as_ref()).await {
                Ok(image) => stored.push(image),
                Err(e) => {
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Remove saved files, logging any that cannot be deleted.
    pub async fn discard(&self, images: &[StoredImage]) {
        for image in images {
            if let Err(e) = tokio::fs::remove_file(self.dir.join(&image.name)).await {
                tracing::warn!(name = %image.name, error = %e, "Failed to remove stored upload");
            }
        }
    }
}
