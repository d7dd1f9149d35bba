use std::sync::Arc;

use crate::config::ServerConfig;
use crate::integrations::copywriter::CopywriterClient;
use crate::integrations::geocoding::GeocodingClient;
use crate::integrations::storage::ImageStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: estate_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    pub geocoder: Arc<GeocodingClient>,
    pub copywriter: Arc<CopywriterClient>,
    pub images: Arc<ImageStore>,
}

impl AppState {
    /// Build the state and its collaborator clients from configuration.
    pub fn new(pool: estate_db::DbPool, config: ServerConfig) -> Self {
        Self {
            pool,
            geocoder: Arc::new(GeocodingClient::new(config.geocoder_url.clone())),
            copywriter: Arc::new(CopywriterClient::new(config.copywriter.clone())),
            images: Arc::new(ImageStore::new(&config.uploads)),
            config: Arc::new(config),
        }
    }
}
