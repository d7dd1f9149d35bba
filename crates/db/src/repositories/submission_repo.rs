//! Persisting a validated wizard payload as a listing.

use estate_core::listing::{ListingKind, ListingStatus};
use estate_core::types::{DbId, DraftId};
use estate_core::wizard::submission::ListingPayload;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use super::{DraftRepo, LandRepo, PostRepo, PropertyRepo};
use crate::models::land::Land;
use crate::models::post::Post;
use crate::models::property::Property;

/// Status given to properties and lands created through the wizard.
pub const SUBMITTED_STATUS: ListingStatus = ListingStatus::Published;

/// The row created by a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreatedListing {
    Property(Property),
    Land(Land),
    Post(Post),
}

impl CreatedListing {
    pub fn id(&self) -> DbId {
        match self {
            Self::Property(p) => p.id,
            Self::Land(l) => l.id,
            Self::Post(p) => p.id,
        }
    }

    pub fn kind(&self) -> ListingKind {
        match self {
            Self::Property(_) => ListingKind::Property,
            Self::Land(_) => ListingKind::Land,
            Self::Post(_) => ListingKind::Post,
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Self::Property(p) => &p.slug,
            Self::Land(l) => &l.slug,
            Self::Post(p) => &p.slug,
        }
    }
}

pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Create the listing and delete its draft in one transaction.
    ///
    /// Returns `None` (and writes nothing) if the draft is gone.
    pub async fn submit_draft(
        pool: &PgPool,
        draft_id: DraftId,
        owner_id: DbId,
        payload: &ListingPayload,
    ) -> Result<Option<CreatedListing>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !DraftRepo::delete_with(&mut tx, draft_id, owner_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }
        let created = Self::insert(&mut tx, payload, owner_id).await?;

        tx.commit().await?;
        Ok(Some(created))
    }

    async fn insert(
        conn: &mut PgConnection,
        payload: &ListingPayload,
        owner_id: DbId,
    ) -> Result<CreatedListing, sqlx::Error> {
        let status = SUBMITTED_STATUS.as_str();
        Ok(match payload {
            ListingPayload::Property(p) => {
                CreatedListing::Property(PropertyRepo::create_with(conn, p, status, owner_id).await?)
            }
            ListingPayload::Land(l) => {
                CreatedListing::Land(LandRepo::create_with(conn, l, status, owner_id).await?)
            }
            ListingPayload::Post(p) => {
                CreatedListing::Post(PostRepo::create_with(conn, p, owner_id).await?)
            }
        })
    }
}
