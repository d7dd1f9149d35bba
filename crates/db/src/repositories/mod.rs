//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Inserts that must join a
//! caller's transaction also expose a `&mut PgConnection` variant.

pub mod draft_repo;
pub mod land_repo;
pub mod post_repo;
pub mod property_repo;
mod slug;
pub mod submission_repo;
pub mod user_repo;

pub use draft_repo::DraftRepo;
pub use land_repo::LandRepo;
pub use post_repo::PostRepo;
pub use property_repo::PropertyRepo;
pub use submission_repo::{CreatedListing, SubmissionRepo};
pub use user_repo::UserRepo;
