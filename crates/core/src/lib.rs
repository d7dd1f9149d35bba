//! Domain logic for the real-estate listing backend.
//!
//! Pure, I/O-free building blocks shared by the database and API crates:
//! the listing wizard and its validators, draft bookkeeping, and the rules
//! for the optional geocoding, copywriting and upload collaborators.

pub mod accounts;
pub mod copywriting;
pub mod draft;
pub mod error;
pub mod geocoding;
pub mod listing;
pub mod locale;
pub mod pagination;
pub mod roles;
pub mod types;
pub mod upload;
pub mod wizard;
