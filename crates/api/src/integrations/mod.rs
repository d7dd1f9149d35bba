//! Thin clients for optional external collaborators.
//!
//! - [`geocoding::GeocodingClient`] -- address lookup (Nominatim-compatible).
//! - [`copywriter::CopywriterClient`] -- listing description generation.
//! - [`storage::ImageStore`] -- on-disk image storage for uploads.

pub mod copywriter;
pub mod geocoding;
pub mod storage;
