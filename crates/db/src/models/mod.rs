//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Create / update DTOs where the entity is written through the API

pub mod draft;
pub mod land;
pub mod post;
pub mod property;
pub mod user;
