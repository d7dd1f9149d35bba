//! Request extractors for authentication, authorization and locale.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAgent`] -- Requires `agent` or `admin` role.
//! - [`locale::RequestLocale`] -- Language for user-facing messages.

pub mod auth;
pub mod locale;
pub mod rbac;
