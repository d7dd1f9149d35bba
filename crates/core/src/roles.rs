//! Well-known role name constants.
//!
//! These must match the `ck_users_role` constraint in `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_AGENT: &str = "agent";
pub const ROLE_VIEWER: &str = "viewer";

/// Roles allowed to manage listings and blog posts from the dashboard.
pub fn can_manage_listings(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_AGENT
}

/// Validate a role name against the known set.
pub fn is_known_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_AGENT | ROLE_VIEWER)
}
