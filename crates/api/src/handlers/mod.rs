pub mod admin;
pub mod auth;
pub mod drafts;
pub mod editing;
pub mod geocode;
pub mod lands;
pub mod posts;
pub mod properties;
pub mod uploads;
pub mod users;
