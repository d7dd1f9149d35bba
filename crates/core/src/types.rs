/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Drafts are keyed by a generated UUID rather than a sequence value.
pub type DraftId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
