use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Not-found for entities keyed by something other than a [`DbId`]
    /// (draft UUIDs, post slugs).
    #[error("Entity not found: {entity} '{key}'")]
    NotFoundByKey { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Field-keyed validation failures, surfaced to the client as-is.
    #[error("Validation failed: {0}")]
    InvalidFields(FieldErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Field name -> list of human-readable messages.
///
/// Ordered by field name so responses and test assertions are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Append every message from `other`, keeping existing ones.
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Convert into a `Result`, `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{field}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_groups_messages_by_field() {
        let mut errors = FieldErrors::new();
        errors.add("price", "required");
        errors.add("price", "must be positive");
        errors.add("title", "too short");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("price").unwrap().len(), 2);
        assert_eq!(errors.to_string(), "price: required, must be positive; title: too short");
    }

    #[test]
    fn empty_errors_convert_to_ok() {
        assert!(FieldErrors::new().into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.add("city", "required");
        assert!(matches!(
            errors.into_result(),
            Err(CoreError::InvalidFields(e)) if e.contains("city")
        ));
    }

    #[test]
    fn merge_keeps_both_sides() {
        let mut a = FieldErrors::new();
        a.add("title", "x");
        let mut b = FieldErrors::new();
        b.add("title", "y");
        b.add("images", "z");
        a.merge(b);
        assert_eq!(a.get("title").unwrap(), ["x".to_string(), "y".to_string()]);
        assert!(a.contains("images"));
    }
}
