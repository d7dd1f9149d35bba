//! Draft bookkeeping: validating persisted snapshots and summarizing them.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::listing::ListingKind;
use crate::locale::Locale;
use crate::types::DraftId;
use crate::wizard::form::check_storable;
use crate::wizard::{steps, WizardState};

/// Longest title shown in draft summaries.
pub const SUMMARY_TITLE_MAX_CHARS: usize = 80;

/// Check that a snapshot can be persisted for `kind`.
///
/// Returns the step as `u8` on success.
pub fn validate_snapshot(
    kind: ListingKind,
    form_data: &Value,
    step: i32,
    locale: Locale,
) -> Result<u8, CoreError> {
    let Value::Object(fields) = form_data else {
        return Err(CoreError::Validation(
            "Draft form_data must be a JSON object".to_string(),
        ));
    };
    check_storable(fields, locale)?;
    let step = u8::try_from(step).map_err(|_| {
        CoreError::Validation(format!("Step {step} is out of range for a draft"))
    })?;
    steps::validate_step_number(kind, step)?;
    Ok(step)
}

/// Rebuild a wizard from a stored draft row.
///
/// A row that no longer fits its kind (bad JSON shape, step out of range) is
/// reported as malformed rather than silently repaired.
pub fn restore_wizard(
    id: DraftId,
    kind: &str,
    form_data: Value,
    step: i32,
) -> Result<WizardState, CoreError> {
    let malformed = |reason: String| CoreError::Validation(format!("Draft {id} is malformed: {reason}"));

    let kind = ListingKind::from_str_db(kind).map_err(|e| malformed(e.to_string()))?;
    let step = u8::try_from(step).map_err(|_| malformed(format!("step {step} is out of range")))?;
    WizardState::restore(kind, form_data, step).map_err(|e| malformed(e.to_string()))
}

/// Title shown for a draft in lists, truncated on a char boundary.
///
/// `raw` is the draft's `title` field as stored.
pub fn summary_title(raw: Option<&str>) -> Option<String> {
    let title = raw?.trim();
    if title.is_empty() {
        return None;
    }
    if title.chars().count() <= SUMMARY_TITLE_MAX_CHARS {
        return Some(title.to_string());
    }
    let mut truncated: String = title.chars().take(SUMMARY_TITLE_MAX_CHARS - 1).collect();
    truncated.push('…');
    Some(truncated)
}

/// How far through its wizard a draft is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DraftProgress {
    pub current_step: u8,
    pub total_steps: u8,
    /// Share of steps before the current one, 0..=100.
    pub percent: u8,
}

pub fn progress(kind: ListingKind, current_step: u8) -> DraftProgress {
    let total_steps = steps::total_steps(kind);
    let current_step = current_step.clamp(steps::MIN_STEP, total_steps);
    let done = u32::from(current_step - 1);
    DraftProgress {
        current_step,
        total_steps,
        percent: (done * 100 / u32::from(total_steps)) as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn snapshot_validation() {
        let check = |kind, data: Value, step| validate_snapshot(kind, &data, step, Locale::En);
        assert_eq!(check(ListingKind::Property, json!({ "title": "x" }), 2).unwrap(), 2);
        assert!(check(ListingKind::Property, json!([]), 1).is_err());
        assert!(check(ListingKind::Post, json!({}), 4).is_err());
        assert!(check(ListingKind::Post, json!({}), -1).is_err());
        assert!(check(ListingKind::Post, json!({}), 300).is_err());
    }

    #[test]
    fn snapshot_with_nul_is_a_field_error() {
        let data = json!({ "title": "Casa\0playa" });
        assert_matches!(
            validate_snapshot(ListingKind::Property, &data, 1, Locale::En),
            Err(CoreError::InvalidFields(e)) if e.contains("title")
        );
    }

    #[test]
    fn restore_reports_malformed_rows() {
        let id = DraftId::nil();
        let wizard = restore_wizard(id, "land", json!({ "title": "Lote" }), 2).unwrap();
        assert_eq!(wizard.kind, ListingKind::Land);
        assert_eq!(wizard.current_step, 2);

        assert_matches!(
            restore_wizard(id, "castle", json!({}), 1),
            Err(CoreError::Validation(msg)) if msg.contains("malformed")
        );
        assert_matches!(
            restore_wizard(id, "post", json!("text"), 1),
            Err(CoreError::Validation(msg)) if msg.contains("malformed")
        );
    }

    #[test]
    fn summary_title_trims_and_truncates() {
        assert_eq!(summary_title(Some("  Casa  ")).as_deref(), Some("Casa"));
        assert_eq!(summary_title(Some("   ")), None);
        assert_eq!(summary_title(None), None);

        let long = "ñ".repeat(100);
        let title = summary_title(Some(&long)).unwrap();
        assert_eq!(title.chars().count(), SUMMARY_TITLE_MAX_CHARS);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(
            progress(ListingKind::Property, 1),
            DraftProgress { current_step: 1, total_steps: 5, percent: 0 }
        );
        assert_eq!(progress(ListingKind::Property, 5).percent, 80);
        assert_eq!(progress(ListingKind::Post, 9).current_step, 3);
    }
}
