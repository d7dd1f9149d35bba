//! Multi-step listing wizard state.
//!
//! A [`WizardState`] holds the in-progress form for one listing kind. It is
//! plain data: every transition is a synchronous method, and persistence is
//! the caller's job (see the draft repository in `estate-db`).

pub mod form;
pub mod steps;
pub mod submission;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, FieldErrors};
use crate::listing::ListingKind;
use crate::locale::Locale;

pub use form::FormData;
pub use steps::MIN_STEP;

/// In-progress state of a listing wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub kind: ListingKind,
    /// 1-based pointer into the wizard's steps.
    pub current_step: u8,
    pub form_data: FormData,
    /// Last validation outcome per step number. Missing means "not checked
    /// since the step's fields last changed".
    pub is_valid: BTreeMap<u8, bool>,
    pub is_dirty: bool,
    pub is_loading: bool,
    /// Errors from the most recent validation, keyed by field name.
    pub errors: FieldErrors,
}

impl WizardState {
    /// Fresh wizard on step 1 with an empty form.
    pub fn new(kind: ListingKind) -> Self {
        Self {
            kind,
            current_step: MIN_STEP,
            form_data: FormData::new(),
            is_valid: BTreeMap::new(),
            is_dirty: false,
            is_loading: false,
            errors: FieldErrors::new(),
        }
    }

    /// Rebuild a wizard from a saved draft.
    ///
    /// The draft must hold a JSON object and a step that exists for `kind`.
    pub fn restore(kind: ListingKind, form_data: Value, step: u8) -> Result<Self, CoreError> {
        let form_data = into_form_data(form_data)?;
        steps::validate_step_number(kind, step)?;
        Ok(Self {
            current_step: step,
            form_data,
            ..Self::new(kind)
        })
    }

    pub fn total_steps(&self) -> u8 {
        steps::total_steps(self.kind)
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == MIN_STEP
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step == self.total_steps()
    }

    /// Merge a partial update into the form.
    ///
    /// Marks the wizard dirty and clears errors; nothing is validated.
    /// Validity of steps owning a changed field is forgotten.
    pub fn update_form_data(&mut self, partial: Value) -> Result<(), CoreError> {
        let partial = into_form_data(partial)?;
        let changed = form::merge_form_data(&mut self.form_data, partial);

        let all_steps = steps::steps_for(self.kind);
        for (idx, def) in all_steps.iter().enumerate() {
            let touched = def.review || changed.iter().any(|key| def.owns(key));
            if touched && !changed.is_empty() {
                self.is_valid.remove(&(idx as u8 + 1));
            }
        }

        self.is_dirty = true;
        self.errors.clear();
        Ok(())
    }

    /// Move the step pointer without validating.
    pub fn set_current_step(&mut self, step: u8) -> Result<(), CoreError> {
        steps::validate_step_number(self.kind, step)?;
        self.current_step = step;
        self.errors.clear();
        Ok(())
    }

    /// Validate the current step, recording validity and errors.
    pub fn validate_current_step(&mut self, locale: Locale) -> bool {
        self.validate_step(self.current_step, locale)
    }

    fn validate_step(&mut self, step: u8, locale: Locale) -> bool {
        // The pointer is kept in range by every mutator.
        let errors = steps::validate_step(self.kind, step, &self.form_data, locale)
            .unwrap_or_else(|e| {
                let mut errors = FieldErrors::new();
                errors.add(form::FORM_FIELD, e.to_string());
                errors
            });
        let valid = errors.is_empty();
        self.is_valid.insert(step, valid);
        self.errors = errors;
        valid
    }

    /// Validate every step. `errors` ends up holding the union of failures.
    pub fn validate_all(&mut self, locale: Locale) -> bool {
        let mut merged = FieldErrors::new();
        for step in MIN_STEP..=self.total_steps() {
            if !self.validate_step(step, locale) {
                merged.merge(std::mem::take(&mut self.errors));
            }
        }
        // Review steps repeat earlier fields; collapse duplicates.
        let mut deduped = FieldErrors::new();
        for field in merged.fields() {
            let mut seen: Vec<&String> = Vec::new();
            for message in merged.get(field).unwrap_or_default() {
                if !seen.contains(&message) {
                    seen.push(message);
                    deduped.add(field, message.clone());
                }
            }
        }
        self.errors = deduped;
        self.errors.is_empty()
    }

    /// Advance one step if the current step validates.
    ///
    /// Returns `Ok(false)` and leaves the pointer in place when validation
    /// fails.
    pub fn next_step(&mut self, locale: Locale) -> Result<bool, CoreError> {
        if self.is_last_step() {
            return Err(CoreError::Validation(
                "Already on the last step; submit the wizard instead".to_string(),
            ));
        }
        if !self.validate_current_step(locale) {
            return Ok(false);
        }
        self.set_current_step(self.current_step + 1)?;
        Ok(true)
    }

    /// Go back one step. Never validates.
    pub fn previous_step(&mut self) -> Result<(), CoreError> {
        if self.is_first_step() {
            return Err(CoreError::Validation(
                "Already on the first step; cannot go back".to_string(),
            ));
        }
        self.set_current_step(self.current_step - 1)
    }

    /// Whether every step has been validated and passed.
    pub fn is_complete(&self) -> bool {
        (MIN_STEP..=self.total_steps()).all(|s| self.is_valid.get(&s) == Some(&true))
    }

    /// Back to the initial state, keeping the listing kind.
    pub fn reset_wizard(&mut self) {
        *self = Self::new(self.kind);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    /// Record that the form now matches what is persisted.
    pub fn mark_saved(&mut self) {
        self.is_dirty = false;
    }

    /// Title-like field used to label drafts in listings.
    pub fn title(&self) -> Option<&str> {
        self.form_data
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Accept only JSON objects as form data.
pub fn into_form_data(value: Value) -> Result<FormData, CoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::Validation(format!(
            "Form data must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn property_wizard() -> WizardState {
        WizardState::new(ListingKind::Property)
    }

    #[test]
    fn update_sets_dirty_and_clears_errors() {
        let mut wizard = property_wizard();
        assert!(!wizard.validate_current_step(Locale::En));
        assert!(!wizard.errors.is_empty());

        wizard
            .update_form_data(json!({ "title": "Casa en la playa" }))
            .unwrap();

        assert!(wizard.is_dirty);
        assert!(wizard.errors.is_empty());
        assert_eq!(wizard.form_data["title"], "Casa en la playa");
    }

    #[test]
    fn missing_price_fails_step_one() {
        let mut wizard = property_wizard();
        wizard
            .update_form_data(json!({ "title": "Casa en la playa" }))
            .unwrap();
        assert!(wizard.is_dirty);

        assert!(!wizard.validate_current_step(Locale::Es));
        assert!(!wizard.errors.get("price").unwrap().is_empty());
        assert_eq!(wizard.is_valid.get(&1), Some(&false));
    }

    #[test]
    fn complete_step_validates_with_empty_errors() {
        let mut wizard = property_wizard();
        wizard
            .update_form_data(json!({
                "title": "Casa en la playa",
                "price": 180000,
                "operation": "sale",
                "property_type": "house",
            }))
            .unwrap();
        assert!(wizard.validate_current_step(Locale::En));
        assert!(wizard.errors.is_empty());
        assert_eq!(wizard.is_valid.get(&1), Some(&true));
    }

    #[test]
    fn update_rejects_non_objects() {
        let mut wizard = property_wizard();
        assert_matches!(
            wizard.update_form_data(json!(["title"])),
            Err(CoreError::Validation(_))
        );
        assert!(!wizard.is_dirty);
    }

    #[test]
    fn update_forgets_validity_of_touched_steps() {
        let mut wizard = property_wizard();
        wizard
            .update_form_data(json!({ "address": "Calle 1", "city": "Lima" }))
            .unwrap();
        wizard.set_current_step(2).unwrap();
        assert!(wizard.validate_current_step(Locale::En));
        wizard.set_current_step(3).unwrap();
        assert!(wizard.validate_current_step(Locale::En));

        wizard.update_form_data(json!({ "city": "Cusco" })).unwrap();
        assert_eq!(wizard.is_valid.get(&2), None);
        assert_eq!(wizard.is_valid.get(&3), Some(&true));
    }

    #[test]
    fn set_step_moves_without_validating() {
        let mut wizard = property_wizard();
        wizard.validate_current_step(Locale::En);
        wizard.set_current_step(4).unwrap();
        assert_eq!(wizard.current_step, 4);
        assert!(wizard.errors.is_empty());
        assert_eq!(wizard.is_valid.get(&4), None);
        assert!(wizard.set_current_step(6).is_err());
        assert!(wizard.set_current_step(0).is_err());
        assert_eq!(wizard.current_step, 4);
    }

    #[test]
    fn next_step_requires_valid_current_step() {
        let mut wizard = WizardState::new(ListingKind::Post);
        assert!(!wizard.next_step(Locale::En).unwrap());
        assert_eq!(wizard.current_step, 1);

        wizard
            .update_form_data(json!({ "title": "Mercado 2025", "body": "Texto" }))
            .unwrap();
        assert!(wizard.next_step(Locale::En).unwrap());
        assert_eq!(wizard.current_step, 2);
        assert!(wizard.next_step(Locale::En).unwrap());
        assert!(wizard.is_last_step());
        assert!(wizard.next_step(Locale::En).is_err());
    }

    #[test]
    fn previous_step_stops_at_first() {
        let mut wizard = property_wizard();
        assert!(wizard.previous_step().is_err());
        wizard.set_current_step(3).unwrap();
        wizard.previous_step().unwrap();
        assert_eq!(wizard.current_step, 2);
    }

    #[test]
    fn reset_always_returns_initial_state() {
        let mut wizard = property_wizard();
        wizard
            .update_form_data(json!({ "title": "Casa", "price": "x" }))
            .unwrap();
        wizard.set_current_step(3).unwrap();
        wizard.validate_all(Locale::En);
        wizard.set_loading(true);

        wizard.reset_wizard();

        assert_eq!(wizard, WizardState::new(ListingKind::Property));
        assert_eq!(wizard.current_step, 1);
        assert!(wizard.form_data.is_empty());
        assert!(!wizard.is_dirty);
        assert!(wizard.errors.is_empty());
    }

    #[test]
    fn validate_all_collects_every_step() {
        let mut wizard = property_wizard();
        wizard
            .update_form_data(json!({ "title": "Casa en la playa" }))
            .unwrap();
        assert!(!wizard.validate_all(Locale::En));
        assert!(wizard.errors.contains("price"));
        assert!(wizard.errors.contains("city"));
        assert!(wizard.errors.contains("images"));
        assert_eq!(wizard.errors.get("price").unwrap().len(), 1);
        assert!(!wizard.is_complete());
    }

    #[test]
    fn restore_checks_shape_and_step() {
        let wizard =
            WizardState::restore(ListingKind::Land, json!({ "title": "Lote" }), 3).unwrap();
        assert_eq!(wizard.current_step, 3);
        assert!(!wizard.is_dirty);
        assert_eq!(wizard.title(), Some("Lote"));

        assert!(WizardState::restore(ListingKind::Land, json!({}), 5).is_err());
        assert!(WizardState::restore(ListingKind::Land, json!("oops"), 1).is_err());
    }
}
