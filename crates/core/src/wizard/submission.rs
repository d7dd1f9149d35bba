//! Turning a finished wizard into a listing payload.
//!
//! [`prepare_submission`] is the gate: it validates every step and, only if
//! all pass, builds a typed payload. [`submit`] wraps the gate around a
//! single create call supplied by the caller.

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::form::{sanitize, FormData};
use super::{steps, WizardState};
use crate::error::{CoreError, FieldErrors};
use crate::listing::{ListingKind, DEFAULT_CURRENCY};
use crate::locale::Locale;

/// Validated property fields, ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyListing {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub operation: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub parking_spaces: Option<i32>,
    #[serde(default)]
    pub built_area_m2: Option<f64>,
    #[serde(default)]
    pub lot_area_m2: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub images: Vec<String>,
}

/// Validated land fields, ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandListing {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub operation: String,
    pub land_use: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub area_m2: f64,
    #[serde(default)]
    pub frontage_m: Option<f64>,
    #[serde(default)]
    pub has_utilities: Option<bool>,
    #[serde(default)]
    pub zoning: Option<String>,
    pub images: Vec<String>,
}

/// Validated blog post fields, ready for insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostListing {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub publish: Option<bool>,
}

/// The record a wizard produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingPayload {
    Property(PropertyListing),
    Land(LandListing),
    Post(PostListing),
}

impl ListingPayload {
    pub fn kind(&self) -> ListingKind {
        match self {
            Self::Property(_) => ListingKind::Property,
            Self::Land(_) => ListingKind::Land,
            Self::Post(_) => ListingKind::Post,
        }
    }
}

/// Why a submission did not produce a record.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError<E> {
    /// At least one required step failed; the create call was not made.
    #[error("Submission rejected: {0}")]
    Invalid(FieldErrors),

    /// The create call itself failed. The wizard state is left as it was.
    #[error("Submission failed: {0}")]
    Failed(E),
}

/// Validate every step of `form_data` and build the typed payload.
pub fn prepare_submission(
    kind: ListingKind,
    form_data: &FormData,
    locale: Locale,
) -> Result<ListingPayload, CoreError> {
    let mut errors = FieldErrors::new();
    for step in steps::MIN_STEP..=steps::total_steps(kind) {
        errors.merge(steps::validate_step(kind, step, form_data, locale)?);
    }
    if !errors.is_empty() {
        return Err(CoreError::InvalidFields(errors));
    }

    let specs: Vec<_> = steps::all_fields(kind).copied().collect();
    let (clean, _) = sanitize(form_data, &specs, locale, &mut errors);
    let clean = Value::Object(clean);

    let payload = match kind {
        ListingKind::Property => {
            let mut listing: PropertyListing = from_clean(clean)?;
            listing.currency = Some(normalize_currency(listing.currency.as_deref()));
            ListingPayload::Property(listing)
        }
        ListingKind::Land => {
            let mut listing: LandListing = from_clean(clean)?;
            listing.currency = Some(normalize_currency(listing.currency.as_deref()));
            ListingPayload::Land(listing)
        }
        ListingKind::Post => ListingPayload::Post(from_clean(clean)?),
    };
    Ok(payload)
}

/// Apply `changes` on top of a listing's current fields and revalidate.
///
/// Used for dashboard edits: the merged form must still pass every step. A
/// `null` in `changes` clears an optional field.
pub fn prepare_edit(
    kind: ListingKind,
    mut current: FormData,
    changes: Value,
    locale: Locale,
) -> Result<ListingPayload, CoreError> {
    let changes = super::into_form_data(changes)?;
    super::form::merge_form_data(&mut current, changes);
    prepare_submission(kind, &current, locale)
}

fn from_clean<T: serde::de::DeserializeOwned>(clean: Value) -> Result<T, CoreError> {
    serde_json::from_value(clean)
        .map_err(|e| CoreError::Internal(format!("Validated form did not fit listing: {e}")))
}

fn normalize_currency(currency: Option<&str>) -> String {
    currency
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

/// Submit the wizard through `create`, the single persistence call.
///
/// `create` runs only when every step validates. On success the wizard is
/// reset; on any failure its form data and step are left untouched so the
/// user can retry.
pub async fn submit<F, Fut, T, E>(
    wizard: &mut WizardState,
    locale: Locale,
    create: F,
) -> Result<T, SubmissionError<E>>
where
    F: FnOnce(ListingPayload) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if !wizard.validate_all(locale) {
        return Err(SubmissionError::Invalid(wizard.errors.clone()));
    }

    let payload = match prepare_submission(wizard.kind, &wizard.form_data, locale) {
        Ok(payload) => payload,
        Err(CoreError::InvalidFields(errors)) => return Err(SubmissionError::Invalid(errors)),
        Err(other) => {
            let mut errors = FieldErrors::new();
            errors.add(super::form::FORM_FIELD, other.to_string());
            return Err(SubmissionError::Invalid(errors));
        }
    };

    wizard.set_loading(true);
    let result = create(payload).await;
    wizard.set_loading(false);

    match result {
        Ok(created) => {
            wizard.reset_wizard();
            Ok(created)
        }
        Err(e) => Err(SubmissionError::Failed(e)),
    }
}
