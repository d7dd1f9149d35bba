//! Step definitions and validators for each listing wizard.
//!
//! | Kind     | Steps                                         |
//! |----------|-----------------------------------------------|
//! | property | basics, location, features, media, review     |
//! | land     | basics, location, details, media              |
//! | post     | content, metadata, publish                    |

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::form::{is_http_url, validate_step_form, FieldKind, FieldSpec, FormData, StepForm};
use crate::error::{CoreError, FieldErrors};
use crate::listing::{ListingKind, LAND_USES, OPERATIONS, PROPERTY_TYPES};
use crate::locale::{Locale, Message};

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum number of images a listing may carry.
pub const MAX_IMAGES: u64 = 30;

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("valid currency regex"));

// ---------------------------------------------------------------------------
// Step forms
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct PropertyBasics {
    #[validate(required, length(min = 3, max = 120))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(required, range(exclusive_min = 0.0))]
    pub price: Option<f64>,
    pub currency: Option<String>,
    #[validate(required)]
    pub operation: Option<String>,
    #[validate(required)]
    pub property_type: Option<String>,
}

impl StepForm for PropertyBasics {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("title", FieldKind::Text),
        FieldSpec::new("description", FieldKind::Text),
        FieldSpec::new("price", FieldKind::Number),
        FieldSpec::new("currency", FieldKind::Text),
        FieldSpec::new("operation", FieldKind::Text),
        FieldSpec::new("property_type", FieldKind::Text),
    ];

    fn extra_checks(&self, errors: &mut Vec<(&'static str, Message)>) {
        check_currency(self.currency.as_deref(), errors);
        check_choice("operation", self.operation.as_deref(), OPERATIONS, errors);
        check_choice("property_type", self.property_type.as_deref(), PROPERTY_TYPES, errors);
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LandBasics {
    #[validate(required, length(min = 3, max = 120))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(required, range(exclusive_min = 0.0))]
    pub price: Option<f64>,
    pub currency: Option<String>,
    #[validate(required)]
    pub operation: Option<String>,
    #[validate(required)]
    pub land_use: Option<String>,
}

impl StepForm for LandBasics {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("title", FieldKind::Text),
        FieldSpec::new("description", FieldKind::Text),
        FieldSpec::new("price", FieldKind::Number),
        FieldSpec::new("currency", FieldKind::Text),
        FieldSpec::new("operation", FieldKind::Text),
        FieldSpec::new("land_use", FieldKind::Text),
    ];

    fn extra_checks(&self, errors: &mut Vec<(&'static str, Message)>) {
        check_currency(self.currency.as_deref(), errors);
        check_choice("operation", self.operation.as_deref(), OPERATIONS, errors);
        check_choice("land_use", self.land_use.as_deref(), LAND_USES, errors);
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct Location {
    #[validate(required, length(min = 3, max = 255))]
    pub address: Option<String>,
    #[validate(required, length(min = 2, max = 120))]
    pub city: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl StepForm for Location {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("address", FieldKind::Text),
        FieldSpec::new("city", FieldKind::Text),
        FieldSpec::new("latitude", FieldKind::Number),
        FieldSpec::new("longitude", FieldKind::Number),
    ];

    fn extra_checks(&self, errors: &mut Vec<(&'static str, Message)>) {
        // Coordinates come from the map picker as a pair.
        match (self.latitude, self.longitude) {
            (Some(_), None) => errors.push(("longitude", Message::Required)),
            (None, Some(_)) => errors.push(("latitude", Message::Required)),
            _ => {}
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PropertyFeatures {
    #[validate(range(min = 0, max = 100))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub parking_spaces: Option<i32>,
    #[validate(range(exclusive_min = 0.0))]
    pub built_area_m2: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub lot_area_m2: Option<f64>,
    #[validate(length(max = 50))]
    pub amenities: Option<Vec<String>>,
}

impl StepForm for PropertyFeatures {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("bedrooms", FieldKind::Integer),
        FieldSpec::new("bathrooms", FieldKind::Integer),
        FieldSpec::new("parking_spaces", FieldKind::Integer),
        FieldSpec::new("built_area_m2", FieldKind::Number),
        FieldSpec::new("lot_area_m2", FieldKind::Number),
        FieldSpec::new("amenities", FieldKind::TextList),
    ];
}

#[derive(Debug, Deserialize, Validate)]
pub struct LandDetails {
    #[validate(required, range(exclusive_min = 0.0))]
    pub area_m2: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub frontage_m: Option<f64>,
    pub has_utilities: Option<bool>,
    #[validate(length(max = 60))]
    pub zoning: Option<String>,
}

impl StepForm for LandDetails {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("area_m2", FieldKind::Number),
        FieldSpec::new("frontage_m", FieldKind::Number),
        FieldSpec::new("has_utilities", FieldKind::Boolean),
        FieldSpec::new("zoning", FieldKind::Text),
    ];
}

#[derive(Debug, Deserialize, Validate)]
pub struct Media {
    #[validate(required, length(min = 1, max = 30))]
    pub images: Option<Vec<String>>,
}

impl StepForm for Media {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::new("images", FieldKind::TextList)];

    fn extra_checks(&self, errors: &mut Vec<(&'static str, Message)>) {
        if let Some(images) = &self.images {
            if images.iter().any(|url| !is_http_url(url)) {
                errors.push(("images", Message::InvalidUrl));
            }
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostContent {
    #[validate(required, length(min = 3, max = 160))]
    pub title: Option<String>,
    #[validate(required)]
    pub body: Option<String>,
    #[validate(length(max = 300))]
    pub excerpt: Option<String>,
}

impl StepForm for PostContent {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("title", FieldKind::Text),
        FieldSpec::new("body", FieldKind::Text),
        FieldSpec::new("excerpt", FieldKind::Text),
    ];
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostMetadata {
    #[validate(length(max = 10))]
    pub tags: Option<Vec<String>>,
    pub cover_image: Option<String>,
}

impl StepForm for PostMetadata {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("tags", FieldKind::TextList),
        FieldSpec::new("cover_image", FieldKind::Text),
    ];

    fn extra_checks(&self, errors: &mut Vec<(&'static str, Message)>) {
        if let Some(url) = &self.cover_image {
            if !is_http_url(url) {
                errors.push(("cover_image", Message::InvalidUrl));
            }
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostPublish {
    pub publish: Option<bool>,
}

impl StepForm for PostPublish {
    const FIELDS: &'static [FieldSpec] = &[FieldSpec::new("publish", FieldKind::Boolean)];
}

fn check_choice(
    field: &'static str,
    value: Option<&str>,
    allowed: &'static [&'static str],
    errors: &mut Vec<(&'static str, Message)>,
) {
    if let Some(value) = value {
        if !allowed.contains(&value) {
            errors.push((field, Message::InvalidChoice { allowed }));
        }
    }
}

fn check_currency(value: Option<&str>, errors: &mut Vec<(&'static str, Message)>) {
    if let Some(value) = value {
        if !CURRENCY_RE.is_match(value) {
            errors.push(("currency", Message::InvalidCurrency));
        }
    }
}

// ---------------------------------------------------------------------------
// Step registry
// ---------------------------------------------------------------------------

/// One step of a wizard.
#[derive(Clone, Copy)]
pub struct StepDef {
    /// Stable machine key (`basics`, `location`, ...).
    pub key: &'static str,
    pub label_es: &'static str,
    pub label_en: &'static str,
    /// Fields owned by this step. Empty for review steps.
    pub fields: &'static [FieldSpec],
    /// Review steps own no fields and pass only when every earlier step does.
    pub review: bool,
    validate: fn(&FormData, Locale) -> FieldErrors,
}

impl StepDef {
    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::Es => self.label_es,
            Locale::En => self.label_en,
        }
    }

    /// Whether `field` belongs to this step.
    pub fn owns(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

fn no_fields(_: &FormData, _: Locale) -> FieldErrors {
    FieldErrors::new()
}

const fn step<T: StepForm>(
    key: &'static str,
    label_es: &'static str,
    label_en: &'static str,
) -> StepDef {
    StepDef {
        key,
        label_es,
        label_en,
        fields: T::FIELDS,
        review: false,
        validate: validate_step_form::<T>,
    }
}

const fn review(key: &'static str, label_es: &'static str, label_en: &'static str) -> StepDef {
    StepDef {
        key,
        label_es,
        label_en,
        fields: &[],
        review: true,
        validate: no_fields,
    }
}

static PROPERTY_STEPS: [StepDef; 5] = [
    step::<PropertyBasics>("basics", "Información básica", "Basics"),
    step::<Location>("location", "Ubicación", "Location"),
    step::<PropertyFeatures>("features", "Características", "Features"),
    step::<Media>("media", "Imágenes", "Media"),
    review("review", "Revisión", "Review"),
];

static LAND_STEPS: [StepDef; 4] = [
    step::<LandBasics>("basics", "Información básica", "Basics"),
    step::<Location>("location", "Ubicación", "Location"),
    step::<LandDetails>("details", "Detalles del terreno", "Land details"),
    step::<Media>("media", "Imágenes", "Media"),
];

static POST_STEPS: [StepDef; 3] = [
    step::<PostContent>("content", "Contenido", "Content"),
    step::<PostMetadata>("metadata", "Metadatos", "Metadata"),
    step::<PostPublish>("publish", "Publicación", "Publish"),
];

/// Ordered steps of the wizard for `kind`.
pub fn steps_for(kind: ListingKind) -> &'static [StepDef] {
    match kind {
        ListingKind::Property => &PROPERTY_STEPS,
        ListingKind::Land => &LAND_STEPS,
        ListingKind::Post => &POST_STEPS,
    }
}

/// Number of steps in the wizard for `kind`.
pub fn total_steps(kind: ListingKind) -> u8 {
    steps_for(kind).len() as u8
}

/// Validate that `step` exists in the wizard for `kind`.
pub fn validate_step_number(kind: ListingKind, step: u8) -> Result<(), CoreError> {
    let max = total_steps(kind);
    if step < MIN_STEP || step > max {
        return Err(CoreError::Validation(format!(
            "Step {step} is out of range ({MIN_STEP}..{max}) for a {} wizard",
            kind.as_str()
        )));
    }
    Ok(())
}

/// Look up a step definition by 1-based number.
pub fn step_def(kind: ListingKind, step: u8) -> Result<&'static StepDef, CoreError> {
    validate_step_number(kind, step)?;
    Ok(&steps_for(kind)[(step - 1) as usize])
}

/// Run the validator for one step.
///
/// Review steps report the merged errors of every earlier step, plus a
/// form-level message when any of them failed.
pub fn validate_step(
    kind: ListingKind,
    step: u8,
    data: &FormData,
    locale: Locale,
) -> Result<FieldErrors, CoreError> {
    let def = step_def(kind, step)?;
    if !def.review {
        return Ok((def.validate)(data, locale));
    }

    let mut errors = FieldErrors::new();
    for earlier in &steps_for(kind)[..(step - 1) as usize] {
        errors.merge((earlier.validate)(data, locale));
    }
    if !errors.is_empty() {
        errors.add(
            super::form::FORM_FIELD,
            Message::PreviousStepsIncomplete.render(locale),
        );
    }
    Ok(errors)
}

/// Every field declared by any step of `kind`.
pub fn all_fields(kind: ListingKind) -> impl Iterator<Item = &'static FieldSpec> {
    steps_for(kind).iter().flat_map(|s| s.fields.iter())
}

/// Serializable description of a wizard, for clients that render it.
#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    pub number: u8,
    pub key: &'static str,
    pub label: &'static str,
    pub fields: Vec<&'static str>,
}

pub fn describe(kind: ListingKind, locale: Locale) -> Vec<StepInfo> {
    steps_for(kind)
        .iter()
        .enumerate()
        .map(|(idx, def)| StepInfo {
            number: idx as u8 + 1,
            key: def.key,
            label: def.label(locale),
            fields: def.fields.iter().map(|f| f.name).collect(),
        })
        .collect()
}
