//! Listing vocabulary shared by the wizard, the repositories and the API.
//!
//! Every enum here is stored as lowercase text in the database and parsed
//! back with `from_str_db`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Listing kind
// ---------------------------------------------------------------------------

/// What a wizard or draft produces once submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Property,
    Land,
    Post,
}

impl ListingKind {
    pub const ALL: [ListingKind; 3] = [Self::Property, Self::Land, Self::Post];

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "property" => Ok(Self::Property),
            "land" => Ok(Self::Land),
            "post" => Ok(Self::Post),
            _ => Err(CoreError::Validation(format!(
                "Invalid listing kind '{s}'. Must be one of: property, land, post"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Property => "property",
            Self::Land => "land",
            Self::Post => "post",
        }
    }

    /// Entity name used in not-found errors.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Property => "Property",
            Self::Land => "Land",
            Self::Post => "Post",
        }
    }
}

// ---------------------------------------------------------------------------
// Listing attributes
// ---------------------------------------------------------------------------

pub const OPERATIONS: &[&str] = &["sale", "rent"];

pub const PROPERTY_TYPES: &[&str] = &["house", "apartment", "office", "commercial", "warehouse"];

pub const LAND_USES: &[&str] = &["residential", "commercial", "agricultural", "industrial", "mixed"];

/// Currency used when a listing does not specify one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Publication status of a property or land listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    Published,
    Archived,
}

pub const LISTING_STATUSES: &[&str] = &["draft", "published", "archived"];

impl ListingStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(CoreError::Validation(format!(
                "Invalid listing status '{s}'. Must be one of: draft, published, archived"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

/// Check `value` against one of the choice lists above.
pub fn validate_choice(field: &str, value: &str, allowed: &[&str]) -> Result<(), CoreError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid {field} '{value}'. Must be one of: {}",
            allowed.join(", ")
        )))
    }
}

/// Reject free-text filters Postgres cannot bind.
pub fn validate_filter_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.contains('\0') {
        return Err(CoreError::Validation(format!(
            "{field} filter contains unsupported characters"
        )));
    }
    Ok(())
}

/// Validate a public price filter pair.
pub fn validate_price_range(min: Option<f64>, max: Option<f64>) -> Result<(), CoreError> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(CoreError::Validation(format!(
                "min_price ({lo}) must not exceed max_price ({hi})"
            )));
        }
    }
    if min.is_some_and(|v| v < 0.0) || max.is_some_and(|v| v < 0.0) {
        return Err(CoreError::Validation("Price filters must be non-negative".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Maximum slug length before a dedup suffix is appended.
pub const MAX_SLUG_LEN: usize = 80;

/// Build a URL slug from a title.
///
/// Lowercases, folds common Spanish accents, and collapses any run of
/// non-alphanumerics into a single `-`. Falls back to `listing` when the
/// title has no usable characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        let folded = match ch {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        };
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    if slug.is_empty() {
        "listing".to_string()
    } else {
        slug
    }
}

/// Slug with a numeric suffix, used when the base slug is already taken.
pub fn slug_with_suffix(base: &str, n: u32) -> String {
    if n <= 1 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}

/// First free slug for `base` given the slugs already taken.
///
/// `taken` holds every existing slug equal to `base` or of the form
/// `base-N`; other entries are ignored.
pub fn pick_free_slug(base: &str, taken: &[String]) -> String {
    (1..)
        .map(|n| slug_with_suffix(base, n))
        .find(|candidate| !taken.iter().any(|t| t == candidate))
        .unwrap_or_else(|| base.to_string())
}
