//! Flat form data, per-field type normalization and step validation.
//!
//! Wizard form data is a single flat JSON object shared by every step. Each
//! step declares the fields it owns ([`FieldSpec`]) and a `validator`-derived
//! struct ([`StepForm`]) describing the rules for those fields.

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use validator::{Validate, ValidationError};

use crate::error::{CoreError, FieldErrors};
use crate::locale::{Locale, Message};

/// Flat key/value form state accumulated across wizard steps.
pub type FormData = Map<String, Value>;

/// Error key for problems that do not belong to a single field.
pub const FORM_FIELD: &str = "_form";

/// Expected JSON shape of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Boolean,
    TextList,
}

impl FieldKind {
    pub fn expected(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::TextList => "list of text",
        }
    }
}

/// A field owned by a wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A step's typed view over [`FormData`].
pub trait StepForm: DeserializeOwned + Validate {
    /// Fields this step reads from the form.
    const FIELDS: &'static [FieldSpec];

    /// Rules the derive cannot express (choice lists, URL lists).
    fn extra_checks(&self, _errors: &mut Vec<(&'static str, Message)>) {}
}

/// Normalize one raw value to the shape `kind` expects.
///
/// Blank strings and `null` count as absent (`Ok(None)`). Numeric and
/// boolean strings are accepted since HTML forms submit everything as text.
/// `Err(())` means the value has the wrong type.
pub fn normalize_value(kind: FieldKind, raw: Option<&Value>) -> Result<Option<Value>, ()> {
    let value = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };

    match kind {
        FieldKind::Text => match value {
            Value::String(s) => Ok(non_blank(s).map(Value::String)),
            _ => Err(()),
        },
        FieldKind::Number => match value {
            Value::Number(_) => Ok(Some(value.clone())),
            Value::String(s) => match non_blank(s) {
                None => Ok(None),
                Some(s) => s
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(|n| Some(Value::Number(n)))
                    .ok_or(()),
            },
            _ => Err(()),
        },
        FieldKind::Integer => {
            let parsed = match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
                Value::String(s) => match non_blank(s) {
                    None => return Ok(None),
                    Some(s) => s.parse::<i64>().ok(),
                },
                _ => None,
            };
            parsed
                .filter(|n| i32::try_from(*n).is_ok())
                .map(|n| Some(Value::from(n)))
                .ok_or(())
        }
        FieldKind::Boolean => match value {
            Value::Bool(_) => Ok(Some(value.clone())),
            Value::String(s) => match s.trim() {
                "" => Ok(None),
                "true" | "on" | "1" => Ok(Some(Value::Bool(true))),
                "false" | "off" | "0" => Ok(Some(Value::Bool(false))),
                _ => Err(()),
            },
            _ => Err(()),
        },
        FieldKind::TextList => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => {
                            if let Some(s) = non_blank(s) {
                                out.push(Value::String(s));
                            }
                        }
                        _ => return Err(()),
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            _ => Err(()),
        },
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Normalize every field in `specs`, collecting type errors.
///
/// Returns the cleaned object (only well-typed, present fields) and the
/// names of fields that had the wrong type.
pub fn sanitize(
    data: &FormData,
    specs: &[FieldSpec],
    locale: Locale,
    errors: &mut FieldErrors,
) -> (FormData, Vec<&'static str>) {
    let mut clean = FormData::new();
    let mut mistyped = Vec::new();

    for spec in specs {
        let raw = data.get(spec.name);
        if raw.is_some_and(contains_nul) {
            errors.add(spec.name, Message::UnsupportedCharacters.render(locale));
            mistyped.push(spec.name);
            continue;
        }
        match normalize_value(spec.kind, raw) {
            Ok(Some(v)) => {
                clean.insert(spec.name.to_string(), v);
            }
            Ok(None) => {}
            Err(()) => {
                errors.add(
                    spec.name,
                    Message::InvalidType {
                        expected: spec.kind.expected(),
                    }
                    .render(locale),
                );
                mistyped.push(spec.name);
            }
        }
    }

    (clean, mistyped)
}

/// Whether `value` holds a NUL character anywhere, object keys included.
pub fn contains_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(contains_nul),
        Value::Object(map) => map.iter().any(|(k, v)| k.contains('\0') || contains_nul(v)),
        _ => false,
    }
}

/// Reject form data Postgres cannot store: text and JSONB refuse NUL.
///
/// Offending values are reported under their key; a bad key goes to `_form`.
pub fn check_storable(data: &FormData, locale: Locale) -> Result<(), CoreError> {
    let mut errors = FieldErrors::new();
    let message = Message::UnsupportedCharacters.render(locale);
    for (key, value) in data {
        if key.contains('\0') {
            if !errors.contains(FORM_FIELD) {
                errors.add(FORM_FIELD, message.clone());
            }
        } else if contains_nul(value) {
            errors.add(key.as_str(), message.clone());
        }
    }
    errors.into_result()
}

/// Validate the fields owned by step form `T`.
///
/// A field with the wrong type reports only the type error.
pub fn validate_step_form<T: StepForm>(data: &FormData, locale: Locale) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let (clean, mistyped) = sanitize(data, T::FIELDS, locale, &mut errors);

    let form: T = match serde_json::from_value(Value::Object(clean.clone())) {
        Ok(form) => form,
        Err(e) => {
            errors.add(FORM_FIELD, e.to_string());
            return errors;
        }
    };

    if let Err(validation) = form.validate() {
        for (field, field_errors) in validation.field_errors() {
            let field: &str = &field;
            if mistyped.iter().any(|m| *m == field) {
                continue;
            }
            for err in field_errors.iter() {
                errors.add(field, translate(err, clean.get(field)).render(locale));
            }
        }
    }

    let mut extra = Vec::new();
    form.extra_checks(&mut extra);
    for (field, message) in extra {
        if !mistyped.contains(&field) {
            errors.add(field, message.render(locale));
        }
    }

    errors
}

/// Map a `validator` error onto the message catalog.
///
/// `value` is the normalized field value, used to tell "too short" from
/// "too long" for length rules.
fn translate(err: &ValidationError, value: Option<&Value>) -> Message {
    let param_f64 = |name: &str| err.params.get(name).and_then(Value::as_f64);
    let param_u64 = |name: &str| err.params.get(name).and_then(Value::as_u64);

    match &*err.code {
        "required" => Message::Required,
        "length" => {
            let min = param_u64("min");
            let max = param_u64("max");
            match value {
                Some(Value::Array(items)) => {
                    let len = items.len() as u64;
                    match min {
                        Some(min) if len < min => Message::TooFewItems { min },
                        _ => Message::TooManyItems { max: max.unwrap_or(len) },
                    }
                }
                Some(Value::String(s)) => {
                    let len = s.chars().count() as u64;
                    match min {
                        Some(min) if len < min => Message::TooShort { min },
                        _ => Message::TooLong { max: max.unwrap_or(len) },
                    }
                }
                _ => Message::Required,
            }
        }
        "range" => {
            let min = param_f64("min");
            let max = param_f64("max");
            let non_positive = value.and_then(Value::as_f64).is_some_and(|v| v <= 0.0);
            let unbounded = min.is_none() && max.is_none();
            if param_f64("exclusive_min") == Some(0.0) || (unbounded && non_positive) {
                Message::MustBePositive
            } else {
                Message::OutOfRange { min, max }
            }
        }
        "url" => Message::InvalidUrl,
        _ => Message::Required,
    }
}

/// Whether `s` is an absolute http(s) URL with a host.
pub fn is_http_url(s: &str) -> bool {
    let rest = match s.strip_prefix("https://").or_else(|| s.strip_prefix("http://")) {
        Some(rest) => rest,
        None => return false,
    };
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    !host.is_empty() && !s.chars().any(|c| c.is_whitespace() || c.is_control())
}

/// Shallow-merge `partial` into `base`. A `null` in `partial` removes the key.
///
/// Returns the keys that changed.
pub fn merge_form_data(base: &mut FormData, partial: FormData) -> Vec<String> {
    let mut changed = Vec::with_capacity(partial.len());
    for (key, value) in partial {
        if value.is_null() {
            if base.remove(&key).is_some() {
                changed.push(key);
            }
        } else if base.get(&key) != Some(&value) {
            base.insert(key.clone(), value);
            changed.push(key);
        }
    }
    changed
}
