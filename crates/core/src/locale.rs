//! Request language and the validation message catalog.
//!
//! The language is resolved per request and passed explicitly to anything
//! that renders user-facing text. There is no process-wide "current
//! language".

use serde::{Deserialize, Serialize};

/// Supported interface languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Parse a language tag such as `es`, `en-US` or `es_MX`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "es" => Some(Self::Es),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Pick the best supported language from an `Accept-Language` value.
    ///
    /// Entries are ranked by their `q` weight (default 1.0); ties keep header
    /// order. Returns `None` when nothing supported is listed.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, usize, Locale)> = header
            .split(',')
            .enumerate()
            .filter_map(|(idx, entry)| {
                let mut parts = entry.split(';');
                let locale = Self::from_tag(parts.next()?)?;
                let q = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|v| v.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (q > 0.0).then_some((q, idx, locale))
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.first().map(|(_, _, locale)| *locale)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

/// A user-facing validation message, rendered per locale.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Required,
    TooShort { min: u64 },
    TooLong { max: u64 },
    TooFewItems { min: u64 },
    TooManyItems { max: u64 },
    OutOfRange { min: Option<f64>, max: Option<f64> },
    MustBePositive,
    InvalidChoice { allowed: &'static [&'static str] },
    InvalidType { expected: &'static str },
    InvalidUrl,
    InvalidCurrency,
    InvalidEmail,
    InvalidUsername,
    UnsupportedCharacters,
    PreviousStepsIncomplete,
}

impl Message {
    pub fn render(&self, locale: Locale) -> String {
        match (self, locale) {
            (Self::Required, Locale::Es) => "Este campo es obligatorio".into(),
            (Self::Required, Locale::En) => "This field is required".into(),
            (Self::TooShort { min }, Locale::Es) => format!("Debe tener al menos {min} caracteres"),
            (Self::TooShort { min }, Locale::En) => format!("Must be at least {min} characters"),
            (Self::TooLong { max }, Locale::Es) => format!("No puede superar {max} caracteres"),
            (Self::TooLong { max }, Locale::En) => format!("Must be at most {max} characters"),
            (Self::TooFewItems { min: 1 }, Locale::Es) => "Se requiere al menos 1 elemento".into(),
            (Self::TooFewItems { min: 1 }, Locale::En) => "At least 1 item is required".into(),
            (Self::TooFewItems { min }, Locale::Es) => format!("Se requieren al menos {min} elementos"),
            (Self::TooFewItems { min }, Locale::En) => format!("At least {min} items are required"),
            (Self::TooManyItems { max }, Locale::Es) => format!("Se permiten como máximo {max} elementos"),
            (Self::TooManyItems { max }, Locale::En) => format!("At most {max} items are allowed"),
            (Self::OutOfRange { min, max }, locale) => render_range(*min, *max, locale),
            (Self::MustBePositive, Locale::Es) => "Debe ser mayor que cero".into(),
            (Self::MustBePositive, Locale::En) => "Must be greater than zero".into(),
            (Self::InvalidChoice { allowed }, Locale::Es) => {
                format!("Valor no permitido. Opciones: {}", allowed.join(", "))
            }
            (Self::InvalidChoice { allowed }, Locale::En) => {
                format!("Invalid value. Must be one of: {}", allowed.join(", "))
            }
            (Self::InvalidType { expected }, Locale::Es) => {
                format!("Tipo inválido, se esperaba {}", expected_es(expected))
            }
            (Self::InvalidType { expected }, Locale::En) => {
                format!("Invalid type, expected {expected}")
            }
            (Self::InvalidUrl, Locale::Es) => "Debe ser una URL http(s) válida".into(),
            (Self::InvalidUrl, Locale::En) => "Must be a valid http(s) URL".into(),
            (Self::InvalidCurrency, Locale::Es) => "Código de moneda ISO de 3 letras".into(),
            (Self::InvalidCurrency, Locale::En) => "Must be a 3-letter ISO currency code".into(),
            (Self::InvalidEmail, Locale::Es) => "Correo electrónico inválido".into(),
            (Self::InvalidEmail, Locale::En) => "Must be a valid email address".into(),
            (Self::InvalidUsername, Locale::Es) => {
                "Solo letras, números, punto, guion y guion bajo".into()
            }
            (Self::InvalidUsername, Locale::En) => {
                "Only letters, digits, dot, dash and underscore are allowed".into()
            }
            (Self::UnsupportedCharacters, Locale::Es) => "Contiene caracteres no permitidos".into(),
            (Self::UnsupportedCharacters, Locale::En) => "Contains unsupported characters".into(),
            (Self::PreviousStepsIncomplete, Locale::Es) => {
                "Hay pasos anteriores incompletos".into()
            }
            (Self::PreviousStepsIncomplete, Locale::En) => {
                "Previous steps are incomplete".into()
            }
        }
    }
}

fn render_range(min: Option<f64>, max: Option<f64>, locale: Locale) -> String {
    match (min, max, locale) {
        (Some(lo), Some(hi), Locale::Es) => format!("Debe estar entre {lo} y {hi}"),
        (Some(lo), Some(hi), Locale::En) => format!("Must be between {lo} and {hi}"),
        (Some(lo), None, Locale::Es) => format!("Debe ser al menos {lo}"),
        (Some(lo), None, Locale::En) => format!("Must be at least {lo}"),
        (None, Some(hi), Locale::Es) => format!("Debe ser como máximo {hi}"),
        (None, Some(hi), Locale::En) => format!("Must be at most {hi}"),
        (None, None, Locale::Es) => "Valor fuera de rango".into(),
        (None, None, Locale::En) => "Value out of range".into(),
    }
}

fn expected_es(expected: &str) -> &str {
    match expected {
        "text" => "texto",
        "number" => "número",
        "integer" => "número entero",
        "boolean" => "verdadero/falso",
        "list of text" => "lista de textos",
        other => other,
    }
}
