//! Prompt construction and application rules for generated listing copy.
//!
//! Generation is best-effort: it only ever fills a blank field and callers
//! treat any failure as "leave the form alone".

use serde_json::Value;

use crate::listing::ListingKind;
use crate::locale::Locale;
use crate::wizard::FormData;

/// Form field that generated copy is written to.
pub fn target_field(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Property | ListingKind::Land => "description",
        ListingKind::Post => "excerpt",
    }
}

/// Maximum characters kept from generated text, matching the step rules.
pub fn max_chars(kind: ListingKind) -> usize {
    match kind {
        ListingKind::Property | ListingKind::Land => 5000,
        ListingKind::Post => 300,
    }
}

/// Whether the target field is currently blank.
pub fn needs_copy(kind: ListingKind, form: &FormData) -> bool {
    match form.get(target_field(kind)) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Facts from the form that are worth giving the generator.
const PROMPT_FIELDS: &[&str] = &[
    "title",
    "operation",
    "property_type",
    "land_use",
    "city",
    "address",
    "price",
    "currency",
    "bedrooms",
    "bathrooms",
    "built_area_m2",
    "lot_area_m2",
    "area_m2",
    "amenities",
    "tags",
    "body",
];

/// Build the instruction sent to the text-generation endpoint.
pub fn build_prompt(kind: ListingKind, form: &FormData, locale: Locale) -> String {
    let mut facts = Vec::new();
    for field in PROMPT_FIELDS {
        let rendered = match form.get(*field) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            _ => continue,
        };
        facts.push(format!("- {field}: {rendered}"));
    }

    let max = max_chars(kind);
    let instruction = match (kind, locale) {
        (ListingKind::Post, Locale::Es) => format!(
            "Escribe un resumen atractivo de un artículo de blog inmobiliario en español, de máximo {max} caracteres."
        ),
        (ListingKind::Post, Locale::En) => format!(
            "Write an engaging summary of a real-estate blog article in English, at most {max} characters."
        ),
        (_, Locale::Es) => format!(
            "Escribe una descripción comercial en español para este aviso de {}, de máximo {max} caracteres. No inventes datos.",
            kind_label_es(kind)
        ),
        (_, Locale::En) => format!(
            "Write a sales description in English for this {} listing, at most {max} characters. Do not invent facts.",
            kind.as_str()
        ),
    };

    format!("{instruction}\n{}", facts.join("\n"))
}

fn kind_label_es(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Property => "inmueble",
        ListingKind::Land => "terreno",
        ListingKind::Post => "artículo",
    }
}

/// Write generated text into the form if the target is still blank.
///
/// Returns `true` when the form changed.
pub fn apply_generated(kind: ListingKind, form: &mut FormData, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || !needs_copy(kind, form) {
        return false;
    }
    let kept: String = text
        .chars()
        .filter(|c| *c != '\0')
        .take(max_chars(kind))
        .collect();
    form.insert(target_field(kind).to_string(), Value::String(kept));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(v: Value) -> FormData {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn blank_target_needs_copy() {
        assert!(needs_copy(ListingKind::Property, &form(json!({}))));
        assert!(needs_copy(ListingKind::Property, &form(json!({ "description": "  " }))));
        assert!(!needs_copy(ListingKind::Land, &form(json!({ "description": "Lindo" }))));
        assert!(needs_copy(ListingKind::Post, &form(json!({ "description": "x" }))));
    }

    #[test]
    fn prompt_lists_known_facts() {
        let prompt = build_prompt(
            ListingKind::Property,
            &form(json!({ "title": "Casa en la playa", "price": 250000, "amenities": ["piscina"], "city": "" })),
            Locale::Es,
        );
        assert!(prompt.starts_with("Escribe una descripción"));
        assert!(prompt.contains("- title: Casa en la playa"));
        assert!(prompt.contains("- price: 250000"));
        assert!(prompt.contains("- amenities: piscina"));
        assert!(!prompt.contains("- city"));
    }

    #[test]
    fn apply_only_fills_blank_fields() {
        let mut f = form(json!({ "description": "Escrita a mano" }));
        assert!(!apply_generated(ListingKind::Property, &mut f, "Generada"));
        assert_eq!(f["description"], "Escrita a mano");

        let mut f = form(json!({}));
        assert!(!apply_generated(ListingKind::Property, &mut f, "   "));
        assert!(f.is_empty());

        assert!(apply_generated(ListingKind::Post, &mut f, &"a".repeat(400)));
        assert_eq!(f["excerpt"].as_str().unwrap().len(), 300);
    }

    #[test]
    fn generated_text_drops_nul() {
        let mut f = form(json!({}));
        assert!(apply_generated(ListingKind::Post, &mut f, "Guía\0 rápida"));
        assert_eq!(f["excerpt"], "Guía rápida");
    }
}
