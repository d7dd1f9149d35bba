//! Per-request language selection.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use estate_core::locale::Locale;
use serde::Deserialize;

/// Language for validation messages, resolved from `?lang=`, then the
/// `Accept-Language` header, then the default (`es`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestLocale(pub Locale);

#[derive(Deserialize)]
struct LangParam {
    lang: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestLocale {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_query = Query::<LangParam>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(p)| p.lang)
            .and_then(|tag| Locale::from_tag(&tag));

        let from_header = || {
            parts
                .headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(Locale::from_accept_language)
        };

        Ok(RequestLocale(
            from_query.or_else(from_header).unwrap_or_default(),
        ))
    }
}
