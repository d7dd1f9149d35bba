//! Validation rules for user accounts and profiles.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FieldErrors;
use crate::locale::{Locale, Message};
use crate::wizard::form::is_http_url;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 40;
pub const MAX_DISPLAY_NAME_LEN: usize = 80;
pub const MAX_PHONE_LEN: usize = 30;

/// Locale tags a user may pick as their preference.
pub const SUPPORTED_LOCALES: &[&str] = &["es", "en"];

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid username regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Check a self-registration request.
pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    locale: Locale,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let username_len = username.chars().count();
    if username_len == 0 {
        errors.add("username", Message::Required.render(locale));
    } else if username_len < MIN_USERNAME_LEN {
        errors.add("username", Message::TooShort { min: MIN_USERNAME_LEN as u64 }.render(locale));
    } else if username_len > MAX_USERNAME_LEN {
        errors.add("username", Message::TooLong { max: MAX_USERNAME_LEN as u64 }.render(locale));
    } else if !USERNAME_RE.is_match(username) {
        errors.add("username", Message::InvalidUsername.render(locale));
    }

    if email.is_empty() {
        errors.add("email", Message::Required.render(locale));
    } else if email.contains('\0') {
        errors.add("email", Message::UnsupportedCharacters.render(locale));
    } else if !EMAIL_RE.is_match(email) {
        errors.add("email", Message::InvalidEmail.render(locale));
    }

    let password_len = password.chars().count();
    if password_len < MIN_PASSWORD_LEN {
        errors.add("password", Message::TooShort { min: MIN_PASSWORD_LEN as u64 }.render(locale));
    } else if password_len > MAX_PASSWORD_LEN {
        errors.add("password", Message::TooLong { max: MAX_PASSWORD_LEN as u64 }.render(locale));
    }

    errors
}

/// Check the optional fields of a profile update.
pub fn validate_profile(
    display_name: Option<&str>,
    phone: Option<&str>,
    avatar_url: Option<&str>,
    preferred_locale: Option<&str>,
    locale: Locale,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for (field, value) in [("display_name", display_name), ("phone", phone)] {
        if value.is_some_and(|v| v.contains('\0')) {
            errors.add(field, Message::UnsupportedCharacters.render(locale));
        }
    }
    if display_name.is_some_and(|n| n.chars().count() > MAX_DISPLAY_NAME_LEN) {
        errors.add(
            "display_name",
            Message::TooLong { max: MAX_DISPLAY_NAME_LEN as u64 }.render(locale),
        );
    }
    if phone.is_some_and(|p| p.chars().count() > MAX_PHONE_LEN) {
        errors.add("phone", Message::TooLong { max: MAX_PHONE_LEN as u64 }.render(locale));
    }
    if avatar_url.is_some_and(|u| !is_http_url(u)) {
        errors.add("avatar_url", Message::InvalidUrl.render(locale));
    }
    if preferred_locale.is_some_and(|l| !SUPPORTED_LOCALES.contains(&l)) {
        errors.add(
            "preferred_locale",
            Message::InvalidChoice { allowed: SUPPORTED_LOCALES }.render(locale),
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration("ana.perez", "ana@example.com", "s3cret-pass", Locale::En)
            .is_empty());
    }

    #[test]
    fn registration_reports_each_field() {
        let errors = validate_registration("a b", "not-an-email", "short", Locale::En);
        assert_eq!(
            errors.get("username"),
            Some(&["Only letters, digits, dot, dash and underscore are allowed".to_string()][..])
        );
        assert!(errors.contains("email"));
        assert_eq!(
            errors.get("password"),
            Some(&["Must be at least 8 characters".to_string()][..])
        );
    }

    #[test]
    fn profile_checks_only_present_fields() {
        assert!(validate_profile(None, None, None, None, Locale::Es).is_empty());

        let errors = validate_profile(
            Some("Ana"),
            Some("+51 999 999 999"),
            Some("ftp://x"),
            Some("fr"),
            Locale::En,
        );
        assert!(errors.contains("avatar_url"));
        assert!(errors.contains("preferred_locale"));
        assert!(!errors.contains("display_name"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn nul_characters_are_rejected() {
        let errors = validate_registration("ana", "ana\0@example.com", "s3cret-pass", Locale::En);
        assert_eq!(
            errors.get("email"),
            Some(&["Contains unsupported characters".to_string()][..])
        );

        let errors = validate_profile(Some("Ana\0"), Some("+51\0"), None, None, Locale::En);
        assert!(errors.contains("display_name"));
        assert!(errors.contains("phone"));
    }
}
