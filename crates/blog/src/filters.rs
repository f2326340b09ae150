//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use sha2::{Digest, Sha256};

/// Avatar size in pixels.
const GRAVATAR_SIZE: u32 = 100;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the Gravatar image URL for an email address.
///
/// Unknown addresses fall back to Gravatar's generated "retro" avatar.
///
/// Usage in templates: `{{ comment.author_email|gravatar }}`
#[askama::filter_fn]
pub fn gravatar(email: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(gravatar_url(&email.to_string()))
}

/// Returns the content hash for main.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = hex::encode(Sha256::digest(normalized.as_bytes()));
    format!("https://www.gravatar.com/avatar/{digest}?s={GRAVATAR_SIZE}&d=retro&r=g")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_url_normalizes_email() {
        assert_eq!(
            gravatar_url("  Someone@Example.com "),
            gravatar_url("someone@example.com")
        );
    }

    #[test]
    fn test_gravatar_url_shape() {
        let url = gravatar_url("someone@example.com");
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=100&d=retro&r=g"));
        // 64 hex chars of SHA-256
        let hash = url
            .trim_start_matches("https://www.gravatar.com/avatar/")
            .split('?')
            .next()
            .unwrap_or_default();
        assert_eq!(hash.len(), 64);
    }
}
