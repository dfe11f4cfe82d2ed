//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of the search API
//! key. Query URLs carry the key as a parameter, so anything that logs or
//! reports a URL goes through [`redact_url`] first.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;
use url::Url;

/// Query parameters whose values are never logged.
const SECRET_PARAMS: &[&str] = &["api_key", "key", "token"];

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., building a query URL).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Replace secret query parameter values in a URL with `REDACTED`.
///
/// Unparseable input is returned unchanged apart from a blunt cut at the
/// first `api_key=`, so a malformed URL still never leaks the key.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return match raw.find("api_key=") {
            Some(idx) => format!("{}api_key=REDACTED", &raw[..idx]),
            None => raw.to_string(),
        };
    };

    if !url
        .query_pairs()
        .any(|(k, _)| SECRET_PARAMS.contains(&k.as_ref()))
    {
        return raw.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if SECRET_PARAMS.contains(&k.as_ref()) {
                (k.into_owned(), "REDACTED".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
