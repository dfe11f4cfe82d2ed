//! Security utilities: secret handling and URL redaction.

pub mod credentials;

pub use credentials::{redact_url, SecretString};
