//! Search transport implementations.
//!
//! - `HttpTransport` - reqwest-backed GET with a request timeout
//! - `RateLimitedTransport` - wrapper that caps request rate across callers

pub mod http;
pub mod rate_limited;

pub use http::HttpTransport;
pub use rate_limited::{RateLimitedTransport, TransportExt};
