//! Result sink trait.
//!
//! A sink takes ownership of a finished bundle's contents. It keeps its own
//! record of what it has already stored (independent of the duplicate
//! filter) and reports success or failure for the bundle as a whole.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::results::{ResultBundle, SinkReport};

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Store every not-yet-recorded result of the bundle.
    async fn write(&self, country: &str, bundle: &ResultBundle) -> Result<SinkReport>;
}
