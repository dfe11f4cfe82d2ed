//! Seen-domain storage implementations.
//!
//! Available backends:
//! - `FileSeenStore` - versioned JSON file per country (production)
//! - `MemorySeenStore` - in-memory storage for tests

pub mod file;
pub mod memory;

pub use file::FileSeenStore;
pub use memory::MemorySeenStore;
