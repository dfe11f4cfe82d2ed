//! Core trait abstractions for the harvesting pipeline.
//!
//! These are the seams where the network, the seen-domain persistence
//! medium, result filtering and the final sink plug in.

pub mod filter;
pub mod sink;
pub mod store;
pub mod transport;
