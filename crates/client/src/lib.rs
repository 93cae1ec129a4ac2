//! Source orchestration and merge engine
//!
//! A [`Client`] holds client-local provider bindings, an optional validator
//! and an optional exporter. [`Client::load`] resolves each source specifier
//! to a binding, loads the sources in order, merges them under the requested
//! strategy and validates the result as a whole.

pub mod client;
pub mod environment;
pub mod limits;
pub mod merge;

pub use client::Client;
pub use environment::Environment;
pub use limits::ClientLimits;
pub use merge::merge_into;
