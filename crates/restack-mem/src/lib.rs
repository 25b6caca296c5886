//! In-memory `StackProvider` backend.
//!
//! A scriptable simulated cloud: pre-provision stacks, stage outputs to
//! appear after a successful apply, script rejections and in-flight
//! failures, and inspect the exact calls (with parameter vectors) the
//! orchestration layer made. Used by the integration tests and as a
//! reference implementation of the provider trait.
mod provider;
pub use provider::{Call, MemoryProvider};
