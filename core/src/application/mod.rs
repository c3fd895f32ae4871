//! Application layer - Use case services.
//!
//! Services are thin orchestrators that:
//! - Use ports (traits) for external dependencies
//! - Return domain types as outputs
//!
//! The `engine` module drives them from its event loop.

mod collector;
mod terminator;

pub use collector::{SnapshotCollector, SystemCollector, UNKNOWN_OWNER};
pub use terminator::{TerminationSummary, Terminator};
