//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `adapters`.

mod connections;
mod killer;
mod process_table;

pub use connections::{ConnectionSource, SocketEntry};
pub use killer::ProcessKillerPort;
pub use process_table::{ProcessTable, RawProcess};
