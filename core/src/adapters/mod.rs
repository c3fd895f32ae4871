//! Adapters layer - External system implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Each adapter handles communication with external systems.

pub mod killer;
pub mod process_table;
pub mod sockets;
pub mod user;

// Re-export main types for convenience
pub use killer::SignalKiller;
pub use process_table::SysinfoProcessTable;
pub use sockets::SocketScanner;
pub use user::current_username;
