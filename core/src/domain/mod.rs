//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod process;
mod view;

// Re-export all domain types
pub use process::{
    AppType, Classification, Connection, ConnectionState, ProcessRecord, ProcessSnapshot,
};
pub use view::{derive_rows, format_ports, SortKey, ViewParameters, ViewRow};
