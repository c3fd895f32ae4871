//! portscope core library
//!
//! Process and network-port model behind the portscope dashboard.
//! Provides functionality to:
//! - Capture snapshots of every process with its sockets and resource usage
//! - Filter, sort, search and select processes through an explicit session
//!   state machine
//! - Kill processes by PID (gracefully or forcefully)
//! - Drive periodic refreshes from a single event loop
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models and view derivation
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: OS implementations of the ports
//! - `application`: Collector and terminator services
//! - `session`: Interactive state machine
//! - `engine`: Refresh loop and event channel
//!
//! # Platform Support
//! - Linux: process table via `sysinfo`, sockets via `ss`
//! - macOS: process table via `sysinfo`, sockets via `lsof`

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod session;

// Re-export domain types (primary API)
pub use domain::{
    derive_rows, format_ports, AppType, Classification, Connection, ConnectionState,
    ProcessRecord, ProcessSnapshot, SortKey, ViewParameters, ViewRow,
};

// Re-export other commonly used types
pub use application::{SnapshotCollector, SystemCollector, TerminationSummary, Terminator};
pub use config::{Config, ConfigStore, KillMode};
pub use engine::{Engine, EngineEvent, SystemEngine};
pub use error::{Error, Result};
pub use session::{Action, Command, InputMode, Session};
