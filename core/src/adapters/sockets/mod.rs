//! Socket table adapters.
//!
//! Platform-specific implementations of connection enumeration.

#[cfg(target_os = "macos")]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
mod unsupported;

mod utils;

use crate::error::{Error, Result};
use crate::ports::{ConnectionSource, SocketEntry};

/// The socket scanner that uses platform-specific implementations.
pub struct SocketScanner {
    #[cfg(target_os = "macos")]
    inner: darwin::DarwinScanner,

    #[cfg(target_os = "linux")]
    inner: linux::LinuxScanner,

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    inner: unsupported::UnsupportedScanner,
}

impl SocketScanner {
    /// Create a new socket scanner for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "macos")]
            inner: darwin::DarwinScanner::new(),

            #[cfg(target_os = "linux")]
            inner: linux::LinuxScanner::new(),

            #[cfg(not(any(target_os = "macos", target_os = "linux")))]
            inner: unsupported::UnsupportedScanner::new(),
        }
    }
}

impl Default for SocketScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSource for SocketScanner {
    async fn connections(&self) -> Result<Vec<SocketEntry>> {
        self.inner.scan().await.map_err(|e| match e {
            Error::UnsupportedPlatform(_) => e,
            other => Error::ConnectionEnumerationFailed(other.to_string()),
        })
    }
}

/// Internal trait for platform-specific implementations.
trait Scanner: Send + Sync {
    fn scan(&self) -> impl std::future::Future<Output = Result<Vec<SocketEntry>>> + Send;
}
