//! Fallback socket scanner for platforms without an implementation.

use crate::error::{Error, Result};
use crate::ports::SocketEntry;

use super::Scanner;

/// Scanner that always reports the platform as unsupported.
pub struct UnsupportedScanner;

impl UnsupportedScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnsupportedScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for UnsupportedScanner {
    async fn scan(&self) -> Result<Vec<SocketEntry>> {
        Err(Error::UnsupportedPlatform(format!(
            "socket enumeration is not implemented for {}",
            std::env::consts::OS
        )))
    }
}
