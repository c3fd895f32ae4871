//! Invoking user's identity.

use crate::error::{Error, Result};

/// Name of the user running portscope, used to classify processes.
///
/// Looks up the real uid in the user database on Unix and falls back to the
/// `USER` / `USERNAME` environment variables elsewhere or when the lookup
/// fails.
pub fn current_username() -> Result<String> {
    #[cfg(unix)]
    {
        use nix::unistd::{Uid, User};
        use tracing::warn;

        match User::from_uid(Uid::current()) {
            Ok(Some(user)) => return Ok(user.name),
            Ok(None) => warn!(uid = %Uid::current(), "No passwd entry for current uid"),
            Err(e) => warn!(error = %e, "Failed to look up current user"),
        }
    }

    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.is_empty())
        .ok_or_else(|| Error::Config("Could not determine the current user".to_string()))
}
