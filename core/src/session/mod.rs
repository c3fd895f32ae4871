//! Interactive session state.
//!
//! [`Session`] owns the retained snapshot, the view parameters and the
//! input mode. It is mutated only by [`Session::handle`] and the
//! `apply_*` methods, one event at a time, and returns [`Command`]s for
//! the work it cannot do itself.

mod action;
mod mode;
mod notification;
mod state;

pub use action::{Action, Command};
pub use mode::InputMode;
pub use notification::{Notification, DEFAULT_NOTIFICATION_TTL};
pub use state::{Session, PAGE_SIZE};
