//! Context extension for results

use super::types::{Error, Result};

/// Attach a message to the error of a `Result`
///
/// Ticket rejections pass through untouched so callers can still match on
/// them. Any other error is folded into [`Error::Configuration`] with the
/// message as a prefix.
pub trait ResultExt<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Like [`context`](ResultExt::context), building the message only on error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.with_context(|| message.into())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let error = e.into();
            if error.is_ticket_rejection() {
                error
            } else {
                Error::configuration(format!("{}: {error}", f()))
            }
        })
    }
}
