//! Notification sink trait and the two built-in sinks.

use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifyError {
    #[error("chat {chat_id} unreachable: {reason}")]
    Unreachable { chat_id: i64, reason: String },

    #[error("notification transport error: {0}")]
    Transport(String),
}

/// Delivers human-readable messages to a chat.
pub trait Notifier: Send + Sync {
    fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
}

/// Writes messages to the log. Default when no chat transport is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        info!(chat_id, "{text}");
        Ok(())
    }
}

/// Prints messages to stdout, for interactive CLI use.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn send(&self, _chat_id: i64, text: &str) -> Result<(), NotifyError> {
        println!("{text}");
        Ok(())
    }
}
