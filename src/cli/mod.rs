//! Commands behind the `nexus-cli` binary.

pub mod ask;
pub mod chat;
pub mod error;
pub mod telegram;

pub use error::CliError;

use crate::stream::CancelToken;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

pub trait CallableTrait {
    fn call(&self) -> Result<(), CliError>;
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))
}

/// The process-wide Ctrl-C listener. A press cancels the tracked send, or
/// wakes [`Interrupts::idle`] when nothing is in flight.
pub(crate) struct Interrupts {
    in_flight: Mutex<Option<CancelToken>>,
    idle: Notify,
}

impl Interrupts {
    fn new() -> Self {
        Self {
            in_flight: Mutex::new(None),
            idle: Notify::new(),
        }
    }

    /// Install the listener. Must run inside the command's runtime.
    pub(crate) fn listen() -> Arc<Self> {
        let interrupts = Arc::new(Self::new());
        let listener = interrupts.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                listener.interrupt();
            }
        });
        interrupts
    }

    pub(crate) fn track(&self, cancel: &CancelToken) {
        if let Ok(mut slot) = self.in_flight.lock() {
            *slot = Some(cancel.clone());
        }
    }

    pub(crate) fn clear(&self) {
        if let Ok(mut slot) = self.in_flight.lock() {
            *slot = None;
        }
    }

    /// Resolves on a Ctrl-C that arrived while no send was tracked.
    pub(crate) async fn idle(&self) {
        self.idle.notified().await
    }

    fn interrupt(&self) {
        let in_flight = self.in_flight.lock().ok().and_then(|mut slot| slot.take());
        match in_flight {
            Some(cancel) => cancel.cancel(),
            None => self.idle.notify_one(),
        }
    }
}
