//! Observable controller state.

use crate::{SyncError, SyncResult};
use tokio::sync::watch;
use tracing::warn;

/// Controller data plus the status of the operations running against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked<T> {
    pub data: T,
    /// True while at least one operation is in flight.
    pub loading: bool,
    /// Message for the most recent failure; cleared by the next success.
    pub last_error: Option<String>,
    in_flight: usize,
}

impl<T> Tracked<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            loading: false,
            last_error: None,
            in_flight: 0,
        }
    }
}

pub(crate) struct StateCell<T> {
    tx: watch::Sender<Tracked<T>>,
}

impl<T: Clone> StateCell<T> {
    pub(crate) fn new(data: T) -> Self {
        let (tx, _rx) = watch::channel(Tracked::new(data));
        Self { tx }
    }

    pub(crate) fn snapshot(&self) -> Tracked<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow().data)
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Tracked<T>> {
        self.tx.subscribe()
    }

    pub(crate) fn begin(&self) {
        self.tx.send_modify(|state| {
            state.in_flight += 1;
            state.loading = true;
        });
    }

    pub(crate) fn finish<V>(
        &self,
        action: &str,
        result: &SyncResult<V>,
        apply: impl FnOnce(&mut T, &V),
    ) {
        self.finish_where(action, result, |_| true, apply);
    }

    /// End an operation begun with [`begin`](Self::begin). The result is
    /// merged only if `applies` still holds for the current data.
    pub(crate) fn finish_where<V>(
        &self,
        action: &str,
        result: &SyncResult<V>,
        applies: impl FnOnce(&T) -> bool,
        apply: impl FnOnce(&mut T, &V),
    ) {
        self.tx.send_modify(|state| {
            state.in_flight = state.in_flight.saturating_sub(1);
            state.loading = state.in_flight > 0;
            if !applies(&state.data) {
                return;
            }
            match result {
                Ok(value) => {
                    apply(&mut state.data, value);
                    state.last_error = None;
                }
                Err(e) => {
                    warn!(action = %action, error = %e, "Operation failed");
                    state.last_error = Some(e.user_message(action));
                }
            }
        });
    }

    /// Record an error raised before any request was sent.
    pub(crate) fn reject(&self, action: &str, error: &SyncError) {
        self.tx.send_modify(|state| {
            state.last_error = Some(error.user_message(action));
        });
    }

    /// Replace the data and forget the last error.
    pub(crate) fn reset(&self, data: T) {
        self.tx.send_modify(|state| {
            state.data = data;
            state.last_error = None;
        });
    }
}
