//! Writer actions: observers notified on every write
//!
//! The list is shared by every instance of a registry and read live on each
//! notification, so an observer added later also sees writes from instances
//! that already exist.

use std::sync::{Arc, PoisonError, RwLock};

/// Callback invoked after an entry has been appended to a buffer
///
/// Called synchronously on the thread that issued the log call, so
/// implementations must tolerate concurrent calls from several contexts.
pub trait WriteObserver: Send + Sync {
    /// `entry` is the formatted line (no trailing newline), `log` the
    /// instance's full buffer including that line.
    fn on_write(&self, entry: &str, log: &str);
}

impl<F> WriteObserver for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn on_write(&self, entry: &str, log: &str) {
        self(entry, log)
    }
}

/// Ordered, append-only list of write observers
#[derive(Clone, Default)]
pub struct WriterActions {
    actions: Arc<RwLock<Vec<Arc<dyn WriteObserver>>>>,
}

impl WriterActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer after all existing ones
    pub fn add(&self, observer: impl WriteObserver + 'static) {
        self.actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.actions
            .read()
            .map(|a| a.len())
            .unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every observer in registration order
    ///
    /// The list is cloned before calling out so an observer may register
    /// further observers (they take effect from the next write).
    pub fn notify(&self, entry: &str, log: &str) {
        let actions: Vec<Arc<dyn WriteObserver>> = self
            .actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for action in actions {
            action.on_write(entry, log);
        }
    }
}

impl std::fmt::Debug for WriterActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterActions")
            .field("len", &self.len())
            .finish()
    }
}
