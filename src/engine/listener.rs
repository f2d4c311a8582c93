//! Change notification for configuration mutations.

use parking_lot::Mutex;
use std::sync::Arc;

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Set { key: String },
    Added { key: String },
    Cleared { key: String },
    ClearedAll,
    Refreshed,
}

/// Observer invoked after every successful mutation.
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) {
        self(event)
    }
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: Mutex<Vec<Arc<dyn ChangeListener>>>,
}

impl ListenerRegistry {
    pub(crate) fn add(&self, listener: Arc<dyn ChangeListener>) {
        self.listeners.lock().push(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Notify every listener. The registry lock is released first so a listener
    /// may read the configuration or register another listener.
    pub(crate) fn notify(&self, event: ChangeEvent) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.on_change(&event);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry").field("listeners", &self.len()).finish()
    }
}
