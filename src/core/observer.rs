use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::core::SessionState;

type Callback = Arc<dyn Fn(&SessionState) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

/// Set of callbacks notified on every session state change.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    registry: Arc<Mutex<Registry>>,
}

impl Observers {
    pub(crate) fn register(&self, callback: Callback) -> Subscription {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.callbacks.insert(id, callback);

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    // Callbacks run outside the lock so they may unsubscribe themselves.
    pub(crate) fn notify(&self, state: &SessionState) {
        let callbacks: Vec<Callback> = self.registry.lock().callbacks.values().cloned().collect();
        for callback in callbacks {
            callback(state);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.lock().callbacks.len()
    }
}

/// Handle returned by subscribe. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes it"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().callbacks.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Subscription({})", self.id)
    }
}
