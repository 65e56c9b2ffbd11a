//! Cache for facade objects.
//!
//! Channels and buses are cached by canonical id so that repeated
//! requests for the same descriptor return the same instance instead of
//! rebuilding streams every time. Entries are never evicted while the
//! store lives; facades hold no authoritative state, so rebuilding after
//! teardown is lossless.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Mutex;

/// Identity map from canonical facade id to the cached object
pub(crate) struct ObjectStore {
    store: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl ObjectStore {
    pub(crate) fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached facade for `id`, creating it on first request
    pub(crate) fn get_or_create<T, F>(&self, id: &str, create: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let mut store = self.store.lock().expect("mutex poisoned");
        if let Some(existing) = store.get(id).and_then(|b| b.downcast_ref::<T>()) {
            return existing.clone();
        }
        let value = create();
        store.insert(id.to_string(), Box::new(value.clone()));
        value
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.store.lock().expect("mutex poisoned").len()
    }
}
