//! Correlation-keyed handler registry
//!
//! Maps in-flight correlation identifiers to the callbacks that receive
//! their results. The transport registers before it writes, the router
//! looks up on every inbound item, and whoever delivers the final result
//! removes the entry.
//!
//! The lock is a plain `std::sync::RwLock`: lookups dominate, holders never
//! await, and the guard never escapes a method.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use taskwire_core::{Result, TaskResult};

/// Callback invoked for every routed delivery on a correlation identifier
///
/// Receives `Ok(Some(result))` for a decoded payload, `Ok(None)` for an
/// item addressed to this identifier that could not be decoded, and
/// `Err(..)` for a service error. Callbacks run on the processing loop and
/// must not block; in practice they are channel sends.
pub type ResponseCallback = Arc<dyn Fn(Result<Option<TaskResult>>) + Send + Sync>;

/// Registry of pending requests, keyed by correlation identifier
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Arc<RwLock<HashMap<String, ResponseCallback>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for a correlation identifier.
    ///
    /// A second registration for the same identifier replaces the first;
    /// callers mint fresh UUIDs so this only happens for deliberate reuse
    /// (polling reuses the polled task's identifier).
    pub fn register(&self, task_uuid: impl Into<String>, callback: ResponseCallback) {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.insert(task_uuid.into(), callback);
    }

    /// Clone the callback registered for an identifier, if any.
    pub fn lookup(&self, task_uuid: &str) -> Option<ResponseCallback> {
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        handlers.get(task_uuid).cloned()
    }

    /// Remove and return the callback for an identifier.
    pub fn remove(&self, task_uuid: &str) -> Option<ResponseCallback> {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.remove(task_uuid)
    }

    /// Drop every entry. Used on disconnect so stale callbacks cannot fire
    /// after teardown.
    pub fn clear(&self) {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.clear();
    }

    pub fn len(&self) -> usize {
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callback(counter: Arc<AtomicUsize>) -> ResponseCallback {
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        registry.register("task-1", counting_callback(counter.clone()));

        assert_eq!(registry.len(), 1);
        let callback = registry.lookup("task-1").unwrap();
        callback(Ok(None));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        // lookup does not remove
        assert!(registry.lookup("task-1").is_some());
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let registry = HandlerRegistry::new();
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_remove_returns_callback_once() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));
        registry.register("task-1", counting_callback(counter));

        assert!(registry.remove("task-1").is_some());
        assert!(registry.remove("task-1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregister_replaces() {
        let registry = HandlerRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        registry.register("task-1", counting_callback(first.clone()));
        registry.register("task-1", counting_callback(second.clone()));
        assert_eq!(registry.len(), 1);

        registry.lookup("task-1").unwrap()(Ok(None));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_drops_all() {
        let registry = HandlerRegistry::new();
        for i in 0..5 {
            registry.register(format!("task-{i}"), Arc::new(|_| {}));
        }
        assert_eq!(registry.len(), 5);
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_register_and_remove() {
        let registry = HandlerRegistry::new();
        let mut threads = Vec::new();
        for i in 0..8 {
            let registry = registry.clone();
            threads.push(std::thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("task-{i}-{j}");
                    registry.register(key.clone(), Arc::new(|_| {}));
                    assert!(registry.remove(&key).is_some());
                }
            }));
        }
        for t in threads {
            t.join().unwrap();
        }
        assert!(registry.is_empty());
    }
}
