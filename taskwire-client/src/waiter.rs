//! Response waiting
//!
//! Bridges the router's synchronous callbacks to the async caller. For each
//! request a handler is built that counts deliveries on the correlation
//! identifier, forwards them over channels, and removes the registry entry
//! once the expected number of results has arrived. The waiter side then
//! accumulates results against a single wall-clock deadline covering the
//! whole fan-out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::trace;

use taskwire_core::{Error, Result, TaskResult, TaskType, TimeoutError};

use crate::registry::{HandlerRegistry, ResponseCallback};

/// Receiving side of a registered response handler
pub(crate) struct ResponseWaiter {
    result_rx: mpsc::UnboundedReceiver<Option<TaskResult>>,
    error_rx: mpsc::Receiver<Error>,
    registry: HandlerRegistry,
    // keeps the channel senders inside the callback alive for the whole
    // wait, even after the registry entry is removed
    _callback: ResponseCallback,
}

/// Build the callback for a request expecting `expected` results.
///
/// The callback removes its own registry entry when the final result
/// arrives; error deliveries are already removed by the router, and the
/// waiter removes the entry itself when its deadline passes.
pub(crate) fn make_handler(
    registry: HandlerRegistry,
    task_uuid: String,
    expected: usize,
) -> (ResponseCallback, ResponseWaiter) {
    let (result_tx, result_rx) = mpsc::unbounded_channel();
    let (error_tx, error_rx) = mpsc::channel(1);
    let received = AtomicUsize::new(0);
    let waiter_registry = registry.clone();

    let callback: ResponseCallback = Arc::new(move |delivery| match delivery {
        Ok(payload) => {
            let count = received.fetch_add(1, Ordering::SeqCst) + 1;
            if count >= expected {
                registry.remove(&task_uuid);
                trace!(task_uuid = %task_uuid, count, "final result received, handler removed");
            }
            let _ = result_tx.send(payload);
        }
        Err(e) => {
            // only the first error matters; the service sends at most one
            let _ = error_tx.try_send(e);
        }
    });

    let waiter = ResponseWaiter {
        result_rx,
        error_rx,
        registry: waiter_registry,
        _callback: Arc::clone(&callback),
    };
    (callback, waiter)
}

impl ResponseWaiter {
    /// Wait for `expected` results or fail with a service error or timeout.
    ///
    /// Undecodable deliveries count toward the expected total but do not
    /// appear in the returned results; if every delivery was undecodable
    /// the wait fails with `Error::InvalidResponse`.
    pub(crate) async fn wait(
        mut self,
        task_type: TaskType,
        task_uuid: &str,
        expected: usize,
        timeout: Duration,
    ) -> Result<Vec<TaskResult>> {
        let started = Instant::now();
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let mut results = Vec::with_capacity(expected);
        let mut received = 0usize;

        loop {
            tokio::select! {
                delivery = self.result_rx.recv() => {
                    // sender lives in _callback, recv never yields None here
                    if let Some(payload) = delivery {
                        received += 1;
                        if let Some(result) = payload {
                            results.push(result);
                        }
                        if received >= expected {
                            if results.is_empty() {
                                return Err(Error::InvalidResponse(format!(
                                    "no decodable results for {task_type} task {task_uuid}"
                                )));
                            }
                            return Ok(results);
                        }
                    }
                }
                error = self.error_rx.recv() => {
                    if let Some(e) = error {
                        return Err(e);
                    }
                }
                _ = &mut deadline => {
                    // reclaim the entry so a permanently silent service
                    // cannot grow the registry
                    self.registry.remove(task_uuid);
                    return Err(TimeoutError {
                        task_type: task_type.as_str().to_string(),
                        task_uuid: task_uuid.to_string(),
                        elapsed: started.elapsed(),
                        expected_count: expected,
                        received_count: received,
                    }
                    .into());
                }
            }
        }
    }
}
