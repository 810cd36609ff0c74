//! Bounded-concurrency batch execution
//!
//! Runs one handler future per request with at most
//! `max(8, 4 * available cores)` in flight, and reassembles the outcomes in
//! input order regardless of completion order. A batch either succeeds as a
//! whole or reports every failing index alongside the successes that did
//! complete, so one bad request never discards its siblings' results.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::error;

use taskwire_core::Error;

/// Failure modes of [`process_batch`]
#[derive(Debug)]
pub enum BatchError<T> {
    /// The input was empty; an empty batch is an invalid request, never a
    /// silent empty success
    Empty,
    /// Some requests failed; successes are preserved at their input index
    Partial {
        /// One slot per input, `Some` where the request succeeded
        results: Vec<Option<T>>,
        /// Failing input indices with their errors, ascending by index
        failures: Vec<(usize, Error)>,
    },
}

impl<T> std::fmt::Display for BatchError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Empty => write!(f, "invalid request: batch is empty"),
            BatchError::Partial { results, failures } => {
                let indices: Vec<usize> = failures.iter().map(|(i, _)| *i).collect();
                write!(
                    f,
                    "{} of {} batch requests failed (indices: {:?})",
                    failures.len(),
                    results.len(),
                    indices
                )
            }
        }
    }
}

impl<T: std::fmt::Debug> std::error::Error for BatchError<T> {}

/// Concurrency bound for a batch of `total` requests.
pub(crate) fn concurrency_bound(total: usize) -> usize {
    let parallelism = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    (parallelism * 4).max(8).min(total)
}

/// Run `handler` over every request with bounded concurrency.
///
/// Returns the responses in input order, or [`BatchError::Partial`] naming
/// every failing index while keeping the successful responses.
pub async fn process_batch<Req, Resp, F, Fut>(
    requests: Vec<Req>,
    handler: F,
) -> std::result::Result<Vec<Resp>, BatchError<Resp>>
where
    Req: Send + 'static,
    Resp: Send + 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = taskwire_core::Result<Resp>> + Send + 'static,
{
    if requests.is_empty() {
        return Err(BatchError::Empty);
    }

    let total = requests.len();
    let semaphore = Arc::new(Semaphore::new(concurrency_bound(total)));
    let handler = Arc::new(handler);

    let mut set = JoinSet::new();
    for (index, request) in requests.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let handler = Arc::clone(&handler);
        set.spawn(async move {
            // the semaphore is never closed while tasks run
            let _permit = semaphore.acquire_owned().await;
            (index, handler(request).await)
        });
    }

    let mut results: Vec<Option<Resp>> = (0..total).map(|_| None).collect();
    let mut failures: Vec<(usize, Error)> = Vec::new();

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(response))) => results[index] = Some(response),
            Ok((index, Err(e))) => failures.push((index, e)),
            Err(e) => error!(error = %e, "batch worker aborted"),
        }
    }

    // an aborted worker leaves its index with neither result nor failure
    for index in 0..total {
        if results[index].is_none() && !failures.iter().any(|(i, _)| *i == index) {
            failures.push((
                index,
                Error::InvalidResponse("batch worker aborted before completing".into()),
            ));
        }
    }

    if failures.is_empty() {
        Ok(results.into_iter().flatten().collect())
    } else {
        failures.sort_by_key(|(index, _)| *index);
        Err(BatchError::Partial { results, failures })
    }
}
