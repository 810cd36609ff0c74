//! Inbound frame routing
//!
//! Every text frame off the socket goes through [`handle_frame`]: first as a
//! data envelope, item by item to the registered callbacks, otherwise as an
//! error envelope. Frames matching neither shape are dropped, as are items
//! with no registered handler. A success delivery leaves the registry entry
//! in place (the waiter removes it at its expected count); an error delivery
//! removes the entry, since the service sends at most one error per task.

use taskwire_core::{DataEnvelope, ErrorEnvelope, ItemHeader, TaskResult};
use tracing::{debug, trace, warn};

use crate::registry::HandlerRegistry;

/// Route one raw text frame to the registered callbacks.
pub(crate) fn handle_frame(registry: &HandlerRegistry, raw: &str) {
    match serde_json::from_str::<DataEnvelope>(raw) {
        Ok(envelope) => {
            for item in &envelope.data {
                handle_item(registry, item);
            }
        }
        Err(_) => handle_error_frame(registry, raw),
    }
}

fn handle_item(registry: &HandlerRegistry, item: &serde_json::Value) {
    let header: ItemHeader = match serde_json::from_value(item.clone()) {
        Ok(header) => header,
        Err(_) => {
            trace!("dropping data item without routing header");
            return;
        }
    };
    if header.task_uuid.is_empty() {
        trace!("dropping data item with empty taskUUID");
        return;
    }

    let Some(callback) = registry.lookup(&header.task_uuid) else {
        debug!(task_uuid = %header.task_uuid, task_type = %header.task_type, "no handler for inbound item");
        return;
    };

    // Ok(None) tells the waiter an addressed item arrived but could not be
    // decoded, so it still counts toward the expected total.
    let result = TaskResult::decode(header.task_type, item);
    trace!(task_uuid = %header.task_uuid, task_type = %header.task_type, decoded = result.is_some(), "routing item");
    callback(Ok(result));
}

fn handle_error_frame(registry: &HandlerRegistry, raw: &str) {
    let envelope: ErrorEnvelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(_) => {
            trace!("dropping frame matching neither data nor error shape");
            return;
        }
    };

    for frame in envelope.into_frames() {
        if frame.is_empty() {
            trace!("dropping empty error frame");
            continue;
        }
        let task_uuid = frame.task_uuid.clone().unwrap_or_default();
        let api_error = frame.into_api_error(raw);

        if task_uuid.is_empty() {
            warn!(error = %api_error, "service error without task identifier");
            continue;
        }
        match registry.remove(&task_uuid) {
            Some(callback) => {
                debug!(task_uuid = %task_uuid, error = %api_error, "routing service error");
                callback(Err(api_error.into()));
            }
            None => {
                debug!(task_uuid = %task_uuid, "service error for unknown task");
            }
        }
    }
}
