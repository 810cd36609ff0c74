//! Wire framing for the task protocol
//!
//! Outbound traffic is always a single-element JSON array wrapping one task
//! object. Inbound traffic is either a data envelope (`{"data":[item...]}`)
//! where every item carries the `taskUUID`/`taskType` routing header, or an
//! error shape: a bare error object, or a list under `errors`.
//!
//! The error shape has two historical field spellings: the human message
//! lives in `error` or `message`, the machine code in `errorId` or `code`.
//! Both are accepted.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Error, Result};
use crate::task::TaskType;

/// Inbound success envelope
///
/// The `data` field is required: a frame without it is not a data envelope
/// and falls through to error-shape parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope {
    pub data: Vec<serde_json::Value>,
}

/// Routing header present on every data item
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemHeader {
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub task_type: TaskType,
}

/// One service error in either historical field spelling
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFrame {
    pub error: Option<String>,
    pub message: Option<String>,
    pub error_id: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "taskUUID")]
    pub task_uuid: Option<String>,
    pub task_type: Option<String>,
}

impl ErrorFrame {
    pub fn message(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("")
    }

    pub fn error_id(&self) -> &str {
        self.error_id
            .as_deref()
            .or(self.code.as_deref())
            .unwrap_or("")
    }

    /// Whether the frame carries any error information at all.
    ///
    /// A frame with neither message nor code is treated as unparseable
    /// rather than surfaced as an empty error.
    pub fn is_empty(&self) -> bool {
        self.message().is_empty() && self.error_id().is_empty()
    }

    /// Convert into the typed error handed to waiting callers.
    pub fn into_api_error(self, raw: &str) -> ApiError {
        ApiError {
            message: self.message().to_string(),
            error_id: self.error_id().to_string(),
            task_uuid: self.task_uuid.unwrap_or_default(),
            task_type: self.task_type.unwrap_or_default(),
            raw_response: raw.to_string(),
            timestamp: SystemTime::now(),
        }
    }
}

/// Inbound error envelope, in either shape the service emits
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorEnvelope {
    Many { errors: Vec<ErrorFrame> },
    One(ErrorFrame),
}

impl ErrorEnvelope {
    pub fn into_frames(self) -> Vec<ErrorFrame> {
        match self {
            ErrorEnvelope::Many { errors } => errors,
            ErrorEnvelope::One(frame) => vec![frame],
        }
    }
}

/// The authentication frame sent first on every new connection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthFrame<'a> {
    task_type: TaskType,
    api_key: &'a str,
}

/// Serialize a request as the single-element array the service expects.
pub fn encode_request_frame<T: Serialize>(request: &T) -> Result<String> {
    serde_json::to_string(&[request]).map_err(|e| Error::Serialization(e.to_string()))
}

/// Serialize the authentication frame for the given API key.
pub fn encode_auth_frame(api_key: &str) -> Result<String> {
    encode_request_frame(&AuthFrame {
        task_type: TaskType::Authentication,
        api_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_frame_is_single_element_array() {
        let frame = encode_request_frame(&json!({"taskType": "imageInference", "taskUUID": "x"}))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["taskUUID"], "x");
    }

    #[test]
    fn test_auth_frame_shape() {
        let frame = encode_auth_frame("secret-key").unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value[0]["taskType"], "authentication");
        assert_eq!(value[0]["apiKey"], "secret-key");
    }

    #[test]
    fn test_data_envelope_requires_data_field() {
        assert!(serde_json::from_str::<DataEnvelope>(r#"{"data":[{"a":1}]}"#).is_ok());
        // an error frame must not parse as a data envelope
        assert!(serde_json::from_str::<DataEnvelope>(r#"{"error":"bad key"}"#).is_err());
    }

    #[test]
    fn test_item_header_decodes_routing_fields() {
        let header: ItemHeader =
            serde_json::from_str(r#"{"taskUUID":"abc","taskType":"imageInference","extra":1}"#)
                .unwrap();
        assert_eq!(header.task_uuid, "abc");
        assert_eq!(header.task_type, TaskType::ImageInference);
    }

    #[test]
    fn test_error_frame_primary_field_spelling() {
        let raw = r#"{"error":"invalid key","errorId":"unauthorized","taskUUID":"abc"}"#;
        let frame: ErrorFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.message(), "invalid key");
        assert_eq!(frame.error_id(), "unauthorized");
        let api = frame.into_api_error(raw);
        assert_eq!(api.task_uuid, "abc");
        assert_eq!(api.raw_response, raw);
    }

    #[test]
    fn test_error_frame_alternate_field_spelling() {
        let raw = r#"{"message":"slow down","code":"rateLimitExceeded","taskType":"imageInference"}"#;
        let frame: ErrorFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.message(), "slow down");
        assert_eq!(frame.error_id(), "rateLimitExceeded");
        assert!(frame.into_api_error(raw).is_retryable());
    }

    #[test]
    fn test_error_frame_primary_wins_over_alternate() {
        let raw = r#"{"error":"primary","message":"secondary","errorId":"a","code":"b"}"#;
        let frame: ErrorFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.message(), "primary");
        assert_eq!(frame.error_id(), "a");
    }

    #[test]
    fn test_error_envelope_list_shape() {
        let raw = r#"{"errors":[{"error":"one"},{"error":"two"}]}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        let frames = envelope.into_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].message(), "one");
    }

    #[test]
    fn test_error_envelope_bare_shape() {
        let raw = r#"{"error":"bad key","errorId":"unauthorized"}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(raw).unwrap();
        let frames = envelope.into_frames();
        assert_eq!(frames.len(), 1);
        assert!(!frames[0].is_empty());
    }

    #[test]
    fn test_empty_error_frame_detected() {
        let frame: ErrorFrame = serde_json::from_str(r#"{"somethingElse":1}"#).unwrap();
        assert!(frame.is_empty());
    }
}
