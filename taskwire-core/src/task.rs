//! Task kinds, statuses, and the capabilities the transport needs
//!
//! Every request the client sends carries two routing fields: `taskType`
//! (which operation) and `taskUUID` (which in-flight request). The transport
//! only cares about those two, so requests expose them through the
//! [`TaskIdentifiable`] capability rather than a concrete type. Fan-out
//! requests additionally expose their requested result count through
//! [`ResultCountProvider`].

use serde::{Deserialize, Serialize};

use crate::models::{
    AudioInferenceResponse, EnhancePromptResponse, ImageCaptionResponse, ImageInferenceResponse,
    RemoveBackgroundResponse, UploadImageResponse, UpscaleResponse, VideoInferenceResponse,
};

/// Wire-level task kind discriminator
///
/// Serializes to the exact strings the service expects (`imageInference`,
/// `getResponse`, ...). Unrecognized kinds decode to `Unknown` so a newer
/// server cannot break frame routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskType {
    Authentication,
    ImageInference,
    VideoInference,
    AudioInference,
    PromptEnhance,
    ImageCaption,
    ImageUpload,
    ImageUpscale,
    ImageBackgroundRemoval,
    GetResponse,
    #[serde(other)]
    Unknown,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Authentication => "authentication",
            TaskType::ImageInference => "imageInference",
            TaskType::VideoInference => "videoInference",
            TaskType::AudioInference => "audioInference",
            TaskType::PromptEnhance => "promptEnhance",
            TaskType::ImageCaption => "imageCaption",
            TaskType::ImageUpload => "imageUpload",
            TaskType::ImageUpscale => "imageUpscale",
            TaskType::ImageBackgroundRemoval => "imageBackgroundRemoval",
            TaskType::GetResponse => "getResponse",
            TaskType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an asynchronously delivered task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Success,
    Error,
}

/// Routing capability every request type implements
///
/// The transport registers callbacks and addresses frames purely through
/// these two accessors.
pub trait TaskIdentifiable {
    /// Correlation identifier, minted by the request constructor
    fn task_uuid(&self) -> &str;
    /// Which operation this request performs
    fn task_type(&self) -> TaskType;
}

/// Capability for requests that can fan out into several results
///
/// `None` means the request produces exactly one result.
pub trait ResultCountProvider {
    fn number_results(&self) -> Option<u32> {
        None
    }
}

/// A successfully decoded result payload, tagged by task kind
///
/// The router decodes each inbound item into one of these based on the
/// item's `taskType` before handing it to the registered callback.
#[derive(Debug, Clone)]
pub enum TaskResult {
    Image(ImageInferenceResponse),
    Video(VideoInferenceResponse),
    Audio(AudioInferenceResponse),
    PromptEnhance(EnhancePromptResponse),
    Caption(ImageCaptionResponse),
    Upload(UploadImageResponse),
    Upscale(UpscaleResponse),
    BackgroundRemoval(RemoveBackgroundResponse),
}

impl TaskResult {
    /// Decode a single `data` item into a typed result.
    ///
    /// Returns `None` for unknown kinds or when the payload does not match
    /// the expected shape; the caller treats that as an undecodable item,
    /// not an error.
    ///
    /// `getResponse` items carry whatever payload the polled task produced,
    /// so the media kind is sniffed from the fields present.
    pub fn decode(kind: TaskType, value: &serde_json::Value) -> Option<TaskResult> {
        match kind {
            TaskType::ImageInference => from_value(value).map(TaskResult::Image),
            TaskType::VideoInference => from_value(value).map(TaskResult::Video),
            TaskType::AudioInference => from_value(value).map(TaskResult::Audio),
            TaskType::PromptEnhance => from_value(value).map(TaskResult::PromptEnhance),
            TaskType::ImageCaption => from_value(value).map(TaskResult::Caption),
            TaskType::ImageUpload => from_value(value).map(TaskResult::Upload),
            TaskType::ImageUpscale => from_value(value).map(TaskResult::Upscale),
            TaskType::ImageBackgroundRemoval => from_value(value).map(TaskResult::BackgroundRemoval),
            TaskType::GetResponse => {
                let is_audio = value.get("audioUUID").is_some()
                    || value.get("audioURL").is_some()
                    || value.get("audioBase64Data").is_some();
                if is_audio {
                    from_value(value).map(TaskResult::Audio)
                } else {
                    from_value(value).map(TaskResult::Video)
                }
            }
            TaskType::Authentication | TaskType::Unknown => None,
        }
    }

    pub fn into_image(self) -> Option<ImageInferenceResponse> {
        match self {
            TaskResult::Image(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_video(self) -> Option<VideoInferenceResponse> {
        match self {
            TaskResult::Video(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_audio(self) -> Option<AudioInferenceResponse> {
        match self {
            TaskResult::Audio(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_prompt_enhance(self) -> Option<EnhancePromptResponse> {
        match self {
            TaskResult::PromptEnhance(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_caption(self) -> Option<ImageCaptionResponse> {
        match self {
            TaskResult::Caption(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_upload(self) -> Option<UploadImageResponse> {
        match self {
            TaskResult::Upload(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_upscale(self) -> Option<UpscaleResponse> {
        match self {
            TaskResult::Upscale(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_background_removal(self) -> Option<RemoveBackgroundResponse> {
        match self {
            TaskResult::BackgroundRemoval(r) => Some(r),
            _ => None,
        }
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: &serde_json::Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_type_wire_names() {
        let cases = [
            (TaskType::Authentication, "\"authentication\""),
            (TaskType::ImageInference, "\"imageInference\""),
            (TaskType::VideoInference, "\"videoInference\""),
            (TaskType::AudioInference, "\"audioInference\""),
            (TaskType::PromptEnhance, "\"promptEnhance\""),
            (TaskType::ImageCaption, "\"imageCaption\""),
            (TaskType::ImageUpload, "\"imageUpload\""),
            (TaskType::ImageUpscale, "\"imageUpscale\""),
            (TaskType::ImageBackgroundRemoval, "\"imageBackgroundRemoval\""),
            (TaskType::GetResponse, "\"getResponse\""),
        ];
        for (kind, wire) in cases {
            assert_eq!(serde_json::to_string(&kind).unwrap(), wire);
            assert_eq!(serde_json::from_str::<TaskType>(wire).unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_task_type_does_not_fail_decode() {
        let kind: TaskType = serde_json::from_str("\"brandNewTask\"").unwrap();
        assert_eq!(kind, TaskType::Unknown);
    }

    #[test]
    fn test_task_status_wire_names() {
        assert_eq!(serde_json::to_string(&TaskStatus::Processing).unwrap(), "\"processing\"");
        assert_eq!(
            serde_json::from_str::<TaskStatus>("\"success\"").unwrap(),
            TaskStatus::Success
        );
    }

    #[test]
    fn test_decode_image_result() {
        let value = json!({
            "taskType": "imageInference",
            "taskUUID": "abc",
            "imageUUID": "img-1",
            "imageURL": "https://example.com/img.png",
            "seed": 42
        });
        let result = TaskResult::decode(TaskType::ImageInference, &value).unwrap();
        let image = result.into_image().unwrap();
        assert_eq!(image.task_uuid, "abc");
        assert_eq!(image.image_url.as_deref(), Some("https://example.com/img.png"));
        assert_eq!(image.seed, Some(42));
    }

    #[test]
    fn test_decode_mismatched_shape_yields_none() {
        // imageUUID is required on image results
        let value = json!({"taskType": "imageInference", "taskUUID": "abc"});
        assert!(TaskResult::decode(TaskType::ImageInference, &value).is_none());
    }

    #[test]
    fn test_decode_unknown_kind_yields_none() {
        let value = json!({"taskUUID": "abc"});
        assert!(TaskResult::decode(TaskType::Unknown, &value).is_none());
    }

    #[test]
    fn test_get_response_sniffs_audio() {
        let value = json!({
            "taskType": "getResponse",
            "taskUUID": "abc",
            "status": "success",
            "audioUUID": "aud-1",
            "audioURL": "https://example.com/a.mp3"
        });
        let result = TaskResult::decode(TaskType::GetResponse, &value).unwrap();
        assert!(matches!(result, TaskResult::Audio(_)));
    }

    #[test]
    fn test_get_response_defaults_to_video() {
        let value = json!({
            "taskType": "getResponse",
            "taskUUID": "abc",
            "status": "success",
            "videoUUID": "vid-1",
            "videoURL": "https://example.com/v.mp4"
        });
        let result = TaskResult::decode(TaskType::GetResponse, &value).unwrap();
        let video = result.into_video().unwrap();
        assert_eq!(video.status, Some(TaskStatus::Success));
        assert_eq!(video.video_uuid.as_deref(), Some("vid-1"));
    }
}
