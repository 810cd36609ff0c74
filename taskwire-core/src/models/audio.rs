//! Audio domain request and response types
//!
//! Audio tasks follow the same async acknowledge-then-poll flow as video.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{ResultCountProvider, TaskIdentifiable, TaskStatus, TaskType};

use super::shared::{DeliveryMethod, OutputType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AudioOutputFormat {
    Mp3,
}

/// Sample rate and bitrate overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
}

/// Parameters for an `audioInference` task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInferenceRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub positive_prompt: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_settings: Option<AudioSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<AudioOutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_cost: Option<bool>,
}

impl AudioInferenceRequest {
    /// Create a text-to-audio request with a fresh correlation identifier.
    ///
    /// Defaults to one MP3 result, URL output, async delivery.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, duration: u32) -> Self {
        Self {
            task_type: TaskType::AudioInference,
            task_uuid: Uuid::new_v4().to_string(),
            positive_prompt: prompt.into(),
            model: model.into(),
            duration: Some(duration),
            audio_settings: None,
            number_results: Some(1),
            output_type: Some(OutputType::Url),
            output_format: Some(AudioOutputFormat::Mp3),
            delivery_method: Some(DeliveryMethod::Async),
            include_cost: None,
        }
    }

    pub fn with_audio_settings(mut self, settings: AudioSettings) -> Self {
        self.audio_settings = Some(settings);
        self
    }

    pub fn with_number_results(mut self, count: u32) -> Self {
        self.number_results = Some(count);
        self
    }
}

impl TaskIdentifiable for AudioInferenceRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for AudioInferenceRequest {
    fn number_results(&self) -> Option<u32> {
        self.number_results
    }
}

/// Acknowledgement or final result of an audio task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioInferenceResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(rename = "audioUUID", skip_serializing_if = "Option::is_none")]
    pub audio_uuid: Option<String>,
    #[serde(rename = "audioURL", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_base64_data: Option<String>,
    #[serde(rename = "audioDataURI", skip_serializing_if = "Option::is_none")]
    pub audio_data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}
