//! Video domain request and response types
//!
//! Video tasks are acknowledged immediately and delivered asynchronously;
//! callers poll with `getResponse` until the task reaches a terminal status.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{ResultCountProvider, TaskIdentifiable, TaskStatus, TaskType};

use super::shared::{DeliveryMethod, Lora, OutputType, Safety};

/// Video container format of generated results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VideoOutputFormat {
    Mp4,
    Webm,
}

/// Anchor position of a guidance frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramePosition {
    First,
    Last,
}

/// A guidance frame pinned to the start or end of the clip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameImage {
    pub input_image: String,
    pub frame: FramePosition,
}

/// Parameters for a `videoInference` task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInferenceRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub positive_prompt: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(rename = "CFGScale", skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub frame_images: Vec<FrameImage>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub lora: Vec<Lora>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<VideoOutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety: Option<Safety>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_cost: Option<bool>,
}

impl VideoInferenceRequest {
    /// Create a text-to-video request with a fresh correlation identifier.
    ///
    /// Defaults to 1920x1080 at 30 fps, one result, URL output, async delivery.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::VideoInference,
            task_uuid: Uuid::new_v4().to_string(),
            positive_prompt: prompt.into(),
            model: model.into(),
            negative_prompt: None,
            width: Some(1920),
            height: Some(1080),
            duration: None,
            fps: Some(30),
            steps: None,
            seed: None,
            cfg_scale: None,
            frame_images: Vec::new(),
            lora: Vec::new(),
            number_results: Some(1),
            output_type: Some(OutputType::Url),
            output_format: None,
            delivery_method: Some(DeliveryMethod::Async),
            safety: None,
            include_cost: None,
        }
    }

    pub fn with_negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(prompt.into());
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Image-to-video: pin a source image as the first frame.
    pub fn with_first_frame(mut self, input_image: impl Into<String>) -> Self {
        self.frame_images.push(FrameImage {
            input_image: input_image.into(),
            frame: FramePosition::First,
        });
        self
    }

    pub fn with_last_frame(mut self, input_image: impl Into<String>) -> Self {
        self.frame_images.push(FrameImage {
            input_image: input_image.into(),
            frame: FramePosition::Last,
        });
        self
    }

    pub fn with_output_format(mut self, format: VideoOutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_number_results(mut self, count: u32) -> Self {
        self.number_results = Some(count);
        self
    }
}

impl TaskIdentifiable for VideoInferenceRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for VideoInferenceRequest {
    fn number_results(&self) -> Option<u32> {
        self.number_results
    }
}

/// Acknowledgement or final result of a video task
///
/// The first frame back only carries `status: processing`; the media fields
/// fill in once a `getResponse` poll observes the terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInferenceResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(rename = "videoUUID", skip_serializing_if = "Option::is_none")]
    pub video_uuid: Option<String>,
    #[serde(rename = "videoURL", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(rename = "thumbnailURL", skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Poll request for an asynchronously delivered task
///
/// Deliberately reuses the polled task's correlation identifier so the
/// service's reply routes back through the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
}

impl GetResponseRequest {
    pub fn new(task_uuid: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::GetResponse,
            task_uuid: task_uuid.into(),
        }
    }
}

impl TaskIdentifiable for GetResponseRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for GetResponseRequest {}
