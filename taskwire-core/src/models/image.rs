//! Image domain request and response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{ResultCountProvider, TaskIdentifiable, TaskType};

use super::shared::{
    ControlNet, Embedding, IpAdapter, Lora, Outpaint, OutputFormat, OutputType, PromptWeighting,
    Refiner, Safety, Scheduler,
};

/// Parameters for an `imageInference` task
///
/// Covers text-to-image, image-to-image (`seed_image` + `strength`),
/// inpainting (`mask_image`) and outpainting (`outpaint`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInferenceRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub positive_prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mask_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outpaint: Option<Outpaint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<Scheduler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(rename = "CFGScale", skip_serializing_if = "Option::is_none")]
    pub cfg_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_weighting: Option<PromptWeighting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vae: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refiner: Option<Refiner>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embeddings: Vec<Embedding>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub control_net: Vec<ControlNet>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub lora: Vec<Lora>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ip_adapters: Vec<IpAdapter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety: Option<Safety>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_cost: Option<bool>,
}

impl ImageInferenceRequest {
    /// Create a text-to-image request with a fresh correlation identifier.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            task_type: TaskType::ImageInference,
            task_uuid: Uuid::new_v4().to_string(),
            positive_prompt: prompt.into(),
            model: model.into(),
            width,
            height,
            negative_prompt: None,
            seed_image: None,
            mask_image: None,
            strength: None,
            outpaint: None,
            steps: None,
            scheduler: None,
            seed: None,
            cfg_scale: None,
            clip_skip: None,
            prompt_weighting: None,
            number_results: None,
            output_type: None,
            output_format: None,
            vae: None,
            refiner: None,
            embeddings: Vec::new(),
            control_net: Vec::new(),
            lora: Vec::new(),
            ip_adapters: Vec::new(),
            safety: None,
            include_cost: None,
        }
    }

    pub fn with_negative_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(prompt.into());
        self
    }

    /// Image-to-image: transform `seed_image` with the given denoise strength.
    pub fn with_seed_image(mut self, image: impl Into<String>, strength: f64) -> Self {
        self.seed_image = Some(image.into());
        self.strength = Some(strength);
        self
    }

    /// Inpainting: regenerate only the masked region of the seed image.
    pub fn with_mask_image(mut self, mask: impl Into<String>) -> Self {
        self.mask_image = Some(mask.into());
        self
    }

    pub fn with_outpaint(mut self, outpaint: Outpaint) -> Self {
        self.outpaint = Some(outpaint);
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cfg_scale(mut self, scale: f64) -> Self {
        self.cfg_scale = Some(scale);
        self
    }

    pub fn with_number_results(mut self, count: u32) -> Self {
        self.number_results = Some(count);
        self
    }

    pub fn with_output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_lora(mut self, lora: Lora) -> Self {
        self.lora.push(lora);
        self
    }

    pub fn with_control_net(mut self, control_net: ControlNet) -> Self {
        self.control_net.push(control_net);
        self
    }

    pub fn with_refiner(mut self, refiner: Refiner) -> Self {
        self.refiner = Some(refiner);
        self
    }

    pub fn with_safety(mut self, safety: Safety) -> Self {
        self.safety = Some(safety);
        self
    }
}

impl TaskIdentifiable for ImageInferenceRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for ImageInferenceRequest {
    fn number_results(&self) -> Option<u32> {
        self.number_results
    }
}

/// One generated image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInferenceResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(rename = "imageUUID")]
    pub image_uuid: String,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64_data: Option<String>,
    #[serde(rename = "imageDataURI", skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(rename = "NSFWContent", skip_serializing_if = "Option::is_none")]
    pub nsfw_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Parameters for an `imageUpload` task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(rename = "imageDataURI", skip_serializing_if = "Option::is_none")]
    pub image_data_uri: Option<String>,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl UploadImageRequest {
    pub fn new() -> Self {
        Self {
            task_type: TaskType::ImageUpload,
            task_uuid: Uuid::new_v4().to_string(),
            image_base64: None,
            image_data_uri: None,
            image_url: None,
        }
    }

    pub fn with_base64(mut self, data: impl Into<String>) -> Self {
        self.image_base64 = Some(data.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

impl Default for UploadImageRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskIdentifiable for UploadImageRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for UploadImageRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(rename = "imageUUID")]
    pub image_uuid: String,
}

/// Parameters for an `imageUpscale` task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub input_image: String,
    pub upscale_factor: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_cost: Option<bool>,
}

impl UpscaleRequest {
    pub fn new(input_image: impl Into<String>, upscale_factor: u32) -> Self {
        Self {
            task_type: TaskType::ImageUpscale,
            task_uuid: Uuid::new_v4().to_string(),
            input_image: input_image.into(),
            upscale_factor,
            output_type: None,
            output_format: None,
            include_cost: None,
        }
    }
}

impl TaskIdentifiable for UpscaleRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for UpscaleRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpscaleResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(rename = "imageUUID")]
    pub image_uuid: String,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Parameters for an `imageBackgroundRemoval` task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBackgroundRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub input_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_type: Option<OutputType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub rgba: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_cost: Option<bool>,
}

impl RemoveBackgroundRequest {
    pub fn new(input_image: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::ImageBackgroundRemoval,
            task_uuid: Uuid::new_v4().to_string(),
            input_image: input_image.into(),
            output_type: None,
            output_format: None,
            rgba: Vec::new(),
            include_cost: None,
        }
    }
}

impl TaskIdentifiable for RemoveBackgroundRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for RemoveBackgroundRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveBackgroundResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    #[serde(rename = "imageUUID")]
    pub image_uuid: String,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Parameters for a `promptEnhance` task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancePromptRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_max_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_versions: Option<u32>,
}

impl EnhancePromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::PromptEnhance,
            task_uuid: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            prompt_max_length: None,
            prompt_versions: None,
        }
    }

    pub fn with_max_length(mut self, length: u32) -> Self {
        self.prompt_max_length = Some(length);
        self
    }

    pub fn with_versions(mut self, versions: u32) -> Self {
        self.prompt_versions = Some(versions);
        self
    }
}

impl TaskIdentifiable for EnhancePromptRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for EnhancePromptRequest {
    // promptVersions controls fan-out for this task kind
    fn number_results(&self) -> Option<u32> {
        self.prompt_versions
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancePromptResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Parameters for an `imageCaption` task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCaptionRequest {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub input_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_cost: Option<bool>,
}

impl ImageCaptionRequest {
    pub fn new(input_image: impl Into<String>) -> Self {
        Self {
            task_type: TaskType::ImageCaption,
            task_uuid: Uuid::new_v4().to_string(),
            input_image: input_image.into(),
            include_cost: None,
        }
    }
}

impl TaskIdentifiable for ImageCaptionRequest {
    fn task_uuid(&self) -> &str {
        &self.task_uuid
    }
    fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl ResultCountProvider for ImageCaptionRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCaptionResponse {
    pub task_type: TaskType,
    #[serde(rename = "taskUUID")]
    pub task_uuid: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}
