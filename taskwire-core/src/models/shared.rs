//! Enums and parameter blocks shared across task domains

use serde::{Deserialize, Serialize};

/// How result media is referenced in responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputType {
    #[serde(rename = "URL")]
    Url,
    #[serde(rename = "base64Data")]
    Base64Data,
    #[serde(rename = "dataURI")]
    DataUri,
}

/// Image file format of generated results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpg,
    Png,
    Webp,
}

/// How the service delivers results for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Stream,
    Post,
    Async,
}

/// Content safety check mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyMode {
    Strict,
    Moderate,
    Relaxed,
}

/// Prompt weighting algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptWeighting {
    Compel,
    Sd,
}

/// Sampling scheduler identifiers accepted by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheduler {
    #[serde(rename = "euler")]
    Euler,
    #[serde(rename = "euler_a")]
    EulerA,
    #[serde(rename = "dpmpp_2m")]
    DpmPp2m,
    #[serde(rename = "dpmpp_2m_karras")]
    DpmPp2mKarras,
    #[serde(rename = "dpmpp_sde")]
    DpmPpSde,
    #[serde(rename = "dpmpp_sde_karras")]
    DpmPpSdeKarras,
    #[serde(rename = "lms")]
    Lms,
    #[serde(rename = "lms_karras")]
    LmsKarras,
    #[serde(rename = "heun")]
    Heun,
    #[serde(rename = "ddim")]
    Ddim,
    #[serde(rename = "pndm")]
    Pndm,
}

/// Content safety check parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Safety {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SafetyMode>,
}

/// Outpainting margins, in pixels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outpaint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<u32>,
}

/// Refiner model parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refiner {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_step_percentage: Option<f64>,
}

/// Embedding parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Embedding {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// LoRA parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lora {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// ControlNet control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    Balanced,
    Prompt,
    Control,
}

/// ControlNet parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlNet {
    pub model: String,
    pub guide_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_step_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_step_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_mode: Option<ControlMode>,
}

/// IP-Adapter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAdapter {
    pub model: String,
    pub guide_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}
