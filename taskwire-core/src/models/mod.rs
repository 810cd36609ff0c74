//! Typed request and response models for every task kind
//!
//! Request constructors mint a fresh v4 UUID as the correlation identifier
//! and set the service's documented defaults. Optional fields use `Option`
//! and are omitted from the wire when unset.

mod audio;
mod image;
mod shared;
mod video;

pub use audio::{AudioInferenceRequest, AudioInferenceResponse, AudioOutputFormat, AudioSettings};
pub use image::{
    EnhancePromptRequest, EnhancePromptResponse, ImageCaptionRequest, ImageCaptionResponse,
    ImageInferenceRequest, ImageInferenceResponse, RemoveBackgroundRequest,
    RemoveBackgroundResponse, UploadImageRequest, UploadImageResponse, UpscaleRequest,
    UpscaleResponse,
};
pub use shared::{
    ControlMode, ControlNet, DeliveryMethod, Embedding, IpAdapter, Lora, Outpaint, OutputFormat,
    OutputType, PromptWeighting, Refiner, Safety, SafetyMode, Scheduler,
};
pub use video::{
    FrameImage, FramePosition, GetResponseRequest, VideoInferenceRequest, VideoInferenceResponse,
    VideoOutputFormat,
};
