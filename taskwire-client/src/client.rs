//! High-level client for the task-processing service
//!
//! Wraps the transport with typed task methods: each call registers a
//! response handler, writes the request, and waits for the expected number
//! of results under the configured request timeout. The client is cheap to
//! clone and safe to share; every clone multiplexes over the same
//! connection.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Serialize;

use taskwire_core::models::{
    AudioInferenceRequest, AudioInferenceResponse, EnhancePromptRequest, EnhancePromptResponse,
    GetResponseRequest, ImageCaptionRequest, ImageCaptionResponse, ImageInferenceRequest,
    ImageInferenceResponse, RemoveBackgroundRequest, RemoveBackgroundResponse,
    UploadImageRequest, UploadImageResponse, UpscaleRequest, UpscaleResponse,
    VideoInferenceRequest, VideoInferenceResponse,
};
use taskwire_core::{Error, Result, ResultCountProvider, TaskIdentifiable, TaskResult};

use crate::batch::{process_batch, BatchError};
use crate::config::ClientConfig;
use crate::transport::WsTransport;
use crate::waiter::make_handler;

/// Client for the task-processing service
#[derive(Clone)]
pub struct Client {
    transport: Arc<WsTransport>,
    request_timeout: Duration,
}

impl Client {
    /// Build a client from configuration.
    ///
    /// Fails with `Error::InvalidApiKey` when no key is configured and none
    /// is present in the environment. Does not connect; call [`connect`].
    ///
    /// [`connect`]: Client::connect
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let transport = WsTransport::new(config.ws, api_key);
        Ok(Self {
            transport,
            request_timeout: config.request_timeout,
        })
    }

    pub async fn connect(&self) -> Result<()> {
        self.transport.connect().await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.transport.disconnect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.transport.is_connected().await
    }

    /// Send a request and wait for all of its results.
    ///
    /// The expected result count comes from the request's `numberResults`
    /// (default 1); the wait is bounded by the configured request timeout.
    pub async fn send_request<R>(&self, request: &R) -> Result<Vec<TaskResult>>
    where
        R: Serialize + TaskIdentifiable + ResultCountProvider,
    {
        self.send_request_with_timeout(request, self.request_timeout)
            .await
    }

    pub(crate) async fn send_request_with_timeout<R>(
        &self,
        request: &R,
        timeout: Duration,
    ) -> Result<Vec<TaskResult>>
    where
        R: Serialize + TaskIdentifiable + ResultCountProvider,
    {
        let expected = request.number_results().unwrap_or(1).max(1) as usize;
        let task_uuid = request.task_uuid().to_string();

        let (callback, waiter) = make_handler(
            self.transport.registry().clone(),
            task_uuid.clone(),
            expected,
        );
        self.transport.send(request, callback).await?;
        waiter
            .wait(request.task_type(), &task_uuid, expected, timeout)
            .await
    }

    // --- image ---

    /// Run an image inference task and return every generated image.
    pub async fn image_inference(
        &self,
        request: ImageInferenceRequest,
    ) -> Result<Vec<ImageInferenceResponse>> {
        let results = self.send_request(&request).await?;
        extract_all(results, TaskResult::into_image, "imageInference")
    }

    /// Run many image inference tasks with bounded concurrency.
    pub async fn image_inference_batch(
        &self,
        requests: Vec<ImageInferenceRequest>,
    ) -> std::result::Result<
        Vec<Vec<ImageInferenceResponse>>,
        BatchError<Vec<ImageInferenceResponse>>,
    > {
        let client = self.clone();
        process_batch(requests, move |request| {
            let client = client.clone();
            async move { client.image_inference(request).await }
        })
        .await
    }

    /// Text-to-image convenience wrapper returning the first image.
    pub async fn text_to_image(
        &self,
        prompt: impl Into<String>,
        model: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<ImageInferenceResponse> {
        let request = ImageInferenceRequest::new(prompt, model, width, height);
        let results = self.send_request(&request).await?;
        extract_first(results, TaskResult::into_image, "imageInference")
    }

    pub async fn upload_image(&self, request: UploadImageRequest) -> Result<UploadImageResponse> {
        let results = self.send_request(&request).await?;
        extract_first(results, TaskResult::into_upload, "imageUpload")
    }

    /// Read a local file, base64-encode it, and upload it.
    pub async fn upload_image_from_file(&self, path: impl AsRef<Path>) -> Result<UploadImageResponse> {
        let bytes = tokio::fs::read(path.as_ref())
            .await
            .map_err(|e| Error::InvalidRequest(format!("cannot read image file: {e}")))?;
        let request = UploadImageRequest::new().with_base64(BASE64.encode(bytes));
        self.upload_image(request).await
    }

    pub async fn upload_image_from_url(&self, url: impl Into<String>) -> Result<UploadImageResponse> {
        self.upload_image(UploadImageRequest::new().with_url(url)).await
    }

    pub async fn upscale_image(&self, request: UpscaleRequest) -> Result<UpscaleResponse> {
        let results = self.send_request(&request).await?;
        extract_first(results, TaskResult::into_upscale, "imageUpscale")
    }

    pub async fn remove_background(
        &self,
        request: RemoveBackgroundRequest,
    ) -> Result<RemoveBackgroundResponse> {
        let results = self.send_request(&request).await?;
        extract_first(results, TaskResult::into_background_removal, "imageBackgroundRemoval")
    }

    /// Enhance a prompt; returns one variant per requested version.
    pub async fn enhance_prompt(
        &self,
        request: EnhancePromptRequest,
    ) -> Result<Vec<EnhancePromptResponse>> {
        let results = self.send_request(&request).await?;
        extract_all(results, TaskResult::into_prompt_enhance, "promptEnhance")
    }

    pub async fn caption_image(&self, request: ImageCaptionRequest) -> Result<ImageCaptionResponse> {
        let results = self.send_request(&request).await?;
        extract_first(results, TaskResult::into_caption, "imageCaption")
    }

    // --- video ---

    /// Submit a video task; the returned response is the acknowledgement.
    ///
    /// Video is delivered asynchronously: follow up with
    /// [`poll_video_result`] until the task reaches a terminal status.
    ///
    /// [`poll_video_result`]: Client::poll_video_result
    pub async fn video_inference(
        &self,
        request: VideoInferenceRequest,
    ) -> Result<VideoInferenceResponse> {
        let results = self.send_request(&request).await?;
        extract_first(results, TaskResult::into_video, "videoInference")
    }

    pub async fn video_inference_batch(
        &self,
        requests: Vec<VideoInferenceRequest>,
    ) -> std::result::Result<Vec<VideoInferenceResponse>, BatchError<VideoInferenceResponse>> {
        let client = self.clone();
        process_batch(requests, move |request| {
            let client = client.clone();
            async move { client.video_inference(request).await }
        })
        .await
    }

    pub async fn text_to_video(
        &self,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<VideoInferenceResponse> {
        self.video_inference(VideoInferenceRequest::new(prompt, model)).await
    }

    pub async fn image_to_video(
        &self,
        input_image: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<VideoInferenceResponse> {
        let request = VideoInferenceRequest::new(prompt, model).with_first_frame(input_image);
        self.video_inference(request).await
    }

    // --- audio ---

    /// Submit an audio task; the returned response is the acknowledgement.
    pub async fn audio_inference(
        &self,
        request: AudioInferenceRequest,
    ) -> Result<AudioInferenceResponse> {
        let results = self.send_request(&request).await?;
        extract_first(results, TaskResult::into_audio, "audioInference")
    }

    pub async fn text_to_audio(
        &self,
        prompt: impl Into<String>,
        model: impl Into<String>,
        duration: u32,
    ) -> Result<AudioInferenceResponse> {
        self.audio_inference(AudioInferenceRequest::new(prompt, model, duration)).await
    }

    // --- polling ---

    /// Poll once for the current state of an async task.
    pub async fn get_response(&self, task_uuid: &str) -> Result<TaskResult> {
        self.get_response_with_timeout(task_uuid, self.request_timeout).await
    }

    pub(crate) async fn get_response_with_timeout(
        &self,
        task_uuid: &str,
        timeout: Duration,
    ) -> Result<TaskResult> {
        let request = GetResponseRequest::new(task_uuid);
        let mut results = self.send_request_with_timeout(&request, timeout).await?;
        if results.is_empty() {
            // unreachable: the waiter fails instead of returning empty
            return Err(Error::InvalidResponse(format!(
                "empty poll response for task {task_uuid}"
            )));
        }
        Ok(results.swap_remove(0))
    }
}

fn extract_all<T>(
    results: Vec<TaskResult>,
    extract: fn(TaskResult) -> Option<T>,
    kind: &str,
) -> Result<Vec<T>> {
    let extracted: Vec<T> = results.into_iter().filter_map(extract).collect();
    if extracted.is_empty() {
        return Err(Error::InvalidResponse(format!(
            "unexpected payload kind for {kind} task"
        )));
    }
    Ok(extracted)
}

fn extract_first<T>(
    results: Vec<TaskResult>,
    extract: fn(TaskResult) -> Option<T>,
    kind: &str,
) -> Result<T> {
    results.into_iter().find_map(extract).ok_or_else(|| {
        Error::InvalidResponse(format!("unexpected payload kind for {kind} task"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskwire_core::TaskType;

    fn offline_client() -> Client {
        let config = ClientConfig::new("test-key").with_url("ws://127.0.0.1:1");
        Client::new(config).unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let result = Client::new(ClientConfig::from_env());
        assert!(matches!(result, Err(Error::InvalidApiKey)));
    }

    #[tokio::test]
    async fn test_requests_fail_fast_when_disconnected() {
        let client = offline_client();
        let request = ImageInferenceRequest::new("a cat", "model:1", 512, 512);
        assert!(matches!(
            client.image_inference(request).await,
            Err(Error::NotConnected)
        ));
    }

    #[test]
    fn test_extract_first_rejects_wrong_kind() {
        let results = vec![TaskResult::Caption(ImageCaptionResponse {
            task_type: TaskType::ImageCaption,
            task_uuid: "abc".into(),
            text: "a cat".into(),
            cost: None,
        })];
        let error = extract_first(results, TaskResult::into_image, "imageInference").unwrap_err();
        assert!(matches!(error, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_extract_all_keeps_every_match() {
        let caption = |text: &str| {
            TaskResult::Caption(ImageCaptionResponse {
                task_type: TaskType::ImageCaption,
                task_uuid: "abc".into(),
                text: text.into(),
                cost: None,
            })
        };
        let results = vec![caption("one"), caption("two")];
        let captions = extract_all(results, TaskResult::into_caption, "imageCaption").unwrap();
        assert_eq!(captions.len(), 2);
    }
}
