//! Async task polling: getResponse loops for video and audio

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{data_frame, is_auth_frame, sent_task, MockReply, MockTaskServer};
use taskwire_client::{Client, ClientConfig};
use taskwire_core::Error;

fn test_client(url: &str) -> Client {
    let config = ClientConfig::new("test-key")
        .with_url(url)
        .with_request_timeout(Duration::from_secs(2));
    Client::new(config).unwrap()
}

fn video_status_item(task_uuid: &str, status: &str) -> serde_json::Value {
    let mut item = serde_json::json!({
        "taskType": "getResponse",
        "taskUUID": task_uuid,
        "status": status
    });
    if status == "success" {
        item["videoUUID"] = "vid-1".into();
        item["videoURL"] = "https://video.example/vid-1.mp4".into();
    }
    item
}

/// Service that reports `processing` a fixed number of times before `success`.
async fn staged_video_server(processing_polls: usize, polls: Arc<AtomicUsize>) -> MockTaskServer {
    MockTaskServer::with_handler(move |frame| {
        let polls = Arc::clone(&polls);
        async move {
            if is_auth_frame(&frame) {
                return MockReply::None;
            }
            let task = sent_task(&frame);
            if task["taskType"] != "getResponse" {
                return MockReply::None;
            }
            let task_uuid = task["taskUUID"].as_str().unwrap();
            let n = polls.fetch_add(1, Ordering::SeqCst) + 1;
            let status = if n <= processing_polls { "processing" } else { "success" };
            MockReply::Text(data_frame(vec![video_status_item(task_uuid, status)]))
        }
    })
    .await
}

#[tokio::test]
async fn test_polls_until_success() {
    let polls = Arc::new(AtomicUsize::new(0));
    let server = staged_video_server(2, Arc::clone(&polls)).await;
    let client = test_client(&server.url());
    client.connect().await.unwrap();

    let video = client
        .poll_video_result("vid-task", 10, Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(video.video_uuid.as_deref(), Some("vid-1"));
    // two processing polls plus the terminal one
    assert_eq!(polls.load(Ordering::SeqCst), 3);

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_poll_budget_exhaustion() {
    let polls = Arc::new(AtomicUsize::new(0));
    // success would come on poll 100, far beyond the budget
    let server = staged_video_server(99, Arc::clone(&polls)).await;
    let client = test_client(&server.url());
    client.connect().await.unwrap();

    let error = client
        .poll_video_result("vid-task", 3, Duration::from_millis(10))
        .await
        .unwrap_err();
    match error {
        Error::PollingExhausted { attempts } => assert_eq!(attempts, 3),
        other => panic!("expected PollingExhausted, got {other:?}"),
    }
    assert_eq!(polls.load(Ordering::SeqCst), 3);

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_exhaustion_returns_without_trailing_sleep() {
    let polls = Arc::new(AtomicUsize::new(0));
    let server = staged_video_server(99, Arc::clone(&polls)).await;
    let client = test_client(&server.url());
    client.connect().await.unwrap();

    // one attempt with a long interval: the verdict must not wait on it
    let outcome = tokio::time::timeout(
        Duration::from_secs(2),
        client.poll_video_result("vid-task", 1, Duration::from_secs(30)),
    )
    .await
    .expect("exhaustion verdict delayed by the poll interval");
    assert!(matches!(outcome, Err(Error::PollingExhausted { attempts: 1 })));

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_poll_terminal_error_status() {
    let server = MockTaskServer::with_handler(|frame| async move {
        if is_auth_frame(&frame) {
            return MockReply::None;
        }
        let task = sent_task(&frame);
        let task_uuid = task["taskUUID"].as_str().unwrap();
        MockReply::Text(data_frame(vec![video_status_item(task_uuid, "error")]))
    })
    .await;
    let client = test_client(&server.url());
    client.connect().await.unwrap();

    let error = client
        .poll_video_result("vid-task", 5, Duration::from_millis(10))
        .await
        .unwrap_err();
    match error {
        Error::TaskFailed { task_uuid } => assert_eq!(task_uuid, "vid-task"),
        other => panic!("expected TaskFailed, got {other:?}"),
    }

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_poll_audio_result_sniffs_audio_payload() {
    let server = MockTaskServer::with_handler(|frame| async move {
        if is_auth_frame(&frame) {
            return MockReply::None;
        }
        let task = sent_task(&frame);
        let task_uuid = task["taskUUID"].as_str().unwrap();
        MockReply::Text(data_frame(vec![serde_json::json!({
            "taskType": "getResponse",
            "taskUUID": task_uuid,
            "status": "success",
            "audioUUID": "aud-1",
            "audioURL": "https://audio.example/aud-1.mp3"
        })]))
    })
    .await;
    let client = test_client(&server.url());
    client.connect().await.unwrap();

    let audio = client
        .poll_audio_result("aud-task", 5, Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(audio.audio_uuid.as_deref(), Some("aud-1"));
    assert_eq!(audio.audio_url.as_deref(), Some("https://audio.example/aud-1.mp3"));

    client.disconnect().await.unwrap();
}
