//! Automatic reconnection after connection loss

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{data_frame, image_item, is_auth_frame, sent_task, MockReply, MockTaskServer};
use futures::StreamExt;
use taskwire_client::{Client, ClientConfig, WsConfig};
use taskwire_core::Error;

fn fast_reconnect_client(url: &str, auto_reconnect: bool) -> Client {
    let ws = WsConfig {
        url: url.to_string(),
        reconnect_delay: Duration::from_millis(50),
        max_reconnect_delay: Duration::from_millis(200),
        enable_auto_reconnect: auto_reconnect,
        ..WsConfig::default()
    };
    let config = ClientConfig::new("test-key")
        .with_ws(ws)
        .with_request_timeout(Duration::from_secs(2));
    Client::new(config).unwrap()
}

async fn wait_until_connected(client: &Client, budget: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + budget;
    while tokio::time::Instant::now() < deadline {
        if client.is_connected().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

#[tokio::test]
async fn test_reconnects_and_reauthenticates_after_drop() {
    // the service drops the first connection right after authentication
    let auths = Arc::new(AtomicUsize::new(0));
    let auths_seen = Arc::clone(&auths);
    let server = MockTaskServer::with_handler(move |frame| {
        let auths = Arc::clone(&auths_seen);
        async move {
            if is_auth_frame(&frame) {
                let n = auths.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 1 {
                    return MockReply::Drop;
                }
                return MockReply::None;
            }
            let task = sent_task(&frame);
            let task_uuid = task["taskUUID"].as_str().unwrap().to_string();
            MockReply::Text(data_frame(vec![image_item(&task_uuid, "img-after")]))
        }
    })
    .await;

    let client = fast_reconnect_client(&server.url(), true);
    client.connect().await.unwrap();

    // the drop is noticed, the supervisor redials and re-authenticates
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while auths.load(Ordering::SeqCst) < 2 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    assert!(auths.load(Ordering::SeqCst) >= 2, "expected a second auth frame");
    assert!(wait_until_connected(&client, Duration::from_secs(5)).await);

    // the restored connection carries requests again
    let image = client
        .text_to_image("a cat", "m", 512, 512)
        .await
        .unwrap();
    assert_eq!(image.image_uuid, "img-after");

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_disconnect_during_reconnect_stays_disconnected() {
    // the first connection authenticates and is dropped; the second TCP
    // accept stalls before the WebSocket handshake so disconnect() lands
    // while the supervisor's re-dial is still in flight
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        {
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let _ = ws.next().await; // auth frame
            // dropped without a closing handshake
        }
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        if let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await {
            let _ = ws.next().await;
        }
        // listener drops here, further dials are refused
    });

    let client = fast_reconnect_client(&format!("ws://{addr}"), true);
    client.connect().await.unwrap();

    // let the drop be noticed and the stalled re-dial begin
    tokio::time::sleep(Duration::from_millis(200)).await;
    client.disconnect().await.unwrap();

    // the late re-dial must not resurrect the session
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!client.is_connected().await);

    // and the session can start over rather than reporting AlreadyConnected
    let retry = client.connect().await;
    assert!(!matches!(retry, Err(Error::AlreadyConnected)));
    assert!(retry.is_err());
}

#[tokio::test]
async fn test_no_reconnect_when_disabled() {
    let auths = Arc::new(AtomicUsize::new(0));
    let auths_seen = Arc::clone(&auths);
    let server = MockTaskServer::with_handler(move |frame| {
        let auths = Arc::clone(&auths_seen);
        async move {
            if is_auth_frame(&frame) {
                auths.fetch_add(1, Ordering::SeqCst);
                return MockReply::Drop;
            }
            MockReply::None
        }
    })
    .await;

    let client = fast_reconnect_client(&server.url(), false);
    client.connect().await.unwrap();

    // give a would-be supervisor ample time to act
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!client.is_connected().await);
    assert_eq!(auths.load(Ordering::SeqCst), 1);

    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn test_clean_close_does_not_reconnect() {
    let auths = Arc::new(AtomicUsize::new(0));
    let auths_seen = Arc::clone(&auths);
    let server = MockTaskServer::with_handler(move |frame| {
        let auths = Arc::clone(&auths_seen);
        async move {
            if is_auth_frame(&frame) {
                auths.fetch_add(1, Ordering::SeqCst);
                return MockReply::Close;
            }
            MockReply::None
        }
    })
    .await;

    let client = fast_reconnect_client(&server.url(), true);
    client.connect().await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;
    // a clean close from the service ends the session without redialing
    assert_eq!(auths.load(Ordering::SeqCst), 1);
    assert!(!client.is_connected().await);

    client.disconnect().await.unwrap();
}
