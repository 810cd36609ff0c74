//! Multiplexing WebSocket client for the taskwire task-processing API
//!
//! This crate maintains one persistent WebSocket connection to the service
//! and multiplexes any number of concurrent logical requests over it. Each
//! request carries a caller-minted correlation identifier (`taskUUID`);
//! inbound frames are demultiplexed back to their waiting callers by that
//! identifier.
//!
//! # Core Features
//!
//! - **Single connection**: all requests share one authenticated socket
//! - **Request correlation**: responses route by `taskUUID`, out of order
//! - **Heartbeat**: periodic pings plus a read-silence liveness window
//! - **Auto-Reconnection**: capped exponential backoff with jitter
//! - **Batch execution**: bounded concurrency, order-preserving results
//! - **Async polling**: `getResponse` loops for video and audio tasks
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use taskwire_client::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig::new("api-key"))?;
//!     client.connect().await?;
//!
//!     let image = client
//!         .text_to_image("a lighthouse at dusk", "sd:1", 1024, 1024)
//!         .await?;
//!     println!("image at {:?}", image.image_url);
//!
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Async Tasks
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use taskwire_client::{Client, ClientConfig};
//!
//! # async fn example(client: Client) -> taskwire_core::Result<()> {
//! let ack = client.text_to_video("waves on a beach", "video:1").await?;
//! let video = client
//!     .poll_video_result(&ack.task_uuid, 60, Duration::from_secs(2))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod backoff;
mod batch;
mod client;
mod config;
mod poll;
mod registry;
mod router;
mod transport;
mod waiter;

pub use batch::{process_batch, BatchError};
pub use client::Client;
pub use config::{ClientConfig, WsConfig, API_KEY_ENV, DEFAULT_ENDPOINT};
pub use registry::{HandlerRegistry, ResponseCallback};
pub use transport::WsTransport;
