//! taskwire - multiplexed WebSocket access to the task-processing service
//!
//! This is the main convenience crate that re-exports the taskwire
//! sub-crates. Use this crate if you want a single dependency.
//!
//! # Architecture
//!
//! taskwire is organized into modular crates:
//!
//! - **taskwire-core**: wire envelopes, task models, error taxonomy
//! - **taskwire-client**: the multiplexing WebSocket client
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use taskwire::{Client, ClientConfig};
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
//!     Ok(())
//! }
//! ```

// Re-export all public APIs from sub-crates
pub use taskwire_client as client;
pub use taskwire_core as core;

// Convenience re-exports of the most commonly used types
pub use taskwire_client::{Client, ClientConfig, WsConfig};
pub use taskwire_core::{ApiError, Error, Result, TaskResult, TaskStatus, TaskType};
