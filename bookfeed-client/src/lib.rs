//! # Bookfeed Client
//!
//! Live order book session handling.
//!
//! This crate provides:
//! - Feed builder with configuration options
//! - JSON wire protocol for book data and subscription events
//! - Transport seams with a WebSocket implementation
//! - A session controller task that merges deltas and broadcasts on a timer
//! - A consumer bridge exposing the latest book and control actions
//!
//! ```no_run
//! use bookfeed_client::{FeedBuilder, FeedEvent};
//!
//! # async fn demo() -> Result<(), bookfeed_client::FeedError> {
//! let (controller, mut feed) = FeedBuilder::new().build();
//! tokio::spawn(controller.run());
//!
//! feed.open()?;
//! while let Some(event) = feed.next_event().await {
//!     if let FeedEvent::Update { .. } = event {
//!         println!("best ask: {:?}", feed.book().best_ask());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod builder;
pub mod config;
pub mod controller;
pub mod error;
pub mod protocol;
pub mod transport;

pub use bridge::BookFeed;
pub use builder::FeedBuilder;
pub use config::FeedConfig;
pub use controller::{ConnectionState, ControlCommand, FeedController, FeedEvent};
pub use error::FeedError;
pub use protocol::ProtocolError;
pub use transport::{Connector, Transport, WsConnector, WsTransport};
