//! # Bookfeed
//!
//! Live leveled order book for a streaming depth feed.
//!
//! Bookfeed keeps a raw two-sided book in sync with a snapshot-then-delta
//! feed and periodically publishes a normalized view: tombstones removed,
//! best price first, trimmed to a fixed depth, with cumulative totals.
//!
//! ## Features
//!
//! - **Replace-by-price merge** - Deltas overwrite prior levels at the same price
//! - **Depth normalization** - Sort, trim and total each side independently
//! - **Sequential subscriptions** - Pair switches always unsubscribe first
//! - **Timed broadcast** - Updates are throttled to a fixed cadence
//!
//! ## Quick Start
//!
//! ```no_run
//! use bookfeed::prelude::*;
//!
//! # async fn demo() -> Result<(), FeedError> {
//! let (controller, mut feed) = FeedBuilder::new()
//!     .initial_pair(TradingPair::XbtUsd)
//!     .build();
//! tokio::spawn(controller.run());
//!
//! feed.open()?;
//! while let Some(event) = feed.next_event().await {
//!     if let FeedEvent::Update { .. } = event {
//!         println!("spread: {:?}", feed.book().spread());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`book`] - Levels, merge engine, normalization pipeline, trading pairs
//! - [`client`] - Wire protocol, transports, session controller, consumer bridge

pub mod prelude;

/// Order book model, merge and normalization.
pub mod book {
    pub use bookfeed_book::*;
}

/// Feed session controller and consumer bridge.
pub mod client {
    pub use bookfeed_client::*;
}

// Re-export commonly used items at the crate root
pub use bookfeed_book::{
    DEFAULT_DEPTH, Level, LeveledOrder, NormalizedBook, RawBook, Side, TradingPair,
};
pub use bookfeed_client::{BookFeed, FeedBuilder, FeedConfig, FeedError, FeedEvent};
