//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```
//! use bookfeed::prelude::*;
//! ```

// Book types
pub use bookfeed_book::{
    DEFAULT_DEPTH, Level, LeveledOrder, NormalizedBook, RawBook, Side, TradingPair,
    merge_book, normalize_book,
};

// Client types
pub use bookfeed_client::{
    BookFeed, ConnectionState, Connector, ControlCommand, FeedBuilder, FeedConfig,
    FeedController, FeedError, FeedEvent, ProtocolError, Transport, WsConnector,
};
