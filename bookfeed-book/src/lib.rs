//! # Bookfeed Book
//!
//! Leveled order book model for live depth feeds.
//!
//! This crate provides:
//! - Price levels with tombstone semantics and the `[price, size]` wire shape
//! - Snapshot and delta merging by price
//! - Depth normalization into sorted, trimmed, totaled display levels
//! - The closed set of supported trading pairs
//!
//! Everything here is synchronous and allocation-light; the session layer in
//! `bookfeed-client` drives it.

pub mod book;
pub mod level;
pub mod merge;
pub mod normalize;
pub mod pair;

#[cfg(test)]
mod strategies;

pub use book::{NormalizedBook, RawBook};
pub use level::{Level, LeveledOrder, Side};
pub use merge::{merge_book, merge_side};
pub use normalize::{DEFAULT_DEPTH, normalize_book, normalize_side};
pub use pair::{TradingPair, UnknownPairError};
