//! Raw and normalized order books.

use crate::level::{Level, LeveledOrder};
use serde::{Deserialize, Serialize};

/// The book as currently known from the feed, before normalization.
///
/// Sides are kept in merge order: neither sorted, trimmed nor cleared of
/// tombstones. `Empty` is the sentinel for "no snapshot received yet" and is
/// distinct from a book whose sides hold zero levels.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawBook {
    /// No snapshot has been applied yet.
    #[default]
    Empty,
    /// Both sides as last merged.
    Levels {
        /// Ask levels in merge order.
        asks: Vec<Level>,
        /// Bid levels in merge order.
        bids: Vec<Level>,
    },
}

impl RawBook {
    /// Creates a book directly from snapshot sides.
    #[must_use]
    pub fn from_snapshot(asks: Vec<Level>, bids: Vec<Level>) -> Self {
        Self::Levels { asks, bids }
    }

    /// Returns true once a snapshot has been applied.
    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Levels { .. })
    }

    /// Raw ask levels, if initialized.
    #[must_use]
    pub fn asks(&self) -> Option<&[Level]> {
        match self {
            Self::Empty => None,
            Self::Levels { asks, .. } => Some(asks),
        }
    }

    /// Raw bid levels, if initialized.
    #[must_use]
    pub fn bids(&self) -> Option<&[Level]> {
        match self {
            Self::Empty => None,
            Self::Levels { bids, .. } => Some(bids),
        }
    }

    /// Resets the book to the uninitialized sentinel.
    pub fn clear(&mut self) {
        *self = Self::Empty;
    }
}

/// A depth-limited, sorted, totaled view of the book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBook {
    /// Asks, lowest price first.
    pub asks: Vec<LeveledOrder>,
    /// Bids, highest price first.
    pub bids: Vec<LeveledOrder>,
}

impl NormalizedBook {
    /// Returns the best (lowest) ask.
    #[inline]
    #[must_use]
    pub fn best_ask(&self) -> Option<&LeveledOrder> {
        self.asks.first()
    }

    /// Returns the best (highest) bid.
    #[inline]
    #[must_use]
    pub fn best_bid(&self) -> Option<&LeveledOrder> {
        self.bids.first()
    }

    /// Returns the bid-ask spread.
    #[must_use]
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Returns the spread as a fraction of the best ask price.
    #[must_use]
    pub fn spread_ratio(&self) -> Option<f64> {
        let ask = self.best_ask()?.price;
        let spread = self.spread()?;
        if ask == 0.0 {
            return None;
        }
        Some(spread / ask)
    }

    /// Returns the mid price.
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price + ask.price) / 2.0),
            _ => None,
        }
    }

    /// Cumulative size across the retained ask levels.
    #[must_use]
    pub fn ask_total(&self) -> f64 {
        self.asks.last().map_or(0.0, |l| l.total)
    }

    /// Cumulative size across the retained bid levels.
    #[must_use]
    pub fn bid_total(&self) -> f64 {
        self.bids.last().map_or(0.0, |l| l.total)
    }

    /// Returns true if neither side has levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }
}
