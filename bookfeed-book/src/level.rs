//! Price levels, book sides and display records.

use serde::{Deserialize, Serialize};

/// One price point and its aggregate size on one side of the book.
///
/// A level with `size == 0.0` is a tombstone: it tells the book that the
/// price no longer exists. Tombstones travel through the merge untouched and
/// are dropped during normalization.
///
/// On the wire a level is a two-element array `[price, size]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Level {
    /// Level price.
    pub price: f64,
    /// Aggregate size resting at this price.
    pub size: f64,
}

impl Level {
    /// Creates a new price level.
    #[inline]
    #[must_use]
    pub const fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }

    /// Creates a tombstone for the given price.
    #[inline]
    #[must_use]
    pub const fn tombstone(price: f64) -> Self {
        Self { price, size: 0.0 }
    }

    /// Returns true if this level marks a deleted price.
    #[inline]
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.size == 0.0
    }
}

impl From<(f64, f64)> for Level {
    fn from((price, size): (f64, f64)) -> Self {
        Self { price, size }
    }
}

impl From<Level> for (f64, f64) {
    fn from(level: Level) -> Self {
        (level.price, level.size)
    }
}

/// Order book side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Ask (sell) side, best price is the lowest.
    Ask,
    /// Bid (buy) side, best price is the highest.
    Bid,
}

impl Side {
    /// Returns true if a level at price `a` ranks ahead of one at price `b`.
    #[inline]
    #[must_use]
    pub fn ranks_before(self, a: f64, b: f64) -> bool {
        match self {
            Self::Ask => a < b,
            Self::Bid => a > b,
        }
    }

    /// Lowercase label used in logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ask => "ask",
            Self::Bid => "bid",
        }
    }
}

/// A normalized, display-ready level.
///
/// `total` is the cumulative size of this level and every better-ranked
/// level on the same side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeveledOrder {
    /// Level price.
    pub price: f64,
    /// Size at this price.
    pub size: f64,
    /// Running size total from the best price outward.
    pub total: f64,
}
