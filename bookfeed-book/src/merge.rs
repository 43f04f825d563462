//! Snapshot and delta merging.
//!
//! The merge is a replace-by-price: incoming levels win, prior levels whose
//! price was not mentioned are carried over after them. It never sorts,
//! trims or drops tombstones; normalization does that on the way out.

use crate::book::RawBook;
use crate::level::Level;
use std::collections::HashSet;

/// Hash key for a level price. `-0.0` and `0.0` compare equal, so they share
/// a key.
#[inline]
fn price_key(price: f64) -> u64 {
    (price + 0.0).to_bits()
}

/// Merges incoming levels onto the current levels of one side.
///
/// The result holds every incoming level in arrival order, followed by each
/// current level whose price does not appear in `incoming`, in its prior
/// relative order. Duplicate prices inside `incoming` are all kept.
#[must_use]
pub fn merge_side(current: &[Level], incoming: Vec<Level>) -> Vec<Level> {
    let replaced: HashSet<u64> = incoming.iter().map(|l| price_key(l.price)).collect();

    let mut merged = incoming;
    merged.reserve(current.len());
    merged.extend(
        current
            .iter()
            .filter(|l| !replaced.contains(&price_key(l.price)))
            .copied(),
    );
    merged
}

/// Merges an incoming message onto the previous book.
///
/// On the sentinel the incoming sides become the book verbatim (snapshot
/// path). Otherwise each side is merged independently with [`merge_side`].
#[must_use]
pub fn merge_book(previous: &RawBook, asks: Vec<Level>, bids: Vec<Level>) -> RawBook {
    match previous {
        RawBook::Empty => RawBook::from_snapshot(asks, bids),
        RawBook::Levels {
            asks: current_asks,
            bids: current_bids,
        } => RawBook::Levels {
            asks: merge_side(current_asks, asks),
            bids: merge_side(current_bids, bids),
        },
    }
}

impl RawBook {
    /// Applies a snapshot or delta in place.
    pub fn apply(&mut self, asks: Vec<Level>, bids: Vec<Level>) {
        let merged = match std::mem::take(self) {
            Self::Empty => Self::from_snapshot(asks, bids),
            Self::Levels {
                asks: current_asks,
                bids: current_bids,
            } => Self::Levels {
                asks: merge_side(&current_asks, asks),
                bids: merge_side(&current_bids, bids),
            },
        };
        *self = merged;
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::strategies::{arb_history, arb_levels};
    use proptest::prelude::*;

    fn at_price(levels: &[Level], price: f64) -> Vec<Level> {
        levels.iter().filter(|l| l.price == price).copied().collect()
    }

    proptest! {
        #[test]
        fn test_merge_side_replaces_by_price(
            current in arb_levels(30),
            incoming in arb_levels(30),
        ) {
            let merged = merge_side(&current, incoming.clone());

            // Incoming levels lead, untouched and in arrival order.
            prop_assert_eq!(&merged[..incoming.len()], &incoming[..]);

            for level in current.iter().chain(&incoming) {
                let replaced = incoming.iter().any(|l| l.price == level.price);
                let expected = if replaced {
                    at_price(&incoming, level.price)
                } else {
                    at_price(&current, level.price)
                };
                prop_assert_eq!(at_price(&merged, level.price), expected);
            }
        }

        #[test]
        fn test_merge_book_on_sentinel_is_verbatim(
            asks in arb_levels(30),
            bids in arb_levels(30),
        ) {
            let book = merge_book(&RawBook::Empty, asks.clone(), bids.clone());
            prop_assert_eq!(book.asks(), Some(&asks[..]));
            prop_assert_eq!(book.bids(), Some(&bids[..]));
        }

        #[test]
        fn test_apply_matches_merge_book(history in arb_history()) {
            let mut applied = RawBook::Empty;
            let mut merged = RawBook::Empty;
            for (asks, bids) in history {
                merged = merge_book(&merged, asks.clone(), bids.clone());
                applied.apply(asks, bids);
            }
            prop_assert_eq!(applied, merged);
        }

        #[test]
        fn test_merged_prices_stay_distinct(history in arb_history()) {
            let mut book = RawBook::Empty;
            for (asks, bids) in history {
                book.apply(asks, bids);
            }

            for side in [book.asks(), book.bids()].into_iter().flatten() {
                for level in side {
                    prop_assert_eq!(at_price(side, level.price).len(), 1);
                }
            }
        }
    }
}
