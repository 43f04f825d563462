//! Depth normalization.
//!
//! Turns one raw side into display levels. Each side runs through, in order:
//! 1. [`remove_zero_levels`]
//! 2. [`sort_levels`]
//! 3. [`trim_to_depth`]
//! 4. [`accumulate_totals`]
//! 5. [`to_leveled_orders`]
//!
//! Totals are computed after trimming, so they cover retained levels only.

use crate::book::{NormalizedBook, RawBook};
use crate::level::{Level, LeveledOrder, Side};

/// Default number of levels kept per side.
pub const DEFAULT_DEPTH: usize = 25;

/// A level paired with its running size total.
pub type TotaledLevel = (Level, f64);

/// Drops tombstones, keeping the survivors in their original order.
#[must_use]
pub fn remove_zero_levels(levels: &[Level]) -> Vec<Level> {
    levels.iter().filter(|l| !l.is_tombstone()).copied().collect()
}

/// Sorts best price first: ascending for asks, descending for bids.
///
/// The sort is stable, so equal prices keep their relative order.
pub fn sort_levels(levels: &mut [Level], side: Side) {
    match side {
        Side::Ask => levels.sort_by(|a, b| a.price.total_cmp(&b.price)),
        Side::Bid => levels.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }
}

/// Keeps at most `depth` leading levels.
pub fn trim_to_depth(levels: &mut Vec<Level>, depth: usize) {
    levels.truncate(depth);
}

/// Attaches a running size total to each level, left to right.
#[must_use]
pub fn accumulate_totals(levels: &[Level]) -> Vec<TotaledLevel> {
    levels
        .iter()
        .scan(0.0, |total, level| {
            *total += level.size;
            Some((*level, *total))
        })
        .collect()
}

/// Relabels totaled levels into output records.
#[must_use]
pub fn to_leveled_orders(levels: &[TotaledLevel]) -> Vec<LeveledOrder> {
    levels
        .iter()
        .map(|&(level, total)| LeveledOrder {
            price: level.price,
            size: level.size,
            total,
        })
        .collect()
}

/// Runs the full pipeline over one raw side.
#[must_use]
pub fn normalize_side(raw: &[Level], side: Side, depth: usize) -> Vec<LeveledOrder> {
    let mut levels = remove_zero_levels(raw);
    sort_levels(&mut levels, side);
    trim_to_depth(&mut levels, depth);
    to_leveled_orders(&accumulate_totals(&levels))
}

/// Normalizes both sides of a raw book.
///
/// Returns `None` while the book is still the uninitialized sentinel.
#[must_use]
pub fn normalize_book(raw: &RawBook, depth: usize) -> Option<NormalizedBook> {
    match raw {
        RawBook::Empty => None,
        RawBook::Levels { asks, bids } => Some(NormalizedBook {
            asks: normalize_side(asks, Side::Ask, depth),
            bids: normalize_side(bids, Side::Bid, depth),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(raw: &[(f64, f64)]) -> Vec<Level> {
        raw.iter().map(|&(p, s)| Level::new(p, s)).collect()
    }

    fn ladder(start: f64, step: f64, count: usize) -> Vec<Level> {
        (0..count)
            .map(|i| Level::new(start + step * i as f64, 100.0))
            .collect()
    }

    #[test]
    fn test_remove_zero_levels() {
        let raw = levels(&[(50000.0, 100.0), (49000.0, 0.0), (48000.0, 100.0)]);
        assert_eq!(
            remove_zero_levels(&raw),
            levels(&[(50000.0, 100.0), (48000.0, 100.0)])
        );
    }

    #[test]
    fn test_sort_levels_both_sides() {
        let raw = levels(&[
            (50000.0, 100.0),
            (49000.0, 100.0),
            (48000.0, 100.0),
            (51000.5, 100.0),
        ]);

        let mut bids = raw.clone();
        sort_levels(&mut bids, Side::Bid);
        assert_eq!(
            bids,
            levels(&[
                (51000.5, 100.0),
                (50000.0, 100.0),
                (49000.0, 100.0),
                (48000.0, 100.0),
            ])
        );

        let mut asks = raw;
        sort_levels(&mut asks, Side::Ask);
        assert_eq!(
            asks,
            levels(&[
                (48000.0, 100.0),
                (49000.0, 100.0),
                (50000.0, 100.0),
                (51000.5, 100.0),
            ])
        );
    }

    #[test]
    fn test_sort_levels_is_stable() {
        let mut raw = levels(&[(100.0, 1.0), (99.0, 5.0), (100.0, 2.0)]);
        sort_levels(&mut raw, Side::Ask);
        assert_eq!(raw, levels(&[(99.0, 5.0), (100.0, 1.0), (100.0, 2.0)]));
    }

    #[test]
    fn test_trim_to_depth() {
        let mut raw = ladder(1.0, 1.0, 27);
        let expected = raw[..25].to_vec();

        trim_to_depth(&mut raw, DEFAULT_DEPTH);
        assert_eq!(raw, expected);
    }

    #[test]
    fn test_trim_short_input_unchanged() {
        let mut raw = ladder(1.0, 1.0, 3);
        let expected = raw.clone();

        trim_to_depth(&mut raw, DEFAULT_DEPTH);
        assert_eq!(raw, expected);
    }

    #[test]
    fn test_accumulate_totals() {
        let raw = levels(&[(50000.0, 100.0), (51000.0, 100.0), (52000.0, 100.0)]);
        let totals: Vec<f64> = accumulate_totals(&raw).iter().map(|(_, t)| *t).collect();
        assert_eq!(totals, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_accumulate_totals_empty() {
        assert!(accumulate_totals(&[]).is_empty());
    }

    #[test]
    fn test_to_leveled_orders() {
        let totaled = vec![
            (Level::new(50000.0, 100.0), 100.0),
            (Level::new(51000.0, 100.0), 200.0),
        ];
        assert_eq!(
            to_leveled_orders(&totaled),
            vec![
                LeveledOrder {
                    price: 50000.0,
                    size: 100.0,
                    total: 100.0,
                },
                LeveledOrder {
                    price: 51000.0,
                    size: 100.0,
                    total: 200.0,
                },
            ]
        );
    }

    #[test]
    fn test_normalize_sentinel_is_none() {
        assert!(normalize_book(&RawBook::Empty, DEFAULT_DEPTH).is_none());
    }

    #[test]
    fn test_normalize_trims_after_sorting() {
        // 30 unsorted bids: the best 25 must survive, not the first 25 received.
        let mut raw = ladder(1000.0, 10.0, 30);
        raw.reverse();
        raw.rotate_left(7);

        let side = normalize_side(&raw, Side::Bid, DEFAULT_DEPTH);
        assert_eq!(side.len(), 25);
        assert_eq!(side[0].price, 1290.0);
        assert_eq!(side[24].price, 1050.0);
        assert_eq!(side[24].total, 2500.0);
    }

    #[test]
    fn test_normalize_totals_cover_retained_levels_only() {
        let raw = ladder(1.0, 1.0, 40);
        let side = normalize_side(&raw, Side::Ask, 10);
        assert_eq!(side.len(), 10);
        assert_eq!(side.last().map(|l| l.total), Some(1000.0));
    }

    #[test]
    fn test_normalize_duplicate_prices_double_count() {
        let raw = levels(&[(100.0, 2.0), (100.0, 3.0)]);
        let side = normalize_side(&raw, Side::Ask, DEFAULT_DEPTH);
        assert_eq!(side.len(), 2);
        assert_eq!(side[1].total, 5.0);
    }

    #[test]
    fn test_full_pipeline_snapshot_then_update() {
        let snapshot_bids = ladder(26000.0, 1000.0, 25).into_iter().rev().collect();
        let snapshot_asks = ladder(51000.0, 1000.0, 25);

        let mut book = RawBook::Empty;
        book.apply(snapshot_asks, snapshot_bids);
        book.apply(
            levels(&[
                (52000.0, 0.0),
                (53000.0, 0.0),
                (52500.5, 100.0),
                (53500.5, 100.0),
                (54500.5, 100.0),
            ]),
            levels(&[
                (49000.0, 0.0),
                (48000.0, 0.0),
                (49500.5, 100.0),
                (48500.5, 100.0),
                (47500.5, 100.0),
            ]),
        );

        let normalized = normalize_book(&book, DEFAULT_DEPTH).unwrap();
        assert_eq!(normalized.asks.len(), 25);
        assert_eq!(normalized.bids.len(), 25);

        let ask_prices: Vec<f64> = normalized.asks.iter().map(|l| l.price).collect();
        assert_eq!(
            &ask_prices[..6],
            &[51000.0, 52500.5, 53500.5, 54000.0, 54500.5, 55000.0]
        );
        assert_eq!(ask_prices[24], 74000.0);
        assert!(!ask_prices.contains(&52000.0));
        assert!(!ask_prices.contains(&53000.0));

        let bid_prices: Vec<f64> = normalized.bids.iter().map(|l| l.price).collect();
        assert_eq!(
            &bid_prices[..5],
            &[50000.0, 49500.5, 48500.5, 47500.5, 47000.0]
        );
        assert_eq!(bid_prices[24], 27000.0);
        assert!(!bid_prices.contains(&49000.0));
        assert!(!bid_prices.contains(&48000.0));

        for (i, (ask, bid)) in normalized.asks.iter().zip(&normalized.bids).enumerate() {
            let expected = 100.0 * (i + 1) as f64;
            assert_eq!(ask.total, expected);
            assert_eq!(bid.total, expected);
        }

        assert_eq!(normalized.best_ask().map(|l| l.price), Some(51000.0));
        assert_eq!(normalized.best_bid().map(|l| l.price), Some(50000.0));
    }

    #[test]
    fn test_normalized_prices_strictly_monotonic() {
        let mut book = RawBook::Empty;
        book.apply(ladder(200.0, 1.0, 10), ladder(100.0, 1.0, 10));
        book.apply(levels(&[(205.0, 0.0), (199.5, 3.0)]), levels(&[(95.0, 1.0)]));
        book.apply(levels(&[(199.5, 0.0), (230.0, 1.0)]), levels(&[(109.0, 0.0)]));

        let normalized = normalize_book(&book, DEFAULT_DEPTH).unwrap();
        assert!(normalized.asks.windows(2).all(|w| w[0].price < w[1].price));
        assert!(normalized.bids.windows(2).all(|w| w[0].price > w[1].price));
        assert!(normalized.asks.windows(2).all(|w| w[0].total <= w[1].total));
    }
}
