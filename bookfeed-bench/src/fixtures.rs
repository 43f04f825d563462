//! Deterministic book fixtures.

use bookfeed_book::{Level, Side, TradingPair};

/// Price increment between adjacent levels.
pub const TICK: f64 = 0.5;

/// Mid price the fixtures are centred on.
pub const MID: f64 = 50_000.0;

/// Builds `levels` contiguous levels walking away from `best`.
#[must_use]
pub fn ladder(side: Side, best: f64, levels: usize, size: f64) -> Vec<Level> {
    let step = match side {
        Side::Ask => TICK,
        Side::Bid => -TICK,
    };
    (0..levels)
        .map(|i| Level::new(best + step * i as f64, size))
        .collect()
}

/// Builds a snapshot with `depth` levels per side around [`MID`].
///
/// Returns `(asks, bids)`.
#[must_use]
pub fn snapshot(depth: usize) -> (Vec<Level>, Vec<Level>) {
    (
        ladder(Side::Ask, MID + TICK, depth, 100.0),
        ladder(Side::Bid, MID, depth, 100.0),
    )
}

/// Builds the `seq`-th delta touching `changes` levels per side.
///
/// Every fourth change is a tombstone; prices wander over twice the given
/// depth so that deltas both hit and miss existing levels.
#[must_use]
pub fn delta(seq: u64, changes: usize, depth: usize) -> (Vec<Level>, Vec<Level>) {
    let span = (depth * 2).max(1) as u64;
    let side = |best: f64, direction: f64| -> Vec<Level> {
        (0..changes as u64)
            .map(|i| {
                let offset = (seq.wrapping_mul(31) + i * 17) % span;
                let price = best + direction * TICK * offset as f64;
                let size = if (seq + i) % 4 == 0 {
                    0.0
                } else {
                    ((seq + i) % 7 + 1) as f64 * 10.0
                };
                Level::new(price, size)
            })
            .collect()
    };
    (side(MID + TICK, 1.0), side(MID, -1.0))
}

/// Renders a book frame as the feed sends it.
#[must_use]
pub fn book_frame(pair: TradingPair, asks: &[Level], bids: &[Level]) -> String {
    fn side(levels: &[Level]) -> String {
        let body: Vec<String> = levels
            .iter()
            .map(|l| format!("[{:?},{:?}]", l.price, l.size))
            .collect();
        format!("[{}]", body.join(","))
    }
    format!(
        r#"{{"feed":"book_ui_1","product_id":"{pair}","asks":{},"bids":{}}}"#,
        side(asks),
        side(bids)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_shape() {
        let (asks, bids) = snapshot(25);
        assert_eq!(asks.len(), 25);
        assert_eq!(bids.len(), 25);
        assert_eq!(asks[0].price, MID + TICK);
        assert_eq!(bids[24].price, MID - TICK * 24.0);
        assert!(asks[0].price > bids[0].price);
    }

    #[test]
    fn test_delta_is_deterministic() {
        assert_eq!(delta(7, 10, 25), delta(7, 10, 25));
        assert_ne!(delta(7, 10, 25), delta(8, 10, 25));
    }

    #[test]
    fn test_delta_contains_tombstones() {
        let (asks, bids) = delta(0, 8, 25);
        assert!(asks.iter().any(Level::is_tombstone));
        assert!(bids.iter().any(Level::is_tombstone));
        assert!(asks.iter().all(|l| l.size >= 0.0));
    }

    #[test]
    fn test_book_frame_format() {
        let frame = book_frame(
            TradingPair::XbtUsd,
            &[Level::new(50000.5, 10.0)],
            &[Level::new(50000.0, 0.0)],
        );
        assert_eq!(
            frame,
            r#"{"feed":"book_ui_1","product_id":"PI_XBTUSD","asks":[[50000.5,10.0]],"bids":[[50000.0,0.0]]}"#
        );
    }
}
