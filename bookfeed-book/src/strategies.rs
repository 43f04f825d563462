//! Proptest strategies for levels and book messages.

use crate::level::{Level, Side};
use proptest::prelude::*;

const BASE: f64 = 100.0;
const TICK: f64 = 0.5;

/// Prices on a narrow tick grid, so batches often collide.
const TICKS: u32 = 40;

fn price(tick: u32) -> f64 {
    BASE + f64::from(tick) * TICK
}

pub(crate) fn arb_side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Ask), Just(Side::Bid)]
}

/// Sizes with roughly one tombstone in four.
pub(crate) fn arb_size() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        3 => (1u32..10_000).prop_map(|lots| f64::from(lots) / 100.0),
    ]
}

/// A batch in arbitrary order, duplicate prices allowed.
pub(crate) fn arb_levels(max: usize) -> impl Strategy<Value = Vec<Level>> {
    proptest::collection::vec((0..TICKS, arb_size()), 0..max).prop_map(|raw| {
        raw.into_iter()
            .map(|(tick, size)| Level::new(price(tick), size))
            .collect()
    })
}

/// A batch in arbitrary order with every price distinct.
pub(crate) fn arb_unique_levels(max: usize) -> impl Strategy<Value = Vec<Level>> {
    proptest::collection::btree_map(0..TICKS, arb_size(), 0..max)
        .prop_map(|raw| {
            raw.into_iter()
                .map(|(tick, size)| Level::new(price(tick), size))
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

/// A snapshot followed by deltas, `(asks, bids)` per message, no duplicate
/// prices within a message.
pub(crate) fn arb_history() -> impl Strategy<Value = Vec<(Vec<Level>, Vec<Level>)>> {
    proptest::collection::vec((arb_unique_levels(30), arb_unique_levels(30)), 1..12)
}
