//! # Bookfeed Bench
//!
//! Benchmarking utilities for bookfeed performance testing.

pub mod fixtures;
