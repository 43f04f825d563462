//! Feed configuration.

use bookfeed_book::{DEFAULT_DEPTH, TradingPair};
use std::time::Duration;

/// Default WebSocket endpoint.
pub const DEFAULT_URL: &str = "wss://www.cryptofacilities.com/ws/v1";

/// Default feed name sent with every subscription request.
pub const DEFAULT_FEED: &str = "book_ui_1";

/// Default interval between normalized book broadcasts.
pub const DEFAULT_BROADCAST_INTERVAL: Duration = Duration::from_millis(200);

/// Shortest broadcast interval the controller runs with.
pub const MIN_BROADCAST_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration shared by the feed controller and its transport.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// WebSocket endpoint.
    pub url: String,
    /// Feed name used in subscribe and unsubscribe requests.
    pub feed: String,
    /// Interval between broadcasts while subscribed. Raised to
    /// [`MIN_BROADCAST_INTERVAL`] when shorter.
    pub broadcast_interval: Duration,
    /// Levels kept per side after normalization.
    pub depth: usize,
    /// Maximum time to wait for the transport to open.
    pub connect_timeout: Duration,
    /// Capacity of the command and event channels.
    pub channel_capacity: usize,
    /// Pair subscribed on the first open.
    pub initial_pair: TradingPair,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            feed: DEFAULT_FEED.to_string(),
            broadcast_interval: DEFAULT_BROADCAST_INTERVAL,
            depth: DEFAULT_DEPTH,
            connect_timeout: Duration::from_secs(5),
            channel_capacity: 1024,
            initial_pair: TradingPair::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.url, "wss://www.cryptofacilities.com/ws/v1");
        assert_eq!(config.feed, "book_ui_1");
        assert_eq!(config.broadcast_interval, Duration::from_millis(200));
        assert_eq!(config.depth, 25);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.initial_pair, TradingPair::XbtUsd);
    }
}
