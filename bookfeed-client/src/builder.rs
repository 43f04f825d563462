//! Feed builder.

use crate::bridge::BookFeed;
use crate::config::{FeedConfig, MIN_BROADCAST_INTERVAL};
use crate::controller::FeedController;
use crate::transport::{Connector, WsConnector};
use bookfeed_book::TradingPair;
use std::time::Duration;
use tokio::sync::mpsc;

/// Builder for configuring and creating a feed.
#[derive(Debug, Clone, Default)]
pub struct FeedBuilder {
    config: FeedConfig,
}

impl FeedBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from an existing configuration.
    #[must_use]
    pub fn from_config(config: FeedConfig) -> Self {
        Self { config }
    }

    /// Sets the WebSocket endpoint.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Sets the feed name used in subscription requests.
    #[must_use]
    pub fn feed(mut self, feed: impl Into<String>) -> Self {
        self.config.feed = feed.into();
        self
    }

    /// Sets the broadcast interval, at least [`MIN_BROADCAST_INTERVAL`].
    #[must_use]
    pub fn broadcast_interval(mut self, interval: Duration) -> Self {
        self.config.broadcast_interval = interval.max(MIN_BROADCAST_INTERVAL);
        self
    }

    /// Sets the number of levels kept per side.
    #[must_use]
    pub fn depth(mut self, depth: usize) -> Self {
        self.config.depth = depth;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Sets the channel capacity.
    #[must_use]
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Sets the pair subscribed on the first open.
    #[must_use]
    pub fn initial_pair(mut self, pair: TradingPair) -> Self {
        self.config.initial_pair = pair;
        self
    }

    /// Returns the configuration built so far.
    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Builds a WebSocket-backed controller and its bridge.
    #[must_use]
    pub fn build(self) -> (FeedController<WsConnector>, BookFeed) {
        let connector = WsConnector::new(self.config.url.clone());
        self.build_with(connector)
    }

    /// Builds a controller over a custom connector and its bridge.
    #[must_use]
    pub fn build_with<C: Connector>(self, connector: C) -> (FeedController<C>, BookFeed) {
        let capacity = self.config.channel_capacity.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
        let (event_tx, event_rx) = mpsc::channel(capacity);

        let feed = BookFeed::new(self.config.initial_pair, cmd_tx, event_rx);
        let controller = FeedController::new(connector, self.config, cmd_rx, event_tx);

        (controller, feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ConnectionState;

    #[test]
    fn test_builder_setters() {
        let builder = FeedBuilder::new()
            .url("ws://localhost:9000")
            .feed("book_ui_2")
            .broadcast_interval(Duration::from_millis(50))
            .depth(10)
            .connect_timeout(Duration::from_secs(1))
            .channel_capacity(16)
            .initial_pair(TradingPair::EthUsd);

        let config = builder.config();
        assert_eq!(config.url, "ws://localhost:9000");
        assert_eq!(config.feed, "book_ui_2");
        assert_eq!(config.broadcast_interval, Duration::from_millis(50));
        assert_eq!(config.depth, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.initial_pair, TradingPair::EthUsd);
    }

    #[test]
    fn test_zero_broadcast_interval_is_raised() {
        let builder = FeedBuilder::new().broadcast_interval(Duration::ZERO);
        assert_eq!(builder.config().broadcast_interval, MIN_BROADCAST_INTERVAL);
    }

    #[test]
    fn test_build_initial_state() {
        let (controller, feed) = FeedBuilder::new()
            .initial_pair(TradingPair::EthUsd)
            .build();

        assert_eq!(controller.state(), ConnectionState::Disconnected);
        assert_eq!(feed.state(), ConnectionState::Disconnected);
        assert_eq!(feed.pair(), TradingPair::EthUsd);
        assert!(feed.current_asks().is_empty());
    }
}
