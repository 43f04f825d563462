//! Consumer bridge.
//!
//! [`BookFeed`] is the handle a presentation layer holds. It forwards
//! control actions to the controller task and keeps the latest normalized
//! view as events are drained through [`BookFeed::next_event`] or
//! [`BookFeed::poll`]. Actions that do not apply in the current state are
//! no-ops.

use crate::controller::{ConnectionState, ControlCommand, FeedEvent};
use crate::error::FeedError;
use bookfeed_book::{LeveledOrder, NormalizedBook, TradingPair};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Handle for controlling a feed and reading its latest book.
pub struct BookFeed {
    cmd_tx: mpsc::Sender<ControlCommand>,
    event_rx: mpsc::Receiver<FeedEvent>,
    pair: TradingPair,
    state: ConnectionState,
    book: NormalizedBook,
    resume_on_active: bool,
}

impl BookFeed {
    pub(crate) fn new(
        pair: TradingPair,
        cmd_tx: mpsc::Sender<ControlCommand>,
        event_rx: mpsc::Receiver<FeedEvent>,
    ) -> Self {
        Self {
            cmd_tx,
            event_rx,
            pair,
            state: ConnectionState::Disconnected,
            book: NormalizedBook::default(),
            resume_on_active: false,
        }
    }

    /// Opens a fresh session. The current pair is subscribed once the
    /// transport is up.
    ///
    /// Always forwarded: the local state may lag a close that is still in
    /// flight, and the controller ignores an open while a session is active.
    ///
    /// # Errors
    /// Returns `FeedError::Channel` if the controller has stopped or its
    /// command queue is full.
    pub fn open(&mut self) -> Result<(), FeedError> {
        self.command(ControlCommand::Open)?;
        if self.state == ConnectionState::Disconnected {
            self.state = ConnectionState::Connecting;
        }
        Ok(())
    }

    /// Closes the current session.
    ///
    /// # Errors
    /// Returns `FeedError::Channel` if the controller has stopped or its
    /// command queue is full.
    pub fn close(&mut self) -> Result<(), FeedError> {
        if self.state == ConnectionState::Disconnected {
            tracing::debug!("close ignored while disconnected");
            return Ok(());
        }
        self.command(ControlCommand::Close)
    }

    /// Streams `pair` instead of the current pair.
    ///
    /// Does nothing if `pair` is already subscribed. While disconnected the
    /// pair is remembered and subscribed on the next open.
    ///
    /// # Errors
    /// Returns `FeedError::Channel` if the controller has stopped or its
    /// command queue is full.
    pub fn switch_pair(&mut self, pair: TradingPair) -> Result<(), FeedError> {
        if self.state == ConnectionState::Subscribed(pair) {
            return Ok(());
        }
        if self.pair != pair {
            self.book = NormalizedBook::default();
            self.pair = pair;
        }

        match self.state {
            ConnectionState::Disconnected | ConnectionState::Connecting => Ok(()),
            ConnectionState::Unsubscribed | ConnectionState::Subscribed(_) => {
                self.state = ConnectionState::Unsubscribed;
                self.command(ControlCommand::Switch(pair))
            }
        }
    }

    /// Visibility hook: closes the feed while inactive and reopens it on the
    /// current pair once active again.
    ///
    /// # Errors
    /// Returns `FeedError::Channel` if the controller has stopped or its
    /// command queue is full.
    pub fn set_active(&mut self, active: bool) -> Result<(), FeedError> {
        if active {
            if std::mem::take(&mut self.resume_on_active) {
                return self.open();
            }
            return Ok(());
        }
        if self.state == ConnectionState::Disconnected {
            return Ok(());
        }
        self.resume_on_active = true;
        self.close()
    }

    /// Waits for the next event and applies it to the local view.
    ///
    /// Returns `None` once the controller has stopped.
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        let event = self.event_rx.recv().await?;
        self.apply(&event);
        Some(event)
    }

    /// Returns the next event if one is ready (non-blocking).
    pub fn poll(&mut self) -> Option<FeedEvent> {
        let event = self.event_rx.try_recv().ok()?;
        self.apply(&event);
        Some(event)
    }

    /// Latest asks, best first.
    #[inline]
    #[must_use]
    pub fn current_asks(&self) -> &[LeveledOrder] {
        &self.book.asks
    }

    /// Latest bids, best first.
    #[inline]
    #[must_use]
    pub fn current_bids(&self) -> &[LeveledOrder] {
        &self.book.bids
    }

    /// Latest normalized book.
    #[inline]
    #[must_use]
    pub fn book(&self) -> &NormalizedBook {
        &self.book
    }

    /// Pair currently requested.
    #[inline]
    #[must_use]
    pub fn pair(&self) -> TradingPair {
        self.pair
    }

    /// Connection state as last reported.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns true while the requested pair is subscribed.
    #[inline]
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.state == ConnectionState::Subscribed(self.pair)
    }

    fn command(&self, cmd: ControlCommand) -> Result<(), FeedError> {
        self.cmd_tx.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(_) => FeedError::channel("command queue full"),
            TrySendError::Closed(_) => FeedError::channel("controller stopped"),
        })
    }

    fn apply(&mut self, event: &FeedEvent) {
        match event {
            FeedEvent::Opened => {
                self.state = ConnectionState::Unsubscribed;
                if let Err(e) = self.command(ControlCommand::Switch(self.pair)) {
                    tracing::warn!(error = %e, pair = %self.pair, "failed to request subscription");
                }
            }
            FeedEvent::Subscribed { pair } => {
                if *pair == self.pair {
                    self.state = ConnectionState::Subscribed(*pair);
                }
            }
            FeedEvent::Unsubscribed { .. } => {
                self.state = ConnectionState::Unsubscribed;
                self.book = NormalizedBook::default();
            }
            FeedEvent::UnsubscribeFailed {
                pair: Some(pair), ..
            } => {
                self.pair = *pair;
                self.state = ConnectionState::Subscribed(*pair);
            }
            FeedEvent::Closed => {
                self.state = ConnectionState::Disconnected;
                self.book = NormalizedBook::default();
            }
            FeedEvent::Update { pair, book } => {
                if *pair == self.pair {
                    self.book = book.clone();
                }
            }
            _ => {}
        }
    }
}
