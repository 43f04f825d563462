//! Feed session controller.
//!
//! The controller is a single task that owns at most one [`Session`]: the
//! open transport, the subscription state, the raw book and the broadcast
//! ticker. Commands come in over one channel and [`FeedEvent`]s go out over
//! another; nothing else crosses the task boundary.
//!
//! Subscription changes are strictly sequential. Switching pairs sends an
//! unsubscribe for the current pair and holds the new pair back until the
//! feed acknowledges it. While a request is in flight further switches only
//! replace the held-back pair.
//!
//! Inbound market data is merged as soon as it arrives. Broadcasts happen
//! only on ticker ticks, and only once a snapshot has been received for the
//! confirmed pair.

use crate::config::{FeedConfig, MIN_BROADCAST_INTERVAL};
use crate::error::FeedError;
use crate::protocol::{self, BookMessage, ControlEvent, Inbound, Request};
use crate::transport::{Connector, Transport};
use bookfeed_book::{NormalizedBook, RawBook, TradingPair, normalize_book};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Commands accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Open a fresh session.
    Open,
    /// Stream the given pair, unsubscribing the current one first.
    Switch(TradingPair),
    /// Tear the session down.
    Close,
}

/// Notifications emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Transport is open; nothing is subscribed yet.
    Opened,
    /// The feed confirmed a subscription.
    Subscribed {
        /// Confirmed pair.
        pair: TradingPair,
    },
    /// The feed confirmed an unsubscription.
    Unsubscribed {
        /// Released pair.
        pair: TradingPair,
    },
    /// The feed rejected a subscription.
    SubscribeFailed {
        /// Requested pair, if known.
        pair: Option<TradingPair>,
        /// Reason given by the feed.
        message: Option<String>,
    },
    /// The feed rejected an unsubscription.
    UnsubscribeFailed {
        /// Pair that remains subscribed, if known.
        pair: Option<TradingPair>,
        /// Reason given by the feed.
        message: Option<String>,
    },
    /// Feed or connection error.
    Error {
        /// Error description.
        message: String,
    },
    /// Control event with an unrecognised name.
    UnknownEvent {
        /// Event name as received.
        event: String,
        /// Accompanying message, if any.
        message: Option<String>,
    },
    /// Inbound frame could not be decoded; the book was left untouched.
    Malformed {
        /// Decode failure.
        reason: String,
    },
    /// Session torn down, by request or by the remote side.
    Closed,
    /// Periodic normalized view of the book.
    Update {
        /// Pair the book belongs to.
        pair: TradingPair,
        /// Normalized book.
        book: NormalizedBook,
    },
}

/// Connection and subscription state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session.
    #[default]
    Disconnected,
    /// Waiting for the transport to open.
    Connecting,
    /// Connected, with no confirmed subscription being broadcast.
    Unsubscribed,
    /// Connected and broadcasting the given pair.
    Subscribed(TradingPair),
}

struct EventSink {
    tx: mpsc::Sender<FeedEvent>,
}

impl EventSink {
    async fn emit(&self, event: FeedEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("event receiver dropped");
        }
    }

    /// Book updates are superseded by the next tick, so a full queue drops them.
    fn offer(&self, event: FeedEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("event queue full, dropping book update");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("event receiver dropped");
            }
        }
    }
}

/// State of one open connection.
struct Session<T> {
    transport: T,
    subscribed: Option<TradingPair>,
    subscribing: Option<TradingPair>,
    unsubscribing: Option<TradingPair>,
    pending: Option<TradingPair>,
    raw_book: RawBook,
    ticker: Option<Interval>,
}

impl<T: Transport> Session<T> {
    fn new(transport: T) -> Self {
        Self {
            transport,
            subscribed: None,
            subscribing: None,
            unsubscribing: None,
            pending: None,
            raw_book: RawBook::Empty,
            ticker: None,
        }
    }

    fn state(&self) -> ConnectionState {
        match self.subscribed {
            Some(pair) if self.unsubscribing.is_none() => ConnectionState::Subscribed(pair),
            _ => ConnectionState::Unsubscribed,
        }
    }

    fn start_ticker(&mut self, period: Duration) {
        let period = period.max(MIN_BROADCAST_INTERVAL);
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);
    }

    fn stop_ticker(&mut self) {
        self.ticker = None;
    }

    async fn send_request(&mut self, request: Request) -> Result<(), FeedError> {
        let text = request.to_json()?;
        tracing::debug!(event = ?request.event, pair = %request.pair(), "sending request");
        self.transport.send(text).await
    }

    async fn subscribe(&mut self, feed: &str, pair: TradingPair) -> Result<(), FeedError> {
        self.subscribing = Some(pair);
        self.send_request(Request::subscribe(feed, pair)).await
    }

    async fn unsubscribe(&mut self, feed: &str, pair: TradingPair) -> Result<(), FeedError> {
        self.stop_ticker();
        self.unsubscribing = Some(pair);
        self.send_request(Request::unsubscribe(feed, pair)).await
    }

    async fn switch(&mut self, feed: &str, pair: TradingPair) -> Result<(), FeedError> {
        if self.unsubscribing.is_some() {
            self.pending = Some(pair);
            return Ok(());
        }
        if let Some(requested) = self.subscribing {
            self.pending = (requested != pair).then_some(pair);
            return Ok(());
        }

        match self.subscribed {
            Some(current) if current == pair => {
                tracing::debug!(pair = %pair, "already subscribed");
                Ok(())
            }
            Some(current) => {
                tracing::info!(from = %current, to = %pair, "switching pair");
                self.pending = Some(pair);
                self.unsubscribe(feed, current).await
            }
            None => self.subscribe(feed, pair).await,
        }
    }

    fn on_book(&mut self, message: BookMessage) {
        let Some(current) = self.subscribed else {
            tracing::debug!("market data without a confirmed subscription, dropping");
            return;
        };
        if message.product_id.is_some_and(|product| product != current) {
            tracing::debug!(
                product = ?message.product_id,
                pair = %current,
                "market data for another pair, dropping"
            );
            return;
        }

        tracing::trace!(
            pair = %current,
            asks = message.asks.len(),
            bids = message.bids.len(),
            snapshot = !self.raw_book.is_initialized(),
            "applying book message"
        );
        self.raw_book.apply(message.asks, message.bids);
    }

    fn on_tick(&self, depth: usize, events: &EventSink) {
        let Some(pair) = self.subscribed else {
            return;
        };
        match normalize_book(&self.raw_book, depth) {
            Some(book) => events.offer(FeedEvent::Update { pair, book }),
            None => tracing::trace!(pair = %pair, "no snapshot yet, skipping broadcast"),
        }
    }

    async fn on_control(
        &mut self,
        event: ControlEvent,
        config: &FeedConfig,
        events: &EventSink,
    ) -> Result<(), FeedError> {
        match event {
            ControlEvent::Subscribed { pair } => {
                let Some(pair) = pair.or(self.subscribing) else {
                    tracing::warn!("subscription confirmed without a pair, ignoring");
                    return Ok(());
                };
                self.subscribing = None;
                self.subscribed = Some(pair);
                self.raw_book.clear();
                self.start_ticker(config.broadcast_interval);
                tracing::info!(pair = %pair, "subscribed");
                events.emit(FeedEvent::Subscribed { pair }).await;

                match self.pending.take() {
                    Some(next) if next != pair => {
                        self.pending = Some(next);
                        self.unsubscribe(&config.feed, pair).await?;
                    }
                    _ => {}
                }
            }
            ControlEvent::Unsubscribed { pair } => {
                let Some(pair) = pair.or(self.unsubscribing).or(self.subscribed) else {
                    tracing::warn!("unsubscription confirmed without a pair, ignoring");
                    return Ok(());
                };
                self.unsubscribing = None;
                if self.subscribed == Some(pair) {
                    self.subscribed = None;
                    self.stop_ticker();
                    self.raw_book.clear();
                }
                tracing::info!(pair = %pair, "unsubscribed");
                events.emit(FeedEvent::Unsubscribed { pair }).await;

                if let Some(next) = self.pending.take() {
                    self.switch(&config.feed, next).await?;
                }
            }
            ControlEvent::SubscribeFailed { pair, message } => {
                let pair = pair.or(self.subscribing);
                self.subscribing = None;
                tracing::warn!(pair = ?pair, message = ?message, "subscription failed");
                events
                    .emit(FeedEvent::SubscribeFailed { pair, message })
                    .await;

                if let Some(next) = self.pending.take().filter(|next| Some(*next) != pair) {
                    self.switch(&config.feed, next).await?;
                }
            }
            ControlEvent::UnsubscribeFailed { pair, message } => {
                let pair = pair.or(self.unsubscribing);
                self.unsubscribing = None;
                self.pending = None;
                if self.subscribed.is_some() {
                    self.start_ticker(config.broadcast_interval);
                }
                tracing::warn!(pair = ?pair, message = ?message, "unsubscription failed");
                events
                    .emit(FeedEvent::UnsubscribeFailed { pair, message })
                    .await;
            }
            ControlEvent::Error { message } => {
                let message = message.unwrap_or_default();
                tracing::warn!(message = %message, "feed error");
                events.emit(FeedEvent::Error { message }).await;
            }
            ControlEvent::Unknown { event, message } => {
                tracing::debug!(event = %event, message = ?message, "unknown feed event");
                events.emit(FeedEvent::UnknownEvent { event, message }).await;
            }
        }
        Ok(())
    }
}

enum Step {
    Command(ControlCommand),
    Frame(Option<Result<String, FeedError>>),
    Tick,
    Shutdown,
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// The feed session controller task.
///
/// Created by [`FeedBuilder`](crate::builder::FeedBuilder) together with its
/// [`BookFeed`](crate::bridge::BookFeed) bridge; spawn [`run`](Self::run) on
/// a tokio runtime.
pub struct FeedController<C: Connector> {
    connector: C,
    config: FeedConfig,
    cmd_rx: mpsc::Receiver<ControlCommand>,
    events: EventSink,
    session: Option<Session<C::Transport>>,
    connecting: bool,
}

impl<C: Connector> FeedController<C> {
    pub(crate) fn new(
        connector: C,
        config: FeedConfig,
        cmd_rx: mpsc::Receiver<ControlCommand>,
        event_tx: mpsc::Sender<FeedEvent>,
    ) -> Self {
        Self {
            connector,
            config,
            cmd_rx,
            events: EventSink { tx: event_tx },
            session: None,
            connecting: false,
        }
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        if self.connecting {
            return ConnectionState::Connecting;
        }
        self.session
            .as_ref()
            .map_or(ConnectionState::Disconnected, Session::state)
    }

    /// Processes commands, frames and ticks until the command channel closes.
    pub async fn run(mut self) {
        tracing::info!(feed = %self.config.feed, "feed controller started");

        loop {
            let step = match self.session.as_mut() {
                None => self.cmd_rx.recv().await.map_or(Step::Shutdown, Step::Command),
                Some(session) => {
                    let Session {
                        transport, ticker, ..
                    } = session;
                    tokio::select! {
                        cmd = self.cmd_rx.recv() => cmd.map_or(Step::Shutdown, Step::Command),
                        frame = transport.recv() => Step::Frame(frame),
                        () = next_tick(ticker) => Step::Tick,
                    }
                }
            };

            match step {
                Step::Command(cmd) => self.handle_command(cmd).await,
                Step::Frame(Some(Ok(text))) => self.handle_frame(&text).await,
                Step::Frame(Some(Err(e))) => {
                    tracing::error!(error = %e, "transport error");
                    self.close_session().await;
                }
                Step::Frame(None) => {
                    tracing::warn!("connection closed by remote");
                    self.close_session().await;
                }
                Step::Tick => {
                    if let Some(session) = &self.session {
                        session.on_tick(self.config.depth, &self.events);
                    }
                }
                Step::Shutdown => break,
            }
        }

        self.close_session().await;
        tracing::info!("feed controller stopped");
    }

    async fn handle_command(&mut self, cmd: ControlCommand) {
        tracing::debug!(?cmd, state = ?self.state(), "command");
        match cmd {
            ControlCommand::Open => self.open().await,
            ControlCommand::Switch(pair) => self.switch(pair).await,
            ControlCommand::Close => {
                if self.session.is_none() {
                    tracing::debug!("close ignored while disconnected");
                }
                self.close_session().await;
            }
        }
    }

    async fn switch(&mut self, pair: TradingPair) {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!(pair = %pair, "switch ignored while disconnected");
            return;
        };
        if let Err(e) = session.switch(&self.config.feed, pair).await {
            tracing::error!(error = %e, "failed to send subscription request");
            self.close_session().await;
        }
    }

    async fn open(&mut self) {
        if self.session.is_some() {
            tracing::debug!("open ignored, session already active");
            return;
        }

        self.connecting = true;
        tracing::info!(state = ?self.state(), "opening feed connection");

        // Commands arriving while connecting are handled here; a close
        // abandons the attempt.
        let mut queued = None;
        let outcome = {
            let connect =
                tokio::time::timeout(self.config.connect_timeout, self.connector.connect());
            tokio::pin!(connect);
            loop {
                tokio::select! {
                    result = &mut connect => break Some(result),
                    cmd = self.cmd_rx.recv() => match cmd {
                        Some(ControlCommand::Open) => {
                            tracing::debug!("open ignored, already connecting");
                        }
                        Some(ControlCommand::Switch(pair)) => queued = Some(pair),
                        Some(ControlCommand::Close) | None => break None,
                    },
                }
            }
        };
        self.connecting = false;

        match outcome {
            Some(Ok(Ok(transport))) => {
                self.session = Some(Session::new(transport));
                tracing::info!("feed connection open");
                self.events.emit(FeedEvent::Opened).await;
                if let Some(pair) = queued {
                    self.switch(pair).await;
                }
            }
            Some(Ok(Err(e))) => self.connect_failed(e).await,
            Some(Err(_)) => self.connect_failed(FeedError::ConnectTimeout).await,
            None => {
                tracing::info!("connect abandoned");
                self.events.emit(FeedEvent::Closed).await;
            }
        }
    }

    async fn connect_failed(&self, error: FeedError) {
        tracing::error!(error = %error, "failed to open feed connection");
        self.events
            .emit(FeedEvent::Error {
                message: error.to_string(),
            })
            .await;
        self.events.emit(FeedEvent::Closed).await;
    }

    async fn close_session(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.stop_ticker();
        if let Err(e) = session.transport.close().await {
            tracing::debug!(error = %e, "transport close failed");
        }
        tracing::info!(pair = ?session.subscribed, "feed connection closed");
        self.events.emit(FeedEvent::Closed).await;
    }

    async fn handle_frame(&mut self, text: &str) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let result = match protocol::decode(text) {
            Ok(Inbound::Book(message)) => {
                session.on_book(message);
                Ok(())
            }
            Ok(Inbound::Control(event)) => {
                session.on_control(event, &self.config, &self.events).await
            }
            Ok(Inbound::Ignored) => {
                tracing::trace!("ignoring frame without book data");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "malformed frame");
                self.events
                    .emit(FeedEvent::Malformed {
                        reason: e.to_string(),
                    })
                    .await;
                Ok(())
            }
        };

        if let Err(e) = result {
            tracing::error!(error = %e, "failed to send subscription request");
            self.close_session().await;
        }
    }
}
