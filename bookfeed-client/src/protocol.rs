//! Wire protocol for the book feed.
//!
//! Inbound frames are JSON objects of three kinds:
//! - market data: `{"product_id": .., "bids": [[price, size], ..], "asks": [..]}`
//! - control events: `{"event": "subscribed", "product_ids": [..], "message": ..}`
//! - anything else (heartbeats, feed info), which is ignored
//!
//! Outbound frames are subscribe and unsubscribe requests naming one pair.
//!
//! Level values are checked here, at the boundary, so that everything past
//! [`decode`] can rely on `size == 0.0` being the only special value.

use bookfeed_book::{Level, Side, TradingPair, UnknownPairError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for decoding inbound frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload is not valid JSON or has the wrong shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A level carries a negative or non-finite value.
    #[error("invalid {side} level [{price}, {size}]")]
    InvalidLevel {
        /// Side label.
        side: &'static str,
        /// Offending price.
        price: f64,
        /// Offending size.
        size: f64,
    },

    /// A product symbol names no supported pair.
    #[error(transparent)]
    UnknownPair(#[from] UnknownPairError),
}

/// A validated snapshot or delta.
#[derive(Debug, Clone, PartialEq)]
pub struct BookMessage {
    /// Product the levels belong to, when the frame names one.
    pub product_id: Option<TradingPair>,
    /// Changed or snapshot ask levels, tombstones included.
    pub asks: Vec<Level>,
    /// Changed or snapshot bid levels, tombstones included.
    pub bids: Vec<Level>,
}

/// Control events reported by the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Subscription confirmed.
    Subscribed {
        /// Confirmed pair.
        pair: Option<TradingPair>,
    },
    /// Unsubscription confirmed.
    Unsubscribed {
        /// Released pair.
        pair: Option<TradingPair>,
    },
    /// Subscription rejected.
    SubscribeFailed {
        /// Requested pair.
        pair: Option<TradingPair>,
        /// Reason given by the feed.
        message: Option<String>,
    },
    /// Unsubscription rejected.
    UnsubscribeFailed {
        /// Pair that stays subscribed.
        pair: Option<TradingPair>,
        /// Reason given by the feed.
        message: Option<String>,
    },
    /// Feed-level error.
    Error {
        /// Reason given by the feed.
        message: Option<String>,
    },
    /// Any other event name, such as `info`.
    Unknown {
        /// Event name as received.
        event: String,
        /// Accompanying message, if any.
        message: Option<String>,
    },
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Market data to merge.
    Book(BookMessage),
    /// Subscription lifecycle event.
    Control(ControlEvent),
    /// Frame with no meaning for the book.
    Ignored,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    event: Option<String>,
    product_id: Option<String>,
    #[serde(default)]
    product_ids: Vec<String>,
    message: Option<String>,
    asks: Option<Vec<Level>>,
    bids: Option<Vec<Level>>,
}

/// Decodes one inbound text frame.
///
/// # Errors
/// Returns `ProtocolError` if the frame is not a JSON object of a known
/// shape, if a level value is negative or non-finite, or if a product symbol
/// is not supported.
pub fn decode(text: &str) -> Result<Inbound, ProtocolError> {
    let wire: WireMessage = serde_json::from_str(text)?;

    if let Some(event) = wire.event {
        let pair = || first_pair(&wire.product_ids);
        let message = wire.message;
        let control = match event.as_str() {
            "subscribed" => ControlEvent::Subscribed { pair: pair()? },
            "unsubscribed" => ControlEvent::Unsubscribed { pair: pair()? },
            "subscribed-failed" => ControlEvent::SubscribeFailed {
                pair: pair()?,
                message,
            },
            "unsubscribed-failed" => ControlEvent::UnsubscribeFailed {
                pair: pair()?,
                message,
            },
            "error" => ControlEvent::Error { message },
            _ => ControlEvent::Unknown { event, message },
        };
        return Ok(Inbound::Control(control));
    }

    if wire.asks.is_none() && wire.bids.is_none() {
        return Ok(Inbound::Ignored);
    }

    let asks = validate_levels(wire.asks.unwrap_or_default(), Side::Ask)?;
    let bids = validate_levels(wire.bids.unwrap_or_default(), Side::Bid)?;
    let product_id = wire.product_id.as_deref().map(str::parse::<TradingPair>).transpose()?;

    Ok(Inbound::Book(BookMessage {
        product_id,
        asks,
        bids,
    }))
}

fn first_pair(symbols: &[String]) -> Result<Option<TradingPair>, ProtocolError> {
    symbols
        .first()
        .map(|s| s.parse::<TradingPair>())
        .transpose()
        .map_err(ProtocolError::from)
}

fn validate_levels(levels: Vec<Level>, side: Side) -> Result<Vec<Level>, ProtocolError> {
    match levels.iter().find(|l| !is_valid_value(l.price) || !is_valid_value(l.size)) {
        Some(bad) => Err(ProtocolError::InvalidLevel {
            side: side.label(),
            price: bad.price,
            size: bad.size,
        }),
        None => Ok(levels),
    }
}

#[inline]
fn is_valid_value(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Outbound request kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Start streaming a pair.
    Subscribe,
    /// Stop streaming a pair.
    Unsubscribe,
}

/// A subscribe or unsubscribe request for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    /// Request kind.
    pub event: RequestKind,
    /// Feed name.
    pub feed: String,
    /// Target pairs; always exactly one.
    pub product_ids: [TradingPair; 1],
}

impl Request {
    /// Creates a subscribe request.
    #[must_use]
    pub fn subscribe(feed: impl Into<String>, pair: TradingPair) -> Self {
        Self {
            event: RequestKind::Subscribe,
            feed: feed.into(),
            product_ids: [pair],
        }
    }

    /// Creates an unsubscribe request.
    #[must_use]
    pub fn unsubscribe(feed: impl Into<String>, pair: TradingPair) -> Self {
        Self {
            event: RequestKind::Unsubscribe,
            feed: feed.into(),
            product_ids: [pair],
        }
    }

    /// Returns the target pair.
    #[inline]
    #[must_use]
    pub fn pair(&self) -> TradingPair {
        self.product_ids[0]
    }

    /// Encodes the request as a JSON text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
