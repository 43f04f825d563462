//! Trading pair definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A trading pair the book feed can subscribe to.
///
/// The set is closed: the feed only ever carries these products.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TradingPair {
    /// Bitcoin perpetual, `PI_XBTUSD`.
    #[default]
    #[serde(rename = "PI_XBTUSD")]
    XbtUsd,
    /// Ether perpetual, `PI_ETHUSD`.
    #[serde(rename = "PI_ETHUSD")]
    EthUsd,
}

impl TradingPair {
    /// Every supported pair.
    pub const ALL: [TradingPair; 2] = [TradingPair::XbtUsd, TradingPair::EthUsd];

    /// Returns the product symbol used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::XbtUsd => "PI_XBTUSD",
            Self::EthUsd => "PI_ETHUSD",
        }
    }

    /// Returns the other pair.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::XbtUsd => Self::EthUsd,
            Self::EthUsd => Self::XbtUsd,
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a product symbol names no supported pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown trading pair: {symbol}")]
pub struct UnknownPairError {
    /// The rejected symbol.
    pub symbol: String,
}

impl FromStr for TradingPair {
    type Err = UnknownPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|pair| pair.as_str() == s)
            .ok_or_else(|| UnknownPairError {
                symbol: s.to_string(),
            })
    }
}
