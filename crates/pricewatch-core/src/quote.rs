//! Quote and snapshot types.
//!
//! The set of tracked instruments is closed: every snapshot maps each
//! configured [`Symbol`] to a [`Quote`], with an explicit "unavailable"
//! price rather than a coerced zero when the upstream feed has no value.

use crate::decimal::Price;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tracked instrument.
///
/// Declaration order is the canonical ordering used for message text and
/// change reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Symbol {
    #[serde(rename = "XAUUSD")]
    GoldOunce,
    #[serde(rename = "G18K")]
    Gold18k,
    #[serde(rename = "G24K")]
    Gold24k,
    #[serde(rename = "NEW_COIN")]
    CoinNew,
    #[serde(rename = "OLD_COIN")]
    CoinOld,
    #[serde(rename = "HALF_COIN")]
    HalfCoin,
    #[serde(rename = "QUARTER_COIN")]
    QuarterCoin,
    #[serde(rename = "GRAM_COIN")]
    GramCoin,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "AED")]
    Aed,
    #[serde(rename = "USDT")]
    Usdt,
}

impl Symbol {
    /// All symbols in canonical order.
    pub const ALL: [Symbol; 13] = [
        Symbol::GoldOunce,
        Symbol::Gold18k,
        Symbol::Gold24k,
        Symbol::CoinNew,
        Symbol::CoinOld,
        Symbol::HalfCoin,
        Symbol::QuarterCoin,
        Symbol::GramCoin,
        Symbol::Usd,
        Symbol::Eur,
        Symbol::Gbp,
        Symbol::Aed,
        Symbol::Usdt,
    ];

    /// Upstream feed code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::GoldOunce => "XAUUSD",
            Self::Gold18k => "G18K",
            Self::Gold24k => "G24K",
            Self::CoinNew => "NEW_COIN",
            Self::CoinOld => "OLD_COIN",
            Self::HalfCoin => "HALF_COIN",
            Self::QuarterCoin => "QUARTER_COIN",
            Self::GramCoin => "GRAM_COIN",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Aed => "AED",
            Self::Usdt => "USDT",
        }
    }

    /// Human-readable label for message text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GoldOunce => "Gold ounce",
            Self::Gold18k => "Gold 18k (gram)",
            Self::Gold24k => "Gold 24k (gram)",
            Self::CoinNew => "Emami coin",
            Self::CoinOld => "Bahar Azadi coin",
            Self::HalfCoin => "Half coin",
            Self::QuarterCoin => "Quarter coin",
            Self::GramCoin => "Gram coin",
            Self::Usd => "US dollar",
            Self::Eur => "Euro",
            Self::Gbp => "British pound",
            Self::Aed => "UAE dirham",
            Self::Usdt => "Tether",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::ALL
            .iter()
            .copied()
            .find(|sym| sym.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownSymbol(s.to_string()))
    }
}

/// Named observation of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    /// `None` means the feed reported no usable price.
    pub price: Option<Price>,
    /// Upstream-reported change since the previous close, in percent.
    pub change_percent: f64,
}

impl Quote {
    pub fn new(symbol: Symbol, price: Price, change_percent: f64) -> Self {
        Self {
            symbol,
            price: Some(price),
            change_percent,
        }
    }

    /// Quote for a symbol the feed did not deliver.
    pub fn unavailable(symbol: Symbol) -> Self {
        Self {
            symbol,
            price: None,
            change_percent: 0.0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.price.is_some()
    }
}

/// One fetched set of quotes for all tracked symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    quotes: BTreeMap<Symbol, Quote>,
    /// Update time as reported by the upstream feed, or the local fetch time.
    pub timestamp: Option<String>,
    /// When this process received the snapshot.
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Build a snapshot covering exactly `symbols`.
    ///
    /// Symbols missing from `quotes` are filled with [`Quote::unavailable`];
    /// quotes for symbols outside `symbols` are dropped.
    pub fn complete(
        symbols: &[Symbol],
        quotes: impl IntoIterator<Item = Quote>,
        timestamp: Option<String>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut found: BTreeMap<Symbol, Quote> = quotes
            .into_iter()
            .filter(|q| symbols.contains(&q.symbol))
            .map(|q| (q.symbol, q))
            .collect();

        for symbol in symbols {
            found
                .entry(*symbol)
                .or_insert_with(|| Quote::unavailable(*symbol));
        }

        Self {
            quotes: found,
            timestamp,
            fetched_at,
        }
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Quote> {
        self.quotes.get(&symbol)
    }

    /// Price of `symbol`, or `None` if absent or unavailable.
    pub fn price(&self, symbol: Symbol) -> Option<Price> {
        self.quotes.get(&symbol).and_then(|q| q.price)
    }

    /// Quotes in canonical symbol order.
    pub fn iter(&self) -> impl Iterator<Item = &Quote> {
        self.quotes.values()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Number of quotes with a usable price.
    pub fn available_count(&self) -> usize {
        self.quotes.values().filter(|q| q.is_available()).count()
    }
}
