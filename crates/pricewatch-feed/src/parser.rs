//! Response normalization.
//!
//! The endpoint returns an object of arrays (`gold`, `currency`,
//! `cryptocurrency`), each item shaped like
//! `{"symbol": "USD", "price": 58000, "change_percent": 0.4, "time": "14:05"}`.
//! Prices arrive either as numbers or as strings with thousands separators.
//! Without a `time` on the first gold item, the snapshot is stamped with the
//! local `HH:MM` of the fetch.

use crate::error::{FetchError, FetchResult};
use pricewatch_core::{CivilTime, Price, Quote, Snapshot, Symbol};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, warn};

/// Array carrying the snapshot timestamp in its first item.
const TIMESTAMP_ARRAY: &str = "gold";

/// Normalize a raw response into a snapshot covering exactly `symbols`.
///
/// Missing symbols, unparsable prices and negative prices become
/// unavailable quotes. Fails only when the body has no quote arrays at all.
pub fn parse_snapshot(
    body: &Value,
    symbols: &[Symbol],
    fetched_at: &CivilTime,
) -> FetchResult<Snapshot> {
    let object = body
        .as_object()
        .ok_or_else(|| FetchError::Malformed("response is not a JSON object".to_string()))?;

    let arrays: Vec<&Vec<Value>> = object.values().filter_map(Value::as_array).collect();
    if arrays.is_empty() {
        return Err(FetchError::Malformed(
            "response contains no quote arrays".to_string(),
        ));
    }

    let mut quotes = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let item = arrays
            .iter()
            .flat_map(|items| items.iter())
            .find(|item| item.get("symbol").and_then(Value::as_str) == Some(symbol.code()));

        match item {
            Some(item) => quotes.push(parse_quote(*symbol, item)),
            None => debug!(%symbol, "Symbol not present in response"),
        }
    }

    let timestamp = object
        .get(TIMESTAMP_ARRAY)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|item| item.get("time"))
        .and_then(value_to_string)
        .unwrap_or_else(|| format!("{:02}:{:02}", fetched_at.hour, fetched_at.minute));

    Ok(Snapshot::complete(symbols, quotes, Some(timestamp), fetched_at.instant))
}

fn parse_quote(symbol: Symbol, item: &Value) -> Quote {
    let price = item.get("price").and_then(|raw| match parse_price(raw) {
        Some(price) => Some(price),
        None => {
            warn!(%symbol, raw = %raw, "Unusable price, marking unavailable");
            None
        }
    });

    let change_percent = item
        .get("change_percent")
        .and_then(parse_f64)
        .unwrap_or(0.0);

    Quote {
        symbol,
        price,
        change_percent,
    }
}

/// Parse a price value. `None` for absent, unparsable or negative values.
pub fn parse_price(raw: &Value) -> Option<Price> {
    let decimal = match raw {
        Value::Number(n) => parse_decimal(&n.to_string())?,
        Value::String(s) => parse_decimal(&strip_separators(s))?,
        _ => return None,
    };
    Price::try_new(decimal).ok()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn parse_f64(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => strip_separators(s).parse().ok(),
        _ => None,
    }
}

fn strip_separators(s: &str) -> String {
    s.trim().chars().filter(|c| *c != ',').collect()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_core::CivilClock;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn fetched_at() -> CivilTime {
        CivilClock::default().local(2025, 2, 11, 9, 5).unwrap()
    }

    fn sample() -> Value {
        json!({
            "gold": [
                {"symbol": "XAUUSD", "price": 2650.5, "change_percent": -0.3, "time": "14:05"},
                {"symbol": "G18K", "price": "6,512,300", "change_percent": "1.2", "time": "14:05"},
                {"symbol": "NEW_COIN", "price": "N/A", "change_percent": 0}
            ],
            "currency": [
                {"symbol": "USD", "price": 58000, "change_percent": 0.4},
                {"symbol": "EUR", "price": -5, "change_percent": 0}
            ],
            "cryptocurrency": [
                {"symbol": "USDT", "price": "58,150", "change_percent": 0.1}
            ]
        })
    }

    #[test]
    fn test_parse_full_response() {
        let symbols = [
            Symbol::GoldOunce,
            Symbol::Gold18k,
            Symbol::CoinNew,
            Symbol::Usd,
            Symbol::Eur,
            Symbol::Gbp,
            Symbol::Usdt,
        ];
        let snap = parse_snapshot(&sample(), &symbols, &fetched_at()).unwrap();

        assert_eq!(snap.len(), symbols.len());
        assert_eq!(snap.price(Symbol::GoldOunce).unwrap().inner(), dec!(2650.5));
        assert_eq!(snap.price(Symbol::Gold18k).unwrap().inner(), dec!(6512300));
        assert_eq!(snap.price(Symbol::Usd).unwrap().inner(), dec!(58000));
        assert_eq!(snap.price(Symbol::Usdt).unwrap().inner(), dec!(58150));
        assert_eq!(snap.get(Symbol::Gold18k).unwrap().change_percent, 1.2);
        assert_eq!(snap.timestamp.as_deref(), Some("14:05"));
    }

    #[test]
    fn test_unusable_prices_become_unavailable() {
        let symbols = [Symbol::CoinNew, Symbol::Eur, Symbol::Gbp];
        let snap = parse_snapshot(&sample(), &symbols, &fetched_at()).unwrap();

        // "N/A", negative, and missing entirely
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.available_count(), 0);
    }

    #[test]
    fn test_missing_gold_array_uses_fetch_time() {
        let body = json!({"currency": [{"symbol": "USD", "price": 1}]});
        let snap = parse_snapshot(&body, &[Symbol::Usd], &fetched_at()).unwrap();
        assert_eq!(snap.timestamp.as_deref(), Some("09:05"));
        assert_eq!(snap.fetched_at, fetched_at().instant);
        assert!(snap.price(Symbol::Usd).is_some());
    }

    #[test]
    fn test_blank_gold_time_uses_fetch_time() {
        let body = json!({"gold": [{"symbol": "XAUUSD", "price": 2650, "time": ""}]});
        let snap = parse_snapshot(&body, &[Symbol::GoldOunce], &fetched_at()).unwrap();
        assert_eq!(snap.timestamp.as_deref(), Some("09:05"));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_snapshot(&json!([1, 2, 3]), &[Symbol::Usd], &fetched_at()).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_object_without_arrays_rejected() {
        let body = json!({"error": "invalid key"});
        let err = parse_snapshot(&body, &[Symbol::Usd], &fetched_at()).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn test_parse_price_variants() {
        assert_eq!(parse_price(&json!("1,250.75")).unwrap().inner(), dec!(1250.75));
        assert_eq!(parse_price(&json!(0)).unwrap().inner(), dec!(0));
        assert_eq!(parse_price(&json!(1e3)).unwrap().inner(), dec!(1000));
        assert!(parse_price(&json!("")).is_none());
        assert!(parse_price(&json!(null)).is_none());
        assert!(parse_price(&json!("-12")).is_none());
    }
}
