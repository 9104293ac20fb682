use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::CoreError;

/// A single recorded stock position, as confirmed by the persistence backend.
///
/// Holdings are never patched in place: an edit replaces the whole record on
/// the backend and the store reloads the full list afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Opaque identifier assigned by the backend
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Display name of the security (e.g., "Apple Inc.")
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Exchange symbol, uppercased (e.g., "AAPL")
    #[serde(default, deserialize_with = "lenient_string")]
    pub ticker: String,

    /// Number of shares held
    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,

    /// Cost basis per share
    #[serde(rename = "buyPrice", default, deserialize_with = "lenient_f64")]
    pub buy_price: f64,

    /// Latest known market price per share (may be zero or stale)
    #[serde(rename = "currentPrice", default, deserialize_with = "lenient_f64")]
    pub current_price: f64,

    /// Backend-side modification time, display only
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Holding {
    /// Build a confirmed holding from a candidate and the id the backend assigned.
    pub fn from_input(id: impl Into<String>, input: HoldingInput) -> Self {
        Self {
            id: id.into(),
            name: input.name,
            ticker: input.ticker,
            quantity: input.quantity,
            buy_price: input.buy_price,
            current_price: input.current_price,
            last_updated: None,
        }
    }

    /// Attach a modification timestamp.
    #[must_use]
    pub fn with_last_updated(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = Some(at);
        self
    }
}

/// The candidate submitted on create / edit. This is also the request body
/// sent to the backend for `POST /stocks` and `PUT /stocks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingInput {
    pub name: String,

    pub ticker: String,

    pub quantity: f64,

    #[serde(rename = "buyPrice")]
    pub buy_price: f64,

    #[serde(rename = "currentPrice")]
    pub current_price: f64,
}

impl HoldingInput {
    /// Create a candidate. The ticker is trimmed and uppercased.
    pub fn new(
        name: impl Into<String>,
        ticker: impl Into<String>,
        quantity: f64,
        buy_price: f64,
        current_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            ticker: normalize_ticker(&ticker.into()),
            quantity,
            buy_price,
            current_price,
        }
    }

    /// Return a copy with the ticker normalized, for candidates built by hand
    /// or deserialized from a form payload.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.ticker = normalize_ticker(&self.ticker);
        self
    }

    /// Local precondition check run before any network call.
    ///
    /// Rejects non-positive and non-finite (NaN, infinite) quantity / buy price.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(CoreError::Validation(
                "Quantity must be greater than 0".into(),
            ));
        }
        if !self.buy_price.is_finite() || self.buy_price <= 0.0 {
            return Err(CoreError::Validation(
                "Buy price must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Pre-fill an edit form from an existing holding.
impl From<&Holding> for HoldingInput {
    fn from(holding: &Holding) -> Self {
        Self {
            name: holding.name.clone(),
            ticker: holding.ticker.clone(),
            quantity: holding.quantity,
            buy_price: holding.buy_price,
            current_price: holding.current_price,
        }
    }
}

/// Trim and uppercase a ticker symbol.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

// ── Tolerant wire parsing ───────────────────────────────────────────
//
// The backend has been seen returning numbers as strings and ids as numbers.
// Unparsable numerics become 0, null or non-scalar text fields become empty
// and unparsable timestamps become None, so one odd record never fails a
// whole list load.

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|n| n.is_finite()).unwrap_or(0.0))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_timestamp))
}

/// Parse a backend timestamp. Accepts RFC 3339 and naive `YYYY-MM-DD[T ]HH:MM:SS[.f]`
/// (interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
