//! Option Chain Types
//!
//! Canonical representation of one expiry's option chain: a market snapshot
//! of the underlying plus the traded call and put contracts at each strike.
//!
//! # Filtering
//!
//! A contract is kept only if it has traded, i.e. its `lastPrice` is a
//! nonzero number. Every kept contract appears once in the combined list and
//! once in the list for its side.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upstream key holding the last traded price of a contract.
pub const LAST_PRICE_KEY: &str = "lastPrice";

const STRIKE_PRICE_KEY: &str = "strikePrice";
const EXPIRY_DATE_KEY: &str = "expiryDate";
const OPTION_TYPE_KEY: &str = "optionType";

// =============================================================================
// Option Side
// =============================================================================

/// Which side of the chain a contract belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionSide {
    /// Call option (right to buy).
    #[serde(rename = "CE")]
    Call,
    /// Put option (right to sell).
    #[serde(rename = "PE")]
    Put,
}

impl OptionSide {
    /// Exchange label for the side.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Call => "CE",
            Self::Put => "PE",
        }
    }
}

impl std::fmt::Display for OptionSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Records
// =============================================================================

/// One traded option contract at one strike for one expiry.
///
/// Upstream values are carried through untouched: `strikePrice` and
/// `lastPrice` keep their JSON representation, and every other field (open
/// interest, volume, implied volatility, ...) lands in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionRecord {
    /// Strike price as supplied upstream (`null` if absent).
    #[serde(rename = "strikePrice", default)]
    pub strike_price: Value,
    /// Expiry date string.
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,
    /// Call or put.
    #[serde(rename = "optionType")]
    pub side: OptionSide,
    /// Last traded price as supplied upstream (always a nonzero number).
    #[serde(rename = "lastPrice")]
    pub last_price: Value,
    /// Remaining upstream fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl OptionRecord {
    /// Build a record from an upstream contract object.
    ///
    /// The strike and expiry of the enclosing row are used unless the
    /// contract object carries its own. Returns `None` if the contract has
    /// not traded.
    #[must_use]
    pub fn from_upstream(
        side: OptionSide,
        row_strike: &Value,
        expiry: &str,
        mut fields: Map<String, Value>,
    ) -> Option<Self> {
        if !fields.get(LAST_PRICE_KEY).is_some_and(has_traded) {
            return None;
        }
        let last_price = fields.remove(LAST_PRICE_KEY).unwrap_or_default();
        fields.remove(OPTION_TYPE_KEY);

        let strike_price = match fields.remove(STRIKE_PRICE_KEY) {
            Some(value) if !value.is_null() => value,
            _ => row_strike.clone(),
        };

        let expiry_date = match fields.remove(EXPIRY_DATE_KEY) {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => expiry.to_string(),
        };

        Some(Self {
            strike_price,
            expiry_date,
            side,
            last_price,
            fields,
        })
    }
}

/// One strike row of the upstream chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrikeRow {
    /// Strike price of the row (`null` if absent).
    pub strike_price: Value,
    /// Call contract object, if listed.
    pub call: Option<Map<String, Value>>,
    /// Put contract object, if listed.
    pub put: Option<Map<String, Value>>,
}

// =============================================================================
// Market Snapshot
// =============================================================================

/// Summary of the underlying at fetch time.
///
/// Values are kept exactly as the upstream sent them; absent ones are `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSnapshot {
    /// Current value of the underlying.
    #[serde(rename = "underlyingValue")]
    pub underlying_value: Value,
    /// Upstream timestamp of the data.
    pub timestamp: Value,
    /// Aggregate call-side open interest.
    #[serde(rename = "totCE")]
    pub total_call_oi: Value,
    /// Aggregate put-side open interest.
    #[serde(rename = "totPE")]
    pub total_put_oi: Value,
}

// =============================================================================
// Option Chain
// =============================================================================

/// One expiry's chain, partitioned by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    /// Underlying snapshot.
    #[serde(rename = "marketData")]
    pub market_data: MarketSnapshot,
    /// Every traded contract, calls before puts within a strike.
    #[serde(rename = "allOptions")]
    pub all_options: Vec<OptionRecord>,
    /// Traded calls.
    #[serde(rename = "ceOptions")]
    pub ce_options: Vec<OptionRecord>,
    /// Traded puts.
    #[serde(rename = "peOptions")]
    pub pe_options: Vec<OptionRecord>,
    /// Number of traded calls.
    #[serde(rename = "totalCE")]
    pub total_ce: usize,
    /// Number of traded puts.
    #[serde(rename = "totalPE")]
    pub total_pe: usize,
}

impl OptionChain {
    /// Build a chain from upstream strike rows, dropping untraded contracts.
    #[must_use]
    pub fn from_rows<I>(expiry: &str, market_data: MarketSnapshot, rows: I) -> Self
    where
        I: IntoIterator<Item = StrikeRow>,
    {
        let mut chain = Self {
            market_data,
            ..Self::default()
        };

        for row in rows {
            if let Some(call) = row.call.and_then(|fields| {
                OptionRecord::from_upstream(OptionSide::Call, &row.strike_price, expiry, fields)
            }) {
                chain.push(call);
            }
            if let Some(put) = row.put.and_then(|fields| {
                OptionRecord::from_upstream(OptionSide::Put, &row.strike_price, expiry, fields)
            }) {
                chain.push(put);
            }
        }

        chain
    }

    /// Consume the chain, keeping only one side.
    #[must_use]
    pub fn into_side(self, side: OptionSide) -> (MarketSnapshot, Vec<OptionRecord>) {
        match side {
            OptionSide::Call => (self.market_data, self.ce_options),
            OptionSide::Put => (self.market_data, self.pe_options),
        }
    }

    fn push(&mut self, record: OptionRecord) {
        self.all_options.push(record.clone());
        match record.side {
            OptionSide::Call => {
                self.ce_options.push(record);
                self.total_ce += 1;
            }
            OptionSide::Put => {
                self.pe_options.push(record);
                self.total_pe += 1;
            }
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Interpret a JSON value as a number, accepting numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Whether a `lastPrice` value shows the contract has traded.
fn has_traded(value: &Value) -> bool {
    as_number(value).is_some_and(|p| p.is_finite() && p != 0.0)
}

// =============================================================================
// Tests
// =============================================================================
