//! NSE API wire types.
//!
//! Deserialization is lenient: absent sections default to empty so that a
//! partial payload yields a partial result. Values of the wrong JSON type
//! still fail to parse.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::option_chain::{MarketSnapshot, StrikeRow};

/// Response of `/api/option-chain-contract-info`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractInfoResponse {
    /// Listed expiries, possibly with duplicates.
    #[serde(rename = "expiryDates", default)]
    pub expiry_dates: Vec<String>,
}

/// Response of `/api/option-chain-v3`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionChainResponse {
    /// Chain records. Missing when NSE rejects the session.
    #[serde(default)]
    pub records: Option<Records>,
}

/// `records` section of the option chain response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Records {
    /// Strike rows.
    #[serde(default)]
    pub data: Vec<StrikeEntry>,
    /// Underlying value.
    #[serde(rename = "underlyingValue", default)]
    pub underlying_value: Value,
    /// Data timestamp.
    #[serde(default)]
    pub timestamp: Value,
    /// Total call open interest.
    #[serde(rename = "totCE", default)]
    pub tot_ce: Value,
    /// Total put open interest.
    #[serde(rename = "totPE", default)]
    pub tot_pe: Value,
}

/// One strike row in `records.data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrikeEntry {
    /// Strike price.
    #[serde(rename = "strikePrice", default)]
    pub strike_price: Value,
    /// Call contract.
    #[serde(rename = "CE", default)]
    pub ce: Option<Map<String, Value>>,
    /// Put contract.
    #[serde(rename = "PE", default)]
    pub pe: Option<Map<String, Value>>,
}

impl Records {
    /// Split into the market snapshot and the domain strike rows.
    pub fn into_parts(self) -> (MarketSnapshot, impl Iterator<Item = StrikeRow>) {
        let snapshot = MarketSnapshot {
            underlying_value: self.underlying_value,
            timestamp: self.timestamp,
            total_call_oi: self.tot_ce,
            total_put_oi: self.tot_pe,
        };
        (snapshot, self.data.into_iter().map(StrikeRow::from))
    }
}

impl From<StrikeEntry> for StrikeRow {
    fn from(entry: StrikeEntry) -> Self {
        Self {
            strike_price: entry.strike_price,
            call: entry.ce,
            put: entry.pe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn contract_info_defaults_to_empty() {
        let info: ContractInfoResponse = serde_json::from_value(json!({})).unwrap();
        assert!(info.expiry_dates.is_empty());

        let info: ContractInfoResponse = serde_json::from_value(json!({
            "expiryDates": ["27-Jun-2025", "04-Jul-2025"],
            "strikePrice": ["20000"]
        }))
        .unwrap();
        assert_eq!(info.expiry_dates, vec!["27-Jun-2025", "04-Jul-2025"]);
    }

    #[test]
    fn option_chain_parses_records() {
        let response: OptionChainResponse = serde_json::from_value(json!({
            "records": {
                "timestamp": "27-Jun-2025 15:30:00",
                "underlyingValue": 25112.4,
                "totCE": 120000,
                "totPE": "98000",
                "data": [
                    {
                        "strikePrice": 20000,
                        "CE": { "lastPrice": 10, "openInterest": 5 },
                        "PE": null
                    },
                    { "strikePrice": 20100 }
                ]
            }
        }))
        .unwrap();

        let (snapshot, rows) = response.records.unwrap().into_parts();
        assert_eq!(snapshot.underlying_value, json!(25112.4));
        assert_eq!(snapshot.timestamp, json!("27-Jun-2025 15:30:00"));
        assert_eq!(snapshot.total_call_oi, json!(120000));
        assert_eq!(snapshot.total_put_oi, json!("98000"));

        let rows: Vec<StrikeRow> = rows.collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].strike_price, json!(20000));
        assert!(rows[0].call.is_some());
        assert!(rows[0].put.is_none());
        assert!(rows[1].call.is_none());
    }

    #[test]
    fn snapshot_keeps_placeholders_and_nulls() {
        let response: OptionChainResponse = serde_json::from_value(json!({
            "records": { "underlyingValue": "-", "data": [] }
        }))
        .unwrap();

        let (snapshot, _) = response.records.unwrap().into_parts();
        assert_eq!(snapshot.underlying_value, json!("-"));
        assert_eq!(snapshot.timestamp, Value::Null);
        assert_eq!(snapshot.total_call_oi, Value::Null);
    }

    #[test]
    fn option_chain_without_records() {
        let response: OptionChainResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.records.is_none());
    }

    #[test]
    fn option_chain_rejects_non_array_data() {
        let parsed = serde_json::from_value::<OptionChainResponse>(json!({
            "records": { "data": "unavailable" }
        }));
        assert!(parsed.is_err());
    }
}
