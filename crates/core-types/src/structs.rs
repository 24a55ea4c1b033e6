use crate::enums::Flow;
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single on-chain transfer, as exported by a block explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Unix epoch seconds.
    pub timestamp: i64,
    pub flow: Flow,
    /// Always non-negative; the direction lives in `flow`.
    pub value: Decimal,
    pub token_address: String,
}

impl TransferRecord {
    /// Builds a record from the raw `Time`, `Flow`, `Value` and `TokenAddress` cells of a row.
    pub fn from_fields(time: &str, flow: &str, value: &str, token_address: &str) -> Result<Self, CoreError> {
        let record = Self {
            timestamp: parse_timestamp(time)?,
            flow: flow.parse()?,
            value: parse_value(value)?,
            token_address: token_address.trim().to_string(),
        };
        // Reject timestamps chrono cannot represent up front, so `date()` is total.
        record.datetime()?;
        Ok(record)
    }

    /// The instant of the transfer in UTC.
    pub fn datetime(&self) -> Result<DateTime<Utc>, CoreError> {
        DateTime::from_timestamp(self.timestamp, 0)
            .ok_or_else(|| CoreError::InvalidInput("Time".to_string(), self.timestamp.to_string()))
    }

    /// The UTC calendar date of the transfer.
    pub fn date(&self) -> NaiveDate {
        self.datetime()
            .map(|dt| dt.date_naive())
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn is_outflow(&self) -> bool {
        self.flow == Flow::Out
    }
}

/// Epoch seconds; fractional seconds are floored.
fn parse_timestamp(raw: &str) -> Result<i64, CoreError> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }
    parse_decimal(raw)
        .and_then(|d| d.floor().to_i64())
        .ok_or_else(|| CoreError::InvalidInput("Time".to_string(), raw.to_string()))
}

fn parse_value(raw: &str) -> Result<Decimal, CoreError> {
    let raw = raw.trim();
    match parse_decimal(raw) {
        Some(value) if !value.is_sign_negative() || value.is_zero() => Ok(value),
        _ => Err(CoreError::InvalidInput("Value".to_string(), raw.to_string())),
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
