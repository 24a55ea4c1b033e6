use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The per-calendar-date rollup of a wallet's transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub inflow: Decimal,
    pub outflow: Decimal,
    /// `inflow - outflow`.
    pub pnl: Decimal,
    /// Sum of the outflows classified as fees.
    pub fees: Decimal,
    /// `pnl + fees`, i.e. the result had no fees been paid.
    pub pnl_excluding_fees: Decimal,
}

/// A single day together with its PnL, used for the best and worst day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPnl {
    pub date: NaiveDate,
    pub pnl: Decimal,
}

/// The PnL summary of one transfer export.
///
/// This struct is the final output of the `AnalyticsEngine`. It carries no
/// formatting; see [`crate::render`] for turning it into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlReport {
    // I. Totals
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub total_pnl: Decimal,
    pub total_fees: Decimal,

    // II. Extremes. `None` when no day matched the filter.
    pub best_day: Option<DayPnl>,
    pub worst_day: Option<DayPnl>,

    // III. Daily breakdown, ascending by date.
    pub daily: Vec<DailyAggregate>,

    // IV. Data quality
    /// Data rows that could not be parsed and were left out of every sum.
    pub skipped_rows: usize,
}

impl PnlReport {
    /// Creates a new, zeroed-out PnlReport.
    /// This is also the result for an export without matching transfers.
    pub fn new() -> Self {
        Self {
            total_inflow: Decimal::ZERO,
            total_outflow: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            best_day: None,
            worst_day: None,
            daily: Vec::new(),
            skipped_rows: 0,
        }
    }
}

impl Default for PnlReport {
    fn default() -> Self {
        Self::new()
    }
}
