use crate::error::AnalyticsError;
use crate::report::{DailyAggregate, DayPnl, PnlReport};
use chrono::NaiveDate;
use core_types::{Flow, TransferRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

/// A stateless calculator that turns transfer records into a `PnlReport`.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    fee_threshold: Decimal,
    token_filter: HashSet<String>,
}

/// Running sums for a single date.
#[derive(Debug, Default)]
struct DayTotals {
    inflow: Decimal,
    outflow: Decimal,
    fees: Decimal,
}

impl AnalyticsEngine {
    /// # Arguments
    ///
    /// * `fee_threshold` - Outflows with a value at or below this are counted as fees.
    /// * `token_filter` - The token identifiers to analyze; every other row is ignored.
    pub fn new<I, S>(fee_threshold: Decimal, token_filter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fee_threshold,
            token_filter: token_filter.into_iter().map(Into::into).collect(),
        }
    }

    /// The main entry point for calculating the PnL summary.
    ///
    /// `records` may come in any order; the daily breakdown is always sorted by date.
    /// `skipped_rows` is carried into the report unchanged.
    pub fn calculate(
        &self,
        records: &[TransferRecord],
        skipped_rows: usize,
    ) -> Result<PnlReport, AnalyticsError> {
        let mut report = PnlReport::new();
        report.skipped_rows = skipped_rows;

        let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();

        for record in records
            .iter()
            .filter(|r| self.token_filter.contains(&r.token_address))
        {
            let day = days.entry(record.date()).or_default();
            match record.flow {
                Flow::In => {
                    report.total_inflow = add(report.total_inflow, record.value, "total inflow")?;
                    day.inflow = add(day.inflow, record.value, "daily inflow")?;
                }
                Flow::Out => {
                    report.total_outflow = add(report.total_outflow, record.value, "total outflow")?;
                    day.outflow = add(day.outflow, record.value, "daily outflow")?;

                    if self.is_fee(record) {
                        report.total_fees = add(report.total_fees, record.value, "total fees")?;
                        day.fees = add(day.fees, record.value, "daily fees")?;
                    }
                }
            }
        }

        report.total_pnl = sub(report.total_inflow, report.total_outflow, "net pnl")?;
        report.daily = days
            .into_iter()
            .map(|(date, totals)| Self::aggregate(date, totals))
            .collect::<Result<_, _>>()?;

        let (best_day, worst_day) = Self::extremes(&report.daily);
        report.best_day = best_day;
        report.worst_day = worst_day;

        tracing::debug!(
            days = report.daily.len(),
            total_pnl = %report.total_pnl,
            "PnL calculation finished."
        );

        Ok(report)
    }

    /// A fee is an outflow whose value does not exceed the threshold.
    pub fn is_fee(&self, record: &TransferRecord) -> bool {
        record.is_outflow() && record.value <= self.fee_threshold
    }

    fn aggregate(date: NaiveDate, totals: DayTotals) -> Result<DailyAggregate, AnalyticsError> {
        let pnl = sub(totals.inflow, totals.outflow, "daily pnl")?;
        let pnl_excluding_fees = add(pnl, totals.fees, "daily pnl excluding fees")?;
        Ok(DailyAggregate {
            date,
            inflow: totals.inflow,
            outflow: totals.outflow,
            pnl,
            fees: totals.fees,
            pnl_excluding_fees,
        })
    }

    /// Best and worst day by PnL. Ties go to the earliest date.
    fn extremes(daily: &[DailyAggregate]) -> (Option<DayPnl>, Option<DayPnl>) {
        let mut best: Option<DayPnl> = None;
        let mut worst: Option<DayPnl> = None;

        for day in daily {
            let current = DayPnl { date: day.date, pnl: day.pnl };
            if best.is_none_or(|b| current.pnl > b.pnl) {
                best = Some(current);
            }
            if worst.is_none_or(|w| current.pnl < w.pnl) {
                worst = Some(current);
            }
        }

        (best, worst)
    }
}

fn add(lhs: Decimal, rhs: Decimal, metric: &str) -> Result<Decimal, AnalyticsError> {
    lhs.checked_add(rhs)
        .ok_or_else(|| AnalyticsError::Overflow(metric.to_string()))
}

fn sub(lhs: Decimal, rhs: Decimal, metric: &str) -> Result<Decimal, AnalyticsError> {
    lhs.checked_sub(rhs)
        .ok_or_else(|| AnalyticsError::Overflow(metric.to_string()))
}
