//! Turns a [`PnlReport`] into the text sent back to the user.
//!
//! The template is fixed; only the output dialect varies. A [`Markup`] receives the
//! raw dynamic substrings (numbers, dates, messages) and the static labels, and is
//! responsible for escaping them *before* adding its own control characters. That
//! way template markers are never escaped by accident.

use crate::report::{DayPnl, PnlReport};
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places used for every monetary value.
pub const AMOUNT_DP: u32 = 6;

/// Suffix appended to every monetary value.
pub const CURRENCY_MARKER: &str = "$";

/// Header row of the daily breakdown.
pub const DAILY_HEADER: &str = "Date | PnL with fees | PnL without fees | Total fees";

/// An output dialect for rendered reports.
pub trait Markup {
    /// Escapes free text placed outside of any entity.
    fn escape(&self, text: &str) -> String;
    /// Emphasised label.
    fn bold(&self, text: &str) -> String;
    /// Inline monospace value.
    fn code(&self, text: &str) -> String;
    /// Monospace block.
    fn pre(&self, text: &str) -> String;
}

/// Renders the report without any markup, exactly as the template reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainText;

impl Markup for PlainText {
    fn escape(&self, text: &str) -> String {
        text.to_string()
    }

    fn bold(&self, text: &str) -> String {
        text.to_string()
    }

    fn code(&self, text: &str) -> String {
        text.to_string()
    }

    fn pre(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Formats an amount to six decimal places with the currency marker, e.g. `9.500000$`.
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(AMOUNT_DP, RoundingStrategy::MidpointAwayFromZero);
    // "-0.000000$" reads as a loss; tiny negative remainders collapse to zero.
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{:.prec$}{}", rounded, CURRENCY_MARKER, prec = AMOUNT_DP as usize)
}

/// `2023-11-14 (9.500000$)`, or `NA (0.000000$)` when there is no such day.
fn format_day(day: Option<DayPnl>) -> String {
    match day {
        Some(day) => format!("{} ({})", day.date, format_amount(day.pnl)),
        None => format!("NA ({})", format_amount(Decimal::ZERO)),
    }
}

/// The daily breakdown: header plus one line per day.
pub fn daily_table(report: &PnlReport) -> String {
    let mut lines = vec![DAILY_HEADER.to_string()];
    lines.extend(report.daily.iter().map(|day| {
        format!(
            "{} {} {} {}",
            day.date,
            format_amount(day.pnl),
            format_amount(day.pnl_excluding_fees),
            format_amount(day.fees)
        )
    }));
    lines.join("\n")
}

/// Renders the full report in the given markup.
pub fn render_report(report: &PnlReport, markup: &dyn Markup) -> String {
    let field = |icon: &str, label: &str, value: String| {
        format!("{} {} {}", icon, markup.bold(label), markup.code(&value))
    };

    let mut sections = vec![
        format!("✅ {}", markup.bold("Analysis completed")),
        [
            format!("📊 {}", markup.bold("Solana wallet transaction analysis:")),
            field("💰", "Total inflow:", format_amount(report.total_inflow)),
            field("💸", "Total outflow:", format_amount(report.total_outflow)),
            field("📉", "Net PnL:", format_amount(report.total_pnl)),
        ]
        .join("\n"),
        format!(
            "📅 {}\n{}",
            markup.bold("PnL by days:"),
            markup.pre(&daily_table(report))
        ),
        [
            field("✅", "Best day:", format_day(report.best_day)),
            field("❌", "Worst day:", format_day(report.worst_day)),
        ]
        .join("\n"),
        field("🏦", "Total fees:", format_amount(report.total_fees)),
    ];

    if report.skipped_rows > 0 {
        let last = sections.len() - 1;
        sections[last].push('\n');
        sections[last].push_str(&markup.escape(&format!(
            "⚠️ Skipped malformed rows: {}",
            report.skipped_rows
        )));
    }

    sections.join("\n\n")
}

/// Renders a user-facing error report, e.g. `❌ Error: missing required columns`.
pub fn render_error(title: &str, message: &str, markup: &dyn Markup) -> String {
    format!("❌ {} {}", markup.bold(&format!("{title}:")), markup.code(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DailyAggregate;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_report() -> PnlReport {
        let d1 = NaiveDate::from_ymd_opt(2023, 11, 14).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        PnlReport {
            total_inflow: dec!(10),
            total_outflow: dec!(3.5),
            total_pnl: dec!(6.5),
            total_fees: dec!(0.5),
            best_day: Some(DayPnl { date: d1, pnl: dec!(9.5) }),
            worst_day: Some(DayPnl { date: d2, pnl: dec!(-3) }),
            daily: vec![
                DailyAggregate {
                    date: d1,
                    inflow: dec!(10),
                    outflow: dec!(0.5),
                    pnl: dec!(9.5),
                    fees: dec!(0.5),
                    pnl_excluding_fees: dec!(10),
                },
                DailyAggregate {
                    date: d2,
                    inflow: Decimal::ZERO,
                    outflow: dec!(3),
                    pnl: dec!(-3),
                    fees: Decimal::ZERO,
                    pnl_excluding_fees: dec!(-3),
                },
            ],
            skipped_rows: 0,
        }
    }

    #[test]
    fn formats_amounts_to_six_places() {
        assert_eq!(format_amount(dec!(10)), "10.000000$");
        assert_eq!(format_amount(dec!(-3)), "-3.000000$");
        assert_eq!(format_amount(dec!(0.0000005)), "0.000001$");
        assert_eq!(format_amount(dec!(-0.0000001)), "0.000000$");
    }

    #[test]
    fn plain_rendering_matches_the_template() {
        let expected = "✅ Analysis completed\n\
\n\
📊 Solana wallet transaction analysis:\n\
💰 Total inflow: 10.000000$\n\
💸 Total outflow: 3.500000$\n\
📉 Net PnL: 6.500000$\n\
\n\
📅 PnL by days:\n\
Date | PnL with fees | PnL without fees | Total fees\n\
2023-11-14 9.500000$ 10.000000$ 0.500000$\n\
2023-11-15 -3.000000$ -3.000000$ 0.000000$\n\
\n\
✅ Best day: 2023-11-14 (9.500000$)\n\
❌ Worst day: 2023-11-15 (-3.000000$)\n\
\n\
🏦 Total fees: 0.500000$";

        assert_eq!(render_report(&sample_report(), &PlainText), expected);
    }

    #[test]
    fn empty_report_uses_na_sentinels() {
        let text = render_report(&PnlReport::new(), &PlainText);
        assert!(text.contains("✅ Best day: NA (0.000000$)"));
        assert!(text.contains("❌ Worst day: NA (0.000000$)"));
        assert!(text.contains("📅 PnL by days:\nDate | PnL with fees | PnL without fees | Total fees\n\n✅"));
    }

    #[test]
    fn skipped_rows_add_a_warning_line() {
        let mut report = sample_report();
        report.skipped_rows = 2;
        let text = render_report(&report, &PlainText);
        assert!(text.ends_with("🏦 Total fees: 0.500000$\n⚠️ Skipped malformed rows: 2"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let report = sample_report();
        assert_eq!(render_report(&report, &PlainText), render_report(&report.clone(), &PlainText));
    }

    #[test]
    fn error_report() {
        assert_eq!(
            render_error("Error", "missing required columns", &PlainText),
            "❌ Error: missing required columns"
        );
    }
}
