//! Report rendering.

use chrono::{DateTime, Utc};
use lotbook_booking::BookingReport;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// A booking report together with the import warnings that preceded it.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Rows the importer skipped
    pub warnings: &'a [String],
    /// The booking result
    #[serde(flatten)]
    pub report: &'a BookingReport,
}

/// Write the report as pretty-printed JSON.
pub fn render_json<W: Write>(
    report: &BookingReport,
    warnings: &[String],
    writer: &mut W,
) -> std::io::Result<()> {
    let output = JsonReport { warnings, report };
    serde_json::to_writer_pretty(&mut *writer, &output)?;
    writeln!(writer)
}

/// Write the report as text.
///
/// Money values are rounded to `precision` decimal places; sizes are shown
/// as recorded.
pub fn render_text<W: Write>(
    report: &BookingReport,
    precision: u32,
    writer: &mut W,
) -> std::io::Result<()> {
    let money = |value: Decimal| {
        let rounded = value.round_dp(precision);
        format!("{rounded:.prec$}", prec = precision as usize)
    };

    for gain in &report.realized {
        writeln!(
            writer,
            "{} sold {} {}: profit = {}, fees = {}",
            day(gain.date),
            gain.size.normalize(),
            gain.kind,
            money(gain.profit),
            money(gain.fee),
        )?;
    }
    if !report.realized.is_empty() {
        writeln!(writer)?;
    }

    writeln!(writer, "final cost basis")?;
    for position in &report.positions {
        write!(
            writer,
            "  {:<8} {:>16} cost {:>14} fees {:>10}",
            position.kind.as_str(),
            position.lot.size.normalize(),
            money(position.lot.cost),
            money(position.lot.fees),
        )?;
        match position.rate {
            Some(rate) => writeln!(writer, " @ {}", money(rate))?,
            None => writeln!(writer)?,
        }
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "total profit = {}, fees = {}",
        money(report.total_profit),
        money(report.total_fees),
    )?;

    if report.dropped > 0 {
        writeln!(
            writer,
            "warning: {} unrecognized event(s) dropped ({} rows)",
            report.dropped, report.dropped_rows
        )?;
    }
    for shortfall in &report.shortfalls {
        writeln!(
            writer,
            "warning: {} {} withdrawal of {} short by {}",
            day(shortfall.date),
            shortfall.kind,
            shortfall.requested.normalize(),
            shortfall.missing.normalize(),
        )?;
    }

    Ok(())
}

fn day(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lotbook_booking::{book_rows, BookingConfig};
    use lotbook_core::{Row, RowType};
    use rust_decimal_macros::dec;

    fn report() -> BookingReport {
        let time = |day: u32| Utc.with_ymd_and_hms(2019, 1, day, 12, 0, 0).unwrap();
        let leg = |id: &str, amount, unit: &str, day| {
            Row::new(RowType::Match, Some(id.to_string()), amount, unit, time(day))
        };
        let rows = vec![
            leg("1", dec!(1), "btc", 2),
            leg("1", dec!(-10000), "usd", 2),
            Row::new(RowType::Fee, Some("1".into()), dec!(-300), "usd", time(2)),
            leg("2", dec!(-0.5), "btc", 3),
            leg("2", dec!(6000), "usd", 3),
            leg("3", dec!(-1), "btc", 4),
            leg("3", dec!(12000), "usd", 4),
            Row::new(RowType::Other("rebate".into()), None, dec!(1), "usd", time(5)),
        ];
        book_rows(rows, &BookingConfig::default()).unwrap()
    }

    fn text(report: &BookingReport) -> String {
        let mut out = Vec::new();
        render_text(report, 2, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_lists_sales_and_positions() {
        let out = text(&report());
        assert!(out.contains("2019-01-03 sold 0.5 btc: profit = 1000.00, fees = 150.00"));
        assert!(out.contains("2019-01-04 sold 1 btc: profit = 7000.00, fees = 150.00"));
        assert!(out.contains("final cost basis"));
        assert!(out.contains("total profit = 8000.00, fees = 300.00"));
    }

    #[test]
    fn test_text_reports_anomalies() {
        let out = text(&report());
        assert!(out.contains("warning: 1 unrecognized event(s) dropped (1 rows)"));
        assert!(out.contains("warning: 2019-01-04 btc withdrawal of 1 short by 0.5"));
    }

    #[test]
    fn test_text_for_empty_report() {
        let out = text(&BookingReport::default());
        assert_eq!(out, "final cost basis\n\ntotal profit = 0.00, fees = 0.00\n");
    }

    #[test]
    fn test_json_report() {
        let mut out = Vec::new();
        let warnings = vec!["Row 4: invalid amount 'x'".to_string()];
        render_json(&report(), &warnings, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["warnings"][0], "Row 4: invalid amount 'x'");
        assert_eq!(value["realized"].as_array().unwrap().len(), 2);
        assert_eq!(value["dropped"], 1);
        assert_eq!(value["positions"][0]["kind"], "btc");
        assert_eq!(value["shortfalls"][0]["missing"], "0.5");
    }
}
