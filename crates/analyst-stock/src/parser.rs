//! Parsing loosely structured report text into typed records
//!
//! Agent and tool output sometimes embeds OHLCV records as prose. Exactly
//! two shapes are accepted: single-line records and multi-line key:value
//! blocks. Anything else parses to zero data points — no guessing.

use crate::models::{DetailedStockData, StockDataPoint, SummaryStats};
use chrono::Local;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

// Single-line shape:
//   2025-06-06: Open: 203.0000 High: 205.7000 Low: 202.1000 Close: 204.2000 Volume: 46,607,693
static SINGLE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4}-\d{2}-\d{2}(?:\s+\d{2}:\d{2}:\d{2})?):?\s*Open:\s*([\d.]+)\s*High:\s*([\d.]+)\s*Low:\s*([\d.]+)\s*Close:\s*([\d.]+)\s*Volume:\s*([\d,]+)",
    )
    .expect("single-line pattern is valid")
});

// Multi-line shape:
//   2025-06-06:
//     Open: 203.0000
//     High: 205.7000
//     ...
static MULTI_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4}-\d{2}-\d{2}(?:\s+\d{2}:\d{2}:\d{2})?):[\s\S]*?Open:\s*([\d.]+)[\s\S]*?High:\s*([\d.]+)[\s\S]*?Low:\s*([\d.]+)[\s\S]*?Close:\s*([\d.]+)[\s\S]*?Volume:\s*([\d,]+)",
    )
    .expect("multi-line pattern is valid")
});

/// Parse report text into typed data points
///
/// Day-over-day change fields diff consecutive closes in ingestion order,
/// so callers must normalize record ordering before relying on them; the
/// first record carries no change fields.
pub fn parse_stock_report(report: &str, symbol: &str) -> DetailedStockData {
    let single: Vec<_> = SINGLE_LINE.captures_iter(report).collect();
    let captures = if single.is_empty() {
        MULTI_LINE.captures_iter(report).collect()
    } else {
        single
    };

    info!(
        %symbol,
        matches = captures.len(),
        "Parsing report text into data points"
    );

    let mut data_points = Vec::with_capacity(captures.len());
    let mut previous_close: Option<f64> = None;

    for (i, caps) in captures.iter().enumerate() {
        let parsed = (|| {
            let date = caps.get(1)?.as_str().trim().to_string();
            let open: f64 = caps.get(2)?.as_str().parse().ok()?;
            let high: f64 = caps.get(3)?.as_str().parse().ok()?;
            let low: f64 = caps.get(4)?.as_str().parse().ok()?;
            let close: f64 = caps.get(5)?.as_str().parse().ok()?;
            let volume: u64 = caps.get(6)?.as_str().replace(',', "").parse().ok()?;
            Some((date, open, high, low, close, volume))
        })();

        let Some((date, open, high, low, close, volume)) = parsed else {
            debug!(record = i + 1, "Skipping unparseable record");
            continue;
        };

        let (daily_change, daily_change_pct) = match previous_close {
            Some(prev) => {
                let change = close - prev;
                (Some(change), Some(change / prev * 100.0))
            }
            None => (None, None),
        };

        data_points.push(StockDataPoint {
            date,
            symbol: symbol.to_string(),
            open_price: open,
            high_price: high,
            low_price: low,
            close_price: close,
            volume,
            daily_change,
            daily_change_pct,
        });
        previous_close = Some(close);
    }

    let summary_stats = summarize(&data_points);

    DetailedStockData {
        symbol: symbol.to_string(),
        data_points,
        analysis_date: Local::now().to_rfc3339(),
        summary_stats,
    }
}

fn summarize(data_points: &[StockDataPoint]) -> Option<SummaryStats> {
    if data_points.is_empty() {
        return None;
    }

    let closes: Vec<f64> = data_points.iter().map(|p| p.close_price).collect();
    let total_volume: u64 = data_points.iter().map(|p| p.volume).sum();

    Some(SummaryStats {
        avg_close: closes.iter().sum::<f64>() / closes.len() as f64,
        max_close: closes.iter().copied().fold(f64::MIN, f64::max),
        min_close: closes.iter().copied().fold(f64::MAX, f64::min),
        avg_volume: total_volume as f64 / data_points.len() as f64,
        total_data_points: data_points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_LINE_REPORT: &str = "\
2025-06-04: Open: 99.0000 High: 101.0000 Low: 98.0000 Close: 100.0000 Volume: 1,000,000
2025-06-05: Open: 100.5000 High: 103.0000 Low: 100.0000 Close: 102.0000 Volume: 1,200,000
2025-06-06: Open: 101.0000 High: 102.0000 Low: 98.5000 Close: 99.0000 Volume: 900,000";

    #[test]
    fn test_day_over_day_changes() {
        let data = parse_stock_report(SINGLE_LINE_REPORT, "AAPL");
        assert_eq!(data.data_points.len(), 3);

        let first = &data.data_points[0];
        assert!(first.daily_change.is_none());
        assert!(first.daily_change_pct.is_none());

        let second = &data.data_points[1];
        assert!((second.daily_change.unwrap() - 2.0).abs() < 1e-9);
        assert!((second.daily_change_pct.unwrap() - 2.0).abs() < 1e-9);

        let third = &data.data_points[2];
        assert!((third.daily_change.unwrap() - -3.0).abs() < 1e-9);
        // -3 / 102 * 100 = -2.9412% to 4 significant digits
        assert!((third.daily_change_pct.unwrap() - -2.9412).abs() < 5e-5);
    }

    #[test]
    fn test_multi_line_shape() {
        let report = "\
2025-06-06:
  Open: 203.0000
  High: 205.7000
  Low: 202.1000
  Close: 204.2000
  Volume: 46,607,693";

        let data = parse_stock_report(report, "AAPL");
        assert_eq!(data.data_points.len(), 1);

        let point = &data.data_points[0];
        assert_eq!(point.date, "2025-06-06");
        assert!((point.close_price - 204.2).abs() < 1e-9);
        assert_eq!(point.volume, 46_607_693);
    }

    #[test]
    fn test_datetime_stamp_is_kept() {
        let report =
            "2025-06-06 15:30:00: Open: 1.0 High: 2.0 Low: 0.5 Close: 1.5 Volume: 100";
        let data = parse_stock_report(report, "AAPL");
        assert_eq!(data.data_points[0].date, "2025-06-06 15:30:00");
    }

    #[test]
    fn test_unrecognized_shape_yields_nothing() {
        let data = parse_stock_report("AAPL closed higher today on strong volume.", "AAPL");
        assert!(data.data_points.is_empty());
        assert!(data.summary_stats.is_none());
    }

    #[test]
    fn test_summary_stats() {
        let data = parse_stock_report(SINGLE_LINE_REPORT, "AAPL");
        let stats = data.summary_stats.unwrap();

        assert_eq!(stats.total_data_points, 3);
        assert!((stats.avg_close - (100.0 + 102.0 + 99.0) / 3.0).abs() < 1e-9);
        assert!((stats.max_close - 102.0).abs() < 1e-9);
        assert!((stats.min_close - 99.0).abs() < 1e-9);
        assert!((stats.avg_volume - (1_000_000.0 + 1_200_000.0 + 900_000.0) / 3.0).abs() < 1e-3);
    }
}
