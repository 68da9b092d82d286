//! Tools fetching time-series data as CSV

use crate::api::{CsvQuery, FetchOutcome, Interval, MarketDataSource, OutputSize, SeriesFunction};
use analyst_tools::{Tool, ToolError, ToolInvocationResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// How much raw CSV is echoed back to the model
const CSV_PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
struct DailyParams {
    symbol: String,
    #[serde(default = "default_adjusted")]
    adjusted: bool,
}

#[derive(Debug, Deserialize)]
struct IntradayParams {
    symbol: String,
    #[serde(default = "default_interval")]
    interval: Interval,
    #[serde(default)]
    month: Option<String>,
}

fn default_adjusted() -> bool {
    true
}

fn default_interval() -> Interval {
    Interval::Min5
}

/// Fetch the outcome and render it as tool-result text
///
/// A CSV payload gets one analysis pass plus a truncated raw echo; the
/// failure variants come back verbatim as prefixed strings so the model
/// (and tests) can branch on them.
async fn fetch_and_render(source: &dyn MarketDataSource, query: &CsvQuery) -> ToolInvocationResult {
    match source.fetch_csv(query).await {
        Ok(FetchOutcome::Csv(csv)) => {
            let summary = summarize_csv(&csv, &query.symbol);
            let preview: String = csv.chars().take(CSV_PREVIEW_CHARS).collect();
            let ellipsis = if csv.chars().count() > CSV_PREVIEW_CHARS {
                "..."
            } else {
                ""
            };
            ToolInvocationResult::text(format!(
                "{summary}\n\n📄 **Raw CSV Data**:\n```csv\n{preview}{ellipsis}\n```"
            ))
        }
        Ok(FetchOutcome::UpstreamError(msg)) => {
            ToolInvocationResult::text(format!("API Error: {msg}"))
        }
        Ok(FetchOutcome::RateLimited) => {
            ToolInvocationResult::text("Rate limit reached. Please try again later.")
        }
        Err(e) => ToolInvocationResult::text(format!("Error: {e}")),
    }
}

/// Quick analysis of a CSV payload
///
/// Reads the header plus first/last records: latest data point, current
/// price, volume, point count, and date range. Anything unrecognizable
/// degrades to a "retrieved but analysis failed" line instead of erroring.
pub fn summarize_csv(csv_data: &str, symbol: &str) -> String {
    let mut lines = csv_data.lines().filter(|l| !l.trim().is_empty());

    let Some(header) = lines.next() else {
        return format!("No data available for {symbol}");
    };
    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();
    if columns.len() < 2 {
        return format!(
            "CSV data retrieved ({} characters) but analysis failed: unrecognized format",
            csv_data.chars().count()
        );
    }

    let rows: Vec<&str> = lines.collect();
    if rows.is_empty() {
        return format!("No data available for {symbol}");
    }

    let timestamp_idx = column_index(&columns, &["timestamp", "date"]).unwrap_or(0);
    let close_idx = column_index(&columns, &["close", "adjusted_close"]);
    let volume_idx = column_index(&columns, &["volume"]);

    let latest: Vec<&str> = rows[0].split(',').map(str::trim).collect();
    let oldest: Vec<&str> = rows[rows.len() - 1].split(',').map(str::trim).collect();

    let latest_ts = latest.get(timestamp_idx).copied().unwrap_or("N/A");
    let oldest_ts = oldest.get(timestamp_idx).copied().unwrap_or("N/A");
    let close = close_idx
        .and_then(|i| latest.get(i))
        .copied()
        .unwrap_or("N/A");
    let volume = volume_idx
        .and_then(|i| latest.get(i))
        .copied()
        .map(format_volume)
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "📊 **CSV Data Analysis for {symbol}**\n\
         \n\
         📈 **Latest Data Point**: {latest_ts}\n\
         💰 **Current Price**: ${close}\n\
         📊 **Trading Volume**: {volume}\n\
         \n\
         📋 **Dataset Info**:\n\
         - Total data points: {count}\n\
         - Date range: {oldest_ts} to {latest_ts}\n\
         \n\
         💾 **CSV Data Retrieved**: {chars} characters of raw CSV data",
        count = rows.len(),
        chars = csv_data.chars().count(),
    )
}

fn column_index(columns: &[String], names: &[&str]) -> Option<usize> {
    columns
        .iter()
        .position(|c| names.contains(&c.as_str()))
}

/// Group a numeric volume with thousands separators; pass through non-numbers
fn format_volume(raw: &str) -> String {
    let Ok(value) = raw.parse::<u64>() else {
        return raw.to_string();
    };

    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Fetch daily stock data as CSV
pub struct DailyCsvTool {
    source: Arc<dyn MarketDataSource>,
}

impl DailyCsvTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for DailyCsvTool {
    async fn invoke(&self, params: Value) -> Result<ToolInvocationResult, ToolError> {
        let params: DailyParams = serde_json::from_value(params)?;
        let symbol = params.symbol.to_uppercase();
        info!(%symbol, "Fetching daily CSV data");

        let query = CsvQuery {
            symbol,
            function: if params.adjusted {
                SeriesFunction::DailyAdjusted
            } else {
                SeriesFunction::Daily
            },
            interval: None,
            output_size: OutputSize::Full,
            month: None,
        };

        Ok(fetch_and_render(self.source.as_ref(), &query).await)
    }

    fn name(&self) -> &'static str {
        "get_stock_csv_daily"
    }

    fn description(&self) -> &'static str {
        "Get daily stock data as CSV format (best for historical analysis). \
         Returns CSV data that can be saved or analyzed."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol (e.g., 'AAPL', 'GOOGL')"
                },
                "adjusted": {
                    "type": "boolean",
                    "description": "Whether to get adjusted prices",
                    "default": true
                }
            },
            "required": ["symbol"]
        })
    }
}

/// Fetch intraday stock data as CSV
pub struct IntradayCsvTool {
    source: Arc<dyn MarketDataSource>,
}

impl IntradayCsvTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for IntradayCsvTool {
    async fn invoke(&self, params: Value) -> Result<ToolInvocationResult, ToolError> {
        let params: IntradayParams = serde_json::from_value(params)?;
        let symbol = params.symbol.to_uppercase();
        info!(%symbol, interval = params.interval.as_str(), "Fetching intraday CSV data");

        let query = CsvQuery {
            symbol,
            function: SeriesFunction::Intraday,
            interval: Some(params.interval),
            output_size: OutputSize::Full,
            month: params.month,
        };

        Ok(fetch_and_render(self.source.as_ref(), &query).await)
    }

    fn name(&self) -> &'static str {
        "get_stock_csv_intraday"
    }

    fn description(&self) -> &'static str {
        "Get intraday stock data as CSV format (1min, 5min, 15min, 30min, 60min intervals). \
         Returns CSV data that can be saved or analyzed."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol (e.g., 'AAPL', 'GOOGL')"
                },
                "interval": {
                    "type": "string",
                    "description": "Time interval between data points",
                    "enum": ["1min", "5min", "15min", "30min", "60min"],
                    "default": "5min"
                },
                "month": {
                    "type": "string",
                    "description": "Optional month in YYYY-MM format for historical data"
                }
            },
            "required": ["symbol"]
        })
    }
}

/// Fetch weekly stock data as CSV
pub struct WeeklyCsvTool {
    source: Arc<dyn MarketDataSource>,
}

impl WeeklyCsvTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for WeeklyCsvTool {
    async fn invoke(&self, params: Value) -> Result<ToolInvocationResult, ToolError> {
        let params: DailyParams = serde_json::from_value(params)?;
        let symbol = params.symbol.to_uppercase();
        info!(%symbol, "Fetching weekly CSV data");

        let query = CsvQuery {
            symbol,
            function: if params.adjusted {
                SeriesFunction::WeeklyAdjusted
            } else {
                SeriesFunction::Weekly
            },
            interval: None,
            output_size: OutputSize::Full,
            month: None,
        };

        Ok(fetch_and_render(self.source.as_ref(), &query).await)
    }

    fn name(&self) -> &'static str {
        "get_stock_csv_weekly"
    }

    fn description(&self) -> &'static str {
        "Get weekly stock data as CSV format (long-term trends). \
         Returns CSV data that can be saved or analyzed."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol (e.g., 'AAPL', 'GOOGL')"
                },
                "adjusted": {
                    "type": "boolean",
                    "description": "Whether to get adjusted prices",
                    "default": true
                }
            },
            "required": ["symbol"]
        })
    }
}
