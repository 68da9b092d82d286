//! Market-data provider interface
//!
//! The adapter boundary translates provider responses into a tagged
//! [`FetchOutcome`] exactly once; nothing downstream re-parses response
//! bodies to detect errors or rate limiting.

mod alpha_vantage;

pub use alpha_vantage::AlphaVantageCsvClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Time-series endpoint to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesFunction {
    Daily,
    DailyAdjusted,
    Weekly,
    WeeklyAdjusted,
    Intraday,
}

impl SeriesFunction {
    /// Provider-side function name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "TIME_SERIES_DAILY",
            Self::DailyAdjusted => "TIME_SERIES_DAILY_ADJUSTED",
            Self::Weekly => "TIME_SERIES_WEEKLY",
            Self::WeeklyAdjusted => "TIME_SERIES_WEEKLY_ADJUSTED",
            Self::Intraday => "TIME_SERIES_INTRADAY",
        }
    }
}

/// Sampling interval for intraday series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1min")]
    Min1,
    #[serde(rename = "5min")]
    Min5,
    #[serde(rename = "15min")]
    Min15,
    #[serde(rename = "30min")]
    Min30,
    #[serde(rename = "60min")]
    Min60,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min1 => "1min",
            Self::Min5 => "5min",
            Self::Min15 => "15min",
            Self::Min30 => "30min",
            Self::Min60 => "60min",
        }
    }
}

/// How much of the series to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputSize {
    /// Latest 100 data points
    Compact,
    /// Full-length time series
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

/// A single CSV time-series query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvQuery {
    /// Stock ticker symbol
    pub symbol: String,

    /// Which series to fetch
    pub function: SeriesFunction,

    /// Sampling interval (required for intraday)
    pub interval: Option<Interval>,

    /// How much history to fetch
    pub output_size: OutputSize,

    /// Month in `YYYY-MM` format for historical intraday data
    pub month: Option<String>,
}

/// What the provider answered, translated once at the adapter boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Valid CSV payload
    Csv(String),

    /// The provider returned an explicit error message
    UpstreamError(String),

    /// The provider reported rate limiting
    RateLimited,
}

/// A source of CSV time-series data
///
/// One transport attempt per call; no retries. Transport-level timeouts
/// surface as [`crate::AnalystError::UpstreamTimeout`].
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch one time series as CSV text
    async fn fetch_csv(&self, query: &CsvQuery) -> Result<FetchOutcome>;
}
