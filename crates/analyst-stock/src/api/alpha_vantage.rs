//! Alpha Vantage CSV client

use super::{CsvQuery, FetchOutcome, MarketDataSource, SeriesFunction};
use crate::config::AnalystConfig;
use crate::error::{AnalystError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{info, warn};

const BASE_URL: &str = "https://www.alphavantage.co/query";

// Substrings Alpha Vantage embeds in otherwise-200 responses
const ERROR_MARKER: &str = "Error Message";
const NOTE_MARKER: &str = "Note:";
const RATE_LIMIT_MARKER: &str = "Thank you for using Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage client fetching time series as CSV
#[derive(Debug, Clone)]
pub struct AlphaVantageCsvClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageCsvClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `config` - Supplies the transport timeout and requests-per-minute quota
    pub fn new(api_key: impl Into<String>, config: &AnalystConfig) -> Result<Self> {
        let quota = Quota::per_minute(
            NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::new(5).unwrap()),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter,
        })
    }

    /// Create from the config's stored API key
    pub fn from_config(config: &AnalystConfig) -> Result<Self> {
        let api_key = config.alpha_vantage_api_key.clone().ok_or_else(|| {
            AnalystError::Config("Alpha Vantage API key not configured".to_string())
        })?;
        Self::new(api_key, config)
    }

    fn build_params(&self, query: &CsvQuery) -> Result<Vec<(&'static str, String)>> {
        let mut params = vec![
            ("function", query.function.as_str().to_string()),
            ("symbol", query.symbol.clone()),
            ("apikey", self.api_key.clone()),
            ("datatype", "csv".to_string()),
            ("outputsize", query.output_size.as_str().to_string()),
        ];

        if query.function == SeriesFunction::Intraday {
            let interval = query.interval.ok_or_else(|| {
                AnalystError::Config("interval is required for intraday series".to_string())
            })?;
            params.push(("interval", interval.as_str().to_string()));
        }

        if let Some(month) = &query.month {
            params.push(("month", month.clone()));
        }

        Ok(params)
    }

    /// Classify a 200 response body: CSV, embedded error, or rate-limit notice
    fn triage_body(body: String) -> FetchOutcome {
        if body.contains(ERROR_MARKER) || body.contains(NOTE_MARKER) {
            warn!("Alpha Vantage returned an embedded error");
            return FetchOutcome::UpstreamError(body);
        }

        if body.contains(RATE_LIMIT_MARKER) {
            warn!("Alpha Vantage rate limit reached");
            return FetchOutcome::RateLimited;
        }

        info!(bytes = body.len(), "Fetched CSV payload");
        FetchOutcome::Csv(body)
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageCsvClient {
    async fn fetch_csv(&self, query: &CsvQuery) -> Result<FetchOutcome> {
        self.rate_limiter.until_ready().await;

        let params = self.build_params(query)?;

        info!(
            function = query.function.as_str(),
            symbol = %query.symbol,
            "Fetching Alpha Vantage CSV data"
        );

        let response = self
            .client
            .get(BASE_URL)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalystError::UpstreamTimeout
                } else {
                    AnalystError::Http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Ok(FetchOutcome::UpstreamError(format!(
                "HTTP {status}: {body}"
            )));
        }

        Ok(Self::triage_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Interval, OutputSize};

    fn client() -> AlphaVantageCsvClient {
        AlphaVantageCsvClient::new("test_key", &AnalystConfig::default()).unwrap()
    }

    fn daily_query() -> CsvQuery {
        CsvQuery {
            symbol: "AAPL".to_string(),
            function: SeriesFunction::DailyAdjusted,
            interval: None,
            output_size: OutputSize::Full,
            month: None,
        }
    }

    #[test]
    fn test_params_for_daily_query() {
        let params = client().build_params(&daily_query()).unwrap();

        assert!(params.contains(&("function", "TIME_SERIES_DAILY_ADJUSTED".to_string())));
        assert!(params.contains(&("datatype", "csv".to_string())));
        assert!(params.contains(&("outputsize", "full".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "interval"));
    }

    #[test]
    fn test_intraday_requires_interval() {
        let query = CsvQuery {
            function: SeriesFunction::Intraday,
            ..daily_query()
        };
        assert!(client().build_params(&query).is_err());

        let query = CsvQuery {
            function: SeriesFunction::Intraday,
            interval: Some(Interval::Min5),
            month: Some("2024-01".to_string()),
            ..daily_query()
        };
        let params = client().build_params(&query).unwrap();
        assert!(params.contains(&("interval", "5min".to_string())));
        assert!(params.contains(&("month", "2024-01".to_string())));
    }

    #[test]
    fn test_triage_valid_csv() {
        let body = "timestamp,open,high,low,close,volume\n2024-01-02,100,101,99,100.5,12345\n";
        match AlphaVantageCsvClient::triage_body(body.to_string()) {
            FetchOutcome::Csv(csv) => assert!(csv.starts_with("timestamp,")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_triage_embedded_error() {
        let body = r#"{"Error Message": "Invalid API call"}"#;
        assert!(matches!(
            AlphaVantageCsvClient::triage_body(body.to_string()),
            FetchOutcome::UpstreamError(_)
        ));
    }

    #[test]
    fn test_triage_rate_limit_notice() {
        let body = "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day.";
        assert_eq!(
            AlphaVantageCsvClient::triage_body(body.to_string()),
            FetchOutcome::RateLimited
        );
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_fetch_daily_live() {
        let config = AnalystConfig::default().with_env_keys();
        let client = AlphaVantageCsvClient::from_config(&config).unwrap();
        let outcome = client.fetch_csv(&daily_query()).await.unwrap();
        assert!(matches!(outcome, FetchOutcome::Csv(_)));
    }
}
