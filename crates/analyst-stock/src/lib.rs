//! Stock analysis request pipeline
//!
//! Classifies free-text stock questions into one of two handling paths
//! and dispatches each to an LLM-driven agent with the right tool
//! catalog, token budget, and deadline:
//!
//! - **Specific** requests (detailed, exportable, time-ranged data) run
//!   with the full Alpha Vantage CSV tool set including persistence, a
//!   2500-token budget, and a 120 second deadline; a saved CSV artifact
//!   is surfaced back to the caller.
//! - **General** requests (quick qualitative summaries) run with fetch
//!   tools only, a 1000-token budget, and a 60 second deadline.
//!
//! Classification fails open: a broken or timed-out classifier routes the
//! request down the general path instead of failing it. Neither path
//! retries, and a failure on one path is never replayed on the other.
//!
//! # Example
//!
//! ```rust,ignore
//! use analyst_llm::AnthropicProvider;
//! use analyst_stock::{AlphaVantageCsvClient, AnalystConfig, StockAnalyst, UserProfile};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(AnalystConfig::default().with_env_keys());
//!     let provider = Arc::new(AnthropicProvider::from_env()?);
//!     let source = Arc::new(AlphaVantageCsvClient::from_config(&config)?);
//!
//!     let analyst = StockAnalyst::new(config, provider, source);
//!     let outcome = analyst
//!         .smart_analyze("Get AAPL daily data and save it", "AAPL", &UserProfile::default())
//!         .await;
//!     println!("{}", outcome.response);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod tools;

// Re-export main types for convenience
pub use api::{AlphaVantageCsvClient, CsvQuery, FetchOutcome, MarketDataSource};
pub use classifier::RequestClassifier;
pub use config::AnalystConfig;
pub use dispatcher::{AnalysisOutcome, StockAnalyst};
pub use error::{AnalystError, Result};
pub use models::{
    CLASSIFY_FALLBACK_REASONING, DetailedStockData, RequestCategory, RequestClassification,
    StockDataPoint, UserProfile,
};
pub use parser::parse_stock_report;
