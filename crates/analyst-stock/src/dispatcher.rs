//! Request dispatch
//!
//! One classification per request, one handling path per classification.
//! The two paths are independent terminal states: each carries its own
//! tool catalog, token budget, and deadline, and a failure on one path is
//! never retried on the other.

use crate::api::MarketDataSource;
use crate::classifier::RequestClassifier;
use crate::config::AnalystConfig;
use crate::error::{AnalystError, Result};
use crate::formatter;
use crate::models::{DetailedStockData, RequestCategory, UserProfile};
use crate::prompts;
use crate::tools::{DailyCsvTool, IntradayCsvTool, SaveCsvTool, WeeklyCsvTool};
use analyst_llm::LlmProvider;
use analyst_runtime::{ExecutorConfig, ToolExecutor};
use analyst_tools::{Tool, ToolRegistry};
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Symbols used for a market overview when the caller names none
const OVERVIEW_SYMBOLS: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"];

/// Result of one dispatched request
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// User-facing response text
    pub response: String,

    /// Filename of the CSV artifact, when the request produced one
    pub csv_file: Option<String>,
}

/// The analysis pipeline: classifier, dispatcher, and tool catalogs
///
/// Holds only read-only shared state, so one instance serves concurrent
/// requests; each request's classification and tool results are
/// independent.
pub struct StockAnalyst {
    config: Arc<AnalystConfig>,
    provider: Arc<dyn LlmProvider>,
    classifier: RequestClassifier,
    full_registry: Arc<ToolRegistry>,
    fetch_registry: Arc<ToolRegistry>,
}

impl StockAnalyst {
    /// Build the pipeline from its collaborators
    ///
    /// The "specific" path gets the full catalog including persistence;
    /// the "general" path gets the fetch tools only.
    pub fn new(
        config: Arc<AnalystConfig>,
        provider: Arc<dyn LlmProvider>,
        source: Arc<dyn MarketDataSource>,
    ) -> Self {
        let daily = Arc::new(DailyCsvTool::new(source.clone())) as Arc<dyn Tool>;
        let intraday = Arc::new(IntradayCsvTool::new(source.clone())) as Arc<dyn Tool>;
        let weekly = Arc::new(WeeklyCsvTool::new(source)) as Arc<dyn Tool>;
        let save = Arc::new(SaveCsvTool::new(config.output_dir.clone())) as Arc<dyn Tool>;

        let fetch_registry = Arc::new(ToolRegistry::from_tools([
            daily.clone(),
            intraday.clone(),
            weekly.clone(),
        ]));
        let full_registry = Arc::new(ToolRegistry::from_tools([daily, intraday, weekly, save]));

        let classifier = RequestClassifier::new(provider.clone(), &config);

        Self {
            config,
            provider,
            classifier,
            full_registry,
            fetch_registry,
        }
    }

    /// Classify a request, falling open to "general" on failure
    pub async fn classify_request(&self, user_input: &str) -> crate::models::RequestClassification {
        self.classifier.classify(user_input).await
    }

    /// Classify and dispatch one request
    pub async fn smart_analyze(
        &self,
        user_input: &str,
        symbol: &str,
        profile: &UserProfile,
    ) -> AnalysisOutcome {
        let classification = self.classify_request(user_input).await;

        info!(
            category = ?classification.category,
            %symbol,
            "Dispatching request"
        );

        match classification.category {
            RequestCategory::Specific => self.handle_specific(user_input, symbol, profile).await,
            RequestCategory::General => AnalysisOutcome {
                response: self.handle_general(user_input, symbol, profile).await,
                csv_file: None,
            },
        }
    }

    /// Tool-rich path: detailed analysis with CSV export
    pub async fn handle_specific(
        &self,
        user_input: &str,
        symbol: &str,
        profile: &UserProfile,
    ) -> AnalysisOutcome {
        info!(%symbol, user_input, "Handling specific request");

        let executor = self.executor(
            &self.full_registry,
            prompts::SPECIFIC_SYSTEM_PROMPT,
            self.config.specific_max_tokens,
        );
        let instruction = prompts::specific_instruction(symbol, profile);

        match timeout(self.config.specific_timeout, executor.run(instruction)).await {
            Ok(Ok(output)) => {
                let csv_file = formatter::extract_saved_csv(&output);
                AnalysisOutcome {
                    response: formatter::format_specific_response(symbol, &output),
                    csv_file,
                }
            }
            Ok(Err(e)) => {
                error!(%symbol, error = %e, "Specific request failed");
                AnalysisOutcome {
                    response: format!("❌ Detailed analysis failed for {symbol}: {e}"),
                    csv_file: None,
                }
            }
            Err(_) => {
                error!(%symbol, "Specific request timed out");
                AnalysisOutcome {
                    response: format!(
                        "⏰ Detailed analysis for {symbol} timed out. The analysis was taking \
                         too long. Please try again or use a simpler request."
                    ),
                    csv_file: None,
                }
            }
        }
    }

    /// Lighter path: text summary, no persistence tools
    pub async fn handle_general(
        &self,
        user_input: &str,
        symbol: &str,
        profile: &UserProfile,
    ) -> String {
        info!(%symbol, user_input, "Handling general request");

        let instruction = prompts::general_instruction(symbol, profile);
        self.run_general(symbol, instruction, self.config.general_max_tokens, self.config.general_timeout)
            .await
    }

    /// Single-stock analysis with a caller-chosen deadline
    pub async fn analyze_stock(
        &self,
        symbol: &str,
        profile: &UserProfile,
        deadline: Duration,
    ) -> String {
        info!(%symbol, user = %profile.name, "Starting analysis");

        let instruction = prompts::analyze_instruction(symbol, profile);
        self.run_general(symbol, instruction, 1500, deadline).await
    }

    /// Quick pass over daily data with a default profile
    pub async fn quick_analysis(&self, symbol: &str, deadline: Duration) -> String {
        let instruction = prompts::quick_instruction(symbol);
        self.run_general(symbol, instruction, 800, deadline).await
    }

    /// Compare several stocks and recommend an allocation
    pub async fn compare_stocks(&self, symbols: &[String], profile: &UserProfile) -> String {
        let joined = symbols.join(", ");
        info!(symbols = %joined, user = %profile.name, "Comparing stocks");

        let instruction = prompts::compare_instruction(symbols, profile);
        self.run_general(&joined, instruction, 3000, self.config.general_timeout)
            .await
    }

    /// Market overview across key stocks
    pub async fn market_overview(&self, symbols: Option<Vec<String>>) -> String {
        let symbols = symbols.unwrap_or_else(|| {
            OVERVIEW_SYMBOLS.iter().map(ToString::to_string).collect()
        });
        let joined = symbols.join(", ");
        info!(symbols = %joined, "Generating market overview");

        let instruction = prompts::overview_instruction(&symbols);
        self.run_general(&joined, instruction, 2500, self.config.general_timeout)
            .await
    }

    /// Write parsed data points to a CSV file
    ///
    /// Mirrors the save tool's contract: the result is always a string,
    /// either the filename or a literal error description.
    pub fn export_data_points(&self, data: &DetailedStockData) -> String {
        if data.data_points.is_empty() {
            warn!(symbol = %data.symbol, "No data points to export");
            return "No data available to save".to_string();
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_stock_data_{}.csv", data.symbol, timestamp);
        let path = self.config.output_dir.join(&filename);

        match std::fs::write(&path, data.to_csv())
            .map_err(|e| AnalystError::PersistenceFailure(e.to_string()))
        {
            Ok(()) => {
                info!(file = %filename, points = data.data_points.len(), "CSV file saved");
                filename
            }
            Err(e) => {
                error!(error = %e, "Failed to save CSV file");
                format!("Error saving file: {e}")
            }
        }
    }

    /// Run a fetch-only agent call under a deadline and render failures
    async fn run_general(
        &self,
        symbol: &str,
        instruction: String,
        max_tokens: usize,
        deadline: Duration,
    ) -> String {
        let executor = self.executor(
            &self.fetch_registry,
            prompts::GENERAL_SYSTEM_PROMPT,
            max_tokens,
        );

        match timeout(deadline, executor.run(instruction)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(%symbol, error = %e, "Analysis failed");
                format!("❌ Analysis failed for {symbol}: {e}")
            }
            Err(_) => {
                error!(%symbol, "Analysis timed out");
                format!("⏰ Analysis for {symbol} timed out. Please try again.")
            }
        }
    }

    fn executor(
        &self,
        registry: &Arc<ToolRegistry>,
        system_prompt: &str,
        max_tokens: usize,
    ) -> ToolExecutor {
        ToolExecutor::new(
            self.provider.clone(),
            registry.clone(),
            ExecutorConfig {
                model: self.config.model.clone(),
                system_prompt: Some(system_prompt.to_string()),
                max_tokens,
                ..ExecutorConfig::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CsvQuery, FetchOutcome};
    use crate::models::{StockDataPoint, CLASSIFY_FALLBACK_REASONING};
    use analyst_llm::{
        CompletionRequest, CompletionResponse, LlmError, Message, StopReason, TokenUsage,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider that records requests and replies from a script
    ///
    /// When the script runs out it keeps answering with the last entry.
    struct RecordingProvider {
        replies: Mutex<Vec<ProviderReply>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    enum ProviderReply {
        Text(String),
        Failure(String),
        Hang,
    }

    impl RecordingProvider {
        fn new(replies: Vec<ProviderReply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn recorded(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);

            let reply = {
                let mut replies = self.replies.lock().unwrap();
                if replies.len() > 1 {
                    replies.remove(0)
                } else {
                    match replies.first() {
                        Some(ProviderReply::Text(text)) => ProviderReply::Text(text.clone()),
                        Some(ProviderReply::Failure(msg)) => ProviderReply::Failure(msg.clone()),
                        Some(ProviderReply::Hang) => ProviderReply::Hang,
                        None => ProviderReply::Failure("script exhausted".to_string()),
                    }
                }
            };

            match reply {
                ProviderReply::Text(text) => Ok(CompletionResponse {
                    message: Message::assistant(text),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage {
                        input_tokens: 1,
                        output_tokens: 1,
                    },
                }),
                ProviderReply::Failure(msg) => Err(LlmError::RequestFailed(msg)),
                ProviderReply::Hang => std::future::pending().await,
            }
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct StubSource;

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn fetch_csv(&self, _query: &CsvQuery) -> Result<FetchOutcome> {
            Ok(FetchOutcome::RateLimited)
        }
    }

    fn analyst(provider: Arc<RecordingProvider>, config: AnalystConfig) -> StockAnalyst {
        StockAnalyst::new(Arc::new(config), provider, Arc::new(StubSource))
    }

    fn tool_names(request: &CompletionRequest) -> Vec<String> {
        let mut names: Vec<String> = request
            .tools
            .as_ref()
            .map(|tools| tools.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_general_path_uses_light_budget_and_fetch_tools() {
        let provider = RecordingProvider::new(vec![ProviderReply::Text("summary".to_string())]);
        let analyst = analyst(provider.clone(), AnalystConfig::default());

        let response = analyst
            .handle_general("What do you think?", "AAPL", &UserProfile::default())
            .await;
        assert_eq!(response, "summary");

        let requests = provider.recorded();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(
            tool_names(&requests[0]),
            vec![
                "get_stock_csv_daily",
                "get_stock_csv_intraday",
                "get_stock_csv_weekly"
            ]
        );
    }

    #[tokio::test]
    async fn test_specific_path_uses_heavy_budget_and_full_catalog() {
        let provider = RecordingProvider::new(vec![ProviderReply::Text(
            "done\n✅ CSV data saved to: AAPL_daily_data_20240101_120000.csv (512 characters)"
                .to_string(),
        )]);
        let analyst = analyst(provider.clone(), AnalystConfig::default());

        let outcome = analyst
            .handle_specific("export the data", "AAPL", &UserProfile::default())
            .await;

        assert!(outcome.response.contains("📊 **Detailed Analysis for AAPL**"));
        assert!(outcome.response.contains("✅ **CSV Tools Used**"));
        assert_eq!(
            outcome.csv_file.as_deref(),
            Some("AAPL_daily_data_20240101_120000.csv")
        );

        let requests = provider.recorded();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 2500);
        assert_eq!(
            tool_names(&requests[0]),
            vec![
                "get_stock_csv_daily",
                "get_stock_csv_intraday",
                "get_stock_csv_weekly",
                "save_csv_to_file"
            ]
        );
    }

    #[tokio::test]
    async fn test_specific_timeout_reports_symbol_without_retry() {
        let provider = RecordingProvider::new(vec![ProviderReply::Hang]);
        let config = AnalystConfig::builder()
            .specific_timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let analyst = analyst(provider.clone(), config);

        let outcome = analyst
            .handle_specific("export the data", "AAPL", &UserProfile::default())
            .await;

        assert!(outcome.response.contains("timed out"));
        assert!(outcome.response.contains("AAPL"));
        assert!(outcome.csv_file.is_none());
        // One attempt is terminal: no fallback call on the general path
        assert_eq!(provider.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_general_timeout_reports_symbol() {
        let provider = RecordingProvider::new(vec![ProviderReply::Hang]);
        let config = AnalystConfig::builder()
            .general_timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let analyst = analyst(provider.clone(), config);

        let response = analyst
            .handle_general("quick take?", "TSLA", &UserProfile::default())
            .await;

        assert!(response.contains("timed out"));
        assert!(response.contains("TSLA"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_rendered_not_raised() {
        let provider = RecordingProvider::new(vec![ProviderReply::Failure(
            "connection reset".to_string(),
        )]);
        let analyst = analyst(provider, AnalystConfig::default());

        let outcome = analyst
            .handle_specific("export", "MSFT", &UserProfile::default())
            .await;
        assert!(outcome.response.starts_with("❌ Detailed analysis failed for MSFT:"));
        assert!(outcome.response.contains("connection reset"));
        assert!(outcome.csv_file.is_none());
    }

    #[tokio::test]
    async fn test_smart_analyze_falls_open_to_general_path() {
        // Classification call fails; the dispatch call answers with text.
        let provider = RecordingProvider::new(vec![
            ProviderReply::Failure("classifier down".to_string()),
            ProviderReply::Text("general summary".to_string()),
        ]);
        let analyst = analyst(provider.clone(), AnalystConfig::default());

        let outcome = analyst
            .smart_analyze(
                "Show me Tesla's performance data for export",
                "TSLA",
                &UserProfile::default(),
            )
            .await;

        assert_eq!(outcome.response, "general summary");
        assert!(outcome.csv_file.is_none());

        // Second request is the general path: light budget, no save tool
        let requests = provider.recorded();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].max_tokens, 1000);
        assert!(!tool_names(&requests[1]).contains(&"save_csv_to_file".to_string()));
    }

    #[tokio::test]
    async fn test_smart_analyze_routes_specific() {
        let classification = r#"{"request_type": "specific", "confidence": 0.9, "reasoning": "wants export"}"#;
        let provider = RecordingProvider::new(vec![
            ProviderReply::Text(classification.to_string()),
            ProviderReply::Text("detailed output".to_string()),
        ]);
        let analyst = analyst(provider.clone(), AnalystConfig::default());

        let outcome = analyst
            .smart_analyze(
                "Get daily data for AAPL and save it",
                "AAPL",
                &UserProfile::default(),
            )
            .await;

        assert!(outcome.response.contains("Detailed Analysis for AAPL"));
        let requests = provider.recorded();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].max_tokens, 2500);
    }

    #[tokio::test]
    async fn test_classify_request_fallback_fields() {
        let provider =
            RecordingProvider::new(vec![ProviderReply::Failure("boom".to_string())]);
        let analyst = analyst(provider, AnalystConfig::default());

        let classification = analyst.classify_request("anything").await;
        assert_eq!(classification.category, RequestCategory::General);
        assert!((classification.confidence - 0.5).abs() < f64::EPSILON);
        assert_eq!(classification.reasoning, CLASSIFY_FALLBACK_REASONING);
    }

    #[tokio::test]
    async fn test_custom_budget_operations() {
        let provider = RecordingProvider::new(vec![ProviderReply::Text("ok".to_string())]);
        let analyst = analyst(provider.clone(), AnalystConfig::default());

        analyst
            .analyze_stock("AAPL", &UserProfile::default(), Duration::from_secs(60))
            .await;
        analyst.quick_analysis("AAPL", Duration::from_secs(30)).await;
        analyst
            .compare_stocks(
                &["AAPL".to_string(), "GOOGL".to_string()],
                &UserProfile::default(),
            )
            .await;
        analyst.market_overview(None).await;

        let budgets: Vec<usize> = provider.recorded().iter().map(|r| r.max_tokens).collect();
        assert_eq!(budgets, vec![1500, 800, 3000, 2500]);
    }

    #[test]
    fn test_export_data_points_roundtrip() {
        let dir = std::env::temp_dir().join(format!("analyst_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let provider = RecordingProvider::new(vec![]);
        let config = AnalystConfig::builder().output_dir(&dir).build().unwrap();
        let analyst = analyst(provider, config);

        let data = DetailedStockData {
            symbol: "AAPL".to_string(),
            data_points: vec![StockDataPoint {
                date: "2024-01-02".to_string(),
                symbol: "AAPL".to_string(),
                open_price: 100.0,
                high_price: 101.0,
                low_price: 99.0,
                close_price: 100.5,
                volume: 1_000,
                daily_change: None,
                daily_change_pct: None,
            }],
            analysis_date: "2024-01-02T00:00:00Z".to_string(),
            summary_stats: None,
        };

        let filename = analyst.export_data_points(&data);
        assert!(filename.starts_with("AAPL_stock_data_"));

        let written = std::fs::read_to_string(dir.join(&filename)).unwrap();
        assert!(written.starts_with("date,symbol,"));
        std::fs::remove_file(dir.join(&filename)).ok();
    }

    #[test]
    fn test_export_without_points() {
        let provider = RecordingProvider::new(vec![]);
        let analyst = analyst(provider, AnalystConfig::default());

        let data = DetailedStockData {
            symbol: "AAPL".to_string(),
            data_points: vec![],
            analysis_date: "2024-01-02T00:00:00Z".to_string(),
            summary_stats: None,
        };

        assert_eq!(analyst.export_data_points(&data), "No data available to save");
    }
}
