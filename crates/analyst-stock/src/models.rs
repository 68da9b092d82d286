//! Data model for the analysis pipeline

use serde::{Deserialize, Serialize};

/// How much risk the user is willing to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
}

impl std::fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        };
        f.write_str(s)
    }
}

/// How long the user intends to hold positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvestmentHorizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl std::fmt::Display for InvestmentHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ShortTerm => "short-term",
            Self::MediumTerm => "medium-term",
            Self::LongTerm => "long-term",
        };
        f.write_str(s)
    }
}

/// User investment profile for personalized analysis
///
/// Supplied by the caller, immutable for the lifetime of a request, and
/// never persisted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub risk_tolerance: RiskTolerance,
    pub investment_horizon: InvestmentHorizon,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Investor".to_string(),
            risk_tolerance: RiskTolerance::Moderate,
            investment_horizon: InvestmentHorizon::MediumTerm,
        }
    }
}

/// Which handling path a request is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestCategory {
    /// Detailed, exportable, time-ranged data
    Specific,
    /// Quick qualitative summary
    General,
}

/// Classification of a user request
///
/// Exactly one is produced per incoming request and consumed immediately
/// by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestClassification {
    /// Chosen handling path
    #[serde(rename = "request_type")]
    pub category: RequestCategory,

    /// Elements of the request that pointed at "specific"
    #[serde(default)]
    pub specific_elements: Vec<String>,

    /// Classifier confidence in [0, 1]
    pub confidence: f64,

    /// Why this classification was chosen
    pub reasoning: String,
}

/// Fixed reasoning used when classification fails open to "general"
pub const CLASSIFY_FALLBACK_REASONING: &str = "Classification failed, defaulting to general";

impl RequestClassification {
    /// The fail-open default: broken or ambiguous classification degrades
    /// to the cheaper path instead of failing the request.
    pub fn fallback() -> Self {
        Self {
            category: RequestCategory::General,
            specific_elements: Vec::new(),
            confidence: 0.5,
            reasoning: CLASSIFY_FALLBACK_REASONING.to_string(),
        }
    }
}

/// One parsed stock record
///
/// `daily_change` fields compare against the immediately preceding record
/// in ingestion order; the first record carries `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDataPoint {
    pub date: String,
    pub symbol: String,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: u64,
    pub daily_change: Option<f64>,
    pub daily_change_pct: Option<f64>,
}

/// Summary statistics over a set of data points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub avg_close: f64,
    pub max_close: f64,
    pub min_close: f64,
    pub avg_volume: f64,
    pub total_data_points: usize,
}

/// A parsed collection of stock records ready for CSV export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedStockData {
    pub symbol: String,
    pub data_points: Vec<StockDataPoint>,
    pub analysis_date: String,
    pub summary_stats: Option<SummaryStats>,
}

impl DetailedStockData {
    /// Render the data points as CSV with a fixed header row
    ///
    /// Missing change fields render as empty cells.
    pub fn to_csv(&self) -> String {
        if self.data_points.is_empty() {
            return "No data available".to_string();
        }

        let mut out = String::from(
            "date,symbol,open_price,high_price,low_price,close_price,volume,daily_change,daily_change_pct\n",
        );

        for point in &self.data_points {
            let daily_change = point
                .daily_change
                .map(|c| c.to_string())
                .unwrap_or_default();
            let daily_change_pct = point
                .daily_change_pct
                .map(|c| c.to_string())
                .unwrap_or_default();
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                point.date,
                point.symbol,
                point.open_price,
                point.high_price,
                point.low_price,
                point.close_price,
                point.volume,
                daily_change,
                daily_change_pct,
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, close: f64, change: Option<f64>) -> StockDataPoint {
        StockDataPoint {
            date: date.to_string(),
            symbol: "AAPL".to_string(),
            open_price: close - 1.0,
            high_price: close + 1.0,
            low_price: close - 2.0,
            close_price: close,
            volume: 1_000,
            daily_change: change,
            daily_change_pct: change.map(|c| c / close * 100.0),
        }
    }

    #[test]
    fn test_fallback_classification() {
        let fallback = RequestClassification::fallback();
        assert_eq!(fallback.category, RequestCategory::General);
        assert!(fallback.specific_elements.is_empty());
        assert!((fallback.confidence - 0.5).abs() < f64::EPSILON);
        assert_eq!(fallback.reasoning, CLASSIFY_FALLBACK_REASONING);
    }

    #[test]
    fn test_classification_wire_format() {
        let raw = r#"{
            "request_type": "specific",
            "specific_elements": ["historical data", "export"],
            "confidence": 0.92,
            "reasoning": "asks for exportable history"
        }"#;

        let parsed: RequestClassification = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.category, RequestCategory::Specific);
        assert_eq!(parsed.specific_elements.len(), 2);
    }

    #[test]
    fn test_to_csv_header_and_empty_cells() {
        let data = DetailedStockData {
            symbol: "AAPL".to_string(),
            data_points: vec![point("2024-01-02", 100.0, None), point("2024-01-03", 102.0, Some(2.0))],
            analysis_date: "2024-01-03T00:00:00Z".to_string(),
            summary_stats: None,
        };

        let csv = data.to_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "date,symbol,open_price,high_price,low_price,close_price,volume,daily_change,daily_change_pct"
        );
        // First record has no change fields
        assert!(lines.next().unwrap().ends_with(",,"));
        assert!(lines.next().unwrap().contains(",2,"));
    }

    #[test]
    fn test_to_csv_no_points() {
        let data = DetailedStockData {
            symbol: "AAPL".to_string(),
            data_points: vec![],
            analysis_date: "2024-01-03T00:00:00Z".to_string(),
            summary_stats: None,
        };
        assert_eq!(data.to_csv(), "No data available");
    }

    #[test]
    fn test_profile_display_values() {
        let profile = UserProfile::default();
        assert_eq!(profile.risk_tolerance.to_string(), "moderate");
        assert_eq!(profile.investment_horizon.to_string(), "medium-term");
    }
}
