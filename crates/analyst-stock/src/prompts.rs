//! Prompt text for the pipeline's LLM calls

use crate::models::UserProfile;

/// System prompt for the classification call
///
/// The reply must be a single JSON object so it can be parsed into a
/// `RequestClassification`.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "\
You are a request classifier. Analyze user requests to determine if they want:
1. SPECIFIC detailed data (mentions: performance, data, movements, date range, CSV, export, detailed analysis, historical data, etc.)
2. GENERAL overview/summary (vague requests, general questions, quick info, latest data, overall view, etc.)

SPECIFIC requests typically ask for:
- Historical data or date ranges
- Performance metrics
- Detailed movements or analysis
- Export or file requests
- Multiple data points

GENERAL requests typically ask for:
- Overall consensus or opinion
- Latest/current info
- Quick summaries
- General market view
- Simple recommendations

Respond with a single JSON object and nothing else:
{\"request_type\": \"specific\" or \"general\", \"specific_elements\": [..], \"confidence\": 0.0-1.0, \"reasoning\": \"..\"}";

/// System prompt for the tool-rich "specific" path
pub const SPECIFIC_SYSTEM_PROMPT: &str = "\
You are an expert stock analyst with access to Alpha Vantage CSV tools.
Use these tools to get detailed stock data that can be exported:
- get_stock_csv_daily: Get daily stock data as CSV
- get_stock_csv_intraday: Get intraday data as CSV
- get_stock_csv_weekly: Get weekly data as CSV
- save_csv_to_file: Save CSV data to a file

Always use these tools to provide detailed analysis with exportable data.";

/// System prompt for the lighter "general" path
pub const GENERAL_SYSTEM_PROMPT: &str = "\
You are an expert stock analyst with access to Alpha Vantage CSV tools:
- get_stock_csv_daily: Get daily stock data as CSV (best for historical analysis)
- get_stock_csv_intraday: Get intraday data as CSV (1min, 5min, 15min, 30min, 60min intervals)
- get_stock_csv_weekly: Get weekly data as CSV (long-term trends)

For general questions, fetch only what you need and answer with a concise
text summary. Do not export files.";

fn profile_context(profile: &UserProfile) -> String {
    format!(
        "You are analyzing stocks for {} with the following profile:\n\
         - Risk Tolerance: {}\n\
         - Investment Horizon: {}\n\
         Tailor your analysis and recommendations accordingly.",
        profile.name, profile.risk_tolerance, profile.investment_horizon
    )
}

/// Instruction for the "specific" path
pub fn specific_instruction(symbol: &str, profile: &UserProfile) -> String {
    format!(
        "Use get_stock_csv_daily to get detailed data for {symbol}. \
         Analyze the data and save it to a CSV file using save_csv_to_file.\n\n{}",
        profile_context(profile)
    )
}

/// Instruction for the "general" path
pub fn general_instruction(symbol: &str, profile: &UserProfile) -> String {
    format!(
        "Analyze {symbol} stock. Call get_stock_csv_daily for {symbol} and \
         provide a brief summary.\n\n{}",
        profile_context(profile)
    )
}

/// Instruction for a full single-stock analysis
pub fn analyze_instruction(symbol: &str, profile: &UserProfile) -> String {
    format!(
        "Please analyze {symbol} stock. Start by calling get_stock_csv_daily with \
         symbol=\"{symbol}\" to get the current price and data.\n\
         Then provide a brief analysis including:\n\
         - Current price and recent performance\n\
         - Buy/hold/sell recommendation for {} risk tolerance\n\
         - Key insights for {} investment horizon",
        profile.risk_tolerance, profile.investment_horizon
    )
}

/// Instruction for a quick single-stock pass
pub fn quick_instruction(symbol: &str) -> String {
    format!(
        "Please call get_stock_csv_daily with symbol='{symbol}' and provide a \
         brief analysis with current price and recommendation."
    )
}

/// Instruction for a multi-stock comparison
pub fn compare_instruction(symbols: &[String], profile: &UserProfile) -> String {
    let joined = symbols.join(", ");
    format!(
        "Please compare these stocks: {joined}\n\n\
         For each stock, call get_stock_csv_daily with the stock symbol.\n\n\
         Then provide a comparison including:\n\
         - Performance comparison based on the data\n\
         - Risk analysis for each stock\n\
         - Portfolio allocation recommendations for {} tolerance\n\
         - Best and worst performers with explanations\n\
         - Investment strategy for {} horizon",
        profile.risk_tolerance, profile.investment_horizon
    )
}

/// Instruction for a market overview across key stocks
pub fn overview_instruction(symbols: &[String]) -> String {
    let joined = symbols.join(", ");
    format!(
        "Please provide a comprehensive market overview by analyzing these key \
         stocks: {joined}\n\n\
         For each stock, call get_stock_csv_daily to get current data.\n\n\
         Then provide a market overview including:\n\
         - Overall market sentiment analysis\n\
         - Sector performance trends\n\
         - Key opportunities and risks identified\n\
         - Market outlook based on current performance\n\
         - Top recommendations supported by the data"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instructions_name_the_symbol() {
        let profile = UserProfile::default();
        assert!(specific_instruction("AAPL", &profile).contains("AAPL"));
        assert!(general_instruction("TSLA", &profile).contains("TSLA"));
        assert!(quick_instruction("MSFT").contains("MSFT"));
    }

    #[test]
    fn test_profile_shapes_the_instruction() {
        let profile = UserProfile::default();
        let text = analyze_instruction("AAPL", &profile);
        assert!(text.contains("moderate risk tolerance"));
        assert!(text.contains("medium-term investment horizon"));
    }

    #[test]
    fn test_compare_lists_all_symbols() {
        let symbols = vec!["AAPL".to_string(), "GOOGL".to_string()];
        let text = compare_instruction(&symbols, &UserProfile::default());
        assert!(text.contains("AAPL, GOOGL"));
    }
}
