//! Response assembly and artifact extraction

/// Marker the save tool embeds ahead of the artifact filename
pub const CSV_SAVED_MARKER: &str = "CSV data saved to:";

/// Assemble the user-facing response for the "specific" path
pub fn format_specific_response(symbol: &str, agent_output: &str) -> String {
    format!(
        "📊 **Detailed Analysis for {symbol}**\n\
         {agent_output}\n\
         \n\
         ✅ **CSV Tools Used**: This analysis used Alpha Vantage CSV tools for direct data access.\n"
    )
}

/// Pull the saved-artifact filename out of agent output
///
/// The filename is the first whitespace-delimited token after the
/// `CSV data saved to:` marker. This is a string contract with the save
/// tool's output format; keep the two in sync.
pub fn extract_saved_csv(output: &str) -> Option<String> {
    for line in output.lines() {
        if let Some(rest) = line.split(CSV_SAVED_MARKER).nth(1) {
            if let Some(token) = rest.split_whitespace().next() {
                return Some(token.to_string());
            }
        }
    }
    None
}
