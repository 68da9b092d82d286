//! Tool persisting CSV data to a file

use crate::error::{AnalystError, Result};
use analyst_tools::{Tool, ToolError, ToolInvocationResult};
use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct SaveCsvParams {
    csv_data: String,
    symbol: String,
    #[serde(default = "default_data_type")]
    data_type: String,
}

fn default_data_type() -> String {
    "daily".to_string()
}

/// Save CSV data to a timestamped file
///
/// The filename is `{symbol}_{data_type}_data_{YYYYMMDD_HHMMSS}.csv`.
/// Failures come back as a literal error string, never as a raised error:
/// a broken artifact write must not invalidate analysis text the agent
/// has already produced.
pub struct SaveCsvTool {
    output_dir: PathBuf,
}

impl SaveCsvTool {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn save(&self, params: &SaveCsvParams) -> ToolInvocationResult {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}_data_{}.csv", params.symbol, params.data_type, timestamp);
        let path = self.output_dir.join(&filename);

        match write_file(&path, &params.csv_data) {
            Ok(()) => {
                info!(file = %filename, "CSV file saved");
                ToolInvocationResult::with_artifact(
                    format!(
                        "✅ CSV data saved to: {filename} ({} characters)",
                        params.csv_data.chars().count()
                    ),
                    path.display().to_string(),
                )
            }
            Err(e) => {
                warn!(error = %e, "Failed to save CSV file");
                ToolInvocationResult::text(format!("❌ Error saving CSV file: {e}"))
            }
        }
    }
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    std::fs::write(path, data).map_err(|e| AnalystError::PersistenceFailure(e.to_string()))
}

#[async_trait]
impl Tool for SaveCsvTool {
    async fn invoke(&self, params: Value) -> std::result::Result<ToolInvocationResult, ToolError> {
        let params: SaveCsvParams = serde_json::from_value(params)?;
        Ok(self.save(&params))
    }

    fn name(&self) -> &'static str {
        "save_csv_to_file"
    }

    fn description(&self) -> &'static str {
        "Save CSV data to a file for export. Returns the filename where data was saved."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "csv_data": {
                    "type": "string",
                    "description": "The CSV data string to save"
                },
                "symbol": {
                    "type": "string",
                    "description": "Stock symbol for the filename"
                },
                "data_type": {
                    "type": "string",
                    "description": "Type of data (daily, intraday, weekly) for the filename",
                    "default": "daily"
                }
            },
            "required": ["csv_data", "symbol"]
        })
    }
}
