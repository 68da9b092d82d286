//! The tool catalog exposed to the agent
//!
//! Three fetch tools wrap the market-data adapter and one persistence
//! tool writes CSV artifacts. Fetch tools report upstream failures as
//! literal strings (`"API Error: …"`, `"Rate limit reached…"`) so the
//! model can read them; the save tool never raises at all.

mod csv_data;
mod save_csv;

pub use csv_data::{DailyCsvTool, IntradayCsvTool, WeeklyCsvTool, summarize_csv};
pub use save_csv::SaveCsvTool;
