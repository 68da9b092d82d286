//! Interactive command-line interface for the stock analyst

use analyst_llm::AnthropicProvider;
use analyst_stock::{AlphaVantageCsvClient, AnalystConfig, StockAnalyst, UserProfile};
use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tickers recognized directly in a question
const COMMON_SYMBOLS: [&str; 8] = [
    "AAPL", "GOOGL", "MSFT", "TSLA", "AMZN", "META", "NVDA", "NFLX",
];

/// Company names mapped to their tickers
const COMPANY_TICKERS: [(&str, &str); 8] = [
    ("apple", "AAPL"),
    ("google", "GOOGL"),
    ("microsoft", "MSFT"),
    ("tesla", "TSLA"),
    ("amazon", "AMZN"),
    ("meta", "META"),
    ("nvidia", "NVDA"),
    ("netflix", "NFLX"),
];

#[derive(Parser, Debug)]
#[command(name = "analyst-cli")]
#[command(about = "AI stock analyst with smart tool selection", long_about = None)]
struct Args {
    /// Run the scripted demo instead of the interactive session
    #[arg(short, long)]
    demo: bool,

    /// Directory CSV exports are written to
    #[arg(short, long)]
    output_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut builder = AnalystConfig::builder();
    if let Some(dir) = args.output_dir {
        builder = builder.output_dir(dir);
    }
    let config = Arc::new(builder.build()?.with_env_keys());

    let provider =
        Arc::new(AnthropicProvider::from_env().context("Anthropic provider setup failed")?);
    let source = Arc::new(
        AlphaVantageCsvClient::from_config(&config)
            .context("Alpha Vantage client setup failed (set ALPHA_VANTAGE_API_KEY)")?,
    );
    let analyst = StockAnalyst::new(config, provider, source);

    info!("Stock analyst initialized");

    println!("🎯 AI Stock Analyst");
    println!("{}", "=".repeat(60));

    if args.demo {
        run_demo(&analyst).await;
    } else {
        interactive_session(&analyst, &UserProfile::default()).await?;
    }

    Ok(())
}

async fn interactive_session(analyst: &StockAnalyst, profile: &UserProfile) -> anyhow::Result<()> {
    println!("\n🤖 Ask any question about a stock!");
    println!("📊 For detailed data → CSV export with full historical data");
    println!("📝 For quick questions → fast text summary");
    println!("\n💡 Example questions:");
    println!("   📈 'Get daily data for AAPL and save it to Excel'");
    println!("   📊 'Show me Tesla's performance data for export'");
    println!("   💬 'What's your opinion on Apple stock?'");

    loop {
        println!("\n{}", "-".repeat(50));
        let question = prompt("\n❓ Ask me anything about a stock (or 'quit' to exit):\n> ")?;

        if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }
        if question.is_empty() {
            println!("💡 Please ask a question about a stock!");
            continue;
        }

        let symbol = match detect_symbol(&question) {
            Some(symbol) => symbol,
            None => {
                let entered = prompt("📈 Which stock symbol? (e.g., AAPL, TSLA, GOOGL): ")?;
                if entered.is_empty() {
                    continue;
                }
                entered.to_uppercase()
            }
        };

        println!("\n🤖 Analyzing: {symbol}");
        println!("⏳ Processing...");

        let outcome = analyst.smart_analyze(&question, &symbol, profile).await;

        println!("\n{}", "=".repeat(60));
        println!("📊 ANALYSIS");
        println!("{}", "=".repeat(60));
        println!("{}", outcome.response);

        if let Some(csv_file) = outcome.csv_file {
            println!("\n📁 **CSV FILE CREATED**: {csv_file}");
            println!("💡 Open this file in Excel or Google Sheets!");
        }
    }

    println!("\n👋 Thanks for using AI Stock Analyst!");
    Ok(())
}

async fn run_demo(analyst: &StockAnalyst) {
    let profile = UserProfile::default();

    println!("\n📊 Demo 1: 'Get AAPL daily data and save to Excel'");
    let outcome = analyst
        .smart_analyze("Get AAPL daily data and save to Excel", "AAPL", &profile)
        .await;
    println!("{}", preview(&outcome.response));
    if let Some(csv_file) = outcome.csv_file {
        println!("📁 CSV file created: {csv_file}");
    }

    println!("\n{}", "-".repeat(40));

    println!("\n💬 Demo 2: 'What's your opinion on Apple stock?'");
    let outcome = analyst
        .smart_analyze("What's your opinion on Apple stock?", "AAPL", &profile)
        .await;
    println!("{}", preview(&outcome.response));

    println!("\n✅ Demo complete! Try interactive mode to ask your own questions.");
}

/// Find a ticker in the question, by symbol or company name
fn detect_symbol(question: &str) -> Option<String> {
    let upper = question.to_uppercase();
    for symbol in COMMON_SYMBOLS {
        if upper.split(|c: char| !c.is_ascii_alphanumeric()).any(|w| w == symbol) {
            return Some(symbol.to_string());
        }
    }

    let lower = question.to_lowercase();
    for (company, symbol) in COMPANY_TICKERS {
        if lower.contains(company) {
            return Some(symbol.to_string());
        }
    }

    None
}

fn prompt(text: &str) -> anyhow::Result<String> {
    print!("{text}");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn preview(text: &str) -> String {
    if text.chars().count() > 200 {
        let truncated: String = text.chars().take(200).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}
