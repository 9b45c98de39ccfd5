//! Research tools CLI
//!
//! Runs one research tool and prints its JSON answer.
//!
//! # Usage
//!
//! ```bash
//! # Optional: transcripts need Alpha Vantage, summaries need Anthropic
//! export ALPHA_VANTAGE_API_KEY="your-key"
//! export ANTHROPIC_API_KEY="your-key"
//!
//! cargo run --bin research-bot -- rsi AAPL --period 14
//! cargo run --bin research-bot -- transcript IBM --quarter 2024Q1
//! ```

use clap::{Parser, Subcommand};
use research_assistant::{ResearchConfig, default_registry};
use research_llm::providers::AnthropicProvider;
use research_llm::{LLMProvider, RetryPolicy};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "research-bot")]
#[command(about = "Financial research tools for ticker analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Relative Strength Index summary
    Rsi {
        ticker: String,
        /// RSI smoothing span
        #[arg(long)]
        period: Option<usize>,
    },
    /// Year-over-year EPS growth summary
    EpsGrowth { ticker: String },
    /// Insider purchase/sale activity summary
    Insider { ticker: String },
    /// Institutional ownership summary
    Institutional { ticker: String },
    /// Earnings call transcript summary
    Transcript {
        ticker: String,
        /// Quarter as YYYYQn; defaults to the most recently closed quarter
        #[arg(long)]
        quarter: Option<String>,
    },
    /// Most recently closed quarter
    Quarter,
    /// List tool names, descriptions and input schemas
    Tools,
}

impl Commands {
    /// Tool name and parameters for a tool-backed command
    fn tool_call(self) -> Option<(&'static str, Value)> {
        let call = match self {
            Self::Rsi { ticker, period } => {
                let mut params = json!({ "ticker": ticker });
                if let Some(period) = period {
                    params["period"] = json!(period);
                }
                ("get_rsi_summary", params)
            }
            Self::EpsGrowth { ticker } => ("get_eps_yoy_growth_summary", json!({ "ticker": ticker })),
            Self::Insider { ticker } => ("get_insider_activity_summary", json!({ "ticker": ticker })),
            Self::Institutional { ticker } => {
                ("get_institutional_ownership_summary", json!({ "ticker": ticker }))
            }
            Self::Transcript { ticker, quarter } => {
                let mut params = json!({ "ticker": ticker });
                if let Some(quarter) = quarter {
                    params["quarter"] = json!(quarter);
                }
                ("get_earnings_call_summary", params)
            }
            Self::Quarter => ("get_most_recent_quarter", json!({})),
            Self::Tools => return None,
        };
        Some(call)
    }
}

fn llm_provider(config: &ResearchConfig) -> Option<Arc<dyn LLMProvider>> {
    match AnthropicProvider::from_env() {
        Ok(provider) => {
            let provider = provider.with_retry(RetryPolicy::with_attempts(config.max_retries));
            Some(Arc::new(provider))
        }
        Err(e) => {
            warn!(error = %e, "Earnings call summaries disabled");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    research_utils::load_dotenv();
    research_utils::init_tracing("warn,research_assistant=info");

    let cli = Cli::parse();
    let config = ResearchConfig::from_env()?;
    info!(model = %config.model, range = %config.price_history_range, "Starting research-bot");

    let registry = default_registry(&config, llm_provider(&config))?;

    match cli.command.tool_call() {
        Some((name, params)) => {
            if registry.get(name).is_none() {
                anyhow::bail!(
                    "{name} is unavailable; set ALPHA_VANTAGE_API_KEY and ANTHROPIC_API_KEY"
                );
            }
            println!("{}", registry.call(name, params).await);
        }
        None => {
            for definition in registry.definitions() {
                println!("{}", serde_json::to_string_pretty(&definition)?);
            }
        }
    }

    Ok(())
}
