//! Financial research tools for an LLM agent
//!
//! This crate turns market data into compact JSON summaries a language model
//! can reason over. It includes:
//!
//! - Relative Strength Index over recent daily closes
//! - Year-over-year EPS growth from quarterly income statements
//! - Insider activity and institutional ownership summaries
//! - Earnings call transcript summaries via a language model
//! - Resolution of the most recently closed fiscal quarter
//!
//! # Architecture
//!
//! Provider clients (`api`) fetch raw tables, the analytics engines
//! (`analytics`) reduce them to summaries, and the tools (`tools`) expose each
//! engine to an orchestrator through `research_tools::Tool`. Every tool
//! answers with a JSON string; failures become `{"error": "..."}`.
//!
//! # Example
//!
//! ```rust,ignore
//! use research_assistant::{ResearchConfig, default_registry};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ResearchConfig::from_env()?;
//!     let registry = default_registry(&config, None)?;
//!
//!     let summary = registry.call("get_rsi_summary", json!({"ticker": "AAPL"})).await;
//!     println!("{summary}");
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod prompts;
pub mod tools;

// Re-export main types for convenience
pub use api::{AlphaVantageClient, MarketDataProvider, TranscriptProvider, YahooFinanceClient};
pub use config::ResearchConfig;
pub use error::{Result, ResearchError};
pub use tools::{default_registry, registry_with};
