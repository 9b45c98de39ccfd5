//! Research tools exposed to an LLM orchestrator
//!
//! Each tool fetches one provider table, runs one analytics engine and
//! answers with the serialized summary.

pub mod eps_growth;
pub mod ownership;
pub mod quarter;
pub mod rsi;
pub mod transcripts;

pub use eps_growth::EpsGrowthTool;
pub use ownership::{InsiderActivityTool, InstitutionalOwnershipTool};
pub use quarter::MostRecentQuarterTool;
pub use rsi::RsiSummaryTool;
pub use transcripts::EarningsCallSummaryTool;

use research_llm::LLMProvider;
use research_tools::ToolRegistry;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::api::{AlphaVantageClient, MarketDataProvider, TranscriptProvider, YahooFinanceClient};
use crate::config::ResearchConfig;
use crate::error::{Result, ResearchError};

/// Upper-case a ticker, rejecting blank input
pub fn normalize_ticker(ticker: &str) -> Result<String> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(ResearchError::InvalidParameters(
            "ticker must not be empty".to_string(),
        ));
    }
    Ok(ticker.to_uppercase())
}

/// Deserialize tool parameters; a missing object counts as `{}`
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| ResearchError::InvalidParameters(e.to_string()))
}

pub(crate) fn to_value<T: Serialize>(summary: &T) -> Result<Value> {
    Ok(serde_json::to_value(summary)?)
}

/// Register every tool over the given collaborators.
///
/// The earnings call tool needs both a transcript source and a model and is
/// left out when either is missing.
pub fn registry_with(
    config: &ResearchConfig,
    market: Arc<dyn MarketDataProvider>,
    transcripts: Option<Arc<dyn TranscriptProvider>>,
    llm: Option<Arc<dyn LLMProvider>>,
) -> ToolRegistry {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(RsiSummaryTool::new(market.clone(), config.rsi_period)));
    registry.register(Arc::new(EpsGrowthTool::new(market.clone())));
    registry.register(Arc::new(InsiderActivityTool::new(market.clone())));
    registry.register(Arc::new(InstitutionalOwnershipTool::new(market)));
    registry.register(Arc::new(MostRecentQuarterTool));

    match (transcripts, llm) {
        (Some(transcripts), Some(llm)) => {
            registry.register(Arc::new(EarningsCallSummaryTool::new(transcripts, llm, config)));
        }
        (transcripts, llm) => info!(
            has_transcripts = transcripts.is_some(),
            has_llm = llm.is_some(),
            "Earnings call summary tool disabled"
        ),
    }

    registry
}

/// Build the registry against the live Yahoo Finance and Alpha Vantage
/// clients
pub fn default_registry(
    config: &ResearchConfig,
    llm: Option<Arc<dyn LLMProvider>>,
) -> Result<ToolRegistry> {
    let market: Arc<dyn MarketDataProvider> = Arc::new(YahooFinanceClient::new(config)?);
    let transcripts = match AlphaVantageClient::from_config(config) {
        Ok(client) => Some(Arc::new(client) as Arc<dyn TranscriptProvider>),
        Err(ResearchError::Config(reason)) => {
            info!(%reason, "Alpha Vantage client unavailable");
            None
        }
        Err(e) => return Err(e),
    };
    Ok(registry_with(config, market, transcripts, llm))
}
