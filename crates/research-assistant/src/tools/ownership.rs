//! Insider activity and institutional ownership tools

use async_trait::async_trait;
use research_tools::{Result as ToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::instrument;

use super::{normalize_ticker, parse_params, to_value};
use crate::analytics::{summarize_insider_activity, summarize_institutional_ownership};
use crate::api::MarketDataProvider;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct TickerParams {
    ticker: String,
}

fn ticker_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ticker": {
                "type": "string",
                "description": "Stock ticker symbol, e.g. NVDA"
            }
        },
        "required": ["ticker"]
    })
}

/// Summarizes six months of insider purchases and sales
pub struct InsiderActivityTool {
    market: Arc<dyn MarketDataProvider>,
}

impl InsiderActivityTool {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }

    #[instrument(skip(self))]
    async fn summarize(&self, ticker: &str) -> Result<Value> {
        let ticker = normalize_ticker(ticker)?;
        let table = self.market.insider_purchases(&ticker).await?;
        to_value(&summarize_insider_activity(&ticker, &table)?)
    }
}

#[async_trait]
impl Tool for InsiderActivityTool {
    async fn execute(&self, params: Value) -> ToolResult<Value> {
        let params: TickerParams = parse_params(params)?;
        Ok(self.summarize(&params.ticker).await?)
    }

    fn name(&self) -> &str {
        "get_insider_activity_summary"
    }

    fn description(&self) -> &str {
        "Summarize insider purchases and sales over the last six months, with net shares, \
         buy/sell percentages and whether insiders are net buying or selling."
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}

/// Summarizes the largest institutional holders and their stake changes
pub struct InstitutionalOwnershipTool {
    market: Arc<dyn MarketDataProvider>,
}

impl InstitutionalOwnershipTool {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }

    #[instrument(skip(self))]
    async fn summarize(&self, ticker: &str) -> Result<Value> {
        let ticker = normalize_ticker(ticker)?;
        let table = self.market.institutional_holders(&ticker).await?;
        to_value(&summarize_institutional_ownership(&ticker, &table)?)
    }
}

#[async_trait]
impl Tool for InstitutionalOwnershipTool {
    async fn execute(&self, params: Value) -> ToolResult<Value> {
        let params: TickerParams = parse_params(params)?;
        Ok(self.summarize(&params.ticker).await?)
    }

    fn name(&self) -> &str {
        "get_institutional_ownership_summary"
    }

    fn description(&self) -> &str {
        "Summarize institutional ownership: top five holders, total percent held, average \
         stake change and whether institutions are accumulating or trimming."
    }

    fn input_schema(&self) -> Value {
        ticker_schema()
    }
}
