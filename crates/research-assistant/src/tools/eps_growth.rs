//! Year-over-year EPS growth tool

use async_trait::async_trait;
use research_tools::{Result as ToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{normalize_ticker, parse_params, to_value};
use crate::analytics::eps_yoy_growth;
use crate::api::MarketDataProvider;
use crate::error::Result;

/// Compares each quarter's EPS with the same quarter a year earlier
pub struct EpsGrowthTool {
    market: Arc<dyn MarketDataProvider>,
}

#[derive(Debug, Deserialize)]
struct TickerParams {
    ticker: String,
}

impl EpsGrowthTool {
    pub fn new(market: Arc<dyn MarketDataProvider>) -> Self {
        Self { market }
    }

    #[instrument(skip(self))]
    async fn summarize(&self, ticker: &str) -> Result<Value> {
        let ticker = normalize_ticker(ticker)?;
        let statement = self.market.quarterly_income_statement(&ticker).await?;
        debug!(%ticker, rows = statement.rows.len(), "Computing EPS growth");
        to_value(&eps_yoy_growth(&ticker, &statement)?)
    }
}

#[async_trait]
impl Tool for EpsGrowthTool {
    async fn execute(&self, params: Value) -> ToolResult<Value> {
        let params: TickerParams = parse_params(params)?;
        Ok(self.summarize(&params.ticker).await?)
    }

    fn name(&self) -> &str {
        "get_eps_yoy_growth_summary"
    }

    fn description(&self) -> &str {
        "Compute year-over-year EPS growth from quarterly income statements, pairing each \
         quarter with the same quarter of the previous year, and summarize average, max, \
         min and standard deviation of growth."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Stock ticker symbol, e.g. MSFT"
                }
            },
            "required": ["ticker"]
        })
    }
}
