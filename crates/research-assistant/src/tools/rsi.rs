//! RSI summary tool

use async_trait::async_trait;
use research_tools::{Result as ToolResult, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{normalize_ticker, parse_params, to_value};
use crate::analytics::summarize_rsi;
use crate::api::MarketDataProvider;
use crate::error::Result;

/// Summarizes the relative strength of a ticker's recent closes
pub struct RsiSummaryTool {
    market: Arc<dyn MarketDataProvider>,
    default_period: usize,
}

#[derive(Debug, Deserialize)]
struct RsiParams {
    ticker: String,
    #[serde(default)]
    period: Option<usize>,
}

impl RsiSummaryTool {
    pub fn new(market: Arc<dyn MarketDataProvider>, default_period: usize) -> Self {
        Self {
            market,
            default_period,
        }
    }

    #[instrument(skip(self))]
    async fn summarize(&self, ticker: &str, period: usize) -> Result<Value> {
        let ticker = normalize_ticker(ticker)?;
        let prices = self.market.price_history(&ticker).await?;
        debug!(%ticker, closes = prices.len(), "Computing RSI");
        to_value(&summarize_rsi(&ticker, &prices, period)?)
    }
}

#[async_trait]
impl Tool for RsiSummaryTool {
    async fn execute(&self, params: Value) -> ToolResult<Value> {
        let params: RsiParams = parse_params(params)?;
        let period = params.period.unwrap_or(self.default_period);
        Ok(self.summarize(&params.ticker, period).await?)
    }

    fn name(&self) -> &str {
        "get_rsi_summary"
    }

    fn description(&self) -> &str {
        "Compute the Relative Strength Index over the last month of daily closes \
         and summarize the latest reading as overbought (>70), oversold (<30) or neutral."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "Stock ticker symbol, e.g. AAPL"
                },
                "period": {
                    "type": "integer",
                    "description": "Smoothing span of the RSI",
                    "default": self.default_period,
                    "minimum": 1
                }
            },
            "required": ["ticker"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::PriceSeries;
    use crate::api::MockMarketDataProvider;
    use crate::error::ResearchError;
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn tool(market: MockMarketDataProvider) -> RsiSummaryTool {
        RsiSummaryTool::new(Arc::new(market), 14)
    }

    #[tokio::test]
    async fn test_summary_for_known_closes() {
        let mut market = MockMarketDataProvider::new();
        market
            .expect_price_history()
            .with(eq("AAPL"))
            .times(1)
            .returning(|_| {
                let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
                Ok(PriceSeries::from_closes(start, &[10.0, 11.0, 10.5, 12.0, 11.5, 13.0]))
            });

        let out = tool(market)
            .call(json!({"ticker": "aapl", "period": 3}))
            .await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["Ticker"], "AAPL");
        assert_eq!(value["Latest_RSI"], 86.11);
        assert_eq!(value["Classification"], "overbought");
        assert_eq!(value["Reported_Date"], "2024-03-06");
    }

    #[tokio::test]
    async fn test_empty_history_is_error_payload() {
        let mut market = MockMarketDataProvider::new();
        market
            .expect_price_history()
            .returning(|_| Ok(PriceSeries::default()));

        let out = tool(market).call(json!({"ticker": "ZZZZ"})).await;
        assert_eq!(out, r#"{"error":"No data available for ticker 'ZZZZ'"}"#);
    }

    #[tokio::test]
    async fn test_provider_failure_is_error_payload() {
        let mut market = MockMarketDataProvider::new();
        market
            .expect_price_history()
            .returning(|_| Err(ResearchError::Upstream("Yahoo Finance: HTTP error 500".to_string())));

        let out = tool(market).call(json!({"ticker": "MSFT"})).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value, json!({"error": "Yahoo Finance: HTTP error 500"}));
    }

    #[tokio::test]
    async fn test_missing_ticker() {
        let out = tool(MockMarketDataProvider::new()).call(json!({})).await;
        let value: Value = serde_json::from_str(&out).unwrap();
        assert!(value["error"].as_str().unwrap().starts_with("Invalid parameters"));
    }

    #[test]
    fn test_tool_metadata() {
        let tool = tool(MockMarketDataProvider::new());
        assert_eq!(tool.name(), "get_rsi_summary");
        let schema = tool.input_schema();
        assert_eq!(schema["properties"]["period"]["default"], 14);
        assert_eq!(schema["required"][0], "ticker");
    }
}
