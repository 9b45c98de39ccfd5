//! Provider clients for market data and earnings call transcripts

pub mod alpha_vantage;
pub mod yahoo;

use async_trait::async_trait;

use crate::analytics::{HolderTable, IncomeStatement, InsiderTable, PriceSeries};
use crate::error::Result;

pub use alpha_vantage::AlphaVantageClient;
pub use yahoo::YahooFinanceClient;

/// Source of the tabular market data the analytics engines consume.
///
/// Implementations return empty tables, not errors, when the provider has
/// nothing for a ticker; the engines turn emptiness into `NoData`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily closing prices over the configured window
    async fn price_history(&self, ticker: &str) -> Result<PriceSeries>;

    /// Quarterly income statement rows keyed by report date
    async fn quarterly_income_statement(&self, ticker: &str) -> Result<IncomeStatement>;

    /// Six-month insider purchase/sale activity
    async fn insider_purchases(&self, ticker: &str) -> Result<InsiderTable>;

    /// Institutional holders with their stake and stake change
    async fn institutional_holders(&self, ticker: &str) -> Result<HolderTable>;
}

/// Source of raw earnings call transcript documents
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript document for `quarter` (`YYYYQn`)
    async fn fetch_transcript(&self, ticker: &str, quarter: &str) -> Result<serde_json::Value>;
}
