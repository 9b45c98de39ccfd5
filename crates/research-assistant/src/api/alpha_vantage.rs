//! Alpha Vantage client for earnings call transcripts

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::TranscriptProvider;
use crate::config::ResearchConfig;
use crate::error::{Result, ResearchError};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

impl AlphaVantageClient {
    /// Create a client with an API key and a requests-per-minute budget
    /// (5 on the free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let per_minute = NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN.saturating_add(4));
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
        }
    }

    /// Create a client from configuration; fails when no API key is set
    pub fn from_config(config: &ResearchConfig) -> Result<Self> {
        let api_key = config.require_alpha_vantage_key()?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            ..Self::new(api_key, config.alpha_vantage_rate_limit)
        })
    }
}

/// Classify Alpha Vantage's in-band error documents
///
/// The API answers HTTP 200 with an `Error Message`, `Note` or `Information`
/// field instead of data when a request is rejected.
fn check_document(document: Value) -> Result<Value> {
    if let Some(message) = document.get("Error Message") {
        return Err(ResearchError::Upstream(format!(
            "{PROVIDER}: {}",
            message.as_str().unwrap_or_default()
        )));
    }

    if document.get("Note").is_some() {
        return Err(ResearchError::RateLimited {
            provider: PROVIDER.to_string(),
        });
    }

    if let Some(info) = document.get("Information") {
        let text = info.as_str().unwrap_or_default().to_lowercase();
        if text.contains("limit") {
            return Err(ResearchError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }
    }

    Ok(document)
}

#[async_trait]
impl TranscriptProvider for AlphaVantageClient {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, ticker: &str, quarter: &str) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", "EARNINGS_CALL_TRANSCRIPT"),
            ("symbol", ticker),
            ("quarter", quarter),
            ("apikey", self.api_key.as_str()),
        ];
        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ResearchError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ResearchError::Upstream(format!(
                "{PROVIDER}: HTTP error {}",
                response.status()
            )));
        }

        let document = check_document(response.json().await?)?;
        debug!(ticker, quarter, bytes = document.to_string().len(), "Fetched transcript");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("demo", 5);
        assert_eq!(client.api_key, "demo");

        // zero falls back to the free tier budget
        let _client = AlphaVantageClient::new("demo", 0);
    }

    #[test]
    fn test_from_config_requires_key() {
        assert!(matches!(
            AlphaVantageClient::from_config(&ResearchConfig::default()),
            Err(ResearchError::Config(_))
        ));

        let config = ResearchConfig::builder().alpha_vantage_api_key("k").build().unwrap();
        assert!(AlphaVantageClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_check_document() {
        let ok = json!({"symbol": "IBM", "quarter": "2024Q1", "transcript": []});
        assert_eq!(check_document(ok.clone()).unwrap(), ok);

        let err = check_document(json!({"Error Message": "Invalid API call."})).unwrap_err();
        assert_eq!(err.to_string(), "Alpha Vantage: Invalid API call.");

        assert!(matches!(
            check_document(json!({"Note": "Thank you for using Alpha Vantage!"})),
            Err(ResearchError::RateLimited { .. })
        ));
        assert!(matches!(
            check_document(json!({"Information": "Our standard API rate limit is 25 requests per day."})),
            Err(ResearchError::RateLimited { .. })
        ));

        let info = json!({"Information": "This is a premium endpoint."});
        assert!(check_document(info).is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_fetch_transcript_live() {
        let config = ResearchConfig::builder().with_env_api_key().build().unwrap();
        let client = AlphaVantageClient::from_config(&config).unwrap();
        let document = client.fetch_transcript("IBM", "2024Q1").await.unwrap();
        assert!(document.get("transcript").is_some());
    }
}
