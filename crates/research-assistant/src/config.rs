//! Configuration for research tools

use crate::error::{Result, ResearchError};
use research_utils::{env_opt, env_or};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Price history ranges accepted by the Yahoo client
pub const PRICE_RANGES: &[&str] = &["5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "ytd"];

/// Configuration for the research tools and their provider clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Alpha Vantage API key, needed for earnings call transcripts
    #[serde(skip_serializing)]
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,

    /// Model used for transcript summaries
    pub model: String,

    /// Token budget for one transcript summary
    pub llm_max_tokens: usize,

    /// Sampling temperature for transcript summaries
    pub llm_temperature: f32,

    /// Nucleus sampling cutoff for transcript summaries
    pub llm_top_p: f32,

    /// Default RSI smoothing span
    pub rsi_period: usize,

    /// Price history window fed to the RSI engine
    pub price_history_range: String,

    /// Request timeout for provider calls
    pub request_timeout: Duration,

    /// Maximum attempts for LLM calls
    pub max_retries: u32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            alpha_vantage_rate_limit: 5,
            model: "claude-3-5-haiku-20241022".to_string(),
            llm_max_tokens: 512,
            llm_temperature: 0.5,
            llm_top_p: 0.9,
            rsi_period: 14,
            price_history_range: "1mo".to_string(),
            request_timeout: Duration::from_secs(25),
            max_retries: 3,
        }
    }
}

impl ResearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResearchConfigBuilder {
        ResearchConfigBuilder::default()
    }

    /// Build a configuration from environment variables over the defaults
    ///
    /// Reads `ALPHA_VANTAGE_API_KEY`, `RESEARCH_MODEL`, `RESEARCH_PRICE_RANGE`,
    /// `RESEARCH_RSI_PERIOD` and `ALPHA_VANTAGE_RATE_LIMIT`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            alpha_vantage_api_key: env_opt("ALPHA_VANTAGE_API_KEY"),
            alpha_vantage_rate_limit: env_or("ALPHA_VANTAGE_RATE_LIMIT", defaults.alpha_vantage_rate_limit),
            model: env_opt("RESEARCH_MODEL").unwrap_or(defaults.model),
            rsi_period: env_or("RESEARCH_RSI_PERIOD", defaults.rsi_period),
            price_history_range: env_opt("RESEARCH_PRICE_RANGE").unwrap_or(defaults.price_history_range),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.rsi_period == 0 {
            return Err(ResearchError::Config("rsi_period must be greater than 0".to_string()));
        }

        if self.max_retries == 0 {
            return Err(ResearchError::Config("max_retries must be greater than 0".to_string()));
        }

        if self.alpha_vantage_rate_limit == 0 {
            return Err(ResearchError::Config(
                "alpha_vantage_rate_limit must be greater than 0".to_string(),
            ));
        }

        if !PRICE_RANGES.contains(&self.price_history_range.as_str()) {
            return Err(ResearchError::Config(format!(
                "Unsupported price_history_range '{}'. Supported: {}",
                self.price_history_range,
                PRICE_RANGES.join(", ")
            )));
        }

        if !(0.0..=1.0).contains(&self.llm_temperature) || !(0.0..=1.0).contains(&self.llm_top_p) {
            return Err(ResearchError::Config(
                "llm_temperature and llm_top_p must lie in [0, 1]".to_string(),
            ));
        }

        Ok(())
    }

    /// The Alpha Vantage key, or a configuration error naming the variable
    pub fn require_alpha_vantage_key(&self) -> Result<&str> {
        self.alpha_vantage_api_key.as_deref().ok_or_else(|| {
            ResearchError::Config("ALPHA_VANTAGE_API_KEY is required for earnings call transcripts".to_string())
        })
    }
}

/// Builder for ResearchConfig
#[derive(Debug, Default)]
pub struct ResearchConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_rate_limit: Option<u32>,
    model: Option<String>,
    llm_max_tokens: Option<usize>,
    llm_temperature: Option<f32>,
    llm_top_p: Option<f32>,
    rsi_period: Option<usize>,
    price_history_range: Option<String>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl ResearchConfigBuilder {
    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the Alpha Vantage requests-per-minute budget
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Set the summary model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the summary token budget
    pub fn llm_max_tokens(mut self, max_tokens: usize) -> Self {
        self.llm_max_tokens = Some(max_tokens);
        self
    }

    /// Set the summary sampling temperature
    pub fn llm_temperature(mut self, temperature: f32) -> Self {
        self.llm_temperature = Some(temperature);
        self
    }

    /// Set the summary nucleus sampling cutoff
    pub fn llm_top_p(mut self, top_p: f32) -> Self {
        self.llm_top_p = Some(top_p);
        self
    }

    /// Set the default RSI period
    pub fn rsi_period(mut self, period: usize) -> Self {
        self.rsi_period = Some(period);
        self
    }

    /// Set the price history window
    pub fn price_history_range(mut self, range: impl Into<String>) -> Self {
        self.price_history_range = Some(range.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum LLM attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Load Alpha Vantage API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Some(key) = env_opt("ALPHA_VANTAGE_API_KEY") {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResearchConfig> {
        let defaults = ResearchConfig::default();

        let config = ResearchConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            model: self.model.unwrap_or(defaults.model),
            llm_max_tokens: self.llm_max_tokens.unwrap_or(defaults.llm_max_tokens),
            llm_temperature: self.llm_temperature.unwrap_or(defaults.llm_temperature),
            llm_top_p: self.llm_top_p.unwrap_or(defaults.llm_top_p),
            rsi_period: self.rsi_period.unwrap_or(defaults.rsi_period),
            price_history_range: self.price_history_range.unwrap_or(defaults.price_history_range),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResearchConfig::default();
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.price_history_range, "1mo");
        assert_eq!(config.llm_max_tokens, 512);
        assert_eq!(config.request_timeout, Duration::from_secs(25));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ResearchConfig::builder()
            .rsi_period(21)
            .price_history_range("3mo")
            .alpha_vantage_api_key("demo")
            .build()
            .unwrap();

        assert_eq!(config.rsi_period, 21);
        assert_eq!(config.price_history_range, "3mo");
        assert_eq!(config.require_alpha_vantage_key().unwrap(), "demo");
    }

    #[test]
    fn test_validation_rejects_zero_period() {
        let result = ResearchConfig::builder().rsi_period(0).build();
        assert!(matches!(result, Err(ResearchError::Config(_))));
    }

    #[test]
    fn test_builder_sampling_settings() {
        let config = ResearchConfig::builder()
            .llm_temperature(0.2)
            .llm_top_p(0.7)
            .build()
            .unwrap();
        assert!((config.llm_temperature - 0.2).abs() < f32::EPSILON);
        assert!((config.llm_top_p - 0.7).abs() < f32::EPSILON);

        let result = ResearchConfig::builder().llm_temperature(1.5).build();
        assert!(matches!(result, Err(ResearchError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_unknown_range() {
        let config = ResearchConfig {
            price_history_range: "7w".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_alpha_vantage_key() {
        let config = ResearchConfig::default();
        assert!(config.require_alpha_vantage_key().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = ResearchConfig {
            alpha_vantage_api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
