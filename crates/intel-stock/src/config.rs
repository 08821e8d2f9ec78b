//! Configuration for the dashboard services

use crate::api::YAHOO_NEWS_API_BASE;
use crate::error::{Result, StockError};
use crate::narrative::{DEFAULT_MODEL, NarrativeSettings};
use crate::sentiment::DEFAULT_NEWS_LIMIT;
use crate::symbol::TickerSymbol;
use intel_llm::providers::{GROQ_API_BASE, OpenAIConfig};
use intel_utils::{env_opt, env_or, env_parse};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Variable holding the chat model key
pub const LLM_API_KEY_VAR: &str = "GROQ_API_KEY";

const DEFAULT_TICKER: &str = "AAPL";

/// Where headlines for sentiment scoring come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentSource {
    /// Yahoo Finance search API
    #[default]
    Live,
    /// Fixed template headlines, for offline demos
    Synthetic,
}

impl fmt::Display for SentimentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Synthetic => "synthetic",
        })
    }
}

impl FromStr for SentimentSource {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(StockError::Config(format!(
                "unknown sentiment source '{other}' (expected live or synthetic)"
            ))),
        }
    }
}

/// Configuration for the dashboard services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// OpenAI-compatible endpoint for narratives
    pub llm_api_base: String,

    /// Variable the LLM key is read from
    pub llm_api_key_var: String,

    pub llm_timeout: Duration,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: usize,

    pub sentiment_source: SentimentSource,

    /// Base URL of the Yahoo news search API
    pub news_api_base: String,

    /// Headlines considered per analysis
    pub news_limit: usize,

    /// Timeout for news requests
    pub request_timeout: Duration,

    /// Ticker prefilled in the dashboard
    pub default_ticker: TickerSymbol,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let narrative = NarrativeSettings::default();
        Self {
            llm_api_base: GROQ_API_BASE.to_string(),
            llm_api_key_var: LLM_API_KEY_VAR.to_string(),
            llm_timeout: Duration::from_secs(120),
            model: narrative.model,
            temperature: narrative.temperature,
            max_tokens: narrative.max_tokens,
            sentiment_source: SentimentSource::Live,
            news_api_base: YAHOO_NEWS_API_BASE.to_string(),
            news_limit: DEFAULT_NEWS_LIMIT,
            request_timeout: Duration::from_secs(30),
            default_ticker: TickerSymbol::from_static(DEFAULT_TICKER),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Read the `INTEL_*` variables on top of the defaults.
    ///
    /// The LLM key itself is not read here; a missing key surfaces on the
    /// first narrative request.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StockError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(StockError::Config(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.news_limit == 0 {
            return Err(StockError::Config(
                "news_limit must be greater than 0".to_string(),
            ));
        }

        for (name, url) in [
            ("llm_api_base", &self.llm_api_base),
            ("news_api_base", &self.news_api_base),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(StockError::Config(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }

        Ok(())
    }

    /// Sampling settings for the narrative generator
    pub fn narrative_settings(&self) -> NarrativeSettings {
        NarrativeSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Client settings for the chat model; the key is read from the environment
    pub fn llm_config(&self) -> OpenAIConfig {
        OpenAIConfig::from_env_var(&self.llm_api_key_var)
            .with_api_base(&self.llm_api_base)
            .with_timeout(self.llm_timeout.as_secs())
            .with_provider_name("groq")
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    llm_api_base: Option<String>,
    llm_api_key_var: Option<String>,
    llm_timeout: Option<Duration>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    sentiment_source: Option<SentimentSource>,
    news_api_base: Option<String>,
    news_limit: Option<usize>,
    request_timeout: Option<Duration>,
    default_ticker: Option<TickerSymbol>,
}

impl DashboardConfigBuilder {
    /// Set the chat completion endpoint
    pub fn llm_api_base(mut self, url: impl Into<String>) -> Self {
        self.llm_api_base = Some(url.into());
        self
    }

    /// Set the variable the LLM key is read from
    pub fn llm_api_key_var(mut self, var: impl Into<String>) -> Self {
        self.llm_api_key_var = Some(var.into());
        self
    }

    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = Some(timeout);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn sentiment_source(mut self, source: SentimentSource) -> Self {
        self.sentiment_source = Some(source);
        self
    }

    /// Set the news search endpoint
    pub fn news_api_base(mut self, url: impl Into<String>) -> Self {
        self.news_api_base = Some(url.into());
        self
    }

    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the news request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn default_ticker(mut self, ticker: TickerSymbol) -> Self {
        self.default_ticker = Some(ticker);
        self
    }

    /// Fill unset fields from `INTEL_*` environment variables
    pub fn with_env(mut self) -> Result<Self> {
        if self.llm_api_base.is_none() {
            self.llm_api_base = env_opt("INTEL_LLM_API_BASE");
        }
        if self.model.is_none() {
            self.model = Some(env_or("INTEL_LLM_MODEL", DEFAULT_MODEL));
        }
        if self.llm_timeout.is_none() {
            self.llm_timeout = Some(Duration::from_secs(env_parse("INTEL_LLM_TIMEOUT_SECS", 120_u64)?));
        }
        if self.sentiment_source.is_none() {
            self.sentiment_source = env_opt("INTEL_SENTIMENT_SOURCE")
                .map(|raw| raw.parse::<SentimentSource>())
                .transpose()?;
        }
        if self.news_api_base.is_none() {
            self.news_api_base = env_opt("INTEL_NEWS_API_BASE");
        }
        if self.default_ticker.is_none() {
            self.default_ticker = env_opt("INTEL_DEFAULT_TICKER")
                .map(|raw| TickerSymbol::parse(&raw))
                .transpose()?;
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();

        let config = DashboardConfig {
            llm_api_base: self
                .llm_api_base
                .map_or(defaults.llm_api_base, |u| u.trim_end_matches('/').to_string()),
            llm_api_key_var: self.llm_api_key_var.unwrap_or(defaults.llm_api_key_var),
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            sentiment_source: self.sentiment_source.unwrap_or(defaults.sentiment_source),
            news_api_base: self
                .news_api_base
                .map_or(defaults.news_api_base, |u| u.trim_end_matches('/').to_string()),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            default_ticker: self.default_ticker.unwrap_or(defaults.default_ticker),
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
        let config = DashboardConfig::default();
        assert_eq!(config.llm_api_base, GROQ_API_BASE);
        assert_eq!(config.llm_api_key_var, "GROQ_API_KEY");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.sentiment_source, SentimentSource::Live);
        assert_eq!(config.default_ticker.as_str(), "AAPL");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = DashboardConfig::builder()
            .model("llama-3.1-8b-instant")
            .temperature(0.7)
            .news_limit(3)
            .news_api_base("http://localhost:9000/")
            .sentiment_source(SentimentSource::Synthetic)
            .build()
            .unwrap();

        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.news_limit, 3);
        assert_eq!(config.news_api_base, "http://localhost:9000");
        assert_eq!(config.sentiment_source, SentimentSource::Synthetic);

        let settings = config.narrative_settings();
        assert_eq!(settings.model, "llama-3.1-8b-instant");
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(DashboardConfig::builder().temperature(2.5).build().is_err());
        assert!(DashboardConfig::builder().temperature(-0.1).build().is_err());
        assert!(DashboardConfig::builder().max_tokens(0).build().is_err());
        assert!(DashboardConfig::builder().news_limit(0).build().is_err());
        assert!(DashboardConfig::builder().llm_api_base("ftp://x").build().is_err());
    }

    #[test]
    fn test_sentiment_source_parse() {
        assert_eq!("Synthetic".parse::<SentimentSource>().unwrap(), SentimentSource::Synthetic);
        assert_eq!(" live ".parse::<SentimentSource>().unwrap(), SentimentSource::Live);
        assert!(matches!(
            "twitter".parse::<SentimentSource>(),
            Err(StockError::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        unsafe {
            std::env::set_var("INTEL_SENTIMENT_SOURCE", "synthetic");
            std::env::set_var("INTEL_DEFAULT_TICKER", " msft ");
        }
        let config = DashboardConfig::from_env().unwrap();
        unsafe {
            std::env::remove_var("INTEL_SENTIMENT_SOURCE");
            std::env::remove_var("INTEL_DEFAULT_TICKER");
        }

        assert_eq!(config.sentiment_source, SentimentSource::Synthetic);
        assert_eq!(config.default_ticker.as_str(), "MSFT");
    }

    #[test]
    fn test_llm_config() {
        let config = DashboardConfig::builder()
            .llm_api_base("http://127.0.0.1:1234/v1")
            .llm_api_key_var("INTEL_TEST_UNSET_KEY")
            .build()
            .unwrap();
        let llm = config.llm_config();

        assert_eq!(llm.api_base, "http://127.0.0.1:1234/v1");
        assert_eq!(llm.api_key_var, "INTEL_TEST_UNSET_KEY");
        assert!(!llm.has_api_key());
    }
}
