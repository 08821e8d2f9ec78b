//! AI narrative generation
//!
//! Sends the statistics and sentiment to a chat model and returns its
//! executive summary. Every failure is folded into readable diagnostic text,
//! so callers always get a narrative to display.

use crate::market::StatsOutcome;
use crate::prompts::PromptSet;
use crate::sentiment::SentimentReading;
use crate::symbol::TickerSymbol;
use intel_llm::{CompletionRequest, LLMError, LLMProvider, Message};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Default chat model
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Model replies this short or shorter are treated as failures
pub const MIN_NARRATIVE_CHARS: usize = 50;

/// Shown instead of a narrative when there are no statistics to discuss
pub const NO_MARKET_DATA_MESSAGE: &str =
    "I couldn't find data for that ticker. Please check the symbol.";

/// Sampling parameters for narrative requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for NarrativeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

/// Why the model's text was replaced by a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum NarrativeFailure {
    /// The statistics fetch failed, so the model was never asked
    NoMarketData,
    /// Missing key or other client misconfiguration
    Configuration(String),
    Authentication,
    Quota(String),
    Network(String),
    /// The provider answered with an error or an unreadable body
    Provider(String),
    EmptyResponse,
    /// The reply was too short to be a summary; carries its length in chars
    TooShort(usize),
    Prompt(String),
}

impl NarrativeFailure {
    /// Classify a provider error
    pub fn from_llm_error(err: &LLMError) -> Self {
        match err {
            LLMError::ConfigurationError(msg) => Self::Configuration(msg.clone()),
            LLMError::AuthenticationFailed => Self::Authentication,
            LLMError::RateLimitExceeded(msg) => Self::Quota(msg.clone()),
            LLMError::HttpError(e) => Self::Network(e.to_string()),
            LLMError::RequestFailed(msg)
            | LLMError::InvalidRequest(msg)
            | LLMError::UnexpectedResponse(msg) => Self::Provider(msg.clone()),
            LLMError::ModelNotFound(model) => Self::Provider(format!("model {model} not found")),
            LLMError::SerializationError(e) => Self::Provider(e.to_string()),
        }
    }

    /// Diagnostic text shown in place of the narrative
    pub fn message(&self) -> String {
        match self {
            Self::NoMarketData => NO_MARKET_DATA_MESSAGE.to_string(),
            Self::Configuration(detail) => {
                format!("Narrative unavailable: the language model is not configured ({detail}).")
            },
            Self::Authentication => {
                "Narrative unavailable: the language model rejected the configured API key."
                    .to_string()
            },
            Self::Quota(detail) => format!(
                "Narrative unavailable: the language model quota or rate limit was exceeded ({detail})."
            ),
            Self::Network(detail) => {
                format!("Error connecting to the language model service: {detail}. Please try again.")
            },
            Self::Provider(detail) => {
                format!("Narrative unavailable: the language model request failed ({detail}).")
            },
            Self::EmptyResponse => {
                "Narrative unavailable: the language model returned an empty response. Please try again."
                    .to_string()
            },
            Self::TooShort(chars) => format!(
                "Narrative unavailable: the language model reply was too short to use ({chars} characters). Please try again."
            ),
            Self::Prompt(detail) => {
                format!("Narrative unavailable: the analysis prompt could not be rendered ({detail}).")
            },
        }
    }
}

/// Where a narrative's text came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeOrigin {
    Model,
    Degraded(NarrativeFailure),
}

/// Narrative text plus its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeReport {
    pub text: String,
    pub origin: NarrativeOrigin,
}

impl NarrativeReport {
    pub fn from_model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: NarrativeOrigin::Model,
        }
    }

    pub fn degraded(failure: NarrativeFailure) -> Self {
        Self {
            text: failure.message(),
            origin: NarrativeOrigin::Degraded(failure),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.origin, NarrativeOrigin::Degraded(_))
    }
}

/// Asks a chat model for the executive summary
#[derive(Clone)]
pub struct NarrativeGenerator {
    provider: Arc<dyn LLMProvider>,
    prompts: Arc<PromptSet>,
    settings: NarrativeSettings,
}

impl NarrativeGenerator {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        settings: NarrativeSettings,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            provider,
            prompts: Arc::new(PromptSet::new()?),
            settings,
        })
    }

    pub fn settings(&self) -> &NarrativeSettings {
        &self.settings
    }

    /// Produce the narrative for one analysis; never fails
    #[instrument(skip_all, fields(symbol = %symbol, provider = self.provider.name(), model = %self.settings.model))]
    pub async fn generate(
        &self,
        symbol: &TickerSymbol,
        stats: &StatsOutcome,
        sentiment: &SentimentReading,
    ) -> NarrativeReport {
        if stats.is_error() {
            info!("Skipping narrative: no market data");
            return NarrativeReport::degraded(NarrativeFailure::NoMarketData);
        }

        match self.request_narrative(symbol, stats, sentiment).await {
            Ok(text) => NarrativeReport::from_model(text),
            Err(failure) => {
                warn!("Narrative degraded: {failure:?}");
                NarrativeReport::degraded(failure)
            },
        }
    }

    async fn request_narrative(
        &self,
        symbol: &TickerSymbol,
        stats: &StatsOutcome,
        sentiment: &SentimentReading,
    ) -> Result<String, NarrativeFailure> {
        let prompt_error = |e: minijinja::Error| NarrativeFailure::Prompt(e.to_string());
        let system = self.prompts.system().map_err(prompt_error)?;
        let user = self
            .prompts
            .executive_summary(symbol.as_str(), &stats.to_json(), &sentiment.display())
            .map_err(prompt_error)?;

        let request = CompletionRequest::builder(&self.settings.model)
            .system(system)
            .add_message(Message::user(user))
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .build();

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| NarrativeFailure::from_llm_error(&e))?;

        let text = response.text().trim();
        if text.is_empty() {
            return Err(NarrativeFailure::EmptyResponse);
        }
        let chars = text.chars().count();
        if chars <= MIN_NARRATIVE_CHARS {
            return Err(NarrativeFailure::TooShort(chars));
        }
        info!(tokens = response.usage.total(), "Narrative generated");
        Ok(text.to_string())
    }
}
