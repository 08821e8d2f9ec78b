//! Error types for stock intelligence operations

use intel_utils::EnvError;
use thiserror::Error;

/// Stock intelligence specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Blank or otherwise unusable ticker input
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The provider answered but returned no rows
    #[error("No {what} returned for {symbol}")]
    EmptyResult {
        symbol: String,
        what: String,
    },

    /// Network or HTTP transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials rejected by a provider
    #[error("Authentication rejected by {provider}")]
    Auth {
        provider: String,
    },

    /// A provider response could not be decoded
    #[error("Failed to parse {what}: {reason}")]
    Parse {
        what: String,
        reason: String,
    },

    /// The provider rejected the request (unknown symbol, bad range, ...)
    #[error("{provider} error: {message}")]
    Provider {
        provider: String,
        message: String,
    },

    /// Chart drawing failed
    #[error("Chart rendering failed: {0}")]
    Render(String),

    /// PDF writing failed
    #[error("Report export failed: {0}")]
    Export(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

impl StockError {
    /// Message shown to the dashboard user.
    ///
    /// Unknown, empty and rejected symbols all collapse to `Invalid Ticker`;
    /// infrastructure failures say which side broke.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidSymbol(_) | Self::EmptyResult { .. } | Self::Provider { .. } => {
                "Invalid Ticker".to_string()
            },
            Self::Network(_) => "Market data provider unreachable".to_string(),
            Self::Auth { provider } => format!("{provider} rejected the request credentials"),
            Self::Parse { .. } => "Market data provider returned an unreadable response".to_string(),
            Self::Render(_) => "Chart could not be rendered".to_string(),
            Self::Export(_) => "Report could not be generated".to_string(),
            Self::Config(reason) => format!("Configuration error: {reason}"),
        }
    }
}

impl From<reqwest::Error> for StockError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse {
                what: "response body".to_string(),
                reason: err.to_string(),
            }
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<EnvError> for StockError {
    fn from(err: EnvError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::InvalidSymbol(String::new());
        assert_eq!(err.to_string(), "Invalid symbol: ");

        let err = StockError::EmptyResult {
            symbol: "AAPL".to_string(),
            what: "price history".to_string(),
        };
        assert_eq!(err.to_string(), "No price history returned for AAPL");
    }

    #[test]
    fn test_symbol_failures_read_as_invalid_ticker() {
        let errors = [
            StockError::InvalidSymbol(String::new()),
            StockError::EmptyResult {
                symbol: "ZZZZ".to_string(),
                what: "price history".to_string(),
            },
            StockError::Provider {
                provider: "Yahoo Finance".to_string(),
                message: "Not Found".to_string(),
            },
        ];

        for err in errors {
            assert_eq!(err.user_message(), "Invalid Ticker");
        }
    }

    #[test]
    fn test_infrastructure_failures_are_distinct() {
        let network = StockError::Network("timed out".to_string());
        assert_ne!(network.user_message(), "Invalid Ticker");

        let auth = StockError::Auth {
            provider: "Yahoo Finance".to_string(),
        };
        assert!(auth.user_message().contains("Yahoo Finance"));
    }
}
