//! Prompt templates for the narrative model
//!
//! - `system`: the fixed executive-summary instructions
//! - `user`: the per-symbol analysis request

mod system;
mod user;

pub use system::*;
pub use user::*;

use minijinja::{Environment, context};

/// Registry of the narrative prompts, rendered with minijinja
#[derive(Debug)]
pub struct PromptSet {
    env: Environment<'static>,
}

impl PromptSet {
    /// Register all prompts
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(EXECUTIVE_ANALYST, EXECUTIVE_ANALYST_TEMPLATE)?;
        env.add_template(EXECUTIVE_SUMMARY, EXECUTIVE_SUMMARY_TEMPLATE)?;
        Ok(Self { env })
    }

    /// The system instructions
    pub fn system(&self) -> Result<String, minijinja::Error> {
        self.env.get_template(EXECUTIVE_ANALYST)?.render(context! {})
    }

    /// The analysis request for one symbol
    ///
    /// `stats` is the statistics outcome as JSON and `sentiment` the display
    /// string of the sentiment reading.
    pub fn executive_summary(
        &self,
        symbol: &str,
        stats: &str,
        sentiment: &str,
    ) -> Result<String, minijinja::Error> {
        self.env
            .get_template(EXECUTIVE_SUMMARY)?
            .render(context! { symbol, stats, sentiment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_structure() {
        let prompts = PromptSet::new().unwrap();
        let system = prompts.system().unwrap();

        let bottom = system.find("### 🎯 The Bottom Line").unwrap();
        let drivers = system.find("### ⚡ Key Drivers").unwrap();
        let risk = system.find("### ⚠️ Primary Risk").unwrap();
        assert!(bottom < drivers && drivers < risk);
        assert!(system.contains("**Technicals**"));
        assert!(system.contains("**Sentiment**"));
        assert!(system.contains("**Momentum**"));
        assert!(system.contains("150 words"));
    }

    #[test]
    fn test_executive_summary_render() {
        let prompts = PromptSet::new().unwrap();
        let stats = r#"{"symbol":"AAPL","price":187.23,"ma_20":181.46,"trend":"Bullish"}"#;
        let prompt = prompts
            .executive_summary("AAPL", stats, "Positive")
            .unwrap();

        assert!(prompt.starts_with("Analyze AAPL for an executive dashboard:"));
        // JSON must reach the model unescaped
        assert!(prompt.contains(stats));
        assert!(prompt.contains("- Market Sentiment: Positive"));
        assert!(prompt.ends_with("Provide the summary based on the strict structure defined."));
    }
}
