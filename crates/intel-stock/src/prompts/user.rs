//! User message templates for the executive summary

/// Registry name of the per-symbol analysis request
pub const EXECUTIVE_SUMMARY: &str = "stock.user.executive_summary";

/// Expects `symbol`, `stats` (JSON text) and `sentiment` (display string)
pub const EXECUTIVE_SUMMARY_TEMPLATE: &str = "Analyze {{ symbol }} for an executive dashboard:
- Current Metrics: {{ stats }}
- Market Sentiment: {{ sentiment }}

Provide the summary based on the strict structure defined.";
