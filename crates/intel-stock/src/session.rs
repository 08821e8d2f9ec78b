//! Per-session dashboard state
//!
//! The analyze action produces one immutable [`AnalysisSnapshot`]; the
//! dashboard decides what to show by comparing that snapshot's ticker with
//! the ticker currently entered.

use crate::market::StatsOutcome;
use crate::narrative::NarrativeReport;
use crate::sentiment::SentimentReading;
use crate::symbol::TickerSymbol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of one analyze action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub id: Uuid,
    pub ticker: TickerSymbol,
    pub stats: StatsOutcome,
    pub sentiment: SentimentReading,
    pub narrative: NarrativeReport,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisSnapshot {
    pub fn new(
        ticker: TickerSymbol,
        stats: StatsOutcome,
        sentiment: SentimentReading,
        narrative: NarrativeReport,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            ticker,
            stats,
            sentiment,
            narrative,
            generated_at: Utc::now(),
        }
    }
}

/// State kept for one browser session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    snapshot: Option<AnalysisSnapshot>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<&AnalysisSnapshot> {
        self.snapshot.as_ref()
    }

    /// Replace the last analysis
    pub fn store(&mut self, snapshot: AnalysisSnapshot) {
        self.snapshot = Some(snapshot);
    }
}

/// What the dashboard renders for the entered ticker
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashboardView<'a> {
    /// The stored analysis belongs to the entered ticker
    Loaded(&'a AnalysisSnapshot),
    /// Nothing analyzed yet, or the ticker has changed since
    Empty,
}

impl<'a> DashboardView<'a> {
    pub fn resolve(state: &'a SessionState, entered: &TickerSymbol) -> Self {
        match state.snapshot() {
            Some(snapshot) if snapshot.ticker == *entered => Self::Loaded(snapshot),
            _ => Self::Empty,
        }
    }

    pub fn snapshot(&self) -> Option<&'a AnalysisSnapshot> {
        match self {
            Self::Loaded(snapshot) => Some(snapshot),
            Self::Empty => None,
        }
    }
}
