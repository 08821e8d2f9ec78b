//! Lexicon polarity scoring for short headlines

use std::collections::{HashMap, HashSet};

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't", "wasn't", "weren't",
    "won't", "wouldn't", "couldn't", "shouldn't", "can't", "cannot", "hardly", "barely", "without",
    "nor",
];

/// How many words after a negator it still applies to
const NEGATION_WINDOW: usize = 3;

/// Applied to a negated word's polarity
const NEGATION_FACTOR: f64 = -0.5;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("best", 1.0),
    ("excellent", 1.0),
    ("great", 0.8),
    ("good", 0.7),
    ("soar", 0.6),
    ("bullish", 0.6),
    ("outperform", 0.6),
    ("breakthrough", 0.6),
    ("surge", 0.5),
    ("rally", 0.5),
    ("jump", 0.5),
    ("upgrade", 0.5),
    ("optimistic", 0.5),
    ("success", 0.5),
    ("exceed", 0.5),
    ("strong", 0.45),
    ("beat", 0.4),
    ("robust", 0.4),
    ("rebound", 0.4),
    ("recovery", 0.35),
    ("climb", 0.3),
    ("gain", 0.3),
    ("rise", 0.3),
    ("record", 0.3),
    ("profit", 0.3),
    ("growth", 0.3),
    ("boost", 0.3),
    ("win", 0.3),
    ("positive", 0.25),
    ("buyback", 0.25),
    ("dividend", 0.2),
    ("higher", 0.2),
    ("up", 0.1),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("worst", -1.0),
    ("terrible", -1.0),
    ("bankruptcy", -0.9),
    ("crash", -0.7),
    ("bad", -0.7),
    ("plunge", -0.6),
    ("bearish", -0.6),
    ("tumble", -0.6),
    ("underperform", -0.6),
    ("fraud", -0.6),
    ("slump", -0.5),
    ("downgrade", -0.5),
    ("fear", -0.5),
    ("sink", -0.5),
    ("layoff", -0.45),
    ("loss", -0.4),
    ("miss", -0.4),
    ("lawsuit", -0.4),
    ("warning", -0.4),
    ("weak", -0.4),
    ("disappoint", -0.4),
    ("probe", -0.35),
    ("fall", -0.3),
    ("drop", -0.3),
    ("decline", -0.3),
    ("slip", -0.3),
    ("concern", -0.3),
    ("recall", -0.3),
    ("risk", -0.2),
    ("cut", -0.2),
    ("volatility", -0.2),
    ("lower", -0.2),
    ("negative", -0.25),
    ("cautious", -0.1),
    ("down", -0.1),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("extremely", 1.5),
    ("very", 1.3),
    ("highly", 1.3),
    ("sharply", 1.3),
    ("significantly", 1.3),
    ("really", 1.2),
    ("somewhat", 0.7),
    ("slightly", 0.5),
];

/// Suffixes stripped when a word is not in the lexicon verbatim
const SUFFIXES: &[&str] = &["ing", "ed", "es", "s", "d"];

/// Scores text in `[-1, 1]` from a weighted financial word list.
///
/// The score is the mean polarity of the sentiment-bearing words. An
/// intensifier scales the word right after it, and a negator flips and damps
/// any sentiment word within the next three words. Text without any
/// sentiment-bearing word scores `0.0`.
#[derive(Debug, Clone)]
pub struct PolarityScorer {
    lexicon: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl Default for PolarityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer {
    pub fn new() -> Self {
        Self {
            lexicon: POSITIVE_WORDS
                .iter()
                .chain(NEGATIVE_WORDS)
                .copied()
                .collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
            negations: NEGATION_WORDS.iter().copied().collect(),
        }
    }

    /// Polarity of `text` in `[-1, 1]`
    pub fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
            .map(|w| w.trim_matches(|c| c == '\'' || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();

        let mut scores = Vec::new();
        let mut last_negation: Option<usize> = None;
        let mut intensity = 1.0;

        for (i, word) in words.iter().enumerate() {
            if self.negations.contains(*word) {
                last_negation = Some(i);
                continue;
            }
            if let Some(&factor) = self.intensifiers.get(*word) {
                intensity = factor;
                continue;
            }

            let Some(base) = self.lookup(word) else {
                intensity = 1.0;
                continue;
            };

            let mut score = (base * intensity).clamp(-1.0, 1.0);
            if last_negation.is_some_and(|pos| i - pos <= NEGATION_WINDOW) {
                score *= NEGATION_FACTOR;
            }
            scores.push(score);
            intensity = 1.0;
        }

        if scores.is_empty() {
            return 0.0;
        }
        (scores.iter().sum::<f64>() / scores.len() as f64).clamp(-1.0, 1.0)
    }

    fn lookup(&self, word: &str) -> Option<f64> {
        if let Some(&score) = self.lexicon.get(word) {
            return Some(score);
        }
        SUFFIXES.iter().find_map(|suffix| {
            let stem = word.strip_suffix(suffix)?;
            if stem.len() < 3 {
                return None;
            }
            self.lexicon
                .get(stem)
                .or_else(|| self.lexicon.get(format!("{stem}e").as_str()))
                .copied()
        })
    }
}
