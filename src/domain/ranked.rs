//! Ranked, display-ready classification results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One ranked class: its index, human-readable name and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Class index in the model output (the digit itself for digit models).
    pub label: usize,
    /// Human-readable class name.
    pub name: Arc<str>,
    /// Score reported by the model.
    pub score: f32,
}

impl RankedEntry {
    /// Renders the score as a percentage with one decimal place, e.g. `"60.0%"`.
    pub fn percent(&self) -> String {
        format_percent(self.score)
    }
}

impl fmt::Display for RankedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.percent())
    }
}

/// Top-k classes ordered by descending score, ties broken by ascending label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RankedResult {
    entries: Vec<RankedEntry>,
}

impl RankedResult {
    pub(crate) fn new(entries: Vec<RankedEntry>) -> Self {
        Self { entries }
    }

    /// The ranked entries, best first.
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// The highest-ranked entry.
    pub fn best(&self) -> Option<&RankedEntry> {
        self.entries.first()
    }

    /// `(label, score)` pairs, best first.
    pub fn pairs(&self) -> Vec<(usize, f32)> {
        self.entries.iter().map(|e| (e.label, e.score)).collect()
    }

    /// Class indices, best first.
    pub fn labels(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.label).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a RankedResult {
    type Item = &'a RankedEntry;
    type IntoIter = std::slice::Iter<'a, RankedEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for RankedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Formats a probability-like score as a one-decimal percentage.
pub fn format_percent(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}
