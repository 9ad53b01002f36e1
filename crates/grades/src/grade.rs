use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult};

/// A single graded item: label, score and maximum score.
///
/// Scores are never negative: every setter (and the constructor) clamps a
/// negative value to zero instead of rejecting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grade {
    label: String,
    score: u64,
    max_score: u64,
}

fn clamp(value: i64) -> u64 {
    value.max(0).unsigned_abs()
}

impl Grade {
    pub fn new(label: impl Into<String>, score: i64, max_score: i64) -> Self {
        Self {
            label: label.into(),
            score: clamp(score),
            max_score: clamp(max_score),
        }
    }

    /// Placeholder grade appended by the "new grade" action.
    pub fn sample() -> Self {
        Self::new("Sample", 0, 0)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn max_score(&self) -> u64 {
        self.max_score
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_score(&mut self, score: i64) {
        self.score = clamp(score);
    }

    pub fn set_max_score(&mut self, max_score: i64) {
        self.max_score = clamp(max_score);
    }

    /// `score / max_score` as a ratio; above 1.0 for extra credit.
    pub fn percentage(&self) -> DomainResult<f64> {
        if self.max_score == 0 {
            return Err(DomainError::DivisionByZero);
        }
        Ok(self.score as f64 / self.max_score as f64)
    }
}

impl core::fmt::Display for Grade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {} / {}", self.label, self.score, self.max_score)
    }
}
