use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sources::Candidate;

/// Outcome class of one verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// A source confirmed the citation.
    Valid,
    /// Best match is close but below the acceptance threshold, or a DOI resolved with a
    /// conflicting year.
    Uncertain,
    /// No source produced a convincing match.
    NotFound,
    /// The entry could not be checked at all (no title).
    Error,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Valid => "valid",
            VerdictStatus::Uncertain => "uncertain",
            VerdictStatus::NotFound => "not_found",
            VerdictStatus::Error => "error",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verification result for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub entry_id: String,
    pub status: VerdictStatus,
    /// Matched record's title (for `valid`/`uncertain`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Name of the source that produced the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Highest-scoring candidate behind a `not_found`, if any source answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_guess: Option<Candidate>,
}

impl Verdict {
    fn from_match(
        entry_id: &str,
        status: VerdictStatus,
        candidate: &Candidate,
        reason: Option<String>,
    ) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            status,
            title: Some(candidate.title.clone()),
            url: Some(candidate.url.clone()),
            source: Some(candidate.source_name.clone()),
            raw_similarity: Some(candidate.raw_similarity),
            adjusted_score: Some(candidate.adjusted_score),
            reason,
            best_guess: None,
        }
    }

    pub fn valid(entry_id: &str, candidate: &Candidate) -> Self {
        Self::from_match(entry_id, VerdictStatus::Valid, candidate, None)
    }

    pub fn uncertain(entry_id: &str, candidate: &Candidate, reason: impl Into<String>) -> Self {
        Self::from_match(
            entry_id,
            VerdictStatus::Uncertain,
            candidate,
            Some(reason.into()),
        )
    }

    pub fn not_found(
        entry_id: &str,
        reason: impl Into<String>,
        best_guess: Option<Candidate>,
    ) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            status: VerdictStatus::NotFound,
            title: None,
            url: None,
            source: None,
            raw_similarity: best_guess.as_ref().map(|c| c.raw_similarity),
            adjusted_score: best_guess.as_ref().map(|c| c.adjusted_score),
            reason: Some(reason.into()),
            best_guess,
        }
    }

    pub fn error(entry_id: &str, reason: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.to_string(),
            status: VerdictStatus::Error,
            title: None,
            url: None,
            source: None,
            raw_similarity: None,
            adjusted_score: None,
            reason: Some(reason.into()),
            best_guess: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == VerdictStatus::Valid
    }
}
