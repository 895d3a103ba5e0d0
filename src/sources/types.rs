use serde::{Deserialize, Serialize};

use crate::scoring::{AuthorName, CitedWork, ScoreBreakdown, score};

/// A scored match returned by a source adapter.
///
/// This is also the unit persisted in the result cache, so every field round-trips
/// through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    #[serde(default)]
    pub url: String,
    /// DOI or source-specific identifier, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub authors: Vec<AuthorName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub source_name: String,
    pub raw_similarity: f64,
    pub adjusted_score: f64,
    #[serde(default)]
    pub author_bonus: bool,
    #[serde(default)]
    pub year_penalty: bool,
}

impl Candidate {
    /// Attaches a score breakdown to an unscored record.
    pub fn from_record(record: SourceRecord, source_name: &str, breakdown: ScoreBreakdown) -> Self {
        Self {
            title: record.title,
            url: record.url,
            identifier: record.identifier,
            authors: record.authors,
            year: record.year,
            source_name: source_name.to_string(),
            raw_similarity: breakdown.raw_similarity,
            adjusted_score: breakdown.adjusted_score,
            author_bonus: breakdown.author_bonus,
            year_penalty: breakdown.year_penalty,
        }
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        ScoreBreakdown {
            raw_similarity: self.raw_similarity,
            author_bonus: self.author_bonus,
            year_penalty: self.year_penalty,
            adjusted_score: self.adjusted_score,
        }
    }
}

/// An unscored bibliographic record parsed out of a source payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    pub title: String,
    pub url: String,
    pub identifier: Option<String>,
    pub authors: Vec<AuthorName>,
    pub year: Option<String>,
}

impl SourceRecord {
    /// Scores this record against `cited` and labels it with `source_name`.
    pub fn score_against(self, cited: &CitedWork<'_>, source_name: &str) -> Candidate {
        let breakdown = score(cited, &self.title, &self.authors, self.year.as_deref());
        Candidate::from_record(self, source_name, breakdown)
    }
}

/// Picks the highest-scoring candidate; ties keep the earliest.
pub fn best_candidate<I>(candidates: I) -> Option<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates.into_iter().fold(None, |best, next| match best {
        Some(current) if current.adjusted_score >= next.adjusted_score => Some(current),
        _ => Some(next),
    })
}

/// The query passed to every search adapter.
///
/// `title` is already normalized. Blank author and year fields are stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    pub author: Option<String>,
    pub year: Option<String>,
}

impl SearchQuery {
    pub fn new(title: impl Into<String>, author: Option<String>, year: Option<String>) -> Self {
        Self {
            title: title.into(),
            author: author.filter(|a| !a.trim().is_empty()),
            year: year.filter(|y| !y.trim().is_empty()),
        }
    }

    /// Title-only query.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
            year: None,
        }
    }

    /// Borrowed view used for scoring.
    pub fn cited(&self) -> CitedWork<'_> {
        CitedWork::new(&self.title, self.author.as_deref(), self.year.as_deref())
    }

    /// Cache fingerprint for this query under `adapter`.
    pub fn fingerprint(&self, adapter: &str) -> String {
        crate::hashing::fingerprint(
            adapter,
            &[
                Some(self.title.as_str()),
                self.author.as_deref(),
                self.year.as_deref(),
            ],
        )
    }
}
