use serde::{Deserialize, Serialize};

/// One author as reported by a source.
///
/// Crossref reports structured names (`family`/`given`), Semantic Scholar a `name` object,
/// and arXiv plain display strings. Both shapes round-trip through the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorName {
    /// Free-text display name, e.g. `"Ashish Vaswani"`.
    Display(String),
    /// Structured name mapping.
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        family: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        given: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl AuthorName {
    pub fn display(name: impl Into<String>) -> Self {
        Self::Display(name.into())
    }

    pub fn family(family: impl Into<String>, given: Option<&str>) -> Self {
        Self::Structured {
            family: Some(family.into()),
            given: given.map(str::to_string),
            name: None,
        }
    }

    /// Name fields that author matching compares against (family name and full name).
    pub fn match_keys(&self) -> Vec<&str> {
        match self {
            Self::Display(name) => vec![name.as_str()],
            Self::Structured { family, name, .. } => [family.as_deref(), name.as_deref()]
                .into_iter()
                .flatten()
                .filter(|s| !s.trim().is_empty())
                .collect(),
        }
    }

    /// Best human-readable form of the name.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Display(name) => name.clone(),
            Self::Structured {
                family,
                given,
                name,
            } => match (given.as_deref(), family.as_deref(), name.as_deref()) {
                (Some(g), Some(f), _) => format!("{} {}", g, f),
                (None, Some(f), _) => f.to_string(),
                (_, None, Some(n)) => n.to_string(),
                (Some(g), None, None) => g.to_string(),
                (None, None, None) => String::new(),
            },
        }
    }
}

/// Outcome of comparing cited and candidate publication years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearAgreement {
    /// Both years known and within tolerance.
    Match,
    /// Both years known and too far apart.
    Mismatch,
    /// At least one side is absent or has no 4-digit year.
    Unknown,
}

impl YearAgreement {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, YearAgreement::Mismatch)
    }
}

/// The cited side of a comparison, borrowed from an entry or query.
#[derive(Debug, Clone, Copy, Default)]
pub struct CitedWork<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub year: Option<&'a str>,
}

impl<'a> CitedWork<'a> {
    pub fn new(title: &'a str, author: Option<&'a str>, year: Option<&'a str>) -> Self {
        Self {
            title,
            author,
            year,
        }
    }
}

/// Score of one candidate with the adjustments that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Title similarity before adjustments (0–100).
    pub raw_similarity: f64,
    /// The author bonus was added.
    pub author_bonus: bool,
    /// The year penalty was subtracted.
    pub year_penalty: bool,
    /// Final clamped score (0–100).
    pub adjusted_score: f64,
}
