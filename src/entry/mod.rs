//! Citation entries and the BibTeX reader that produces them.

pub mod bibtex;
pub mod error;

#[cfg(test)]
mod tests;

pub use error::{ParseError, ParseResult};

use serde::{Deserialize, Serialize};

/// One bibliography record to verify.
///
/// Only `id` is guaranteed. Blank fields are stored as `None`; `author` keeps the raw
/// `"Last, First and Last, First"` form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

impl CitationEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_blank(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = non_blank(author.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = non_blank(year.into());
        self
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = non_blank(doi.into());
        self
    }

    /// Builds an entry from `(field, value)` pairs. Field names are matched
    /// case-insensitively; unknown fields are ignored.
    pub fn from_fields<I, K, V>(id: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        fields
            .into_iter()
            .fold(Self::new(id), |entry, (key, value)| {
                match key.as_ref().to_ascii_lowercase().as_str() {
                    "title" => entry.with_title(value),
                    "author" => entry.with_author(value),
                    "year" => entry.with_year(value),
                    "doi" => entry.with_doi(value),
                    _ => entry,
                }
            })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
