//! BibTeX reading via [`biblatex`].
//!
//! The whole input is parsed first. Real-world files often contain a single broken
//! entry or an undefined `@string` abbreviation that fails the whole parse; in that
//! case every `@type{...}` chunk is parsed on its own and the unparsable ones are
//! skipped.

use std::fs;
use std::path::Path;

use biblatex::{Bibliography, Chunk, Entry, Spanned};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::CitationEntry;
use super::error::{ParseError, ParseResult};

static ENTRY_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*@[a-zA-Z]").expect("valid entry regex"));

/// Reads and parses a `.bib` file.
pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<Vec<CitationEntry>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content)
}

/// Parses BibTeX source into entries, in file order.
pub fn parse_str(content: &str) -> ParseResult<Vec<CitationEntry>> {
    let entries = match Bibliography::parse(content) {
        Ok(bibliography) => bibliography.iter().map(to_citation).collect::<Vec<_>>(),
        Err(err) => {
            debug!(error = %err, "Whole-file BibTeX parse failed, parsing entries individually");
            parse_chunks(content)
        }
    };

    if entries.is_empty() {
        return Err(ParseError::NoEntries);
    }
    Ok(entries)
}

fn parse_chunks(content: &str) -> Vec<CitationEntry> {
    let starts: Vec<usize> = ENTRY_START_RE
        .find_iter(content)
        .map(|m| m.start())
        .collect();

    let mut entries = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(content.len());
        let chunk = &content[start..end];

        match Bibliography::parse(chunk) {
            Ok(bibliography) => entries.extend(bibliography.iter().map(to_citation)),
            Err(err) => {
                let head: String = chunk.trim().chars().take(60).collect();
                warn!(error = %err, entry = %head, "Skipping unparsable BibTeX entry");
            }
        }
    }
    entries
}

fn to_citation(entry: &Entry) -> CitationEntry {
    let field = |name: &str| entry.get(name).map(chunks_to_string).unwrap_or_default();

    // biblatex-style files carry `date` instead of `year`.
    let mut year = field("year");
    if year.trim().is_empty() {
        year = field("date");
    }

    CitationEntry::new(entry.key.clone())
        .with_title(field("title"))
        .with_author(field("author"))
        .with_year(year)
        .with_doi(field("doi"))
}

fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|c| match &c.v {
            Chunk::Normal(s) | Chunk::Verbatim(s) | Chunk::Math(s) => s.as_str(),
        })
        .collect::<Vec<_>>()
        .join("")
}
