use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::constants::{
    AUTHOR_MATCH_BONUS, AUTHOR_PARTIAL_RATIO_THRESHOLD, MAX_SCORE, MIN_SCORE,
    YEAR_MISMATCH_PENALTY, YEAR_TOLERANCE,
};

use super::types::{AuthorName, CitedWork, ScoreBreakdown, YearAgreement};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("valid year regex"));

/// Strips BibTeX braces and quotes and collapses whitespace. Idempotent.
pub fn normalize_title(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '{' | '}' | '"' | '\''))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Order-insensitive title similarity in `[0, 100]`.
///
/// Both sides are lowercased, split on non-alphanumeric characters, sorted and rejoined,
/// then compared with an Indel ratio (`2 * lcs / (len_a + len_b)`). `"The AI"` and
/// `"AI, The"` compare equal. Returns `0` if either side is blank.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    if a.trim().is_empty() || b.trim().is_empty() {
        return MIN_SCORE;
    }

    let key_a = token_sort_key(a);
    let key_b = token_sort_key(b);

    // Punctuation-only titles have no tokens; compare them verbatim instead.
    if key_a.is_empty() || key_b.is_empty() {
        return ratio(&a.trim().to_lowercase(), &b.trim().to_lowercase());
    }

    ratio(&key_a, &key_b)
}

/// Returns `true` if the cited first author's surname appears in any candidate author.
///
/// The surname is the first `,`- or `" and "`-delimited token of the BibTeX author field.
/// A candidate matches when the fuzzy partial ratio exceeds 80.
pub fn author_matches(cited_author: &str, candidate_authors: &[AuthorName]) -> bool {
    let surname = first_author_surname(cited_author);
    if surname.is_empty() || candidate_authors.is_empty() {
        return false;
    }

    let needle = surname.to_lowercase();
    candidate_authors
        .iter()
        .flat_map(AuthorName::match_keys)
        .any(|key| partial_ratio(&needle, &key.to_lowercase()) > AUTHOR_PARTIAL_RATIO_THRESHOLD)
}

/// First author's surname from a `"Last, First and Last, First"` field.
pub fn first_author_surname(author_field: &str) -> String {
    let first = author_field
        .split(',')
        .next()
        .unwrap_or("")
        .split(" and ")
        .next()
        .unwrap_or("");

    first
        .chars()
        .filter(|c| !matches!(c, '{' | '}'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// First 4-digit run in `text`, as a year.
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// Compares years, tolerating up to two years of publication lag.
pub fn year_matches(cited_year: Option<&str>, candidate_year: Option<&str>) -> YearAgreement {
    let (Some(cited), Some(found)) = (
        cited_year.and_then(extract_year),
        candidate_year.and_then(extract_year),
    ) else {
        return YearAgreement::Unknown;
    };

    if (cited - found).abs() <= YEAR_TOLERANCE {
        YearAgreement::Match
    } else {
        YearAgreement::Mismatch
    }
}

/// Scores one candidate against the cited work.
///
/// Starts from [`title_similarity`], adds the author bonus on an author match, subtracts
/// the year penalty only on a definite year mismatch, and clamps to `[0, 100]`.
pub fn score(
    cited: &CitedWork<'_>,
    candidate_title: &str,
    candidate_authors: &[AuthorName],
    candidate_year: Option<&str>,
) -> ScoreBreakdown {
    let raw_similarity = title_similarity(cited.title, candidate_title);

    let author_bonus = cited
        .author
        .is_some_and(|author| author_matches(author, candidate_authors));
    let year_penalty = year_matches(cited.year, candidate_year).is_mismatch();

    let mut adjusted = raw_similarity;
    if author_bonus {
        adjusted += AUTHOR_MATCH_BONUS;
    }
    if year_penalty {
        adjusted -= YEAR_MISMATCH_PENALTY;
    }
    let adjusted_score = adjusted.clamp(MIN_SCORE, MAX_SCORE);

    trace!(
        raw_similarity,
        author_bonus,
        year_penalty,
        adjusted_score,
        "Scored candidate"
    );

    ScoreBreakdown {
        raw_similarity,
        author_bonus,
        year_penalty,
        adjusted_score,
    }
}

fn token_sort_key(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Indel similarity `2 * lcs / (len_a + len_b)` on a 0–100 scale.
fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    indel_ratio(&a, &b)
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return MAX_SCORE;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64 * MAX_SCORE
}

/// Longest common subsequence length, one DP row at a time.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// Best [`ratio`] of the shorter string against every same-length window of the longer.
pub(crate) fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return MIN_SCORE;
    }

    long.windows(short.len())
        .map(|window| indel_ratio(&short, window))
        .fold(MIN_SCORE, f64::max)
}
