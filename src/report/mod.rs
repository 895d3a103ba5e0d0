//! Markdown and JSON reports for one verified bibliography file.


use std::fmt::Write as _;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::entry::CitationEntry;
use crate::scoring::normalize_title;
use crate::verify::{Verdict, VerdictStatus};

/// Verdict counts for one file. `error` verdicts count as not found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub doubtful: usize,
    pub not_found: usize,
}

impl Summary {
    pub fn from_verdicts<'a, I>(verdicts: I) -> Self
    where
        I: IntoIterator<Item = &'a Verdict>,
    {
        verdicts
            .into_iter()
            .fold(Self::default(), |mut summary, verdict| {
                summary.total += 1;
                match verdict.status {
                    VerdictStatus::Valid => summary.passed += 1,
                    VerdictStatus::Uncertain => summary.doubtful += 1,
                    VerdictStatus::NotFound | VerdictStatus::Error => summary.not_found += 1,
                }
                summary
            })
    }

    /// Console summary block.
    pub fn render_console(&self, report_path: &str) -> String {
        let rule = "-".repeat(30);
        format!(
            "{rule}\n   VERIFICATION SUMMARY\n{rule}\n Total Entries: {}\n [✅] Passed:    {}\n [⚠️] Doubtful:  {}\n [❌] Not Found: {}\n {rule}\n Report generated: {report_path}\n",
            self.total, self.passed, self.doubtful, self.not_found
        )
    }
}

fn status_label(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Valid => "✅ [PASSED]",
        VerdictStatus::Uncertain => "⚠️ [DOUBTFUL]",
        VerdictStatus::NotFound | VerdictStatus::Error => "❌ [NOT FOUND]",
    }
}

/// Renders the Markdown report for `file_name`.
///
/// `verdicts[i]` is the verdict for `entries[i]`, as returned by
/// [`crate::verify::Verifier::verify_all`].
pub fn render_markdown<Tz>(
    file_name: &str,
    entries: &[CitationEntry],
    verdicts: &[Verdict],
    processed_at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# Verification Report: {file_name}\n");
    let _ = writeln!(
        out,
        "**Processed at**: {}\n",
        processed_at.format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str("## Detailed Results\n\n");

    for (entry, verdict) in entries.iter().zip(verdicts) {
        write_entry(&mut out, entry, verdict);
    }

    let summary = Summary::from_verdicts(verdicts);
    out.push_str("## Summary\n");
    let _ = writeln!(out, "- **Total**: {}", summary.total);
    let _ = writeln!(out, "- **Passed**: {}", summary.passed);
    let _ = writeln!(out, "- **Doubtful**: {}", summary.doubtful);
    let _ = writeln!(out, "- **Not Found**: {}", summary.not_found);
    out
}

fn write_entry(out: &mut String, entry: &CitationEntry, verdict: &Verdict) {
    let original = entry
        .title
        .as_deref()
        .map(normalize_title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No Title".to_string());

    let _ = writeln!(out, "### {} ID: {}", status_label(verdict.status), entry.id);
    let _ = writeln!(out, "- **Original Title**: {original}");

    match verdict.status {
        VerdictStatus::Valid => {
            let _ = writeln!(
                out,
                "- **Matched Title**: {}",
                verdict.title.as_deref().unwrap_or_default()
            );
            let _ = writeln!(
                out,
                "- **Similarity**: {:.2}%",
                verdict.raw_similarity.unwrap_or_default()
            );
            let _ = writeln!(out, "- **Link**: {}", verdict.url.as_deref().unwrap_or_default());
            let _ = writeln!(
                out,
                "- **Source**: {}",
                verdict.source.as_deref().unwrap_or_default()
            );
        }
        VerdictStatus::Uncertain => {
            let _ = writeln!(
                out,
                "- **Matched Title**: {}",
                verdict.title.as_deref().unwrap_or_default()
            );
            let _ = writeln!(
                out,
                "- **Reason**: {}",
                verdict.reason.as_deref().unwrap_or_default()
            );
            let _ = writeln!(out, "- **Link**: {}", verdict.url.as_deref().unwrap_or_default());
            let _ = writeln!(
                out,
                "- **Source**: {}",
                verdict.source.as_deref().unwrap_or_default()
            );
        }
        VerdictStatus::NotFound | VerdictStatus::Error => {
            let _ = writeln!(
                out,
                "- **Reason**: {}",
                verdict
                    .reason
                    .as_deref()
                    .unwrap_or("No match found above threshold")
            );
            if let Some(guess) = &verdict.best_guess {
                let _ = writeln!(
                    out,
                    "- **Closest Match**: {} ({}, {:.2}%)",
                    guess.title, guess.source_name, guess.adjusted_score
                );
            }
        }
    }

    out.push_str("\n---\n\n");
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: &'a str,
    processed_at: String,
    summary: Summary,
    verdicts: &'a [Verdict],
}

/// Renders the verdicts as a pretty-printed JSON document.
pub fn render_json<Tz>(
    file_name: &str,
    verdicts: &[Verdict],
    processed_at: &DateTime<Tz>,
) -> serde_json::Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    serde_json::to_string_pretty(&JsonReport {
        file: file_name,
        processed_at: processed_at.to_rfc3339(),
        summary: Summary::from_verdicts(verdicts),
        verdicts,
    })
}
