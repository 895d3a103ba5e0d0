//! Candidate scoring: title similarity, author agreement and year proximity.
//!
//! All functions here are pure. The combined [`score`] is additive and saturating:
//!
//! | Signal                           | Effect                    |
//! |----------------------------------|---------------------------|
//! | token-sorted title similarity    | base score, 0–100         |
//! | first-author surname match       | `+15`                     |
//! | both years known, more than 2 apart | `-30`                  |
//! | either year missing/unparsable   | no adjustment             |
//!
//! The result is clamped to `[0, 100]`. A definite year mismatch can veto a strong title
//! match; an author match alone cannot lift a weak title over the acceptance threshold.

pub mod similarity;
pub mod types;


pub use similarity::{
    author_matches, extract_year, first_author_surname, normalize_title, score,
    title_similarity, year_matches,
};
pub use types::{AuthorName, CitedWork, ScoreBreakdown, YearAgreement};
