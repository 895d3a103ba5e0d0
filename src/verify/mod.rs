//! Per-entry verification: DOI short-circuit, search cascade and threshold decision.
//!
//! ```text
//! START ─ no title ──────────────────────────────► ERROR
//!   │
//!   ├─ DOI resolves ─ years agree/unknown ────────► VALID
//!   │               └ years disagree ─────────────► UNCERTAIN
//!   │
//!   └─ cascade: first candidate ≥ acceptance ─────► VALID
//!        └ best of the rest ≥ uncertain ──────────► UNCERTAIN
//!                          < uncertain / none ────► NOT_FOUND
//! ```

pub mod verdict;
pub mod verifier;


pub use verdict::{Verdict, VerdictStatus};
pub use verifier::{DEFAULT_MAX_WORKERS, NO_RESULTS_REASON, NO_TITLE_REASON, Verifier};
