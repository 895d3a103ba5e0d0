//! Cross-cutting, shared constants.
//!
//! # Threshold Calibration
//!
//! The acceptance and uncertain thresholds are deliberately runtime values. The defaults
//! below are a starting calibration, not a derived truth: pass a [`Thresholds`] through
//! initialization and call [`Thresholds::validate`] at the boundary.

/// Title similarity and adjusted scores live on a 0–100 scale.
pub const MAX_SCORE: f64 = 100.0;
pub const MIN_SCORE: f64 = 0.0;

/// Added when the cited first author matches a candidate author.
pub const AUTHOR_MATCH_BONUS: f64 = 15.0;

/// Subtracted when both years are known and they disagree.
pub const YEAR_MISMATCH_PENALTY: f64 = 30.0;

/// Maximum allowed distance (in years) between cited and candidate year.
pub const YEAR_TOLERANCE: i32 = 2;

/// `partial_ratio` must be strictly greater than this for an author to match.
pub const AUTHOR_PARTIAL_RATIO_THRESHOLD: f64 = 80.0;

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 85.0;
pub const DEFAULT_UNCERTAIN_THRESHOLD: f64 = 75.0;

/// Runtime decision thresholds for the verifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum adjusted score to accept a citation as valid.
    pub acceptance: f64,
    /// Minimum adjusted score to flag a citation for review instead of rejecting it.
    pub uncertain: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            acceptance: DEFAULT_ACCEPTANCE_THRESHOLD,
            uncertain: DEFAULT_UNCERTAIN_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn new(acceptance: f64, uncertain: f64) -> Self {
        Self {
            acceptance,
            uncertain,
        }
    }

    /// Returns an error if either value is outside `[0, 100]` or `uncertain > acceptance`.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        for (name, value) in [("acceptance", self.acceptance), ("uncertain", self.uncertain)] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(ThresholdError::OutOfRange { name, value });
            }
        }
        if self.uncertain > self.acceptance {
            return Err(ThresholdError::Inverted {
                acceptance: self.acceptance,
                uncertain: self.uncertain,
            });
        }
        Ok(())
    }
}

/// Error returned when threshold validation fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdError {
    /// Threshold is outside the 0–100 score scale (or NaN).
    OutOfRange { name: &'static str, value: f64 },
    /// Uncertain threshold is above the acceptance threshold.
    Inverted { acceptance: f64, uncertain: f64 },
}

impl std::fmt::Display for ThresholdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { name, value } => {
                write!(f, "{} threshold {} is outside [0, 100]", name, value)
            }
            Self::Inverted {
                acceptance,
                uncertain,
            } => write!(
                f,
                "uncertain threshold {} exceeds acceptance threshold {}",
                uncertain, acceptance
            ),
        }
    }
}

impl std::error::Error for ThresholdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_default() {
        let t = Thresholds::default();
        assert_eq!(t.acceptance, DEFAULT_ACCEPTANCE_THRESHOLD);
        assert_eq!(t.uncertain, DEFAULT_UNCERTAIN_THRESHOLD);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_thresholds_equal_is_valid() {
        assert!(Thresholds::new(80.0, 80.0).validate().is_ok());
    }

    #[test]
    fn test_thresholds_inverted() {
        assert_eq!(
            Thresholds::new(60.0, 75.0).validate(),
            Err(ThresholdError::Inverted {
                acceptance: 60.0,
                uncertain: 75.0
            })
        );
    }

    #[test]
    fn test_thresholds_out_of_range() {
        let err = Thresholds::new(101.0, 75.0).validate().unwrap_err();
        assert!(err.to_string().contains("acceptance"));

        let err = Thresholds::new(90.0, -1.0).validate().unwrap_err();
        assert!(err.to_string().contains("uncertain"));
    }

    #[test]
    fn test_thresholds_nan_rejected() {
        assert!(Thresholds::new(f64::NAN, 75.0).validate().is_err());
    }
}
