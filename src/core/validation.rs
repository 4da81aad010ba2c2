use serde::{Deserialize, Serialize};

/// Accumulated soft validation outcome.
///
/// Validation never fails fast: every problem found is recorded so callers
/// can surface all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn invalid(error: impl Into<String>) -> Self {
        let mut report = Self::valid();
        report.push(error);
        report
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    pub fn extend(&mut self, other: Self) {
        for error in other.errors {
            self.push(error);
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::valid()
    }
}
