//! Outcome envelope and diagnostic reporting types.
//!
//! Every recoverable operation in the store core returns an [`Outcome`]
//! rather than signaling through any other channel: "store not yet
//! initialized" is an expected result, not an exceptional one. A failed
//! outcome carries every structured error the operation hit, not just the
//! last one.

use crate::Error;

/// Severity attached to a diagnostic report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    /// No diagnostic recorded yet
    #[default]
    None,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Get the string representation of the severity
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single diagnostic record retained on the store handle.
#[derive(Debug, Clone)]
pub struct Report {
    pub severity: Severity,
    pub text: String,
}

impl Report {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Success/failure envelope for store operations.
///
/// A successful outcome holds a value; a failed outcome holds the errors
/// that were accumulated while the operation ran. Accessing the value of a
/// failed outcome is a contract violation and panics.
#[derive(Debug)]
pub struct Outcome<T> {
    value: Option<T>,
    errors: Vec<Error>,
}

impl<T> Outcome<T> {
    /// Create a successful outcome carrying `value`
    pub fn success(value: T) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    /// Create a failed outcome carrying the accumulated errors
    pub fn failure(errors: Vec<Error>) -> Self {
        Self {
            value: None,
            errors,
        }
    }

    /// Whether the operation succeeded
    pub fn successful(&self) -> bool {
        self.value.is_some()
    }

    /// Borrow the carried value.
    ///
    /// # Panics
    /// Panics if the outcome is a failure.
    pub fn value(&self) -> &T {
        self.value
            .as_ref()
            .expect("Cannot access value of failed outcome")
    }

    /// Consume the outcome and take the carried value.
    ///
    /// # Panics
    /// Panics if the outcome is a failure.
    pub fn into_value(self) -> T {
        self.value
            .expect("Cannot access value of failed outcome")
    }

    /// Errors accumulated by a failed operation; empty on success
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }
}

impl Outcome<()> {
    /// Aggregate a list of collected errors: success when empty
    pub fn from_errors(errors: Vec<Error>) -> Self {
        if errors.is_empty() {
            Outcome::success(())
        } else {
            Outcome::failure(errors)
        }
    }
}
