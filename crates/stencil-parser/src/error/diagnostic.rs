//! The core diagnostic type for the Stencil error system.
//!
//! A [`Diagnostic`] represents a single recovered problem with an optional
//! error code, the package part it concerns, and help text.

use std::fmt;

use crate::error::{Severity, error_code::ErrorCode};

/// A diagnostic message tied to a location inside the package.
///
/// Diagnostics provide:
/// - A severity level
/// - An optional error code for documentation and searchability
/// - A primary message describing the issue
/// - The package part (e.g. `visio/pages/page2.xml`) the issue was found in
/// - Optional help text with suggestions
///
/// # Example
///
/// ```text
/// warning[E200]: image for shape `7` could not be resolved (visio/pages/page1.xml)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    part: Option<String>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create a warning diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use stencil_parser::error::Diagnostic;
    ///
    /// let diag = Diagnostic::warning("image could not be resolved")
    ///     .with_help("the shape is kept without image data");
    /// ```
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an advice diagnostic for a result that was kept as is.
    pub fn advice(message: impl Into<String>) -> Self {
        Self::new(Severity::Advice, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the package part this diagnostic refers to, if any.
    pub fn part(&self) -> Option<&str> {
        self.part.as_deref()
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the package part.
    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.part = Some(part.into());
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            part: None,
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "warning[E200]: message (part)" or "warning: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(part) = &self.part {
            write!(f, " ({part})")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
