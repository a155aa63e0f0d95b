//! Error adapter for rendering stencil errors and warnings with miette.
//!
//! This module provides the bridge between the library's plain error and
//! diagnostic types and miette's rich report formatting used in the CLI.
//!
//! Fatal errors arrive as a [`StencilError`] and are wrapped in an
//! [`ErrorAdapter`]. Recoverable problems arrive as a list of
//! [`Diagnostic`] warnings and are wrapped one by one in a
//! [`DiagnosticAdapter`], so each renders as its own report.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, Severity as MietteSeverity};

use stencil::{Diagnostic, Severity, StencilError};

/// Adapter for a single stencil diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic) -> Self {
        Self { diag }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())?;
        if let Some(part) = self.diag.part() {
            write!(f, " (in `{part}`)")?;
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Advice => MietteSeverity::Advice,
            Severity::Warning => MietteSeverity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }
}

/// Adapter for a fatal [`StencilError`].
pub struct ErrorAdapter<'a>(pub &'a StencilError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            StencilError::Io(_) => "stencil::io",
            StencilError::InputNotFound(_) => "stencil::input",
            StencilError::UnsupportedInput { .. } => "stencil::input",
            StencilError::Decode(err) => return Some(Box::new(err.code())),
            StencilError::NoPages(_) => "stencil::decode",
            StencilError::Export(_) => "stencil::export",
            StencilError::Config(_) => "stencil::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            StencilError::UnsupportedInput { .. } => {
                "open the file in Visio and save it as a .vsdx drawing"
            }
            StencilError::Decode(err) => err.code().description(),
            StencilError::Config(_) => "check the configuration file and environment overrides",
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A reportable problem that can be rendered by miette.
///
/// This enum wraps either a single warning or a fatal error, providing a
/// uniform interface for rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A recoverable problem with a code and an optional package part.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A fatal error.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<MietteSeverity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }
}

/// Wrap a fatal error for rendering.
pub fn to_reportable(err: &StencilError) -> Reportable<'_> {
    Reportable::Error(ErrorAdapter(err))
}

/// Wrap each warning for independent rendering, preserving order.
pub fn to_reportables(warnings: &[Diagnostic]) -> Vec<Reportable<'_>> {
    warnings
        .iter()
        .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d)))
        .collect()
}

/// Render a reportable to a string with miette's graphical handler.
pub fn render(reportable: &Reportable<'_>) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    if reporter.render_report(&mut writer, reportable).is_err() {
        // Writing to a String only fails if a Display impl fails.
        return reportable.to_string();
    }
    writer
}

#[cfg(test)]
mod tests {
    use stencil::ErrorCode;

    use super::*;

    #[test]
    fn test_warnings_render_independently() {
        let warnings = vec![
            Diagnostic::warning("page `Bad` could not be decoded: unexpected end")
                .with_code(ErrorCode::E102)
                .with_part("visio/pages/page2.xml"),
            Diagnostic::warning("image could not be resolved").with_code(ErrorCode::E200),
        ];

        let reportables = to_reportables(&warnings);

        assert_eq!(reportables.len(), 2);
        assert_eq!(
            reportables[0].to_string(),
            "page `Bad` could not be decoded: unexpected end (in `visio/pages/page2.xml`)"
        );
        assert_eq!(reportables[1].to_string(), "image could not be resolved");
        assert_eq!(
            reportables[0].code().map(|c| c.to_string()),
            Some("E102".to_string())
        );
        assert_eq!(reportables[0].severity(), Some(MietteSeverity::Warning));
    }

    #[test]
    fn test_advice_keeps_its_severity() {
        let diag = Diagnostic::advice("text for shape `3` has confidence 0.5")
            .with_code(ErrorCode::E301);

        let reportables = to_reportables(std::slice::from_ref(&diag));

        assert_eq!(reportables[0].severity(), Some(MietteSeverity::Advice));
    }

    #[test]
    fn test_help_is_forwarded() {
        let diag = Diagnostic::warning("low confidence")
            .with_code(ErrorCode::E301)
            .with_help("review the recognized text");
        let adapter = DiagnosticAdapter::new(&diag);

        assert_eq!(
            adapter.help().map(|h| h.to_string()),
            Some("review the recognized text".to_string())
        );
    }

    #[test]
    fn test_error_codes() {
        let err = StencilError::NoPages("empty.vsdx".to_string());
        let reportable = to_reportable(&err);

        assert_eq!(
            reportable.to_string(),
            "no pages could be decoded from `empty.vsdx`"
        );
        assert_eq!(
            reportable.code().map(|c| c.to_string()),
            Some("stencil::decode".to_string())
        );
        assert!(reportable.help().is_none());
    }

    #[test]
    fn test_unsupported_input_has_help() {
        let err = StencilError::UnsupportedInput {
            path: "old.vsd".to_string(),
            reason: "legacy".to_string(),
        };

        assert!(to_reportable(&err).help().is_some());
    }

    #[test]
    fn test_render_contains_message() {
        let diag = Diagnostic::warning("OCR failed for shape `7`").with_code(ErrorCode::E300);
        let reportables = to_reportables(std::slice::from_ref(&diag));

        let rendered = render(&reportables[0]);

        assert!(rendered.contains("OCR failed for shape `7`"));
        assert!(rendered.contains("E300"));
    }
}
