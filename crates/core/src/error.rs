use thiserror::Error;

use crate::frontmatter::FrontmatterError;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    /// Optional file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Attributes this location to `file`.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors that can abort processing of a single document.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    Parse {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// Frontmatter could not be extracted.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// A node violated the shape its kind requires.
    #[error("Invalid {kind} node: {message}")]
    InvalidNode {
        /// Node kind name (e.g. `containerDirective`).
        kind: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// A tree pass failed; traversal was aborted.
    #[error("Pass `{pass}` failed: {message}")]
    Pass {
        /// Name of the failing pass.
        pass: String,
        /// Failure description.
        message: String,
    },
    /// Options could not be used as given.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    /// Internal logic error (unexpected state).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WeaveError {
    /// Create a parse error with location
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: SourceLocation::new(line, column),
        }
    }

    /// Create a pass failure error
    pub fn pass_failed(pass: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pass {
            pass: pass.into(),
            message: message.into(),
        }
    }
}

/// Non-fatal warnings that don't prevent rendering
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParseWarning {
    /// Container directive opened but never closed; it was closed at end of input.
    UnclosedDirective {
        /// Source location of the opening `:::name` line
        location: SourceLocation,
        /// Directive name
        name: String,
    },
    /// Markup that was left untouched because it could not be interpreted.
    SuspiciousMarkup {
        /// Source location where the suspicious markup was found
        location: SourceLocation,
        /// Warning message
        message: String,
    },
}

impl ParseWarning {
    /// Get the location of this warning
    pub fn location(&self) -> &SourceLocation {
        match self {
            ParseWarning::UnclosedDirective { location, .. } => location,
            ParseWarning::SuspiciousMarkup { location, .. } => location,
        }
    }
}

impl ParseWarning {
    fn location_mut(&mut self) -> &mut SourceLocation {
        match self {
            ParseWarning::UnclosedDirective { location, .. } => location,
            ParseWarning::SuspiciousMarkup { location, .. } => location,
        }
    }
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnclosedDirective { location, name } => {
                write!(f, "Unclosed directive `{}` at {}", name, location)
            }
            ParseWarning::SuspiciousMarkup { location, message } => {
                write!(f, "{}: {}", location, message)
            }
        }
    }
}

/// Recoverable error information
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecoverableError {
    /// Error message
    pub message: String,
    /// Source location, when the offending node carried one
    pub location: Option<SourceLocation>,
    /// Error severity
    pub severity: ErrorSeverity,
}

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Error that was recovered from
    Error,
    /// Warning that doesn't prevent rendering
    Warning,
}

impl RecoverableError {
    /// Create a new recoverable error
    pub fn error(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            message: message.into(),
            location,
            severity: ErrorSeverity::Error,
        }
    }

    /// Create a new warning
    pub fn warning(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            message: message.into(),
            location,
            severity: ErrorSeverity::Warning,
        }
    }
}

impl std::fmt::Display for RecoverableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            ErrorSeverity::Error => "error",
            ErrorSeverity::Warning => "warning",
        };
        match &self.location {
            Some(location) => write!(f, "{} at {}: {}", severity, location, self.message),
            None => write!(f, "{}: {}", severity, self.message),
        }
    }
}

/// Collection of diagnostics (warnings and recoverable errors) for one document
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct Diagnostics {
    /// List of non-fatal parse warnings
    pub warnings: Vec<ParseWarning>,
    /// List of recoverable errors
    pub errors: Vec<RecoverableError>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a warning to the diagnostics collection
    pub fn add_warning(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }

    /// Add a recoverable error to the diagnostics collection
    pub fn add_error(&mut self, error: RecoverableError) {
        self.errors.push(error);
    }

    /// Add a warning with location
    pub fn add_warning_at(&mut self, message: impl Into<String>, line: usize, column: usize) {
        self.warnings.push(ParseWarning::SuspiciousMarkup {
            location: SourceLocation::new(line, column),
            message: message.into(),
        });
    }

    /// Move every entry of `other` into this collection
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Attributes every located entry to `file`.
    pub fn attribute_to(&mut self, file: &str) {
        let warnings = self.warnings.iter_mut().map(ParseWarning::location_mut);
        let errors = self.errors.iter_mut().filter_map(|error| error.location.as_mut());
        for location in warnings.chain(errors) {
            location.file = Some(file.to_string());
        }
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any diagnostics
    pub fn has_any(&self) -> bool {
        self.has_warnings() || self.has_errors()
    }

    /// Get total count of all diagnostics
    pub fn count(&self) -> usize {
        self.warnings.len() + self.errors.len()
    }
}
