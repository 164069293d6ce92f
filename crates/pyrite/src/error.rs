//! Error types and the diagnostic sink for soft warnings.

use std::fmt;

/// A failure that aborts the current module's translation.
///
/// Keeping structural and configuration failures distinct lets drivers give
/// accurate feedback without string matching. Both carry the module name and
/// the source line of the offending node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// A structural problem in the input tree: an unsupported node in a given
    /// position, a chained comparison, `return expr` inside a generator.
    Translation {
        message: String,
        module: String,
        lineno: u32,
    },
    /// A bad compile option: unknown `setCompilerOptions` name, malformed
    /// decorator.
    Configuration {
        message: String,
        module: String,
        lineno: u32,
    },
}

impl TranslateError {
    pub(crate) fn translation(message: impl Into<String>, module: impl Into<String>, lineno: u32) -> Self {
        Self::Translation {
            message: message.into(),
            module: module.into(),
            lineno,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>, module: impl Into<String>, lineno: u32) -> Self {
        Self::Configuration {
            message: message.into(),
            module: module.into(),
            lineno,
        }
    }

    /// The source line the error points at.
    pub fn lineno(&self) -> u32 {
        match self {
            Self::Translation { lineno, .. } | Self::Configuration { lineno, .. } => *lineno,
        }
    }

    /// The error text without location information.
    pub fn message(&self) -> &str {
        match self {
            Self::Translation { message, .. } | Self::Configuration { message, .. } => message,
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation { message, module, lineno } | Self::Configuration { message, module, lineno } => {
                write!(f, "{module} line {lineno}: {message}")
            }
        }
    }
}

impl std::error::Error for TranslateError {}

/// Receiver for soft warnings; translation continues after each one.
///
/// Implement this to capture or redirect diagnostics from a translation run.
pub trait DiagnosticSink {
    fn warning(&mut self, message: &str);
}

/// Default sink that writes warnings to stderr.
#[derive(Debug, Default)]
pub struct StderrDiag;

impl DiagnosticSink for StderrDiag {
    fn warning(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

/// Sink that collects warnings into a vector, for testing or batch reporting.
#[derive(Debug, Default)]
pub struct CollectDiag(Vec<String>);

impl CollectDiag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.0
    }
}

impl DiagnosticSink for CollectDiag {
    fn warning(&mut self, message: &str) {
        self.0.push(message.to_owned());
    }
}

/// Sink that ignores all warnings.
#[derive(Debug, Default)]
pub struct NoDiag;

impl DiagnosticSink for NoDiag {
    fn warning(&mut self, _message: &str) {}
}
