// This module implements the diagnostic collaborator shared by every phase of the
// front end. Reporter collects Diagnostic records (phase, severity, message, optional
// source position) without ever aborting compilation; callers that care about fatal
// conditions poll has_fatal() after the fact. FrontendError covers the I/O failures
// of the driver binary and uses thiserror for Display derivation.

//! Diagnostic collection and reporting.
//!
//! Reporting is fire-and-forget: the core phases record what they saw and
//! keep going. Nothing in this crate branches on error counts.

use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Compilation phase a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lexical,
    Syntax,
    Semantic,
    Runtime,
    Generic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Lexical => "Lexical Error",
            Phase::Syntax => "Syntax Error",
            Phase::Semantic => "Semantic Error",
            Phase::Runtime => "Runtime Error",
            Phase::Generic => "Generic Error",
        };
        f.write_str(s)
    }
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        };
        f.write_str(s)
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    /// Source line, 1-based. `None` when the position is unknown.
    pub line: Option<i32>,
    pub column: Option<i32>,
    pub recoverable: bool,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]{}", self.phase, self.severity)?;
        if let Some(line) = self.line {
            write!(f, "(line {line}")?;
            if let Some(col) = self.column {
                write!(f, ", col = {col}")?;
            }
            write!(f, ")")?;
        }
        write!(f, ": {}", self.message)?;
        if !self.recoverable {
            write!(f, "[NON-RECOVERABLE]")?;
        }
        Ok(())
    }
}

/// Errors of the driver itself, as opposed to diagnostics about the program
/// being compiled.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Collects diagnostics from all phases of a compilation.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for the usual shared-ownership setup: the
    /// lexer, the symbol table and the generator all hold a handle.
    pub fn shared() -> Rc<RefCell<Reporter>> {
        Rc::new(RefCell::new(Reporter::new()))
    }

    /// General entry point used by all the severity helpers.
    pub fn report(
        &mut self,
        phase: Phase,
        severity: Severity,
        message: impl Into<String>,
        line: Option<i32>,
        column: Option<i32>,
        recoverable: bool,
    ) {
        let diag = Diagnostic {
            phase,
            severity,
            message: message.into(),
            line,
            column,
            recoverable,
        };
        match severity {
            Severity::Info => log::info!("{diag}"),
            Severity::Warning => log::warn!("{diag}"),
            _ => log::error!("{diag}"),
        }
        self.diagnostics.push(diag);
    }

    pub fn error(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        line: Option<i32>,
        column: Option<i32>,
    ) {
        self.report(phase, Severity::Error, message, line, column, true);
    }

    pub fn warning(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        line: Option<i32>,
        column: Option<i32>,
    ) {
        self.report(phase, Severity::Warning, message, line, column, true);
    }

    pub fn info(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        line: Option<i32>,
        column: Option<i32>,
    ) {
        self.report(phase, Severity::Info, message, line, column, true);
    }

    pub fn fatal(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        line: Option<i32>,
        column: Option<i32>,
    ) {
        self.report(phase, Severity::Fatal, message, line, column, false);
    }

    /// Number of `Error` and `Fatal` diagnostics recorded so far.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Fatal)
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Human-readable rendition of every recorded diagnostic.
    pub fn summary(&self) -> String {
        if self.diagnostics.is_empty() {
            return "No errors or warnings\n".to_string();
        }
        let mut out = format!("=== Compiler Messages ({}) ===\n", self.diagnostics.len());
        for d in &self.diagnostics {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out.push_str("=== END OF MESSAGES ===\n");
        out
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), FrontendError> {
        let path = path.as_ref();
        fs::write(path, self.summary()).map_err(|source| FrontendError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}
