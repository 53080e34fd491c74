//! Stack file errors and source-annotated diagnostics

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors from reading or writing stack files
#[derive(Debug, Error, Diagnostic)]
pub enum StackFileError {
    #[error("failed to access {path}: {source}")]
    #[diagnostic(code(tolstack::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] JsonSyntaxError),

    #[error("CSV error in {path}: {message}")]
    #[diagnostic(
        code(tolstack::csv),
        help("expected a header row with: description, nominal, direction, tol, tolType, cpk, floatShifted")
    )]
    Csv { path: PathBuf, message: String },

    #[error("{path} already exists")]
    #[diagnostic(code(tolstack::exists), help("pass --force to overwrite it"))]
    AlreadyExists { path: PathBuf },

    #[error("failed to serialize stack: {0}")]
    #[diagnostic(code(tolstack::serialize))]
    Serialize(String),
}

/// A JSON syntax or shape error, pointing into the offending file
#[derive(Debug, Error, Diagnostic)]
#[error("invalid stack file {filename}: {message}")]
#[diagnostic(
    code(tolstack::json),
    help("stack files are plain JSON; check for a missing comma, quote or bracket near the marked position")
)]
pub struct JsonSyntaxError {
    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    pub filename: String,
    pub message: String,

    /// 1-based line, 0 when unknown
    pub line: usize,
    /// 1-based column, 0 when unknown
    pub column: usize,
}

impl JsonSyntaxError {
    /// Build a diagnostic from a serde_json error
    pub fn from_serde_error(err: &serde_json::Error, content: &str, filename: &str) -> Self {
        let line = err.line();
        let column = err.column();
        let span = if line == 0 {
            None
        } else {
            let offset = byte_offset(content, line, column);
            let len = if offset < content.len() { 1 } else { 0 };
            Some(SourceSpan::new(offset.into(), len))
        };

        Self {
            src: NamedSource::new(filename, content.to_string()),
            span,
            filename: filename.to_string(),
            message: strip_position(&err.to_string()),
            line,
            column,
        }
    }
}

/// Byte offset of a 1-based line/column, clamped to the content
fn byte_offset(content: &str, line: usize, column: usize) -> usize {
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(content.len())
}

/// serde_json appends " at line X column Y"; the span already says that
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}
