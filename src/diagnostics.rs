use crate::language::errors::SyntaxError;
use crate::runtime::error::RuntimeError;
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::path::Path;
use thiserror::Error;

/// One rendered syntax error: the message heads the report, the label
/// annotates the offending span, and the optional help trails it.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct ParseDiagnostic {
    #[source_code]
    source_code: NamedSource<String>,
    #[label("{label}")]
    at: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl ParseDiagnostic {
    pub fn new(name: &str, source: &str, err: &SyntaxError) -> Self {
        Self {
            source_code: NamedSource::new(name, source.to_string()),
            at: (err.span.start, err.span.len()).into(),
            help: err.help.clone(),
            message: err.message.clone(),
            label: err.label.clone(),
        }
    }
}

pub fn emit_syntax_errors(name: &str, source: &str, errors: &[SyntaxError]) {
    for err in errors {
        eprintln!("{:?}", Report::new(ParseDiagnostic::new(name, source, err)));
    }
}

/// Runtime failures print as one line; the context chain is already part of
/// the message and the kind stays inspectable on the error itself.
pub fn report_runtime_error(error: &RuntimeError) {
    eprintln!("gosling: {}", error);
}

pub fn report_script_error(path: &Path, error: &std::io::Error) {
    eprintln!("gosling: cannot read {}: {}", path.display(), error);
}
