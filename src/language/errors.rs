use crate::language::span::Span;

/// A syntax error raised at a source span. `message` is the full sentence
/// for the report header; `label` is the short annotation rendered at the
/// span itself, describing what was actually found there.
#[derive(Clone, Debug)]
pub struct SyntaxError {
    pub message: String,
    pub label: String,
    pub span: Span,
    pub help: Option<String>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, label: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            label: label.into(),
            span,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Every error the front end accumulated for one parse.
#[derive(Clone, Debug)]
pub struct SyntaxErrors {
    pub errors: Vec<SyntaxError>,
}

impl SyntaxErrors {
    pub fn new(errors: Vec<SyntaxError>) -> Self {
        Self { errors }
    }

    /// Single-line rendition for hosts that do not want a rich report.
    pub fn to_message(&self) -> String {
        self.errors
            .iter()
            .map(|err| err.message.clone())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
