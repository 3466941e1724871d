//! Reporting for damaged spans recorded by error nodes.
//!
//! An error node remembers why recognition failed and which input the parser
//! skipped to resynchronize. A [`Diagnostic`] carries both so the report can
//! point at the skipped text.

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Message, Snippet};
pub use text_size::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
    skipped: String,
}

impl Diagnostic {
    /// A failure at `range`, where the parser skipped `skipped` to recover.
    pub fn new(message: impl Into<String>, range: TextRange, skipped: impl Into<String>) -> Self {
        Self { message: message.into(), range, skipped: skipped.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Input text covered by the error node.
    pub fn skipped(&self) -> &str {
        &self.skipped
    }

    /// Annotation shown under the damaged span.
    pub fn label(&self) -> String {
        if self.skipped.is_empty() {
            "nothing skipped".to_owned()
        } else {
            format!("skipped `{}` to resync", self.skipped.escape_debug())
        }
    }

    fn message_for<'a>(&'a self, label: &'a str, path: &'a str, text: &'a str) -> Message<'a> {
        Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label(label))
                .fold(true),
        )
    }

    pub fn render(&self, renderer: &Renderer, path: &str, text: &str) -> String {
        let label = self.label();
        renderer.render(self.message_for(&label, path, text)).to_string()
    }
}

/// Renders `diagnostics` in source order, one report per blank-line separated block.
pub fn render_all(diagnostics: &[Diagnostic], renderer: &Renderer, path: &str, text: &str) -> String {
    let mut ordered: Vec<_> = diagnostics.iter().collect();
    ordered.sort_by_key(|diagnostic| diagnostic.range.start());
    ordered
        .into_iter()
        .map(|diagnostic| diagnostic.render(renderer, path, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
