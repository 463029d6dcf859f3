//! Plain-text rendering of HTML issue and comment bodies.
//!
//! The parsed document is walked in document order. Text runs are kept and
//! indented two spaces per level of nesting; all markup is dropped. The
//! output is meant for a terminal, not for round-tripping.

use scraper::{Html, Node};
use thiserror::Error;

const INDENT: &str = "  ";

/// Errors that abort a render.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// A node kind with no plain-text meaning, such as a comment.
    #[error("Unsupported node in content: {0}")]
    UnsupportedNodeKind(&'static str),

    /// A document or fragment node below the root.
    #[error("Invalid content document: unexpected {0} node")]
    InvalidDocument(&'static str),
}

/// Parse an entry's HTML content and flatten it.
pub fn render_html(content: &str) -> Result<String, RenderError> {
    flatten(&Html::parse_document(content))
}

/// Flatten a parsed document to indented plain text.
///
/// The root is never rendered; its children start at level zero. A root
/// with no children renders as the empty string.
///
/// Elements write nothing of their own, not even indentation: the result is
/// exactly the text runs, each preceded by its depth in indents.
pub fn flatten(document: &Html) -> Result<String, RenderError> {
    let root = document.tree.root();
    let mut out = String::new();

    let mut stack: Vec<_> = root.children().rev().map(|child| (child, 0usize)).collect();
    while let Some((node, level)) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                for _ in 0..level {
                    out.push_str(INDENT);
                }
                out.push_str(text);
            }
            Node::Element(_) => {}
            Node::Comment(_) => return Err(RenderError::UnsupportedNodeKind("comment")),
            Node::Doctype(_) => return Err(RenderError::UnsupportedNodeKind("doctype")),
            Node::ProcessingInstruction(_) => {
                return Err(RenderError::UnsupportedNodeKind("processing instruction"))
            }
            Node::Document => return Err(RenderError::InvalidDocument("document")),
            Node::Fragment => return Err(RenderError::InvalidDocument("fragment")),
        }

        stack.extend(node.children().rev().map(|child| (child, level + 1)));
    }

    Ok(out)
}
