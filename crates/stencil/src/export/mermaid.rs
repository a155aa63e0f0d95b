//! Mermaid flowchart projection.
//!
//! Every page becomes one flowchart block. Node tokens (`node1`, `node2`,
//! ...) are local to a page and restart at `node1` on each one.

use std::collections::HashMap;

use log::{debug, info};
use stencil_core::{DocumentGraph, PageGraph};

use crate::export::{ExportError, Exporter};

/// Default maximum label length, in characters.
pub const DEFAULT_MAX_LABEL_LENGTH: usize = 50;

const INDENT: &str = "    ";
const ELLIPSIS: &str = "...";
const PAGE_SEPARATOR: &str = "---";

/// Projects documents into Mermaid flowchart text.
#[derive(Debug, Clone)]
pub struct MermaidExporter {
    max_label_length: usize,
}

impl MermaidExporter {
    pub fn new(max_label_length: usize) -> Self {
        Self { max_label_length }
    }

    pub fn max_label_length(&self) -> usize {
        self.max_label_length
    }

    /// Renders a single page as one flowchart block.
    pub fn render_page(&self, page: &PageGraph) -> String {
        let mut lines = vec![header(page).to_string()];
        let mut tokens: HashMap<&str, String> = HashMap::with_capacity(page.shapes().len());

        for (index, shape) in page.shapes().iter().enumerate() {
            let token = format!("node{}", index + 1);

            let mut label = sanitize_label(shape.text(), self.max_label_length);
            if label.is_empty() {
                label = format!("Shape {token}");
            }

            if shape.is_decision_like() {
                lines.push(format!("{INDENT}{token}{{\"{label}\"}}"));
            } else {
                lines.push(format!("{INDENT}{token}[\"{label}\"]"));
            }
            tokens.insert(shape.id(), token);
        }

        let mut edges = 0usize;
        for connection in page.connections() {
            if let (Some(from), Some(to)) = (tokens.get(connection.from()), tokens.get(connection.to()))
            {
                lines.push(format!("{INDENT}{from} --> {to}"));
                edges += 1;
            }
        }

        debug!(
            page = page.name(),
            nodes = page.shapes().len(),
            edges;
            "Projected page to Mermaid"
        );
        lines.join("\n")
    }
}

impl Default for MermaidExporter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LABEL_LENGTH)
    }
}

impl Exporter for MermaidExporter {
    fn export(&mut self, document: &DocumentGraph) -> Result<String, ExportError> {
        let pages = document.pages();
        let mut lines: Vec<String> = Vec::new();

        for (index, page) in pages.iter().enumerate() {
            if pages.len() > 1 {
                lines.push(format!("## {}", page.name()));
                lines.push(String::new());
            }

            lines.push(self.render_page(page));

            if index + 1 < pages.len() {
                lines.push(String::new());
                lines.push(PAGE_SEPARATOR.to_string());
                lines.push(String::new());
            }
        }

        info!(pages = pages.len(); "Mermaid export complete");
        Ok(lines.join("\n"))
    }
}

/// The flowchart header for a page.
///
/// Pages with connections but no decision-like shapes use `graph TD`; all
/// other pages use `flowchart TD`.
fn header(page: &PageGraph) -> &'static str {
    let has_connections = !page.connections().is_empty();
    let has_decisions = page.shapes().iter().any(|shape| shape.is_decision_like());

    if has_connections && !has_decisions {
        "graph TD"
    } else {
        "flowchart TD"
    }
}

/// Makes `text` safe to place inside a quoted Mermaid label.
///
/// Characters with meaning in Mermaid syntax are replaced, whitespace runs
/// are collapsed to single spaces, and the result is cut to at most
/// `max_length` characters, ending in `...` when cut. Applying the function
/// to its own output returns it unchanged.
///
/// # Examples
///
/// ```
/// use stencil::export::mermaid::sanitize_label;
///
/// assert_eq!(sanitize_label("A&B <C> #1", 50), "A and B ltCgt hash1");
/// assert_eq!(sanitize_label("abcdefghij", 8), "abcde...");
/// ```
pub fn sanitize_label(text: &str, max_length: usize) -> String {
    let mut replaced = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' | '`' => replaced.push('\''),
            '\\' | '|' => replaced.push('/'),
            '\n' | '\r' => replaced.push(' '),
            '#' => replaced.push_str("hash"),
            '&' => replaced.push_str(" and "),
            '<' => replaced.push_str("lt"),
            '>' => replaced.push_str("gt"),
            '[' | '{' => replaced.push('('),
            ']' | '}' => replaced.push(')'),
            c => replaced.push(c),
        }
    }

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(collapsed, max_length)
}

fn truncate(text: String, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text;
    }

    // The cut may land after a space; trailing whitespace would be collapsed
    // away on a second pass.
    if max_length < ELLIPSIS.len() {
        let cut: String = text.chars().take(max_length).collect();
        return cut.trim_end().to_string();
    }

    let cut: String = text.chars().take(max_length - ELLIPSIS.len()).collect();
    let mut truncated = cut.trim_end().to_string();
    truncated.push_str(ELLIPSIS);
    truncated
}
