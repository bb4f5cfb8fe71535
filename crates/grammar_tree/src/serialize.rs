//! Deterministic text rendering of a [`ParseTree`].
//!
//! Golden-file comparison is textual, so the same tree and header must always
//! render to the same bytes.

use std::fmt::Write;

use crate::tree::{NodeKind, ParseTree};

const INDENT: &str = "  ";

/// Renders a tree below a caller-supplied header line.
///
/// The header stands in for the root node; the root's children start at
/// depth 1. Rules render as their name, terminals as `NAME("text")`.
///
/// ```text
/// File: main.kt - 5d41402abc4b2a76b9719d911017c592
///   topLevelObject
///     declaration
///       functionDeclaration
///         FUN("fun")
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSerializer;

impl TreeSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Renders `tree` with `header` as the first line. Every line, including
    /// the last, ends with `\n`.
    pub fn render(&self, tree: &ParseTree, header: &str) -> String {
        let mut out = String::with_capacity(header.len() + tree.node_count() * 24);
        out.push_str(header);
        out.push('\n');
        for child in tree.children() {
            render_node(&mut out, child, 1);
        }
        out
    }
}

fn render_node(out: &mut String, node: &ParseTree, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    match node.kind() {
        NodeKind::Rule => out.push_str(node.name()),
        NodeKind::Terminal => {
            // Writing into a String cannot fail.
            let _ = write!(out, "{}(\"{}\")", node.name(), node.text().unwrap_or_default());
        }
    }
    out.push('\n');
    for child in node.children() {
        render_node(out, child, depth + 1);
    }
}
