//! The harness's own parse tree, independent of the engine's node types.

/// Whether a node is a rule invocation or a matched token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Rule,
    Terminal,
}

/// A node of the canonical parse tree.
///
/// Terminals carry escaped literal text and never have children; rules never
/// carry text. The constructors are the only way to build nodes, which keeps
/// both properties true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    kind: NodeKind,
    name: String,
    text: Option<String>,
    children: Vec<ParseTree>,
}

impl ParseTree {
    /// Creates a rule node with no children yet.
    pub fn rule(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Rule,
            name: name.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Creates a terminal node. `text` is stored as given (already escaped).
    pub fn terminal(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Terminal,
            name: name.into(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Appends a child to a rule node and returns it for chaining.
    ///
    /// # Panics
    ///
    /// Panics when called on a terminal node.
    pub fn with_child(mut self, child: ParseTree) -> Self {
        self.push_child(child);
        self
    }

    /// Appends a child to a rule node.
    ///
    /// # Panics
    ///
    /// Panics when called on a terminal node.
    pub fn push_child(&mut self, child: ParseTree) {
        assert!(
            self.kind == NodeKind::Rule,
            "terminal `{}` cannot have children",
            self.name
        );
        self.children.push(child);
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Rule name or symbolic token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Escaped literal text of a terminal.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[ParseTree] {
        &self.children
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == NodeKind::Terminal
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ParseTree::node_count).sum::<usize>()
    }

    /// Depth-first, pre-order iterator over this subtree.
    pub fn iter(&self) -> impl Iterator<Item = &ParseTree> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Escapes line breaks in token text so every terminal renders on one line.
/// `\r\n` and `\n` become `\\n`; a lone `\r` becomes `\\r`.
pub fn escape_token_text(text: &str) -> String {
    text.replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
