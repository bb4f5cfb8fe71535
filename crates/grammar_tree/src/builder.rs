//! Drives a grammar engine over source text and converts its concrete tree
//! into a [`ParseTree`].

use thiserror::Error;
use tracing::debug;

use crate::adapter::{BoundedParserAdapter, DEFAULT_CACHE_CEILING};
use crate::engine::{ConcreteNode, GrammarEngine, SyntaxError};
use crate::tree::{escape_token_text, ParseTree};

/// Root rule of the Kotlin grammar.
pub const DEFAULT_ROOT_RULE: &str = "kotlinFile";

/// Errors that prevent a tree from being built at all.
///
/// Syntax errors in the source are not among them; those come back as data
/// in [`ParseOutcome`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The engine has no rule with the requested name
    #[error("grammar has no rule named `{0}`")]
    UnknownRootRule(String),

    /// The engine returned a node referring to a rule index it does not define
    #[error("engine produced rule index {0} outside its rule table")]
    UnknownRuleIndex(usize),
}

/// Result type for tree building
pub type BuildResult<T> = Result<T, BuildError>;

/// Canonical tree plus the errors each phase reported, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub tree: ParseTree,
    pub lexer_errors: Vec<SyntaxError>,
    pub parser_errors: Vec<SyntaxError>,
}

impl ParseOutcome {
    pub fn has_lexer_errors(&self) -> bool {
        !self.lexer_errors.is_empty()
    }

    pub fn has_parser_errors(&self) -> bool {
        !self.parser_errors.is_empty()
    }

    /// True if either phase reported anything.
    pub fn has_any_errors(&self) -> bool {
        self.has_lexer_errors() || self.has_parser_errors()
    }
}

/// Builds canonical trees from source text.
#[derive(Debug, Clone)]
pub struct ParseTreeBuilder {
    root_rule: String,
    cache_ceiling: usize,
}

impl Default for ParseTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseTreeBuilder {
    /// Creates a builder for [`DEFAULT_ROOT_RULE`].
    pub fn new() -> Self {
        Self {
            root_rule: DEFAULT_ROOT_RULE.to_string(),
            cache_ceiling: DEFAULT_CACHE_CEILING,
        }
    }

    /// Sets the rule parsing starts from.
    pub fn root_rule(mut self, rule: impl Into<String>) -> Self {
        self.root_rule = rule.into();
        self
    }

    /// Sets the shared-cache ceiling applied when wrapping an engine.
    pub fn cache_ceiling(mut self, ceiling: usize) -> Self {
        self.cache_ceiling = ceiling;
        self
    }

    pub fn root_rule_name(&self) -> &str {
        &self.root_rule
    }

    pub fn ceiling(&self) -> usize {
        self.cache_ceiling
    }

    /// Wraps `engine` in a [`BoundedParserAdapter`] and parses `source`.
    pub fn build<E: GrammarEngine>(&self, engine: E, source: &str) -> BuildResult<ParseOutcome> {
        let mut adapter = BoundedParserAdapter::with_ceiling(engine, self.cache_ceiling);
        self.build_with(&mut adapter, source)
    }

    /// Parses `source` with an engine the caller already bounded.
    pub fn build_with<E: GrammarEngine>(
        &self,
        engine: &mut BoundedParserAdapter<E>,
        source: &str,
    ) -> BuildResult<ParseOutcome> {
        let root_index = engine
            .rule_index(&self.root_rule)
            .ok_or_else(|| BuildError::UnknownRootRule(self.root_rule.clone()))?;

        let mut lexer_errors = Vec::new();
        let tokens = engine.tokenize(source, &mut lexer_errors);

        let mut parser_errors = Vec::new();
        let concrete = engine.parse(&tokens, root_index, &mut parser_errors);

        let mut root = ParseTree::rule(self.root_rule.clone());
        match concrete {
            ConcreteNode::Rule { children, .. } => {
                for child in children.into_iter().flatten() {
                    root.push_child(convert(&**engine, child)?);
                }
            }
            terminal @ ConcreteNode::Terminal(_) => root.push_child(convert(&**engine, terminal)?),
        }

        debug!(
            tokens = tokens.len(),
            nodes = root.node_count(),
            lexer_errors = lexer_errors.len(),
            parser_errors = parser_errors.len(),
            "built parse tree"
        );

        Ok(ParseOutcome {
            tree: root,
            lexer_errors,
            parser_errors,
        })
    }
}

/// Maps an engine node (and its subtree) onto canonical nodes, keeping child
/// order and skipping empty optional slots.
fn convert<E: GrammarEngine + ?Sized>(engine: &E, node: ConcreteNode) -> BuildResult<ParseTree> {
    match node {
        ConcreteNode::Terminal(token) => {
            let name = engine
                .symbolic_name(token.token_type)
                .map_or_else(|| token.token_type.to_string(), str::to_string);
            Ok(ParseTree::terminal(name, escape_token_text(&token.text)))
        }
        ConcreteNode::Rule {
            rule_index,
            children,
        } => {
            let name = engine
                .rule_names()
                .get(rule_index)
                .ok_or(BuildError::UnknownRuleIndex(rule_index))?;
            let mut tree = ParseTree::rule(name.clone());
            for child in children.into_iter().flatten() {
                tree.push_child(convert(engine, child)?);
            }
            Ok(tree)
        }
    }
}
