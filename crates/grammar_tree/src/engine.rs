//! Boundary to the externally generated lexer/parser.
//!
//! The grammar engine is produced by a separate grammar-compilation step; this
//! module only describes what the harness needs from it. Recognition errors
//! travel through an [`ErrorListener`] and are kept as data, never raised.

use std::fmt;

use crate::cache::PredictionCache;

/// Token type the engine reports for end of input.
pub const EOF_TOKEN_TYPE: i32 = -1;

/// A single token produced by [`GrammarEngine::tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Engine-specific token type.
    pub token_type: i32,
    /// Literal source text of the token.
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
}

impl Token {
    /// Creates a token.
    pub fn new(token_type: i32, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            token_type,
            text: text.into(),
            line,
            column,
        }
    }

    /// Returns true for the end-of-input token.
    pub fn is_eof(&self) -> bool {
        self.token_type == EOF_TOKEN_TYPE
    }
}

/// Concrete tree as the engine produced it.
///
/// Child order encodes which grammar alternative matched. `None` slots stand
/// for optional children the parser left empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcreteNode {
    /// A rule invocation, identified by its index into [`GrammarEngine::rule_names`].
    Rule {
        rule_index: usize,
        children: Vec<Option<ConcreteNode>>,
    },
    /// A matched (or error-recovered) token.
    Terminal(Token),
}

impl ConcreteNode {
    /// Creates a rule node.
    pub fn rule(rule_index: usize, children: Vec<Option<ConcreteNode>>) -> Self {
        Self::Rule {
            rule_index,
            children,
        }
    }
}

/// A recognition error reported by the lexer or the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Engine-provided message.
    pub message: String,
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
}

impl SyntaxError {
    /// Creates a syntax error record.
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}:{} {}", self.line, self.column, self.message)
    }
}

/// Receives recognition errors. Implementations must not abort recognition.
pub trait ErrorListener {
    /// Called once per recognition error, in discovery order.
    fn syntax_error(&mut self, line: usize, column: usize, message: &str);
}

impl ErrorListener for Vec<SyntaxError> {
    fn syntax_error(&mut self, line: usize, column: usize, message: &str) {
        self.push(SyntaxError::new(message, line, column));
    }
}

/// The externally supplied lexer/parser pair.
///
/// One engine value is one recognizer instance. Engines share their
/// prediction-context memo through [`GrammarEngine::shared_cache`], which is
/// owned by the session that created them.
pub trait GrammarEngine {
    /// Splits source text into tokens, ending with an EOF token.
    fn tokenize(&mut self, source: &str, errors: &mut dyn ErrorListener) -> Vec<Token>;

    /// Parses a token stream starting at `root_rule`.
    ///
    /// The engine always returns a tree; syntax problems are reported to
    /// `errors` and recovered from.
    fn parse(
        &mut self,
        tokens: &[Token],
        root_rule: usize,
        errors: &mut dyn ErrorListener,
    ) -> ConcreteNode;

    /// Grammar rule names, indexed by rule index.
    fn rule_names(&self) -> &[String];

    /// Symbolic name of a token type, if the vocabulary has one.
    fn symbolic_name(&self, token_type: i32) -> Option<&str>;

    /// The prediction-context memo this engine writes into.
    fn shared_cache(&self) -> &dyn PredictionCache;

    /// Resets the recognizer's internal state.
    fn reset(&mut self);

    /// Drops the recognizer's decision DFA.
    fn clear_dfa(&mut self);

    /// Looks up the index of a rule by name.
    fn rule_index(&self, name: &str) -> Option<usize> {
        self.rule_names().iter().position(|rule| rule == name)
    }
}
