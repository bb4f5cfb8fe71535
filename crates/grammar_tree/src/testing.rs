//! A small deterministic grammar engine for a Kotlin subset.
//!
//! It exists so the harness can be exercised end to end without the real
//! generated recognizer. It follows the same conventions: a hidden whitespace
//! channel, an `EOF` token, error recovery that keeps parsing, and one
//! memoized prediction context per rule invocation written into the shared
//! cache.
//!
//! ```text
//! kotlinFile              : NL* topLevelObject* EOF
//! topLevelObject          : declaration semis?
//! declaration             : functionDeclaration | propertyDeclaration
//! functionDeclaration     : FUN simpleIdentifier functionValueParameters functionBody?
//! functionValueParameters : LPAREN (functionValueParameter (COMMA functionValueParameter)*)? RPAREN
//! functionValueParameter  : simpleIdentifier COLON type
//! type                    : simpleIdentifier
//! functionBody            : block
//! block                   : LCURL statements RCURL
//! statements              : (statement | semis)*
//! statement               : declaration | expression
//! propertyDeclaration     : VAL simpleIdentifier (ASSIGNMENT expression)?
//! expression              : primaryExpression
//! primaryExpression       : simpleIdentifier | literalConstant
//! literalConstant         : IntegerLiteral
//! simpleIdentifier        : Identifier
//! semis                   : (SEMICOLON | NL)+
//! ```

use crate::cache::{PredictionCache, SharedContextCache};
use crate::engine::{ConcreteNode, ErrorListener, GrammarEngine, Token, EOF_TOKEN_TYPE};

pub const FUN: i32 = 1;
pub const VAL: i32 = 2;
pub const LPAREN: i32 = 3;
pub const RPAREN: i32 = 4;
pub const LCURL: i32 = 5;
pub const RCURL: i32 = 6;
pub const COMMA: i32 = 7;
pub const COLON: i32 = 8;
pub const SEMICOLON: i32 = 9;
pub const ASSIGNMENT: i32 = 10;
pub const NL: i32 = 11;
pub const IDENTIFIER: i32 = 12;
pub const INTEGER_LITERAL: i32 = 13;

const SYMBOLIC_NAMES: [&str; 14] = [
    "",
    "FUN",
    "VAL",
    "LPAREN",
    "RPAREN",
    "LCURL",
    "RCURL",
    "COMMA",
    "COLON",
    "SEMICOLON",
    "ASSIGNMENT",
    "NL",
    "Identifier",
    "IntegerLiteral",
];

const RULE_NAMES: [&str; 17] = [
    "kotlinFile",
    "topLevelObject",
    "declaration",
    "functionDeclaration",
    "functionValueParameters",
    "functionValueParameter",
    "type",
    "functionBody",
    "block",
    "statements",
    "statement",
    "propertyDeclaration",
    "expression",
    "primaryExpression",
    "literalConstant",
    "simpleIdentifier",
    "semis",
];

const KOTLIN_FILE: usize = 0;
const TOP_LEVEL_OBJECT: usize = 1;
const DECLARATION: usize = 2;
const FUNCTION_DECLARATION: usize = 3;
const FUNCTION_VALUE_PARAMETERS: usize = 4;
const FUNCTION_VALUE_PARAMETER: usize = 5;
const TYPE: usize = 6;
const FUNCTION_BODY: usize = 7;
const BLOCK: usize = 8;
const STATEMENTS: usize = 9;
const STATEMENT: usize = 10;
const PROPERTY_DECLARATION: usize = 11;
const EXPRESSION: usize = 12;
const PRIMARY_EXPRESSION: usize = 13;
const LITERAL_CONSTANT: usize = 14;
const SIMPLE_IDENTIFIER: usize = 15;
const SEMIS: usize = 16;

/// What the engine memoizes per rule invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubsetContext {
    pub rule_index: usize,
    pub token_index: usize,
    pub lookahead: String,
}

/// Recognizer for the Kotlin subset described in the module docs.
#[derive(Debug)]
pub struct KotlinSubsetEngine {
    cache: SharedContextCache<SubsetContext>,
    rule_names: Vec<String>,
    dfa_states: usize,
    resets: usize,
}

impl KotlinSubsetEngine {
    pub fn new(cache: SharedContextCache<SubsetContext>) -> Self {
        Self {
            cache,
            rule_names: RULE_NAMES.iter().map(|name| (*name).to_string()).collect(),
            dfa_states: 0,
            resets: 0,
        }
    }

    /// Tokenizes and parses from `kotlinFile`, discarding diagnostics.
    pub fn parse_source(&mut self, source: &str) -> ConcreteNode {
        let mut ignored = Vec::new();
        let tokens = self.tokenize(source, &mut ignored);
        self.parse(&tokens, KOTLIN_FILE, &mut ignored)
    }

    /// Decision states accumulated since the last DFA clear.
    pub fn dfa_states(&self) -> usize {
        self.dfa_states
    }

    /// How many times the recognizer was reset.
    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl GrammarEngine for KotlinSubsetEngine {
    fn tokenize(&mut self, source: &str, errors: &mut dyn ErrorListener) -> Vec<Token> {
        Lexer::new(source).run(errors)
    }

    fn parse(
        &mut self,
        tokens: &[Token],
        root_rule: usize,
        errors: &mut dyn ErrorListener,
    ) -> ConcreteNode {
        let mut parser = Parser {
            tokens,
            pos: 0,
            errors,
            cache: &self.cache,
            dfa_states: &mut self.dfa_states,
        };
        match root_rule {
            KOTLIN_FILE => parser.kotlin_file(),
            DECLARATION => parser.declaration(),
            STATEMENTS => parser.statements(),
            EXPRESSION => parser.expression(),
            other => ConcreteNode::rule(other, Vec::new()),
        }
    }

    fn rule_names(&self) -> &[String] {
        &self.rule_names
    }

    fn symbolic_name(&self, token_type: i32) -> Option<&str> {
        if token_type == EOF_TOKEN_TYPE {
            return Some("EOF");
        }
        usize::try_from(token_type)
            .ok()
            .and_then(|index| SYMBOLIC_NAMES.get(index))
            .copied()
            .filter(|name| !name.is_empty())
    }

    fn shared_cache(&self) -> &dyn PredictionCache {
        &self.cache
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn clear_dfa(&mut self) {
        self.dfa_states = 0;
    }
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, first: char, pred: impl Fn(char) -> bool) -> String {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            text.push(c);
            self.bump();
        }
        text
    }

    fn run(mut self, errors: &mut dyn ErrorListener) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            let (line, column) = (self.line, self.column);
            self.bump();
            let token = match c {
                ' ' | '\t' => continue,
                '\n' => Token::new(NL, "\n", line, column),
                '\r' => {
                    if self.chars.peek() == Some(&'\n') {
                        self.bump();
                        Token::new(NL, "\r\n", line, column)
                    } else {
                        Token::new(NL, "\r", line, column)
                    }
                }
                '/' if self.chars.peek() == Some(&'/') => {
                    while self.chars.peek().is_some_and(|&c| c != '\n') {
                        self.bump();
                    }
                    continue;
                }
                '(' => Token::new(LPAREN, "(", line, column),
                ')' => Token::new(RPAREN, ")", line, column),
                '{' => Token::new(LCURL, "{", line, column),
                '}' => Token::new(RCURL, "}", line, column),
                ',' => Token::new(COMMA, ",", line, column),
                ':' => Token::new(COLON, ":", line, column),
                ';' => Token::new(SEMICOLON, ";", line, column),
                '=' => Token::new(ASSIGNMENT, "=", line, column),
                c if c.is_ascii_digit() => {
                    let text = self.take_while(c, |c| c.is_ascii_digit() || c == '_');
                    Token::new(INTEGER_LITERAL, text, line, column)
                }
                c if c.is_alphabetic() || c == '_' => {
                    let text = self.take_while(c, |c| c.is_alphanumeric() || c == '_');
                    let token_type = match text.as_str() {
                        "fun" => FUN,
                        "val" => VAL,
                        _ => IDENTIFIER,
                    };
                    Token::new(token_type, text, line, column)
                }
                other => {
                    errors.syntax_error(
                        line,
                        column,
                        &format!("token recognition error at: '{other}'"),
                    );
                    continue;
                }
            };
            tokens.push(token);
        }
        tokens.push(Token::new(EOF_TOKEN_TYPE, "<EOF>", self.line, self.column));
        tokens
    }
}

struct Parser<'t, 'e> {
    tokens: &'t [Token],
    pos: usize,
    errors: &'e mut dyn ErrorListener,
    cache: &'e SharedContextCache<SubsetContext>,
    dfa_states: &'e mut usize,
}

impl Parser<'_, '_> {
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    fn la(&self) -> i32 {
        self.current().map_or(EOF_TOKEN_TYPE, |t| t.token_type)
    }

    fn enter(&mut self, rule_index: usize) {
        let lookahead = self.current().map(|t| t.text.clone()).unwrap_or_default();
        self.cache.intern(SubsetContext {
            rule_index,
            token_index: self.pos,
            lookahead,
        });
        *self.dfa_states += 1;
    }

    fn consume(&mut self) -> ConcreteNode {
        let token = self
            .current()
            .cloned()
            .unwrap_or_else(|| Token::new(EOF_TOKEN_TYPE, "<EOF>", 1, 1));
        if !token.is_eof() {
            self.pos += 1;
        }
        ConcreteNode::Terminal(token)
    }

    fn report(&mut self, message: String) {
        let (line, column) = self.current().map_or((1, 1), |t| (t.line, t.column));
        self.errors.syntax_error(line, column, &message);
    }

    fn display(&self) -> String {
        self.current().map(|t| t.text.clone()).unwrap_or_default()
    }

    /// Matches `token_type`, reporting a missing token without consuming.
    fn expect(&mut self, token_type: i32, children: &mut Vec<Option<ConcreteNode>>) {
        if self.la() == token_type {
            children.push(Some(self.consume()));
        } else {
            let message = format!(
                "missing {} at '{}'",
                SYMBOLIC_NAMES[usize::try_from(token_type).unwrap_or_default()],
                self.display()
            );
            self.report(message);
        }
    }

    fn kotlin_file(&mut self) -> ConcreteNode {
        self.enter(KOTLIN_FILE);
        let mut children = Vec::new();
        loop {
            match self.la() {
                NL => children.push(Some(self.consume())),
                FUN | VAL => children.push(Some(self.top_level_object())),
                EOF_TOKEN_TYPE => break,
                _ => {
                    let message = format!(
                        "extraneous input '{}' expecting {{<EOF>, 'fun', 'val'}}",
                        self.display()
                    );
                    self.report(message);
                    children.push(Some(self.consume()));
                }
            }
        }
        children.push(Some(self.consume()));
        ConcreteNode::rule(KOTLIN_FILE, children)
    }

    fn top_level_object(&mut self) -> ConcreteNode {
        self.enter(TOP_LEVEL_OBJECT);
        let mut children = vec![Some(self.declaration())];
        if matches!(self.la(), NL | SEMICOLON) {
            children.push(Some(self.semis()));
        }
        ConcreteNode::rule(TOP_LEVEL_OBJECT, children)
    }

    fn declaration(&mut self) -> ConcreteNode {
        self.enter(DECLARATION);
        let child = if self.la() == VAL {
            self.property_declaration()
        } else {
            self.function_declaration()
        };
        ConcreteNode::rule(DECLARATION, vec![Some(child)])
    }

    fn function_declaration(&mut self) -> ConcreteNode {
        self.enter(FUNCTION_DECLARATION);
        let mut children = Vec::new();
        self.expect(FUN, &mut children);
        children.push(Some(self.simple_identifier()));
        children.push(Some(self.function_value_parameters()));
        let body = (self.la() == LCURL).then(|| self.function_body());
        children.push(body);
        ConcreteNode::rule(FUNCTION_DECLARATION, children)
    }

    fn function_value_parameters(&mut self) -> ConcreteNode {
        self.enter(FUNCTION_VALUE_PARAMETERS);
        let mut children = Vec::new();
        self.expect(LPAREN, &mut children);
        if self.la() == IDENTIFIER {
            children.push(Some(self.function_value_parameter()));
            while self.la() == COMMA {
                children.push(Some(self.consume()));
                children.push(Some(self.function_value_parameter()));
            }
        }
        if self.la() == RPAREN {
            children.push(Some(self.consume()));
        } else {
            let message = format!("mismatched input '{}' expecting ')'", self.display());
            self.report(message);
        }
        ConcreteNode::rule(FUNCTION_VALUE_PARAMETERS, children)
    }

    fn function_value_parameter(&mut self) -> ConcreteNode {
        self.enter(FUNCTION_VALUE_PARAMETER);
        let mut children = vec![Some(self.simple_identifier())];
        self.expect(COLON, &mut children);
        self.enter(TYPE);
        let ty = ConcreteNode::rule(TYPE, vec![Some(self.simple_identifier())]);
        children.push(Some(ty));
        ConcreteNode::rule(FUNCTION_VALUE_PARAMETER, children)
    }

    fn function_body(&mut self) -> ConcreteNode {
        self.enter(FUNCTION_BODY);
        ConcreteNode::rule(FUNCTION_BODY, vec![Some(self.block())])
    }

    fn block(&mut self) -> ConcreteNode {
        self.enter(BLOCK);
        let mut children = Vec::new();
        self.expect(LCURL, &mut children);
        children.push(Some(self.statements()));
        self.expect(RCURL, &mut children);
        ConcreteNode::rule(BLOCK, children)
    }

    fn statements(&mut self) -> ConcreteNode {
        self.enter(STATEMENTS);
        let mut children = Vec::new();
        loop {
            match self.la() {
                NL | SEMICOLON => children.push(Some(self.semis())),
                FUN | VAL | IDENTIFIER | INTEGER_LITERAL => {
                    children.push(Some(self.statement()));
                }
                RCURL | EOF_TOKEN_TYPE => break,
                _ => {
                    let message = format!("extraneous input '{}' expecting '}}'", self.display());
                    self.report(message);
                    children.push(Some(self.consume()));
                }
            }
        }
        ConcreteNode::rule(STATEMENTS, children)
    }

    fn statement(&mut self) -> ConcreteNode {
        self.enter(STATEMENT);
        let child = if matches!(self.la(), FUN | VAL) {
            self.declaration()
        } else {
            self.expression()
        };
        ConcreteNode::rule(STATEMENT, vec![Some(child)])
    }

    fn property_declaration(&mut self) -> ConcreteNode {
        self.enter(PROPERTY_DECLARATION);
        let mut children = Vec::new();
        self.expect(VAL, &mut children);
        children.push(Some(self.simple_identifier()));
        if self.la() == ASSIGNMENT {
            children.push(Some(self.consume()));
            children.push(Some(self.expression()));
        }
        ConcreteNode::rule(PROPERTY_DECLARATION, children)
    }

    fn expression(&mut self) -> ConcreteNode {
        self.enter(EXPRESSION);
        self.enter(PRIMARY_EXPRESSION);
        let primary = if self.la() == INTEGER_LITERAL {
            self.enter(LITERAL_CONSTANT);
            ConcreteNode::rule(LITERAL_CONSTANT, vec![Some(self.consume())])
        } else {
            self.simple_identifier()
        };
        let primary = ConcreteNode::rule(PRIMARY_EXPRESSION, vec![Some(primary)]);
        ConcreteNode::rule(EXPRESSION, vec![Some(primary)])
    }

    fn simple_identifier(&mut self) -> ConcreteNode {
        self.enter(SIMPLE_IDENTIFIER);
        let mut children = Vec::new();
        self.expect(IDENTIFIER, &mut children);
        ConcreteNode::rule(SIMPLE_IDENTIFIER, children)
    }

    fn semis(&mut self) -> ConcreteNode {
        self.enter(SEMIS);
        let mut children = Vec::new();
        while matches!(self.la(), NL | SEMICOLON) {
            children.push(Some(self.consume()));
        }
        ConcreteNode::rule(SEMIS, children)
    }
}
