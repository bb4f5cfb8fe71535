#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::return_self_not_must_use)]

//! # Grammar Tree
//!
//! Canonical parse trees for grammar-conformance testing.
//!
//! An external grammar engine (lexer plus parser, usually generated) is
//! wrapped so that:
//!
//! - its shared prediction-context memo never grows without bound
//!   ([`BoundedParserAdapter`], [`ParseSession`]);
//! - its concrete output becomes a [`ParseTree`] with stable rule and token
//!   names ([`ParseTreeBuilder`]);
//! - the tree renders to deterministic text suitable for golden files
//!   ([`TreeSerializer`]).
//!
//! ## Example
//!
//! ```rust,ignore
//! use grammar_tree::{ParseSession, TreeSerializer};
//!
//! let session = ParseSession::new(MyKotlinEngine::new);
//! let outcome = session.parse("fun main() {}")?;
//! let text = TreeSerializer::new().render(&outcome.tree, "File: main.kt - ...");
//! ```

pub mod adapter;
pub mod builder;
pub mod cache;
pub mod engine;
pub mod serialize;
pub mod session;
pub mod tree;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use adapter::{BoundedParserAdapter, DEFAULT_CACHE_CEILING};
pub use builder::{BuildError, BuildResult, DEFAULT_ROOT_RULE, ParseOutcome, ParseTreeBuilder};
pub use cache::{PredictionCache, SharedContextCache};
pub use engine::{ConcreteNode, EOF_TOKEN_TYPE, ErrorListener, GrammarEngine, SyntaxError, Token};
pub use serialize::TreeSerializer;
pub use session::{EngineFactory, ParseSession};
pub use tree::{NodeKind, ParseTree, escape_token_text};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        BoundedParserAdapter, GrammarEngine, ParseOutcome, ParseSession, ParseTree,
        ParseTreeBuilder, SyntaxError, TreeSerializer,
    };
}
