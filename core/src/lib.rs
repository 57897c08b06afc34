//! Core types for usage grammars.
//!
//! This crate defines the vocabulary shared by the argument tokenizer and the
//! grammar matcher:
//!
//! - [`Token`] / [`TokenKind`]: a classified argument or grammar key.
//! - [`GrammarNode`]: the usage grammar AST (option, command and argument
//!   terminals combined with `and`, `xor`, `or`, `optional` and
//!   `one_or_more`).
//! - [`GrammarClasses`]: which keys are bound, unbound or repeated options,
//!   arguments or commands, plus aliases and default values.
//! - [`Grammar`]: a serializable compiled grammar bundling both.
//!
//! Validation ([`validate_grammar`]) catches contract violations such as an
//! option declared in two classes or an AST terminal nobody declared.
//!
//! # Example
//!
//! ```
//! use usage_grammar_core::*;
//!
//! let classes = GrammarClasses::new()
//!     .bound_option("--output")
//!     .alias("-o", "--output")
//!     .command("build");
//! let root = GrammarNode::doc(GrammarNode::and(vec![
//!     GrammarNode::command("build"),
//!     GrammarNode::optional(GrammarNode::gnu_option("--output")),
//! ]));
//! let grammar = Grammar::new("mycli", classes, root);
//!
//! assert!(validate_grammar(&grammar).is_empty());
//! assert_eq!(
//!     grammar.classes.outcome_class(&Token::gnu_option("--output")),
//!     Some(OutcomeClass::String)
//! );
//! ```

mod grammar;
mod info;
mod token;
mod validate;

pub use grammar::{Grammar, GrammarNode};
pub use info::GrammarClasses;
pub use token::{OutcomeClass, Token, TokenKind};
pub use validate::{GrammarError, validate_classes, validate_grammar};
