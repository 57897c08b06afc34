//! Grammar AST and the serializable grammar document.
//!
//! The tree is built once (usually deserialized from a compiled grammar file)
//! and never mutated while matching.

use serde::{Deserialize, Serialize};

use crate::info::GrammarClasses;
use crate::token::{Token, TokenKind};

/// Node of a usage grammar.
///
/// Terminals carry the label of the grammar key they match. Non-terminals
/// combine their children:
///
/// - `Doc`: root, forwards to its child.
/// - `And`: all children in order, atomically.
/// - `Xor`: first matching child.
/// - `Or`: every child, at least one must match.
/// - `Optional`: child once, never fails.
/// - `OneOrMore`: child repeatedly, at least once.
///
/// Serialized externally tagged in snake case, e.g.
/// `{"and": [{"posix_option": "-c"}, {"argument": "<file>"}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarNode {
    PosixOption(String),
    GnuOption(String),
    Command(String),
    Argument(String),
    Doc(Box<GrammarNode>),
    And(Vec<GrammarNode>),
    Xor(Vec<GrammarNode>),
    Or(Vec<GrammarNode>),
    Optional(Box<GrammarNode>),
    OneOrMore(Box<GrammarNode>),
}

impl GrammarNode {
    pub fn posix_option(label: &str) -> Self {
        Self::PosixOption(label.to_string())
    }

    pub fn gnu_option(label: &str) -> Self {
        Self::GnuOption(label.to_string())
    }

    pub fn command(label: &str) -> Self {
        Self::Command(label.to_string())
    }

    pub fn argument(label: &str) -> Self {
        Self::Argument(label.to_string())
    }

    pub fn doc(child: GrammarNode) -> Self {
        Self::Doc(Box::new(child))
    }

    pub fn and(children: Vec<GrammarNode>) -> Self {
        Self::And(children)
    }

    pub fn xor(children: Vec<GrammarNode>) -> Self {
        Self::Xor(children)
    }

    pub fn or(children: Vec<GrammarNode>) -> Self {
        Self::Or(children)
    }

    pub fn optional(child: GrammarNode) -> Self {
        Self::Optional(Box::new(child))
    }

    pub fn one_or_more(child: GrammarNode) -> Self {
        Self::OneOrMore(Box::new(child))
    }

    /// Grammar key matched by a terminal, `None` for combinators.
    ///
    /// # Examples
    ///
    /// ```
    /// use usage_grammar_core::{GrammarNode, Token};
    ///
    /// assert_eq!(GrammarNode::command("push").key(), Some(Token::command("push")));
    /// assert_eq!(GrammarNode::optional(GrammarNode::command("push")).key(), None);
    /// ```
    pub fn key(&self) -> Option<Token> {
        let (kind, label) = match self {
            Self::PosixOption(label) => (TokenKind::PosixOption, label),
            Self::GnuOption(label) => (TokenKind::GnuOption, label),
            Self::Command(label) => (TokenKind::Command, label),
            Self::Argument(label) => (TokenKind::Argument, label),
            _ => return None,
        };
        Some(Token::new(kind, label.as_str()))
    }

    /// Child nodes in order; empty for terminals.
    pub fn children(&self) -> &[GrammarNode] {
        match self {
            Self::Doc(child) | Self::Optional(child) | Self::OneOrMore(child) => {
                std::slice::from_ref(child.as_ref())
            }
            Self::And(children) | Self::Xor(children) | Self::Or(children) => children,
            _ => &[],
        }
    }

    /// Short lowercase name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::PosixOption(_) => "posix_option",
            Self::GnuOption(_) => "gnu_option",
            Self::Command(_) => "command",
            Self::Argument(_) => "argument",
            Self::Doc(_) => "doc",
            Self::And(_) => "and",
            Self::Xor(_) => "xor",
            Self::Or(_) => "or",
            Self::Optional(_) => "optional",
            Self::OneOrMore(_) => "one_or_more",
        }
    }

    /// Collects every terminal key in depth-first order.
    pub fn terminal_keys(&self) -> Vec<Token> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys(&self, keys: &mut Vec<Token>) {
        match self.key() {
            Some(key) => keys.push(key),
            None => {
                for child in self.children() {
                    child.collect_keys(keys);
                }
            }
        }
    }
}

/// A compiled usage grammar: classification sets plus the AST root.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{Grammar, GrammarClasses, GrammarNode, validate_grammar};
///
/// let grammar = Grammar::new(
///     "tool",
///     GrammarClasses::new().unbound_option("-v").command("run"),
///     GrammarNode::doc(GrammarNode::and(vec![
///         GrammarNode::command("run"),
///         GrammarNode::optional(GrammarNode::posix_option("-v")),
///     ])),
/// )
/// .with_doc_text("Usage: tool run [-v]");
///
/// assert!(validate_grammar(&grammar).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Utility name the grammar describes.
    pub name: String,
    /// Usage text shown to users when matching fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_text: Option<String>,
    /// Classification sets.
    #[serde(default)]
    pub classes: GrammarClasses,
    /// Root node, a [`GrammarNode::Doc`].
    pub root: GrammarNode,
}

impl Grammar {
    pub fn new(name: &str, classes: GrammarClasses, root: GrammarNode) -> Self {
        Self {
            name: name.to_string(),
            doc_text: None,
            classes,
            root,
        }
    }

    pub fn with_doc_text(mut self, text: &str) -> Self {
        self.doc_text = Some(text.to_string());
        self
    }
}
