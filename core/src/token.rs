//! Token vocabulary shared by the tokenizer, the grammar, and the matcher.
//!
//! A [`Token`] is a `(kind, value)` pair. Identity is structural: two tokens
//! with the same kind and value are interchangeable as map keys, which is how
//! grammar keys and classified arguments meet during matching.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a classified argument or grammar key.
///
/// `GeneralElement` only ever appears in tokenized argument streams and
/// `Argument` only ever appears as a grammar key; the remaining kinds appear
/// on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short option, e.g. `-v`.
    PosixOption,
    /// Long option, e.g. `--verbose`.
    GnuOption,
    /// Literal word that is not a recognized option or command.
    GeneralElement,
    /// Declared command word, e.g. `push`.
    Command,
    /// Positional argument key, e.g. `<file>` or `FILE`.
    Argument,
}

/// Class of outcome a grammar key can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeClass {
    /// Presence flag (unbound options, commands).
    Boolean,
    /// Single value (bound options, arguments).
    String,
    /// Accumulated values (oom-bound options, oom-arguments).
    StringList,
}

const OPTION_ATTEMPTS: &[OutcomeClass] = &[
    OutcomeClass::Boolean,
    OutcomeClass::String,
    OutcomeClass::StringList,
];
const COMMAND_ATTEMPTS: &[OutcomeClass] = &[OutcomeClass::Boolean];
const ARGUMENT_ATTEMPTS: &[OutcomeClass] = &[OutcomeClass::String, OutcomeClass::StringList];

impl TokenKind {
    /// Outcome classes a terminal of this kind may attempt, in priority order.
    ///
    /// # Examples
    ///
    /// ```
    /// use usage_grammar_core::{OutcomeClass, TokenKind};
    ///
    /// assert_eq!(TokenKind::Command.outcome_attempts(), &[OutcomeClass::Boolean]);
    /// assert_eq!(TokenKind::PosixOption.outcome_attempts().len(), 3);
    /// assert!(TokenKind::GeneralElement.outcome_attempts().is_empty());
    /// ```
    pub fn outcome_attempts(self) -> &'static [OutcomeClass] {
        match self {
            TokenKind::PosixOption | TokenKind::GnuOption => OPTION_ATTEMPTS,
            TokenKind::Command => COMMAND_ATTEMPTS,
            TokenKind::Argument => ARGUMENT_ATTEMPTS,
            TokenKind::GeneralElement => &[],
        }
    }

    /// Returns `true` for the two option kinds.
    pub fn is_option(self) -> bool {
        matches!(self, TokenKind::PosixOption | TokenKind::GnuOption)
    }
}

/// A classified argument or grammar key.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{Token, TokenKind};
///
/// let short = Token::option("-v").unwrap();
/// assert_eq!(short.kind, TokenKind::PosixOption);
///
/// let long = Token::option("--verbose").unwrap();
/// assert_eq!(long.kind, TokenKind::GnuOption);
///
/// assert!(Token::option("verbose").is_none());
/// assert_eq!(Token::command("push"), Token::new(TokenKind::Command, "push"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Builds an option token, inferring the kind from the leading dashes.
    ///
    /// Returns `None` when `label` does not look like an option (`-x` or
    /// `--xy`).
    pub fn option(label: &str) -> Option<Self> {
        if let Some(rest) = label.strip_prefix("--") {
            (!rest.is_empty()).then(|| Self::gnu_option(label))
        } else if let Some(rest) = label.strip_prefix('-') {
            (!rest.is_empty()).then(|| Self::posix_option(label))
        } else {
            None
        }
    }

    pub fn posix_option(value: impl Into<String>) -> Self {
        Self::new(TokenKind::PosixOption, value)
    }

    pub fn gnu_option(value: impl Into<String>) -> Self {
        Self::new(TokenKind::GnuOption, value)
    }

    pub fn general(value: impl Into<String>) -> Self {
        Self::new(TokenKind::GeneralElement, value)
    }

    pub fn command(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Command, value)
    }

    pub fn argument(value: impl Into<String>) -> Self {
        Self::new(TokenKind::Argument, value)
    }

    pub fn is_general(&self) -> bool {
        self.kind == TokenKind::GeneralElement
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_structural_identity() {
        let mut set = HashSet::new();
        set.insert(Token::posix_option("-a"));
        assert!(set.contains(&Token::new(TokenKind::PosixOption, "-a")));
        assert!(!set.contains(&Token::general("-a")));
    }

    #[test]
    fn test_option_label_inference() {
        assert_eq!(Token::option("-a"), Some(Token::posix_option("-a")));
        assert_eq!(Token::option("--all"), Some(Token::gnu_option("--all")));
        assert_eq!(Token::option("-"), None);
        assert_eq!(Token::option("--"), None);
        assert_eq!(Token::option("all"), None);
    }

    #[test]
    fn test_outcome_attempt_order() {
        assert_eq!(
            TokenKind::GnuOption.outcome_attempts(),
            &[
                OutcomeClass::Boolean,
                OutcomeClass::String,
                OutcomeClass::StringList
            ]
        );
        assert_eq!(
            TokenKind::Argument.outcome_attempts(),
            &[OutcomeClass::String, OutcomeClass::StringList]
        );
    }
}
