use std::fmt;

use thiserror::Error;
use usage_grammar_core::GrammarError;

/// The argument vector does not satisfy the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("arguments do not match the usage grammar: {reason}")]
pub struct NoMatch {
    pub reason: NoMatchReason,
}

impl NoMatch {
    pub(crate) fn new(reason: NoMatchReason) -> Self {
        Self { reason }
    }
}

/// Why a parse produced [`NoMatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatchReason {
    /// Nothing to match.
    EmptyArgv,
    /// The root node failed.
    GrammarUnsatisfied,
    /// The root node matched but left tokens over; `first` is the earliest.
    UnconsumedTokens { first: String },
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatchReason::EmptyArgv => write!(f, "no arguments given"),
            NoMatchReason::GrammarUnsatisfied => write!(f, "no alternative matched"),
            NoMatchReason::UnconsumedTokens { first } => {
                write!(f, "unexpected argument '{first}'")
            }
        }
    }
}

/// Grammar rejected by validation when building a parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid grammar: {}", join_errors(.errors))]
pub struct InvalidGrammar {
    pub errors: Vec<GrammarError>,
}

fn join_errors(errors: &[GrammarError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
