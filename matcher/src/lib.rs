//! Usage grammar matcher.
//!
//! Classifies a raw argument vector into tokens, walks a [`Grammar`] over the
//! token stream under transactional rollback, and assembles a flat
//! [`Outcome`] of flags, values and value lists.
//!
//! # Example
//!
//! ```
//! use usage_grammar_core::{Grammar, GrammarClasses, GrammarNode};
//! use usage_grammar_match::ArgvParser;
//!
//! let grammar = Grammar::new(
//!     "tool",
//!     GrammarClasses::new()
//!         .command("build")
//!         .unbound_option("-v")
//!         .oom_bound_option("-I"),
//!     GrammarNode::doc(GrammarNode::and(vec![
//!         GrammarNode::command("build"),
//!         GrammarNode::optional(GrammarNode::posix_option("-v")),
//!         GrammarNode::optional(GrammarNode::one_or_more(GrammarNode::posix_option("-I"))),
//!     ])),
//! );
//!
//! let parser = ArgvParser::new(grammar).unwrap();
//! let outcome = parser.parse(&["build", "-v", "-I", "inc,vendor"]).unwrap();
//!
//! assert_eq!(outcome.flag("build"), Some(true));
//! assert_eq!(outcome.flag("-v"), Some(true));
//! assert_eq!(outcome.values("-I"), Some(&["inc".to_string(), "vendor".to_string()][..]));
//!
//! assert!(parser.parse(&["build", "extra"]).is_err());
//! ```

pub mod matcher;
pub mod rollback;
pub mod state;
pub mod tokenizer;

mod error;
mod outcome;

pub use error::{InvalidGrammar, NoMatch, NoMatchReason};
pub use outcome::{Outcome, OutcomeValue};

use serde::{Deserialize, Serialize};
use tracing::debug;
use usage_grammar_core::{Grammar, Token, validate_grammar};

use crate::matcher::Matcher;
use crate::state::TokenStream;

/// Tunable parser behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Split the last value of every list outcome on commas.
    pub split_comma_values: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            split_comma_values: true,
        }
    }
}

/// Validated grammar ready to match argument vectors.
///
/// Holds no per-parse state; every call builds its own token stream, match
/// state and rollback stack, so one parser can be shared across threads.
#[derive(Debug, Clone)]
pub struct ArgvParser {
    grammar: Grammar,
    options: ParseOptions,
}

impl ArgvParser {
    /// Validates `grammar` and builds a parser with default options.
    pub fn new(grammar: Grammar) -> Result<Self, InvalidGrammar> {
        let errors = validate_grammar(&grammar);
        if !errors.is_empty() {
            return Err(InvalidGrammar { errors });
        }
        Ok(Self {
            grammar,
            options: ParseOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Tokenizes `args` against this parser's grammar classes.
    pub fn tokenize<S: AsRef<str>>(&self, args: &[S]) -> Vec<Token> {
        tokenizer::tokenize(args, &self.grammar.classes)
    }

    /// Matches `args` (program name excluded).
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<Outcome, NoMatch> {
        let stream = TokenStream::new(self.tokenize(args));
        let verdict = self.match_stream(&stream);

        match &verdict {
            Ok(outcome) => debug!(
                grammar = %self.grammar.name,
                keys = outcome.len(),
                "Arguments matched"
            ),
            Err(err) => debug!(
                grammar = %self.grammar.name,
                reason = ?err.reason,
                "Arguments did not match"
            ),
        }
        verdict
    }

    /// Matches a full argument vector whose first element is the program name.
    pub fn parse_with_program_name<S: AsRef<str>>(&self, argv: &[S]) -> Result<Outcome, NoMatch> {
        self.parse(argv.get(1..).unwrap_or_default())
    }

    fn match_stream(&self, stream: &TokenStream) -> Result<Outcome, NoMatch> {
        if stream.is_empty() {
            return Err(NoMatch::new(NoMatchReason::EmptyArgv));
        }

        let mut matcher = Matcher::new(&self.grammar.classes, stream);
        if !matcher.match_node(&self.grammar.root) {
            return Err(NoMatch::new(NoMatchReason::GrammarUnsatisfied));
        }

        let state = matcher.into_state();
        if let Some(index) = state.first_unconsumed_from(0) {
            let first = stream
                .get(index)
                .map(|token| token.value.clone())
                .unwrap_or_default();
            return Err(NoMatch::new(NoMatchReason::UnconsumedTokens { first }));
        }

        let mut outcome = Outcome::assemble(state);
        if self.options.split_comma_values {
            outcome.split_comma_values();
        }
        Ok(outcome)
    }
}
