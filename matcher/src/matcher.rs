//! Grammar matcher.
//!
//! Walks a [`GrammarNode`] tree against a [`TokenStream`], mutating the
//! [`MatchState`] owned by its [`RollbackManager`]. Nodes hold no state of
//! their own; `and` groups are the only transactional construct.

use usage_grammar_core::{GrammarClasses, GrammarNode, OutcomeClass, Token, TokenKind};

use crate::rollback::{RollbackManager, Transaction};
use crate::state::{MatchState, TokenStream};

/// One matching run over one token stream.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{GrammarClasses, GrammarNode, Token};
/// use usage_grammar_match::matcher::Matcher;
/// use usage_grammar_match::state::TokenStream;
///
/// let classes = GrammarClasses::new().unbound_option("-a").unbound_option("-b");
/// let stream = TokenStream::new(vec![Token::posix_option("-a"), Token::posix_option("-b")]);
///
/// // xor stops at the first alternative that matches
/// let mut matcher = Matcher::new(&classes, &stream);
/// let xor = GrammarNode::xor(vec![GrammarNode::posix_option("-a"), GrammarNode::posix_option("-b")]);
/// assert!(matcher.match_node(&xor));
/// assert!(!matcher.state().all_consumed());
///
/// // or tries every alternative
/// let mut matcher = Matcher::new(&classes, &stream);
/// let or = GrammarNode::or(vec![GrammarNode::posix_option("-a"), GrammarNode::posix_option("-b")]);
/// assert!(matcher.match_node(&or));
/// assert!(matcher.state().all_consumed());
/// ```
#[derive(Debug)]
pub struct Matcher<'a> {
    classes: &'a GrammarClasses,
    stream: &'a TokenStream,
    rollback: RollbackManager,
}

impl AsMut<RollbackManager> for Matcher<'_> {
    fn as_mut(&mut self) -> &mut RollbackManager {
        &mut self.rollback
    }
}

impl<'a> Matcher<'a> {
    /// Creates a matcher with a freshly seeded state for `stream`.
    pub fn new(classes: &'a GrammarClasses, stream: &'a TokenStream) -> Self {
        let state = MatchState::new(stream.len(), classes);
        Self {
            classes,
            stream,
            rollback: RollbackManager::new(state),
        }
    }

    pub fn state(&self) -> &MatchState {
        self.rollback.state()
    }

    pub fn into_state(self) -> MatchState {
        self.rollback.into_state()
    }

    /// Matches `node`, returning whether it was satisfied.
    pub fn match_node(&mut self, node: &GrammarNode) -> bool {
        match node {
            GrammarNode::PosixOption(_)
            | GrammarNode::GnuOption(_)
            | GrammarNode::Command(_)
            | GrammarNode::Argument(_) => match node.key() {
                Some(key) => {
                    let key = self.canonical(key);
                    self.match_terminal(&key)
                }
                None => false,
            },
            GrammarNode::Doc(child) => self.match_node(child),
            GrammarNode::And(children) => {
                let mut tx = Transaction::begin(self);
                for child in children {
                    if !tx.match_node(child) {
                        tx.rollback();
                        return false;
                    }
                }
                tx.commit();
                true
            }
            GrammarNode::Xor(children) => children.iter().any(|child| self.match_node(child)),
            GrammarNode::Or(children) => {
                let mut matched = false;
                for child in children {
                    matched |= self.match_node(child);
                }
                matched
            }
            GrammarNode::Optional(child) => {
                self.match_node(child);
                true
            }
            GrammarNode::OneOrMore(child) => {
                let mut iterations = 0usize;
                loop {
                    let consumed_before = self.state().consumed_count();
                    if !self.match_node(child) {
                        break;
                    }
                    iterations += 1;
                    // An iteration that consumed nothing would repeat forever.
                    if self.state().consumed_count() == consumed_before {
                        break;
                    }
                }
                iterations > 0
            }
        }
    }

    /// Option terminals may name an alias; the tokenizer has already
    /// rewritten the command line to representatives.
    fn canonical(&self, key: Token) -> Token {
        if !key.kind.is_option() {
            return key;
        }
        match self.classes.representative(&key) {
            Some(representative) => representative.clone(),
            None => key,
        }
    }

    /// Tries the outcome classes allowed for the key's kind in priority
    /// order; the first success wins.
    fn match_terminal(&mut self, key: &Token) -> bool {
        key.kind
            .outcome_attempts()
            .iter()
            .any(|&class| match class {
                OutcomeClass::Boolean => self.try_boolean(key),
                OutcomeClass::String | OutcomeClass::StringList => self.try_value(key, class),
            })
    }

    fn try_boolean(&mut self, key: &Token) -> bool {
        if self.classes.outcome_class(key) != Some(OutcomeClass::Boolean) {
            return false;
        }
        let Some(anchor) = self.eligible_anchor(key) else {
            return false;
        };

        let state = self.rollback.state_mut();
        state.set_consumed(anchor);
        state.record_boolean(key);
        true
    }

    fn try_value(&mut self, key: &Token, class: OutcomeClass) -> bool {
        if self.classes.outcome_class(key) != Some(class) {
            return false;
        }
        let Some((anchor, value_index)) = self.locate_value(key) else {
            return false;
        };
        let Some(value) = self.stream.get(value_index).map(|token| token.value.clone()) else {
            return false;
        };

        let state = self.rollback.state_mut();
        if let Some(anchor) = anchor {
            state.set_consumed(anchor);
        }
        state.set_consumed(value_index);
        if class == OutcomeClass::StringList {
            state.append_string_list(key, value);
        } else {
            state.record_string(key, value);
        }
        true
    }

    /// First unconsumed occurrence of `key`. For list keys whose occurrences
    /// are all consumed, the last occurrence is reused so one physical flag
    /// can anchor several values.
    fn eligible_anchor(&self, key: &Token) -> Option<usize> {
        let positions = self.stream.positions(key);
        let state = self.state();
        positions
            .iter()
            .copied()
            .find(|&index| !state.is_consumed(index))
            .or_else(|| {
                if self.classes.is_string_list_key(key) {
                    positions.last().copied()
                } else {
                    None
                }
            })
    }

    /// Locates `(anchor, value)` positions for a value-taking key.
    ///
    /// Options take the first unconsumed token after their anchor, which must
    /// be a general element. Arguments have no anchor and take the first
    /// unconsumed token of the stream, which may also be a command word.
    fn locate_value(&self, key: &Token) -> Option<(Option<usize>, usize)> {
        let state = self.state();
        if key.kind == TokenKind::Argument {
            let index = state.first_unconsumed_from(0)?;
            let token = self.stream.get(index)?;
            matches!(token.kind, TokenKind::GeneralElement | TokenKind::Command)
                .then_some((None, index))
        } else {
            let anchor = self.eligible_anchor(key)?;
            let index = state.first_unconsumed_from(anchor + 1)?;
            self.stream
                .get(index)?
                .is_general()
                .then_some((Some(anchor), index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> GrammarClasses {
        GrammarClasses::new()
            .unbound_option("-a")
            .unbound_option("-b")
            .bound_option("-o")
            .oom_bound_option("-e")
            .argument("<file>")
            .oom_argument("ARGS")
            .command("run")
    }

    fn stream(tokens: Vec<Token>) -> TokenStream {
        TokenStream::new(tokens)
    }

    #[test]
    fn test_boolean_terminal() {
        let classes = classes();
        let stream = stream(vec![Token::posix_option("-a")]);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(matcher.match_node(&GrammarNode::posix_option("-a")));
        assert_eq!(matcher.state().boolean(&Token::posix_option("-a")), Some(true));
        assert!(matcher.state().all_consumed());
        // The only occurrence is consumed now.
        assert!(!matcher.match_node(&GrammarNode::posix_option("-a")));
    }

    #[test]
    fn test_option_value_must_directly_follow_unconsumed() {
        let classes = classes();
        let tokens = vec![
            Token::posix_option("-o"),
            Token::posix_option("-a"),
            Token::general("out"),
        ];
        let stream = stream(tokens);
        let mut matcher = Matcher::new(&classes, &stream);

        // `-a` sits between the anchor and the value.
        assert!(!matcher.match_node(&GrammarNode::posix_option("-o")));
        assert!(matcher.match_node(&GrammarNode::posix_option("-a")));
        assert!(matcher.match_node(&GrammarNode::posix_option("-o")));
        assert_eq!(matcher.state().string(&Token::posix_option("-o")), Some("out"));
        assert!(matcher.state().all_consumed());
    }

    #[test]
    fn test_argument_takes_command_word() {
        let classes = classes();
        let stream = stream(vec![Token::command("run")]);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(matcher.match_node(&GrammarNode::argument("<file>")));
        assert_eq!(matcher.state().string(&Token::argument("<file>")), Some("run"));
    }

    #[test]
    fn test_argument_refuses_option_token() {
        let classes = classes();
        let stream = stream(vec![Token::posix_option("-a"), Token::general("x")]);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(!matcher.match_node(&GrammarNode::argument("<file>")));
        assert_eq!(matcher.state().consumed_count(), 0);
    }

    #[test]
    fn test_variadic_option_reuses_last_anchor() {
        let classes = classes();
        let tokens = vec![
            Token::posix_option("-e"),
            Token::general("a"),
            Token::general("b"),
            Token::general("c"),
        ];
        let stream = stream(tokens);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(matcher.match_node(&GrammarNode::one_or_more(GrammarNode::posix_option("-e"))));
        assert_eq!(
            matcher.state().string_list(&Token::posix_option("-e")),
            Some(&["a".to_string(), "b".to_string(), "c".to_string()][..])
        );
        assert!(matcher.state().all_consumed());
    }

    #[test]
    fn test_and_rolls_back_partial_success() {
        let classes = classes();
        let stream = stream(vec![Token::posix_option("-a")]);
        let mut matcher = Matcher::new(&classes, &stream);

        let group = GrammarNode::and(vec![
            GrammarNode::posix_option("-a"),
            GrammarNode::posix_option("-b"),
        ]);
        assert!(!matcher.match_node(&group));
        assert_eq!(matcher.state().boolean(&Token::posix_option("-a")), Some(false));
        assert!(!matcher.state().is_consumed(0));
    }

    #[test]
    fn test_nested_and_rolls_back_inner_commit() {
        let classes = classes();
        let stream = stream(vec![Token::posix_option("-a"), Token::general("x")]);
        let mut matcher = Matcher::new(&classes, &stream);

        let group = GrammarNode::and(vec![
            GrammarNode::and(vec![GrammarNode::posix_option("-a")]),
            GrammarNode::posix_option("-b"),
        ]);
        assert!(!matcher.match_node(&group));
        assert_eq!(matcher.state().consumed_count(), 0);
        assert_eq!(matcher.into_state().boolean(&Token::posix_option("-a")), Some(false));
    }

    #[test]
    fn test_optional_never_fails() {
        let classes = classes();
        let stream = stream(vec![Token::general("x")]);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(matcher.match_node(&GrammarNode::optional(GrammarNode::posix_option("-a"))));
        assert_eq!(matcher.state().consumed_count(), 0);
    }

    #[test]
    fn test_one_or_more_requires_one_iteration() {
        let classes = classes();
        let stream = stream(vec![Token::general("x")]);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(!matcher.match_node(&GrammarNode::one_or_more(GrammarNode::posix_option("-a"))));
    }

    #[test]
    fn test_one_or_more_over_optional_terminates() {
        let classes = classes();
        let stream = stream(vec![Token::posix_option("-a")]);
        let mut matcher = Matcher::new(&classes, &stream);

        let node = GrammarNode::one_or_more(GrammarNode::optional(GrammarNode::posix_option("-a")));
        assert!(matcher.match_node(&node));
        assert!(matcher.state().all_consumed());
    }

    #[test]
    fn test_undeclared_terminal_fails() {
        let classes = classes();
        let stream = stream(vec![Token::posix_option("-z")]);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(!matcher.match_node(&GrammarNode::posix_option("-z")));
        assert!(!matcher.match_node(&GrammarNode::command("deploy")));
    }

    #[test]
    fn test_oom_argument_collects_words() {
        let classes = classes();
        let stream = stream(vec![
            Token::command("run"),
            Token::general("a"),
            Token::general("b"),
        ]);
        let mut matcher = Matcher::new(&classes, &stream);

        assert!(matcher.match_node(&GrammarNode::one_or_more(GrammarNode::argument("ARGS"))));
        assert_eq!(
            matcher.state().string_list(&Token::argument("ARGS")),
            Some(&["run".to_string(), "a".to_string(), "b".to_string()][..])
        );
    }
}
