//! Token stream and mutable match state.
//!
//! [`TokenStream`] is immutable once built and indexes every token's
//! positions. [`MatchState`] records which positions are consumed and the
//! outcome values produced so far; it is the only thing matching mutates and
//! the unit the rollback manager snapshots.

use std::collections::HashMap;

use usage_grammar_core::{GrammarClasses, Token};

/// Tokenized arguments with a position index per distinct token.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
    positions: HashMap<Token, Vec<usize>>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut positions: HashMap<Token, Vec<usize>> = HashMap::new();
        for (index, token) in tokens.iter().enumerate() {
            positions.entry(token.clone()).or_default().push(index);
        }
        Self { tokens, positions }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Ascending positions of tokens equal to `key`.
    pub fn positions(&self, key: &Token) -> &[usize] {
        self.positions.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Consumption flags plus the three outcome maps.
///
/// Every key declared in the grammar classes has an entry from construction
/// on: `false` for boolean keys, the declared default (or `""`) for string
/// keys and an empty list for list keys.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{GrammarClasses, Token};
/// use usage_grammar_match::state::MatchState;
///
/// let classes = GrammarClasses::new().unbound_option("-v").argument("<file>");
/// let mut state = MatchState::new(2, &classes);
///
/// assert_eq!(state.boolean(&Token::posix_option("-v")), Some(false));
/// assert_eq!(state.first_unconsumed_from(0), Some(0));
///
/// state.set_consumed(0);
/// state.record_boolean(&Token::posix_option("-v"));
/// assert_eq!(state.first_unconsumed_from(0), Some(1));
/// assert!(!state.all_consumed());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    consumed: Vec<bool>,
    booleans: HashMap<Token, bool>,
    strings: HashMap<Token, String>,
    string_lists: HashMap<Token, Vec<String>>,
}

impl MatchState {
    /// Creates a state for `token_count` tokens seeded with defaults.
    pub fn new(token_count: usize, classes: &GrammarClasses) -> Self {
        let booleans = classes
            .unbound_options
            .iter()
            .chain(&classes.commands)
            .map(|key| (key.clone(), false))
            .collect();
        let strings = classes
            .bound_options
            .iter()
            .chain(&classes.arguments)
            .map(|key| (key.clone(), classes.default_for(key).to_string()))
            .collect();
        let string_lists = classes
            .oom_bound_options
            .iter()
            .chain(&classes.oom_arguments)
            .map(|key| (key.clone(), Vec::new()))
            .collect();

        Self {
            consumed: vec![false; token_count],
            booleans,
            strings,
            string_lists,
        }
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    pub fn set_consumed(&mut self, index: usize) {
        if let Some(flag) = self.consumed.get_mut(index) {
            *flag = true;
        }
    }

    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.get(index).copied().unwrap_or(false)
    }

    /// First unconsumed position at or after `start`.
    pub fn first_unconsumed_from(&self, start: usize) -> Option<usize> {
        (start..self.consumed.len()).find(|&index| !self.consumed[index])
    }

    pub fn all_consumed(&self) -> bool {
        self.consumed.iter().all(|&flag| flag)
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.iter().filter(|&&flag| flag).count()
    }

    pub fn record_boolean(&mut self, key: &Token) {
        self.booleans.insert(key.clone(), true);
    }

    pub fn record_string(&mut self, key: &Token, value: String) {
        self.strings.insert(key.clone(), value);
    }

    pub fn append_string_list(&mut self, key: &Token, value: String) {
        self.string_lists.entry(key.clone()).or_default().push(value);
    }

    pub fn boolean(&self, key: &Token) -> Option<bool> {
        self.booleans.get(key).copied()
    }

    pub fn string(&self, key: &Token) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn string_list(&self, key: &Token) -> Option<&[String]> {
        self.string_lists.get(key).map(Vec::as_slice)
    }

    pub(crate) fn into_outcome_maps(
        self,
    ) -> (
        HashMap<Token, bool>,
        HashMap<Token, String>,
        HashMap<Token, Vec<String>>,
    ) {
        (self.booleans, self.strings, self.string_lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> GrammarClasses {
        GrammarClasses::new()
            .unbound_option("-a")
            .command("run")
            .bound_option("-o")
            .argument("<file>")
            .oom_bound_option("-e")
            .oom_argument("ARGS")
            .default_value("<file>", "in.txt")
    }

    #[test]
    fn test_outcome_maps_are_seeded() {
        let state = MatchState::new(0, &classes());
        assert_eq!(state.boolean(&Token::posix_option("-a")), Some(false));
        assert_eq!(state.boolean(&Token::command("run")), Some(false));
        assert_eq!(state.string(&Token::posix_option("-o")), Some(""));
        assert_eq!(state.string(&Token::argument("<file>")), Some("in.txt"));
        assert_eq!(state.string_list(&Token::posix_option("-e")), Some(&[][..]));
        assert_eq!(state.string_list(&Token::argument("ARGS")), Some(&[][..]));
        assert!(state.is_empty());
        assert!(state.all_consumed());
    }

    #[test]
    fn test_consumption_tracking() {
        let mut state = MatchState::new(3, &classes());
        assert_eq!(state.len(), 3);
        state.set_consumed(1);
        assert!(state.is_consumed(1));
        assert_eq!(state.first_unconsumed_from(1), Some(2));
        assert_eq!(state.first_unconsumed_from(3), None);
        assert_eq!(state.first_unconsumed_from(10), None);
        assert_eq!(state.consumed_count(), 1);

        state.set_consumed(0);
        state.set_consumed(2);
        state.set_consumed(99);
        assert!(state.all_consumed());
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn test_list_values_accumulate() {
        let mut state = MatchState::new(0, &classes());
        let key = Token::posix_option("-e");
        state.append_string_list(&key, "a".to_string());
        state.append_string_list(&key, "b".to_string());
        assert_eq!(
            state.string_list(&key),
            Some(&["a".to_string(), "b".to_string()][..])
        );
    }

    #[test]
    fn test_stream_positions() {
        let stream = TokenStream::new(vec![
            Token::posix_option("-e"),
            Token::general("a"),
            Token::posix_option("-e"),
        ]);
        assert_eq!(stream.positions(&Token::posix_option("-e")), &[0, 2]);
        assert!(stream.positions(&Token::posix_option("-x")).is_empty());
        assert_eq!(stream.len(), 3);
    }
}
