//! Public outcome map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::MatchState;

/// Value produced for one grammar key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutcomeValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

impl OutcomeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OutcomeValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OutcomeValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            OutcomeValue::List(values) => Some(values),
            _ => None,
        }
    }
}

/// Grammar key label to value, for every key the grammar declares.
///
/// Serializes as a plain map, e.g. `{"-a": true, "<file>": "x", "-e": ["1"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outcome {
    values: BTreeMap<String, OutcomeValue>,
}

impl Outcome {
    /// Builds the map from a finished match state, keyed by raw label.
    pub(crate) fn assemble(state: MatchState) -> Self {
        let (booleans, strings, string_lists) = state.into_outcome_maps();
        let mut values = BTreeMap::new();
        for (key, flag) in booleans {
            values.insert(key.value, OutcomeValue::Bool(flag));
        }
        for (key, value) in strings {
            values.insert(key.value, OutcomeValue::String(value));
        }
        for (key, list) in string_lists {
            values.insert(key.value, OutcomeValue::List(list));
        }
        Self { values }
    }

    /// Replaces the last element of every list with its comma-separated
    /// pieces, dropping empty pieces.
    pub(crate) fn split_comma_values(&mut self) {
        for value in self.values.values_mut() {
            let OutcomeValue::List(list) = value else {
                continue;
            };
            if let Some(last) = list.pop() {
                list.extend(
                    last.split(',')
                        .filter(|piece| !piece.is_empty())
                        .map(str::to_string),
                );
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&OutcomeValue> {
        self.values.get(label)
    }

    /// Boolean outcome of an unbound option or command.
    pub fn flag(&self, label: &str) -> Option<bool> {
        self.get(label).and_then(OutcomeValue::as_bool)
    }

    /// String outcome of a bound option or argument.
    pub fn value(&self, label: &str) -> Option<&str> {
        self.get(label).and_then(OutcomeValue::as_str)
    }

    /// List outcome of a repeatable option or argument.
    pub fn values(&self, label: &str) -> Option<&[String]> {
        self.get(label).and_then(OutcomeValue::as_list)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OutcomeValue)> {
        self.values.iter().map(|(label, value)| (label.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use usage_grammar_core::{GrammarClasses, Token};

    use super::*;

    fn classes() -> GrammarClasses {
        GrammarClasses::new()
            .unbound_option("-a")
            .bound_option("-o")
            .oom_bound_option("-e")
            .oom_argument("FILES")
            .default_value("-o", "out")
    }

    fn outcome_with(values: &[&str]) -> Outcome {
        let mut state = MatchState::new(0, &classes());
        for value in values {
            state.append_string_list(&Token::posix_option("-e"), value.to_string());
        }
        Outcome::assemble(state)
    }

    #[test]
    fn test_assemble_keys_by_label() {
        let outcome = outcome_with(&[]);
        assert_eq!(outcome.len(), 4);
        assert_eq!(outcome.flag("-a"), Some(false));
        assert_eq!(outcome.value("-o"), Some("out"));
        assert_eq!(outcome.values("FILES"), Some(&[][..]));
        assert_eq!(outcome.flag("-o"), None);
        assert!(outcome.get("-z").is_none());
    }

    #[test]
    fn test_comma_split_last_element_only() {
        let mut outcome = outcome_with(&["c,d", "a,b,,c,"]);
        outcome.split_comma_values();
        assert_eq!(
            outcome.values("-e"),
            Some(&["c,d".to_string(), "a".into(), "b".into(), "c".into()][..])
        );
    }

    #[test]
    fn test_comma_split_all_empty_pieces() {
        let mut outcome = outcome_with(&[",,"]);
        outcome.split_comma_values();
        assert_eq!(outcome.values("-e"), Some(&[][..]));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let outcome = outcome_with(&["x"]);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"-a": false, "-o": "out", "-e": ["x"], "FILES": []})
        );
        let back: Outcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }
}
