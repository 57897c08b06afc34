//! Classification sets produced by the grammar front end.
//!
//! [`GrammarClasses`] tells the tokenizer which words are options or commands
//! and which options bind a value, and tells the matcher which outcome class
//! every grammar key produces. It is read-only during matching.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::token::{OutcomeClass, Token};

/// Builds the option token for a label, `--x` being long and anything else
/// short. Shape problems are reported by validation, not here.
pub(crate) fn option_key(label: &str) -> Token {
    if label.starts_with("--") {
        Token::gnu_option(label)
    } else {
        Token::posix_option(label)
    }
}

/// Option, argument and command classification for one grammar.
///
/// Every option belongs to exactly one of the three option sets and every
/// argument to exactly one of the two argument sets (see
/// [`validate_grammar`](crate::validate_grammar)).
///
/// Declaring an option also maps it to itself in
/// [`option_to_representative`](Self::option_to_representative); aliases add
/// further entries pointing at a declared option.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{GrammarClasses, OutcomeClass, Token};
///
/// let classes = GrammarClasses::new()
///     .unbound_option("--verbose")
///     .alias("-v", "--verbose")
///     .bound_option("-o")
///     .oom_bound_option("-I")
///     .command("build")
///     .argument("<target>")
///     .default_value("-o", "a.out");
///
/// let verbose = Token::gnu_option("--verbose");
/// assert_eq!(classes.representative(&Token::posix_option("-v")), Some(&verbose));
/// assert_eq!(classes.outcome_class(&verbose), Some(OutcomeClass::Boolean));
/// assert!(classes.is_value_binding(&Token::posix_option("-I")));
/// assert!(classes.is_command_word("build"));
/// assert_eq!(classes.default_for(&Token::posix_option("-o")), "a.out");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GrammarClassesRepr", into = "GrammarClassesRepr")]
pub struct GrammarClasses {
    /// Options taking exactly one value.
    pub bound_options: HashSet<Token>,
    /// Presence-only options.
    pub unbound_options: HashSet<Token>,
    /// Repeatable options taking one value per occurrence.
    pub oom_bound_options: HashSet<Token>,
    /// Single-valued positional arguments.
    pub arguments: HashSet<Token>,
    /// Repeatable positional arguments.
    pub oom_arguments: HashSet<Token>,
    /// Command words.
    pub commands: HashSet<Token>,
    /// Alias option -> canonical option.
    pub option_to_representative: HashMap<Token, Token>,
    /// Default string for bound options and arguments.
    pub default_values: HashMap<Token, String>,
}

impl GrammarClasses {
    pub fn new() -> Self {
        Self::default()
    }

    fn declare_option(mut self, label: &str, set: fn(&mut Self) -> &mut HashSet<Token>) -> Self {
        let token = option_key(label);
        self.option_to_representative
            .insert(token.clone(), token.clone());
        set(&mut self).insert(token);
        self
    }

    /// Declares an option taking exactly one value.
    pub fn bound_option(self, label: &str) -> Self {
        self.declare_option(label, |c| &mut c.bound_options)
    }

    /// Declares a presence-only option.
    pub fn unbound_option(self, label: &str) -> Self {
        self.declare_option(label, |c| &mut c.unbound_options)
    }

    /// Declares a repeatable option taking one value per occurrence.
    pub fn oom_bound_option(self, label: &str) -> Self {
        self.declare_option(label, |c| &mut c.oom_bound_options)
    }

    pub fn argument(mut self, label: &str) -> Self {
        self.arguments.insert(Token::argument(label));
        self
    }

    pub fn oom_argument(mut self, label: &str) -> Self {
        self.oom_arguments.insert(Token::argument(label));
        self
    }

    pub fn command(mut self, label: &str) -> Self {
        self.commands.insert(Token::command(label));
        self
    }

    /// Maps `alias` to the declared option `representative`.
    pub fn alias(mut self, alias: &str, representative: &str) -> Self {
        self.option_to_representative
            .insert(option_key(alias), option_key(representative));
        self
    }

    /// Sets the default for a bound option (`-x`/`--x`) or an argument.
    pub fn default_value(mut self, label: &str, value: &str) -> Self {
        self.default_values
            .insert(self.resolve_label(label), value.to_string());
        self
    }

    fn resolve_label(&self, label: &str) -> Token {
        if label.starts_with('-') {
            option_key(label)
        } else {
            Token::argument(label)
        }
    }

    /// Returns the outcome class `key` produces, or `None` for an undeclared key.
    pub fn outcome_class(&self, key: &Token) -> Option<OutcomeClass> {
        if self.unbound_options.contains(key) || self.commands.contains(key) {
            Some(OutcomeClass::Boolean)
        } else if self.bound_options.contains(key) || self.arguments.contains(key) {
            Some(OutcomeClass::String)
        } else if self.oom_bound_options.contains(key) || self.oom_arguments.contains(key) {
            Some(OutcomeClass::StringList)
        } else {
            None
        }
    }

    pub fn is_string_list_key(&self, key: &Token) -> bool {
        self.outcome_class(key) == Some(OutcomeClass::StringList)
    }

    /// Canonical option for an option token as written on the command line.
    pub fn representative(&self, option: &Token) -> Option<&Token> {
        self.option_to_representative.get(option)
    }

    /// Returns `true` if `option` consumes a following value (bound or
    /// oom-bound).
    pub fn is_value_binding(&self, option: &Token) -> bool {
        self.bound_options.contains(option) || self.oom_bound_options.contains(option)
    }

    pub fn is_oom_bound_option(&self, option: &Token) -> bool {
        self.oom_bound_options.contains(option)
    }

    pub fn is_command_word(&self, word: &str) -> bool {
        self.commands.contains(&Token::command(word))
    }

    pub fn is_declared_option(&self, option: &Token) -> bool {
        self.bound_options.contains(option)
            || self.unbound_options.contains(option)
            || self.oom_bound_options.contains(option)
    }

    /// Default string for a string-valued key, empty when none was declared.
    pub fn default_for(&self, key: &Token) -> &str {
        self.default_values.get(key).map_or("", String::as_str)
    }
}

/// On-disk shape of [`GrammarClasses`]: plain labels instead of tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct GrammarClassesRepr {
    bound_options: Vec<String>,
    unbound_options: Vec<String>,
    oom_bound_options: Vec<String>,
    arguments: Vec<String>,
    oom_arguments: Vec<String>,
    commands: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    aliases: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    default_values: BTreeMap<String, String>,
}

impl From<GrammarClassesRepr> for GrammarClasses {
    fn from(repr: GrammarClassesRepr) -> Self {
        let mut classes = GrammarClasses::new();
        for label in &repr.bound_options {
            classes = classes.bound_option(label);
        }
        for label in &repr.unbound_options {
            classes = classes.unbound_option(label);
        }
        for label in &repr.oom_bound_options {
            classes = classes.oom_bound_option(label);
        }
        for label in &repr.arguments {
            classes = classes.argument(label);
        }
        for label in &repr.oom_arguments {
            classes = classes.oom_argument(label);
        }
        for label in &repr.commands {
            classes = classes.command(label);
        }
        for (alias, representative) in &repr.aliases {
            classes = classes.alias(alias, representative);
        }
        for (label, value) in &repr.default_values {
            classes = classes.default_value(label, value);
        }
        classes
    }
}

fn sorted_labels(set: &HashSet<Token>) -> Vec<String> {
    let mut labels: Vec<String> = set.iter().map(|t| t.value.clone()).collect();
    labels.sort();
    labels
}

impl From<GrammarClasses> for GrammarClassesRepr {
    fn from(classes: GrammarClasses) -> Self {
        Self {
            bound_options: sorted_labels(&classes.bound_options),
            unbound_options: sorted_labels(&classes.unbound_options),
            oom_bound_options: sorted_labels(&classes.oom_bound_options),
            arguments: sorted_labels(&classes.arguments),
            oom_arguments: sorted_labels(&classes.oom_arguments),
            commands: sorted_labels(&classes.commands),
            aliases: classes
                .option_to_representative
                .iter()
                .filter(|(alias, rep)| alias != rep)
                .map(|(alias, rep)| (alias.value.clone(), rep.value.clone()))
                .collect(),
            default_values: classes
                .default_values
                .iter()
                .map(|(key, value)| (key.value.clone(), value.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GrammarClasses {
        GrammarClasses::new()
            .bound_option("-a")
            .bound_option("--long-1")
            .unbound_option("-c")
            .unbound_option("--long-4")
            .oom_bound_option("-e")
            .argument("<p3>")
            .oom_argument("FILES")
            .command("command")
            .alias("-f", "--long-4")
            .default_value("-a", "42")
    }

    #[test]
    fn test_declared_options_represent_themselves() {
        let classes = sample();
        let a = Token::posix_option("-a");
        assert_eq!(classes.representative(&a), Some(&a));
        assert_eq!(
            classes.representative(&Token::posix_option("-f")),
            Some(&Token::gnu_option("--long-4"))
        );
        assert_eq!(classes.representative(&Token::posix_option("-z")), None);
    }

    #[test]
    fn test_outcome_classes() {
        let classes = sample();
        assert_eq!(
            classes.outcome_class(&Token::command("command")),
            Some(OutcomeClass::Boolean)
        );
        assert_eq!(
            classes.outcome_class(&Token::argument("<p3>")),
            Some(OutcomeClass::String)
        );
        assert_eq!(
            classes.outcome_class(&Token::argument("FILES")),
            Some(OutcomeClass::StringList)
        );
        assert_eq!(classes.outcome_class(&Token::posix_option("-f")), None);
    }

    #[test]
    fn test_default_values() {
        let classes = sample();
        assert_eq!(classes.default_for(&Token::posix_option("-a")), "42");
        assert_eq!(classes.default_for(&Token::gnu_option("--long-1")), "");
    }

    #[test]
    fn test_repr_roundtrip_through_json() {
        let classes = sample();
        let json = serde_json::to_string(&classes).unwrap();
        let back: GrammarClasses = serde_json::from_str(&json).unwrap();
        assert_eq!(back, classes);
    }

    #[test]
    fn test_repr_defaults_missing_sections() {
        let classes: GrammarClasses =
            serde_json::from_str(r#"{"unbound_options": ["-v"], "aliases": {"--verbose": "-v"}}"#)
                .unwrap();
        assert!(classes.unbound_options.contains(&Token::posix_option("-v")));
        assert_eq!(
            classes.representative(&Token::gnu_option("--verbose")),
            Some(&Token::posix_option("-v"))
        );
        assert!(classes.commands.is_empty());
    }
}
