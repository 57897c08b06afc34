//! Grammar validation.
//!
//! Checks the contract between the front end and the matcher: classification
//! sets are disjoint, aliases point at declared options, defaults only exist
//! for string-valued keys, and every terminal in the AST is something the
//! matcher can resolve.
//!
//! # Examples
//!
//! ```
//! use usage_grammar_core::*;
//!
//! let grammar = Grammar::new(
//!     "tool",
//!     GrammarClasses::new().unbound_option("-v"),
//!     GrammarNode::doc(GrammarNode::posix_option("-v")),
//! );
//! assert!(validate_grammar(&grammar).is_empty());
//!
//! // Invalid: the AST references a command nobody declared
//! let bad = Grammar::new(
//!     "tool",
//!     GrammarClasses::new(),
//!     GrammarNode::doc(GrammarNode::command("run")),
//! );
//! assert_eq!(
//!     validate_grammar(&bad),
//!     vec![GrammarError::UndeclaredKey("run".to_string())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Grammar, GrammarClasses, GrammarNode, Token, TokenKind};

/// Grammar contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Option label is not `-x` or `--xy` shaped.
    #[error("invalid option label: {0}")]
    InvalidOptionLabel(String),
    /// Option appears in more than one of bound, unbound and oom-bound.
    #[error("option declared in more than one class: {0}")]
    OverlappingOption(String),
    /// Argument appears in both the single and the repeated argument set.
    #[error("argument declared as both single and repeated: {0}")]
    OverlappingArgument(String),
    /// Alias maps to an option that is not declared.
    #[error("alias {alias} points at undeclared option {representative}")]
    UnknownRepresentative {
        alias: String,
        representative: String,
    },
    /// Alias key is itself a declared option mapped somewhere else.
    #[error("alias {alias} is also a declared option (points at {representative})")]
    AliasShadowsOption {
        alias: String,
        representative: String,
    },
    /// Default value attached to a key that does not produce a string.
    #[error("default value for key without a string outcome: {0}")]
    DefaultForNonStringKey(String),
    /// AST terminal that is neither declared nor a known alias.
    #[error("grammar references undeclared key: {0}")]
    UndeclaredKey(String),
    /// `and`/`xor`/`or` node without children.
    #[error("{0} node has no children")]
    EmptyGroup(&'static str),
    /// Root node is not a `doc` node.
    #[error("grammar root must be a doc node, found {0}")]
    RootNotDoc(&'static str),
}

/// Validates a grammar document.
///
/// Returns an empty vector when the grammar can be matched safely. Like
/// schema validation, the first problem found in a section ends that check.
pub fn validate_grammar(grammar: &Grammar) -> Vec<GrammarError> {
    let mut errors = validate_classes(&grammar.classes);
    if !errors.is_empty() {
        return errors;
    }

    if !matches!(grammar.root, GrammarNode::Doc(_)) {
        errors.push(GrammarError::RootNotDoc(grammar.root.kind_name()));
        return errors;
    }

    errors.extend(validate_node(&grammar.root, &grammar.classes));
    errors
}

/// Validates classification sets on their own.
pub fn validate_classes(classes: &GrammarClasses) -> Vec<GrammarError> {
    let mut errors = Vec::new();

    let mut seen: HashSet<&Token> = HashSet::new();
    for option in classes
        .bound_options
        .iter()
        .chain(&classes.unbound_options)
        .chain(&classes.oom_bound_options)
    {
        if !is_well_formed_option(option) {
            errors.push(GrammarError::InvalidOptionLabel(option.value.clone()));
            return errors;
        }
        if !seen.insert(option) {
            errors.push(GrammarError::OverlappingOption(option.value.clone()));
            return errors;
        }
    }

    if let Some(argument) = classes.arguments.intersection(&classes.oom_arguments).next() {
        errors.push(GrammarError::OverlappingArgument(argument.value.clone()));
        return errors;
    }

    for (alias, representative) in &classes.option_to_representative {
        if !is_well_formed_option(alias) {
            errors.push(GrammarError::InvalidOptionLabel(alias.value.clone()));
            return errors;
        }
        if !classes.is_declared_option(representative) {
            errors.push(GrammarError::UnknownRepresentative {
                alias: alias.value.clone(),
                representative: representative.value.clone(),
            });
            return errors;
        }
        if alias != representative && classes.is_declared_option(alias) {
            errors.push(GrammarError::AliasShadowsOption {
                alias: alias.value.clone(),
                representative: representative.value.clone(),
            });
            return errors;
        }
    }

    for key in classes.default_values.keys() {
        if !classes.bound_options.contains(key) && !classes.arguments.contains(key) {
            errors.push(GrammarError::DefaultForNonStringKey(key.value.clone()));
            return errors;
        }
    }

    errors
}

fn validate_node(node: &GrammarNode, classes: &GrammarClasses) -> Vec<GrammarError> {
    let mut errors = Vec::new();

    if let Some(key) = node.key() {
        let resolvable = classes.outcome_class(&key).is_some()
            || (key.kind.is_option() && classes.representative(&key).is_some());
        if !resolvable {
            errors.push(GrammarError::UndeclaredKey(key.value));
        }
        return errors;
    }

    if matches!(
        node,
        GrammarNode::And(_) | GrammarNode::Xor(_) | GrammarNode::Or(_)
    ) && node.children().is_empty()
    {
        errors.push(GrammarError::EmptyGroup(node.kind_name()));
        return errors;
    }

    for child in node.children() {
        errors.extend(validate_node(child, classes));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn is_well_formed_option(option: &Token) -> bool {
    let value = option.value.as_str();
    match option.kind {
        TokenKind::PosixOption => {
            value.starts_with('-') && !value.starts_with("--") && value.len() >= 2
        }
        TokenKind::GnuOption => value.starts_with("--") && value.len() >= 3,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar(classes: GrammarClasses, child: GrammarNode) -> Grammar {
        Grammar::new("utility_name", classes, GrammarNode::doc(child))
    }

    #[test]
    fn test_accepts_alias_terminal() {
        let g = grammar(
            GrammarClasses::new()
                .unbound_option("--long-4")
                .alias("-f", "--long-4"),
            GrammarNode::xor(vec![
                GrammarNode::posix_option("-f"),
                GrammarNode::gnu_option("--long-4"),
            ]),
        );
        assert!(validate_grammar(&g).is_empty());
    }

    #[test]
    fn test_rejects_overlapping_option() {
        let mut classes = GrammarClasses::new().bound_option("-a");
        classes.unbound_options.insert(Token::posix_option("-a"));
        let g = grammar(classes, GrammarNode::posix_option("-a"));
        assert_eq!(
            validate_grammar(&g),
            vec![GrammarError::OverlappingOption("-a".to_string())]
        );
    }

    #[test]
    fn test_rejects_overlapping_argument() {
        let classes = GrammarClasses::new().argument("FILE").oom_argument("FILE");
        let g = grammar(classes, GrammarNode::argument("FILE"));
        assert_eq!(
            validate_grammar(&g),
            vec![GrammarError::OverlappingArgument("FILE".to_string())]
        );
    }

    #[test]
    fn test_rejects_dangling_alias() {
        let classes = GrammarClasses::new().alias("-f", "--force");
        let g = grammar(classes, GrammarNode::posix_option("-f"));
        assert_eq!(
            validate_grammar(&g),
            vec![GrammarError::UnknownRepresentative {
                alias: "-f".to_string(),
                representative: "--force".to_string(),
            }]
        );
    }

    #[test]
    fn test_rejects_alias_over_declared_option() {
        let classes: GrammarClasses = serde_json::from_str(
            r#"{"unbound_options": ["-a", "--all"], "aliases": {"-a": "--all"}}"#,
        )
        .unwrap();
        let g = grammar(classes, GrammarNode::posix_option("-a"));
        assert_eq!(
            validate_grammar(&g),
            vec![GrammarError::AliasShadowsOption {
                alias: "-a".to_string(),
                representative: "--all".to_string(),
            }]
        );
    }

    #[test]
    fn test_rejects_default_on_boolean_key() {
        let classes = GrammarClasses::new()
            .unbound_option("-v")
            .default_value("-v", "1");
        let g = grammar(classes, GrammarNode::posix_option("-v"));
        assert_eq!(
            validate_grammar(&g),
            vec![GrammarError::DefaultForNonStringKey("-v".to_string())]
        );
    }

    #[test]
    fn test_rejects_empty_group_and_bad_root() {
        let g = grammar(GrammarClasses::new(), GrammarNode::or(Vec::new()));
        assert_eq!(validate_grammar(&g), vec![GrammarError::EmptyGroup("or")]);

        let mut g = grammar(
            GrammarClasses::new().command("run"),
            GrammarNode::command("run"),
        );
        g.root = GrammarNode::command("run");
        assert_eq!(validate_grammar(&g), vec![GrammarError::RootNotDoc("command")]);
    }

    #[test]
    fn test_rejects_malformed_option_label() {
        let classes = GrammarClasses::new().unbound_option("-");
        let g = grammar(classes, GrammarNode::posix_option("-"));
        assert_eq!(
            validate_grammar(&g),
            vec![GrammarError::InvalidOptionLabel("-".to_string())]
        );
    }
}
