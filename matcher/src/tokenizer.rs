//! Argument vector tokenizer.
//!
//! Classifies every raw argument into a [`Token`] using the grammar's option
//! aliases, bound options and command names. Tokenization never fails: a word
//! that fits no known shape becomes a literal general element and rejection is
//! left to the matcher.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use usage_grammar_core::{GrammarClasses, Token, TokenKind};

static POSIX_OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-[a-zA-Z0-9]$").expect("static regex must compile"));
static GNU_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--[a-zA-Z0-9][a-zA-Z0-9-]+$").expect("static regex must compile")
});

/// Lexical shape of a raw argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// `-x`, a single alphanumeric after one dash.
    PosixOption,
    /// `--name`, alphanumerics and dashes after two dashes.
    GnuOption,
    /// `-abc`, bundled short options possibly ending in a glued value.
    ShortCluster,
    /// `--name=value` or any other `--` word that is not a plain long option.
    LongWithSeparator,
    /// `--` on its own.
    Terminator,
    /// Anything else.
    Word,
}

/// Detects the lexical shape of `arg`.
///
/// # Examples
///
/// ```
/// use usage_grammar_match::tokenizer::{ArgShape, detect_shape};
///
/// assert_eq!(detect_shape("-a"), ArgShape::PosixOption);
/// assert_eq!(detect_shape("--long-1"), ArgShape::GnuOption);
/// assert_eq!(detect_shape("-abc"), ArgShape::ShortCluster);
/// assert_eq!(detect_shape("--long-1=VAL"), ArgShape::LongWithSeparator);
/// assert_eq!(detect_shape("--"), ArgShape::Terminator);
/// assert_eq!(detect_shape("-"), ArgShape::Word);
/// assert_eq!(detect_shape("file.txt"), ArgShape::Word);
/// ```
pub fn detect_shape(arg: &str) -> ArgShape {
    if POSIX_OPTION_RE.is_match(arg) {
        return ArgShape::PosixOption;
    }
    if GNU_OPTION_RE.is_match(arg) {
        return ArgShape::GnuOption;
    }
    if arg.chars().count() <= 2 {
        return if arg == "--" {
            ArgShape::Terminator
        } else {
            ArgShape::Word
        };
    }
    if arg.starts_with("--") {
        ArgShape::LongWithSeparator
    } else if arg.starts_with('-') {
        ArgShape::ShortCluster
    } else {
        ArgShape::Word
    }
}

/// Converts raw arguments (program name excluded) into tokens.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{GrammarClasses, Token};
/// use usage_grammar_match::tokenizer::tokenize;
///
/// let classes = GrammarClasses::new()
///     .unbound_option("-v")
///     .bound_option("-o")
///     .command("build");
///
/// let tokens = tokenize(&["build", "-voout.bin", "--", "-v"], &classes);
/// assert_eq!(
///     tokens,
///     vec![
///         Token::command("build"),
///         Token::posix_option("-v"),
///         Token::posix_option("-o"),
///         Token::general("out.bin"),
///         Token::general("-v"),
///     ]
/// );
/// ```
pub fn tokenize<S: AsRef<str>>(args: &[S], classes: &GrammarClasses) -> Vec<Token> {
    ArgvTokenizer::new(classes).tokenize(args)
}

/// Stateful tokenizer over one argument vector.
#[derive(Debug)]
pub struct ArgvTokenizer<'g> {
    classes: &'g GrammarClasses,
    tokens: Vec<Token>,
}

impl<'g> ArgvTokenizer<'g> {
    pub fn new(classes: &'g GrammarClasses) -> Self {
        Self {
            classes,
            tokens: Vec::new(),
        }
    }

    /// Tokenizes `args` and applies the variadic-run retyping pass.
    pub fn tokenize<S: AsRef<str>>(mut self, args: &[S]) -> Vec<Token> {
        // Set when the previous argument was a value-binding option whose
        // value was not glued to it.
        let mut bind_next = false;

        for (index, arg) in args.iter().enumerate() {
            let arg = arg.as_ref();
            if bind_next {
                self.push_general(arg);
                bind_next = false;
                continue;
            }

            bind_next = match detect_shape(arg) {
                ArgShape::PosixOption => self.push_option(Token::posix_option(arg)),
                ArgShape::GnuOption => self.push_option(Token::gnu_option(arg)),
                ArgShape::ShortCluster => self.push_short_cluster(arg),
                ArgShape::LongWithSeparator => {
                    self.push_long_with_separator(arg);
                    false
                }
                ArgShape::Terminator => {
                    for rest in &args[index + 1..] {
                        self.push_general(rest.as_ref());
                    }
                    break;
                }
                ArgShape::Word => {
                    self.push_word(arg);
                    false
                }
            };
        }

        self.retype_variadic_runs();
        debug!(
            args = args.len(),
            tokens = self.tokens.len(),
            "Tokenized argument vector"
        );
        self.tokens
    }

    fn push_general(&mut self, value: &str) {
        self.tokens.push(Token::general(value));
    }

    /// Pushes the representative of an exactly-shaped option. Returns `true`
    /// when the next argument must be taken as its value.
    fn push_option(&mut self, written: Token) -> bool {
        let classes = self.classes;
        match classes.representative(&written) {
            Some(option) => {
                self.tokens.push(option.clone());
                classes.is_value_binding(option)
            }
            None => {
                self.tokens.push(Token::general(written.value));
                false
            }
        }
    }

    /// Splits `-abc` into its options. Either every character resolves or the
    /// whole word is kept as one general element.
    fn push_short_cluster(&mut self, arg: &str) -> bool {
        let classes = self.classes;
        let body = &arg[1..];
        let mut pending = Vec::new();
        let mut bind_next = false;

        for (offset, ch) in body.char_indices() {
            let Some(option) = classes.representative(&Token::posix_option(format!("-{ch}")))
            else {
                self.push_general(arg);
                return false;
            };
            pending.push(option.clone());
            if classes.is_value_binding(option) {
                let glued = &body[offset + ch.len_utf8()..];
                if glued.is_empty() {
                    bind_next = true;
                } else {
                    pending.push(Token::general(glued));
                }
                break;
            }
        }

        self.tokens.extend(pending);
        bind_next
    }

    /// Splits `--name=value` at the first `=` whose left side is a
    /// value-binding long option.
    fn push_long_with_separator(&mut self, arg: &str) {
        let classes = self.classes;
        for (index, _) in arg.match_indices('=') {
            let value = &arg[index + 1..];
            if value.is_empty() {
                break;
            }
            let option = classes
                .representative(&Token::gnu_option(&arg[..index]))
                .filter(|option| classes.is_value_binding(option));
            if let Some(option) = option {
                self.tokens.push(option.clone());
                self.push_general(value);
                return;
            }
        }
        self.push_general(arg);
    }

    fn push_word(&mut self, arg: &str) {
        if self.classes.is_command_word(arg) {
            self.tokens.push(Token::command(arg));
        } else {
            self.push_general(arg);
        }
    }

    /// Demotes everything between two variadic option occurrences to general
    /// elements so a value word is never read as a flag or command.
    fn retype_variadic_runs(&mut self) {
        let classes = self.classes;
        let mut in_run = false;
        for token in &mut self.tokens {
            if classes.is_oom_bound_option(token) {
                in_run = !in_run;
            } else if in_run && !token.is_general() {
                trace!(token = %token, "Retyping token inside variadic value run");
                token.kind = TokenKind::GeneralElement;
            }
        }
    }
}
