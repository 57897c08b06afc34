//! Compiled grammar documents on disk.
//!
//! A grammar document is the serialized form of [`Grammar`]: the utility
//! name, optional usage text, the classification sets and the AST root.
//! JSON and YAML are both accepted and picked by file extension.
//!
//! # Example YAML
//!
//! ```yaml
//! name: utility_name
//! doc_text: |
//!   Usage: utility_name -c <p3>
//! classes:
//!   unbound_options: ["-c"]
//!   arguments: ["<p3>"]
//! root:
//!   doc:
//!     and:
//!       - posix_option: "-c"
//!       - argument: "<p3>"
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::debug;
use usage_grammar_core::{Grammar, validate_grammar};
use usage_grammar_match::{ArgvParser, InvalidGrammar, ParseOptions};

use crate::error::{LoaderError, Result};

/// Serialization format of a grammar document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarFormat {
    Json,
    Yaml,
}

impl GrammarFormat {
    /// Picks the format from a path's extension (`json`, `yaml`, `yml`).
    ///
    /// # Examples
    ///
    /// ```
    /// use usage_grammar_loader::GrammarFormat;
    ///
    /// assert_eq!(GrammarFormat::from_path("tool.json"), Some(GrammarFormat::Json));
    /// assert_eq!(GrammarFormat::from_path("tool.YML"), Some(GrammarFormat::Yaml));
    /// assert_eq!(GrammarFormat::from_path("tool.toml"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Loads and validates a grammar document.
///
/// # Errors
///
/// Returns [`LoaderError::UnsupportedFormat`] for an unknown extension,
/// [`LoaderError::IoError`] if the file cannot be read,
/// [`LoaderError::JsonError`]/[`LoaderError::YamlError`] if parsing fails,
/// or [`LoaderError::InvalidGrammar`] if validation reports problems.
pub fn load_grammar(path: impl AsRef<Path>) -> Result<Grammar> {
    let path = path.as_ref();
    let format =
        GrammarFormat::from_path(path).ok_or_else(|| LoaderError::UnsupportedFormat(path.into()))?;

    let reader = BufReader::new(File::open(path)?);
    let grammar: Grammar = match format {
        GrammarFormat::Json => serde_json::from_reader(reader)?,
        GrammarFormat::Yaml => from_yaml(serde_yaml::Deserializer::from_reader(reader))?,
    };
    debug!(path = %path.display(), grammar = %grammar.name, "Loaded grammar document");
    checked(grammar)
}

/// Parses and validates an in-memory grammar document.
///
/// # Examples
///
/// ```
/// use usage_grammar_loader::{GrammarFormat, load_grammar_str};
///
/// let yaml = r#"
/// name: tool
/// classes:
///   commands: [run]
/// root:
///   doc:
///     command: run
/// "#;
/// let grammar = load_grammar_str(yaml, GrammarFormat::Yaml).unwrap();
/// assert_eq!(grammar.name, "tool");
///
/// let undeclared = r#"{"name": "tool", "root": {"doc": {"command": "run"}}}"#;
/// assert!(load_grammar_str(undeclared, GrammarFormat::Json).is_err());
/// ```
pub fn load_grammar_str(text: &str, format: GrammarFormat) -> Result<Grammar> {
    let grammar: Grammar = match format {
        GrammarFormat::Json => serde_json::from_str(text)?,
        GrammarFormat::Yaml => from_yaml(serde_yaml::Deserializer::from_str(text))?,
    };
    checked(grammar)
}

/// Loads a grammar document and builds a parser for it.
pub fn load_parser(path: impl AsRef<Path>, options: ParseOptions) -> Result<ArgvParser> {
    let grammar = load_grammar(path)?;
    Ok(ArgvParser::new(grammar)?.with_options(options))
}

/// Writes `grammar` as a document in the format implied by `path`.
///
/// # Errors
///
/// Returns [`LoaderError::UnsupportedFormat`] for an unknown extension,
/// [`LoaderError::IoError`] if the file cannot be written, or a
/// serialization error.
pub fn save_grammar(grammar: &Grammar, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format =
        GrammarFormat::from_path(path).ok_or_else(|| LoaderError::UnsupportedFormat(path.into()))?;

    let writer = BufWriter::new(File::create(path)?);
    match format {
        GrammarFormat::Json => serde_json::to_writer_pretty(writer, grammar)?,
        GrammarFormat::Yaml => {
            let mut serializer = serde_yaml::Serializer::new(writer);
            serde_yaml::with::singleton_map_recursive::serialize(grammar, &mut serializer)?;
        }
    }
    Ok(())
}

/// Grammar nodes are single-key maps (`doc: {xor: [...]}`) in YAML as in
/// JSON, never `!tag` values.
fn from_yaml(deserializer: serde_yaml::Deserializer<'_>) -> Result<Grammar> {
    Ok(serde_yaml::with::singleton_map_recursive::deserialize(
        deserializer,
    )?)
}

fn checked(grammar: Grammar) -> Result<Grammar> {
    let errors = validate_grammar(&grammar);
    if errors.is_empty() {
        Ok(grammar)
    } else {
        Err(InvalidGrammar { errors }.into())
    }
}
