//! Run configuration for matching command lines.
//!
//! Controls the comma-splitting post-pass and what a caller does when the
//! arguments do not match.
//!
//! # Example YAML
//!
//! ```yaml
//! split_comma_values: true
//! on_failure:
//!   print_doc: true
//!   exit: true
//!   exit_code: 1
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use usage_grammar_match::ParseOptions;

use crate::error::Result;

/// What to do when arguments do not match the grammar.
///
/// # Examples
///
/// ```
/// # use usage_grammar_loader::FailurePolicy;
/// let policy = FailurePolicy::default();
/// assert!(policy.print_doc);
/// assert!(policy.exit);
/// assert_eq!(policy.exit_code, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailurePolicy {
    /// Print the grammar's usage text.
    pub print_doc: bool,
    /// Terminate the process.
    pub exit: bool,
    /// Exit status used when `exit` is set.
    pub exit_code: i32,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            print_doc: true,
            exit: true,
            exit_code: 1,
        }
    }
}

/// Top-level run configuration.
///
/// Every field has a default, so an empty document is a valid configuration.
///
/// # Examples
///
/// ```no_run
/// use usage_grammar_loader::RunConfig;
///
/// let config = RunConfig::load("usage-match.yml").unwrap();
/// if !config.on_failure.exit {
///     println!("failures are reported without exiting");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Split the last value of every list outcome on commas.
    pub split_comma_values: bool,
    /// Failure handling.
    pub on_failure: FailurePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            split_comma_values: ParseOptions::default().split_comma_values,
            on_failure: FailurePolicy::default(),
        }
    }
}

impl RunConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoaderError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::LoaderError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::LoaderError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::LoaderError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Parser options carried by this configuration.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            split_comma_values: self.split_comma_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
split_comma_values: false
on_failure:
  print_doc: false
  exit: true
  exit_code: 64
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: RunConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(!config.split_comma_values);
        assert!(!config.on_failure.print_doc);
        assert!(config.on_failure.exit);
        assert_eq!(config.on_failure.exit_code, 64);
        assert!(!config.parse_options().split_comma_values);
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: RunConfig = serde_yaml::from_str("on_failure:\n  exit: false\n").unwrap();
        assert!(config.split_comma_values);
        assert!(config.on_failure.print_doc);
        assert!(!config.on_failure.exit);
        assert_eq!(config.on_failure.exit_code, 1);
    }

    #[test]
    fn test_empty_document_is_default() {
        let config: RunConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.parse_options(), ParseOptions::default());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage-match.yml");

        let original: RunConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = RunConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
