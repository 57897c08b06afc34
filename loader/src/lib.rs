//! Grammar document loading and run configuration.
//!
//! The matcher consumes an in-memory [`Grammar`](usage_grammar_core::Grammar);
//! this crate reads compiled grammar documents from JSON or YAML files,
//! validates them, and loads the YAML run configuration used by callers that
//! decide what happens on a failed match.
//!
//! # Quick start
//!
//! ```no_run
//! use usage_grammar_loader::{RunConfig, load_parser};
//!
//! let config = RunConfig::load("usage-match.yml").unwrap();
//! let parser = load_parser("grammars/tool.yaml", config.parse_options()).unwrap();
//!
//! match parser.parse(&["-v", "build"]) {
//!     Ok(outcome) => println!("{} keys", outcome.len()),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

mod config;
mod error;
mod grammar;

pub use config::{FailurePolicy, RunConfig};
pub use error::{LoaderError, Result};
pub use grammar::{GrammarFormat, load_grammar, load_grammar_str, load_parser, save_grammar};
