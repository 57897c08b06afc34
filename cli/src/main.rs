use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;
use usage_grammar_loader::{RunConfig, load_grammar, load_parser};
use usage_grammar_match::{ArgvParser, Outcome};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "usage-match")]
#[command(about = "Match command lines against compiled usage grammars")]
struct Cli {
    /// Log matching decisions (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match one argument vector and print the outcome map.
    Run(RunArgs),
    /// Validate one or more grammar files.
    Validate(ValidateArgs),
    /// Match many argument vectors in parallel, one JSON array per input line.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Grammar document (.json, .yaml or .yml).
    #[arg(long)]
    grammar: PathBuf,
    /// Run configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Keep comma-joined list values as written.
    #[arg(long)]
    no_comma_split: bool,
    /// Do not print the usage text when matching fails.
    #[arg(long)]
    quiet: bool,
    /// Exit successfully and print `null` when matching fails.
    #[arg(long)]
    no_exit: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments to match, program name excluded.
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Grammar documents to validate.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Grammar document (.json, .yaml or .yml).
    #[arg(long)]
    grammar: PathBuf,
    /// File with one JSON array of arguments per line.
    #[arg(long)]
    input: PathBuf,
    /// Run configuration YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of parallel matching jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run_match(args),
        Command::Validate(args) => run_validate(args),
        Command::Batch(args) => run_batch(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::default().add_directive(level.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<RunConfig, String> {
    match path {
        Some(path) => RunConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn open_parser(grammar: &Path, config: &RunConfig) -> Result<ArgvParser, String> {
    load_parser(grammar, config.parse_options())
        .map_err(|e| format!("Failed to load grammar '{}': {e}", grammar.display()))
}

fn format_outcome(outcome: Option<&Outcome>, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&outcome)
            .map_err(|err| format!("Failed to serialize outcome: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(&outcome)
            .map(|raw| raw.trim_end().to_string())
            .map_err(|err| format!("Failed to serialize outcome: {err}")),
    }
}

// ---------------------------------------------------------------------------
// run command
// ---------------------------------------------------------------------------

fn run_match(args: RunArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if args.no_comma_split {
        config.split_comma_values = false;
    }
    if args.quiet {
        config.on_failure.print_doc = false;
    }
    if args.no_exit {
        config.on_failure.exit = false;
    }

    let parser = open_parser(&args.grammar, &config)?;
    match parser.parse(&args.args) {
        Ok(outcome) => {
            println!("{}", format_outcome(Some(&outcome), args.format)?);
            Ok(())
        }
        Err(no_match) => {
            debug!(reason = %no_match.reason, "Applying failure policy");
            let policy = &config.on_failure;
            if policy.print_doc {
                if let Some(doc) = parser.grammar().doc_text.as_deref() {
                    println!("{}", doc.trim_end());
                }
            }
            if policy.exit {
                eprintln!("{no_match}");
                std::process::exit(policy.exit_code);
            }
            println!("{}", format_outcome(None, args.format)?);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    for path in &args.inputs {
        let grammar =
            load_grammar(path).map_err(|e| format!("Invalid grammar '{}': {e}", path.display()))?;
        debug!(path = %path.display(), grammar = %grammar.name, "Grammar is valid");
    }
    println!("Validated {} grammar file(s).", args.inputs.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// batch command
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct BatchRecord {
    line: usize,
    outcome: Option<Outcome>,
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    use rayon::prelude::*;

    let config = load_config(args.config.as_deref())?;
    let parser = open_parser(&args.grammar, &config)?;

    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;
    let mut work: Vec<(usize, Vec<String>)> = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let argv: Vec<String> = serde_json::from_str(line)
            .map_err(|err| format!("Invalid argument list on line {}: {err}", index + 1))?;
        work.push((index + 1, argv));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let records: Vec<BatchRecord> = pool.install(|| {
        work.par_iter()
            .map(|(line, argv)| BatchRecord {
                line: *line,
                outcome: parser.parse(argv).ok(),
            })
            .collect()
    });

    let matched = records.iter().filter(|r| r.outcome.is_some()).count();
    for record in &records {
        let raw = serde_json::to_string(record)
            .map_err(|err| format!("Failed to serialize outcome: {err}"))?;
        println!("{raw}");
    }
    debug!(lines = records.len(), matched, "Batch complete");
    Ok(())
}
