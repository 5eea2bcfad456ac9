use clap::{Parser as ClapParser, Subcommand};
use kpi_formula::cli::{self, BatchOptions, CheckOptions, CliError};
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

#[derive(ClapParser)]
#[command(name = "kpif")]
#[command(about = "kpif - Validate KPI metric formulas before they are saved")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a single formula
    Check {
        /// The formula (reads stdin if not provided)
        formula: Option<String>,

        /// Print the validation report as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Print the canonical form of a valid formula
        #[arg(long)]
        ast: bool,
    },

    /// Validate one formula per line
    Batch {
        /// File of formulas (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Print the validation reports as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show documentation, optionally for one category
    Docs {
        /// Category name (omit to list categories)
        category: Option<String>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            formula,
            json,
            pretty,
            ast,
        } => run_check(formula, json, pretty, ast),
        Commands::Batch { file, json, pretty } => run_batch(file, json, pretty),
        Commands::Docs { category: None } => {
            print!("{}", cli::get_docs_overview());
            Ok(true)
        }
        Commands::Docs {
            category: Some(category),
        } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
            true
        }),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn read_stdin() -> Result<Option<String>, CliError> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}

fn run_check(
    formula: Option<String>,
    json: bool,
    pretty: bool,
    ast: bool,
) -> Result<bool, CliError> {
    let formula = match formula {
        Some(s) => Some(s),
        None => read_stdin()?,
    };

    let options = CheckOptions {
        formula,
        json,
        pretty,
        ast,
    };

    let output = cli::execute_check(&options)?;
    println!("{}", output.text);
    Ok(output.valid)
}

fn run_batch(file: Option<PathBuf>, json: bool, pretty: bool) -> Result<bool, CliError> {
    let source = match file {
        Some(path) => fs::read_to_string(path)?,
        None => read_stdin()?.ok_or(CliError::NoInput)?,
    };

    let output = cli::execute_batch(&source, &BatchOptions { json, pretty })?;
    if !output.text.is_empty() {
        println!("{}", output.text);
    }
    Ok(output.all_valid())
}
