//! Command-line tools for structured Pytch programs.
//!
//! Provides the `pytch` binary with subcommands to flatten a program
//! skeleton into Python, to resolve a line of the flattened program back to
//! the handler it came from, and to check a proposed sprite name.
//!
//! Reads `PYTCH_LOG` (default: "warn") for the log level; logs go to stderr
//! so that stdout carries only results.

use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use pytch_core::{
    name_validity, AssetCatalog, AssetMetaData, NameValidity, NoIdsStructuredProject,
    PythonNames, StructuredProgram,
};
use pytch_flatten::{flatten_with_options, FlattenOptions, SourceMap};
use pytch_session::ErrorLocation;

/// Exit code for an invalid name or unresolvable line.
const EXIT_REJECTED: i32 = 1;

/// Exit code for unreadable or malformed input.
const EXIT_INPUT_ERROR: i32 = 2;

/// Structured Pytch program tools.
#[derive(Parser)]
#[command(name = "pytch", about = "Structured Pytch program tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Flatten a program skeleton into a single Python program.
    Flatten {
        /// Path to the skeleton JSON file.
        #[arg(short, long)]
        skeleton: PathBuf,

        /// Print `{codeText, mapEntries}` as JSON instead of the bare code.
        #[arg(long)]
        map: bool,
    },

    /// Resolve a line of the flattened program to a handler location.
    Resolve {
        /// Path to the skeleton JSON file.
        #[arg(short, long)]
        skeleton: PathBuf,

        /// One-based line number in the flattened program.
        #[arg(short, long)]
        line: usize,

        /// Column in the flattened program, if known.
        #[arg(short, long)]
        col: Option<usize>,
    },

    /// Check whether a string can be used as a sprite name.
    CheckName {
        /// The proposed name.
        name: String,

        /// Names of the sprites which already exist.
        #[arg(long, value_delimiter = ',')]
        existing: Vec<String>,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Flatten { skeleton, map } => run_flatten(&skeleton, map),
        Commands::Resolve {
            skeleton,
            line,
            col,
        } => run_resolve(&skeleton, line, col),
        Commands::CheckName { name, existing } => run_check_name(&name, &existing),
    };
    process::exit(exit_code);
}

fn init_logging() {
    let level = std::env::var("PYTCH_LOG")
        .ok()
        .and_then(|s| tracing::Level::from_str(&s).ok())
        .unwrap_or(tracing::Level::WARN);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Reads a skeleton file and embodies it, collecting its assets with mime
/// types guessed from their extensions.
fn load_skeleton(path: &Path) -> Result<(StructuredProgram, Vec<AssetMetaData>), String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read skeleton '{}': {}", path.display(), e))?;
    let skeleton = NoIdsStructuredProject::from_json(&json)
        .map_err(|e| format!("failed to parse skeleton '{}': {}", path.display(), e))?;

    let mut catalog = AssetCatalog::new();
    let program = StructuredProgram::from_skeleton(&skeleton, &mut catalog)
        .map_err(|e| format!("failed to embody skeleton '{}': {}", path.display(), e))?;

    tracing::info!(
        path = %path.display(),
        n_actors = program.actors().len(),
        n_assets = catalog.assets().len(),
        "loaded skeleton"
    );
    Ok((program, catalog.into_assets()))
}

fn print_json<T: serde::Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize result: {}\"}}", e));
    println!("{}", json);
}

/// Execute the flatten subcommand.
///
/// Returns exit code: 0 = success, 2 = input error.
fn run_flatten(skeleton_path: &Path, with_map: bool) -> i32 {
    let (program, assets) = match load_skeleton(skeleton_path) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return EXIT_INPUT_ERROR;
        }
    };

    let result = flatten_with_options(&program, &assets, &FlattenOptions::default());
    if with_map {
        print_json(&result);
    } else {
        println!("{}", result.code_text);
    }
    0
}

/// Execute the resolve subcommand.
///
/// Returns exit code: 0 = success, 1 = line not in any handler,
/// 2 = input error.
///
/// Actor and handler IDs are minted afresh on every run, so the printed IDs
/// are only meaningful alongside a `flatten --map` of the same invocation.
/// The actor's name is printed as well for that reason.
fn run_resolve(skeleton_path: &Path, line: usize, col: Option<usize>) -> i32 {
    let (program, assets) = match load_skeleton(skeleton_path) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return EXIT_INPUT_ERROR;
        }
    };

    let options = FlattenOptions::default();
    let result = flatten_with_options(&program, &assets, &options);
    let source_map = match SourceMap::from_entries(result.map_entries) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_REJECTED;
        }
    };

    match ErrorLocation::resolve(&source_map, &options, line, col) {
        Ok(location) => {
            let actor_name = program
                .unique_actor_by_id(location.location.actor_id)
                .map(|a| a.name.clone())
                .unwrap_or_default();
            print_json(&serde_json::json!({
                "actorName": actor_name,
                "location": location.location,
                "localColNo": location.local_col_no,
                "description": location.to_string(),
            }));
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_REJECTED
        }
    }
}

/// Execute the check-name subcommand.
///
/// Returns exit code: 0 = valid, 1 = invalid.
fn run_check_name(name: &str, existing: &[String]) -> i32 {
    let validity = name_validity(&PythonNames, existing, name);
    print_json(&validity);
    match validity {
        NameValidity::Valid => 0,
        NameValidity::Invalid { .. } => EXIT_REJECTED,
    }
}
