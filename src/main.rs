use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use json_workbench::diff::{format_report, line_diff};
use json_workbench::errors::Result;
use json_workbench::{document, engine, table, tree, Options, Workbench};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// JSON workbench: cursor paths, queries, diffs and formatting.
/// Every FILE argument accepts `-` for stdin.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON file with workbench options
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output on stderr (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Log filter directives, e.g. `debug` or `json_workbench::query=trace`.
    /// Overrides RUST_LOG and `-v`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Structural path at a character offset
    Path { file: String, offset: usize },
    /// Run a JSONPath-like query
    Query {
        file: String,
        expr: String,
        /// Show only the first match
        #[arg(long)]
        first: bool,
        /// Deduplicate results
        #[arg(long)]
        unique: bool,
        /// Fallback JSON when nothing matches
        #[arg(long)]
        default: Option<String>,
    },
    /// Compare two documents
    Diff {
        old: String,
        new: String,
        /// Print entries as JSON instead of a report
        #[arg(long)]
        json: bool,
        /// Compare line by line instead of structurally
        #[arg(long, conflicts_with = "json")]
        lines: bool,
    },
    /// Pretty print
    Format {
        file: String,
        #[arg(long)]
        indent: Option<usize>,
        #[arg(long)]
        sort_keys: bool,
    },
    /// Strip whitespace
    Compact { file: String },
    /// Check syntax and report size
    Validate { file: String },
    /// Completion candidates for a partial query
    Suggest { file: String, partial: String },
    /// Paths of every container node
    Tree { file: String },
    /// Show an array of records as a table
    Table { file: String },
    /// Print the node at a pointer
    Get { file: String, pointer: String },
    /// Print the document without the node at a pointer
    Remove { file: String, pointer: String },
}

fn main() {
    let args = Args::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = log_directive(args.log_level.as_deref(), rust_log.as_deref(), args.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

/// Filter directives from `--log-level`, else RUST_LOG, else the `-v` count.
fn log_directive(log_level: Option<&str>, rust_log: Option<&str>, verbose: u8) -> String {
    fn non_blank(d: Option<&str>) -> Option<&str> {
        d.map(str::trim).filter(|d| !d.is_empty())
    }
    match non_blank(log_level).or(non_blank(rust_log)) {
        Some(d) => d.to_string(),
        None => match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_string(),
    }
}

fn run(args: Args) -> Result<()> {
    let mut opts = match &args.config {
        Some(path) => Options::from_json(&std::fs::read_to_string(path)?)?,
        None => Options::default(),
    };
    tracing::info!(?opts, "options loaded");

    match args.command {
        Command::Path { file, offset } => {
            let text = read_input(&file)?;
            print_json(&engine::path_at(&text, offset))
        }
        Command::Query { file, expr, first, unique, default } => {
            // A default that is not JSON is taken as a plain string.
            if let Some(def) = default {
                opts.default = Some(
                    serde_json::from_str(&def).unwrap_or(serde_json::Value::String(def)),
                );
            }
            let text = read_input(&file)?;
            let mut out = Workbench::new(opts).query(&text, &expr)?;
            if unique {
                out = engine::unique(&out);
            }
            if first {
                return print_json(&engine::first(&out));
            }
            print_json(&out)
        }
        Command::Diff { old, new, json, lines } => {
            let (a, b) = (read_input(&old)?, read_input(&new)?);
            if lines {
                return print_json(&line_diff(&a, &b));
            }
            let entries = engine::compare_texts(&a, &b)?;
            if json {
                print_json(&entries)
            } else {
                println!("{}", format_report(&entries));
                Ok(())
            }
        }
        Command::Format { file, indent, sort_keys } => {
            if let Some(indent) = indent {
                opts.indent = indent;
            }
            opts.sort_keys |= sort_keys;
            println!("{}", Workbench::new(opts).format(&read_input(&file)?)?);
            Ok(())
        }
        Command::Compact { file } => {
            println!("{}", document::compact(&read_input(&file)?)?);
            Ok(())
        }
        Command::Validate { file } => {
            let text = read_input(&file)?;
            let validation = document::validate(&text);
            print_json(&serde_json::json!({
                "validation": validation,
                "size": document::size_info(&text),
            }))?;
            if !validation.valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Suggest { file, partial } => {
            print_json(&Workbench::new(opts).suggest(&read_input(&file)?, &partial)?)
        }
        Command::Tree { file } => {
            let data = document::parse(&read_input(&file)?)?;
            for key in tree::container_paths(&data) {
                println!("{key}");
            }
            Ok(())
        }
        Command::Table { file } => {
            let data = document::parse(&read_input(&file)?)?;
            match table::project(&data) {
                Some(t) => println!("{}", t.render()),
                None => println!("no array to show as a table"),
            }
            Ok(())
        }
        Command::Get { file, pointer } => {
            let data = document::parse(&read_input(&file)?)?;
            let path = json_workbench::parse_pointer(&pointer)?;
            print_json(&tree::extract(&data, &path)?)
        }
        Command::Remove { file, pointer } => {
            let data = document::parse(&read_input(&file)?)?;
            let path = json_workbench::parse_pointer(&pointer)?;
            print_json(&tree::remove(&data, &path)?)
        }
    }
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(file)?)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", document::to_json(value)?);
    Ok(())
}
