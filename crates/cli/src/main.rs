//! # baremes-cli
//!
//! Command-line interface for the IPP tax-benefit table extractor.

use anyhow::{Context, Result};
use baremes_core::{
    audit_workbook, convert_francs, export_workbook, render_tree, ExtractConfig, RootNode,
};
use baremes_sheet::Book;
use clap::{Parser, Subcommand};
use colored::Colorize;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "baremes.toml";
const ENV_PREFIX: &str = "BAREMES_";

/// baremes - IPP tax-benefit tables to parameter files
#[derive(Parser)]
#[command(name = "baremes")]
#[command(author, version, about = "Extract fiscal parameters from IPP tax-benefit workbooks", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./baremes.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the parameter tree of one or more workbooks
    Parameters {
        /// Directory holding the IPP workbooks
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,

        /// Workbook name, as in "Baremes IPP - <NAME>.xls"
        #[arg(short, long = "workbook", value_name = "NAME", default_values_t = [String::from("prelevements sociaux")])]
        workbooks: Vec<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Convert franc amounts to euros
        #[arg(long)]
        convert_francs: bool,
    },

    /// Write one YAML document per sheet of every workbook in a directory
    Yaml {
        /// Directory holding the workbooks
        #[arg(short, long, value_name = "DIR", default_value = "xls")]
        source_dir: PathBuf,

        /// Directory receiving one subdirectory per workbook
        #[arg(short, long, value_name = "DIR", default_value = "yaml")]
        target_dir: PathBuf,
    },

    /// Check that no variable name is used twice in a workbook
    Audit {
        /// Directory holding the IPP workbooks
        #[arg(short, long, value_name = "DIR")]
        dir: PathBuf,

        /// Workbook name, as in "Baremes IPP - <NAME>.xls"
        #[arg(short, long = "workbook", value_name = "NAME", default_values_t = [String::from("prelevements sociaux")])]
        workbooks: Vec<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so documents can stream to stdout.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parameters {
            dir,
            workbooks,
            output,
            convert_francs,
        } => run_parameters(&config, &dir, &workbooks, output.as_deref(), convert_francs),
        Command::Yaml {
            source_dir,
            target_dir,
        } => run_yaml(&config, &source_dir, &target_dir),
        Command::Audit { dir, workbooks } => run_audit(&config, &dir, &workbooks),
    }
}

/// Layer built-in defaults, the configuration file and `BAREMES_*` variables.
fn load_config(path: Option<&Path>) -> Result<ExtractConfig> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    Figment::from(Serialized::defaults(ExtractConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .extract()
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Path of a named IPP workbook
fn workbook_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("Baremes IPP - {name}.xls"))
}

/// Load the named workbooks that exist, warning about the others.
fn load_workbooks(dir: &Path, names: &[String]) -> Result<Vec<Book>> {
    let mut books = Vec::with_capacity(names.len());
    for name in names {
        let path = workbook_path(dir, name);
        if !path.exists() {
            warn!(workbook = %name, path = %path.display(), "skipping missing workbook");
            continue;
        }
        info!(path = %path.display(), "parsing file");
        let book = Book::from_xls(&path)
            .with_context(|| format!("Failed to read workbook: {}", path.display()))?;
        books.push(book);
    }
    Ok(books)
}

fn run_parameters(
    config: &ExtractConfig,
    dir: &Path,
    workbooks: &[String],
    output: Option<&Path>,
    to_euros: bool,
) -> Result<ExitCode> {
    let mut root = RootNode::new(config);
    for book in load_workbooks(dir, workbooks)? {
        root.append_workbook(&book, config)
            .with_context(|| format!("Failed to extract parameters from {}", book.name()))?;
    }
    if to_euros {
        root = convert_francs(&root);
    }

    let document = render_tree(&root);
    match output {
        Some(path) => {
            fs::write(path, document)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            eprintln!(
                "{} {} sheets written to {}",
                "✓".green().bold(),
                root.sheets.len(),
                path.display()
            );
        }
        None => print!("{document}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn run_yaml(config: &ExtractConfig, source_dir: &Path, target_dir: &Path) -> Result<ExitCode> {
    fs::create_dir_all(target_dir)
        .with_context(|| format!("Failed to create directory: {}", target_dir.display()))?;

    let mut paths: Vec<PathBuf> = fs::read_dir(source_dir)
        .with_context(|| format!("Failed to read directory: {}", source_dir.display()))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "xls"))
        .collect();
    paths.sort();

    for path in paths {
        info!(path = %path.display(), "parsing file");
        let book = Book::from_xls(&path)
            .with_context(|| format!("Failed to read workbook: {}", path.display()))?;
        let report = export_workbook(&book, config, target_dir)
            .with_context(|| format!("Failed to export workbook: {}", book.name()))?;
        println!(
            "{} {}: {} documents",
            "✓".green().bold(),
            book.name(),
            report.written.len()
        );
        for sheet in &report.failed {
            println!("  {} {}", "✗".red().bold(), sheet);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_audit(config: &ExtractConfig, dir: &Path, workbooks: &[String]) -> Result<ExitCode> {
    let mut clean = true;
    for book in load_workbooks(dir, workbooks)? {
        let report = audit_workbook(&book, config)
            .with_context(|| format!("Failed to audit workbook: {}", book.name()))?;
        match report.into_result() {
            Ok(()) => println!("{} {}", "✓".green().bold(), book.name()),
            Err(err) => {
                clean = false;
                println!("{} {err}", "Error:".red().bold());
            }
        }
    }
    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parameters_defaults() {
        let cli = Cli::try_parse_from(["baremes", "parameters", "--dir", "xls"]).unwrap();
        match cli.command {
            Command::Parameters {
                workbooks,
                output,
                convert_francs,
                ..
            } => {
                assert_eq!(workbooks, vec!["prelevements sociaux"]);
                assert!(output.is_none());
                assert!(!convert_francs);
            }
            _ => panic!("expected the parameters command"),
        }
    }

    #[test]
    fn test_workbook_path() {
        assert_eq!(
            workbook_path(Path::new("xls"), "chomage"),
            Path::new("xls").join("Baremes IPP - chomage.xls")
        );
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baremes.toml");
        fs::write(&path, "max_year = 2500\nsummary_sheet_prefix = \"Index\"\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.max_year, 2500);
        assert_eq!(config.summary_sheet_prefix, "Index");
        assert_eq!(config.root_title, "Barème IPP");
    }

    #[test]
    fn test_missing_workbooks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let books = load_workbooks(dir.path(), &["absent".to_string()]).unwrap();
        assert!(books.is_empty());
    }
}
