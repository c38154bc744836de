//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main"
//! that:
//! - parses CLI arguments
//! - loads the product catalog
//! - runs the quotation pipeline
//! - prints reports (or hands over to the TUI)

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{CatalogArgs, Command, QuoteArgs};
use crate::data::rates::RateResolver;
use crate::error::AppError;
use crate::io::catalog::{Catalog, load_catalog};

pub mod pipeline;

/// Entry point for the `sq` binary.
pub fn run() -> Result<(), AppError> {
    // We want `sq` and `sq -m JX524` to behave like `sq tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite
    // of the argv list before parsing. This preserves a clean clap
    // structure while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Quote(args) => handle_quote(args),
        Command::Models(args) => handle_models(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_quote(args: QuoteArgs) -> Result<(), AppError> {
    let (path, catalog) = load_catalog_interactive(&args.file)?;
    report_row_errors(&catalog);

    let model = match &args.model {
        Some(m) => m.clone(),
        None => catalog.entries[0].model.clone(),
    };

    let resolver = if args.offline {
        RateResolver::offline()
    } else {
        RateResolver::live()
    };

    let config = args.to_config(path, model);
    let run = pipeline::quote_from_catalog(&catalog, &resolver, &config)?;

    println!("{}", crate::report::format_quote_report(&run));
    Ok(())
}

fn handle_models(args: CatalogArgs) -> Result<(), AppError> {
    let (_, catalog) = load_catalog_interactive(&args.file)?;
    println!("{}", crate::report::format_model_listing(&catalog));
    Ok(())
}

/// Load the catalog, falling back to the interactive picker when the
/// requested file does not exist.
pub fn load_catalog_interactive(path: &Path) -> Result<(PathBuf, Catalog), AppError> {
    let path = if path.exists() {
        path.to_path_buf()
    } else {
        eprintln!("Catalog '{}' not found.", path.display());
        crate::cli::picker::prompt_for_catalog_path()?
    };
    let catalog = load_catalog(&path)?;
    Ok((path, catalog))
}

/// Surface row-level catalog problems without blocking the quotation.
pub fn report_row_errors(catalog: &Catalog) {
    for err in &catalog.row_errors {
        eprintln!("catalog line {}: {}", err.line, err.message);
    }
}

/// Rewrite argv so `sq` defaults to `sq tui`.
///
/// Rules:
/// - `sq`                      -> `sq tui`
/// - `sq -m JX524 ...`         -> `sq tui -m JX524 ...`
/// - `sq --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "quote" | "models" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
