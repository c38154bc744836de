//! Command-line parsing for the quotation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pricing/weight code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Currency, OptionKey, OptionSelection, QuoteConfig};

pub mod picker;

/// Default catalog file name.
pub const DEFAULT_CATALOG: &str = "product_data.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sq", version, about = "Smart Quote — actuator pricing & weight estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute one quotation and print the itemized report.
    Quote(QuoteArgs),
    /// List catalog models and their parsed pricing terms.
    Models(CatalogArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same quotation pipeline as `sq quote`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(QuoteArgs),
}

/// Common options for quoting (one-shot and TUI).
#[derive(Debug, Parser, Clone)]
pub struct QuoteArgs {
    /// Catalog CSV with `model_number` and `description` columns.
    #[arg(short = 'f', long, default_value = DEFAULT_CATALOG)]
    pub file: PathBuf,

    /// Model identifier to quote (defaults to the first catalog row).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Target currency for the converted price.
    #[arg(short = 'c', long, value_enum, default_value_t = Currency::Usd)]
    pub currency: Currency,

    /// Requested stroke length in millimeters.
    #[arg(long, default_value_t = 100)]
    pub stroke: u32,

    /// Quantity of units (minimum 1).
    #[arg(short = 'q', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub qty: u32,

    /// Skip the live rate lookup and use offline fallback rates.
    #[arg(long)]
    pub offline: bool,

    /// Select the ball-screw upgrade.
    #[arg(long = "ball-screw")]
    pub ball_screw: bool,

    /// Select the fisheye joint.
    #[arg(long)]
    pub fisheye: bool,

    /// Select the rear mounting plate.
    #[arg(long = "rear-plate")]
    pub rear_plate: bool,

    /// Select the front top plate.
    #[arg(long = "front-plate")]
    pub front_plate: bool,

    /// Select custom slotting/bore machining.
    #[arg(long)]
    pub machining: bool,

    /// Select the Hall sensor.
    #[arg(long)]
    pub hall: bool,

    /// Select the RS485/CAN communication module.
    #[arg(long)]
    pub comm: bool,

    /// Select the potentiometer feedback.
    #[arg(long)]
    pub pot: bool,

    /// Select the single controller.
    #[arg(long = "ctrl-1")]
    pub ctrl_1: bool,

    /// Select the dual-sync controller.
    #[arg(long = "ctrl-2")]
    pub ctrl_2: bool,

    /// Select the triple-sync controller.
    #[arg(long = "ctrl-3")]
    pub ctrl_3: bool,

    /// Select the quad-sync controller.
    #[arg(long = "ctrl-4")]
    pub ctrl_4: bool,
}

impl QuoteArgs {
    /// Collect the twelve option flags into a selection.
    pub fn options(&self) -> OptionSelection {
        let flags = [
            (OptionKey::BallScrew, self.ball_screw),
            (OptionKey::Fisheye, self.fisheye),
            (OptionKey::RearPlate, self.rear_plate),
            (OptionKey::FrontPlate, self.front_plate),
            (OptionKey::Machining, self.machining),
            (OptionKey::Hall, self.hall),
            (OptionKey::Comm, self.comm),
            (OptionKey::Pot, self.pot),
            (OptionKey::Ctrl1, self.ctrl_1),
            (OptionKey::Ctrl2, self.ctrl_2),
            (OptionKey::Ctrl3, self.ctrl_3),
            (OptionKey::Ctrl4, self.ctrl_4),
        ];
        let mut selection = OptionSelection::none();
        for (key, on) in flags {
            selection.set(key, on);
        }
        selection
    }

    /// Build the resolved run configuration for a concrete model.
    pub fn to_config(&self, catalog_path: PathBuf, model: String) -> QuoteConfig {
        QuoteConfig {
            catalog_path,
            model,
            currency: self.currency,
            stroke_mm: self.stroke,
            quantity: self.qty,
            options: self.options(),
            offline: self.offline,
        }
    }
}

/// Options for catalog listing.
#[derive(Debug, Parser)]
pub struct CatalogArgs {
    /// Catalog CSV with `model_number` and `description` columns.
    #[arg(short = 'f', long, default_value = DEFAULT_CATALOG)]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_flags_map_to_selection() {
        let cli = Cli::parse_from(["sq", "quote", "--ball-screw", "--ctrl-2", "--hall"]);
        let Command::Quote(args) = cli.command else {
            panic!("expected quote subcommand");
        };
        let sel = args.options();
        assert!(sel.is_selected(OptionKey::BallScrew));
        assert!(sel.is_selected(OptionKey::Ctrl2));
        assert!(sel.is_selected(OptionKey::Hall));
        assert_eq!(sel.count(), 3);
    }

    #[test]
    fn defaults_match_the_quotation_form() {
        let cli = Cli::parse_from(["sq", "quote"]);
        let Command::Quote(args) = cli.command else {
            panic!("expected quote subcommand");
        };
        assert_eq!(args.stroke, 100);
        assert_eq!(args.qty, 1);
        assert_eq!(args.currency, Currency::Usd);
        assert_eq!(args.file, PathBuf::from(DEFAULT_CATALOG));
        assert_eq!(args.options().count(), 0);
    }

    #[test]
    fn quantity_below_one_is_rejected() {
        assert!(Cli::try_parse_from(["sq", "quote", "-q", "0"]).is_err());
    }
}
