//! Shared quotation pipeline used by both the CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! catalog lookup -> pricing fold -> rate resolution -> weight estimate.
//! The front-ends then focus on presentation (printing vs widgets).

use crate::data::rates::{RateResolver, ResolvedRate};
use crate::domain::{Currency, Quote, QuoteConfig};
use crate::error::AppError;
use crate::io::catalog::{Catalog, load_catalog};
use crate::pricing;
use crate::weight::{self, WeightEstimate};

/// All computed outputs of a single quotation.
#[derive(Debug, Clone)]
pub struct QuoteRun {
    pub model: String,
    /// Raw catalog description, for display.
    pub description: Option<String>,
    /// Data-integrity warnings carried over from catalog parsing.
    pub warnings: Vec<String>,
    pub quote: Quote,
    pub currency: Currency,
    pub rate: ResolvedRate,
    /// Converted unit price: CNY total x multiplier.
    pub unit_price: f64,
    /// Unit price x quantity.
    pub total_price: f64,
    pub stroke_mm: u32,
    pub quantity: u32,
    pub weight: WeightEstimate,
    /// Which weight-model family was matched ("Default" if none).
    pub weight_family: &'static str,
}

/// Execute the full pipeline, loading the catalog from disk.
pub fn run_quote(config: &QuoteConfig) -> Result<QuoteRun, AppError> {
    let catalog = load_catalog(&config.catalog_path)?;
    let resolver = if config.offline {
        RateResolver::offline()
    } else {
        RateResolver::live()
    };
    quote_from_catalog(&catalog, &resolver, config)
}

/// Execute the pipeline against a pre-loaded catalog and resolver.
///
/// This is what the TUI uses so toggling an option does not re-read the
/// CSV or re-build the rate cache.
pub fn quote_from_catalog(
    catalog: &Catalog,
    resolver: &RateResolver,
    config: &QuoteConfig,
) -> Result<QuoteRun, AppError> {
    let entry = catalog.find(&config.model).ok_or_else(|| {
        AppError::new(
            3,
            format!("Model '{}' not found in the catalog.", config.model),
        )
    })?;

    let quote = match &entry.description {
        Some(_) => pricing::price(&entry.terms, &config.options, config.stroke_mm),
        None => pricing::missing_description_quote(),
    };

    let rate = resolver.resolve(config.currency);
    let unit_price = f64::from(quote.total_cny) * rate.multiplier;
    let total_price = unit_price * f64::from(config.quantity);

    let (weight_family, _) = weight::family_params(&entry.model);
    let weight = weight::estimate(&entry.model, config.stroke_mm, config.quantity);

    Ok(QuoteRun {
        model: entry.model.clone(),
        description: entry.description.clone(),
        warnings: entry.warnings.clone(),
        quote,
        currency: config.currency,
        rate,
        unit_price,
        total_price,
        stroke_mm: config.stroke_mm,
        quantity: config.quantity,
        weight,
        weight_family,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptionSelection;
    use crate::io::catalog::read_catalog;
    use std::io::Cursor;
    use std::path::PathBuf;

    const SAMPLE: &str = "model_number,description\n\
        JX524,单价:1000 行程100-500 每加行程50毫米加20元\n\
        JX999,\n";

    fn config(model: &str, currency: Currency) -> QuoteConfig {
        QuoteConfig {
            catalog_path: PathBuf::from("unused.csv"),
            model: model.to_string(),
            currency,
            stroke_mm: 600,
            quantity: 3,
            options: OptionSelection::none(),
            offline: true,
        }
    }

    #[test]
    fn end_to_end_offline_quote() {
        let catalog = read_catalog(Cursor::new(SAMPLE)).unwrap();
        let resolver = RateResolver::offline();
        let run = quote_from_catalog(&catalog, &resolver, &config("JX524", Currency::Usd)).unwrap();

        assert_eq!(run.quote.total_cny, 1040);
        assert_eq!(run.rate.multiplier, 0.138);
        assert!((run.unit_price - 143.52).abs() < 1e-9);
        assert!((run.total_price - 430.56).abs() < 1e-9);
        // 524 family: 3.40 + 600 * 0.0050 = 6.40 kg single.
        assert_eq!(run.weight_family, "524");
        assert!((run.weight.single_kg - 6.40).abs() < 1e-9);
        assert!((run.weight.batch_kg - 19.20).abs() < 1e-9);
    }

    #[test]
    fn base_currency_quote_uses_unity_rate() {
        let catalog = read_catalog(Cursor::new(SAMPLE)).unwrap();
        let resolver = RateResolver::offline();
        let run = quote_from_catalog(&catalog, &resolver, &config("JX524", Currency::Cny)).unwrap();
        assert_eq!(run.rate.multiplier, 1.0);
        assert!((run.unit_price - 1040.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_is_a_catalog_error() {
        let catalog = read_catalog(Cursor::new(SAMPLE)).unwrap();
        let resolver = RateResolver::offline();
        let err =
            quote_from_catalog(&catalog, &resolver, &config("NOPE", Currency::Usd)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn empty_description_quotes_to_zero_with_diagnostic() {
        let catalog = read_catalog(Cursor::new(SAMPLE)).unwrap();
        let resolver = RateResolver::offline();
        let run = quote_from_catalog(&catalog, &resolver, &config("JX999", Currency::Usd)).unwrap();
        assert_eq!(run.quote.total_cny, 0);
        assert_eq!(run.quote.items.len(), 1);
        assert_eq!(run.unit_price, 0.0);
    }
}
