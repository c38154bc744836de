//! Formatted terminal output for quotations.
//!
//! Precision is a contract shared with the TUI: money and kilograms are
//! rendered to two decimal places, exchange rates to four.

use crate::app::pipeline::QuoteRun;
use crate::data::rates::RateOrigin;
use crate::domain::LineItem;
use crate::io::catalog::Catalog;

/// Money with thousands grouping, two decimal places.
pub fn fmt_money(v: f64) -> String {
    group_thousands(&format!("{v:.2}"))
}

/// Kilograms, two decimal places.
pub fn fmt_kg(v: f64) -> String {
    format!("{v:.2}")
}

/// Exchange-rate multiplier, four decimal places.
pub fn fmt_rate(v: f64) -> String {
    format!("{v:.4}")
}

/// Short provenance tag shown next to the applied rate.
pub fn origin_label(origin: RateOrigin) -> &'static str {
    match origin {
        RateOrigin::Base => "base",
        RateOrigin::Live => "live",
        RateOrigin::Cached => "cached",
        RateOrigin::Fallback => "offline",
    }
}

/// One cost-breakdown line, matching the engine's log conventions.
pub fn fmt_line_item(item: &LineItem) -> String {
    if item.defaulted {
        format!("{}: +{} CNY (Default)", item.label, item.amount_cny)
    } else {
        format!("{}: +{} CNY", item.label, item.amount_cny)
    }
}

/// Format the full quotation report for the CLI.
pub fn format_quote_report(run: &QuoteRun) -> String {
    let mut out = String::new();
    let code = run.currency.code();

    out.push_str("=== Smart Quote (智能报价) ===\n");
    out.push_str(&format!(
        "Model: {} | Stroke: {}mm | Qty: {}\n",
        run.model, run.stroke_mm, run.quantity
    ));

    if let Some(desc) = &run.description {
        out.push_str(&format!("\n产品描述 (Description):\n{desc}\n"));
    }

    for warning in &run.warnings {
        out.push_str(&format!("\nWarning: {warning}\n"));
    }

    out.push_str("\n单价 (Unit Price):\n");
    out.push_str(&format!("  {} {code}\n", fmt_money(run.unit_price)));
    out.push_str(&format!(
        "  ≈ {} CNY (汇率: {}, {})\n",
        fmt_money(f64::from(run.quote.total_cny)),
        fmt_rate(run.rate.multiplier),
        origin_label(run.rate.origin),
    ));

    out.push_str(&format!("\n总价 (Total Price) - {} Pcs:\n", run.quantity));
    out.push_str(&format!("  {} {code}\n", fmt_money(run.total_price)));

    out.push_str("\n费用明细 (Cost Breakdown):\n");
    for item in &run.quote.items {
        out.push_str(&format!("  • {}\n", fmt_line_item(item)));
    }

    out.push_str(&format!(
        "\n重量预估: 单个净重 {} kg | 总净重 {} kg (family: {})\n",
        fmt_kg(run.weight.single_kg),
        fmt_kg(run.weight.batch_kg),
        run.weight_family,
    ));

    out.push_str(&format!(
        "\nGenerated by sq | Date: {}\n",
        chrono::Local::now().date_naive()
    ));

    out
}

/// Format the catalog model listing for `sq models`.
pub fn format_model_listing(catalog: &Catalog) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} model(s) in catalog ({} row(s) read):\n",
        catalog.len(),
        catalog.rows_read
    ));

    for entry in &catalog.entries {
        let base = entry
            .terms
            .base_price
            .map(|p| format!("base {p} CNY"))
            .unwrap_or_else(|| "no base price".to_string());
        let stroke = match &entry.terms.stroke_rule {
            Some(rule) => format!(
                "stroke {}-{} (+{}/{}mm)",
                rule.range_start, rule.range_end, rule.step_cost, rule.step_mm
            ),
            None => "no stroke rule".to_string(),
        };
        let options = entry
            .terms
            .option_amounts
            .iter()
            .filter(|a| a.is_some())
            .count();
        out.push_str(&format!(
            "{:<16} {base} | {stroke} | {options} priced option(s)\n",
            entry.model
        ));
    }

    for err in &catalog.row_errors {
        out.push_str(&format!("  (line {}) {}\n", err.line, err.message));
    }

    out
}

fn group_thousands(s: &str) -> String {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::rates::{RateResolver, ResolvedRate};
    use crate::domain::{Currency, OptionSelection, QuoteConfig};
    use crate::io::catalog::read_catalog;
    use std::io::Cursor;
    use std::path::PathBuf;

    #[test]
    fn money_grouping_and_precision() {
        assert_eq!(fmt_money(0.0), "0.00");
        assert_eq!(fmt_money(138.0), "138.00");
        assert_eq!(fmt_money(1040.5), "1,040.50");
        assert_eq!(fmt_money(1234567.891), "1,234,567.89");
    }

    #[test]
    fn rate_has_four_decimals() {
        assert_eq!(fmt_rate(0.138), "0.1380");
        assert_eq!(fmt_rate(1.0), "1.0000");
    }

    #[test]
    fn kilograms_have_two_decimals() {
        assert_eq!(fmt_kg(4.4), "4.40");
        assert_eq!(fmt_kg(13.2), "13.20");
    }

    #[test]
    fn defaulted_items_are_marked() {
        let plain = LineItem::new("基础价格 (Base)", 1000);
        let defaulted = LineItem::defaulted("滚珠丝杆 (Ball Screw)", 280);
        assert_eq!(fmt_line_item(&plain), "基础价格 (Base): +1000 CNY");
        assert_eq!(
            fmt_line_item(&defaulted),
            "滚珠丝杆 (Ball Screw): +280 CNY (Default)"
        );
    }

    #[test]
    fn report_carries_converted_and_base_amounts() {
        let catalog = read_catalog(Cursor::new(
            "model_number,description\nJX524,单价:1000 行程100-500 每加行程50毫米加20元\n",
        ))
        .unwrap();
        let resolver = RateResolver::offline();
        let config = QuoteConfig {
            catalog_path: PathBuf::from("unused.csv"),
            model: "JX524".to_string(),
            currency: Currency::Usd,
            stroke_mm: 600,
            quantity: 1,
            options: OptionSelection::none(),
            offline: true,
        };
        let run = crate::app::pipeline::quote_from_catalog(&catalog, &resolver, &config).unwrap();
        let report = format_quote_report(&run);

        assert!(report.contains("143.52 USD"));
        assert!(report.contains("1,040.00 CNY"));
        assert!(report.contains("0.1380"));
        assert!(report.contains("行程加价 (600mm): +40 CNY"));
    }

    #[test]
    fn origin_labels_are_stable() {
        let resolved = ResolvedRate {
            multiplier: 1.0,
            origin: RateOrigin::Base,
        };
        assert_eq!(origin_label(resolved.origin), "base");
        assert_eq!(origin_label(RateOrigin::Fallback), "offline");
    }
}
