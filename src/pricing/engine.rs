//! Surcharge accumulation over parsed price terms.
//!
//! The engine is a pure fold: for fixed inputs the output is identical
//! on every call. All amounts are non-negative integers in CNY; nothing
//! is rounded here (rounding only happens at currency formatting).

use crate::domain::{LineItem, OptionKey, OptionSelection, PriceTerms, Quote};

/// Fixed fallback applied when the ball-screw option is selected but the
/// description carries no matching surcharge marker.
pub const BALL_SCREW_DEFAULT_CNY: u32 = 280;

/// What to do when a selected option has no parsed surcharge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingPolicy {
    /// Silently contribute zero; absence is not a data error.
    Zero,
    /// Apply a fixed default amount and log it as defaulted.
    Default(u32),
}

/// Per-option fallback policy table. Only the ball-screw option carries
/// a nonzero default.
fn missing_policy(key: OptionKey) -> MissingPolicy {
    match key {
        OptionKey::BallScrew => MissingPolicy::Default(BALL_SCREW_DEFAULT_CNY),
        _ => MissingPolicy::Zero,
    }
}

/// Compute the base-currency total and itemized log for one quotation.
///
/// Log order is fixed: base price, stroke increment, then the twelve
/// options in declaration order (skipping unselected ones).
pub fn price(terms: &PriceTerms, options: &OptionSelection, stroke_mm: u32) -> Quote {
    let mut total: u32 = 0;
    let mut items = Vec::new();

    if let Some(base) = terms.base_price {
        total += base;
        items.push(LineItem::new("基础价格 (Base)", base));
    }

    if let Some(rule) = &terms.stroke_rule {
        let surcharge = rule.surcharge(stroke_mm);
        if surcharge > 0 {
            total += surcharge;
            items.push(LineItem::new(format!("行程加价 ({stroke_mm}mm)"), surcharge));
        }
    }

    for key in OptionKey::ALL {
        if !options.is_selected(key) {
            continue;
        }
        match terms.option_amount(key) {
            Some(amount) => {
                total += amount;
                items.push(LineItem::new(key.display_name(), amount));
            }
            None => {
                if let MissingPolicy::Default(amount) = missing_policy(key) {
                    total += amount;
                    items.push(LineItem::defaulted(key.display_name(), amount));
                }
            }
        }
    }

    Quote { total_cny: total, items }
}

/// Quote for a catalog row with no usable description text: total zero
/// plus a single diagnostic entry, never an error.
pub fn missing_description_quote() -> Quote {
    Quote {
        total_cny: 0,
        items: vec![LineItem::new("Error: No description", 0)],
    }
}
