//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - produced once at catalog-load time (`PriceTerms`)
//! - consumed by the pricing/weight engines without further parsing
//! - rendered by both the CLI report and the TUI

use std::path::PathBuf;

use clap::ValueEnum;

/// Target currency for a quotation.
///
/// Catalog prices and surcharges are natively expressed in CNY (the base
/// currency); every other variant requires a multiplier from the rate
/// resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Currency {
    Usd,
    Eur,
    Cny,
    Gbp,
    Aud,
}

impl Currency {
    /// The currency catalog amounts are quoted in.
    pub const BASE: Currency = Currency::Cny;

    /// Selector order for the currency picker.
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Cny,
        Currency::Gbp,
        Currency::Aud,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cny => "CNY",
            Currency::Gbp => "GBP",
            Currency::Aud => "AUD",
        }
    }

    pub fn is_base(self) -> bool {
        self == Currency::BASE
    }

    /// Cycle forward through the selector order (used by the TUI).
    pub fn next(self) -> Currency {
        let idx = Currency::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Currency::ALL[(idx + 1) % Currency::ALL.len()]
    }

    /// Cycle backward through the selector order.
    pub fn prev(self) -> Currency {
        let idx = Currency::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Currency::ALL[(idx + Currency::ALL.len() - 1) % Currency::ALL.len()]
    }
}

/// The twelve configurable components of the actuator product line.
///
/// Declaration order is contractual: it fixes both the surcharge
/// accumulation order in the pricing engine and the checkbox order in
/// the TUI, regardless of which options are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    BallScrew,
    Fisheye,
    RearPlate,
    FrontPlate,
    Machining,
    Hall,
    Comm,
    Pot,
    Ctrl1,
    Ctrl2,
    Ctrl3,
    Ctrl4,
}

pub const OPTION_COUNT: usize = 12;

impl OptionKey {
    pub const ALL: [OptionKey; OPTION_COUNT] = [
        OptionKey::BallScrew,
        OptionKey::Fisheye,
        OptionKey::RearPlate,
        OptionKey::FrontPlate,
        OptionKey::Machining,
        OptionKey::Hall,
        OptionKey::Comm,
        OptionKey::Pot,
        OptionKey::Ctrl1,
        OptionKey::Ctrl2,
        OptionKey::Ctrl3,
        OptionKey::Ctrl4,
    ];

    /// Position in the declaration order.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }

    /// Display label used in cost-breakdown log entries.
    pub fn display_name(self) -> &'static str {
        match self {
            OptionKey::BallScrew => "滚珠丝杆 (Ball Screw)",
            OptionKey::Fisheye => "鱼眼接头 (Fisheye)",
            OptionKey::RearPlate => "后底板 (Rear Plate)",
            OptionKey::FrontPlate => "前顶板 (Front Plate)",
            OptionKey::Machining => "开槽加工 (Machining)",
            OptionKey::Hall => "霍尔感应 (Hall Sensor)",
            OptionKey::Comm => "RS485/CAN",
            OptionKey::Pot => "电位器 (Potentiometer)",
            OptionKey::Ctrl1 => "单控 (Single Ctrl)",
            OptionKey::Ctrl2 => "二同步 (Dual Ctrl)",
            OptionKey::Ctrl3 => "三同步 (Triple Ctrl)",
            OptionKey::Ctrl4 => "四同步 (Quad Ctrl)",
        }
    }

    /// Short ASCII label used for CLI flags and compact TUI rows.
    pub fn short_name(self) -> &'static str {
        match self {
            OptionKey::BallScrew => "ball-screw",
            OptionKey::Fisheye => "fisheye",
            OptionKey::RearPlate => "rear-plate",
            OptionKey::FrontPlate => "front-plate",
            OptionKey::Machining => "machining",
            OptionKey::Hall => "hall",
            OptionKey::Comm => "comm",
            OptionKey::Pot => "pot",
            OptionKey::Ctrl1 => "ctrl-1",
            OptionKey::Ctrl2 => "ctrl-2",
            OptionKey::Ctrl3 => "ctrl-3",
            OptionKey::Ctrl4 => "ctrl-4",
        }
    }
}

/// Caller-constructed set of selected options.
///
/// The pricing engine only reads this; it never mutates a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSelection {
    selected: [bool; OPTION_COUNT],
}

impl OptionSelection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: OptionKey, on: bool) {
        self.selected[key.index()] = on;
    }

    pub fn toggle(&mut self, key: OptionKey) {
        self.selected[key.index()] = !self.selected[key.index()];
    }

    pub fn is_selected(&self, key: OptionKey) -> bool {
        self.selected[key.index()]
    }

    /// Builder-style helper, mostly for tests.
    pub fn with(mut self, key: OptionKey) -> Self {
        self.set(key, true);
        self
    }

    pub fn count(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }
}

/// Stroke-increment pricing rule extracted from a description.
///
/// Encodes "stroke range `range_start`-`range_end`; every additional
/// `step_mm` mm beyond the range adds `step_cost` CNY". `step_mm` is
/// guaranteed non-zero by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeRule {
    pub range_start: u32,
    pub range_end: u32,
    pub step_mm: u32,
    pub step_cost: u32,
}

impl StrokeRule {
    /// Surcharge for a requested stroke, in CNY.
    ///
    /// Strokes at or below `range_end` are covered by the base price;
    /// beyond it, each started `step_mm` block costs `step_cost`
    /// (`steps = ceil((stroke - range_end) / step_mm)`).
    pub fn surcharge(&self, stroke_mm: u32) -> u32 {
        if stroke_mm <= self.range_end {
            return 0;
        }
        let over = stroke_mm - self.range_end;
        let steps = over.div_ceil(self.step_mm);
        steps * self.step_cost
    }
}

/// Explicit pricing schema for one catalog row.
///
/// Populated once at catalog-load time by `pricing::parser`; the raw
/// description text stays available for display but is never re-parsed
/// per calculation. Every field is optional: an absent pattern simply
/// contributes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTerms {
    /// Base unit price in CNY, from the "单价" marker.
    pub base_price: Option<u32>,
    /// Stroke-increment rule, if the description carries one.
    pub stroke_rule: Option<StrokeRule>,
    /// Per-option surcharge amounts, indexed by `OptionKey` order.
    pub option_amounts: [Option<u32>; OPTION_COUNT],
}

impl PriceTerms {
    pub fn option_amount(&self, key: OptionKey) -> Option<u32> {
        self.option_amounts[key.index()]
    }
}

/// One entry of the itemized cost log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub label: String,
    pub amount_cny: u32,
    /// True when the amount came from a policy default rather than the
    /// description text (currently only the ball-screw fallback).
    pub defaulted: bool,
}

impl LineItem {
    pub fn new(label: impl Into<String>, amount_cny: u32) -> Self {
        Self {
            label: label.into(),
            amount_cny,
            defaulted: false,
        }
    }

    pub fn defaulted(label: impl Into<String>, amount_cny: u32) -> Self {
        Self {
            label: label.into(),
            amount_cny,
            defaulted: true,
        }
    }
}

/// Pricing engine output: base-currency total plus the ordered log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub total_cny: u32,
    pub items: Vec<LineItem>,
}

/// Resolved settings for one quotation run.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    pub catalog_path: PathBuf,
    pub model: String,
    pub currency: Currency,
    pub stroke_mm: u32,
    pub quantity: u32,
    pub options: OptionSelection,
    /// Skip the live rate lookup and use the offline fallback table.
    pub offline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_order_is_stable() {
        assert_eq!(OptionKey::ALL[0], OptionKey::BallScrew);
        assert_eq!(OptionKey::ALL[11], OptionKey::Ctrl4);
        for (idx, key) in OptionKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), idx);
        }
    }

    #[test]
    fn selection_toggle_roundtrip() {
        let mut sel = OptionSelection::none();
        assert_eq!(sel.count(), 0);
        sel.toggle(OptionKey::Hall);
        assert!(sel.is_selected(OptionKey::Hall));
        assert!(!sel.is_selected(OptionKey::Pot));
        sel.toggle(OptionKey::Hall);
        assert_eq!(sel.count(), 0);
    }

    #[test]
    fn stroke_surcharge_within_range_is_zero() {
        let rule = StrokeRule {
            range_start: 100,
            range_end: 500,
            step_mm: 50,
            step_cost: 20,
        };
        assert_eq!(rule.surcharge(100), 0);
        assert_eq!(rule.surcharge(500), 0);
    }

    #[test]
    fn stroke_surcharge_rounds_up_partial_steps() {
        let rule = StrokeRule {
            range_start: 100,
            range_end: 500,
            step_mm: 50,
            step_cost: 20,
        };
        // 600mm = 100mm over = 2 full steps.
        assert_eq!(rule.surcharge(600), 40);
        // 510mm = 10mm over = 1 started step.
        assert_eq!(rule.surcharge(510), 20);
    }

    #[test]
    fn stroke_surcharge_is_monotone_in_stroke() {
        let rule = StrokeRule {
            range_start: 100,
            range_end: 500,
            step_mm: 50,
            step_cost: 20,
        };
        let mut last = 0;
        for stroke in (100..1500).step_by(10) {
            let s = rule.surcharge(stroke);
            assert!(s >= last, "surcharge decreased at stroke {stroke}");
            last = s;
        }
    }

    #[test]
    fn currency_cycling_wraps() {
        let mut c = Currency::Usd;
        for _ in 0..Currency::ALL.len() {
            c = c.next();
        }
        assert_eq!(c, Currency::Usd);
        assert_eq!(Currency::Usd.prev(), Currency::Aud);
    }
}
