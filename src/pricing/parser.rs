//! Pattern extraction of price components from catalog descriptions.
//!
//! Catalog rows carry pricing terms embedded in a semi-structured
//! Chinese template ("单价:1000 行程100-500 每加行程50毫米加20元 ...").
//! This module compiles the marker patterns once and extracts them into
//! the `PriceTerms` schema. An absent marker is not an error: the
//! corresponding field is simply `None` and contributes nothing.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{OPTION_COUNT, OptionKey, PriceTerms, StrokeRule};

/// Base unit price marker, e.g. "单价:1000" (half- or full-width colon).
const BASE_PRICE_PATTERN: &str = r"单价[:：]?\s*(\d+)";

/// Stroke-increment rule, e.g. "行程100-500 ... 每加行程50毫米加20元".
const STROKE_RULE_PATTERN: &str = r"行程(\d+)-(\d+).*?每加行程(\d+)毫米加(\d+)元";

/// Key-specific surcharge markers, in `OptionKey` declaration order.
const OPTION_PATTERNS: [&str; OPTION_COUNT] = [
    r"滚珠丝杆.*?加(\d+)元",
    r"鱼眼.*?加(\d+)元",
    r"后接头加底板.*?加(\d+)元",
    r"前接头.*?加顶板.*?加(\d+)元",
    r"开槽和孔径.*?(\d+)元",
    r"加霍尔.*?加(\d+)元",
    r"通讯.*?加(\d+)元",
    r"电位器.*?加(\d+)元",
    r"单控.*?(\d+)元",
    r"二同步.*?(\d+)元",
    r"三同步.*?(\d+)元",
    r"四同步.*?(\d+)元",
];

struct Patterns {
    base_price: Regex,
    stroke_rule: Regex,
    options: Vec<Regex>,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        base_price: Regex::new(BASE_PRICE_PATTERN).expect("base price pattern"),
        stroke_rule: Regex::new(STROKE_RULE_PATTERN).expect("stroke rule pattern"),
        options: OPTION_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("option pattern"))
            .collect(),
    })
}

/// Parsed terms plus any data-integrity warnings found along the way.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub terms: PriceTerms,
    /// Human-readable notes about terms that were present but unusable
    /// (e.g. a zero-length stroke increment). These surface in the
    /// report; they never abort a quotation.
    pub warnings: Vec<String>,
}

/// Extract all priced components from one description string.
pub fn parse_description(desc: &str) -> ParseOutcome {
    let pats = patterns();
    let mut terms = PriceTerms::default();
    let mut warnings = Vec::new();

    if let Some(caps) = pats.base_price.captures(desc) {
        terms.base_price = capture_u32(&caps, 1);
    }

    if let Some(caps) = pats.stroke_rule.captures(desc) {
        match parse_stroke_rule(&caps) {
            Ok(rule) => terms.stroke_rule = Some(rule),
            Err(msg) => warnings.push(msg),
        }
    }

    for key in OptionKey::ALL {
        if let Some(caps) = pats.options[key.index()].captures(desc) {
            terms.option_amounts[key.index()] = capture_u32(&caps, 1);
        }
    }

    ParseOutcome { terms, warnings }
}

fn parse_stroke_rule(caps: &regex::Captures<'_>) -> Result<StrokeRule, String> {
    let range_start = capture_u32(caps, 1).ok_or("stroke range start out of range")?;
    let range_end = capture_u32(caps, 2).ok_or("stroke range end out of range")?;
    let step_mm = capture_u32(caps, 3).ok_or("stroke increment length out of range")?;
    let step_cost = capture_u32(caps, 4).ok_or("stroke increment cost out of range")?;

    // A zero increment length would divide by zero in the surcharge
    // formula. The rule is dropped and flagged; the quotation then
    // behaves as if no increment pricing applies.
    if step_mm == 0 {
        return Err(format!(
            "stroke rule {range_start}-{range_end} has a zero increment length; rule ignored"
        ));
    }

    Ok(StrokeRule {
        range_start,
        range_end,
        step_mm,
        step_cost,
    })
}

/// Parse a `(\d+)` capture, treating numbers beyond `u32` as absent.
fn capture_u32(caps: &regex::Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_DESC: &str = "1:单价:1000 2:行程100-500 每加行程50毫米加20元 \
        3:滚珠丝杆升级加350元 4:鱼眼接头加25元 5:后接头加底板加30元 \
        6:前接头上加顶板加35元 7:开槽和孔径定制100元 8:加霍尔感应加45元 \
        9:通讯协议RS485加120元 10:电位器反馈加60元 \
        11:单控控制器150元 12:二同步控制器400元 13:三同步控制器700元 14:四同步控制器1000元";

    #[test]
    fn extracts_base_price() {
        let out = parse_description("单价:1000 其他说明");
        assert_eq!(out.terms.base_price, Some(1000));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn accepts_full_width_colon_and_spacing() {
        assert_eq!(parse_description("单价： 780").terms.base_price, Some(780));
        assert_eq!(parse_description("单价880").terms.base_price, Some(880));
    }

    #[test]
    fn missing_base_price_is_none() {
        let out = parse_description("行程100-500 每加行程50毫米加20元");
        assert_eq!(out.terms.base_price, None);
    }

    #[test]
    fn extracts_stroke_rule() {
        let out = parse_description("行程100-500 每加行程50毫米加20元");
        assert_eq!(
            out.terms.stroke_rule,
            Some(StrokeRule {
                range_start: 100,
                range_end: 500,
                step_mm: 50,
                step_cost: 20,
            })
        );
    }

    #[test]
    fn zero_step_stroke_rule_is_dropped_with_warning() {
        let out = parse_description("行程100-500 每加行程0毫米加20元");
        assert_eq!(out.terms.stroke_rule, None);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("zero increment length"));
    }

    #[test]
    fn extracts_all_option_surcharges() {
        let out = parse_description(FULL_DESC);
        let t = &out.terms;
        assert_eq!(t.option_amount(OptionKey::BallScrew), Some(350));
        assert_eq!(t.option_amount(OptionKey::Fisheye), Some(25));
        assert_eq!(t.option_amount(OptionKey::RearPlate), Some(30));
        assert_eq!(t.option_amount(OptionKey::FrontPlate), Some(35));
        assert_eq!(t.option_amount(OptionKey::Machining), Some(100));
        assert_eq!(t.option_amount(OptionKey::Hall), Some(45));
        assert_eq!(t.option_amount(OptionKey::Comm), Some(120));
        assert_eq!(t.option_amount(OptionKey::Pot), Some(60));
        assert_eq!(t.option_amount(OptionKey::Ctrl1), Some(150));
        assert_eq!(t.option_amount(OptionKey::Ctrl2), Some(400));
        assert_eq!(t.option_amount(OptionKey::Ctrl3), Some(700));
        assert_eq!(t.option_amount(OptionKey::Ctrl4), Some(1000));
    }

    #[test]
    fn absent_option_markers_stay_none() {
        let out = parse_description("单价:500");
        for key in OptionKey::ALL {
            assert_eq!(out.terms.option_amount(key), None, "{key:?}");
        }
    }

    #[test]
    fn empty_description_parses_to_empty_terms() {
        let out = parse_description("");
        assert_eq!(out.terms, PriceTerms::default());
        assert!(out.warnings.is_empty());
    }
}
