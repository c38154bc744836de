//! Parametric weight model.
//!
//! Maps a model identifier and stroke length to an estimated net weight
//! via a linear per-family model: `single = base_kg + stroke_mm * per_mm_kg`.

/// Per-family parameters of the linear weight model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightParams {
    pub base_kg: f64,
    pub per_mm_kg: f64,
}

/// Single-unit and batch net weight, in kilograms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightEstimate {
    pub single_kg: f64,
    pub batch_kg: f64,
}

/// Ordered family table.
///
/// Resolution scans in declaration order and the first entry whose key
/// is a substring of the model identifier wins. Family codes are
/// pairwise non-overlapping in the current catalog, so this first-match
/// precedence is a documented tie-break, not a load-bearing ordering.
const FAMILY_PARAMS: &[(&str, WeightParams)] = &[
    ("520", WeightParams { base_kg: 4.40, per_mm_kg: 0.0050 }),
    ("521", WeightParams { base_kg: 3.90, per_mm_kg: 0.0060 }),
    ("524", WeightParams { base_kg: 3.40, per_mm_kg: 0.0050 }),
    ("523", WeightParams { base_kg: 2.40, per_mm_kg: 0.0040 }),
    ("525", WeightParams { base_kg: 2.10, per_mm_kg: 0.0040 }),
    ("522", WeightParams { base_kg: 1.10, per_mm_kg: 0.0025 }),
    ("526", WeightParams { base_kg: 1.50, per_mm_kg: 0.0030 }),
    ("528", WeightParams { base_kg: 3.50, per_mm_kg: 0.0055 }),
];

/// Fallback for model identifiers matching no known family.
const DEFAULT_PARAMS: WeightParams = WeightParams {
    base_kg: 4.00,
    per_mm_kg: 0.0050,
};

/// Resolve the weight parameters for a model identifier.
///
/// Returns the matched family key ("Default" when nothing matched) so
/// callers can surface which parameter set was used.
pub fn family_params(model: &str) -> (&'static str, WeightParams) {
    for (family, params) in FAMILY_PARAMS {
        if model.contains(family) {
            return (family, *params);
        }
    }
    ("Default", DEFAULT_PARAMS)
}

/// Estimate single-unit and batch net weight.
///
/// Quantity >= 1 is the caller's responsibility (enforced at the
/// CLI/TUI boundary).
pub fn estimate(model: &str, stroke_mm: u32, quantity: u32) -> WeightEstimate {
    let (_, params) = family_params(model);
    let single_kg = params.base_kg + f64::from(stroke_mm) * params.per_mm_kg;
    WeightEstimate {
        single_kg,
        batch_kg: single_kg * f64::from(quantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn known_family_linear_model() {
        // base = 3.40, factor = 0.0050 for the 524 family.
        let est = estimate("524", 200, 3);
        assert!(close(est.single_kg, 4.40), "single = {}", est.single_kg);
        assert!(close(est.batch_kg, 13.20), "batch = {}", est.batch_kg);
    }

    #[test]
    fn family_matched_by_substring() {
        let (family, params) = family_params("JX-522B/24V");
        assert_eq!(family, "522");
        assert!(close(params.base_kg, 1.10));
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        let (family, params) = family_params("XK-900");
        assert_eq!(family, "Default");
        assert!(close(params.base_kg, 4.00));
        let est = estimate("XK-900", 100, 1);
        assert!(close(est.single_kg, 4.50));
    }

    #[test]
    fn first_declared_family_wins_on_multi_match() {
        // "524" appears first in the identifier, but "520" is declared
        // first in the table and therefore wins.
        let (family, _) = family_params("524-520-COMBO");
        assert_eq!(family, "520");
    }

    #[test]
    fn batch_weight_scales_with_quantity() {
        let one = estimate("521", 300, 1);
        let five = estimate("521", 300, 5);
        assert!(close(five.batch_kg, one.single_kg * 5.0));
    }
}
