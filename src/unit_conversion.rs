//! # Unit Conversion Module
//!
//! Static unit tables and the merge arithmetic used when the same ingredient
//! shows up in several recipes.
//!
//! Volume units convert to **cup** and weight units convert to **lb**. Two
//! quantities whose units share a base are summed exactly in that base. Anything
//! else (a count against a weight, a can against a cup) is summed numerically
//! under a preferred unit, which is an approximation and is reported as such.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::ingredient_model::NormalizedQuantity;

/// Base unit for volume measures
pub const VOLUME_BASE: &str = "cup";

/// Base unit for weight measures
pub const WEIGHT_BASE: &str = "lb";

/// Fractions a cup quantity is snapped to, paired with the value that triggers them
const COMMON_CUP_FRACTIONS: [(f64, f64); 5] = [
    (0.25, 0.25),
    (0.33, 1.0 / 3.0),
    (0.5, 0.5),
    (0.67, 2.0 / 3.0),
    (0.75, 0.75),
];

const SNAP_TOLERANCE: f64 = 0.02;

/// Volume units expressed in cups
static VOLUME_TO_CUP: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert("cup", 1.0);
    map.insert("cups", 1.0);
    map.insert("tablespoon", 1.0 / 16.0);
    map.insert("tablespoons", 1.0 / 16.0);
    map.insert("tbsp", 1.0 / 16.0);
    map.insert("tbs", 1.0 / 16.0);
    map.insert("teaspoon", 1.0 / 48.0);
    map.insert("teaspoons", 1.0 / 48.0);
    map.insert("tsp", 1.0 / 48.0);
    map.insert("fl oz", 1.0 / 8.0);
    map.insert("fluid ounce", 1.0 / 8.0);
    map.insert("fluid ounces", 1.0 / 8.0);
    map.insert("pint", 2.0);
    map.insert("pints", 2.0);
    map.insert("pt", 2.0);
    map.insert("quart", 4.0);
    map.insert("quarts", 4.0);
    map.insert("qt", 4.0);
    map.insert("gallon", 16.0);
    map.insert("gallons", 16.0);
    map.insert("gal", 16.0);
    map.insert("ml", 1.0 / 236.588);
    map.insert("milliliter", 1.0 / 236.588);
    map.insert("milliliters", 1.0 / 236.588);
    map.insert("millilitre", 1.0 / 236.588);
    map.insert("millilitres", 1.0 / 236.588);
    map.insert("l", 4.22675);
    map.insert("liter", 4.22675);
    map.insert("liters", 4.22675);
    map.insert("litre", 4.22675);
    map.insert("litres", 4.22675);

    map
});

/// Weight units expressed in pounds
static WEIGHT_TO_LB: LazyLock<HashMap<&'static str, f64>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    map.insert("lb", 1.0);
    map.insert("lbs", 1.0);
    map.insert("pound", 1.0);
    map.insert("pounds", 1.0);
    map.insert("oz", 1.0 / 16.0);
    map.insert("ounce", 1.0 / 16.0);
    map.insert("ounces", 1.0 / 16.0);
    map.insert("g", 1.0 / 453.6);
    map.insert("gram", 1.0 / 453.6);
    map.insert("grams", 1.0 / 453.6);
    map.insert("kg", 1000.0 / 453.6);
    map.insert("kilogram", 1000.0 / 453.6);
    map.insert("kilograms", 1000.0 / 453.6);
    map.insert("mg", 1.0 / 453_600.0);

    map
});

/// Units that only count things and are interchangeable with no unit at all
const COUNT_UNITS: [&str; 7] = ["", "item", "items", "piece", "pieces", "whole", "each"];

/// Package and portion units recognized by the lexer but not convertible
pub const PACKAGE_UNITS: &[&str] = &[
    "can", "cans", "clove", "cloves", "slice", "slices", "pinch", "pinches", "dash",
    "dashes", "package", "packages", "pkg", "bunch", "bunches", "head", "heads", "stalk",
    "stalks", "sprig", "sprigs", "stick", "sticks", "jar", "jars", "bottle", "bottles",
    "bag", "bags", "box", "boxes", "container", "containers", "handful", "handfuls",
    "piece", "pieces", "item", "items", "fillet", "fillets", "scoop", "scoops",
];

/// Coarse classification of a unit token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    /// Convertible to cups
    Volume,
    /// Convertible to pounds
    Weight,
    /// No unit, or a plain count ("item", "pieces")
    Count,
    /// Any other token (cans, cloves, pinches, unknown words)
    Other,
}

/// Result of merging two quantities
#[derive(Debug, Clone, PartialEq)]
pub struct Merge {
    pub quantity: NormalizedQuantity,

    /// `false` when the units were incompatible and the sum is a plain numeric addition
    pub exact: bool,
}

/// Classify a unit token
pub fn unit_class(unit: &str) -> UnitClass {
    let unit = unit.trim().to_lowercase();

    if VOLUME_TO_CUP.contains_key(unit.as_str()) {
        UnitClass::Volume
    } else if WEIGHT_TO_LB.contains_key(unit.as_str()) {
        UnitClass::Weight
    } else if COUNT_UNITS.contains(&unit.as_str()) {
        UnitClass::Count
    } else {
        UnitClass::Other
    }
}

pub fn is_volume_unit(unit: &str) -> bool {
    unit_class(unit) == UnitClass::Volume
}

/// Check whether a unit denotes plain countable items
pub fn is_countable_unit(unit: &str) -> bool {
    unit_class(unit) == UnitClass::Count
}

/// Every unit token the lexer should accept, longest first
pub fn known_unit_tokens() -> Vec<&'static str> {
    let mut tokens: Vec<&'static str> = VOLUME_TO_CUP
        .keys()
        .chain(WEIGHT_TO_LB.keys())
        .chain(PACKAGE_UNITS.iter())
        .copied()
        .collect();

    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    tokens.dedup();
    tokens
}

/// Express a quantity in its base unit, if the unit is convertible
pub fn to_base(quantity: f64, unit: &str) -> Option<NormalizedQuantity> {
    let unit = unit.trim().to_lowercase();

    if let Some(factor) = VOLUME_TO_CUP.get(unit.as_str()) {
        return Some(NormalizedQuantity::new(quantity * factor, VOLUME_BASE));
    }
    if let Some(factor) = WEIGHT_TO_LB.get(unit.as_str()) {
        return Some(NormalizedQuantity::new(quantity * factor, WEIGHT_BASE));
    }
    None
}

/// Convert a quantity between two units of the same system
pub fn convert_between(quantity: f64, from: &str, to: &str) -> Option<f64> {
    let from_base = to_base(quantity, from)?;
    let per_target = to_base(1.0, to)?;

    if from_base.unit != per_target.unit {
        return None;
    }
    Some(from_base.quantity / per_target.quantity)
}

/// Singular stem of a unit token, used to compare "cans" with "can"
pub fn unit_stem(unit: &str) -> String {
    let unit = unit.trim().to_lowercase();

    for suffix in ["ches", "shes", "xes"] {
        if unit.ends_with(suffix) {
            return unit[..unit.len() - 2].to_string();
        }
    }
    if unit.len() > 1 && unit.ends_with('s') && !unit.ends_with("ss") {
        return unit[..unit.len() - 1].to_string();
    }
    unit
}

/// Merge two quantities, reporting whether the result is exact
///
/// Compatible units are summed in their shared base unit. Identical (or
/// singular/plural) non-convertible units and plain counts are summed as-is.
/// Everything else falls back to numeric addition under [`preferred_unit`].
pub fn merge_quantities(q1: f64, u1: &str, q2: f64, u2: &str) -> Merge {
    if let (Some(a), Some(b)) = (to_base(q1, u1), to_base(q2, u2)) {
        if a.unit == b.unit {
            return Merge {
                quantity: NormalizedQuantity::new(a.quantity + b.quantity, &a.unit),
                exact: true,
            };
        }
    }

    if is_countable_unit(u1) && is_countable_unit(u2) {
        let unit = if u1 == u2 { u1 } else { "" };
        return Merge {
            quantity: NormalizedQuantity::new(q1 + q2, unit),
            exact: true,
        };
    }

    if u1 == u2 {
        return Merge {
            quantity: NormalizedQuantity::new(q1 + q2, u1),
            exact: true,
        };
    }

    if unit_class(u1) == UnitClass::Other && unit_stem(u1) == unit_stem(u2) {
        return Merge {
            quantity: NormalizedQuantity::new(q1 + q2, &unit_stem(u1)),
            exact: true,
        };
    }

    Merge {
        quantity: NormalizedQuantity::new(q1 + q2, preferred_unit(u1, u2)),
        exact: false,
    }
}

/// Add two quantities, converting through base units where possible
///
/// Incompatible units are summed naively; that approximation is logged.
pub fn add_quantities(q1: f64, u1: &str, q2: f64, u2: &str) -> NormalizedQuantity {
    let merge = merge_quantities(q1, u1, q2, u2);

    if merge.exact {
        debug!(
            left = q1, left_unit = u1, right = q2, right_unit = u2,
            total = merge.quantity.quantity, unit = %merge.quantity.unit,
            "Merged quantities"
        );
    } else {
        warn!(
            left = q1, left_unit = u1, right = q2, right_unit = u2,
            unit = %merge.quantity.unit,
            "Incompatible units, falling back to numeric addition"
        );
    }
    merge.quantity
}

/// Pick the unit a naive addition is expressed in
///
/// Volume beats weight, weight beats other named units, and any named unit
/// beats a bare count. Within a class the coarser unit wins. On a tie the
/// first (earlier seen) unit is kept.
pub fn preferred_unit<'a>(u1: &'a str, u2: &'a str) -> &'a str {
    match preference_rank(u2).partial_cmp(&preference_rank(u1)) {
        Some(Ordering::Greater) => u2,
        _ => u1,
    }
}

fn preference_rank(unit: &str) -> (u8, f64) {
    let class_rank = match unit_class(unit) {
        UnitClass::Volume => 3,
        UnitClass::Weight => 2,
        UnitClass::Other => 1,
        UnitClass::Count => 0,
    };
    let coarseness = to_base(1.0, unit).map(|base| base.quantity).unwrap_or(0.0);
    (class_rank, coarseness)
}

/// Tidy a cup quantity before rounding
///
/// Amounts under a quarter cup are re-expressed in tablespoons, or teaspoons
/// when less than one tablespoon. Larger amounts have their fractional part
/// snapped to the nearest common cooking fraction when within 0.02.
/// Other units pass through unchanged.
pub fn normalize_units(quantity: f64, unit: &str) -> NormalizedQuantity {
    let lowered = unit.trim().to_lowercase();
    if lowered != "cup" && lowered != "cups" {
        return NormalizedQuantity::new(quantity, unit);
    }

    if quantity < 0.25 {
        let tablespoons = quantity * 16.0;
        if tablespoons < 1.0 {
            return NormalizedQuantity::new(quantity * 48.0, "tsp");
        }
        return NormalizedQuantity::new(tablespoons, "tbsp");
    }

    let whole = quantity.floor();
    let fraction = quantity - whole;
    for (trigger, exact) in COMMON_CUP_FRACTIONS {
        if (fraction - trigger).abs() <= SNAP_TOLERANCE {
            debug!(from = quantity, to = whole + exact, "Snapped cup quantity");
            return NormalizedQuantity::new(whole + exact, unit);
        }
    }

    NormalizedQuantity::new(quantity, unit)
}
