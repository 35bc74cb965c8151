//! # Shopping Quantizer
//!
//! Rounds a consolidated, converted quantity up to an amount a shopper can
//! actually buy. Rounding always goes up: buying slightly too much beats
//! running out halfway through a recipe.
//!
//! | unit class | rule |
//! |---|---|
//! | no unit, `item(s)` | next whole number |
//! | any unit, below 0.1 | 0.25 |
//! | volume (cup, tbsp, tsp, ...) | next quarter of the item's own unit |
//! | lb / oz | next quarter pound below 1 lb, next half pound above |
//! | anything else | next hundredth |

use tracing::trace;

use crate::ingredient_model::NormalizedQuantity;
use crate::unit_conversion::{convert_between, is_volume_unit, WEIGHT_BASE};

/// Smallest amount worth putting on a list
pub const MINIMUM_PURCHASE: f64 = 0.25;

/// Quantities below this are bumped to [`MINIMUM_PURCHASE`]
const MINIMUM_THRESHOLD: f64 = 0.1;

/// Tolerance for treating a quantity as already sitting on a step
const STEP_EPSILON: f64 = 1e-9;

const UNITLESS: [&str; 3] = ["", "item", "items"];

const POUND_FAMILY: [&str; 7] = ["lb", "lbs", "pound", "pounds", "oz", "ounce", "ounces"];

/// Round a quantity up to a purchasable amount
///
/// The unit is never changed. `name` is only used for tracing.
///
/// # Examples
///
/// ```rust
/// use groceries::quantizer::quantize;
///
/// assert_eq!(quantize(2.3, "", "bananas").quantity, 3.0);
/// assert_eq!(quantize(0.83, "cup", "rice").quantity, 1.0);
/// assert_eq!(quantize(0.3, "lb", "ground beef").quantity, 0.5);
/// assert_eq!(quantize(1.2, "lb", "chicken breast").quantity, 1.5);
/// ```
pub fn quantize(quantity: f64, unit: &str, name: &str) -> NormalizedQuantity {
    let lowered = unit.trim().to_lowercase();

    let rounded = if UNITLESS.contains(&lowered.as_str()) {
        ceil_to_step(quantity, 1.0)
    } else if quantity < MINIMUM_THRESHOLD {
        MINIMUM_PURCHASE
    } else if is_volume_unit(&lowered) {
        ceil_to_step(quantity, 0.25)
    } else if POUND_FAMILY.contains(&lowered.as_str()) {
        round_weight(quantity, &lowered)
    } else {
        ceil_to_step(quantity, 0.01)
    };

    trace!(name, unit, from = quantity, to = rounded, "Quantized shopping amount");
    NormalizedQuantity::new(rounded, unit)
}

/// Round in pound-equivalents and express the result back in `unit`
fn round_weight(quantity: f64, unit: &str) -> f64 {
    let Some(pounds) = convert_between(quantity, unit, WEIGHT_BASE) else {
        return ceil_to_step(quantity, 0.01);
    };

    let step = if pounds < 1.0 { 0.25 } else { 0.5 };
    let rounded_pounds = ceil_to_step(pounds, step);

    convert_between(rounded_pounds, WEIGHT_BASE, unit).unwrap_or(rounded_pounds)
}

/// Smallest multiple of `step` that is not below `value`
///
/// Values within floating-point noise of a multiple are returned unchanged.
fn ceil_to_step(value: f64, step: f64) -> f64 {
    let steps = value / step;
    if (steps - steps.round()).abs() < STEP_EPSILON {
        value
    } else {
        steps.ceil() * step
    }
}
