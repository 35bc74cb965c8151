//! # Grocery Item Formatter
//!
//! Renders a final `(quantity, unit, name)` triple as the string shown to the
//! shopper, e.g. `"2 lbs chicken breast"`, `"1/2 tsp vanilla"`, `"3 bananas"`.
//!
//! Quantities are rounded to hundredths before anything else is decided, so a
//! formatted string parses back to a quantity that formats identically.

use crate::unit_conversion::unit_stem;

/// Cooking fractions shown instead of decimals below 1
const DISPLAY_FRACTIONS: [(f64, &str); 5] = [
    (0.25, "1/4"),
    (1.0 / 3.0, "1/3"),
    (0.5, "1/2"),
    (2.0 / 3.0, "2/3"),
    (0.75, "3/4"),
];

const FRACTION_TOLERANCE: f64 = 0.02;

/// Units that are never shown
const HIDDEN_UNITS: [&str; 3] = ["", "item", "items"];

/// Abbreviations written the same in singular and plural
const INVARIANT_UNITS: &[&str] = &[
    "tsp", "tbsp", "tbs", "oz", "fl oz", "g", "kg", "mg", "ml", "l", "pt", "qt", "gal", "pkg",
];

/// Format one grocery list entry
///
/// # Examples
///
/// ```rust
/// use groceries::formatter::format_item;
///
/// assert_eq!(format_item(1.0, "cup", "rice"), "1 cup rice");
/// assert_eq!(format_item(2.0, "lb", "chicken breast"), "2 lbs chicken breast");
/// assert_eq!(format_item(0.5, "tsp", "vanilla"), "1/2 tsp vanilla");
/// assert_eq!(format_item(1.5, "tsp", "salt"), "1.5 tsp salt");
/// assert_eq!(format_item(3.0, "", "banana"), "3 bananas");
/// ```
pub fn format_item(quantity: f64, unit: &str, name: &str) -> String {
    let amount = format_quantity(quantity);
    let singular = amount == "1";
    let unit = unit.trim();
    let name = name.trim();

    if HIDDEN_UNITS.contains(&unit.to_lowercase().as_str()) {
        let name = if quantity > 1.0 && !singular {
            pluralize_last_word(name)
        } else {
            name.to_string()
        };
        return format!("{amount} {name}");
    }

    format!("{amount} {} {name}", display_unit(unit, singular))
}

/// Render a quantity as a whole number, a cooking fraction or a short decimal
pub fn format_quantity(quantity: f64) -> String {
    let hundredths = (quantity * 100.0).round() / 100.0;

    if hundredths == hundredths.trunc() {
        return format!("{}", hundredths as i64);
    }

    if hundredths > 0.0 && hundredths < 1.0 {
        let fraction = DISPLAY_FRACTIONS
            .iter()
            .find(|(value, _)| (hundredths - value).abs() <= FRACTION_TOLERANCE);
        if let Some((_, text)) = fraction {
            return text.to_string();
        }
    }

    let decimal = format!("{hundredths:.2}");
    decimal.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn display_unit(unit: &str, singular: bool) -> String {
    let lowered = unit.to_lowercase();
    if INVARIANT_UNITS.contains(&lowered.as_str()) {
        return unit.to_string();
    }

    if singular {
        return unit_stem(unit);
    }

    if unit.ends_with('s') {
        return unit.to_string();
    }
    if ["ch", "sh", "x"].iter().any(|suffix| unit.ends_with(suffix)) {
        return format!("{unit}es");
    }
    format!("{unit}s")
}

/// Append "s" to the last word of a name
///
/// Names only ever take a plain "s" so the formatted entry normalizes back to
/// the key of the ingredients it came from. A last word that is not purely
/// alphabetic ("skinless)") is left alone.
fn pluralize_last_word(name: &str) -> String {
    let last = name.rsplit(' ').next().unwrap_or(name);
    if last.is_empty() || last.ends_with('s') || !last.chars().all(char::is_alphabetic) {
        return name.to_string();
    }
    format!("{name}s")
}
