//! # Cooking to Shopping Conversion
//!
//! Recipes describe grains and legumes as they are eaten ("2 cups cooked rice")
//! while shoppers buy them dry. This module rewrites a consolidated as-cooked
//! quantity into the raw amount to purchase.
//!
//! Conversion runs once per consolidated item, after every recipe has been
//! merged. Running it per ingredient line would round each contribution
//! separately and the errors would add up.

use lazy_static::lazy_static;
use tracing::debug;

use crate::ingredient_model::{ConsolidatedItem, ShoppingItem};
use crate::name_normalizer::normalize;
use crate::unit_conversion::{convert_between, is_volume_unit, VOLUME_BASE};

/// One as-cooked ingredient and how to buy it
#[derive(Debug, Clone, PartialEq)]
pub struct CookedRatio {
    /// Normalized as-cooked name, matched where a word starts
    pub as_cooked: &'static str,
    /// Raw amount per unit of cooked amount
    pub ratio: f64,
    /// Name printed on the shopping list
    pub shopping_name: &'static str,
}

lazy_static! {
    /// Cooked-to-raw table, more specific names first
    pub static ref COOKED_TO_RAW: Vec<CookedRatio> = vec![
        CookedRatio { as_cooked: "cooked brown rice", ratio: 1.0 / 3.0, shopping_name: "brown rice" },
        CookedRatio { as_cooked: "cooked rice", ratio: 1.0 / 3.0, shopping_name: "rice" },
        CookedRatio { as_cooked: "cooked quinoa", ratio: 1.0 / 3.0, shopping_name: "quinoa" },
        CookedRatio { as_cooked: "cooked pasta", ratio: 0.5, shopping_name: "pasta" },
        CookedRatio { as_cooked: "cooked couscous", ratio: 0.5, shopping_name: "couscous" },
        CookedRatio { as_cooked: "cooked black bean", ratio: 1.0 / 3.0, shopping_name: "dried black beans" },
        CookedRatio { as_cooked: "cooked chickpea", ratio: 1.0 / 3.0, shopping_name: "dried chickpeas" },
        CookedRatio { as_cooked: "cooked lentil", ratio: 0.4, shopping_name: "dried lentils" },
    ];
}

fn lookup(normalized_name: &str) -> Option<&'static CookedRatio> {
    COOKED_TO_RAW
        .iter()
        .find(|entry| starts_a_word(normalized_name, entry.as_cooked))
}

/// Whether `needle` occurs in `haystack` at the start of a word
///
/// "uncooked rice" contains "cooked rice" but is bought as it is.
fn starts_a_word(haystack: &str, needle: &str) -> bool {
    haystack
        .match_indices(needle)
        .any(|(start, _)| start == 0 || haystack[..start].ends_with(' '))
}

/// Rewrite a consolidated item into its as-purchased form
///
/// Volume quantities are expressed in cups before the ratio is applied. Items
/// with no table entry pass through with `converted = false`.
///
/// # Examples
///
/// ```rust
/// use groceries::ingredient_model::{ConsolidatedItem, ParsedIngredient};
/// use groceries::shopping_conversion::convert;
///
/// let parsed = ParsedIngredient::new(3.0, "cups", "cooked rice");
/// let item = ConsolidatedItem::seed(&parsed, "3 cups cooked rice");
///
/// let shopping = convert(&item);
/// assert!(shopping.converted);
/// assert_eq!(shopping.name, "rice");
/// assert_eq!(shopping.unit, "cup");
/// assert!((shopping.quantity - 1.0).abs() < 1e-9);
/// ```
pub fn convert(item: &ConsolidatedItem) -> ShoppingItem {
    let Some(entry) = lookup(&normalize(&item.display_name)) else {
        return ShoppingItem {
            quantity: item.quantity,
            unit: item.unit.clone(),
            name: item.display_name.clone(),
            converted: false,
        };
    };

    let (cooked_quantity, unit) = match convert_between(item.quantity, &item.unit, VOLUME_BASE) {
        Some(cups) if is_volume_unit(&item.unit) => (cups, VOLUME_BASE.to_string()),
        _ => (item.quantity, item.unit.clone()),
    };
    let quantity = cooked_quantity * entry.ratio;

    debug!(
        from = %item.display_name,
        to = entry.shopping_name,
        cooked = cooked_quantity,
        raw = quantity,
        unit = %unit,
        "Converted as-cooked quantity to shopping quantity"
    );

    ShoppingItem {
        quantity,
        unit,
        name: entry.shopping_name.to_string(),
        converted: true,
    }
}

/// Map a normalized as-cooked key to the normalized key of what is bought
///
/// Keys with no table entry are returned unchanged.
pub fn shopping_key(normalized_name: &str) -> String {
    match lookup(normalized_name) {
        Some(entry) => normalize(entry.shopping_name),
        None => normalized_name.to_string(),
    }
}
