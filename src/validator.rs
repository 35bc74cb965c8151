//! # Consistency Validator
//!
//! Checks that a grocery list covers every ingredient of the recipes it was
//! built from. Recipe lines and grocery entries go through the same name
//! normalizer, and as-cooked recipe names are mapped to what is bought, so
//! "1 cup cooked rice" is covered by "1 cup rice".
//!
//! The report is a diagnostic. Nothing here blocks a grocery list from being
//! returned.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::ingredient_model::{GroceryList, RecipeData};
use crate::name_normalizer::normalize;
use crate::quantity_lexer::parse_all;
use crate::shopping_conversion::shopping_key;

/// Coverage of a grocery list against its recipes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Normalized purchase name of every recipe ingredient
    pub all_recipe_ingredients: BTreeSet<String>,
    /// Normalized name of every grocery list entry
    pub grocery_ingredients: BTreeSet<String>,
    /// Recipe ingredients that no grocery entry accounts for
    pub missing_ingredients: BTreeSet<String>,
}

impl ValidationReport {
    pub fn is_complete(&self) -> bool {
        self.missing_ingredients.is_empty()
    }

    /// Share of recipe ingredients present in the list, 1.0 for an empty plan
    pub fn coverage(&self) -> f64 {
        if self.all_recipe_ingredients.is_empty() {
            return 1.0;
        }
        let covered = self.all_recipe_ingredients.len() - self.missing_ingredients.len();
        covered as f64 / self.all_recipe_ingredients.len() as f64
    }
}

/// Compare the recipes of a plan with the grocery list built for it
///
/// # Examples
///
/// ```rust
/// use groceries::ingredient_model::{GroceryList, RecipeData};
/// use groceries::validator::validate;
///
/// let recipe = RecipeData::with_ingredients(["2 bananas", "1 cup cooked rice"]);
/// let mut list = GroceryList::new();
/// list.insert("produce".to_string(), vec!["2 bananas".to_string()]);
///
/// let report = validate([("Breakfast", &recipe)], &list);
/// assert!(report.missing_ingredients.contains("rice"));
/// assert!(!report.is_complete());
/// ```
pub fn validate<'a, I, K>(recipes: I, grocery_list: &GroceryList) -> ValidationReport
where
    I: IntoIterator<Item = (K, &'a RecipeData)>,
    K: AsRef<str>,
{
    let all_recipe_ingredients: BTreeSet<String> = recipes
        .into_iter()
        .flat_map(|(_, recipe)| parse_all(&recipe.ingredients))
        .map(|parsed| normalize(&parsed.name))
        .filter(|key| !key.is_empty())
        .map(|key| shopping_key(&key))
        .collect();

    let grocery_ingredients: BTreeSet<String> = grocery_list
        .values()
        .flatten()
        .map(|entry| normalize(entry))
        .filter(|key| !key.is_empty())
        .collect();

    let missing_ingredients: BTreeSet<String> = all_recipe_ingredients
        .difference(&grocery_ingredients)
        .cloned()
        .collect();

    if missing_ingredients.is_empty() {
        debug!(
            ingredients = all_recipe_ingredients.len(),
            "Grocery list covers every recipe ingredient"
        );
    } else {
        warn!(
            missing = ?missing_ingredients,
            covered = all_recipe_ingredients.len() - missing_ingredients.len(),
            total = all_recipe_ingredients.len(),
            "Grocery list is missing recipe ingredients"
        );
    }

    ValidationReport {
        all_recipe_ingredients,
        grocery_ingredients,
        missing_ingredients,
    }
}
