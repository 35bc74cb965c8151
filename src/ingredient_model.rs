//! # Ingredient and Grocery Data Model
//!
//! This module defines the data structures that flow through the grocery-list
//! pipeline, from a single lexed ingredient line to the final display-ready list.
//!
//! ## Core Concepts
//!
//! - **ParsedIngredient**: `(quantity, unit, name)` lexed from one ingredient line
//! - **NormalizedQuantity**: a quantity expressed in a (possibly converted) unit
//! - **ConsolidatedItem**: one purchase entry accumulated across all recipes
//! - **ShoppingItem**: a consolidated item after cooking-to-shopping conversion
//! - **RecipeData**: one meal's recipe as handed over by the meal planner
//! - **GroceryList**: category name mapped to display strings
//!
//! ## Usage
//!
//! ```rust
//! use groceries::ingredient_model::{ConsolidatedItem, ParsedIngredient};
//!
//! let parsed = ParsedIngredient::new(2.0, "", "bananas");
//! let mut item = ConsolidatedItem::seed(&parsed, "2 bananas");
//! let merge = item.absorb(&ParsedIngredient::new(1.0, "", "banana"), "1 banana");
//!
//! assert!(merge.exact);
//! assert_eq!(item.quantity, 3.0);
//! assert_eq!(item.original_ingredients.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::unit_conversion::{merge_quantities, Merge};

/// Final grocery list: category name to ordered display strings
///
/// Within a category, entries keep the first-seen order of their normalized
/// ingredient.
pub type GroceryList = BTreeMap<String, Vec<String>>;

/// One ingredient line split into quantity, unit and raw name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// Numeric amount; 1.0 when the line carries no parseable quantity
    pub quantity: f64,

    /// Lower-cased unit token as written, empty when absent
    pub unit: String,

    /// Remainder of the line, not yet normalized
    pub name: String,
}

/// A quantity paired with the unit it is expressed in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuantity {
    pub quantity: f64,
    pub unit: String,
}

/// A purchase entry accumulated across every recipe of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedItem {
    /// Running total, in `unit`
    pub quantity: f64,

    /// Unit of the running total (a base unit once a conversion merge happened)
    pub unit: String,

    /// Name of the first ingredient line that seeded this entry
    pub display_name: String,

    /// Every original line that contributed, in the order they were folded in
    pub original_ingredients: Vec<String>,
}

/// A consolidated item rewritten into its as-purchased form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub quantity: f64,
    pub unit: String,
    pub name: String,

    /// Whether a cooked-to-raw ratio was applied
    pub converted: bool,
}

/// Recipe data supplied by the meal-plan collaborator
///
/// Only `ingredients` is read by this crate; the nutrition fields are carried so
/// the plan payload deserializes as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeData {
    pub ingredients: Vec<String>,
    pub servings: f64,
    pub calories_per_serving: f64,
    pub protein_per_serving: f64,
    pub carbs_per_serving: f64,
    pub fat_per_serving: f64,
    pub fiber_per_serving: f64,
}

impl ParsedIngredient {
    /// Create a parsed ingredient; the unit is lower-cased
    pub fn new(quantity: f64, unit: &str, name: &str) -> Self {
        Self {
            quantity,
            unit: unit.to_lowercase(),
            name: name.to_string(),
        }
    }

}

impl NormalizedQuantity {
    pub fn new(quantity: f64, unit: &str) -> Self {
        Self {
            quantity,
            unit: unit.to_string(),
        }
    }
}

impl ConsolidatedItem {
    /// Start a new entry from the first occurrence of an ingredient
    pub fn seed(parsed: &ParsedIngredient, original: &str) -> Self {
        Self {
            quantity: parsed.quantity,
            unit: parsed.unit.clone(),
            display_name: parsed.name.trim().to_string(),
            original_ingredients: vec![original.to_string()],
        }
    }

    /// Add another occurrence of the same ingredient to the running total
    ///
    /// The display name and the order of earlier contributions are kept. The
    /// returned [`Merge`] tells whether the units could be added exactly.
    pub fn absorb(&mut self, parsed: &ParsedIngredient, original: &str) -> Merge {
        let merge = merge_quantities(self.quantity, &self.unit, parsed.quantity, &parsed.unit);
        self.quantity = merge.quantity.quantity;
        self.unit = merge.quantity.unit.clone();
        self.original_ingredients.push(original.to_string());
        merge
    }

    /// Number of original lines folded into this entry
    pub fn contribution_count(&self) -> usize {
        self.original_ingredients.len()
    }
}

impl RecipeData {
    /// Create recipe data carrying only an ingredient list
    pub fn with_ingredients<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// Check the output contract every grocery list must satisfy
///
/// Category keys are non-empty and map to non-empty lists of non-blank strings.
pub fn is_well_formed(list: &GroceryList) -> bool {
    list.iter().all(|(category, items)| {
        !category.trim().is_empty()
            && !items.is_empty()
            && items.iter().all(|item| !item.trim().is_empty())
    })
}

impl fmt::Display for ParsedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} {}", self.quantity, self.name)
        } else {
            write!(f, "{} {} {}", self.quantity, self.unit, self.name)
        }
    }
}

impl fmt::Display for ConsolidatedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({} sources)",
            self.quantity,
            self.unit,
            self.display_name,
            self.contribution_count()
        )
    }
}
