//! # Consolidation Engine
//!
//! Folds every ingredient line of every recipe into one entry per
//! `(category, normalized name)`, summing quantities as it goes.
//!
//! The resulting partition does not depend on the order recipes are processed
//! in. Totals don't either, as long as each key's units share a base unit. When
//! they do not, the naive fallback addition may keep whichever unit was seen
//! first; each such merge is recorded as an [`IncompatibleMerge`].
//!
//! ## Usage
//!
//! ```rust
//! use groceries::categorizer::Category;
//! use groceries::consolidation::consolidate;
//! use groceries::ingredient_model::RecipeData;
//! use std::collections::BTreeMap;
//!
//! let mut recipes = BTreeMap::new();
//! recipes.insert("Smoothie".to_string(), RecipeData::with_ingredients(["2 bananas"]));
//! recipes.insert("Oatmeal".to_string(), RecipeData::with_ingredients(["1 banana"]));
//!
//! let consolidation = consolidate(&recipes);
//! let bananas = consolidation.get(Category::Produce, "banana").unwrap();
//! assert_eq!(bananas.quantity, 3.0);
//! ```

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use crate::categorizer::{categorize, Category};
use crate::ingredient_model::{ConsolidatedItem, RecipeData};
use crate::name_normalizer::normalize;
use crate::quantity_lexer::parse;

/// A consolidated item together with its grouping key
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedEntry {
    pub key: String,
    pub item: ConsolidatedItem,
}

/// A merge whose units had no common base and were added numerically
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncompatibleMerge {
    pub category: Category,
    pub key: String,
    pub existing_unit: String,
    pub incoming_unit: String,
    pub kept_unit: String,
}

/// Consolidated items of one grocery-list build, grouped by category
///
/// Entries within a category keep the order in which their key was first seen.
#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    categories: BTreeMap<Category, Vec<ConsolidatedEntry>>,
    index: HashMap<(Category, String), usize>,
    incompatible_merges: Vec<IncompatibleMerge>,
    skipped_lines: Vec<String>,
}

impl Consolidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one ingredient line into the consolidation
    ///
    /// Lines whose name normalizes to nothing are skipped and remembered.
    pub fn add_line(&mut self, line: &str) {
        let parsed = parse(line);
        let key = normalize(&parsed.name);
        if key.is_empty() {
            debug!(line, "Skipping line with no shopping-relevant name");
            self.skipped_lines.push(line.to_string());
            return;
        }

        let category = categorize(line);
        let entries = self.categories.entry(category).or_default();

        let Some(&position) = self.index.get(&(category, key.clone())) else {
            debug!(line, category = %category, key = %key, "New grocery item");
            self.index.insert((category, key.clone()), entries.len());
            entries.push(ConsolidatedEntry {
                key,
                item: ConsolidatedItem::seed(&parsed, line),
            });
            return;
        };

        let item = &mut entries[position].item;
        let existing_unit = item.unit.clone();
        let merge = item.absorb(&parsed, line);
        if !merge.exact {
            warn!(
                category = %category,
                key = %key,
                existing_unit = %existing_unit,
                incoming_unit = %parsed.unit,
                kept_unit = %merge.quantity.unit,
                "Incompatible units merged by plain addition"
            );
            self.incompatible_merges.push(IncompatibleMerge {
                category,
                key: key.clone(),
                existing_unit,
                incoming_unit: parsed.unit.clone(),
                kept_unit: merge.quantity.unit,
            });
        }

        debug!(
            category = %category,
            key = %key,
            quantity = item.quantity,
            unit = %item.unit,
            sources = item.contribution_count(),
            "Merged grocery item"
        );
    }

    /// Look up one consolidated item
    pub fn get(&self, category: Category, key: &str) -> Option<&ConsolidatedItem> {
        let position = self.index.get(&(category, key.to_string()))?;
        self.categories
            .get(&category)
            .and_then(|entries| entries.get(*position))
            .map(|entry| &entry.item)
    }

    /// Categories in table order, each with its entries in first-seen order
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[ConsolidatedEntry])> {
        self.categories
            .iter()
            .map(|(category, entries)| (*category, entries.as_slice()))
    }

    /// Every entry, category by category
    pub fn entries(&self) -> impl Iterator<Item = (Category, &ConsolidatedEntry)> {
        self.categories
            .iter()
            .flat_map(|(category, entries)| entries.iter().map(move |entry| (*category, entry)))
    }

    /// Number of distinct `(category, key)` entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn incompatible_merges(&self) -> &[IncompatibleMerge] {
        &self.incompatible_merges
    }

    /// Lines that were left out because they name nothing to buy
    pub fn skipped_lines(&self) -> &[String] {
        &self.skipped_lines
    }

    /// Entries that absorbed more than `threshold` original lines
    pub fn over_consolidated(&self, threshold: usize) -> Vec<(Category, &ConsolidatedEntry)> {
        self.entries()
            .filter(|(_, entry)| entry.item.contribution_count() > threshold)
            .collect()
    }
}

/// Consolidate the ingredients of every recipe in a plan
///
/// Recipes are folded in iteration order; pass an ordered collection when the
/// first-seen display names matter.
pub fn consolidate<'a, I, K>(recipes: I) -> Consolidation
where
    I: IntoIterator<Item = (K, &'a RecipeData)>,
    K: AsRef<str>,
{
    let mut consolidation = Consolidation::new();
    let mut recipe_count = 0;
    let mut line_count = 0;

    for (name, recipe) in recipes {
        recipe_count += 1;
        debug!(recipe = name.as_ref(), lines = recipe.ingredients.len(), "Consolidating recipe");
        for line in recipe.ingredients.iter().filter(|line| !line.trim().is_empty()) {
            line_count += 1;
            consolidation.add_line(line);
        }
    }

    info!(
        recipes = recipe_count,
        lines = line_count,
        items = consolidation.len(),
        skipped = consolidation.skipped_lines().len(),
        incompatible_merges = consolidation.incompatible_merges().len(),
        "Consolidated ingredients"
    );
    consolidation
}
