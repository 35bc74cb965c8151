//! # Grocery List Generator
//!
//! Builds the grocery list for a meal plan. Two strategies are available:
//!
//! - **Service path**: all ingredient lines go to a [`ConsolidationService`],
//!   which can merge semantically ("chicken breast" + "chicken thighs").
//! - **Deterministic path**: lexer, normalizer, categorizer, consolidation,
//!   conversion, quantizer and formatter, with no network involved.
//!
//! The service path is tried first when one is configured. Any failure
//! (timeout, transport, bad status, malformed answer, open circuit) is logged
//! and the deterministic path runs instead. A [`GroceryList`] is always
//! returned.
//!
//! ## Usage
//!
//! ```rust
//! use groceries::config::GroceryConfig;
//! use groceries::grocery_list::build_grocery_list;
//! use groceries::ingredient_model::RecipeData;
//!
//! let recipes = vec![
//!     ("Rice bowl".to_string(), RecipeData::with_ingredients(["1 1/2 cups cooked rice"])),
//!     ("Stir fry".to_string(), RecipeData::with_ingredients(["1 cup cooked rice"])),
//! ];
//!
//! let build = build_grocery_list(recipes.iter().map(|(n, r)| (n, r)), &GroceryConfig::default());
//! assert_eq!(build.list["grains"], vec!["1 cup rice"]);
//! ```

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::categorizer::Category;
use crate::circuit_breaker::CircuitBreaker;
use crate::config::GroceryConfig;
use crate::consolidation::{consolidate, ConsolidatedEntry, IncompatibleMerge};
use crate::consolidation_service::{ChatConsolidationService, ConsolidationService};
use crate::errors::ServiceError;
use crate::formatter::format_item;
use crate::ingredient_model::{is_well_formed, GroceryList, RecipeData, ShoppingItem};
use crate::quantizer::quantize;
use crate::shopping_conversion::{convert, shopping_key};
use crate::unit_conversion::{add_quantities, normalize_units};

/// Which strategy produced a grocery list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSource {
    Service,
    Deterministic,
}

/// An item that absorbed more original lines than the configured threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverConsolidatedItem {
    pub category: Category,
    pub key: String,
    pub original_ingredients: Vec<String>,
}

/// An as-cooked item rewritten into what is bought
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedItem {
    pub as_cooked: String,
    pub shopping_name: String,
}

/// What happened during one build, for logs and tests
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildDiagnostics {
    pub incompatible_merges: Vec<IncompatibleMerge>,
    pub over_consolidated: Vec<OverConsolidatedItem>,
    pub converted_items: Vec<ConvertedItem>,
    pub skipped_lines: Vec<String>,
    /// Why the service path was abandoned, when it was tried and failed
    pub service_error: Option<String>,
}

/// A grocery list together with how it was made
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroceryBuild {
    pub list: GroceryList,
    pub source: ListSource,
    pub diagnostics: BuildDiagnostics,
}

/// Grocery list generator with service-first, deterministic-fallback strategy
pub struct GroceryListGenerator {
    service: Option<Arc<dyn ConsolidationService>>,
    circuit_breaker: CircuitBreaker,
    config: GroceryConfig,
}

impl GroceryListGenerator {
    /// Create a generator from configuration
    ///
    /// The chat-completions service is used when the configuration makes it
    /// usable. A service that cannot be set up is logged and left out.
    pub fn new(config: GroceryConfig) -> Self {
        let service: Option<Arc<dyn ConsolidationService>> = if config.service.is_usable() {
            match ChatConsolidationService::new(config.service.clone()) {
                Ok(service) => Some(Arc::new(service)),
                Err(e) => {
                    warn!(error = %e, "Consolidation service unavailable, using deterministic path only");
                    None
                }
            }
        } else {
            None
        };

        Self {
            service,
            circuit_breaker: CircuitBreaker::new(config.recovery.clone()),
            config,
        }
    }

    /// Create a generator around a given service
    pub fn with_service(config: GroceryConfig, service: Arc<dyn ConsolidationService>) -> Self {
        Self {
            service: Some(service),
            circuit_breaker: CircuitBreaker::new(config.recovery.clone()),
            config,
        }
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// Build the grocery list for a meal plan
    pub async fn generate<'a, I, K>(&self, recipes: I) -> GroceryList
    where
        I: IntoIterator<Item = (K, &'a RecipeData)>,
        K: AsRef<str>,
    {
        self.generate_with_report(recipes).await.list
    }

    /// Build the grocery list and report which path produced it
    pub async fn generate_with_report<'a, I, K>(&self, recipes: I) -> GroceryBuild
    where
        I: IntoIterator<Item = (K, &'a RecipeData)>,
        K: AsRef<str>,
    {
        let recipes: Vec<(K, &'a RecipeData)> = recipes.into_iter().collect();
        let lines: Vec<String> = recipes
            .iter()
            .flat_map(|(_, recipe)| recipe.ingredients.iter())
            .filter(|line| !line.trim().is_empty())
            .cloned()
            .collect();

        let mut service_error = None;
        if let Some(service) = &self.service {
            if lines.is_empty() {
                debug!("No ingredient lines, skipping consolidation service");
            } else {
                match self.try_service(service.as_ref(), &lines).await {
                    Ok(list) => {
                        return GroceryBuild {
                            list,
                            source: ListSource::Service,
                            diagnostics: BuildDiagnostics::default(),
                        };
                    }
                    Err(e) => {
                        warn!(
                            service = service.name(),
                            error = %e,
                            consecutive_failures = self.circuit_breaker.failure_count(),
                            "Consolidation service failed, falling back to deterministic path"
                        );
                        service_error = Some(e.to_string());
                    }
                }
            }
        }

        let mut build = build_grocery_list(recipes, &self.config);
        build.diagnostics.service_error = service_error;
        build
    }

    async fn try_service(
        &self,
        service: &dyn ConsolidationService,
        lines: &[String],
    ) -> Result<GroceryList, ServiceError> {
        if self.circuit_breaker.is_open() {
            return Err(ServiceError::CircuitOpen);
        }

        let timeout = self.config.service.timeout();
        let result = match tokio::time::timeout(timeout, service.consolidate(lines)).await {
            Ok(result) => result.and_then(|list| {
                if list.is_empty() || !is_well_formed(&list) {
                    Err(ServiceError::MalformedResponse(
                        "Grocery list is empty or has blank entries".to_string(),
                    ))
                } else if let Some(label) = list.keys().find(|label| !is_known_category(label)) {
                    Err(ServiceError::MalformedResponse(format!("Unknown category {label:?}")))
                } else {
                    Ok(list)
                }
            }),
            Err(_) => Err(ServiceError::Timeout(format!(
                "No answer within {}s",
                timeout.as_secs()
            ))),
        };

        match &result {
            Ok(list) => {
                self.circuit_breaker.record_success();
                info!(
                    service = service.name(),
                    categories = list.len(),
                    "Grocery list built by consolidation service"
                );
            }
            Err(e) if e.counts_as_failure() => self.circuit_breaker.record_failure(),
            Err(_) => {}
        }
        result
    }
}

fn is_known_category(label: &str) -> bool {
    Category::from_label(label).is_some_and(|category| category.as_str() == label)
}

/// Build a grocery list on the deterministic path
///
/// Consolidates every recipe, then converts, tidies, quantizes and formats each
/// consolidated item exactly once.
pub fn build_grocery_list<'a, I, K>(recipes: I, config: &GroceryConfig) -> GroceryBuild
where
    I: IntoIterator<Item = (K, &'a RecipeData)>,
    K: AsRef<str>,
{
    let consolidation = consolidate(recipes);
    let mut diagnostics = BuildDiagnostics {
        incompatible_merges: consolidation.incompatible_merges().to_vec(),
        skipped_lines: consolidation.skipped_lines().to_vec(),
        ..BuildDiagnostics::default()
    };

    for (category, entry) in consolidation.over_consolidated(config.over_consolidation_threshold) {
        warn!(
            category = %category,
            key = %entry.key,
            sources = entry.item.contribution_count(),
            threshold = config.over_consolidation_threshold,
            "Possible over-consolidation"
        );
        diagnostics.over_consolidated.push(OverConsolidatedItem {
            category,
            key: entry.key.clone(),
            original_ingredients: entry.item.original_ingredients.clone(),
        });
    }

    let mut list = GroceryList::new();
    for (category, entries) in consolidation.categories() {
        let items: Vec<String> = shopping_items(entries, &mut diagnostics.converted_items)
            .iter()
            .map(render)
            .collect();
        if !items.is_empty() {
            list.insert(category.as_str().to_string(), items);
        }
    }

    info!(
        categories = list.len(),
        items = list.values().map(Vec::len).sum::<usize>(),
        converted = diagnostics.converted_items.len(),
        "Grocery list built deterministically"
    );

    GroceryBuild {
        list,
        source: ListSource::Deterministic,
        diagnostics,
    }
}

/// Convert a category's entries, joining conversions that land on an existing purchase
fn shopping_items(entries: &[ConsolidatedEntry], converted: &mut Vec<ConvertedItem>) -> Vec<ShoppingItem> {
    let mut items: Vec<(String, ShoppingItem)> = Vec::with_capacity(entries.len());

    for entry in entries {
        let shopping = convert(&entry.item);
        if shopping.converted {
            converted.push(ConvertedItem {
                as_cooked: entry.item.display_name.clone(),
                shopping_name: shopping.name.clone(),
            });
        }

        let key = shopping_key(&entry.key);
        match items.iter_mut().find(|(existing_key, _)| *existing_key == key) {
            Some((_, existing)) => {
                let total = add_quantities(existing.quantity, &existing.unit, shopping.quantity, &shopping.unit);
                existing.quantity = total.quantity;
                existing.unit = total.unit;
                existing.converted |= shopping.converted;
            }
            None => items.push((key, shopping)),
        }
    }

    items.into_iter().map(|(_, item)| item).collect()
}

fn render(item: &ShoppingItem) -> String {
    let tidy = normalize_units(item.quantity, &item.unit);
    let purchase = quantize(tidy.quantity, &tidy.unit, &item.name);
    format_item(purchase.quantity, &purchase.unit, &item.name)
}
