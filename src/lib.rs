//! # Groceries
//!
//! Turns the recipes of a meal plan into one consolidated grocery list.
//!
//! Ingredient lines are lexed into quantity, unit and name, grouped by a
//! normalized name and a shopping category, and summed across recipes. Each
//! consolidated item is then converted from as-cooked to as-purchased, rounded
//! up to a buyable amount and rendered as a display string. A language-model
//! service can be put in front of that pipeline; the pipeline stays the
//! fallback when the service fails.

pub mod categorizer;
pub mod circuit_breaker;
pub mod config;
pub mod consolidation;
pub mod consolidation_service;
pub mod errors;
pub mod formatter;
pub mod grocery_list;
pub mod ingredient_model;
pub mod lexer_patterns;
pub mod name_normalizer;
pub mod quantity_lexer;
pub mod quantizer;
pub mod shopping_conversion;
pub mod unit_conversion;
pub mod validator;
