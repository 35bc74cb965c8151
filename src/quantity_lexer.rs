//! # Quantity Lexer
//!
//! This module splits a free-text ingredient line into quantity, unit and name.
//!
//! ## Features
//!
//! - Mixed numbers (`1 1/2 cups`), fractions (`1/2 tsp`), decimals (`0.5 cup`, `.5 cup`)
//! - Ranges (`2-3 tbsp`, `1 to 2 cups`), read as their upper bound
//! - Unicode vulgar fractions (`1½ cups`, `¾ cup`)
//! - Count-only lines without a unit (`2 bananas`)
//! - Never fails: a line with no readable quantity becomes quantity 1, no unit
//!
//! ## Usage
//!
//! ```rust
//! use groceries::quantity_lexer::parse;
//!
//! let parsed = parse("1 1/2 cups cooked rice");
//! assert_eq!(parsed.quantity, 1.5);
//! assert_eq!(parsed.unit, "cups");
//! assert_eq!(parsed.name, "cooked rice");
//! ```

use regex::Captures;
use tracing::trace;

use crate::ingredient_model::ParsedIngredient;
use crate::lexer_patterns::{PatternKind, ORDERED_PATTERNS, UNICODE_FRACTIONS};

/// Parse one ingredient line
///
/// The first pattern that both matches and yields a finite quantity wins. Unit
/// tokens are lower-cased; the name is returned as written, trimmed.
pub fn parse(text: &str) -> ParsedIngredient {
    let line = expand_unicode_fractions(text.trim());

    for (kind, pattern) in ORDERED_PATTERNS.iter() {
        let Some(captures) = pattern.captures(&line) else {
            continue;
        };
        let Some(quantity) = quantity_from(*kind, &captures) else {
            trace!(line = %line, kind = ?kind, "Pattern matched but quantity was unusable");
            continue;
        };

        let unit = captures.name("unit").map(|m| m.as_str()).unwrap_or("");
        let name = captures.name("name").map(|m| m.as_str().trim()).unwrap_or("");
        trace!(line = %line, kind = ?kind, quantity, unit, name, "Lexed ingredient line");

        return ParsedIngredient::new(quantity, unit, name);
    }

    trace!(line = %line, "No quantity found, defaulting to 1");
    ParsedIngredient::new(1.0, "", &line)
}

/// Parse every non-blank line of a recipe's ingredient list
pub fn parse_all<S: AsRef<str>>(lines: &[S]) -> Vec<ParsedIngredient> {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty())
        .map(parse)
        .collect()
}

fn quantity_from(kind: PatternKind, captures: &Captures<'_>) -> Option<f64> {
    let number = |name: &str| -> Option<f64> { captures.name(name)?.as_str().parse().ok() };

    let quantity = match kind {
        PatternKind::MixedWithUnit | PatternKind::MixedNoUnit => {
            number("whole")? + fraction(number("num")?, number("den")?)?
        }
        PatternKind::RangeWithUnit | PatternKind::RangeNoUnit => {
            number("low")?.max(number("high")?)
        }
        PatternKind::FractionWithUnit | PatternKind::FractionNoUnit => {
            fraction(number("num")?, number("den")?)?
        }
        PatternKind::NumberWithUnit
        | PatternKind::LeadingDecimalWithUnit
        | PatternKind::NumberNoUnit => number("number")?,
    };

    quantity.is_finite().then_some(quantity)
}

fn fraction(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Rewrite vulgar fraction characters as ASCII fractions
///
/// A fraction glued to a whole number becomes a mixed number: `1½` → `1 1/2`.
fn expand_unicode_fractions(text: &str) -> String {
    let mut expanded = String::with_capacity(text.len() + 4);

    for c in text.chars() {
        if c == '⁄' {
            expanded.push('/');
            continue;
        }
        match UNICODE_FRACTIONS.iter().find(|(glyph, _)| *glyph == c) {
            Some((_, ascii)) => {
                if expanded.chars().last().is_some_and(|prev| prev.is_ascii_digit()) {
                    expanded.push(' ');
                }
                expanded.push_str(ascii);
            }
            None => expanded.push(c),
        }
    }

    expanded
}
