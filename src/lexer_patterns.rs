//! # Lexer Patterns Module
//!
//! This module contains the regex patterns used to split an ingredient line into
//! quantity, unit and name. Patterns are tried in order, most specific first.

use lazy_static::lazy_static;
use regex::Regex;

use crate::unit_conversion::known_unit_tokens;

/// The shape of quantity a pattern recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// "1 1/2 cups flour"
    MixedWithUnit,
    /// "1 1/2 bananas"
    MixedNoUnit,
    /// "2-3 tbsp olive oil", "1 to 2 cups stock"
    RangeWithUnit,
    /// "2-3 carrots"
    RangeNoUnit,
    /// "2 cups flour", "0.5 cup sugar", "500g butter"
    NumberWithUnit,
    /// "1/2 tsp salt"
    FractionWithUnit,
    /// ".5 cup sugar"
    LeadingDecimalWithUnit,
    /// "1/2 onion"
    FractionNoUnit,
    /// "2 bananas"
    NumberNoUnit,
}

const MIXED: &str = r"(?P<whole>\d+)\s+(?P<num>\d+)/(?P<den>\d+)";
const RANGE: &str = r"(?P<low>\d+(?:\.\d+)?)\s*(?:-|–|to)\s*(?P<high>\d+(?:\.\d+)?)";
const NUMBER: &str = r"(?P<number>\d+(?:\.\d+)?)";
const FRACTION: &str = r"(?P<num>\d+)/(?P<den>\d+)";
const LEADING_DECIMAL: &str = r"(?P<number>0?\.\d+)";
const BARE_NUMBER: &str = r"(?P<number>\d*\.?\d+)";
const NAME: &str = r"(?P<name>.+)";

/// Vulgar fraction characters and their ASCII spelling
pub const UNICODE_FRACTIONS: [(char, &str); 15] = [
    ('½', "1/2"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅕', "1/5"),
    ('⅖', "2/5"),
    ('⅗', "3/5"),
    ('⅘', "4/5"),
    ('⅙', "1/6"),
    ('⅚', "5/6"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

fn with_unit(quantity: &str) -> String {
    format!(r"(?i)^{quantity}\s*(?P<unit>{})\.?\s+{NAME}$", *UNIT_ALTERNATION)
}

fn without_unit(quantity: &str) -> String {
    format!(r"(?i)^{quantity}\s+{NAME}$")
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Lexer pattern should be valid")
}

lazy_static! {
    /// Known unit tokens joined into one alternation, longest first
    pub static ref UNIT_ALTERNATION: String = known_unit_tokens()
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");

    /// Every lexer pattern in the order they are tried
    pub static ref ORDERED_PATTERNS: Vec<(PatternKind, Regex)> = vec![
        (PatternKind::MixedWithUnit, compile(&with_unit(MIXED))),
        (PatternKind::MixedNoUnit, compile(&without_unit(MIXED))),
        (PatternKind::RangeWithUnit, compile(&with_unit(RANGE))),
        (PatternKind::RangeNoUnit, compile(&without_unit(RANGE))),
        (PatternKind::NumberWithUnit, compile(&with_unit(NUMBER))),
        (PatternKind::FractionWithUnit, compile(&with_unit(FRACTION))),
        (PatternKind::LeadingDecimalWithUnit, compile(&with_unit(LEADING_DECIMAL))),
        (PatternKind::FractionNoUnit, compile(&without_unit(FRACTION))),
        (PatternKind::NumberNoUnit, compile(&without_unit(BARE_NUMBER))),
    ];

    /// A quantity, optionally followed by a unit, anywhere in a string
    ///
    /// Used by the name normalizer to strip fragments that leaked into a name.
    pub static ref QUANTITY_FRAGMENT: Regex = compile(&format!(
        r"(?i)(?:^|\s)(?:\d+\s+\d+/\d+|\d+(?:\.\d+)?\s*(?:-|–|to)\s*\d+(?:\.\d+)?|\d+/\d+|\d*\.?\d+)\s*(?:(?:{})\.?(?:\s|$))?",
        *UNIT_ALTERNATION
    ));
}
