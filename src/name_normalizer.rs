//! # Name Normalizer
//!
//! Turns a raw ingredient name (or a whole ingredient line) into the key used to
//! group purchases across recipes.
//!
//! Normalization is conservative. Preparation and cosmetic descriptors are
//! removed ("fresh", "diced", "extra-virgin"), but words that change what is
//! bought are kept, so "brown rice" and "rice" stay separate entries.
//!
//! Singularization only drops a trailing "s" and does not know English
//! irregulars ("tomatoes" becomes "tomatoe", "asparagus" becomes "asparagu").
//! Every caller goes through the same function, so keys still line up.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::lexer_patterns::QUANTITY_FRAGMENT;

/// Phrases that mark a line as seasoning guidance rather than a purchase
const NON_SHOPPING_PHRASES: [&str; 3] = ["to taste", "as needed", "as desired"];

/// Words left over at the front of a name once its quantity is gone ("1 cup of flour")
const LEADING_FILLERS: [&str; 4] = ["of ", "a ", "an ", "the "];

lazy_static! {
    static ref DESCRIPTORS: Regex = Regex::new(
        r"(?i)\b(?:extra[- ]virgin|low[- ]fat|fresh|organic|diced|chopped|sliced|minced|crushed|ground|whole)\b"
    )
    .expect("Descriptor pattern should be valid");
    static ref PARENTHETICAL: Regex =
        Regex::new(r"\([^)]*\)?").expect("Parenthetical pattern should be valid");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("Whitespace pattern should be valid");
}

/// Produce the grouping key for an ingredient name
///
/// Returns an empty string for text that is not a purchase ("salt and pepper
/// to taste"); callers skip those instead of grouping on them.
///
/// # Examples
///
/// ```rust
/// use groceries::name_normalizer::normalize;
///
/// assert_eq!(normalize("Fresh Bananas"), "banana");
/// assert_eq!(normalize("2 lbs chicken breast"), "chicken breast");
/// assert_eq!(normalize("brown rice"), "brown rice");
/// assert_eq!(normalize("salt and pepper to taste"), "");
/// ```
pub fn normalize(name: &str) -> String {
    let lowered = name.trim().to_lowercase();

    if NON_SHOPPING_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
        trace!(name, "Skipping non-shopping text");
        return String::new();
    }

    let without_descriptors = DESCRIPTORS.replace_all(&lowered, " ");
    let without_asides = PARENTHETICAL.replace_all(&without_descriptors, " ");
    let without_note = match without_asides.find(',') {
        Some(comma) => &without_asides[..comma],
        None => &without_asides[..],
    };
    let singular = singularize(without_note.trim());
    let without_quantities = QUANTITY_FRAGMENT.replace_all(&singular, " ");
    let collapsed = WHITESPACE.replace_all(without_quantities.trim(), " ");

    let mut key = collapsed.trim_matches(|c: char| !c.is_alphanumeric()).to_string();
    for filler in LEADING_FILLERS {
        if let Some(rest) = key.strip_prefix(filler) {
            key = rest.trim_start().to_string();
            break;
        }
    }

    if !key.chars().any(char::is_alphabetic) {
        return String::new();
    }

    trace!(name, key = %key, "Normalized ingredient name");
    key
}

/// Drop one trailing "s", leaving words such as "swiss" or "watercress" alone
fn singularize(text: &str) -> String {
    if text.len() > 1 && text.ends_with('s') && !text.ends_with("ss") {
        text[..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_trim() {
        assert_eq!(normalize("  Olive Oil  "), "olive oil");
    }

    #[test]
    fn test_removes_descriptors() {
        assert_eq!(normalize("fresh organic basil"), "basil");
        assert_eq!(normalize("extra-virgin olive oil"), "olive oil");
        assert_eq!(normalize("low-fat yogurt"), "yogurt");
        assert_eq!(normalize("minced garlic"), "garlic");
        assert_eq!(normalize("whole milk"), "milk");
    }

    #[test]
    fn test_keeps_product_differentiating_words() {
        assert_eq!(normalize("brown rice"), "brown rice");
        assert_eq!(normalize("rice"), "rice");
        assert_ne!(normalize("chicken breast"), normalize("chicken thigh"));
    }

    #[test]
    fn test_strips_parenthetical_asides() {
        assert_eq!(normalize("(15 oz) black beans"), "black bean");
        assert_eq!(normalize("chicken breasts (boneless, skinless)"), "chicken breast");
    }

    #[test]
    fn test_strips_comma_notes() {
        assert_eq!(normalize("unsalted butter, softened"), "unsalted butter");
    }

    #[test]
    fn test_singularizes_trailing_s() {
        assert_eq!(normalize("bananas"), "banana");
        assert_eq!(normalize("banana"), "banana");
        assert_eq!(normalize("swiss"), "swiss");
    }

    #[test]
    fn test_strips_leaked_quantities() {
        assert_eq!(normalize("1 1/2 cups cooked rice"), "cooked rice");
        assert_eq!(normalize("2 lbs chicken breast"), "chicken breast");
        assert_eq!(normalize("1 cup of flour"), "flour");
        assert_eq!(normalize("1/2 tbsp salt"), "salt");
    }

    #[test]
    fn test_non_ingredient_text_is_empty() {
        assert_eq!(normalize("salt and pepper to taste"), "");
        assert_eq!(normalize("water as needed"), "");
        assert_eq!(normalize("2 cups"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("red    bell   pepper"), "red bell pepper");
    }
}
