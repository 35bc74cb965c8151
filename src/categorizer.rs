//! # Ingredient Categorizer
//!
//! Assigns a coarse shopping category to an ingredient line by keyword lookup.
//! Categories are checked in table order and the first hit wins, so
//! "peanut butter" lands in dairy and "chicken broth" in proteins. Matching runs
//! on the original line, before normalization strips any context.
//!
//! Keywords match as whole words, plurals included ("cherries"). A few endings
//! such as "berry" also match at the end of a compound word ("blueberries").

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shopping category of a grocery item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dairy,
    Proteins,
    Produce,
    Grains,
    Nuts,
    Condiments,
    Other,
}

const DAIRY: &[&str] = &[
    "milk", "buttermilk", "cheese", "cheddar", "mozzarella", "parmesan", "feta", "ricotta",
    "yogurt", "butter", "cream", "half-and-half", "ghee",
];

const PROTEINS: &[&str] = &[
    "chicken", "beef", "pork", "turkey", "lamb", "bacon", "sausage", "ham", "salmon", "tuna",
    "cod", "tilapia", "shrimp", "fish", "tofu", "tempeh", "egg", "lentil", "chickpea",
    "black bean", "kidney bean", "pinto bean", "cannellini bean",
];

const PRODUCE: &[&str] = &[
    "apple", "banana", "cherry", "lemon", "lime", "orange", "avocado", "tomato", "onion",
    "scallion", "shallot", "garlic", "potato", "carrot", "celery", "broccoli", "spinach",
    "kale", "lettuce", "cucumber", "zucchini", "bell pepper", "jalapeno", "mushroom",
    "cabbage", "cauliflower", "ginger", "basil", "cilantro", "parsley", "mint", "green bean",
    "pea", "corn", "squash", "eggplant", "asparagus",
];

/// Word endings that name produce inside a compound ("strawberries", "blackberry")
const PRODUCE_ENDINGS: &[&str] = &["berry"];

const GRAINS: &[&str] = &[
    "rice", "quinoa", "pasta", "spaghetti", "noodle", "bread", "tortilla", "oat", "oatmeal",
    "flour", "couscous", "barley", "cereal", "cracker", "bun", "bagel", "pita",
];

const GRAIN_ENDINGS: &[&str] = &["crumb"];

const NUTS: &[&str] = &[
    "almond", "walnut", "pecan", "cashew", "peanut", "pistachio", "hazelnut", "nut",
    "chia seed", "flaxseed", "sesame seed", "pumpkin seed", "sunflower seed",
];

const CONDIMENTS: &[&str] = &[
    "salt", "pepper", "oil", "vinegar", "soy sauce", "sauce", "ketchup", "mustard", "mayo",
    "mayonnaise", "honey", "syrup", "sugar", "spice", "cumin", "paprika", "cinnamon",
    "oregano", "vanilla", "salsa", "dressing", "stock", "broth",
];

/// Regex fragment matching a keyword and its plural ("carrot(s)", "cherr(y|ies)")
fn with_plurals(keyword: &str) -> String {
    let escaped = regex::escape(keyword);
    let consonant_y = keyword.len() > 1
        && keyword.ends_with('y')
        && !keyword[..keyword.len() - 1].ends_with(['a', 'e', 'i', 'o', 'u']);

    if consonant_y {
        format!("{}(?:y|ies)", &escaped[..escaped.len() - 1])
    } else {
        format!("{escaped}(?:s|es)?")
    }
}

/// Compile a category matcher
///
/// `words` match whole words only, so "pineapple" is not an apple and "eggplant"
/// is not an egg. `endings` may also close a compound word.
fn keyword_pattern(words: &[&str], endings: &[&str]) -> Regex {
    let mut alternatives: Vec<String> = words.iter().map(|word| with_plurals(word)).collect();
    alternatives.extend(endings.iter().map(|ending| format!(r"\w*{}", with_plurals(ending))));

    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("Category keyword pattern should be valid")
}

lazy_static! {
    /// Category keyword table, in priority order
    static ref CATEGORY_TABLE: Vec<(Category, Regex)> = vec![
        (Category::Dairy, keyword_pattern(DAIRY, &[])),
        (Category::Proteins, keyword_pattern(PROTEINS, &[])),
        (Category::Produce, keyword_pattern(PRODUCE, PRODUCE_ENDINGS)),
        (Category::Grains, keyword_pattern(GRAINS, GRAIN_ENDINGS)),
        (Category::Nuts, keyword_pattern(NUTS, &[])),
        (Category::Condiments, keyword_pattern(CONDIMENTS, &[])),
    ];
}

impl Category {
    /// Every category, in table order, ending with `Other`
    pub const ALL: [Category; 7] = [
        Category::Dairy,
        Category::Proteins,
        Category::Produce,
        Category::Grains,
        Category::Nuts,
        Category::Condiments,
        Category::Other,
    ];

    /// Category label used as a grocery list key
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dairy => "dairy",
            Category::Proteins => "proteins",
            Category::Produce => "produce",
            Category::Grains => "grains",
            Category::Nuts => "nuts",
            Category::Condiments => "condiments",
            Category::Other => "other",
        }
    }

    /// Look a category up by its label
    pub fn from_label(label: &str) -> Option<Category> {
        let label = label.trim().to_lowercase();
        Category::ALL.into_iter().find(|category| category.as_str() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assign a category to an ingredient line
///
/// # Examples
///
/// ```rust
/// use groceries::categorizer::{categorize, Category};
///
/// assert_eq!(categorize("2 bananas"), Category::Produce);
/// assert_eq!(categorize("1 cup cooked rice"), Category::Grains);
/// assert_eq!(categorize("1 box of birthday candles"), Category::Other);
/// ```
pub fn categorize(raw_ingredient_text: &str) -> Category {
    CATEGORY_TABLE
        .iter()
        .find(|(_, pattern)| pattern.is_match(raw_ingredient_text))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_each_category() {
        let cases = vec![
            ("1 cup whole milk", Category::Dairy),
            ("2 lbs chicken breast", Category::Proteins),
            ("3 large eggs", Category::Proteins),
            ("2 bananas", Category::Produce),
            ("1 pint fresh berries", Category::Produce),
            ("3 tomatoes", Category::Produce),
            ("1 1/2 cups cooked rice", Category::Grains),
            ("1/4 cup chopped walnuts", Category::Nuts),
            ("1/2 tsp salt", Category::Condiments),
            ("2 tbsp extra-virgin olive oil", Category::Condiments),
            ("1 roll of parchment paper", Category::Other),
        ];

        for (text, expected) in cases {
            assert_eq!(categorize(text), expected, "Category mismatch for: '{}'", text);
        }
    }

    #[test]
    fn test_first_table_entry_wins() {
        assert_eq!(categorize("2 tbsp peanut butter"), Category::Dairy);
        assert_eq!(categorize("4 cups chicken broth"), Category::Proteins);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        assert_eq!(categorize("1 eggplant"), Category::Produce);
        assert_eq!(categorize("1 pineapple"), Category::Other);
    }

    #[test]
    fn test_berry_and_compound_names() {
        let cases = vec![
            ("1 cup strawberries", Category::Produce),
            ("1/2 cup blueberries", Category::Produce),
            ("1 pint fresh berries", Category::Produce),
            ("1 strawberry", Category::Produce),
            ("2 cups cherries", Category::Produce),
            ("1 cup breadcrumbs", Category::Grains),
            ("1/2 cup panko crumbs", Category::Grains),
        ];

        for (text, expected) in cases {
            assert_eq!(categorize(text), expected, "Category mismatch for: '{}'", text);
        }
    }

    #[test]
    fn test_vowel_y_keywords_keep_plain_plural() {
        assert_eq!(categorize("2 lbs ground turkey"), Category::Proteins);
        assert_eq!(categorize("1 cup barley"), Category::Grains);
        assert_eq!(categorize("2 stalks celery"), Category::Produce);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(categorize("2 CUPS Spinach"), Category::Produce);
    }

    #[test]
    fn test_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.as_str()), Some(category));
        }
        assert_eq!(Category::from_label("Produce"), Some(Category::Produce));
        assert_eq!(Category::from_label("snacks"), None);
    }
}
