#[cfg(test)]
mod tests {
    use groceries::config::GroceryConfig;
    use groceries::grocery_list::{build_grocery_list, GroceryBuild, ListSource};
    use groceries::ingredient_model::{is_well_formed, RecipeData};
    use groceries::validator::validate;

    fn plan(recipes: Vec<(&str, Vec<&str>)>) -> Vec<(String, RecipeData)> {
        recipes
            .into_iter()
            .map(|(name, lines)| (name.to_string(), RecipeData::with_ingredients(lines)))
            .collect()
    }

    fn build(recipes: &[(String, RecipeData)]) -> GroceryBuild {
        build_grocery_list(
            recipes.iter().map(|(name, recipe)| (name, recipe)),
            &GroceryConfig::default(),
        )
    }

    fn weekly_plan() -> Vec<(String, RecipeData)> {
        plan(vec![
            (
                "Chicken stir fry",
                vec![
                    "2 lbs chicken breast",
                    "1 1/2 cups cooked rice",
                    "2 tbsp soy sauce",
                    "1 red bell pepper",
                    "2 cloves garlic, minced",
                    "salt and pepper to taste",
                ],
            ),
            (
                "Berry smoothie",
                vec!["2 bananas", "1 cup milk", "1/2 cup fresh berries", "1 tbsp honey"],
            ),
            (
                "Burrito bowl",
                vec![
                    "1 cup cooked rice",
                    "1 can (15 oz) black beans",
                    "1/4 cup chopped cilantro",
                    "1 avocado",
                    "1 banana",
                ],
            ),
        ])
    }

    #[test]
    fn test_cooked_rice_becomes_raw_rice() {
        let recipes = plan(vec![
            ("Rice bowl", vec!["1 1/2 cups cooked rice"]),
            ("Stir fry", vec!["1 cup cooked rice"]),
        ]);

        let build = build(&recipes);

        assert_eq!(build.list["grains"], vec!["1 cup rice"]);
        assert_eq!(build.diagnostics.converted_items.len(), 1);
        assert_eq!(build.diagnostics.converted_items[0].shopping_name, "rice");
    }

    #[test]
    fn test_uncooked_rice_is_bought_as_written() {
        let recipes = plan(vec![("Pilaf", vec!["3 cups uncooked rice"])]);

        let build = build(&recipes);

        assert_eq!(build.list["grains"], vec!["3 cups uncooked rice"]);
        assert!(build.diagnostics.converted_items.is_empty());
    }

    #[test]
    fn test_bananas_are_counted_together() {
        let recipes = plan(vec![("Smoothie", vec!["2 bananas"]), ("Oatmeal", vec!["1 banana"])]);

        let build = build(&recipes);

        assert_eq!(build.list["produce"], vec!["3 bananas"]);
    }

    #[test]
    fn test_teaspoons_are_summed_into_one_entry() {
        let recipes = plan(vec![("Soup", vec!["1/2 tsp salt"]), ("Stew", vec!["1 tsp salt"])]);

        let build = build(&recipes);

        assert_eq!(build.list["condiments"], vec!["1.5 tsp salt"]);
    }

    #[test]
    fn test_seasoning_guidance_is_left_out() {
        let recipes = plan(vec![("Soup", vec!["salt and pepper to taste"])]);

        let build = build(&recipes);

        assert!(build.list.is_empty());
        assert_eq!(build.diagnostics.skipped_lines, vec!["salt and pepper to taste"]);
    }

    #[test]
    fn test_weekly_plan_list() {
        let recipes = weekly_plan();
        let build = build(&recipes);

        assert_eq!(build.source, ListSource::Deterministic);
        assert!(is_well_formed(&build.list));
        assert_eq!(build.list["proteins"], vec!["2 lbs chicken breast", "1 can (15 oz) black beans"]);
        assert_eq!(build.list["grains"], vec!["1 cup rice"]);
        assert_eq!(build.list["condiments"], vec!["2 tbsp soy sauce", "1 tbsp honey"]);
        assert_eq!(build.list["dairy"], vec!["1 cup milk"]);
        assert_eq!(
            build.list["produce"],
            vec![
                "1 red bell pepper",
                "2 cloves garlic, minced",
                "3 bananas",
                "1/2 cups fresh berries",
                "1/4 cups chopped cilantro",
                "1 avocado",
            ]
        );
        assert!(!build.list.contains_key("other"));
    }

    #[test]
    fn test_weekly_plan_is_fully_covered() {
        let recipes = weekly_plan();
        let build = build(&recipes);

        let report = validate(recipes.iter().map(|(name, recipe)| (name, recipe)), &build.list);

        assert!(
            report.is_complete(),
            "Missing ingredients: {:?}",
            report.missing_ingredients
        );
        assert!(report.all_recipe_ingredients.contains("rice"));
        assert!(report.all_recipe_ingredients.contains("chicken breast"));
        assert!(!report.all_recipe_ingredients.contains(""));
    }

    #[test]
    fn test_distinct_products_are_not_merged() {
        let recipes = plan(vec![
            ("Curry", vec!["1 lb chicken breast", "1 cup brown rice"]),
            ("Roast", vec!["1 lb chicken thigh", "1 cup rice"]),
        ]);

        let build = build(&recipes);

        assert_eq!(build.list["proteins"].len(), 2);
        assert_eq!(build.list["grains"], vec!["1 cup brown rice", "1 cup rice"]);
    }

    #[test]
    fn test_incompatible_units_are_reported() {
        let recipes = plan(vec![("Bread", vec!["2 cups flour"]), ("Cake", vec!["1 lb flour"])]);

        let build = build(&recipes);

        assert_eq!(build.list["grains"], vec!["3 cups flour"]);
        assert_eq!(build.diagnostics.incompatible_merges.len(), 1);
    }

    #[test]
    fn test_over_consolidation_threshold_is_configurable() {
        let recipes = plan(vec![("Brunch", vec!["1 egg", "2 eggs", "1 egg"])]);
        let config = GroceryConfig {
            over_consolidation_threshold: 2,
            ..GroceryConfig::default()
        };

        let build = build_grocery_list(recipes.iter().map(|(name, recipe)| (name, recipe)), &config);

        assert_eq!(build.list["proteins"], vec!["4 eggs"]);
        assert_eq!(build.diagnostics.over_consolidated.len(), 1);
        assert_eq!(build.diagnostics.over_consolidated[0].key, "egg");
    }

    #[test]
    fn test_blank_and_empty_recipes() {
        let recipes = plan(vec![("Empty", vec![]), ("Blank", vec!["", "   "])]);

        let build = build(&recipes);

        assert!(build.list.is_empty());
        assert!(is_well_formed(&build.list));
    }
}
