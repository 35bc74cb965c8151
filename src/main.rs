use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use groceries::config::GroceryConfig;
use groceries::grocery_list::GroceryListGenerator;
use groceries::ingredient_model::RecipeData;
use groceries::validator::validate;

const USAGE: &str = "usage: grocery-list <meal-plan.json> [--report]";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr so stdout stays valid JSON
    if env::var("GROCERY_LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();
    init_tracing();

    let mut args = env::args().skip(1);
    let path = args.next().context(USAGE)?;
    let report = args.any(|arg| arg == "--report");

    let contents =
        fs::read_to_string(&path).with_context(|| format!("Failed to read meal plan {path}"))?;
    let plan: BTreeMap<String, RecipeData> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse meal plan {path}"))?;

    let config = GroceryConfig::from_env();
    let generator = GroceryListGenerator::new(config);
    info!(
        recipes = plan.len(),
        service = generator.has_service(),
        "Building grocery list"
    );

    let build = generator.generate_with_report(&plan).await;

    let output = if report {
        let validation = validate(&plan, &build.list);
        info!(
            coverage = validation.coverage(),
            missing = validation.missing_ingredients.len(),
            "Validated grocery list"
        );
        serde_json::to_string_pretty(&serde_json::json!({
            "build": build,
            "validation": validation,
        }))?
    } else {
        serde_json::to_string_pretty(&build.list)?
    };
    println!("{output}");

    Ok(())
}
