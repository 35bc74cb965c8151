//! # Consolidation Service Module
//!
//! The primary grocery-list path: hand every ingredient line of a meal plan to a
//! language model and let it consolidate them semantically ("chicken breast"
//! and "chicken thighs" become one chicken entry).
//!
//! ## Protocol
//!
//! [`ChatConsolidationService`] speaks the OpenAI-compatible chat-completions
//! API, so it works against OpenAI, Groq, Ollama, vLLM or LM Studio alike. It
//! asks for a JSON-schema response of the shape `{"category": ["item", ...]}`.
//!
//! Anything that does not come back in that shape is a
//! [`ServiceError::MalformedResponse`]; the caller decides what to do with it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::categorizer::Category;
use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::ingredient_model::GroceryList;

/// Connection timeout, kept short so a dead host fails fast
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Longest slice of a response body quoted in logs and errors
const BODY_EXCERPT_LEN: usize = 500;

/// A service that consolidates raw ingredient lines into a grocery list
#[async_trait]
pub trait ConsolidationService: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Consolidate a flattened list of ingredient lines
    ///
    /// # Errors
    ///
    /// Returns an error when the service cannot be reached, answers with a
    /// failure status, or answers with something that is not a grocery list.
    async fn consolidate(&self, ingredients: &[String]) -> Result<GroceryList, ServiceError>;
}

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// ============================================================================
// Chat completions client
// ============================================================================

/// Consolidation service backed by an OpenAI-compatible chat-completions API
pub struct ChatConsolidationService {
    client: Client,
    base_url: String,
    config: ServiceConfig,
}

impl ChatConsolidationService {
    /// Create a client from service configuration
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Configuration`] when no base URL is configured or
    /// the HTTP client cannot be built.
    pub fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                ServiceError::Configuration("GROCERY_SERVICE_URL is not set".to_string())
            })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(config.timeout()))
            .timeout(config.timeout())
            .build()
            .map_err(|e| ServiceError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn build_request(&self, ingredients: &[String]) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: ingredients.join("\n"),
                },
            ],
            temperature: 0.0,
            response_format: response_format(),
        }
    }

    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> ServiceError {
        let detail = serde_json::from_str::<ErrorResponse>(body)
            .map(|response| response.error.message)
            .unwrap_or_else(|_| excerpt(body).to_string());

        ServiceError::Status {
            code: status.as_u16(),
            body: detail,
        }
    }
}

#[async_trait]
impl ConsolidationService for ChatConsolidationService {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn consolidate(&self, ingredients: &[String]) -> Result<GroceryList, ServiceError> {
        let request = self.build_request(ingredients);
        debug!(
            model = %self.config.model,
            lines = ingredients.len(),
            "Sending ingredients to consolidation service"
        );

        let mut http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(ref api_key) = self.config.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = http_request.send().await.map_err(|e| {
            error!(url = %self.base_url, error = %e, "Failed to send request to consolidation service");
            ServiceError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read consolidation service response");
            ServiceError::from(e)
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let chat_response: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = excerpt(&body), "Failed to parse consolidation service response");
            ServiceError::MalformedResponse(format!("Failed to parse response: {e}"))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::MalformedResponse("API returned no content".to_string()))?;

        let list = parse_grocery_list(&content)?;
        info!(
            model = %self.config.model,
            categories = list.len(),
            items = list.values().map(Vec::len).sum::<usize>(),
            "Consolidation service returned grocery list"
        );
        Ok(list)
    }
}

fn system_prompt() -> String {
    let categories = Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You turn recipe ingredient lines into one consolidated grocery list. \
         Merge lines that describe the same purchase and add up their quantities. \
         Convert cooked amounts (cooked rice, cooked pasta, cooked beans) into the raw amount to buy. \
         Round quantities up to amounts a shopper can buy. \
         Leave out seasoning guidance such as \"salt and pepper to taste\". \
         Answer with a JSON object mapping a category to a list of display strings \
         such as \"2 lbs chicken breast\". Use only these categories: {categories}."
    )
}

fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "grocery_list",
            "schema": {
                "type": "object",
                "additionalProperties": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            }
        }
    })
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

/// Parse and validate a service answer as a grocery list
///
/// Category names are matched case-insensitively against [`Category`]; names
/// outside that vocabulary are filed under "other" and duplicates are joined. Blank items and categories left without items are dropped. A Markdown
/// code fence around the JSON is tolerated.
///
/// # Errors
///
/// Returns [`ServiceError::MalformedResponse`] when the content is not a JSON
/// object of string lists, a category name is blank, or no item survives.
///
/// # Examples
///
/// ```rust
/// use groceries::consolidation_service::parse_grocery_list;
///
/// let list = parse_grocery_list(r#"{"Produce": ["3 bananas", " "], "dairy": []}"#).unwrap();
/// assert_eq!(list.len(), 1);
/// assert_eq!(list["produce"], vec!["3 bananas"]);
///
/// assert!(parse_grocery_list(r#"{"produce": "3 bananas"}"#).is_err());
/// ```
pub fn parse_grocery_list(content: &str) -> Result<GroceryList, ServiceError> {
    let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(strip_code_fence(content))?;

    let mut list = GroceryList::new();
    for (label, items) in raw {
        if label.trim().is_empty() {
            return Err(ServiceError::MalformedResponse(
                "Grocery list contains a blank category name".to_string(),
            ));
        }
        let category = Category::from_label(&label).unwrap_or_else(|| {
            debug!(label = %label, "Unknown category from service, filing under other");
            Category::Other
        });

        let items: Vec<String> = items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        if !items.is_empty() {
            list.entry(category.as_str().to_string()).or_default().extend(items);
        }
    }

    if list.is_empty() {
        return Err(ServiceError::MalformedResponse(
            "Grocery list contains no items".to_string(),
        ));
    }
    Ok(list)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
