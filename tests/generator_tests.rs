#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use groceries::config::{GroceryConfig, RecoveryConfig, ServiceConfig};
    use groceries::consolidation_service::ConsolidationService;
    use groceries::errors::ServiceError;
    use groceries::grocery_list::{build_grocery_list, GroceryListGenerator, ListSource};
    use groceries::ingredient_model::{is_well_formed, GroceryList, RecipeData};

    /// Service stub answering every call with the same result
    struct StubService {
        response: Result<GroceryList, ServiceError>,
        calls: AtomicUsize,
    }

    impl StubService {
        fn answering(response: Result<GroceryList, ServiceError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConsolidationService for StubService {
        fn name(&self) -> &str {
            "stub"
        }

        async fn consolidate(&self, _ingredients: &[String]) -> Result<GroceryList, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    /// Service stub that never answers
    struct SilentService;

    #[async_trait]
    impl ConsolidationService for SilentService {
        fn name(&self) -> &str {
            "silent"
        }

        async fn consolidate(&self, _ingredients: &[String]) -> Result<GroceryList, ServiceError> {
            std::future::pending::<()>().await;
            Err(ServiceError::Transport("unreachable".to_string()))
        }
    }

    /// Service stub that records the lines it was sent
    struct RecordingService {
        received: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ConsolidationService for RecordingService {
        fn name(&self) -> &str {
            "recording"
        }

        async fn consolidate(&self, ingredients: &[String]) -> Result<GroceryList, ServiceError> {
            self.received.lock().unwrap().extend(ingredients.iter().cloned());
            Ok(service_list())
        }
    }

    fn config() -> GroceryConfig {
        GroceryConfig {
            service: ServiceConfig {
                enabled: true,
                timeout_secs: 1,
                ..ServiceConfig::default()
            },
            recovery: RecoveryConfig {
                circuit_breaker_threshold: 2,
                circuit_breaker_reset_secs: 60,
            },
            ..GroceryConfig::default()
        }
    }

    fn recipes() -> Vec<(String, RecipeData)> {
        vec![
            (
                "Rice bowl".to_string(),
                RecipeData::with_ingredients(["1 1/2 cups cooked rice", "2 bananas"]),
            ),
            (
                "Stir fry".to_string(),
                RecipeData::with_ingredients(["1 cup cooked rice", "1 banana", "salt to taste"]),
            ),
        ]
    }

    fn service_list() -> GroceryList {
        let mut list = GroceryList::new();
        list.insert("grains".to_string(), vec!["1 cup white rice".to_string()]);
        list.insert("produce".to_string(), vec!["3 ripe bananas".to_string()]);
        list
    }

    fn deterministic_list(recipes: &[(String, RecipeData)]) -> GroceryList {
        build_grocery_list(
            recipes.iter().map(|(name, recipe)| (name, recipe)),
            &GroceryConfig::default(),
        )
        .list
    }

    #[tokio::test]
    async fn test_service_result_is_used() {
        let recipes = recipes();
        let service = StubService::answering(Ok(service_list()));
        let generator = GroceryListGenerator::with_service(config(), service.clone());

        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(build.source, ListSource::Service);
        assert_eq!(build.list, service_list());
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_service_receives_flattened_lines() {
        let recipes = recipes();
        let service = Arc::new(RecordingService {
            received: std::sync::Mutex::new(Vec::new()),
        });
        let generator = GroceryListGenerator::with_service(config(), service.clone());

        generator.generate(recipes.iter().map(|(n, r)| (n, r))).await;

        let received = service.received.lock().unwrap();
        assert_eq!(
            *received,
            vec![
                "1 1/2 cups cooked rice",
                "2 bananas",
                "1 cup cooked rice",
                "1 banana",
                "salt to taste",
            ]
        );
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_deterministic_list() {
        let recipes = recipes();
        let generator = GroceryListGenerator::with_service(config(), Arc::new(SilentService));

        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(build.source, ListSource::Deterministic);
        assert!(is_well_formed(&build.list));
        assert_eq!(build.list, deterministic_list(&recipes));
        assert_eq!(build.list["grains"], vec!["1 cup rice"]);
        let error = build.diagnostics.service_error.unwrap();
        assert!(error.starts_with("Timeout error"), "unexpected error: {}", error);
    }

    #[tokio::test]
    async fn test_service_error_falls_back() {
        let recipes = recipes();
        let service = StubService::answering(Err(ServiceError::Status {
            code: 500,
            body: "internal error".to_string(),
        }));
        let generator = GroceryListGenerator::with_service(config(), service);

        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(build.source, ListSource::Deterministic);
        assert_eq!(build.list, deterministic_list(&recipes));
        assert_eq!(
            build.diagnostics.service_error.as_deref(),
            Some("Service returned 500: internal error")
        );
    }

    #[tokio::test]
    async fn test_malformed_service_list_falls_back() {
        let recipes = recipes();
        let mut malformed = service_list();
        malformed.insert("dairy".to_string(), Vec::new());
        let generator = GroceryListGenerator::with_service(config(), StubService::answering(Ok(malformed)));

        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(build.source, ListSource::Deterministic);
        assert!(is_well_formed(&build.list));
        assert!(build
            .diagnostics
            .service_error
            .unwrap()
            .starts_with("Malformed response"));
    }

    #[tokio::test]
    async fn test_unknown_service_category_falls_back() {
        let recipes = recipes();
        let mut off_vocabulary = service_list();
        off_vocabulary.insert("bakery".to_string(), vec!["1 loaf sourdough".to_string()]);
        let generator =
            GroceryListGenerator::with_service(config(), StubService::answering(Ok(off_vocabulary)));

        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(build.source, ListSource::Deterministic);
        assert_eq!(build.list, deterministic_list(&recipes));
        assert_eq!(
            build.diagnostics.service_error.as_deref(),
            Some("Malformed response: Unknown category \"bakery\"")
        );
    }

    #[tokio::test]
    async fn test_empty_service_list_falls_back() {
        let recipes = recipes();
        let generator =
            GroceryListGenerator::with_service(config(), StubService::answering(Ok(GroceryList::new())));

        let list = generator.generate(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(list, deterministic_list(&recipes));
    }

    #[tokio::test]
    async fn test_circuit_breaker_skips_failing_service() {
        let recipes = recipes();
        let service = StubService::answering(Err(ServiceError::Transport("connection refused".to_string())));
        let generator = GroceryListGenerator::with_service(config(), service.clone());

        for _ in 0..2 {
            generator.generate(recipes.iter().map(|(n, r)| (n, r))).await;
        }
        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(service.calls(), 2);
        assert_eq!(build.source, ListSource::Deterministic);
        assert_eq!(
            build.diagnostics.service_error.as_deref(),
            Some("Circuit breaker is open")
        );
    }

    #[tokio::test]
    async fn test_empty_plan_does_not_call_service() {
        let service = StubService::answering(Ok(service_list()));
        let generator = GroceryListGenerator::with_service(config(), service.clone());
        let empty = RecipeData::with_ingredients(["   "]);

        let build = generator.generate_with_report([("Nothing", &empty)]).await;

        assert_eq!(service.calls(), 0);
        assert_eq!(build.source, ListSource::Deterministic);
        assert!(build.list.is_empty());
    }

    #[tokio::test]
    async fn test_without_service_url_generator_is_deterministic() {
        let recipes = recipes();
        let generator = GroceryListGenerator::new(GroceryConfig::default());
        assert!(!generator.has_service());

        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(build.source, ListSource::Deterministic);
        assert!(build.diagnostics.service_error.is_none());
        assert_eq!(build.list["produce"], vec!["3 bananas"]);
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        let recipes = recipes();
        let mut config = config();
        config.service.base_url = Some("http://127.0.0.1:9/v1".to_string());
        let generator = GroceryListGenerator::new(config);
        assert!(generator.has_service());

        let build = generator.generate_with_report(recipes.iter().map(|(n, r)| (n, r))).await;

        assert_eq!(build.source, ListSource::Deterministic);
        assert!(build.diagnostics.service_error.is_some());
        assert_eq!(build.list, deterministic_list(&recipes));
    }
}
