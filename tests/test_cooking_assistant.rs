mod common;

use common::{recipe, FakeApi};
use recipe_cards::{
    cooking_assistant_url, AppConfig, AppError, CookingAssistant, RecipeDataStore, RecipeId,
    Session,
};
use std::sync::Arc;

#[tokio::test]
async fn test_open_uncached_recipe_makes_no_call() {
    let api = FakeApi::new();
    let assistant = CookingAssistant::new(api.clone(), Arc::new(RecipeDataStore::new()));

    let result = assistant.open(&RecipeId::from(42)).await;

    match result {
        Err(AppError::RecipeNotCached(id)) => assert_eq!(id, RecipeId::from(42)),
        other => panic!("Expected cache miss, got {:?}", other),
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_open_after_details_resolve() {
    let api = FakeApi::new();
    api.on_search("pasta", vec![recipe(1, "Carbonara"), recipe(2, "Cacio e Pepe")]);
    api.on_details("pasta", recipe(1, "Carbonara"));
    api.on_details_failure("pasta", 2, "Recipe not found");
    let session = Session::new(api.clone(), &AppConfig::default());

    session.search.search("pasta", None).await;

    let page = session.assistant.open(&RecipeId::from(1)).await.unwrap();
    assert_eq!(page, "<h1>Carbonara</h1>");
    assert!(api.calls().contains(&"assistant:1:1".to_string()));

    // the failed card never reached the store
    let missing = session.assistant.open(&RecipeId::from(2)).await;
    assert!(matches!(missing, Err(AppError::RecipeNotCached(_))));
    assert!(!api.calls().iter().any(|call| call.starts_with("assistant:2")));
}

#[test]
fn test_navigation_url() {
    let url = cooking_assistant_url("http://localhost:5000", &RecipeId::from(17)).unwrap();
    assert_eq!(url.as_str(), "http://localhost:5000/cooking-assistant?recipe_id=17");
}
