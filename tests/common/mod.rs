#![allow(dead_code)]

use async_trait::async_trait;
use recipe_cards::model::{EnrichRequest, SearchRequest};
use recipe_cards::{AppError, RawRecipe, RecipeApi, StoreEntry};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn recipe(id: i64, name: &str) -> RawRecipe {
    recipe_from(json!({
        "id": id,
        "name": name,
        "description": format!("About {}", name),
        "ingredients": ["salt", "pepper"],
        "instructions": [format!("[\"Prepare {}\", \"Serve\"]", name)]
    }))
}

pub fn recipe_from(value: Value) -> RawRecipe {
    serde_json::from_value(value).unwrap()
}

/// In-memory server. Details are keyed by (query, recipe id) so two search
/// cycles can answer differently for the same recipe; gates hold a call
/// until the test releases it.
#[derive(Default)]
pub struct FakeApi {
    searches: Mutex<HashMap<String, Result<Vec<RawRecipe>, String>>>,
    details: Mutex<HashMap<(String, String), Result<RawRecipe, String>>>,
    search_gates: Mutex<HashMap<String, Arc<Notify>>>,
    detail_gates: Mutex<HashMap<(String, String), Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_search(&self, query: &str, recipes: Vec<RawRecipe>) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), Ok(recipes));
    }

    pub fn on_search_failure(&self, query: &str, message: &str) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), Err(message.to_string()));
    }

    pub fn on_details(&self, query: &str, recipe: RawRecipe) {
        let key = (query.to_string(), recipe.id.to_string());
        self.details.lock().unwrap().insert(key, Ok(recipe));
    }

    pub fn on_details_failure(&self, query: &str, id: i64, message: &str) {
        let key = (query.to_string(), id.to_string());
        self.details
            .lock()
            .unwrap()
            .insert(key, Err(message.to_string()));
    }

    pub fn gate_search(&self, query: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.search_gates
            .lock()
            .unwrap()
            .insert(query.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn gate_details(&self, query: &str, id: i64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.detail_gates
            .lock()
            .unwrap()
            .insert((query.to_string(), id.to_string()), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RecipeApi for FakeApi {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawRecipe>, AppError> {
        self.record(format!("search:{}:{}", request.query, request.category));

        let gate = self.search_gates.lock().unwrap().get(&request.query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let result = self.searches.lock().unwrap().get(&request.query).cloned();
        match result {
            Some(Ok(recipes)) => Ok(recipes),
            Some(Err(message)) => Err(AppError::Upstream(message)),
            None => Err(AppError::Status(500)),
        }
    }

    async fn cook_with_ai(&self, request: &EnrichRequest) -> Result<RawRecipe, AppError> {
        self.record(format!("details:{}:{}", request.query, request.recipe_id));
        let key = (request.query.clone(), request.recipe_id.to_string());

        let gate = self.detail_gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let result = self.details.lock().unwrap().get(&key).cloned();
        match result {
            Some(Ok(recipe)) => Ok(recipe),
            Some(Err(message)) => Err(AppError::Upstream(message)),
            None => Err(AppError::Status(404)),
        }
    }

    async fn cooking_assistant_recipe(&self, entry: &StoreEntry) -> Result<String, AppError> {
        self.record(format!(
            "assistant:{}:{}",
            entry.recipe.id,
            entry.parsed_steps.len()
        ));
        Ok(format!("<h1>{}</h1>", entry.recipe.name))
    }
}

/// Yield to the scheduler until `condition` holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
