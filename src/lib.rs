pub mod api;
pub mod assistant;
pub mod cards;
pub mod config;
pub mod error;
pub mod escape;
pub mod markup;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod steps;
pub mod store;

// Re-export commonly used types
pub use api::{cooking_assistant_url, HttpRecipeApi, RecipeApi};
pub use assistant::CookingAssistant;
pub use cards::{CardRenderer, CardState, Notice};
pub use crate::config::AppConfig;
pub use error::AppError;
pub use escape::escape;
pub use model::{ParsedStep, RawRecipe, RecipeId, StoreEntry};
pub use normalize::{normalize, normalize_value};
pub use orchestrator::{CycleSummary, SearchControls, SearchOrchestrator, SearchOutcome};
pub use store::RecipeDataStore;

use std::sync::Arc;

/// A search page session: one orchestrator and the assistant action, sharing
/// one store that lives as long as the session.
pub struct Session {
    pub search: SearchOrchestrator,
    pub assistant: CookingAssistant,
}

impl Session {
    pub fn new(api: Arc<dyn RecipeApi>, config: &AppConfig) -> Self {
        let store = Arc::new(RecipeDataStore::new());
        Self {
            search: SearchOrchestrator::new(Arc::clone(&api), Arc::clone(&store), config),
            assistant: CookingAssistant::new(api, store),
        }
    }

    /// Session talking to the server named in the configuration
    pub fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let api: Arc<dyn RecipeApi> = Arc::new(HttpRecipeApi::new(config)?);
        Ok(Self::new(api, config))
    }
}
