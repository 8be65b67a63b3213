use log::{info, warn};
use std::sync::Arc;

use crate::api::RecipeApi;
use crate::error::AppError;
use crate::model::RecipeId;
use crate::store::RecipeDataStore;

/// The "Start Cooking" action of a card.
///
/// Only recipes whose details already resolved can be opened; the cached
/// entry is posted as-is and the server answers with the assistant page.
pub struct CookingAssistant {
    api: Arc<dyn RecipeApi>,
    store: Arc<RecipeDataStore>,
}

impl CookingAssistant {
    pub fn new(api: Arc<dyn RecipeApi>, store: Arc<RecipeDataStore>) -> Self {
        Self { api, store }
    }

    /// Fetch the assistant page markup for a cached recipe.
    ///
    /// Fails with [`AppError::RecipeNotCached`] without any call when the
    /// recipe is not in the store.
    pub async fn open(&self, id: &RecipeId) -> Result<String, AppError> {
        let Some(entry) = self.store.get(id) else {
            warn!("Cooking assistant requested for uncached recipe {}", id);
            return Err(AppError::RecipeNotCached(id.clone()));
        };

        info!(
            "Opening cooking assistant for {} ({} steps)",
            id,
            entry.parsed_steps.len()
        );
        self.api.cooking_assistant_recipe(&entry).await
    }
}
