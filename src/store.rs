use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::model::{ParsedStep, RawRecipe, RecipeId, StoreEntry};

/// Latest known payload per recipe, for the lifetime of one page session.
///
/// Written when a card's enrichment succeeds and read when the cooking
/// assistant is opened. Entries are replaced wholesale; only recipes that
/// resolved successfully are present.
#[derive(Debug, Default)]
pub struct RecipeDataStore {
    entries: Mutex<HashMap<RecipeId, StoreEntry>>,
}

impl RecipeDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, id: RecipeId, recipe: RawRecipe, parsed_steps: Vec<ParsedStep>) {
        debug!("Caching recipe {} ({} steps)", id, parsed_steps.len());
        self.lock().insert(
            id,
            StoreEntry {
                recipe,
                parsed_steps,
            },
        );
    }

    pub fn get(&self, id: &RecipeId) -> Option<StoreEntry> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &RecipeId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RecipeId, StoreEntry>> {
        // a poisoned map is still a valid map
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
