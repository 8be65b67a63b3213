//! End-to-end search flow.
//!
//! One call to [`SearchOrchestrator::search`] is one search cycle:
//!
//! ```text
//! Idle -> Searching -> AwaitingDetails -> Settled
//!                  \-> Settled (no results / error notice)
//! ```
//!
//! Cycles may overlap. Each accepted search bumps a generation counter and
//! every enrichment result is checked against it before touching a card or
//! the store, so a response that belongs to an older cycle is dropped
//! instead of overwriting newer content.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinSet;

use crate::api::RecipeApi;
use crate::cards::{CardRenderer, CardState, Notice};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::model::{EnrichRequest, RecipeId, SearchRequest};
use crate::steps::parse_recipe_steps;
use crate::store::RecipeDataStore;

/// Search button and loading indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchControls {
    pub trigger_enabled: bool,
    pub loading: bool,
}

impl Default for SearchControls {
    fn default() -> Self {
        Self {
            trigger_enabled: true,
            loading: false,
        }
    }
}

/// Summary of one search cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query, nothing was sent and nothing on screen changed
    Ignored,
    /// The result area shows a notice instead of cards
    Notice { generation: u64, notice: Notice },
    /// A newer search started before `/search` answered
    Superseded { generation: u64 },
    /// Cards were rendered and every enrichment call has resolved
    Settled(CycleSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub generation: u64,
    pub rendered: usize,
    pub loaded: usize,
    pub failed: usize,
    /// Responses that arrived after a newer search had started
    pub stale: usize,
}

/// Re-enables the search controls if a cycle is dropped while `/search`
/// is in flight and no newer cycle has taken over.
struct ControlsGuard<'a> {
    orchestrator: &'a SearchOrchestrator,
    generation: u64,
    armed: bool,
}

impl ControlsGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ControlsGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut page = self.orchestrator.page();
        if self.orchestrator.is_current(self.generation) {
            debug!("Search #{} dropped, releasing controls", self.generation);
            page.controls = SearchControls::default();
        }
    }
}

#[derive(Debug)]
struct Page {
    controls: SearchControls,
    cards: CardRenderer,
}

pub struct SearchOrchestrator {
    api: Arc<dyn RecipeApi>,
    store: Arc<RecipeDataStore>,
    page: Mutex<Page>,
    generation: AtomicU64,
    default_category: String,
    clear_store_on_search: bool,
}

impl SearchOrchestrator {
    pub fn new(api: Arc<dyn RecipeApi>, store: Arc<RecipeDataStore>, config: &AppConfig) -> Self {
        Self {
            api,
            store,
            page: Mutex::new(Page {
                controls: SearchControls::default(),
                cards: CardRenderer::new(config.ingredient_display_cap),
            }),
            generation: AtomicU64::new(0),
            default_category: config.default_category.clone(),
            clear_store_on_search: config.clear_store_on_search,
        }
    }

    pub fn store(&self) -> &Arc<RecipeDataStore> {
        &self.store
    }

    /// Generation of the most recently started search, 0 before any search
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn controls(&self) -> SearchControls {
        self.page().controls
    }

    pub fn card_state(&self, id: &RecipeId) -> Option<CardState> {
        self.page().cards.state(id).cloned()
    }

    pub fn card_ids(&self) -> Vec<RecipeId> {
        self.page().cards.ids().to_vec()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.page().cards.notice().cloned()
    }

    /// Current markup of the result area
    pub fn render(&self) -> String {
        self.page().cards.render()
    }

    /// Run one search cycle to completion.
    ///
    /// A blank query is ignored without any call. Otherwise the result area
    /// is cleared, `/search` is called once, one skeleton is rendered per
    /// result and one `/cook-with-ai` call per card runs concurrently. The
    /// search trigger is re-enabled as soon as `/search` resolves; the
    /// returned future completes once every card has resolved.
    pub async fn search(&self, query: &str, category: Option<&str>) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search query");
            return SearchOutcome::Ignored;
        }

        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.default_category.as_str())
            .to_string();

        let generation = {
            // generation, store and cards change together so an older cycle
            // never observes a half-started one
            let mut page = self.page();
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if self.clear_store_on_search {
                self.store.clear();
            }
            page.controls = SearchControls {
                trigger_enabled: false,
                loading: true,
            };
            page.cards.clear();
            generation
        };
        let mut controls_guard = ControlsGuard {
            orchestrator: self,
            generation,
            armed: true,
        };
        info!(
            "Search #{} for {:?} in category {:?}",
            generation, query, category
        );

        let request = SearchRequest {
            query: query.to_string(),
            category,
        };
        let result = self.api.search(&request).await;

        let recipes = {
            let mut page = self.page();
            controls_guard.disarm();
            // a newer search owns the controls and the result area now
            if !self.is_current(generation) {
                debug!("Search #{} superseded before results arrived", generation);
                return SearchOutcome::Superseded { generation };
            }
            page.controls = SearchControls::default();

            let notice = match result {
                Ok(recipes) if !recipes.is_empty() => {
                    let rendered = recipes
                        .into_iter()
                        .filter(|recipe| {
                            page.cards.render_skeleton(recipe.id.clone(), &recipe.name)
                        })
                        .map(|recipe| recipe.id)
                        .collect::<Vec<_>>();
                    Ok(rendered)
                }
                Ok(_) => {
                    info!("Search #{} returned no recipes", generation);
                    Err(Notice::NoResults)
                }
                Err(AppError::Upstream(message)) => {
                    info!("Search #{} rejected by server: {}", generation, message);
                    Err(Notice::NoResults)
                }
                Err(e) => {
                    warn!("Search #{} failed: {}", generation, e);
                    Err(Notice::Error)
                }
            };

            match notice {
                Ok(rendered) => rendered,
                Err(notice) => {
                    page.cards.show_notice(notice.clone());
                    return SearchOutcome::Notice { generation, notice };
                }
            }
        };

        self.await_details(generation, query, recipes).await
    }

    async fn await_details(
        &self,
        generation: u64,
        query: &str,
        ids: Vec<RecipeId>,
    ) -> SearchOutcome {
        let mut summary = CycleSummary {
            generation,
            rendered: ids.len(),
            ..CycleSummary::default()
        };

        let mut tasks = JoinSet::new();
        for id in ids {
            let api = Arc::clone(&self.api);
            let request = EnrichRequest {
                recipe_id: id.clone(),
                query: query.to_string(),
            };
            tasks.spawn(async move {
                let result = api.cook_with_ai(&request).await;
                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (id, result) = match joined {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!("Enrichment task for search #{} aborted: {}", generation, e);
                    continue;
                }
            };

            let mut page = self.page();
            if !self.is_current(generation) {
                debug!(
                    "Discarding stale details for {} from search #{}",
                    id, generation
                );
                summary.stale += 1;
                continue;
            }

            match result {
                Ok(recipe) => {
                    let steps = parse_recipe_steps(&recipe);
                    if page.cards.update(&id, &recipe, &steps) {
                        self.store.put(id, recipe, steps);
                        summary.loaded += 1;
                    }
                }
                Err(e) => {
                    warn!("Details for {} failed: {}", id, e);
                    let reason = match e {
                        AppError::Upstream(message) => message,
                        _ => "Could not load this recipe.".to_string(),
                    };
                    if page.cards.fail(&id, &reason) {
                        summary.failed += 1;
                    }
                }
            }
        }

        info!(
            "Search #{} settled: {} loaded, {} failed, {} stale",
            generation, summary.loaded, summary.failed, summary.stale
        );
        SearchOutcome::Settled(summary)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn page(&self) -> MutexGuard<'_, Page> {
        self.page
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
