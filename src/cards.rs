use log::debug;
use serde_json::Value;
use std::collections::HashMap;

use crate::markup::{Element, Node};
use crate::model::{ParsedStep, RawRecipe, RecipeId};

/// Lifecycle of one card within a search cycle: `Skeleton` moves to either
/// `Loaded` or `Failed` and never back.
#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    Skeleton,
    Loaded(Box<RawRecipe>),
    Failed(String),
}

/// Message shown across the whole result area instead of cards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Nothing matched, or the server declined the search
    NoResults,
    /// Transport or decoding failure
    Error,
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::NoResults => "No recipes found.",
            Notice::Error => "An error occurred.",
        }
    }
}

#[derive(Debug, Clone)]
struct Card {
    display_name: String,
    state: CardState,
    steps: Vec<ParsedStep>,
}

/// Owns the cards of the result area, addressed by recipe identity.
#[derive(Debug, Clone)]
pub struct CardRenderer {
    ingredient_cap: usize,
    order: Vec<RecipeId>,
    cards: HashMap<RecipeId, Card>,
    notice: Option<Notice>,
}

impl CardRenderer {
    pub fn new(ingredient_cap: usize) -> Self {
        Self {
            ingredient_cap,
            order: Vec::new(),
            cards: HashMap::new(),
            notice: None,
        }
    }

    /// Remove every card and notice.
    pub fn clear(&mut self) {
        self.order.clear();
        self.cards.clear();
        self.notice = None;
    }

    /// Add a placeholder card. Returns `false` if a card with this identity
    /// is already on screen.
    pub fn render_skeleton(&mut self, id: RecipeId, display_name: &str) -> bool {
        if self.cards.contains_key(&id) {
            debug!("Card {} already rendered, skipping duplicate", id);
            return false;
        }
        self.order.push(id.clone());
        self.cards.insert(
            id,
            Card {
                display_name: display_name.to_string(),
                state: CardState::Skeleton,
                steps: Vec::new(),
            },
        );
        true
    }

    /// Replace a skeleton with the recipe's content.
    ///
    /// No-op (returns `false`) when the card does not exist or has already
    /// resolved.
    pub fn update(&mut self, id: &RecipeId, recipe: &RawRecipe, steps: &[ParsedStep]) -> bool {
        let Some(card) = self.pending_card(id) else {
            return false;
        };
        card.state = CardState::Loaded(Box::new(recipe.clone()));
        card.steps = steps.to_vec();
        true
    }

    /// Replace a skeleton's body with an error notice, keeping its header.
    pub fn fail(&mut self, id: &RecipeId, reason: &str) -> bool {
        let Some(card) = self.pending_card(id) else {
            return false;
        };
        card.state = CardState::Failed(reason.to_string());
        true
    }

    pub fn show_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn state(&self, id: &RecipeId) -> Option<&CardState> {
        self.cards.get(id).map(|card| &card.state)
    }

    /// Identities in render order
    pub fn ids(&self) -> &[RecipeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn pending_card(&mut self, id: &RecipeId) -> Option<&mut Card> {
        match self.cards.get_mut(id) {
            Some(card) if card.state == CardState::Skeleton => Some(card),
            Some(_) => {
                debug!("Card {} already resolved, ignoring", id);
                None
            }
            None => {
                debug!("No card for {}, ignoring", id);
                None
            }
        }
    }

    /// Markup for a single card
    pub fn render_card(&self, id: &RecipeId) -> Option<String> {
        self.cards
            .get(id)
            .map(|card| self.card_element(id, card).render())
    }

    /// Markup for the whole result area
    pub fn render(&self) -> String {
        if let Some(notice) = &self.notice {
            return notice_element(notice).render();
        }
        self.order
            .iter()
            .filter_map(|id| self.render_card(id))
            .collect()
    }

    fn card_element(&self, id: &RecipeId, card: &Card) -> Element {
        let root = Element::new("div")
            .attr("id", format!("card-{}", id))
            .attr("data-recipe-id", id.to_string());

        match &card.state {
            CardState::Skeleton => root
                .class("recipe-card skeleton")
                .child(plain_header(&card.display_name))
                .child(
                    Element::new("div")
                        .class("recipe-body")
                        .children((0..3).map(|_| Element::new("div").class("skeleton-line"))),
                ),
            CardState::Loaded(recipe) => root
                .class("recipe-card")
                .child(loaded_header(recipe))
                .child(
                    Element::new("div")
                        .class("recipe-body")
                        .child(self.ingredients_element(&recipe.ingredients))
                        .child(steps_element(&card.steps))
                        .child(
                            Element::new("div").class("action-area").child(
                                Element::new("button")
                                    .class("cook-btn")
                                    .attr("data-recipe-id", id.to_string())
                                    .text("Start Cooking"),
                            ),
                        ),
                ),
            CardState::Failed(reason) => root
                .class("recipe-card failed")
                .child(plain_header(&card.display_name))
                .child(
                    Element::new("div")
                        .class("recipe-body")
                        .child(Element::new("div").class("card-error").text(reason.as_str())),
                ),
        }
    }

    fn ingredients_element(&self, ingredients: &[String]) -> Element {
        let visible = ingredients.iter().take(self.ingredient_cap).map(|ingredient| {
            Element::new("span")
                .class("ing-tag")
                .text(ingredient.as_str())
        });
        let mut tags = Element::new("div").class("ingredient-tags").children(visible);
        let remaining = ingredients.len().saturating_sub(self.ingredient_cap);
        if remaining > 0 {
            tags = tags.child(
                Element::new("span")
                    .class("ing-tag more")
                    .text(format!("+{} more", remaining)),
            );
        }

        Element::new("div")
            .child(
                Element::new("h3")
                    .class("mini-section-title")
                    .text("Ingredients"),
            )
            .child(tags)
    }
}

fn plain_header(name: &str) -> Element {
    Element::new("div")
        .class("recipe-header")
        .child(Element::new("h2").class("recipe-title").text(name))
}

fn loaded_header(recipe: &RawRecipe) -> Element {
    let mut header = Element::new("div")
        .class("recipe-header")
        .child(Element::new("span").class("ai-badge").text("AI Generated"))
        .child(
            Element::new("h2")
                .class("recipe-title")
                .text(recipe.name.as_str()),
        )
        .child(
            Element::new("p")
                .class("recipe-desc")
                .text(recipe.description.as_str()),
        );

    let mut meta = Vec::new();
    if let Some(cuisine) = recipe.cuisine.as_deref().filter(|c| !c.trim().is_empty()) {
        meta.push(Element::new("span").class("meta-tag").text(cuisine));
    }
    if let Some(prep) = recipe.prep_time.as_ref().and_then(prep_time_label) {
        meta.push(Element::new("span").class("meta-tag").text(prep));
    }
    if !meta.is_empty() {
        header = header.child(Element::new("div").class("recipe-meta").children(meta));
    }
    header
}

fn prep_time_label(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(format!("{} min", n)),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

fn steps_element(steps: &[ParsedStep]) -> Element {
    Element::new("div")
        .child(Element::new("h3").class("mini-section-title").text("Steps"))
        .child(
            Element::new("ol")
                .class("recipe-steps")
                .children(steps.iter().map(|step| {
                    Element::new("li")
                        .child(
                            Element::new("span")
                                .class("step-num")
                                .text(step.step_number.to_string()),
                        )
                        .text(" ")
                        .lines(step.text.as_str())
                })),
        )
}

fn notice_element(notice: &Notice) -> Node {
    Element::new("div")
        .class("results-notice")
        .text(notice.message())
        .into()
}
