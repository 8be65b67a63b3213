use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::model::{EnrichRequest, RawRecipe, RecipeId, SearchRequest, StoreEntry};

/// Calls the recipe server makes available to the result page.
///
/// Every method resolves to `Ok` only when the server answered
/// `success: true`; a `success: false` answer becomes
/// [`AppError::Upstream`] carrying the server's message.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// `POST /search`
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawRecipe>, AppError>;

    /// `POST /cook-with-ai`, the per-card enrichment call
    async fn cook_with_ai(&self, request: &EnrichRequest) -> Result<RawRecipe, AppError>;

    /// `POST /cooking-assistant-recipe`, returns the page markup
    async fn cooking_assistant_recipe(&self, entry: &StoreEntry) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct SearchReply {
    success: bool,
    /// Decoded per record; malformed entries are skipped
    #[serde(default)]
    recipes: Option<Vec<Value>>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecipeReply {
    success: bool,
    recipe: Option<RawRecipe>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PageReply {
    success: bool,
    html: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

fn upstream(message: Option<String>, error: Option<String>, fallback: &str) -> AppError {
    let text = error
        .or(message)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    AppError::Upstream(text)
}

impl SearchReply {
    fn into_result(self) -> Result<Vec<RawRecipe>, AppError> {
        if self.success {
            Ok(self
                .recipes
                .unwrap_or_default()
                .into_iter()
                .filter_map(|value| match serde_json::from_value::<RawRecipe>(value) {
                    Ok(recipe) => Some(recipe),
                    Err(e) => {
                        warn!("Skipping malformed recipe in search results: {}", e);
                        None
                    }
                })
                .collect())
        } else {
            Err(upstream(self.message, self.error, "No recipes found."))
        }
    }
}

impl RecipeReply {
    fn into_result(self) -> Result<RawRecipe, AppError> {
        match (self.success, self.recipe) {
            (true, Some(recipe)) => Ok(recipe),
            (true, None) => Err(AppError::Upstream(
                "Response did not include a recipe".to_string(),
            )),
            (false, _) => Err(upstream(self.message, self.error, "Recipe not found")),
        }
    }
}

impl PageReply {
    fn into_result(self) -> Result<String, AppError> {
        match (self.success, self.html) {
            (true, Some(html)) => Ok(html),
            (true, None) => Err(AppError::Upstream(
                "Response did not include a page".to_string(),
            )),
            (false, _) => Err(upstream(
                self.message,
                self.error,
                "Could not load the cooking assistant",
            )),
        }
    }
}

/// Build the navigation target `GET /cooking-assistant?recipe_id=<id>`.
pub fn cooking_assistant_url(base_url: &str, id: &RecipeId) -> Result<Url, AppError> {
    let mut url = base(base_url)?
        .join("cooking-assistant")
        .map_err(|e| AppError::InvalidUrl(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("recipe_id", &id.to_string());
    Ok(url)
}

fn base(base_url: &str) -> Result<Url, AppError> {
    // Url::join replaces the last path segment unless the base ends in '/'
    let mut base_url = base_url.trim().to_string();
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    Url::parse(&base_url).map_err(|e| AppError::InvalidUrl(format!("{}: {}", base_url, e)))
}

/// [`RecipeApi`] over HTTP with JSON bodies
pub struct HttpRecipeApi {
    client: Client,
    base_url: Url,
}

impl HttpRecipeApi {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("recipe-cards/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base(&config.base_url)?,
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            client: Client::new(),
            base_url: base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn assistant_url(&self, id: &RecipeId) -> Result<Url, AppError> {
        cooking_assistant_url(self.base_url.as_str(), id)
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, AppError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| AppError::InvalidUrl(e.to_string()))?;
        debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawRecipe>, AppError> {
        self.post::<_, SearchReply>("search", request)
            .await?
            .into_result()
    }

    async fn cook_with_ai(&self, request: &EnrichRequest) -> Result<RawRecipe, AppError> {
        self.post::<_, RecipeReply>("cook-with-ai", request)
            .await?
            .into_result()
    }

    async fn cooking_assistant_recipe(&self, entry: &StoreEntry) -> Result<String, AppError> {
        self.post::<_, PageReply>("cooking-assistant-recipe", entry)
            .await?
            .into_result()
    }
}
