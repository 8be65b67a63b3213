use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable key for a recipe within a search cycle and within the cache.
///
/// The backend hands out integer row ids, other sources use strings; both
/// are accepted and serialized back in the shape they arrived in. Identity
/// is the textual form, so `42` and `"42"` name the same recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Number(i64),
    Text(String),
}

impl PartialEq for RecipeId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RecipeId::Number(a), RecipeId::Number(b)) => a == b,
            (RecipeId::Text(a), RecipeId::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for RecipeId {}

impl Hash for RecipeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Number(n) => write!(f, "{}", n),
            RecipeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecipeId {
    fn from(id: i64) -> Self {
        RecipeId::Number(id)
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        RecipeId::Text(id.to_string())
    }
}

impl From<String> for RecipeId {
    fn from(id: String) -> Self {
        RecipeId::Text(id)
    }
}

/// Recipe payload exactly as the server sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecipe {
    pub id: RecipeId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub ingredients: Vec<String>,
    /// Untyped instruction entries; see [`crate::normalize::normalize_value`]
    #[serde(default, deserialize_with = "one_or_many")]
    pub instructions: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient_tips",
        skip_serializing_if = "Option::is_none"
    )]
    pub tips: Option<Vec<String>>,
    /// Fields this client does not interpret (similarity, image_url, diet, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Value>),
    One(Value),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(values) => values,
        OneOrMany::One(Value::Null) => Vec::new(),
        OneOrMany::One(value) => vec![value],
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Scalar as text; null and non-scalars become `None`.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Null becomes empty, a lone string becomes one entry, null entries are skipped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_list(Value::deserialize(deserializer)?))
}

fn lenient_tips<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        value => Some(string_list(value)),
    })
}

/// One cleaned instruction with the timers detected in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStep {
    pub step_number: usize,
    /// Normalized instruction text
    pub text: String,
    /// Durations mentioned in the step, in minutes
    pub timers: Vec<f64>,
    pub has_timer: bool,
}

/// Cached payload for one recipe; also the body of `/cooking-assistant-recipe`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub recipe: RawRecipe,
    pub parsed_steps: Vec<ParsedStep>,
}

/// Body of `POST /search`
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub category: String,
}

/// Body of `POST /cook-with-ai`
#[derive(Debug, Clone, Serialize)]
pub struct EnrichRequest {
    pub recipe_id: RecipeId,
    pub query: String,
}
