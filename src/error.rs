use thiserror::Error;

use crate::model::RecipeId;

/// Errors that can occur while searching, enriching or opening recipes
#[derive(Error, Debug)]
pub enum AppError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server answered with a non-success status code
    #[error("Server responded with status: {0}")]
    Status(u16),

    /// Server answered `success: false`
    #[error("{0}")]
    Upstream(String),

    /// Cooking assistant was opened for a recipe that never resolved
    #[error("Could not find recipe data for {0}")]
    RecipeNotCached(RecipeId),

    /// Base URL or endpoint could not be joined into a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// Whether the failure happened below the application layer
    /// (network, status, decoding) rather than being reported by the server.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Http(_) | AppError::Decode(_) | AppError::Status(_) | AppError::InvalidUrl(_)
        )
    }
}
