use thiserror::Error;

use crate::graphql::GraphqlError;

pub type Result<T> = std::result::Result<T, DemarchesError>;

#[derive(Debug, Error)]
pub enum DemarchesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// Top-level `errors` array of a GraphQL response.
    #[error("GraphQL error: {message}")]
    Graphql {
        message: String,
        errors: Vec<GraphqlError>,
    },

    /// The mutation ran but its payload carried business errors.
    #[error("{operation} rejected: {}", .messages.join("; "))]
    Mutation {
        operation: String,
        messages: Vec<String>,
    },

    #[error("Missing data in response: {0}")]
    MissingData(String),

    #[error("No instructeur id set on the action or the profile")]
    MissingInstructeurId,

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl DemarchesError {
    /// Builds a `Graphql` error from the response's error list.
    pub(crate) fn from_graphql_errors(errors: Vec<GraphqlError>) -> Self {
        let message = errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        DemarchesError::Graphql { message, errors }
    }
}
