//! Error taxonomy shared by the sources, the stores and the city collection.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required credential or setting is missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested place does not resolve.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network failure, non-2xx status or malformed body.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl CoreError {
    /// Message shown to the user for a failed operation.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(msg) => msg.clone(),
            Self::NotFound(_) => "City not found".to_string(),
            Self::Transport(_) => "Could not fetch weather data, try again later".to_string(),
            Self::Persistence(_) => "Could not save the city list".to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
