//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Config error: {reason}")]
    Config { reason: String },

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} returned status {status}")]
    BadStatus { endpoint: String, status: u16 },

    #[error("Could not decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Health source error: {reason}")]
    HealthSource { reason: String },

    #[error("Health source not connected")]
    NotConnected,

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixSuggestion for FlowError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FlowError::Config { .. } => {
                Some("Check ~/.config/flowstate/config.toml syntax and permissions")
            }
            FlowError::InvalidUrl { .. } => {
                Some("Set backend_url to a full URL, e.g. http://127.0.0.1:5002")
            }
            FlowError::Transport { .. } => {
                Some("Verify the backend service is running and reachable")
            }
            FlowError::BadStatus { .. } => Some("Check the backend service logs"),
            FlowError::Decode { .. } => {
                Some("The backend returned an unexpected payload shape - check its version")
            }
            FlowError::HealthSource { .. } => {
                Some("Check TERRA_API_KEY and TERRA_DEV_ID are set (env or config file)")
            }
            FlowError::NotConnected => Some("Connect the health source first (press 'c')"),
            FlowError::Io(_) => Some("Check the terminal supports raw mode"),
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, FlowError>;
