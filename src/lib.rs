//! Flowstate - terminal wellness dashboard

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod panels;
pub mod scene;
pub mod tui;
pub mod voice;

pub use client::{DestressorRequest, HeartRiskResponse, SubmissionClient, SubmissionOutcome};
pub use config::FlowConfig;
pub use error::{FixSuggestion, FlowError};
pub use health::{HealthSource, HealthSummary, MockHealthSource, TerraClient};
pub use scene::{PanelKind, SceneCommand, SceneController};
