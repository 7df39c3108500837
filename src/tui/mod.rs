//! TUI Module - Wellness Dashboard
//!
//! Terminal interface for the FlowState wellness dashboard.
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      RENDER LAYER (scene_view, app render fns)      │
//! │  Pure rendering. Applies SceneCommands, draws panels and toasts.    │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ SceneCommand stream / DashboardState
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      DOMAIN LAYER (scene, panels, state)            │
//! │  SceneController + panel lifecycles. Emits animation commands.      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ UiEvent stream
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    CONNECTOR LAYER (client, health)                 │
//! │  Async IO. Submissions and health fetches resolve off the UI loop.  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod events;
mod scene_view;
mod state;
mod theme;

pub use app::DashboardApp;
pub use events::{handle_key_event, Action, InputMode};
pub use scene_view::SceneView;
pub use state::DashboardState;
pub use theme::GlassTheme;

use crate::client::SubmissionClient;
use crate::health::HealthSource;

/// Run the dashboard
pub async fn run(
    client: SubmissionClient,
    health: Box<dyn HealthSource>,
    stress_score: u8,
) -> anyhow::Result<()> {
    let app = DashboardApp::new(client, health, stress_score);
    app.run().await
}
