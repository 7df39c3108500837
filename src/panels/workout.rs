//! Workout panel - two-step plan generation and booking

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::client::SubmissionClient;
use crate::scene::PanelKind;

use super::{PanelShell, UiEvent};

/// One-button panel driving the get-plan / add-to-calendar pair
#[derive(Debug)]
pub struct WorkoutPanel {
    pub shell: PanelShell,
}

impl WorkoutPanel {
    pub fn new() -> Self {
        Self {
            shell: PanelShell::new(PanelKind::Workout),
        }
    }

    pub fn submit(&mut self, client: &Arc<SubmissionClient>, events: &UnboundedSender<UiEvent>) {
        if !self.shell.begin_submit() {
            return;
        }

        let client = Arc::clone(client);
        let events = events.clone();
        tokio::spawn(async move {
            let outcome = client.submit_workout().await;
            let _ = events.send(UiEvent::Submission(outcome));
        });

        self.shell.begin_close();
    }
}

impl Default for WorkoutPanel {
    fn default() -> Self {
        Self::new()
    }
}
