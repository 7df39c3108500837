//! Destressor panel - two-step recommendation fetch and booking

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::client::{random_slot_within_week, DestressorRequest, SubmissionClient};
use crate::scene::PanelKind;

use super::{PanelShell, UiEvent};

/// One-button panel driving the recommend / add-to-calendar pair
#[derive(Debug)]
pub struct DestressorPanel {
    pub shell: PanelShell,
    pub request: DestressorRequest,
}

impl DestressorPanel {
    pub fn new() -> Self {
        Self {
            shell: PanelShell::new(PanelKind::Destressor),
            request: DestressorRequest::default(),
        }
    }

    pub fn submit(&mut self, client: &Arc<SubmissionClient>, events: &UnboundedSender<UiEvent>) {
        if !self.shell.begin_submit() {
            return;
        }

        let client = Arc::clone(client);
        let events = events.clone();
        let request = self.request.clone();
        tokio::spawn(async move {
            let slot = random_slot_within_week();
            let outcome = client.submit_destressor(&request, &slot).await;
            let _ = events.send(UiEvent::Submission(outcome));
        });

        self.shell.begin_close();
    }
}

impl Default for DestressorPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::PanelPhase;
    use tokio::sync::mpsc;
    use url::Url;

    #[tokio::test(start_paused = true)]
    async fn test_submit_closes_and_guards() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = Arc::new(SubmissionClient::new(
            Url::parse("http://127.0.0.1:1").unwrap(),
        ));

        let mut panel = DestressorPanel::new();
        panel.submit(&client, &tx);
        assert_eq!(panel.shell.phase(), PanelPhase::Closing);
        assert!(panel.shell.is_in_flight());
    }

    #[test]
    fn test_default_request_shape() {
        let panel = DestressorPanel::new();
        assert_eq!(panel.request.stress_level, 5);
        assert_eq!(panel.request.available_time, 30);
    }
}
