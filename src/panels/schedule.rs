//! Schedule panel - free-text event creation

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::client::SubmissionClient;
use crate::scene::PanelKind;

use super::{PanelShell, UiEvent};

/// Text-entry panel posting to `/create-event`
#[derive(Debug)]
pub struct SchedulePanel {
    pub shell: PanelShell,
    pub input: String,
}

impl SchedulePanel {
    pub fn new() -> Self {
        Self {
            shell: PanelShell::new(PanelKind::Schedule),
            input: String::new(),
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Submit disabled while the input is empty
    pub fn can_submit(&self) -> bool {
        !self.input.is_empty() && !self.shell.is_in_flight()
    }

    /// Dispatch the submission and start the dismiss fade. The outcome lands
    /// on the toast queue after the panel is gone.
    pub fn submit(&mut self, client: &Arc<SubmissionClient>, events: &UnboundedSender<UiEvent>) {
        if self.input.is_empty() || !self.shell.begin_submit() {
            return;
        }

        let submitted = std::mem::take(&mut self.input);
        let client = Arc::clone(client);
        let events = events.clone();
        tokio::spawn(async move {
            let outcome = client.create_event(&submitted).await;
            let _ = events.send(UiEvent::Submission(outcome));
        });

        self.shell.begin_close();
    }
}

impl Default for SchedulePanel {
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

    fn client() -> Arc<SubmissionClient> {
        Arc::new(SubmissionClient::new(
            Url::parse("http://127.0.0.1:1").unwrap(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_cannot_submit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut panel = SchedulePanel::new();
        assert!(!panel.can_submit());

        panel.submit(&client(), &tx);
        assert_eq!(panel.shell.phase(), PanelPhase::Visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_clears_input_and_closes() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut panel = SchedulePanel::new();
        for c in "dinner at 7".chars() {
            panel.push_char(c);
        }
        assert!(panel.can_submit());

        panel.submit(&client(), &tx);
        assert!(panel.input.is_empty());
        assert_eq!(panel.shell.phase(), PanelPhase::Closing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_editing() {
        let mut panel = SchedulePanel::new();
        panel.push_char('h');
        panel.push_char('i');
        panel.backspace();
        assert_eq!(panel.input, "h");
    }
}
