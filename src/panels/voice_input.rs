//! Voice input panel - dictate or type, then post to `/create-event`

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::client::SubmissionClient;
use crate::scene::PanelKind;
use crate::voice::Transcriber;

use super::{PanelShell, UiEvent};

/// Dictation panel; the transcript stays editable after recording stops
pub struct VoiceInputPanel {
    pub shell: PanelShell,
    pub input: String,
    transcriber: Box<dyn Transcriber>,
}

impl std::fmt::Debug for VoiceInputPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceInputPanel")
            .field("shell", &self.shell)
            .field("input", &self.input)
            .field("recording", &self.transcriber.is_recording())
            .finish()
    }
}

impl VoiceInputPanel {
    pub fn new() -> Self {
        Self::with_transcriber(Box::new(crate::voice::MockTranscriber::default()))
    }

    pub fn with_transcriber(transcriber: Box<dyn Transcriber>) -> Self {
        Self {
            shell: PanelShell::new(PanelKind::VoiceInput),
            input: String::new(),
            transcriber,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.transcriber.is_recording()
    }

    pub fn toggle_recording(&mut self) {
        if self.transcriber.is_recording() {
            // Capture the final transcript before stopping.
            self.input = self.transcriber.transcribed_text();
            self.transcriber.stop_recording();
        } else {
            self.transcriber.start_recording();
        }
    }

    /// Called each tick; mirrors the live transcript into the editable field
    /// while recording
    pub fn poll_transcription(&mut self) {
        if self.transcriber.is_recording() {
            self.input = self.transcriber.transcribed_text();
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn can_submit(&self) -> bool {
        !self.input.is_empty() && !self.shell.is_in_flight()
    }

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

impl Default for VoiceInputPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::PanelPhase;
    use crate::voice::MockTranscriber;
    use tokio::sync::mpsc;
    use url::Url;

    #[tokio::test(start_paused = true)]
    async fn test_recording_fills_input() {
        let mut panel =
            VoiceInputPanel::with_transcriber(Box::new(MockTranscriber::scripted("book a walk")));
        assert!(panel.input.is_empty());

        panel.toggle_recording();
        assert!(panel.is_recording());
        for _ in 0..8 {
            panel.poll_transcription();
        }
        panel.toggle_recording();
        assert!(!panel.is_recording());
        assert_eq!(panel.input, "book a walk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transcript_stays_editable() {
        let mut panel =
            VoiceInputPanel::with_transcriber(Box::new(MockTranscriber::scripted("hi")));
        panel.toggle_recording();
        for _ in 0..4 {
            panel.poll_transcription();
        }
        panel.toggle_recording();

        panel.backspace();
        panel.push_char('o');
        assert_eq!(panel.input, "ho");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_requires_text() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = Arc::new(SubmissionClient::new(
            Url::parse("http://127.0.0.1:1").unwrap(),
        ));

        let mut panel = VoiceInputPanel::new();
        panel.submit(&client, &tx);
        assert_eq!(panel.shell.phase(), PanelPhase::Visible);

        panel.push_char('x');
        panel.submit(&client, &tx);
        assert_eq!(panel.shell.phase(), PanelPhase::Closing);
    }
}
