//! Voice transcription source
//!
//! Speech capture is an external collaborator; the dashboard only needs a
//! small polled surface: start, stop, and the transcript so far. The mock
//! reveals a scripted phrase word by word, which is enough to drive the
//! VoiceInput panel in tests and offline demos.

use std::cell::Cell;

/// A push-to-talk transcription source
pub trait Transcriber: Send {
    fn start_recording(&mut self);
    fn stop_recording(&mut self);
    fn is_recording(&self) -> bool;
    /// Transcript accumulated so far in the current recording
    fn transcribed_text(&self) -> String;
}

/// Scripted transcriber: reveals one more word per poll while recording
pub struct MockTranscriber {
    phrase: String,
    recording: bool,
    revealed: Cell<usize>,
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::scripted("Schedule a dinner on February 19th from 6:30PM to 7:30PM with my mom")
    }
}

impl MockTranscriber {
    pub fn scripted(phrase: &str) -> Self {
        Self {
            phrase: phrase.to_string(),
            recording: false,
            revealed: Cell::new(0),
        }
    }
}

impl Transcriber for MockTranscriber {
    fn start_recording(&mut self) {
        self.recording = true;
        self.revealed.set(0);
    }

    fn stop_recording(&mut self) {
        self.recording = false;
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn transcribed_text(&self) -> String {
        let words: Vec<&str> = self.phrase.split_whitespace().collect();
        if self.recording {
            let next = (self.revealed.get() + 1).min(words.len());
            self.revealed.set(next);
        }
        words[..self.revealed.get()].join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveals_word_by_word() {
        let mut t = MockTranscriber::scripted("one two three");
        t.start_recording();
        assert_eq!(t.transcribed_text(), "one");
        assert_eq!(t.transcribed_text(), "one two");
        assert_eq!(t.transcribed_text(), "one two three");
        // Saturates at the full phrase.
        assert_eq!(t.transcribed_text(), "one two three");
    }

    #[test]
    fn test_transcript_frozen_after_stop() {
        let mut t = MockTranscriber::scripted("one two three");
        t.start_recording();
        let _ = t.transcribed_text();
        t.stop_recording();
        assert_eq!(t.transcribed_text(), "one");
        assert_eq!(t.transcribed_text(), "one");
    }

    #[test]
    fn test_restart_resets() {
        let mut t = MockTranscriber::scripted("a b");
        t.start_recording();
        let _ = t.transcribed_text();
        t.stop_recording();
        t.start_recording();
        assert_eq!(t.transcribed_text(), "a");
    }
}
