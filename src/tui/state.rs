//! Dashboard state - everything the render pass reads

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::client::SubmissionOutcome;
use crate::health::HealthSummary;

/// How long a toast stays on screen
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// A transient outcome notice on the dashboard footer
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub success: bool,
    pub at: Instant,
}

impl Toast {
    pub fn from_outcome(outcome: &SubmissionOutcome) -> Self {
        Self {
            message: outcome.message.clone(),
            success: outcome.success,
            at: Instant::now(),
        }
    }

    pub fn expired(&self) -> bool {
        self.at.elapsed() >= TOAST_TTL
    }
}

/// Main dashboard state
#[derive(Debug)]
pub struct DashboardState {
    /// Stress score shown under the title (computed elsewhere)
    pub stress_score: u8,

    // Health aggregator
    pub health_connected: bool,
    pub health_busy: bool,
    pub health_summary: Option<HealthSummary>,

    // Error banner
    pub show_error: bool,
    pub error_message: String,

    // Outcome toasts (newest first)
    pub toasts: VecDeque<Toast>,
    pub max_toasts: usize,

    pub should_quit: bool,
}

impl DashboardState {
    pub fn new(stress_score: u8) -> Self {
        Self {
            stress_score,
            health_connected: false,
            health_busy: false,
            health_summary: None,
            show_error: false,
            error_message: String::new(),
            toasts: VecDeque::new(),
            max_toasts: 8,
            should_quit: false,
        }
    }

    /// Record a submission outcome; failures also raise the error banner
    pub fn push_outcome(&mut self, outcome: &SubmissionOutcome) {
        if !outcome.success {
            self.report_error(outcome.message.clone());
        }
        self.toasts.push_front(Toast::from_outcome(outcome));
        if self.toasts.len() > self.max_toasts {
            self.toasts.pop_back();
        }
    }

    pub fn report_error(&mut self, message: String) {
        self.show_error = true;
        self.error_message = message;
    }

    pub fn dismiss_error(&mut self) {
        self.show_error = false;
        self.error_message.clear();
    }

    /// Newest toast still within its display window
    pub fn current_toast(&self) -> Option<&Toast> {
        self.toasts.front().filter(|t| !t.expired())
    }
}
