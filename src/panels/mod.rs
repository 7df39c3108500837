//! Feature panels - the five full-screen interaction flows
//!
//! Every panel follows the same protocol: mount with a fade-in, gather input,
//! dispatch its submission without waiting for the outcome, fade out, then
//! clear its visibility flag in the scene controller. Outcomes that resolve
//! after the panel is gone land on the dashboard's toast queue.
//!
//! The single-flight guard is uniform: a second submit while one is already
//! in flight is ignored, for every variant.

mod destressor;
mod heart_risk;
mod schedule;
mod voice_input;
mod workout;

pub use destressor::DestressorPanel;
pub use heart_risk::{HeartRiskPanel, HeartRiskReport};
pub use schedule::SchedulePanel;
pub use voice_input::VoiceInputPanel;
pub use workout::WorkoutPanel;

use std::time::Duration;

use tokio::time::Instant;

use crate::client::{HeartRiskResponse, SubmissionOutcome};
use crate::health::HealthSummary;
use crate::scene::PanelKind;

/// Mount/dismiss fade duration
pub const FADE: Duration = Duration::from_millis(300);

/// Events flowing back to the dashboard from background tasks
#[derive(Debug)]
pub enum UiEvent {
    /// A fire-and-forget submission resolved (possibly after panel teardown)
    Submission(SubmissionOutcome),
    /// The heart-risk check resolved; the panel is still open and waiting
    HeartRisk(Result<HeartRiskResponse, String>),
    /// The health aggregator connect/refresh resolved
    Health(Result<HealthSummary, String>),
}

/// Lifecycle phase shared by all panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPhase {
    /// Mounted, gathering input
    Visible,
    /// A blocking call is in flight (HeartRisk only stays here visibly)
    Submitting,
    /// Blocking result on display, dismissal allowed (HeartRisk only)
    Result,
    /// Fading out; the visibility flag clears when the fade completes
    Closing,
}

/// State common to every panel: phase, fade timing, single-flight guard
#[derive(Debug)]
pub struct PanelShell {
    kind: PanelKind,
    phase: PanelPhase,
    mounted_at: Instant,
    closing_since: Option<Instant>,
    in_flight: bool,
}

impl PanelShell {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            phase: PanelPhase::Visible,
            mounted_at: Instant::now(),
            closing_since: None,
            in_flight: false,
        }
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    pub fn is_closing(&self) -> bool {
        self.phase == PanelPhase::Closing
    }

    /// Current opacity for rendering: 0 -> 1 over the mount fade, 1 -> 0 over
    /// the dismiss fade
    pub fn opacity(&self) -> f32 {
        match self.closing_since {
            Some(since) => {
                let elapsed = since.elapsed().as_secs_f32();
                (1.0 - elapsed / FADE.as_secs_f32()).clamp(0.0, 1.0)
            }
            None => {
                let elapsed = self.mounted_at.elapsed().as_secs_f32();
                (elapsed / FADE.as_secs_f32()).clamp(0.0, 1.0)
            }
        }
    }

    /// Claim the single-flight slot. Returns false (and the caller must
    /// ignore the submit) if a submission is already in flight.
    pub fn begin_submit(&mut self) -> bool {
        if self.in_flight {
            tracing::debug!(panel = %self.kind, "Ignoring re-entrant submit");
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Release the single-flight slot (blocking flows that keep the panel
    /// open, i.e. HeartRisk)
    pub fn finish_submit(&mut self) {
        self.in_flight = false;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn set_phase(&mut self, phase: PanelPhase) {
        self.phase = phase;
    }

    /// Start the dismiss fade. Idempotent.
    pub fn begin_close(&mut self) {
        if self.phase == PanelPhase::Closing {
            return;
        }
        self.phase = PanelPhase::Closing;
        self.closing_since = Some(Instant::now());
    }

    /// The dismiss fade has completed; time to clear the visibility flag
    pub fn close_finished(&self) -> bool {
        self.closing_since
            .is_some_and(|since| since.elapsed() >= FADE)
    }
}

/// The currently mounted panel, if any
#[derive(Debug)]
pub enum ActivePanel {
    Schedule(SchedulePanel),
    Workout(WorkoutPanel),
    Destressor(DestressorPanel),
    VoiceInput(VoiceInputPanel),
    HeartRisk(HeartRiskPanel),
}

impl ActivePanel {
    /// Mount the panel for a kind
    pub fn mount(kind: PanelKind) -> Self {
        match kind {
            PanelKind::Schedule => Self::Schedule(SchedulePanel::new()),
            PanelKind::Workout => Self::Workout(WorkoutPanel::new()),
            PanelKind::Destressor => Self::Destressor(DestressorPanel::new()),
            PanelKind::VoiceInput => Self::VoiceInput(VoiceInputPanel::new()),
            PanelKind::HeartRisk => Self::HeartRisk(HeartRiskPanel::new()),
        }
    }

    pub fn kind(&self) -> PanelKind {
        self.shell().kind()
    }

    pub fn shell(&self) -> &PanelShell {
        match self {
            Self::Schedule(p) => &p.shell,
            Self::Workout(p) => &p.shell,
            Self::Destressor(p) => &p.shell,
            Self::VoiceInput(p) => &p.shell,
            Self::HeartRisk(p) => &p.shell,
        }
    }

    pub fn shell_mut(&mut self) -> &mut PanelShell {
        match self {
            Self::Schedule(p) => &mut p.shell,
            Self::Workout(p) => &mut p.shell,
            Self::Destressor(p) => &mut p.shell,
            Self::VoiceInput(p) => &mut p.shell,
            Self::HeartRisk(p) => &mut p.shell,
        }
    }
}
