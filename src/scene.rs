//! Scene controller - panel visibility and model animation orchestration
//!
//! The controller owns which feature panel is active (at most one, by
//! construction) and drives the cosmetic animations on the particle-wave
//! scene. It never touches the render objects directly: animation intent is
//! emitted as [`SceneCommand`] data on a channel, and the render layer applies
//! whatever arrives. If no render layer is attached, every animation operation
//! is a silent no-op.
//!
//! Timed effects (the blink-then-rotate-back that follows a panel hide, the
//! loading rotation loop) run as background tasks holding a cancellation
//! token captured at schedule time. Teardown or re-entry cancels the token,
//! so a stale effect can never fire against a scene that has moved on.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Duration of a single rotate transaction
pub const ROTATE_DURATION: Duration = Duration::from_secs(2);

/// Period of the blink opacity toggle
pub const BLINK_PERIOD: Duration = Duration::from_millis(1500);

/// Duration of one opacity fade within a blink
pub const BLINK_FADE: Duration = Duration::from_millis(750);

/// Period of the loading rotation loop
pub const LOADING_PERIOD: Duration = Duration::from_secs(2);

/// Quarter turn, the rotation step used by show/hide transitions
pub const QUARTER_TURN: f32 = std::f32::consts::FRAC_PI_2;

/// Opacity floor while blinking
const BLINK_DIM: f32 = 0.1;

// ─────────────────────────────────────────────────────────────────────────────
// Panel Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The five feature panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Schedule,
    Workout,
    Destressor,
    VoiceInput,
    HeartRisk,
}

impl PanelKind {
    pub const ALL: [PanelKind; 5] = [
        PanelKind::Destressor,
        PanelKind::Workout,
        PanelKind::HeartRisk,
        PanelKind::Schedule,
        PanelKind::VoiceInput,
    ];

    /// Launcher button label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Schedule => "Schedule",
            Self::Workout => "Workouts",
            Self::Destressor => "Destressor",
            Self::VoiceInput => "Voice",
            Self::HeartRisk => "Heart Risk",
        }
    }

    /// How long the scene keeps blinking after this panel hides before the
    /// rotate-back fires
    pub fn hide_delay(&self) -> Duration {
        match self {
            Self::Schedule | Self::VoiceInput | Self::HeartRisk => Duration::from_secs(3),
            Self::Workout => Duration::from_secs(6),
            Self::Destressor => Duration::from_secs(8),
        }
    }
}

impl std::fmt::Display for PanelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Animation intent, applied by the render layer
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    /// Rotate the model by `radians` over `duration`
    RotateBy { radians: f32, duration: Duration },
    /// Fade the model to `opacity` over `duration`
    SetOpacity { opacity: f32, duration: Duration },
    /// Fade the model back to fully visible
    ResetOpacity { duration: Duration },
    /// Return the model to its baseline orientation
    ResetRotation { duration: Duration },
}

// ─────────────────────────────────────────────────────────────────────────────
// Scene Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Owns panel visibility and schedules animation effects
#[derive(Debug)]
pub struct SceneController {
    /// At most one active panel, enforced by construction
    active_panel: Option<PanelKind>,
    /// Command sink; `None` until a render layer attaches
    commands: Option<mpsc::UnboundedSender<SceneCommand>>,
    /// End of the rotation currently in flight, if any
    animating_until: Option<Instant>,
    /// The running blink loop, if any
    blink: Option<CancellationToken>,
    /// Pending delayed hide effects, one per panel
    hide_effects: HashMap<PanelKind, CancellationToken>,
    /// The running loading rotation loop, if any
    loading: Option<CancellationToken>,
}

impl Default for SceneController {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneController {
    /// Create a controller with no render layer attached
    pub fn new() -> Self {
        Self {
            active_panel: None,
            commands: None,
            animating_until: None,
            blink: None,
            hide_effects: HashMap::new(),
            loading: None,
        }
    }

    /// Attach the render layer's command sink
    pub fn attach(&mut self, sink: mpsc::UnboundedSender<SceneCommand>) {
        self.commands = Some(sink);
    }

    pub fn active_panel(&self) -> Option<PanelKind> {
        self.active_panel
    }

    pub fn is_visible(&self, panel: PanelKind) -> bool {
        self.active_panel == Some(panel)
    }

    /// A rotation transaction is currently in flight
    pub fn is_animating(&self) -> bool {
        self.animating_until.is_some_and(|until| Instant::now() < until)
    }

    pub fn is_blinking(&self) -> bool {
        self.blink.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    pub fn is_loading(&self) -> bool {
        self.loading.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Flip a panel's visibility.
    ///
    /// Single-select: activating a panel deactivates whichever panel was
    /// active before it, running that panel's hide effects first.
    pub fn toggle(&mut self, panel: PanelKind) {
        match self.active_panel {
            Some(active) if active == panel => {
                self.active_panel = None;
                self.on_hide(panel);
            }
            Some(active) => {
                self.active_panel = Some(panel);
                self.on_hide(active);
                self.on_show(panel);
            }
            None => {
                self.active_panel = Some(panel);
                self.on_show(panel);
            }
        }
    }

    /// Deactivate a panel if it is the active one (the panel-exit path)
    pub fn clear(&mut self, panel: PanelKind) {
        if self.active_panel == Some(panel) {
            self.active_panel = None;
            self.on_hide(panel);
        }
    }

    fn send(&self, command: SceneCommand) {
        if let Some(sink) = &self.commands {
            let _ = sink.send(command);
        }
    }

    fn on_show(&mut self, panel: PanelKind) {
        // Re-entry: a pending hide effect for this panel must not fire later.
        // Its stop-blink dies with it, so the show restores opacity itself.
        if let Some(token) = self.hide_effects.remove(&panel) {
            token.cancel();
            if self.is_blinking() {
                self.stop_blinking();
            }
        }
        self.rotate_forward();
    }

    fn on_hide(&mut self, panel: PanelKind) {
        if self.commands.is_none() {
            return;
        }
        self.start_blinking();
        self.schedule_rotate_back(panel);
    }

    /// Rotate a quarter turn forward. Dropped, not queued, while another
    /// rotation is in flight.
    pub fn rotate_forward(&mut self) {
        if self.commands.is_none() || self.is_animating() {
            return;
        }
        self.animating_until = Some(Instant::now() + ROTATE_DURATION);
        self.send(SceneCommand::RotateBy {
            radians: QUARTER_TURN,
            duration: ROTATE_DURATION,
        });
    }

    /// Start the blink loop (opacity toggle every 1.5 s). Idempotent while a
    /// loop is running.
    pub fn start_blinking(&mut self) {
        if self.commands.is_none() || self.is_blinking() {
            return;
        }

        let token = CancellationToken::new();
        let sink = self.commands.clone().expect("checked above");
        let loop_token = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(BLINK_PERIOD);
            let mut visible = true;
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        visible = !visible;
                        let opacity = if visible { 1.0 } else { BLINK_DIM };
                        if sink.send(SceneCommand::SetOpacity { opacity, duration: BLINK_FADE }).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.blink = Some(token);
    }

    /// Stop the blink loop and restore full opacity
    pub fn stop_blinking(&mut self) {
        if let Some(token) = self.blink.take() {
            token.cancel();
        }
        self.send(SceneCommand::ResetOpacity { duration: BLINK_FADE });
    }

    /// Schedule the delayed stop-blink + rotate-back that follows a hide.
    ///
    /// Each hide owns its token, so overlapping hides from different panels
    /// all complete; cancelling one leaves the others live.
    fn schedule_rotate_back(&mut self, panel: PanelKind) {
        let token = CancellationToken::new();
        let sink = self.commands.clone().expect("caller checked");
        // The fired effect stops the blink loop it was scheduled against.
        let blink = self.blink.clone();
        let effect_token = token.clone();
        let delay = panel.hide_delay();

        tokio::spawn(async move {
            tokio::select! {
                _ = effect_token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if let Some(blink) = blink {
                blink.cancel();
            }
            let _ = sink.send(SceneCommand::ResetOpacity { duration: BLINK_FADE });
            let _ = sink.send(SceneCommand::RotateBy {
                radians: -QUARTER_TURN,
                duration: ROTATE_DURATION,
            });
            // Mark the effect spent so re-entry cancellation is a no-op.
            effect_token.cancel();
        });

        // A hide scheduled while one is already pending for this panel
        // replaces it (the old one is cancelled, not leaked).
        if let Some(old) = self.hide_effects.insert(panel, token) {
            old.cancel();
        }
    }

    /// Begin the continuous rotation loop shown while an unrelated call is in
    /// flight
    pub fn start_loading_rotation(&mut self) {
        if self.commands.is_none() || self.is_loading() {
            return;
        }

        let token = CancellationToken::new();
        let sink = self.commands.clone().expect("checked above");
        let loop_token = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(LOADING_PERIOD);
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let command = SceneCommand::RotateBy {
                            radians: QUARTER_TURN,
                            duration: ROTATE_DURATION,
                        };
                        if sink.send(command).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        self.loading = Some(token);
    }

    /// End the loading loop and restore the baseline orientation
    pub fn stop_loading_rotation(&mut self) {
        if let Some(token) = self.loading.take() {
            token.cancel();
        }
        self.send(SceneCommand::ResetRotation {
            duration: ROTATE_DURATION,
        });
    }
}

impl Drop for SceneController {
    fn drop(&mut self) {
        // Scheduled effects must not outlive the controller.
        if let Some(token) = self.blink.take() {
            token.cancel();
        }
        if let Some(token) = self.loading.take() {
            token.cancel();
        }
        for (_, token) in self.hide_effects.drain() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached() -> (SceneController, mpsc::UnboundedReceiver<SceneCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut controller = SceneController::new();
        controller.attach(tx);
        (controller, rx)
    }

    /// Let spawned effect tasks run, then collect everything they sent
    async fn drain(rx: &mut mpsc::UnboundedReceiver<SceneCommand>) -> Vec<SceneCommand> {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        let mut commands = Vec::new();
        while let Ok(command) = rx.try_recv() {
            commands.push(command);
        }
        commands
    }

    fn rotate_backs(commands: &[SceneCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::RotateBy { radians, .. } if *radians < 0.0))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_twice_restores_visibility() {
        let (mut controller, _rx) = attached();
        for panel in PanelKind::ALL {
            let before = controller.is_visible(panel);
            controller.toggle(panel);
            controller.toggle(panel);
            assert_eq!(controller.is_visible(panel), before);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_select() {
        let (mut controller, _rx) = attached();
        controller.toggle(PanelKind::Schedule);
        controller.toggle(PanelKind::Workout);
        assert_eq!(controller.active_panel(), Some(PanelKind::Workout));
        assert!(!controller.is_visible(PanelKind::Schedule));
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_rotates_forward_once() {
        let (mut controller, mut rx) = attached();
        controller.toggle(PanelKind::Schedule);
        // A second rotation request within the 2s window is dropped.
        controller.rotate_forward();

        let commands = drain(&mut rx).await;
        let forwards = commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::RotateBy { radians, .. } if *radians > 0.0))
            .count();
        assert_eq!(forwards, 1);
        assert!(controller.is_animating());

        tokio::time::advance(ROTATE_DURATION + Duration::from_millis(10)).await;
        assert!(!controller.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_blinks_then_rotates_back() {
        let (mut controller, mut rx) = attached();
        controller.toggle(PanelKind::Schedule);
        controller.toggle(PanelKind::Schedule);
        assert!(controller.is_blinking());

        // Within the delay window: blink toggles but no rotate-back yet.
        tokio::time::advance(Duration::from_millis(1600)).await;
        let commands = drain(&mut rx).await;
        assert!(commands
            .iter()
            .any(|c| matches!(c, SceneCommand::SetOpacity { .. })));
        assert_eq!(rotate_backs(&commands), 0);

        // Past the 3s window: blink stops, opacity resets, model rotates back.
        tokio::time::advance(Duration::from_secs(2)).await;
        let commands = drain(&mut rx).await;
        assert!(commands
            .iter()
            .any(|c| matches!(c, SceneCommand::ResetOpacity { .. })));
        assert_eq!(rotate_backs(&commands), 1);
        assert!(!controller.is_blinking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_hides_both_rotate_back() {
        let (mut controller, mut rx) = attached();

        // Hide Destressor (8s window), then hide Schedule (3s window) inside it.
        controller.toggle(PanelKind::Destressor);
        controller.toggle(PanelKind::Destressor);
        controller.toggle(PanelKind::Schedule);
        controller.toggle(PanelKind::Schedule);
        let _ = drain(&mut rx).await;

        tokio::time::advance(Duration::from_millis(3100)).await;
        let commands = drain(&mut rx).await;
        assert_eq!(rotate_backs(&commands), 1, "shorter window fires first");

        tokio::time::advance(Duration::from_secs(5)).await;
        let commands = drain(&mut rx).await;
        assert_eq!(rotate_backs(&commands), 1, "longer window is not lost");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentry_cancels_pending_hide() {
        let (mut controller, mut rx) = attached();
        controller.toggle(PanelKind::Schedule);
        controller.toggle(PanelKind::Schedule);
        tokio::time::advance(ROTATE_DURATION + Duration::from_millis(100)).await;
        let _ = drain(&mut rx).await;

        // Reopen before the 3s window elapses: the stale effect must not fire.
        controller.toggle(PanelKind::Schedule);
        tokio::time::advance(Duration::from_secs(10)).await;
        let commands = drain(&mut rx).await;
        assert_eq!(rotate_backs(&commands), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_scheduled_effects() {
        let (mut controller, mut rx) = attached();
        controller.toggle(PanelKind::Schedule);
        controller.toggle(PanelKind::Schedule);
        let _ = drain(&mut rx).await;

        drop(controller);
        tokio::time::advance(Duration::from_secs(10)).await;
        let commands = drain(&mut rx).await;
        assert_eq!(rotate_backs(&commands), 0);
        assert!(!commands
            .iter()
            .any(|c| matches!(c, SceneCommand::ResetOpacity { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_controller_is_a_noop() {
        let mut controller = SceneController::new();
        controller.toggle(PanelKind::HeartRisk);
        controller.rotate_forward();
        controller.start_blinking();
        controller.start_loading_rotation();
        controller.stop_loading_rotation();

        // Visibility state still flips; animation state never engages.
        assert!(controller.is_visible(PanelKind::HeartRisk));
        assert!(!controller.is_animating());
        assert!(!controller.is_blinking());
        assert!(!controller.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_rotation_loops_until_stopped() {
        let (mut controller, mut rx) = attached();
        controller.start_loading_rotation();
        assert!(controller.is_loading());

        tokio::time::advance(Duration::from_millis(4100)).await;
        let commands = drain(&mut rx).await;
        let forwards = commands
            .iter()
            .filter(|c| matches!(c, SceneCommand::RotateBy { radians, .. } if *radians > 0.0))
            .count();
        assert!(forwards >= 3, "immediate tick plus two periods, got {}", forwards);

        controller.stop_loading_rotation();
        assert!(!controller.is_loading());
        let commands = drain(&mut rx).await;
        assert!(commands
            .iter()
            .any(|c| matches!(c, SceneCommand::ResetRotation { .. })));

        // Loop is gone: no further rotations arrive.
        tokio::time::advance(Duration::from_secs(6)).await;
        let commands = drain(&mut rx).await;
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, SceneCommand::RotateBy { .. }))
                .count(),
            0
        );
    }
}
