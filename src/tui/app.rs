//! Dashboard application - main entry point and run loop

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::{mpsc, Mutex};

use crate::client::SubmissionClient;
use crate::error::FlowError;
use crate::health::{HealthSource, HealthSummary};
use crate::panels::{ActivePanel, PanelPhase, UiEvent};
use crate::scene::{PanelKind, SceneCommand, SceneController};

use super::events::{handle_key_event, poll_event, Action, InputMode};
use super::scene_view::SceneView;
use super::state::DashboardState;
use super::theme::{icons, GlassTheme};

/// Dashboard application
pub struct DashboardApp {
    state: DashboardState,
    theme: GlassTheme,
    controller: SceneController,
    scene_view: SceneView,
    scene_rx: mpsc::UnboundedReceiver<SceneCommand>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    client: Arc<SubmissionClient>,
    health: Arc<Mutex<Box<dyn HealthSource>>>,
    panel: Option<ActivePanel>,
}

impl DashboardApp {
    /// Create a new dashboard application
    pub fn new(client: SubmissionClient, health: Box<dyn HealthSource>, stress_score: u8) -> Self {
        let (scene_tx, scene_rx) = mpsc::unbounded_channel();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();

        let mut controller = SceneController::new();
        controller.attach(scene_tx);

        Self {
            state: DashboardState::new(stress_score),
            theme: GlassTheme::new(),
            controller,
            scene_view: SceneView::new(),
            scene_rx,
            ui_tx,
            ui_rx,
            client: Arc::new(client),
            health: Arc::new(Mutex::new(health)),
            panel: None,
        }
    }

    /// Run the dashboard
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut terminal = self.setup_terminal()?;
        let result = self.main_loop(&mut terminal).await;
        self.restore_terminal(&mut terminal)?;
        result
    }

    /// Setup terminal for TUI
    fn setup_terminal(&self) -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Main event loop
    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let tick_rate = Duration::from_millis(16); // ~60fps

        loop {
            self.drain_scene_commands();
            self.drain_ui_events();
            self.sync_panel();

            if let Some(ActivePanel::VoiceInput(panel)) = &mut self.panel {
                panel.poll_transcription();
            }

            terminal.draw(|frame| self.render(frame))?;

            if let Some(key) = poll_event(tick_rate)? {
                let action = handle_key_event(key, self.input_mode());
                self.on_action(action);
            }

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// The active panel decides whether characters type or launch
    fn input_mode(&self) -> InputMode {
        match &self.panel {
            Some(ActivePanel::Schedule(_)) | Some(ActivePanel::VoiceInput(_)) => InputMode::Typing,
            _ => InputMode::Global,
        }
    }

    /// Feed controller commands into the render-side scene
    fn drain_scene_commands(&mut self) {
        while let Ok(command) = self.scene_rx.try_recv() {
            self.scene_view.apply(command);
        }
    }

    /// Apply events from background tasks
    fn drain_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Submission(outcome) => {
                    tracing::debug!(success = outcome.success, "Submission resolved");
                    self.state.push_outcome(&outcome);
                }
                UiEvent::HeartRisk(result) => {
                    if let Err(message) = &result {
                        self.state.report_error(message.clone());
                    }
                    if let Some(ActivePanel::HeartRisk(panel)) = &mut self.panel {
                        panel.on_result(result);
                    }
                }
                UiEvent::Health(result) => {
                    self.state.health_busy = false;
                    self.controller.stop_loading_rotation();
                    match result {
                        Ok(summary) => {
                            self.state.health_connected = true;
                            self.state.health_summary = Some(summary);
                        }
                        Err(message) => self.state.report_error(message),
                    }
                }
            }
        }
    }

    /// Keep the mounted panel in step with the controller's active flag
    fn sync_panel(&mut self) {
        match (&mut self.panel, self.controller.active_panel()) {
            (Some(panel), Some(kind)) if panel.kind() == kind => {}
            // Externally cleared (or replaced): fade out before unmounting.
            (Some(panel), _) => {
                if !panel.shell().is_closing() {
                    panel.shell_mut().begin_close();
                }
            }
            (None, Some(kind)) => {
                self.panel = Some(ActivePanel::mount(kind));
            }
            (None, None) => {}
        }

        if let Some(panel) = &self.panel {
            if panel.shell().is_closing() && panel.shell().close_finished() {
                let kind = panel.kind();
                self.panel = None;
                // No-op if the flag was already cleared externally.
                self.controller.clear(kind);
            }
        }
    }

    fn on_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.state.should_quit = true,
            Action::Toggle(kind) => self.controller.toggle(kind),
            Action::Submit => self.submit_active_panel(),
            Action::ToggleRecording => {
                if let Some(ActivePanel::VoiceInput(panel)) = &mut self.panel {
                    panel.toggle_recording();
                }
            }
            Action::ConnectHealth => self.connect_health(),
            Action::Escape => {
                if self.state.show_error {
                    self.state.dismiss_error();
                } else if let Some(panel) = &self.panel {
                    self.controller.clear(panel.kind());
                }
            }
            Action::Input(c) => match &mut self.panel {
                Some(ActivePanel::Schedule(panel)) => panel.push_char(c),
                Some(ActivePanel::VoiceInput(panel)) => panel.push_char(c),
                _ => {}
            },
            Action::Backspace => match &mut self.panel {
                Some(ActivePanel::Schedule(panel)) => panel.backspace(),
                Some(ActivePanel::VoiceInput(panel)) => panel.backspace(),
                _ => {}
            },
            Action::None => {}
        }
    }

    fn submit_active_panel(&mut self) {
        match &mut self.panel {
            Some(ActivePanel::Schedule(panel)) => panel.submit(&self.client, &self.ui_tx),
            Some(ActivePanel::VoiceInput(panel)) => panel.submit(&self.client, &self.ui_tx),
            Some(ActivePanel::Workout(panel)) => panel.submit(&self.client, &self.ui_tx),
            Some(ActivePanel::Destressor(panel)) => panel.submit(&self.client, &self.ui_tx),
            Some(ActivePanel::HeartRisk(panel)) => match panel.shell.phase() {
                PanelPhase::Visible => panel.check(&self.client, &self.ui_tx),
                // Result on display: Enter dismisses.
                PanelPhase::Result => self.controller.clear(PanelKind::HeartRisk),
                _ => {}
            },
            None => {}
        }
    }

    /// Connect (or refresh) the health aggregator off the UI loop, spinning
    /// the model while the calls are in flight
    fn connect_health(&mut self) {
        if self.state.health_busy {
            return;
        }
        self.state.health_busy = true;
        self.controller.start_loading_rotation();

        let health = Arc::clone(&self.health);
        let ui = self.ui_tx.clone();
        tokio::spawn(async move {
            let mut source = health.lock().await;
            let result = async {
                if !source.is_connected() {
                    source.init_connection().await?;
                }
                let end = chrono::Local::now().date_naive();
                let start = end - chrono::Duration::days(7);
                let activity = source.get_activity(start, end).await?;
                let daily = source.get_daily(start, end).await?;
                let sleep = source.get_sleep(start, end).await?;
                Ok::<_, FlowError>(HealthSummary::from_payloads(&activity, &daily, &sleep))
            }
            .await
            .map_err(|e| e.to_string());

            let _ = ui.send(UiEvent::Health(result));
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Header
                Constraint::Min(8),    // Scene (+ panel overlay)
                Constraint::Length(3), // Launcher buttons
                Constraint::Length(2), // Toast + help
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        self.scene_view.render(frame, chunks[1], &self.theme);
        if let Some(panel) = &self.panel {
            self.render_panel(frame, chunks[1], panel);
        }
        self.render_buttons(frame, chunks[2]);
        self.render_footer(frame, chunks[3]);

        if self.state.show_error {
            self.render_error_banner(frame, chunks[1]);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled("FlowState", self.theme.title())).centered(),
            Line::from(Span::styled(
                format!("Your stress score today is {}", self.state.stress_score),
                self.theme.dimmed(),
            ))
            .centered(),
        ];

        let health_line = if self.state.health_busy {
            Line::from(Span::styled("Connecting to health data...", self.theme.dimmed()))
        } else if let Some(summary) = &self.state.health_summary {
            let fmt_u64 = |v: Option<u64>| v.map_or("-".to_string(), |v| v.to_string());
            let fmt_f64 = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{:.1}", v));
            Line::from(Span::styled(
                format!(
                    "{} steps  {} km  {} active min  {} kcal  {} bpm  {} h sleep",
                    fmt_u64(summary.steps),
                    fmt_f64(summary.distance_km),
                    fmt_u64(summary.active_minutes),
                    fmt_f64(summary.calories),
                    fmt_f64(summary.avg_bpm),
                    fmt_f64(summary.sleep_hours),
                ),
                self.theme.dimmed(),
            ))
        } else if self.state.health_connected {
            Line::from(Span::styled(
                "Health data connected - press [c] to refresh",
                self.theme.dimmed(),
            ))
        } else {
            Line::from(Span::styled(
                "Health data not connected - press [c]",
                self.theme.dimmed(),
            ))
        };
        lines.push(health_line.centered());

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_panel(&self, frame: &mut Frame, scene_area: Rect, panel: &ActivePanel) {
        let area = centered_rect(scene_area, 46, 9);
        let opacity = panel.shell().opacity();
        let border = Style::default().fg(self.theme.faded_white(opacity));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", panel.kind().label()));
        let inner = block.inner(area);

        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let lines = match panel {
            ActivePanel::Schedule(p) => vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  > {}_", p.input),
                    self.theme.text(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "  Describe the event, then [Enter] to submit",
                    self.theme.dimmed(),
                )),
            ],
            ActivePanel::VoiceInput(p) => {
                let mic = if p.is_recording() {
                    Span::styled(format!("  {} recording", icons::MIC), self.theme.recording())
                } else {
                    Span::styled(
                        format!("  {} Ctrl+R to dictate", icons::MIC),
                        self.theme.dimmed(),
                    )
                };
                vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("  > {}_", p.input),
                        self.theme.text(),
                    )),
                    Line::from(mic),
                    Line::from(Span::styled(
                        "  Speak or type, then [Enter] to submit",
                        self.theme.dimmed(),
                    )),
                ]
            }
            ActivePanel::Workout(_) => vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {} Generate a workout plan", icons::WORKOUT),
                    self.theme.text(),
                )),
                Line::from(Span::styled(
                    "  and book it on your calendar",
                    self.theme.text(),
                )),
                Line::from(Span::styled("  [Enter] to submit", self.theme.dimmed())),
            ],
            ActivePanel::Destressor(p) => vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!(
                        "  {} Stress {} | {} min | {}",
                        icons::LEAF,
                        p.request.stress_level,
                        p.request.available_time,
                        p.request.preferred_activities.join(", "),
                    ),
                    self.theme.text(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "  [Enter] to pick a destressor and book it",
                    self.theme.dimmed(),
                )),
            ],
            ActivePanel::HeartRisk(p) => self.heart_risk_lines(p),
        };

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn heart_risk_lines(&self, panel: &crate::panels::HeartRiskPanel) -> Vec<Line<'_>> {
        match panel.shell.phase() {
            PanelPhase::Submitting => vec![
                Line::from(""),
                Line::from(Span::styled("  Checking...", self.theme.dimmed())),
            ],
            PanelPhase::Result => {
                let report = panel.report.as_ref().expect("Result phase carries a report");
                let score_style = if report.needs_attention {
                    self.theme.warning()
                } else {
                    self.theme.success()
                };
                vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::styled(format!("  {} ", icons::HEART), score_style),
                        Span::styled(report.message, self.theme.text()),
                    ]),
                    Line::from(Span::styled(
                        format!("  Health score: {}/100", report.score),
                        score_style,
                    )),
                    Line::from(Span::styled("  [Enter] to dismiss", self.theme.dimmed())),
                ]
            }
            _ => {
                let mut lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("  {} [Enter] to check your heart health", icons::HEART),
                        self.theme.text(),
                    )),
                ];
                if let Some(error) = &panel.error {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", error),
                        self.theme.error(),
                    )));
                }
                lines
            }
        }
    }

    fn render_buttons(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        for kind in PanelKind::ALL {
            let icon = match kind {
                PanelKind::Schedule => icons::CALENDAR,
                PanelKind::Workout => icons::WORKOUT,
                PanelKind::Destressor => icons::LEAF,
                PanelKind::VoiceInput => icons::MIC,
                PanelKind::HeartRisk => icons::HEART,
            };
            let style = if self.controller.is_visible(kind) {
                self.theme.button_active()
            } else {
                self.theme.dimmed()
            };
            let key = kind.label().chars().next().unwrap_or('?').to_ascii_lowercase();
            spans.push(Span::styled(
                format!("({}) {} {}   ", key, icon, kind.label()),
                style,
            ));
        }

        let block = Block::default().borders(Borders::TOP).border_style(self.theme.dimmed());
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let toast_line = match self.state.current_toast() {
            Some(toast) => {
                let (icon, style) = if toast.success {
                    (icons::CHECK, self.theme.success())
                } else {
                    (icons::CROSS, self.theme.error())
                };
                Line::from(Span::styled(format!(" {} {}", icon, toast.message), style))
            }
            None => Line::from(""),
        };

        let help = Line::from(vec![
            Span::styled(" [q]", self.theme.accent()),
            Span::styled("uit  ", self.theme.dimmed()),
            Span::styled("[c]", self.theme.accent()),
            Span::styled("onnect health  ", self.theme.dimmed()),
            Span::styled("[Esc]", self.theme.accent()),
            Span::styled(" close  ", self.theme.dimmed()),
            Span::styled("[Enter]", self.theme.accent()),
            Span::styled(" submit", self.theme.dimmed()),
        ]);

        frame.render_widget(Paragraph::new(vec![toast_line, help]), area);
    }

    fn render_error_banner(&self, frame: &mut Frame, scene_area: Rect) {
        let area = centered_rect(scene_area, 50, 5);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.error())
            .title(" Error ");
        let inner = block.inner(area);

        frame.render_widget(Clear, area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(self.state.error_message.clone(), self.theme.text())),
                Line::from(Span::styled("[Esc] to dismiss", self.theme.dimmed())),
            ]),
            inner,
        );
    }
}

/// A rect of at most `width` x `height`, centered inside `area`
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::MockHealthSource;
    use url::Url;

    fn app() -> DashboardApp {
        let client = SubmissionClient::new(Url::parse("http://127.0.0.1:1").unwrap());
        DashboardApp::new(client, Box::new(MockHealthSource::new()), 42)
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_mounts_panel() {
        let mut app = app();
        app.on_action(Action::Toggle(PanelKind::Schedule));
        app.sync_panel();
        assert!(matches!(app.panel, Some(ActivePanel::Schedule(_))));
        assert_eq!(app.input_mode(), InputMode::Typing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_closes_then_unmounts_after_fade() {
        let mut app = app();
        app.on_action(Action::Toggle(PanelKind::Workout));
        app.sync_panel();
        assert!(app.panel.is_some());

        app.on_action(Action::Escape);
        app.sync_panel();
        assert!(app.panel.as_ref().unwrap().shell().is_closing());

        tokio::time::advance(crate::panels::FADE + Duration::from_millis(20)).await;
        app.sync_panel();
        assert!(app.panel.is_none());
        assert_eq!(app.controller.active_panel(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_fades_old_panel_first() {
        let mut app = app();
        app.on_action(Action::Toggle(PanelKind::Schedule));
        app.sync_panel();
        app.on_action(Action::Toggle(PanelKind::Workout));
        app.sync_panel();

        // The old panel fades out before the new one mounts.
        assert!(matches!(app.panel, Some(ActivePanel::Schedule(_))));
        assert!(app.panel.as_ref().unwrap().shell().is_closing());

        tokio::time::advance(crate::panels::FADE + Duration::from_millis(20)).await;
        app.sync_panel();
        app.sync_panel();
        assert!(matches!(app.panel, Some(ActivePanel::Workout(_))));
        assert_eq!(app.controller.active_panel(), Some(PanelKind::Workout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_routes_to_schedule_input() {
        let mut app = app();
        app.on_action(Action::Toggle(PanelKind::Schedule));
        app.sync_panel();
        app.on_action(Action::Input('h'));
        app.on_action(Action::Input('i'));
        app.on_action(Action::Backspace);

        match &app.panel {
            Some(ActivePanel::Schedule(p)) => assert_eq!(p.input, "h"),
            other => panic!("unexpected panel: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_connect_flow() {
        let mut app = app();
        app.on_action(Action::ConnectHealth);
        assert!(app.state.health_busy);
        assert!(app.controller.is_loading());

        // Let the spawned connect task resolve and deliver its event.
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
        app.drain_ui_events();
        assert!(!app.state.health_busy);
        assert!(app.state.health_connected);
        assert_eq!(
            app.state.health_summary.as_ref().unwrap().steps,
            Some(8432)
        );
        assert!(!app.controller.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_outcome_becomes_toast() {
        let mut app = app();
        app.ui_tx
            .send(UiEvent::Submission(crate::client::SubmissionOutcome {
                success: false,
                status: Some(500),
                message: "/create-event failed (status 500)".into(),
            }))
            .unwrap();
        app.drain_ui_events();

        assert!(app.state.show_error);
        assert!(app.state.current_toast().unwrap().message.contains("500"));
    }
}
