//! Scene view - the render layer for the particle-wave model
//!
//! Consumes [`SceneCommand`]s from the controller and owns the actual
//! rotation/opacity values. The controller never touches this struct; the
//! coupling is one-way, through command data.

use std::time::Duration;

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::time::Instant;

use crate::scene::SceneCommand;

use super::theme::{icons, GlassTheme};

/// Baseline orientation the model returns to
const BASELINE_ROTATION: f32 = 0.0;

/// An eased transition between two values
#[derive(Debug, Clone, Copy)]
struct Transition {
    from: f32,
    to: f32,
    started: Instant,
    duration: Duration,
}

impl Transition {
    fn fixed(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            started: Instant::now(),
            duration: Duration::ZERO,
        }
    }

    fn to(current: f32, target: f32, duration: Duration) -> Self {
        Self {
            from: current,
            to: target,
            started: Instant::now(),
            duration,
        }
    }

    /// Current value with ease-in-ease-out interpolation
    fn value(&self) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = (self.started.elapsed().as_secs_f32() / self.duration.as_secs_f32())
            .clamp(0.0, 1.0);
        let eased = t * t * (3.0 - 2.0 * t);
        self.from + (self.to - self.from) * eased
    }
}

/// Render-side model state
#[derive(Debug)]
pub struct SceneView {
    rotation: Transition,
    opacity: Transition,
    born: Instant,
}

impl Default for SceneView {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneView {
    pub fn new() -> Self {
        Self {
            rotation: Transition::fixed(BASELINE_ROTATION),
            opacity: Transition::fixed(1.0),
            born: Instant::now(),
        }
    }

    /// Apply a controller command
    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::RotateBy { radians, duration } => {
                let current = self.rotation.value();
                self.rotation = Transition::to(current, current + radians, duration);
            }
            SceneCommand::SetOpacity { opacity, duration } => {
                let current = self.opacity.value();
                self.opacity = Transition::to(current, opacity.clamp(0.0, 1.0), duration);
            }
            SceneCommand::ResetOpacity { duration } => {
                let current = self.opacity.value();
                self.opacity = Transition::to(current, 1.0, duration);
            }
            SceneCommand::ResetRotation { duration } => {
                let current = self.rotation.value();
                self.rotation = Transition::to(current, BASELINE_ROTATION, duration);
            }
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation.value()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity.value()
    }

    /// Draw the particle wave into `area`
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &GlassTheme) {
        let rotation = self.rotation();
        let opacity = self.opacity();
        let drift = self.born.elapsed().as_secs_f32() * 0.8;

        let height = area.height.max(1) as f32;
        let mid = height / 2.0;

        let mut lines = Vec::with_capacity(area.height as usize);
        for row in 0..area.height {
            let mut text = String::with_capacity(area.width as usize);
            for col in 0..area.width {
                let x = col as f32 * 0.15;
                let wave = (x + rotation + drift).sin() * (height / 3.5);
                let distance = ((row as f32 - (mid + wave)).abs() / height * 4.0).min(1.0);
                let intensity = (1.0 - distance) * opacity;
                let index = (intensity * (icons::PARTICLES.len() - 1) as f32).round() as usize;
                text.push(icons::PARTICLES[index.min(icons::PARTICLES.len() - 1)]);
            }
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(theme.faded_white(opacity)),
            )));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }
}
