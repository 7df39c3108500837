//! Glass Theme - Visual Design System
//!
//! Black background with layered white glow, echoing the glassmorphic look of
//! the mobile dashboard this replaces.

use ratatui::style::{Color, Modifier, Style};

/// Glass color palette
pub struct GlassTheme {
    // Primary palette
    pub glow_white: Color,
    pub mist_white: Color,
    pub night_black: Color,
    pub pulse_blue: Color,

    // Status colors
    pub leaf_green: Color,
    pub amber: Color,
    pub ember_red: Color,
}

impl Default for GlassTheme {
    fn default() -> Self {
        Self {
            glow_white: Color::Rgb(240, 244, 248), // #F0F4F8
            mist_white: Color::Rgb(160, 168, 176), // #A0A8B0
            night_black: Color::Rgb(8, 10, 14),    // #080A0E
            pulse_blue: Color::Rgb(96, 165, 250),  // #60A5FA

            leaf_green: Color::Rgb(74, 222, 128), // #4ADE80
            amber: Color::Rgb(251, 191, 36),      // #FBBF24
            ember_red: Color::Rgb(248, 113, 113), // #F87171
        }
    }
}

impl GlassTheme {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Styles
    // ─────────────────────────────────────────────────────────────────────

    /// Default text style
    pub fn text(&self) -> Style {
        Style::default().fg(self.glow_white)
    }

    /// Dimmed text style
    pub fn dimmed(&self) -> Style {
        Style::default().fg(self.mist_white)
    }

    /// Title style (the glowing app name)
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.glow_white)
            .add_modifier(Modifier::BOLD)
    }

    /// Accent style
    pub fn accent(&self) -> Style {
        Style::default().fg(self.pulse_blue)
    }

    /// Success style
    pub fn success(&self) -> Style {
        Style::default().fg(self.leaf_green)
    }

    /// Warning style
    pub fn warning(&self) -> Style {
        Style::default().fg(self.amber)
    }

    /// Error style
    pub fn error(&self) -> Style {
        Style::default()
            .fg(self.ember_red)
            .add_modifier(Modifier::BOLD)
    }

    /// Active launcher button style
    pub fn button_active(&self) -> Style {
        Style::default()
            .fg(self.pulse_blue)
            .add_modifier(Modifier::BOLD)
    }

    /// Recording indicator style
    pub fn recording(&self) -> Style {
        Style::default()
            .fg(self.ember_red)
            .add_modifier(Modifier::SLOW_BLINK)
    }

    /// White scaled by opacity, for panel fades and scene blinking
    pub fn faded_white(&self, opacity: f32) -> Color {
        let opacity = opacity.clamp(0.0, 1.0);
        let level = (40.0 + 200.0 * opacity) as u8;
        Color::Rgb(level, level, level)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Icons and Symbols
// ─────────────────────────────────────────────────────────────────────────────

/// UI icons used throughout the dashboard
pub mod icons {
    pub const CALENDAR: &str = "▦";
    pub const WORKOUT: &str = "⚡";
    pub const LEAF: &str = "❧";
    pub const HEART: &str = "♥";
    pub const MIC: &str = "◉";
    pub const CHECK: &str = "✓";
    pub const CROSS: &str = "✗";

    /// Scene particle intensity ramp, dimmest first
    pub const PARTICLES: [char; 5] = [' ', '·', '∘', '•', '●'];
}
