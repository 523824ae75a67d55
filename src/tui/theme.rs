use ratatui::style::Color;

use crate::io::Severity;
use crate::model::{ProcessStatus, UiConfig};
use crate::store::ScoreTier;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub blue: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x10, 0x14, 0x1C),
            text: Color::Rgb(0xC5, 0xCC, 0xD6),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0x4F, 0xC3, 0xF7),
            dim: Color::Rgb(0x60, 0x6A, 0x78),
            red: Color::Rgb(0xEF, 0x53, 0x50),
            yellow: Color::Rgb(0xFF, 0xCA, 0x28),
            green: Color::Rgb(0x66, 0xBB, 0x6A),
            cyan: Color::Rgb(0x4D, 0xD0, 0xE1),
            purple: Color::Rgb(0xAB, 0x47, 0xBC),
            blue: Color::Rgb(0x42, 0xA5, 0xF5),
            selection_bg: Color::Rgb(0x26, 0x32, 0x38),
            selection_border: Color::Rgb(0x4F, 0xC3, 0xF7),
        }
    }
}

/// Parse a hex color string like "#EF5350" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from board config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            if let Some(color) = parse_hex_color(value) {
                match key.as_str() {
                    "background" => theme.background = color,
                    "text" => theme.text = color,
                    "text_bright" => theme.text_bright = color,
                    "highlight" => theme.highlight = color,
                    "dim" => theme.dim = color,
                    "red" => theme.red = color,
                    "yellow" => theme.yellow = color,
                    "green" => theme.green = color,
                    "cyan" => theme.cyan = color,
                    "purple" => theme.purple = color,
                    "blue" => theme.blue = color,
                    "selection_bg" => theme.selection_bg = color,
                    "selection_border" => theme.selection_border = color,
                    _ => {}
                }
            }
        }

        theme
    }

    /// Color for a score badge tier
    pub fn tier_color(&self, tier: ScoreTier) -> Color {
        match tier {
            ScoreTier::High => self.green,
            ScoreTier::Medium => self.yellow,
            ScoreTier::Low => self.red,
        }
    }

    /// Color for a process control status face
    pub fn status_color(&self, status: ProcessStatus) -> Color {
        match status {
            ProcessStatus::Happy => self.green,
            ProcessStatus::Neutral => self.yellow,
            ProcessStatus::Sad => self.red,
        }
    }

    /// Color for a status-row message severity
    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Info => self.text,
            Severity::Success => self.green,
            Severity::Warning => self.yellow,
            Severity::Error => self.red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#EF5350"),
            Some(Color::Rgb(0xEF, 0x53, 0x50))
        );
        assert_eq!(
            parse_hex_color("#10141C"),
            Some(Color::Rgb(0x10, 0x14, 0x1C))
        );
        assert_eq!(parse_hex_color("EF5350"), None); // missing #
        assert_eq!(parse_hex_color("#EF53"), None); // too short
        assert_eq!(parse_hex_color("#ZZZZZZ"), None); // invalid hex
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("bogus".into(), "#112233".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        // Unchanged defaults still present
        assert_eq!(theme.text, Color::Rgb(0xC5, 0xCC, 0xD6));
    }

    #[test]
    fn test_tier_color() {
        let theme = Theme::default();
        assert_eq!(theme.tier_color(ScoreTier::High), theme.green);
        assert_eq!(theme.tier_color(ScoreTier::Medium), theme.yellow);
        assert_eq!(theme.tier_color(ScoreTier::Low), theme.red);
    }
}
