//! Theme colors, with optional overrides from the `[theme]` config table

use ratatui::style::Color;

use crate::config::ThemeConfig;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Active borders, focused input, key hints
    pub danger: Color,      // Error line, delete confirmation
    pub success: Color,     // Confirm "yes"
    pub warning: Color,     // Loading indicator
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Years, poster URLs, review ids
    pub bg_selected: Color, // Selection background
    pub inactive: Color,    // Inactive borders, disabled page control
    pub header: Color,      // Box titles
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(250, 179, 135),
            danger: Color::Rgb(243, 139, 168),
            success: Color::Rgb(166, 218, 149),
            warning: Color::Rgb(249, 226, 175),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            bg_selected: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(137, 180, 250),
        }
    }
}

impl Theme {
    /// Default palette with any valid overrides applied. Invalid hex strings are ignored.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut theme = Self::default();

        let overrides = [
            (&config.accent, &mut theme.accent),
            (&config.danger, &mut theme.danger),
            (&config.text, &mut theme.text),
            (&config.text_dim, &mut theme.text_dim),
            (&config.selected_bg, &mut theme.bg_selected),
        ];
        for (value, slot) in overrides {
            let Some(value) = value else { continue };
            match Self::parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Ignoring invalid theme color: {}", value),
            }
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#FFC107"), Some(Color::Rgb(255, 193, 7)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#GGGGGG"), None);
    }

    #[test]
    fn test_overrides() {
        let theme = Theme::from_config(&ThemeConfig {
            accent: Some("#000000".to_string()),
            danger: Some("nonsense".to_string()),
            ..ThemeConfig::default()
        });

        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.danger, Theme::default().danger);
        assert_eq!(theme.text, Theme::default().text);
    }
}
