//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::config::ThemeConfig;

/// Terminal background brightness the palette is chosen for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Luma above which the terminal background counts as light
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

/// Resolve the configured theme, asking the terminal for its background when set to auto.
///
/// Must run before the terminal enters raw/alternate mode.
pub fn resolve_theme(config: ThemeConfig) -> Theme {
    match config {
        ThemeConfig::Dark => Theme::Dark,
        ThemeConfig::Light => Theme::Light,
        ThemeConfig::Auto => match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA_THRESHOLD => Theme::Light,
            Ok(_) => Theme::Dark,
            Err(e) => {
                tracing::debug!(error = %e, "Could not detect terminal background, using dark theme");
                Theme::Dark
            }
        },
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score bar colors
    pub bar_filled: Color,
    pub bar_empty: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub unnamed: Color,
    pub pending_removal: Color,
    pub header_style: Style,
    pub row_selected: Style,
    pub editing: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Summary line colors
    pub balanced: Color,
    pub unbalanced: Color,
    pub manual_badge: Style,
    pub auto_badge: Style,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_key: Style,
}

impl ThemeColors {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    /// Dark theme palette
    pub fn dark() -> Self {
        Self {
            bar_filled: Color::Magenta,
            bar_empty: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            unnamed: Color::DarkGray,
            pending_removal: Color::Indexed(240),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            editing: Style::new().fg(Color::Yellow).bold(),
            muted: Color::Gray,
            title_color: Color::Magenta,
            tab_active_style: Style::new().fg(Color::Magenta).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            balanced: Color::Green,
            unbalanced: Color::Red,
            manual_badge: Style::new().fg(Color::Black).bg(Color::Yellow),
            auto_badge: Style::new().fg(Color::Black).bg(Color::Cyan),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Magenta,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Magenta,
            popup_title: Style::new().fg(Color::Magenta).bold(),
            popup_key: Style::new().fg(Color::Magenta).bold(),
        }
    }

    /// Light theme palette
    pub fn light() -> Self {
        Self {
            bar_filled: Color::Rgb(128, 0, 64),
            bar_empty: Color::Indexed(250),
            row_alt_bg: Color::Indexed(255),
            index_color: Color::Indexed(244),
            unnamed: Color::Indexed(246),
            pending_removal: Color::Indexed(250),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            editing: Style::new().fg(Color::Rgb(160, 90, 0)).bold(),
            muted: Color::Indexed(242),
            title_color: Color::Rgb(128, 0, 64),
            tab_active_style: Style::new().fg(Color::Rgb(128, 0, 64)).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::Indexed(244)),
            balanced: Color::Rgb(0, 120, 0),
            unbalanced: Color::Rgb(180, 0, 0),
            manual_badge: Style::new().fg(Color::White).bg(Color::Rgb(160, 90, 0)),
            auto_badge: Style::new().fg(Color::White).bg(Color::Rgb(0, 100, 140)),
            status_bar_bg: Color::Indexed(254),
            status_key_color: Color::Rgb(128, 0, 64),
            flash_success: Color::Rgb(0, 120, 0),
            flash_error: Color::Rgb(180, 0, 0),
            popup_border: Color::Rgb(128, 0, 64),
            popup_title: Style::new().fg(Color::Rgb(128, 0, 64)).bold(),
            popup_key: Style::new().fg(Color::Rgb(128, 0, 64)).bold(),
        }
    }

    /// Color for the summary line depending on whether the set hits its target
    pub fn balance_color(&self, balanced: bool) -> Color {
        if balanced {
            self.balanced
        } else {
            self.unbalanced
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_theme_skips_detection() {
        assert_eq!(resolve_theme(ThemeConfig::Dark), Theme::Dark);
        assert_eq!(resolve_theme(ThemeConfig::Light), Theme::Light);
    }

    #[test]
    fn test_balance_color() {
        let colors = ThemeColors::dark();
        assert_eq!(colors.balance_color(true), Color::Green);
        assert_eq!(colors.balance_color(false), Color::Red);
    }
}
