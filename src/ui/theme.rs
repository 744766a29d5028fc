use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub struct Theme;

impl Theme {
    pub const BG_DARK: Color = Color::Rgb(22, 24, 33);
    pub const BG_SURFACE: Color = Color::Rgb(32, 35, 48);
    pub const TEXT_PRIMARY: Color = Color::Rgb(220, 223, 235);
    pub const TEXT_SECONDARY: Color = Color::Rgb(150, 156, 178);
    pub const TEXT_MUTED: Color = Color::Rgb(95, 100, 120);
    pub const ACCENT_TEAL: Color = Color::Rgb(94, 211, 196);
    pub const ACCENT_AMBER: Color = Color::Rgb(240, 190, 100);
    pub const ACCENT_LAVENDER: Color = Color::Rgb(176, 160, 240);
    pub const BORDER_DIM: Color = Color::Rgb(60, 64, 82);
    pub const CORRECT: Color = Color::Rgb(120, 210, 120);
    pub const WRONG: Color = Color::Rgb(235, 100, 100);

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::ACCENT_TEAL)
    }

    pub fn border_type() -> BorderType {
        BorderType::Rounded
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn heading() -> Style {
        Style::default()
            .fg(Self::ACCENT_LAVENDER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    pub fn notice() -> Style {
        Style::default().fg(Self::ACCENT_AMBER)
    }

    pub fn error_message() -> Style {
        Style::default().fg(Self::WRONG)
    }

    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::ACCENT_AMBER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::ACCENT_LAVENDER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn focused_row() -> Style {
        Style::default()
            .fg(Self::ACCENT_TEAL)
            .add_modifier(Modifier::BOLD)
    }

    pub fn correct() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::CORRECT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn wrong() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::WRONG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn input_text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY).bg(Self::BORDER_DIM)
    }

    pub fn status_badge() -> Style {
        Style::default().fg(Self::ACCENT_TEAL).bg(Self::BORDER_DIM)
    }

    pub fn scrollbar_thumb() -> Style {
        Style::default().fg(Self::ACCENT_LAVENDER)
    }

    pub fn scrollbar_track() -> Style {
        Style::default().fg(Self::BORDER_DIM)
    }
}
