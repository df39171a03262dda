//! # TitleBar Component
//!
//! Top status bar showing the current page and notifications.
//!
//! ## Responsibilities
//!
//! - Display the page title
//! - Display who is logged in and since when
//! - Display the status message ("Olá, ana!", "Nenhuma alteração.")
//!
//! TitleBar is purely presentational: it receives all data as props and has
//! no internal state.
//!
//! ## Conditional Formatting
//!
//! 1. **Logged in**: `"Painel | Usuários | ana (05/03/2024 - 09:07) | Olá, ana!"`
//! 2. **Logged out**: `"Painel | Login | Bem-vindo!"`
//!
//! Empty parts are skipped, so no stray separators appear.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::masks::format_date_time;
use crate::tui::component::Component;

/// Top status bar component.
///
/// # Props
///
/// - `title`: The current page title
/// - `username`: Logged-in user, if any
/// - `logged_in_at`: RFC 3339 session start, formatted for display
/// - `status_message`: Transient status
pub struct TitleBar {
    pub title: String,
    pub username: Option<String>,
    pub logged_in_at: Option<String>,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(
        title: impl Into<String>,
        username: Option<String>,
        logged_in_at: Option<String>,
        status_message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            username,
            logged_in_at,
            status_message: status_message.into(),
        }
    }

    fn user_text(&self) -> Option<String> {
        let username = self.username.as_deref()?;
        Some(match self.logged_in_at.as_deref() {
            Some(since) if !since.is_empty() => {
                format!("{} ({})", username, format_date_time(since))
            }
            _ => username.to_string(),
        })
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let separator = Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![
            Span::styled(
                "Painel",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            separator.clone(),
            Span::raw(self.title.clone()),
        ];
        if let Some(user) = self.user_text() {
            spans.push(separator.clone());
            spans.push(Span::styled(user, Style::default().fg(Color::Yellow)));
        }
        if !self.status_message.is_empty() {
            spans.push(separator);
            spans.push(Span::raw(self.status_message.clone()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_text(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_logged_out() {
        let mut title_bar = TitleBar::new("Login", None, None, "Bem-vindo!");
        let text = render_text(&mut title_bar);
        assert!(text.contains("Painel | Login | Bem-vindo!"));
    }

    #[test]
    fn test_title_bar_shows_user_and_session_start() {
        let mut title_bar = TitleBar::new(
            "Usuários",
            Some("ana".to_string()),
            Some("not a date".to_string()),
            "Olá, ana!",
        );
        let text = render_text(&mut title_bar);
        assert!(text.contains("Usuários"));
        assert!(text.contains("ana (not a date)"));
        assert!(text.contains("Olá, ana!"));
    }

    #[test]
    fn test_title_bar_without_status_has_no_trailing_separator() {
        let mut title_bar = TitleBar::new("Home", Some("ana".to_string()), None, "");
        let text = render_text(&mut title_bar);
        assert!(text.trim_end().ends_with("ana"));
    }
}
