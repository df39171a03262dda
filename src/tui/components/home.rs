//! # Home Page Component
//!
//! Welcome text shown after login and whenever "Home" is picked in the menu.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct HomePage<'a> {
    username: &'a str,
}

impl<'a> HomePage<'a> {
    pub fn new(username: &'a str) -> Self {
        Self { username }
    }
}

impl Component for HomePage<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let dim = Style::default().fg(Color::DarkGray);
        let text_lines = vec![
            Line::from(Span::styled(
                format!("Bem-vindo, {}!", self.username),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled(
                "Use o menu para gerenciar usuários e produtos.",
                dim,
            )),
            Line::from(Span::styled(
                "Tab alterna entre o menu e o conteúdo · Ctrl+C sai",
                dim,
            )),
            Line::default(),
            Line::from(Span::styled(
                format!("Painel v{}", env!("CARGO_PKG_VERSION")),
                dim,
            )),
        ];

        let [center] = Layout::vertical([Constraint::Length(text_lines.len() as u16)])
            .flex(Flex::Center)
            .areas(area);

        frame.render_widget(
            Paragraph::new(text_lines).alignment(Alignment::Center),
            center,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_home_greets_user() {
        let backend = TestBackend::new(70, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| HomePage::new("ana").render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Bem-vindo, ana!"));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }
}
