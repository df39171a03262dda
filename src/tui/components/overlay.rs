//! # Overlay Component
//!
//! Draws the notifier's overlay on top of whatever screen is active and maps
//! keys to acknowledgements while it is up.
//!
//! | Kind    | Keys                          | Action                  |
//! |---------|-------------------------------|-------------------------|
//! | Loading | all swallowed                 | none                    |
//! | Success | Enter, Esc, Space             | `AcknowledgeSuccess`    |
//! | Error   | Enter, Esc, Space             | `AcknowledgeError`      |
//! | Confirm | `y`, `s`, Enter / `n`, Esc    | `AnswerConfirm(bool)`   |

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::action::Action;
use crate::core::notifier::OverlayKind;
use crate::tui::component::Component;
use crate::tui::components::centered_fixed;
use crate::tui::event::TuiEvent;

const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];
const MAX_WIDTH: u16 = 56;

/// Key handling while an overlay is active. Returns `None` for keys the
/// overlay swallows.
pub fn overlay_action(kind: OverlayKind, event: &TuiEvent) -> Option<Action> {
    match (kind, event) {
        (OverlayKind::Success, TuiEvent::Enter | TuiEvent::Escape | TuiEvent::Char(' ')) => {
            Some(Action::AcknowledgeSuccess)
        }
        (OverlayKind::Error, TuiEvent::Enter | TuiEvent::Escape | TuiEvent::Char(' ')) => {
            Some(Action::AcknowledgeError)
        }
        (OverlayKind::Confirm, TuiEvent::Enter | TuiEvent::Char('y' | 'Y' | 's' | 'S')) => {
            Some(Action::AnswerConfirm(true))
        }
        (OverlayKind::Confirm, TuiEvent::Escape | TuiEvent::Char('n' | 'N')) => {
            Some(Action::AnswerConfirm(false))
        }
        _ => None,
    }
}

/// Stateless dialog for the active overlay.
///
/// # Props
///
/// - `kind`: Which overlay is up. `Idle` renders nothing.
/// - `message`: Overlay text, absent for `Loading`
/// - `tick`: Frame counter driving the loading spinner
pub struct OverlayView<'a> {
    pub kind: OverlayKind,
    pub message: Option<&'a str>,
    pub tick: usize,
}

impl<'a> OverlayView<'a> {
    pub fn new(kind: OverlayKind, message: Option<&'a str>, tick: usize) -> Self {
        Self {
            kind,
            message,
            tick,
        }
    }
}

impl Component for OverlayView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (title, color, body, hint) = match self.kind {
            OverlayKind::Idle => return,
            OverlayKind::Loading => (
                " Aguarde ",
                Color::Cyan,
                format!("{} Carregando...", SPINNER[self.tick % SPINNER.len()]),
                "",
            ),
            OverlayKind::Success => (
                " Sucesso ",
                Color::Green,
                self.message.unwrap_or_default().to_string(),
                "[Enter] OK",
            ),
            OverlayKind::Error => (
                " Erro ",
                Color::Red,
                self.message.unwrap_or_default().to_string(),
                "[Enter] Fechar",
            ),
            OverlayKind::Confirm => (
                " Confirmação ",
                Color::Yellow,
                self.message.unwrap_or_default().to_string(),
                "[y] Sim   [n] Não",
            ),
        };

        let inner_width = MAX_WIDTH.saturating_sub(4).max(1);
        let body_lines = (body.width() as u16).div_ceil(inner_width).max(1);
        let hint_lines = if hint.is_empty() { 0 } else { 2 };
        let outer = centered_fixed(MAX_WIDTH, body_lines + hint_lines + 2, area);

        let mut lines = vec![Line::from(body)];
        if !hint.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Line::from(title).bold())
            .title_alignment(Alignment::Center)
            .padding(Padding::horizontal(1));

        frame.render_widget(Clear, outer);
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            outer,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    macro_rules! overlay_key_cases {
        ($($name:ident: $kind:expr, $event:expr => $expected:expr;)*) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(overlay_action($kind, &$event), $expected);
                }
            )*
        };
    }

    overlay_key_cases! {
        loading_swallows_enter: OverlayKind::Loading, TuiEvent::Enter => None;
        loading_swallows_chars: OverlayKind::Loading, TuiEvent::Char('y') => None;
        idle_ignores_keys: OverlayKind::Idle, TuiEvent::Enter => None;
        success_enter: OverlayKind::Success, TuiEvent::Enter => Some(Action::AcknowledgeSuccess);
        success_escape: OverlayKind::Success, TuiEvent::Escape => Some(Action::AcknowledgeSuccess);
        success_ignores_letters: OverlayKind::Success, TuiEvent::Char('x') => None;
        error_enter: OverlayKind::Error, TuiEvent::Enter => Some(Action::AcknowledgeError);
        confirm_yes: OverlayKind::Confirm, TuiEvent::Char('y') => Some(Action::AnswerConfirm(true));
        confirm_sim: OverlayKind::Confirm, TuiEvent::Char('s') => Some(Action::AnswerConfirm(true));
        confirm_enter: OverlayKind::Confirm, TuiEvent::Enter => Some(Action::AnswerConfirm(true));
        confirm_no: OverlayKind::Confirm, TuiEvent::Char('n') => Some(Action::AnswerConfirm(false));
        confirm_escape: OverlayKind::Confirm, TuiEvent::Escape => Some(Action::AnswerConfirm(false));
    }

    fn render_text(mut view: OverlayView) -> String {
        let backend = TestBackend::new(80, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_confirm_renders_message_and_choices() {
        let text = render_text(OverlayView::new(
            OverlayKind::Confirm,
            Some("Deseja realmente excluir o usuário \"Ana\"?"),
            0,
        ));
        assert!(text.contains("Confirmação"));
        assert!(text.contains("excluir o usuário"));
        assert!(text.contains("[y] Sim"));
    }

    #[test]
    fn test_loading_renders_spinner() {
        let text = render_text(OverlayView::new(OverlayKind::Loading, None, 1));
        assert!(text.contains("Carregando..."));
        assert!(text.contains(SPINNER[1]));
    }

    #[test]
    fn test_idle_renders_nothing() {
        let text = render_text(OverlayView::new(OverlayKind::Idle, None, 0));
        assert!(text.trim().is_empty());
    }
}
