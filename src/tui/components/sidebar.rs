//! # Sidebar Component
//!
//! Left navigation menu: Home, Usuários, Produtos, Sair.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState`
//! - `Sidebar` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::core::action::Action;
use crate::core::state::Screen;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Page(Screen),
    Logout,
}

const ENTRIES: [(Entry, &str); 4] = [
    (Entry::Page(Screen::Home), "Home"),
    (Entry::Page(Screen::Users), "Usuários"),
    (Entry::Page(Screen::Products), "Produtos"),
    (Entry::Logout, "Sair"),
];

pub const SIDEBAR_WIDTH: u16 = 16;

/// Persistent state for the sidebar.
#[derive(Debug, Default)]
pub struct SidebarState {
    pub selected: usize,
    list_state: ListState,
}

impl SidebarState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the highlight to `screen`, so the menu follows navigation that
    /// did not come from the sidebar (remembered session, logout).
    pub fn select_screen(&mut self, screen: Screen) {
        if let Some(index) = ENTRIES
            .iter()
            .position(|(entry, _)| *entry == Entry::Page(screen))
        {
            self.selected = index;
        }
    }
}

impl EventHandler for SidebarState {
    type Event = Action;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Action> {
        match event {
            TuiEvent::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::Down => {
                self.selected = (self.selected + 1).min(ENTRIES.len() - 1);
                None
            }
            TuiEvent::Enter => ENTRIES.get(self.selected).map(|(entry, _)| match entry {
                Entry::Page(screen) => Action::Navigate(*screen),
                Entry::Logout => Action::Logout,
            }),
            _ => None,
        }
    }
}

/// Transient render wrapper for the sidebar.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    current: Screen,
    focused: bool,
}

impl<'a> Sidebar<'a> {
    pub fn new(state: &'a mut SidebarState, current: Screen, focused: bool) -> Self {
        Self {
            state,
            current,
            focused,
        }
    }
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = ENTRIES
            .iter()
            .map(|(entry, label)| {
                let style = match entry {
                    Entry::Page(screen) if *screen == self.current => Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                    Entry::Logout => Style::default().fg(Color::Red),
                    _ => Style::default(),
                };
                ListItem::new(Line::from(Span::styled(format!(" {label}"), style)))
            })
            .collect();

        let border = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(" Menu "),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        self.state.list_state.select(Some(self.state.selected));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_navigation_and_selection() {
        let mut sidebar = SidebarState::new();
        assert_eq!(
            sidebar.handle_event(&TuiEvent::Enter),
            Some(Action::Navigate(Screen::Home))
        );
        sidebar.handle_event(&TuiEvent::Down);
        sidebar.handle_event(&TuiEvent::Down);
        assert_eq!(
            sidebar.handle_event(&TuiEvent::Enter),
            Some(Action::Navigate(Screen::Products))
        );
        sidebar.handle_event(&TuiEvent::Down);
        sidebar.handle_event(&TuiEvent::Down);
        assert_eq!(sidebar.handle_event(&TuiEvent::Enter), Some(Action::Logout));
        sidebar.handle_event(&TuiEvent::Up);
        assert_eq!(sidebar.selected, 2);
    }

    #[test]
    fn test_select_screen_follows_navigation() {
        let mut sidebar = SidebarState::new();
        sidebar.select_screen(Screen::Users);
        assert_eq!(sidebar.selected, 1);
        sidebar.select_screen(Screen::Home);
        assert_eq!(sidebar.selected, 0);
    }

    #[test]
    fn test_sidebar_renders_entries() {
        let backend = TestBackend::new(SIDEBAR_WIDTH, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut state = SidebarState::new();
        terminal
            .draw(|f| Sidebar::new(&mut state, Screen::Home, true).render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        for label in ["Menu", "Home", "Usuários", "Produtos", "Sair"] {
            assert!(text.contains(label), "missing {label}");
        }
    }
}
