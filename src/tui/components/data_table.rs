//! # DataTable Component
//!
//! Renders a `TableView` and turns keys into view operations: search box,
//! column menu, header with sort marker, "Ações" column, placeholder row and
//! pagination bar.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `DataTableState` lives in `TuiState`, one per resource page
//! - `DataTable` is created each frame with borrowed state and view
//!
//! The view itself lives in core (`App::users.table`), so `handle_event`
//! takes it as a parameter instead of owning it.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row as WidgetRow, Table,
    TableState,
};
use unicode_width::UnicodeWidthStr;

use crate::core::action::Action;
use crate::core::state::Resource;
use crate::core::table::{EMPTY_PLACEHOLDER, Row, SortDirection, TableView};
use crate::tui::component::Component;
use crate::tui::components::{centered_rect, truncate_str};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    Browse,
    /// Keys go to the search box.
    Search,
    /// The column visibility menu is open with this entry highlighted.
    ColumnMenu(usize),
}

/// Persistent state for one resource table.
#[derive(Debug)]
pub struct DataTableState {
    resource: Resource,
    /// Row index within the current page.
    pub selected: usize,
    /// Index within the visible columns, used by sort.
    pub column_cursor: usize,
    pub mode: TableMode,
    table_state: TableState,
    menu_state: ListState,
}

impl DataTableState {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            selected: 0,
            column_cursor: 0,
            mode: TableMode::Browse,
            table_state: TableState::default(),
            menu_state: ListState::default(),
        }
    }

    /// True while typed characters belong to the table (search box or
    /// column menu) rather than to global shortcuts.
    pub fn is_capturing(&self) -> bool {
        self.mode != TableMode::Browse
    }

    pub fn handle_event<R: Row>(
        &mut self,
        event: &TuiEvent,
        table: &mut TableView<R, Action>,
    ) -> Option<Action> {
        let action = match self.mode {
            TableMode::Search => {
                self.handle_search(event, table);
                None
            }
            TableMode::ColumnMenu(index) => {
                self.handle_column_menu(index, event, table);
                None
            }
            TableMode::Browse => self.handle_browse(event, table),
        };
        self.clamp(table);
        action
    }

    fn handle_browse<R: Row>(
        &mut self,
        event: &TuiEvent,
        table: &mut TableView<R, Action>,
    ) -> Option<Action> {
        match event {
            TuiEvent::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::Down => {
                self.selected += 1;
                None
            }
            TuiEvent::Left => {
                self.column_cursor = self.column_cursor.saturating_sub(1);
                None
            }
            TuiEvent::Right => {
                self.column_cursor += 1;
                None
            }
            TuiEvent::PageUp => {
                if table.previous_page() {
                    self.selected = 0;
                }
                None
            }
            TuiEvent::PageDown => {
                if table.next_page() {
                    self.selected = 0;
                }
                None
            }
            TuiEvent::Home => {
                table.go_to_page(1);
                self.selected = 0;
                None
            }
            TuiEvent::End => {
                table.go_to_page(table.total_pages());
                self.selected = 0;
                None
            }
            TuiEvent::Char('/') => {
                self.mode = TableMode::Search;
                None
            }
            TuiEvent::Char('c') => {
                self.mode = TableMode::ColumnMenu(0);
                None
            }
            TuiEvent::Char('s') => {
                let field = table
                    .visible_columns()
                    .nth(self.column_cursor)
                    .map(|c| c.name.clone())?;
                table.sort(&field);
                None
            }
            TuiEvent::Char('n') => Some(Action::OpenCreateForm(self.resource)),
            TuiEvent::Char('r') => table.refresh(),
            TuiEvent::Char(c) if c.is_ascii_digit() => {
                let index = c.to_digit(10)? as usize;
                let page = *table.page_buttons().get(index.checked_sub(1)?)?;
                if table.go_to_page(page) {
                    self.selected = 0;
                }
                None
            }
            TuiEvent::Char(c) => {
                let key = table.action_for_hotkey(*c)?;
                let row = table.page_rows().get(self.selected)?;
                table.invoke_action(key, row)
            }
            _ => None,
        }
    }

    fn handle_search<R: Row>(&mut self, event: &TuiEvent, table: &mut TableView<R, Action>) {
        let mut term = table.search_term().to_string();
        match event {
            TuiEvent::Char(c) => term.push(*c),
            TuiEvent::Paste(text) => term.extend(text.chars().filter(|c| !c.is_control())),
            TuiEvent::Backspace => {
                term.pop();
            }
            TuiEvent::Escape => {
                term.clear();
                self.mode = TableMode::Browse;
            }
            TuiEvent::Enter | TuiEvent::Tab | TuiEvent::Down => {
                self.mode = TableMode::Browse;
                return;
            }
            _ => return,
        }
        table.search(term);
        self.selected = 0;
    }

    fn handle_column_menu<R: Row>(
        &mut self,
        index: usize,
        event: &TuiEvent,
        table: &mut TableView<R, Action>,
    ) {
        let count = table.columns().len();
        match event {
            TuiEvent::Up => self.mode = TableMode::ColumnMenu(index.saturating_sub(1)),
            TuiEvent::Down => {
                self.mode = TableMode::ColumnMenu((index + 1).min(count.saturating_sub(1)))
            }
            TuiEvent::Char(' ') | TuiEvent::Enter => {
                if let Some(key) = table.columns().get(index).map(|c| c.key) {
                    table.toggle_column(key);
                }
            }
            TuiEvent::Escape | TuiEvent::Char('c') => self.mode = TableMode::Browse,
            _ => {}
        }
    }

    /// Keeps the row and column cursors inside what the view shows now.
    fn clamp<R: Row>(&mut self, table: &TableView<R, Action>) {
        let rows = table.page_rows().len();
        self.selected = self.selected.min(rows.saturating_sub(1));
        let columns = table.visible_columns().count();
        self.column_cursor = self.column_cursor.min(columns.saturating_sub(1));
    }
}

const ACTIONS_LABEL: &str = "Ações";

/// Transient render wrapper for a resource table.
pub struct DataTable<'a, R: Row> {
    state: &'a mut DataTableState,
    table: &'a TableView<R, Action>,
    focused: bool,
}

impl<'a, R: Row> DataTable<'a, R> {
    pub fn new(
        state: &'a mut DataTableState,
        table: &'a TableView<R, Action>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            table,
            focused,
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect) {
        let searching = self.state.mode == TableMode::Search;
        let border = if searching {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let term = self.table.search_term();
        let text = if term.is_empty() && !searching {
            Span::styled("Pesquisar...", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(term.to_string())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Buscar (/) ");
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);
        if searching && self.focused {
            let x = inner.x + (term.width() as u16).min(inner.width.saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let table = self.table;
        let columns: Vec<_> = table.visible_columns().collect();
        let header_style = Style::default().add_modifier(Modifier::BOLD);

        let mut header: Vec<Cell> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let marker = match (column.name == table.sort_field(), table.sort_direction()) {
                    (true, SortDirection::Ascending) => " ▲",
                    (true, SortDirection::Descending) => " ▼",
                    (false, _) => "",
                };
                let style = if self.focused && i == self.state.column_cursor {
                    header_style.add_modifier(Modifier::UNDERLINED).fg(Color::Cyan)
                } else {
                    header_style
                };
                Cell::from(format!("{}{}", column.label, marker)).style(style)
            })
            .collect();
        let has_actions = !table.actions().is_empty();
        if has_actions {
            header.push(Cell::from(ACTIONS_LABEL).style(header_style));
        }

        let action_text: String = table
            .actions()
            .iter()
            .map(|a| format!("{} {}", a.icon, a.hotkey))
            .collect::<Vec<_>>()
            .join("  ");

        let page_rows = table.page_rows();
        let rows: Vec<WidgetRow> = if page_rows.is_empty() {
            vec![WidgetRow::new(vec![
                Cell::from(EMPTY_PLACEHOLDER).style(Style::default().fg(Color::DarkGray)),
            ])]
        } else {
            page_rows
                .iter()
                .map(|row| {
                    let mut cells: Vec<Cell> = columns
                        .iter()
                        .map(|column| Cell::from(row.field(&column.name).to_string()))
                        .collect();
                    if has_actions {
                        cells.push(Cell::from(action_text.clone()));
                    }
                    WidgetRow::new(cells)
                })
                .collect()
        };

        let mut widths: Vec<Constraint> = columns.iter().map(|_| Constraint::Fill(1)).collect();
        if has_actions {
            widths.push(Constraint::Length(action_text.width().max(ACTIONS_LABEL.width()) as u16));
        }
        if widths.is_empty() {
            widths.push(Constraint::Fill(1));
        }

        let border = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let widget = Table::new(rows, widths)
            .header(WidgetRow::new(header).bottom_margin(1))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            )
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let selection = (!page_rows.is_empty()).then_some(self.state.selected);
        self.state.table_state.select(selection);
        frame.render_stateful_widget(widget, area, &mut self.state.table_state);
    }

    fn render_pagination(&self, frame: &mut Frame, area: Rect) {
        let table = self.table;
        let dim = Style::default().fg(Color::DarkGray);
        let enabled = |on: bool| if on { Style::default() } else { dim };

        let mut spans = vec![Span::styled("« Anterior ", enabled(table.has_previous_page()))];
        for (i, page) in table.page_buttons().iter().enumerate() {
            let label = if *page == table.current_page() {
                Span::styled(
                    format!("[{page}]"),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )
            } else if i < 9 {
                Span::raw(format!(" {page} "))
            } else {
                Span::styled(format!(" {page} "), dim)
            };
            spans.push(label);
        }
        spans.push(Span::styled(" Próxima »", enabled(table.has_next_page())));
        spans.push(Span::styled(
            format!(
                "   Página {} de {} · {} registros",
                table.current_page(),
                table.total_pages(),
                table.filtered().len()
            ),
            dim,
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_column_menu(&mut self, frame: &mut Frame, area: Rect, index: usize) {
        let popup = centered_rect(40, 50, area);
        frame.render_widget(Clear, popup);
        let width = popup.width.saturating_sub(8) as usize;
        let items: Vec<ListItem> = self
            .table
            .columns()
            .iter()
            .map(|column| {
                let mark = if column.visible { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, truncate_str(&column.label, width)))
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" Colunas ")
                    .title_bottom(Line::from(" Espaço alterna · Esc fecha ").centered()),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        self.state.menu_state.select(Some(index));
        frame.render_stateful_widget(list, popup, &mut self.state.menu_state);
    }
}

impl<R: Row> Component for DataTable<'_, R> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [search_area, table_area, pages_area, help_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_search(frame, search_area);
        self.render_table(frame, table_area);
        self.render_pagination(frame, pages_area);
        frame.render_widget(
            Paragraph::new(
                "n Novo · e Editar · d Excluir · r Atualizar · s Ordenar · c Colunas · / Buscar",
            )
            .style(Style::default().fg(Color::DarkGray)),
            help_area,
        );

        if let TableMode::ColumnMenu(index) = self.state.mode {
            self.render_column_menu(frame, area, index);
        }
    }
}
