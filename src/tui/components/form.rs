//! # Form Component
//!
//! Labelled input fields, an optional checkbox, and a row of buttons, with
//! per-field validation. Used for login, password recovery and the
//! create/edit pages.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `FormState` lives in `TuiState` and handles events
//! - `Form` is created each frame with borrowed state
//!
//! Validation runs on submit. After the first failed submit every edit
//! re-validates, so errors disappear as soon as they are fixed.

use std::collections::BTreeMap;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::components::{centered_fixed, truncate_str};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required(&'static str),
    MinLength(usize, &'static str),
    /// Value must equal the value of the named field.
    Matches(&'static str, &'static str),
    /// Non-empty value must be an integer.
    Numeric(&'static str),
}

impl Rule {
    fn check(&self, value: &str, values: &FormValues) -> Option<&'static str> {
        match self {
            Rule::Required(message) => value.trim().is_empty().then_some(*message),
            Rule::MinLength(min, message) => (value.chars().count() < *min).then_some(*message),
            Rule::Matches(other, message) => (value != values.get(other)).then_some(*message),
            Rule::Numeric(message) => {
                let trimmed = value.trim();
                (!trimmed.is_empty() && trimmed.parse::<i64>().is_err()).then_some(*message)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered as bullets.
    Secret,
    Checkbox,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    pub placeholder: &'static str,
    pub error: Option<&'static str>,
    rules: Vec<Rule>,
}

impl FormField {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            value: String::new(),
            checked: false,
            placeholder: "",
            error: None,
            rules: Vec::new(),
        }
    }

    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn secret(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Secret)
    }

    pub fn checkbox(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Checkbox)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    fn is_text(&self) -> bool {
        self.kind != FieldKind::Checkbox
    }

    fn display_value(&self) -> String {
        match self.kind {
            FieldKind::Secret => "•".repeat(self.value.chars().count()),
            _ => self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonRole {
    Submit,
    Cancel,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormButton {
    pub label: &'static str,
    pub role: ButtonRole,
}

/// Snapshot of a form's values, keyed by field key. Checkboxes read as
/// `"true"` / `"false"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(BTreeMap<&'static str, String>);

impl FormValues {
    /// Value of `key`, or `""` when the form has no such field.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.get(key) == "true"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Submit(FormValues),
    Cancel,
    Secondary,
}

/// Persistent state for a form: fields, buttons, focus.
///
/// Focus walks the fields first and then the buttons.
#[derive(Debug, Clone)]
pub struct FormState {
    pub title: String,
    fields: Vec<FormField>,
    buttons: Vec<FormButton>,
    focus: usize,
    attempted: bool,
}

impl FormState {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            buttons: Vec::new(),
            focus: 0,
            attempted: false,
        }
    }

    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn button(mut self, label: &'static str, role: ButtonRole) -> Self {
        self.buttons.push(FormButton { label, role });
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn buttons(&self) -> &[FormButton] {
        &self.buttons
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn error(&self, key: &str) -> Option<&'static str> {
        self.fields.iter().find(|f| f.key == key).and_then(|f| f.error)
    }

    pub fn values(&self) -> FormValues {
        FormValues(
            self.fields
                .iter()
                .map(|f| {
                    let value = match f.kind {
                        FieldKind::Checkbox => f.checked.to_string(),
                        _ => f.value.clone(),
                    };
                    (f.key, value)
                })
                .collect(),
        )
    }

    fn focus_count(&self) -> usize {
        self.fields.len() + self.buttons.len()
    }

    fn focused_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focus)
    }

    fn focused_button(&self) -> Option<&FormButton> {
        self.focus
            .checked_sub(self.fields.len())
            .and_then(|i| self.buttons.get(i))
    }

    fn focus_next(&mut self) {
        let count = self.focus_count();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    fn focus_previous(&mut self) {
        let count = self.focus_count();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Fills every field's error. Returns true when the form is valid.
    pub fn validate(&mut self) -> bool {
        let values = self.values();
        for field in &mut self.fields {
            let value = match field.kind {
                FieldKind::Checkbox => field.checked.to_string(),
                _ => field.value.clone(),
            };
            field.error = field
                .rules
                .iter()
                .find_map(|rule| rule.check(&value, &values));
        }
        self.fields.iter().all(|f| f.error.is_none())
    }

    fn try_submit(&mut self) -> Option<FormEvent> {
        self.attempted = true;
        if self.validate() {
            return Some(FormEvent::Submit(self.values()));
        }
        if let Some(first_invalid) = self.fields.iter().position(|f| f.error.is_some()) {
            self.focus = first_invalid;
        }
        None
    }

    fn edited(&mut self) {
        if self.attempted {
            self.validate();
        }
    }
}

impl EventHandler for FormState {
    type Event = FormEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<FormEvent> {
        match event {
            TuiEvent::Tab | TuiEvent::Down => {
                self.focus_next();
                None
            }
            TuiEvent::BackTab | TuiEvent::Up => {
                self.focus_previous();
                None
            }
            TuiEvent::Escape => self
                .buttons
                .iter()
                .any(|b| b.role == ButtonRole::Cancel)
                .then_some(FormEvent::Cancel),
            TuiEvent::Enter => match self.focused_button().map(|b| b.role) {
                Some(ButtonRole::Cancel) => Some(FormEvent::Cancel),
                Some(ButtonRole::Secondary) => Some(FormEvent::Secondary),
                Some(ButtonRole::Submit) | None => self.try_submit(),
            },
            TuiEvent::Char(c) => {
                let field = self.focused_field_mut()?;
                match field.kind {
                    FieldKind::Checkbox if *c == ' ' => field.checked = !field.checked,
                    FieldKind::Checkbox => return None,
                    _ => field.value.push(*c),
                }
                self.edited();
                None
            }
            TuiEvent::Paste(text) => {
                let field = self.focused_field_mut()?;
                if field.is_text() {
                    field.value.extend(text.chars().filter(|c| !c.is_control()));
                    self.edited();
                }
                None
            }
            TuiEvent::Backspace => {
                let field = self.focused_field_mut()?;
                if field.is_text() && field.value.pop().is_some() {
                    self.edited();
                }
                None
            }
            _ => None,
        }
    }
}

const FORM_WIDTH: u16 = 60;

/// Transient render wrapper for a form.
pub struct Form<'a> {
    state: &'a FormState,
}

impl<'a> Form<'a> {
    pub fn new(state: &'a FormState) -> Self {
        Self { state }
    }

    /// Rows needed inside the border: three per text field (label, input,
    /// error), two per checkbox, one blank and one for the buttons.
    fn content_height(&self) -> u16 {
        let fields: u16 = self
            .state
            .fields
            .iter()
            .map(|f| if f.is_text() { 3 } else { 2 })
            .sum();
        fields + 2
    }
}

impl Component for Form<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = self.content_height() + 2;
        let outer = centered_fixed(FORM_WIDTH, height, area);
        frame.render_widget(Clear, outer);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Line::from(format!(" {} ", self.state.title)).bold())
            .title_alignment(Alignment::Center)
            .title_bottom(Line::from(" Tab Próximo  Enter Enviar  Esc Voltar ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(outer);
        frame.render_widget(block, outer);

        let constraints: Vec<Constraint> = self
            .state
            .fields
            .iter()
            .map(|f| Constraint::Length(if f.is_text() { 3 } else { 2 }))
            .chain([Constraint::Length(1), Constraint::Length(1)])
            .collect();
        let rows = Layout::vertical(constraints).split(inner);

        let error_style = Style::default().fg(Color::Red);
        for (i, field) in self.state.fields.iter().enumerate() {
            let focused = i == self.state.focus;
            let row = rows[i];
            let input_style = if focused {
                Style::default().fg(Color::Black).bg(Color::Gray)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };

            match field.kind {
                FieldKind::Checkbox => {
                    let mark = if field.checked { "[x]" } else { "[ ]" };
                    let style = if focused {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    let line = Line::from(Span::styled(format!("{mark} {}", field.label), style));
                    frame.render_widget(Paragraph::new(line), Rect { height: 1, ..row });
                }
                FieldKind::Text | FieldKind::Secret => {
                    let label_area = Rect { height: 1, ..row };
                    let input_area = Rect {
                        y: row.y + 1,
                        height: 1,
                        ..row
                    };
                    let error_area = Rect {
                        y: row.y + 2,
                        height: 1,
                        ..row
                    };
                    frame.render_widget(Paragraph::new(format!("{}:", field.label)), label_area);

                    let width = input_area.width as usize;
                    let shown = field.display_value();
                    let input = if shown.is_empty() && !focused {
                        Span::styled(
                            truncate_str(field.placeholder, width),
                            input_style.add_modifier(Modifier::DIM),
                        )
                    } else {
                        Span::styled(tail(&shown, width.saturating_sub(1)), input_style)
                    };
                    frame.render_widget(Paragraph::new(Line::from(input)).style(input_style), input_area);

                    if focused {
                        let cursor_x = input_area.x
                            + (tail(&shown, width.saturating_sub(1)).width() as u16)
                                .min(input_area.width.saturating_sub(1));
                        frame.set_cursor_position(Position::new(cursor_x, input_area.y));
                    }
                }
            }

            if let Some(error) = field.error {
                let error_row = if field.is_text() { row.y + 2 } else { row.y + 1 };
                frame.render_widget(
                    Paragraph::new(Span::styled(error, error_style)),
                    Rect {
                        y: error_row,
                        height: 1,
                        ..row
                    },
                );
            }
        }

        let button_row = rows[rows.len() - 1];
        let spans: Vec<Span> = self
            .state
            .buttons
            .iter()
            .enumerate()
            .flat_map(|(i, button)| {
                let focused = self.state.fields.len() + i == self.state.focus;
                let style = match (focused, button.role) {
                    (true, _) => Style::default()
                        .fg(Color::Black)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                    (false, ButtonRole::Submit) => Style::default().fg(Color::Green),
                    (false, _) => Style::default().fg(Color::Gray),
                };
                [
                    Span::styled(format!("[ {} ]", button.label), style),
                    Span::raw("  "),
                ]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            button_row,
        );
    }
}

/// The last `max_width` columns of `s`, so the end being typed stays visible.
fn tail(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut width = 0;
    let mut start = s.len();
    for (i, c) in s.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        start = i;
    }
    s[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn password_form() -> FormState {
        FormState::new("Reset Password")
            .field(
                FormField::secret("password", "Password")
                    .rule(Rule::Required("Password is required"))
                    .rule(Rule::MinLength(6, "Password must be at least 6 characters long")),
            )
            .field(
                FormField::secret("repeat", "Repeat Password")
                    .rule(Rule::Required("Repeat password is required"))
                    .rule(Rule::Matches("password", "Passwords do not match")),
            )
            .button("Voltar", ButtonRole::Cancel)
            .button("Enviar", ButtonRole::Submit)
    }

    fn type_text(form: &mut FormState, text: &str) {
        for c in text.chars() {
            form.handle_event(&TuiEvent::Char(c));
        }
    }

    #[test]
    fn test_empty_submit_reports_required() {
        let mut form = password_form();
        assert_eq!(form.handle_event(&TuiEvent::Enter), None);
        assert_eq!(form.error("password"), Some("Password is required"));
        assert_eq!(form.error("repeat"), Some("Repeat password is required"));
        assert_eq!(form.focus(), 0);
    }

    #[test]
    fn test_min_length_and_match() {
        let mut form = password_form();
        type_text(&mut form, "abc");
        form.handle_event(&TuiEvent::Tab);
        type_text(&mut form, "abd");
        assert_eq!(form.handle_event(&TuiEvent::Enter), None);
        assert_eq!(
            form.error("password"),
            Some("Password must be at least 6 characters long")
        );
        assert_eq!(form.error("repeat"), Some("Passwords do not match"));
    }

    #[test]
    fn test_errors_clear_while_typing_after_failed_submit() {
        let mut form = password_form();
        form.handle_event(&TuiEvent::Enter);
        type_text(&mut form, "secret");
        assert_eq!(form.error("password"), None);
        assert_eq!(form.error("repeat"), Some("Repeat password is required"));
    }

    #[test]
    fn test_valid_submit_emits_values() {
        let mut form = password_form();
        type_text(&mut form, "secret1");
        form.handle_event(&TuiEvent::Tab);
        type_text(&mut form, "secret1");
        match form.handle_event(&TuiEvent::Enter) {
            Some(FormEvent::Submit(values)) => {
                assert_eq!(values.get("password"), "secret1");
                assert_eq!(values.get("missing"), "");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_focus_wraps_through_buttons() {
        let mut form = password_form();
        form.handle_event(&TuiEvent::BackTab);
        assert_eq!(form.focus(), 3);
        // Submit on an empty form reports errors and jumps to the first one.
        assert_eq!(form.handle_event(&TuiEvent::Enter), None);
        assert_eq!(form.focus(), 0);
        form.handle_event(&TuiEvent::BackTab);
        form.handle_event(&TuiEvent::BackTab);
        assert_eq!(form.handle_event(&TuiEvent::Enter), Some(FormEvent::Cancel));
        form.handle_event(&TuiEvent::Tab);
        form.handle_event(&TuiEvent::Tab);
        assert_eq!(form.focus(), 0);
    }

    #[test]
    fn test_escape_needs_cancel_button() {
        let mut form = password_form();
        assert_eq!(form.handle_event(&TuiEvent::Escape), Some(FormEvent::Cancel));
        let mut bare = FormState::new("x").field(FormField::text("a", "A"));
        assert_eq!(bare.handle_event(&TuiEvent::Escape), None);
    }

    #[test]
    fn test_checkbox_toggles_with_space() {
        let mut form = FormState::new("Login")
            .field(FormField::checkbox("remember", "Lembrar-me"))
            .button("Entrar", ButtonRole::Submit);
        form.handle_event(&TuiEvent::Char('x'));
        assert!(!form.values().is_checked("remember"));
        form.handle_event(&TuiEvent::Char(' '));
        assert!(form.values().is_checked("remember"));
    }

    #[test]
    fn test_numeric_rule() {
        let mut form = FormState::new("Produto").field(
            FormField::text("category", "Categoria").rule(Rule::Numeric("Categoria deve ser um número")),
        );
        form.handle_event(&TuiEvent::Enter);
        assert_eq!(form.error("category"), None);
        type_text(&mut form, "abc");
        assert_eq!(form.error("category"), Some("Categoria deve ser um número"));
        form.handle_event(&TuiEvent::Backspace);
        form.handle_event(&TuiEvent::Backspace);
        form.handle_event(&TuiEvent::Backspace);
        type_text(&mut form, "12");
        assert_eq!(form.error("category"), None);
    }

    #[test]
    fn test_paste_strips_newlines() {
        let mut form = FormState::new("x").field(FormField::text("a", "A"));
        form.handle_event(&TuiEvent::Paste("ab\ncd".into()));
        assert_eq!(form.value("a"), "abcd");
    }

    #[test]
    fn test_tail_keeps_end_visible() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("abc", 5), "abc");
    }

    #[test]
    fn test_secret_is_masked_when_rendered() {
        let mut form = password_form();
        type_text(&mut form, "hunter2");
        let backend = TestBackend::new(80, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| Form::new(&form).render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Reset Password"));
        assert!(text.contains("•••••••"));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("[ Enviar ]"));
    }
}
