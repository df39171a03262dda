//! # Table View
//!
//! Client-side search, sort, pagination and column visibility over a row
//! collection handed in by a page. No I/O, no rendering. The TUI's
//! `DataTable` widget draws whatever this module derives.
//!
//! ```text
//! rows ──► filter (visible columns, search term)
//!            ──► sort (stable, ascending) ──► reverse if descending
//!                  ──► paginate (50 per page)
//! ```
//!
//! Every mutating operation re-runs the whole pipeline, so the derived view
//! is always a pure function of (rows, columns, search, sort, page).
//! The engine keeps its own copy of the rows; the caller's collection is
//! never reordered.

use std::cmp::Ordering;
use std::fmt;

/// Rows shown per page.
pub const PAGE_SIZE: usize = 50;

/// Pages shown on each side of the current page when no search is active.
const PAGE_WINDOW_RADIUS: usize = 2;

/// Field compared numerically (integer prefix) instead of as text.
pub const DEFAULT_NUMERIC_FIELD: &str = "identificador";

/// Default sort field before the user picks a column.
pub const DEFAULT_SORT_FIELD: &str = "id";

/// Shown as the only row when nothing matches.
pub const EMPTY_PLACEHOLDER: &str = "Nenhum dado disponível";

// ============================================================================
// Cells and Rows
// ============================================================================

/// The value of one field of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Empty text, zero, NaN and missing values never match a search.
    fn is_truthy(&self) -> bool {
        match self {
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Empty => false,
        }
    }

    /// Leading integer of the value, if any. `"12abc"` parses as 12.
    fn integer_prefix(&self) -> Option<i64> {
        match self {
            CellValue::Text(s) => parse_int_prefix(s),
            CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Anything that can be shown in a `TableView`: a unique string id plus
/// named fields.
pub trait Row: Clone {
    fn id(&self) -> &str;

    /// Value of the named field. Unknown names return `CellValue::Empty`.
    fn field(&self, name: &str) -> CellValue;
}

// ============================================================================
// Columns, Sorting, Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: u32,
    /// Row field this column reads.
    pub name: String,
    pub label: String,
    pub visible: bool,
}

impl Column {
    pub fn new(key: u32, name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key,
            name: name.into(),
            label: label.into(),
            visible: true,
        }
    }

    fn same_descriptor(&self, other: &Column) -> bool {
        self.key == other.key && self.name == other.name && self.label == other.label
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// A per-row button. Invoking it hands the row to `on_click` and returns
/// whatever the handler produces.
pub struct RowAction<R, A> {
    pub key: u32,
    pub title: String,
    pub icon: &'static str,
    /// Key that triggers the action on the selected row.
    pub hotkey: char,
    on_click: Box<dyn Fn(&R) -> A>,
}

impl<R, A> RowAction<R, A> {
    pub fn new(
        key: u32,
        title: impl Into<String>,
        icon: &'static str,
        hotkey: char,
        on_click: impl Fn(&R) -> A + 'static,
    ) -> Self {
        Self {
            key,
            title: title.into(),
            icon,
            hotkey,
            on_click: Box::new(on_click),
        }
    }
}

// ============================================================================
// TableView
// ============================================================================

pub struct TableView<R: Row, A = ()> {
    columns: Vec<Column>,
    rows: Vec<R>,
    search_term: String,
    sort_field: String,
    sort_direction: SortDirection,
    numeric_field: Option<String>,
    current_page: usize,
    // Derived
    filtered: Vec<R>,
    page_count: usize,
    page_buttons: Vec<usize>,
    // Caller hooks
    actions: Vec<RowAction<R, A>>,
    refresh: Option<Box<dyn Fn() -> A>>,
}

impl<R: Row, A> TableView<R, A> {
    pub fn new(columns: Vec<Column>) -> Self {
        let mut view = Self {
            columns: Vec::new(),
            rows: Vec::new(),
            search_term: String::new(),
            sort_field: DEFAULT_SORT_FIELD.to_string(),
            sort_direction: SortDirection::Ascending,
            numeric_field: Some(DEFAULT_NUMERIC_FIELD.to_string()),
            current_page: 1,
            filtered: Vec::new(),
            page_count: 0,
            page_buttons: Vec::new(),
            actions: Vec::new(),
            refresh: None,
        };
        view.set_columns(columns);
        view
    }

    pub fn with_actions(mut self, actions: Vec<RowAction<R, A>>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_refresh(mut self, refresh: impl Fn() -> A + 'static) -> Self {
        self.refresh = Some(Box::new(refresh));
        self
    }

    /// Overrides which field sorts by integer prefix. `None` sorts every
    /// field as text.
    pub fn with_numeric_field(mut self, field: Option<&str>) -> Self {
        self.numeric_field = field.map(str::to_string);
        self.derive();
        self
    }

    /// Replaces the column descriptors. A list identical to the current one
    /// keeps the visibility flags; any other list starts fully visible.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        let unchanged = columns.len() == self.columns.len()
            && columns
                .iter()
                .zip(&self.columns)
                .all(|(new, old)| new.same_descriptor(old));
        if !unchanged {
            self.columns = columns
                .into_iter()
                .map(|column| Column {
                    visible: true,
                    ..column
                })
                .collect();
        }
        self.derive();
    }

    /// Takes a fresh copy of the caller's rows and re-derives the view.
    pub fn set_rows(&mut self, rows: &[R]) {
        self.rows = rows.to_vec();
        self.derive();
    }

    pub fn search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.derive();
    }

    /// Sorting by the current field flips the direction; a new field starts
    /// ascending.
    pub fn sort(&mut self, field: &str) {
        if field == self.sort_field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field.to_string();
            self.sort_direction = SortDirection::Ascending;
        }
        self.derive();
    }

    /// Flips the visibility of the column with `key`. Returns false if no
    /// column has that key.
    pub fn toggle_column(&mut self, key: u32) -> bool {
        let Some(column) = self.columns.iter_mut().find(|c| c.key == key) else {
            return false;
        };
        column.visible = !column.visible;
        self.derive();
        true
    }

    /// Moves to `page` if it lies in `[1, total_pages]`. Out-of-range
    /// requests leave the view untouched and return false.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.page_count {
            return false;
        }
        self.current_page = page;
        self.derive();
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.visible)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// The caller's rows, in the order they were supplied.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn find(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// All rows that pass the search, sorted.
    pub fn filtered(&self) -> &[R] {
        &self.filtered
    }

    /// The slice of `filtered()` on the current page.
    pub fn page_rows(&self) -> &[R] {
        let start = (self.current_page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        self.filtered.get(start..end).unwrap_or(&[])
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Never less than 1, even for an empty view.
    pub fn total_pages(&self) -> usize {
        self.page_count.max(1)
    }

    /// Page numbers offered as buttons.
    pub fn page_buttons(&self) -> &[usize] {
        &self.page_buttons
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.page_count
    }

    pub fn actions(&self) -> &[RowAction<R, A>] {
        &self.actions
    }

    pub fn invoke_action(&self, key: u32, row: &R) -> Option<A> {
        self.actions
            .iter()
            .find(|action| action.key == key)
            .map(|action| (action.on_click)(row))
    }

    pub fn action_for_hotkey(&self, hotkey: char) -> Option<u32> {
        self.actions
            .iter()
            .find(|action| action.hotkey == hotkey)
            .map(|action| action.key)
    }

    pub fn refresh(&self) -> Option<A> {
        self.refresh.as_ref().map(|refresh| refresh())
    }

    /// Filter → sort → paginate.
    fn derive(&mut self) {
        let searching = !self.search_term.is_empty();

        let matched: Vec<R> = if searching {
            let needle = self.search_term.to_lowercase();
            self.rows
                .iter()
                .filter(|row| matches_visible_column(*row, &self.columns, &needle))
                .cloned()
                .collect()
        } else {
            self.rows.clone()
        };

        let mut ordered = sort_by_field(matched, &self.sort_field, self.numeric_field.as_deref());
        if self.sort_direction == SortDirection::Descending {
            ordered.reverse();
        }

        let page_count = ordered.len().div_ceil(PAGE_SIZE);
        if self.current_page > page_count.max(1) {
            self.current_page = 1;
        }

        self.page_buttons = if searching {
            (1..=page_count).collect()
        } else {
            let first = self.current_page.saturating_sub(PAGE_WINDOW_RADIUS);
            (first..=self.current_page + PAGE_WINDOW_RADIUS)
                .filter(|page| (1..=page_count).contains(page))
                .collect()
        };

        self.filtered = ordered;
        self.page_count = page_count;
    }
}

fn matches_visible_column<R: Row>(row: &R, columns: &[Column], needle: &str) -> bool {
    columns.iter().filter(|c| c.visible).any(|column| {
        let value = row.field(&column.name);
        value.is_truthy() && value.to_string().to_lowercase().contains(needle)
    })
}

/// Stable ascending sort of an owned copy.
///
/// Values that can be compared sort ahead of those that cannot, and the
/// latter keep their supplied order. The comparator stays a total order on
/// columns that mix text with numbers or missing values.
fn sort_by_field<R: Row>(mut rows: Vec<R>, field: &str, numeric_field: Option<&str>) -> Vec<R> {
    let numeric = numeric_field == Some(field);
    rows.sort_by(|a, b| {
        let (left, right) = (a.field(field), b.field(field));
        if numeric {
            match (left.integer_prefix(), right.integer_prefix()) {
                (Some(l), Some(r)) => l.cmp(&r),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        } else {
            match (&left, &right) {
                (CellValue::Text(l), CellValue::Text(r)) => locale_compare(l, r),
                (CellValue::Text(_), _) => Ordering::Less,
                (_, CellValue::Text(_)) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        }
    });
    rows
}

/// Collation close to a Portuguese locale. Symbols rank before digits and
/// digits before letters; accents and case only break ties. Lowercase sorts
/// before uppercase on a tie, as ICU does.
///
/// Within each class characters compare by code point, so this is not a
/// full UCA collation (e.g. `"-"` and `"_"` order by their code points).
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let (lower_a, lower_b) = (a.to_lowercase(), b.to_lowercase());
    collation_key(&lower_a)
        .cmp(&collation_key(&lower_b))
        .then_with(|| lower_a.cmp(&lower_b))
        .then_with(|| b.cmp(a))
}

fn collation_key(s: &str) -> Vec<(u8, char)> {
    fold_accents(s)
        .chars()
        .map(|c| {
            let class = if c.is_alphabetic() {
                2
            } else if c.is_numeric() {
                1
            } else {
                0
            };
            (class, c)
        })
        .collect()
}

fn fold_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'ç' => 'c',
            'è' | 'é' | 'ê' | 'ë' => 'e',
            'ì' | 'í' | 'î' | 'ï' => 'i',
            'ñ' => 'n',
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
            'ù' | 'ú' | 'û' | 'ü' => 'u',
            'ý' | 'ÿ' => 'y',
            other => other,
        })
        .collect()
}

/// Leading optionally-signed integer after leading whitespace.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
