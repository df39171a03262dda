//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields:
//! - `TitleBar`: Top status bar with page title, user and status
//! - `HomePage`: Welcome page
//! - `OverlayView`: Loading/success/error/confirm dialog
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state that handles events, plus a transient wrapper created
//! each frame for rendering:
//! - `SidebarState` / `Sidebar`: Page navigation
//! - `DataTableState` / `DataTable`: Search, sort, column menu, pagination
//! - `FormState` / `Form`: Fields, validation, buttons
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props, not by reaching into `App`.
//!
//! ```rust,ignore
//! // Good: Dependencies are explicit
//! TitleBar::new(title, username, since, status).render(frame, area);
//!
//! // Bad: Hidden dependency on global state
//! title_bar.render(frame, area); // reads from global App
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file, layout helpers)
//! ├── title_bar.rs     (Top status bar)
//! ├── sidebar.rs       (Navigation menu)
//! ├── data_table.rs    (TableView renderer)
//! ├── form.rs          (Generic form)
//! ├── overlay.rs       (Notifier dialog)
//! └── home.rs          (Welcome page)
//! ```

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub mod data_table;
pub mod form;
pub mod home;
pub mod overlay;
pub mod sidebar;
mod title_bar;

pub use data_table::{DataTable, DataTableState};
pub use form::{ButtonRole, FieldKind, Form, FormEvent, FormField, FormState, FormValues, Rule};
pub use home::HomePage;
pub use overlay::OverlayView;
pub use sidebar::{Sidebar, SidebarState};
pub use title_bar::TitleBar;

/// Truncate to `max_width` display columns, ending in "..." when cut.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width - 3 {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

/// A rect of at most `width` x `height`, centered in `outer`.
pub fn centered_fixed(width: u16, height: u16, outer: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(outer.height))])
        .flex(Flex::Center)
        .areas(outer);
    let [center] = Layout::horizontal([Constraint::Length(width.min(outer.width))])
        .flex(Flex::Center)
        .areas(row);
    center
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Produtos", 20), "Produtos");
        assert_eq!(truncate_str("Produtos", 6), "Pro...");
        assert_eq!(truncate_str("Produtos", 2), "..");
        assert_eq!(truncate_str("Usuário Ágil", 10), "Usuário...");
    }

    #[test]
    fn test_centered_fixed_clamps_to_outer() {
        let outer = Rect::new(0, 0, 40, 10);
        let inner = centered_fixed(20, 4, outer);
        assert_eq!((inner.x, inner.y, inner.width, inner.height), (10, 3, 20, 4));
        let clamped = centered_fixed(80, 40, outer);
        assert_eq!(clamped, outer);
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let outer = Rect::new(0, 0, 100, 50);
        let inner = centered_rect(60, 50, outer);
        assert_eq!(inner.width, 60);
        assert!(inner.x > 0 && inner.y > 0);
    }
}
