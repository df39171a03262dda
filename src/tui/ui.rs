use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::{App, Screen};
use crate::tui::component::Component;
use crate::tui::components::sidebar::SIDEBAR_WIDTH;
use crate::tui::components::{DataTable, Form, HomePage, OverlayView, Sidebar, TitleBar};
use crate::tui::{Focus, TuiState};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, main_area] = Layout::vertical([Length(1), Min(0)]).areas(frame.area());

    let session = app.session.as_ref();
    TitleBar::new(
        app.screen.title(),
        session.map(|s| s.username.clone()),
        session.map(|s| s.logged_in_at.clone()),
        app.status_message.as_str(),
    )
    .render(frame, title_area);

    if app.screen.is_authenticated() {
        let [sidebar_area, content_area] =
            Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(main_area);
        Sidebar::new(&mut tui.sidebar, app.screen, tui.focus == Focus::Sidebar)
            .render(frame, sidebar_area);
        draw_content(frame, content_area, app, tui);
    } else {
        Form::new(&tui.auth_form).render(frame, main_area);
    }

    // The overlay covers everything, title bar included.
    OverlayView::new(app.notifier.kind(), app.notifier.overlay().message(), tui.tick)
        .render(frame, frame.area());
}

fn draw_content(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let focused = tui.focus == Focus::Content;
    if let Some(form) = &tui.resource_form {
        Form::new(form).render(frame, area);
        return;
    }
    match app.screen {
        Screen::Users => {
            DataTable::new(&mut tui.users_table, &app.users.table, focused).render(frame, area)
        }
        Screen::Products => {
            DataTable::new(&mut tui.products_table, &app.products.table, focused)
                .render(frame, area)
        }
        Screen::Home | Screen::Login(_) => {
            HomePage::new(app.username().unwrap_or_default()).render(frame, area)
        }
    }
}
