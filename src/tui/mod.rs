//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Routing
//!
//! Each key goes to exactly one place, first match wins:
//!
//! 1. Ctrl+C quits, even while loading.
//! 2. An active overlay takes every key (loading swallows them).
//! 3. On the login screen, the form for the current step.
//! 4. On other screens, an open create/edit form, then Tab/Shift-Tab to
//!    switch between menu and content, then whichever has focus.
//!
//! ## Redraw Strategy
//!
//! - **Loading**: draws every ~80ms so the spinner turns.
//! - **Idle**: sleeps up to 500ms, only redraws on events, completed
//!   requests, or terminal resize.

mod component;
mod components;
mod event;
mod forms;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::api::Backend;
use crate::core::action::{Action, Effect, update};
use crate::core::request::{self, ApiRequest};
use crate::core::session;
use crate::core::state::{App, AuthStep, PageMode, Resource, Screen};
use crate::core::table::Row;
use crate::tui::component::EventHandler;
use crate::tui::components::overlay::overlay_action;
use crate::tui::components::{DataTableState, FormState, SidebarState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which half of an authenticated screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Content,
}

impl Focus {
    fn toggled(self) -> Focus {
        match self {
            Focus::Sidebar => Focus::Content,
            Focus::Content => Focus::Sidebar,
        }
    }
}

/// Identifies the create/edit form that is open: resource plus the id of
/// the row being edited.
type FormKey = (Resource, Option<String>);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub sidebar: SidebarState,
    pub focus: Focus,
    pub users_table: DataTableState,
    pub products_table: DataTableState,
    pub auth_form: FormState,
    pub resource_form: Option<FormState>,
    // What the forms above were built for, so `sync` rebuilds them only
    // when the screen or page mode actually changes.
    auth_step: Option<AuthStep>,
    form_key: Option<FormKey>,
    screen: Option<Screen>,
    /// Spinner frame.
    pub tick: usize,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            sidebar: SidebarState::new(),
            focus: Focus::Sidebar,
            users_table: DataTableState::new(Resource::Users),
            products_table: DataTableState::new(Resource::Products),
            auth_form: forms::login_form(),
            resource_form: None,
            auth_step: Some(AuthStep::Login),
            form_key: None,
            screen: None,
            tick: 0,
        }
    }

    /// Brings presentation state in line with `app` after it changed.
    pub fn sync(&mut self, app: &App) {
        if self.screen != Some(app.screen) {
            self.screen = Some(app.screen);
            self.sidebar.select_screen(app.screen);
            self.focus = match app.screen.resource() {
                Some(_) => Focus::Content,
                None => Focus::Sidebar,
            };
        }

        match app.screen {
            Screen::Login(step) if self.auth_step != Some(step) => {
                self.auth_form = forms::auth_form(step);
                self.auth_step = Some(step);
            }
            Screen::Login(_) => {}
            _ => self.auth_step = None,
        }

        let wanted = open_form_key(app);
        if wanted != self.form_key {
            self.resource_form = match &wanted {
                Some((Resource::Users, _)) => Some(forms::user_form(match &app.users.mode {
                    PageMode::Edit(user) => Some(user),
                    _ => None,
                })),
                Some((Resource::Products, _)) => {
                    Some(forms::product_form(match &app.products.mode {
                        PageMode::Edit(product) => Some(product),
                        _ => None,
                    }))
                }
                None => None,
            };
            if wanted.is_some() {
                self.focus = Focus::Content;
            }
            self.form_key = wanted;
        }
    }

    fn table_state(&mut self, resource: Resource) -> &mut DataTableState {
        match resource {
            Resource::Users => &mut self.users_table,
            Resource::Products => &mut self.products_table,
        }
    }
}

fn open_form_key(app: &App) -> Option<FormKey> {
    match app.screen.resource()? {
        Resource::Users => mode_key(Resource::Users, &app.users.mode),
        Resource::Products => mode_key(Resource::Products, &app.products.mode),
    }
}

fn mode_key<R: Row>(resource: Resource, mode: &PageMode<R>) -> Option<FormKey> {
    match mode {
        PageMode::List => None,
        PageMode::Create => Some((resource, None)),
        PageMode::Edit(row) => Some((resource, Some(row.id().to_string()))),
    }
}

/// Decides what a key means given the current screen and focus.
pub fn route_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    if matches!(event, TuiEvent::ForceQuit) {
        return Some(Action::Quit);
    }

    if !app.notifier.is_idle() {
        return overlay_action(app.notifier.kind(), event);
    }

    if let Screen::Login(step) = app.screen {
        let form_event = tui.auth_form.handle_event(event)?;
        return forms::auth_action(step, form_event);
    }

    let resource = app.screen.resource();

    if let (Some(resource), Some(form), Focus::Content) =
        (resource, tui.resource_form.as_mut(), tui.focus)
    {
        let form_event = form.handle_event(event)?;
        return forms::resource_action(resource, form_event);
    }

    let capturing = resource.is_some_and(|r| tui.table_state(r).is_capturing());
    if matches!(event, TuiEvent::Tab | TuiEvent::BackTab) && !capturing {
        tui.focus = tui.focus.toggled();
        return None;
    }

    match (tui.focus, resource) {
        (Focus::Sidebar, _) => tui.sidebar.handle_event(event),
        (Focus::Content, Some(Resource::Users)) => {
            tui.users_table.handle_event(event, &mut app.users.table)
        }
        (Focus::Content, Some(Resource::Products)) => {
            tui.products_table.handle_event(event, &mut app.products.table)
        }
        (Focus::Content, None) => None,
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Release events are reported so they can be ignored explicitly;
        // terminals without the protocol ignore the flags.
        execute!(
            stdout(),
            EnableBracketedPaste,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Runs `action` through the reducer and performs the effect. Returns true
/// when the app should quit.
fn dispatch(app: &mut App, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    match update(app, action) {
        Effect::None => {}
        Effect::Quit => return true,
        Effect::Request(request) => spawn_request(app.backend.clone(), request, tx.clone()),
        Effect::SaveSession => {
            if let Some(current) = &app.session {
                session::save_session(current);
            }
        }
        Effect::ClearSession => session::clear_session(),
    }
    false
}

fn spawn_request(backend: Arc<dyn Backend>, request: ApiRequest, tx: mpsc::Sender<Action>) {
    info!("Spawning API request");
    tokio::spawn(async move {
        let action = request::execute(backend.as_ref(), request).await;
        if tx.send(action).is_err() {
            warn!("Failed to deliver request result: receiver dropped");
        }
    });
}

pub fn run(mut app: App) -> std::io::Result<()> {
    let mut tui = TuiState::new();
    tui.sync(&app);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Completed requests come back on this channel
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = app.notifier.is_loading();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.tick = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue;
            }
            if let Some(action) = route_event(&mut app, &mut tui, &event) {
                should_quit |= dispatch(&mut app, action, &tx);
            }
            tui.sync(&app);
            if should_quit {
                break;
            }
        }

        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            should_quit |= dispatch(&mut app, action, &tx);
            tui.sync(&app);
        }

        if should_quit {
            break;
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}
