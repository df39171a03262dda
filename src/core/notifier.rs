//! # Notifier
//!
//! The single overlay shown on top of every screen: a loading spinner, a
//! success or error message, or a yes/no confirmation.
//!
//! ```text
//!            show_loading            hide_loading
//!   Idle ─────────────────► Loading ─────────────► Idle
//!     │  show_success(msg, ack?)        hide_success  → runs ack once
//!     ├───────────────────────► Success ───────────► Idle
//!     │  show_error(msg)                hide_error
//!     ├───────────────────────► Error ─────────────► Idle
//!     │  show_confirm(msg, on_yes?)     hide_confirm(yes) → runs on_yes if yes
//!     └───────────────────────► Confirm ───────────► Idle
//! ```
//!
//! Any `show_*` replaces whatever overlay is active. The deferred callback is
//! stored inside the variant it belongs to, so replacing an overlay drops its
//! callback without running it.
//!
//! Callbacks return a value instead of mutating state directly. The reducer
//! uses `Notifier<Action>` and dispatches whatever the acknowledgement
//! produces.

use std::fmt;

use crate::api::ApiError;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operação concluída com sucesso!";
pub const DEFAULT_ERROR_MESSAGE: &str = "Erro ao carregar os dados.";
pub const DEFAULT_CONFIRM_MESSAGE: &str = "Tem certeza que deseja continuar?";

/// Work postponed until the user acknowledges an overlay.
pub type Deferred<T> = Box<dyn FnOnce() -> T>;

pub enum Overlay<T> {
    Idle,
    Loading,
    Success {
        message: String,
        on_ack: Option<Deferred<T>>,
    },
    Error {
        message: String,
    },
    Confirm {
        message: String,
        on_confirm: Option<Deferred<T>>,
    },
}

impl<T> Overlay<T> {
    /// Text of the active overlay, if it has one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Overlay::Success { message, .. }
            | Overlay::Error { message }
            | Overlay::Confirm { message, .. } => Some(message),
            Overlay::Idle | Overlay::Loading => None,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        match self {
            Overlay::Idle => OverlayKind::Idle,
            Overlay::Loading => OverlayKind::Loading,
            Overlay::Success { .. } => OverlayKind::Success,
            Overlay::Error { .. } => OverlayKind::Error,
            Overlay::Confirm { .. } => OverlayKind::Confirm,
        }
    }
}

impl<T> fmt::Debug for Overlay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{:?}({message:?})", self.kind()),
            None => write!(f, "{:?}", self.kind()),
        }
    }
}

/// Discriminant of `Overlay`, handy for rendering and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Idle,
    Loading,
    Success,
    Error,
    Confirm,
}

/// Capability handed to anything that performs a network call.
pub trait Notify<T> {
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn show_success(&mut self, message: Option<String>, on_ack: Option<Deferred<T>>);
    /// Clears a success overlay and runs its acknowledgement, if any.
    fn hide_success(&mut self) -> Option<T>;
    fn show_error(&mut self, message: Option<String>);
    fn hide_error(&mut self);
    fn show_confirm(&mut self, message: String, on_confirm: Option<Deferred<T>>);
    /// Clears a confirmation; its callback runs only when `confirmed`.
    fn hide_confirm(&mut self, confirmed: bool) -> Option<T>;
}

pub struct Notifier<T = ()> {
    overlay: Overlay<T>,
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Notifier<T> {
    pub fn new() -> Self {
        Self {
            overlay: Overlay::Idle,
        }
    }

    pub fn overlay(&self) -> &Overlay<T> {
        &self.overlay
    }

    pub fn kind(&self) -> OverlayKind {
        self.overlay.kind()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.overlay, Overlay::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.overlay, Overlay::Loading)
    }

    /// Closes a loading bracket: hides the spinner and, on failure, shows the
    /// error's user-facing message. Returns the success value.
    pub fn settle<R>(&mut self, result: Result<R, ApiError>) -> Option<R> {
        self.hide_loading();
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Request failed: {}", e);
                self.show_error(Some(e.user_message()));
                None
            }
        }
    }
}

impl<T> Notify<T> for Notifier<T> {
    fn show_loading(&mut self) {
        self.overlay = Overlay::Loading;
    }

    fn hide_loading(&mut self) {
        if matches!(self.overlay, Overlay::Loading) {
            self.overlay = Overlay::Idle;
        }
    }

    fn show_success(&mut self, message: Option<String>, on_ack: Option<Deferred<T>>) {
        self.overlay = Overlay::Success {
            message: non_empty_or(message, DEFAULT_SUCCESS_MESSAGE),
            on_ack,
        };
    }

    fn hide_success(&mut self) -> Option<T> {
        if !matches!(self.overlay, Overlay::Success { .. }) {
            return None;
        }
        match std::mem::replace(&mut self.overlay, Overlay::Idle) {
            Overlay::Success { on_ack, .. } => on_ack.map(|ack| ack()),
            _ => None,
        }
    }

    fn show_error(&mut self, message: Option<String>) {
        self.overlay = Overlay::Error {
            message: non_empty_or(message, DEFAULT_ERROR_MESSAGE),
        };
    }

    fn hide_error(&mut self) {
        if matches!(self.overlay, Overlay::Error { .. }) {
            self.overlay = Overlay::Idle;
        }
    }

    fn show_confirm(&mut self, message: String, on_confirm: Option<Deferred<T>>) {
        self.overlay = Overlay::Confirm {
            message: non_empty_or(Some(message), DEFAULT_CONFIRM_MESSAGE),
            on_confirm,
        };
    }

    fn hide_confirm(&mut self, confirmed: bool) -> Option<T> {
        if !matches!(self.overlay, Overlay::Confirm { .. }) {
            return None;
        }
        match std::mem::replace(&mut self.overlay, Overlay::Idle) {
            Overlay::Confirm {
                on_confirm: Some(on_confirm),
                ..
            } if confirmed => Some(on_confirm()),
            _ => None,
        }
    }
}

fn non_empty_or(message: Option<String>, default: &str) -> String {
    message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default.to_string())
}
