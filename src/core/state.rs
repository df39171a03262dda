//! # Application State
//!
//! Core business state for the panel. This module contains domain logic only -
//! no TUI-specific types. Presentation state (form buffers, focus, scroll)
//! lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn Backend>     // REST backend
//! ├── session: Option<Session>      // logged-in user, token
//! ├── screen: Screen                // login step or page
//! ├── recovery_token: String        // password-recovery handshake
//! ├── users: ResourcePage<User>     // table + list/create/edit mode
//! ├── products: ResourcePage<Product>
//! ├── notifier: Notifier<Action>    // the one overlay
//! └── status_message: String        // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::sync::Arc;

use log::info;

use crate::api::{Backend, Product, User};
use crate::core::action::Action;
use crate::core::notifier::Notifier;
use crate::core::session::Session;
use crate::core::table::{Column, Row, RowAction, TableView};

/// Steps of the login screen. The recovery steps run in order and any of
/// them can go back to `Login`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    Login,
    ForgotPassword,
    VerifyCode,
    ResetPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login(AuthStep),
    Home,
    Users,
    Products,
}

impl Screen {
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Screen::Login(_))
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Login(AuthStep::Login) => "Login",
            Screen::Login(AuthStep::ResetPassword) => "Reset Password",
            Screen::Login(_) => "Trocar Senha",
            Screen::Home => "Home",
            Screen::Users => "Usuários",
            Screen::Products => "Produtos",
        }
    }

    pub fn resource(self) -> Option<Resource> {
        match self {
            Screen::Users => Some(Resource::Users),
            Screen::Products => Some(Resource::Products),
            _ => None,
        }
    }
}

/// A backend collection with its own page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Products,
}

impl Resource {
    pub fn screen(self) -> Screen {
        match self {
            Resource::Users => Screen::Users,
            Resource::Products => Screen::Products,
        }
    }

    /// Singular noun, used in messages.
    pub fn noun(self) -> &'static str {
        match self {
            Resource::Users => "usuário",
            Resource::Products => "produto",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageMode<R> {
    List,
    Create,
    /// Editing a copy of the row as it was when the form opened.
    Edit(R),
}

pub struct ResourcePage<R: Row> {
    pub table: TableView<R, Action>,
    pub mode: PageMode<R>,
}

impl<R: Row> ResourcePage<R> {
    fn new(table: TableView<R, Action>) -> Self {
        Self {
            table,
            mode: PageMode::List,
        }
    }

    pub fn is_listing(&self) -> bool {
        matches!(self.mode, PageMode::List)
    }
}

pub fn user_columns() -> Vec<Column> {
    vec![
        Column::new(1, "name", "Nome"),
        Column::new(2, "email", "Email"),
        Column::new(3, "role", "Função"),
        Column::new(4, "status", "Status"),
    ]
}

pub fn product_columns() -> Vec<Column> {
    vec![
        Column::new(1, "name", "Nome"),
        Column::new(2, "category", "Categoria"),
        Column::new(3, "price", "Preço"),
        Column::new(4, "stock", "Estoque"),
    ]
}

/// Editar / Excluir, producing the actions the reducer handles.
fn row_actions<R: Row + 'static>(resource: Resource) -> Vec<RowAction<R, Action>> {
    vec![
        RowAction::new(1, "Editar", "✎", 'e', move |row: &R| {
            Action::EditRow(resource, row.id().to_string())
        }),
        RowAction::new(2, "Excluir", "✖", 'd', move |row: &R| {
            Action::RequestDelete(resource, row.id().to_string())
        }),
    ]
}

fn resource_table<R: Row + 'static>(resource: Resource, columns: Vec<Column>) -> TableView<R, Action> {
    TableView::new(columns)
        .with_actions(row_actions(resource))
        .with_refresh(move || Action::Load(resource))
}

pub struct App {
    pub backend: Arc<dyn Backend>,
    pub session: Option<Session>,
    pub screen: Screen,
    /// Token exchanged by each password-recovery step. Starts empty.
    pub recovery_token: String,
    pub users: ResourcePage<User>,
    pub products: ResourcePage<Product>,
    pub notifier: Notifier<Action>,
    pub status_message: String,
}

impl App {
    /// Starts on the home page when a remembered session is handed in,
    /// on the login screen otherwise.
    pub fn new(backend: Arc<dyn Backend>, session: Option<Session>) -> Self {
        let session = session.filter(|s| s.remember && !s.token.is_empty());
        let screen = match &session {
            Some(s) => {
                info!("Resuming remembered session for {}", s.username);
                backend.set_token(Some(s.token.clone()));
                Screen::Home
            }
            None => Screen::Login(AuthStep::Login),
        };
        Self {
            backend,
            session,
            screen,
            recovery_token: String::new(),
            users: ResourcePage::new(resource_table(Resource::Users, user_columns())),
            products: ResourcePage::new(resource_table(Resource::Products, product_columns())),
            notifier: Notifier::new(),
            status_message: String::from("Bem-vindo!"),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.username.as_str())
    }

    /// Label of a row for confirmation messages: its name, or its id.
    pub fn row_label(&self, resource: Resource, id: &str) -> String {
        let name = match resource {
            Resource::Users => self.users.table.find(id).map(|u| u.name.clone()),
            Resource::Products => self.products.table.find(id).map(|p| p.name.clone()),
        };
        name.filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubBackend, remembered_session, test_app};

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Login(AuthStep::Login));
        assert!(app.session.is_none());
        assert!(app.notifier.is_idle());
        assert!(app.users.is_listing());
        assert_eq!(app.users.table.columns().len(), 4);
        assert_eq!(app.products.table.columns()[2].label, "Preço");
    }

    #[test]
    fn test_remembered_session_skips_login() {
        let backend = Arc::new(StubBackend::default());
        let app = App::new(backend.clone(), Some(remembered_session(true)));
        assert_eq!(app.screen, Screen::Home);
        assert_eq!(app.username(), Some("ana"));
        assert_eq!(backend.token().as_deref(), Some("tok"));
    }

    #[test]
    fn test_unremembered_session_is_ignored() {
        let backend = Arc::new(StubBackend::default());
        let app = App::new(backend.clone(), Some(remembered_session(false)));
        assert_eq!(app.screen, Screen::Login(AuthStep::Login));
        assert!(app.session.is_none());
        assert_eq!(backend.token(), None);
    }

    #[test]
    fn test_row_actions_produce_reducer_actions() {
        let app = test_app();
        let user = User {
            id: "u1".into(),
            ..Default::default()
        };
        let table = &app.users.table;
        assert_eq!(
            table.invoke_action(1, &user),
            Some(Action::EditRow(Resource::Users, "u1".into()))
        );
        assert_eq!(
            table.action_for_hotkey('d').and_then(|key| table.invoke_action(key, &user)),
            Some(Action::RequestDelete(Resource::Users, "u1".into()))
        );
        assert_eq!(
            app.products.table.refresh(),
            Some(Action::Load(Resource::Products))
        );
    }

    #[test]
    fn test_row_label_falls_back_to_id() {
        let mut app = test_app();
        app.users.table.set_rows(&[User {
            id: "u1".into(),
            name: "Ana".into(),
            ..Default::default()
        }]);
        assert_eq!(app.row_label(Resource::Users, "u1"), "Ana");
        assert_eq!(app.row_label(Resource::Users, "u9"), "u9");
    }

    #[test]
    fn test_screen_resource_mapping() {
        assert_eq!(Screen::Users.resource(), Some(Resource::Users));
        assert_eq!(Resource::Products.screen(), Screen::Products);
        assert_eq!(Screen::Home.resource(), None);
        assert!(!Screen::Login(AuthStep::VerifyCode).is_authenticated());
    }
}
