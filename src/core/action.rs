//! # Actions
//!
//! Everything that can happen in the panel becomes an `Action`.
//! User submits the login form? That's `Action::SubmitLogin`.
//! The backend answers? That's `Action::LoginFinished(result)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state and returns an `Effect` describing any I/O to perform. No side
//! effects here. The TUI spawns the request and feeds its completion back
//! in as another action.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//!                                               │
//!        Action::…Finished  ◄── request task ◄──┘
//! ```
//!
//! Every network call is bracketed by the notifier: `show_loading` when the
//! request is issued, `settle` when its completion arrives. While the
//! loading overlay is up, new user requests are ignored.

use std::fmt;

use log::{debug, info, warn};
use serde_json::Value;

use crate::api::{
    ApiError, AuthResponse, Product, ProductInput, RecoveryResponse, User, UserInput,
    changed_fields,
};
use crate::core::masks::{capitalize_text_without_connectors, text_without_space};
use crate::core::notifier::Notify;
use crate::core::request::ApiRequest;
use crate::core::session::Session;
use crate::core::state::{App, AuthStep, PageMode, Resource, ResourcePage, Screen};
use crate::core::table::Row;

pub const INVALID_EMAIL_MESSAGE: &str = "E-mail inválido.";
pub const INVALID_CODE_MESSAGE: &str = "Código inválido.";

/// A string that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(***)")
    }
}

/// What a successful write did, for the success message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Sidebar navigation between authenticated screens.
    Navigate(Screen),
    /// Move between the login and password-recovery steps.
    ShowAuthStep(AuthStep),
    Logout,
    Quit,

    SubmitLogin {
        username: String,
        password: Secret,
        remember: bool,
    },
    LoginFinished {
        username: String,
        remember: bool,
        result: Result<AuthResponse, ApiError>,
    },
    SubmitRecoveryEmail(String),
    RecoveryEmailFinished(Result<RecoveryResponse, ApiError>),
    SubmitRecoveryCode(String),
    RecoveryCodeFinished(Result<RecoveryResponse, ApiError>),
    SubmitNewPassword(Secret),
    NewPasswordFinished(Result<RecoveryResponse, ApiError>),

    /// Fetch a collection. Also what the table's refresh produces.
    Load(Resource),
    UsersLoaded(Result<Vec<User>, ApiError>),
    ProductsLoaded(Result<Vec<Product>, ApiError>),

    OpenCreateForm(Resource),
    EditRow(Resource, String),
    CloseForm(Resource),
    SubmitUser(UserInput),
    SubmitProduct(ProductInput),
    SaveFinished {
        resource: Resource,
        kind: SaveKind,
        result: Result<Value, ApiError>,
    },
    /// Ask before deleting. Confirming dispatches `Delete`.
    RequestDelete(Resource, String),
    Delete(Resource, String),
    /// Close the form and reload the list. Runs when a save is acknowledged.
    Reload(Resource),

    AcknowledgeSuccess,
    AcknowledgeError,
    AnswerConfirm(bool),
}

impl Action {
    /// Actions that start work on the user's behalf. These are dropped while
    /// a request is in flight.
    fn is_user_request(&self) -> bool {
        matches!(
            self,
            Action::Navigate(_)
                | Action::ShowAuthStep(_)
                | Action::Logout
                | Action::SubmitLogin { .. }
                | Action::SubmitRecoveryEmail(_)
                | Action::SubmitRecoveryCode(_)
                | Action::SubmitNewPassword(_)
                | Action::Load(_)
                | Action::OpenCreateForm(_)
                | Action::EditRow(..)
                | Action::CloseForm(_)
                | Action::SubmitUser(_)
                | Action::SubmitProduct(_)
                | Action::RequestDelete(..)
                | Action::Delete(..)
                | Action::Reload(_)
        )
    }
}

/// Side effects returned by `update()` for the TUI to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    Request(ApiRequest),
    SaveSession,
    ClearSession,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    if app.notifier.is_loading() && action.is_user_request() {
        debug!("Ignoring {:?} while a request is in flight", action);
        return Effect::None;
    }

    match action {
        Action::Quit => Effect::Quit,

        Action::Navigate(screen) => {
            if !screen.is_authenticated() || app.session.is_none() {
                warn!("Refusing to navigate to {:?}", screen);
                return Effect::None;
            }
            app.screen = screen;
            match screen.resource() {
                Some(resource) => {
                    set_mode_list(app, resource);
                    begin(app, list_request(resource))
                }
                None => Effect::None,
            }
        }

        Action::ShowAuthStep(step) => {
            if app.screen.is_authenticated() {
                return Effect::None;
            }
            if step == AuthStep::Login {
                app.recovery_token.clear();
            }
            app.screen = Screen::Login(step);
            Effect::None
        }

        Action::Logout => {
            info!("Logging out");
            app.session = None;
            app.backend.set_token(None);
            app.recovery_token.clear();
            app.users.mode = PageMode::List;
            app.products.mode = PageMode::List;
            app.users.table.set_rows(&[]);
            app.products.table.set_rows(&[]);
            app.screen = Screen::Login(AuthStep::Login);
            app.status_message = String::from("Sessão encerrada.");
            Effect::ClearSession
        }

        // --- Login ----------------------------------------------------------
        Action::SubmitLogin {
            username,
            password,
            remember,
        } => {
            info!("Logging in as {}", username);
            begin(
                app,
                ApiRequest::Login {
                    username,
                    password,
                    remember,
                },
            )
        }

        Action::LoginFinished {
            username,
            remember,
            result,
        } => {
            let Some(auth) = app.notifier.settle(result) else {
                return Effect::None;
            };
            info!("Logged in as {}", username);
            let session = Session::from_login(&username, remember, auth);
            app.backend.set_token(Some(session.token.clone()));
            app.session = Some(session);
            app.screen = Screen::Home;
            app.status_message = format!("Olá, {username}!");
            Effect::SaveSession
        }

        // --- Password recovery ----------------------------------------------
        Action::SubmitRecoveryEmail(email) => {
            let token = app.recovery_token.clone();
            begin(
                app,
                ApiRequest::SendEmail {
                    email: text_without_space(&email),
                    token,
                },
            )
        }

        Action::RecoveryEmailFinished(result) => {
            advance_recovery(app, result, AuthStep::VerifyCode, INVALID_EMAIL_MESSAGE);
            Effect::None
        }

        Action::SubmitRecoveryCode(code) => {
            let token = app.recovery_token.clone();
            begin(
                app,
                ApiRequest::SendCode {
                    code: text_without_space(&code),
                    token,
                },
            )
        }

        Action::RecoveryCodeFinished(result) => {
            advance_recovery(app, result, AuthStep::ResetPassword, INVALID_CODE_MESSAGE);
            Effect::None
        }

        Action::SubmitNewPassword(password) => {
            let token = app.recovery_token.clone();
            begin(app, ApiRequest::SendNewPassword { password, token })
        }

        Action::NewPasswordFinished(result) => {
            if app.notifier.settle(result).is_some() {
                info!("Password reset");
                app.recovery_token.clear();
                app.screen = Screen::Login(AuthStep::Login);
                app.status_message = String::from("Senha alterada. Faça login.");
            }
            Effect::None
        }

        // --- Collections ----------------------------------------------------
        Action::Load(resource) => begin(app, list_request(resource)),

        Action::Reload(resource) => {
            set_mode_list(app, resource);
            begin(app, list_request(resource))
        }

        Action::UsersLoaded(result) => {
            if let Some(users) = app.notifier.settle(result) {
                info!("Loaded {} users", users.len());
                app.users.table.set_rows(&users);
            }
            Effect::None
        }

        Action::ProductsLoaded(result) => {
            if let Some(products) = app.notifier.settle(result) {
                info!("Loaded {} products", products.len());
                app.products.table.set_rows(&products);
            }
            Effect::None
        }

        // --- Forms ----------------------------------------------------------
        Action::OpenCreateForm(resource) => {
            match resource {
                Resource::Users => app.users.mode = PageMode::Create,
                Resource::Products => app.products.mode = PageMode::Create,
            }
            Effect::None
        }

        Action::EditRow(resource, id) => {
            let opened = match resource {
                Resource::Users => open_edit(&mut app.users, &id),
                Resource::Products => open_edit(&mut app.products, &id),
            };
            if !opened {
                warn!("Edit requested for unknown {} {}", resource.noun(), id);
            }
            Effect::None
        }

        Action::CloseForm(resource) => {
            set_mode_list(app, resource);
            Effect::None
        }

        Action::SubmitUser(input) => {
            let input = UserInput {
                name: capitalize_text_without_connectors(&text_without_space(&input.name)),
                email: text_without_space(&input.email),
                role: text_without_space(&input.role),
                status: text_without_space(&input.status),
            };
            match &app.users.mode {
                PageMode::List => Effect::None,
                PageMode::Create => begin(app, ApiRequest::CreateUser(input)),
                PageMode::Edit(row) => {
                    let changes = changed_fields(&UserInput::from(row), &input);
                    if changes.is_empty() {
                        app.status_message = String::from("Nenhuma alteração.");
                        return Effect::None;
                    }
                    let id = row.id.clone();
                    begin(app, ApiRequest::UpdateUser { id, changes })
                }
            }
        }

        Action::SubmitProduct(input) => {
            let input = ProductInput {
                name: capitalize_text_without_connectors(&text_without_space(&input.name)),
                price: text_without_space(&input.price),
                stock: text_without_space(&input.stock),
                ..input
            };
            match &app.products.mode {
                PageMode::List => Effect::None,
                PageMode::Create => begin(app, ApiRequest::CreateProduct(input)),
                PageMode::Edit(row) => {
                    let changes = changed_fields(&ProductInput::from(row), &input);
                    if changes.is_empty() {
                        app.status_message = String::from("Nenhuma alteração.");
                        return Effect::None;
                    }
                    let id = row.id.clone();
                    begin(app, ApiRequest::UpdateProduct { id, changes })
                }
            }
        }

        Action::SaveFinished {
            resource,
            kind,
            result,
        } => {
            if app.notifier.settle(result).is_some() {
                info!("{:?} {} saved", kind, resource.noun());
                app.notifier.show_success(
                    Some(save_message(resource, kind).to_string()),
                    Some(Box::new(move || Action::Reload(resource))),
                );
            }
            Effect::None
        }

        // --- Delete ---------------------------------------------------------
        Action::RequestDelete(resource, id) => {
            let message = format!(
                "Deseja realmente excluir o {} \"{}\"?",
                resource.noun(),
                app.row_label(resource, &id)
            );
            app.notifier
                .show_confirm(message, Some(Box::new(move || Action::Delete(resource, id))));
            Effect::None
        }

        Action::Delete(resource, id) => {
            let request = match resource {
                Resource::Users => ApiRequest::DeleteUser(id),
                Resource::Products => ApiRequest::DeleteProduct(id),
            };
            begin(app, request)
        }

        // --- Overlay acknowledgements ---------------------------------------
        Action::AcknowledgeSuccess => match app.notifier.hide_success() {
            Some(next) => update(app, next),
            None => Effect::None,
        },

        Action::AcknowledgeError => {
            app.notifier.hide_error();
            Effect::None
        }

        Action::AnswerConfirm(confirmed) => match app.notifier.hide_confirm(confirmed) {
            Some(next) => update(app, next),
            None => Effect::None,
        },
    }
}

/// Opens the loading bracket and hands the request to the TUI.
fn begin(app: &mut App, request: ApiRequest) -> Effect {
    debug!("Issuing {:?}", request);
    app.notifier.show_loading();
    Effect::Request(request)
}

fn list_request(resource: Resource) -> ApiRequest {
    match resource {
        Resource::Users => ApiRequest::ListUsers,
        Resource::Products => ApiRequest::ListProducts,
    }
}

fn open_edit<R: Row>(page: &mut ResourcePage<R>, id: &str) -> bool {
    match page.table.find(id).cloned() {
        Some(row) => {
            page.mode = PageMode::Edit(row);
            true
        }
        None => false,
    }
}

fn set_mode_list(app: &mut App, resource: Resource) {
    match resource {
        Resource::Users => app.users.mode = PageMode::List,
        Resource::Products => app.products.mode = PageMode::List,
    }
}

/// Each recovery step answers with the token for the next one. No token
/// means the step was rejected.
fn advance_recovery(
    app: &mut App,
    result: Result<RecoveryResponse, ApiError>,
    next: AuthStep,
    rejected_message: &str,
) {
    let Some(response) = app.notifier.settle(result) else {
        return;
    };
    match response.token.filter(|t| !t.is_empty()) {
        Some(token) => {
            app.recovery_token = token;
            app.screen = Screen::Login(next);
        }
        None => {
            warn!("Recovery step rejected: {}", rejected_message);
            app.notifier.show_error(Some(rejected_message.to_string()));
        }
    }
}

pub fn save_message(resource: Resource, kind: SaveKind) -> &'static str {
    match (resource, kind) {
        (Resource::Users, SaveKind::Created) => "Usuário criado com sucesso!",
        (Resource::Users, SaveKind::Updated) => "Usuário editado com sucesso!",
        (Resource::Users, SaveKind::Deleted) => "Usuário excluído com sucesso!",
        (Resource::Products, SaveKind::Created) => "Produto criado com sucesso!",
        (Resource::Products, SaveKind::Updated) => "Produto editado com sucesso!",
        (Resource::Products, SaveKind::Deleted) => "Produto excluído com sucesso!",
    }
}
