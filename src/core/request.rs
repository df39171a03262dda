//! Backend calls described as data.
//!
//! `update()` returns `Effect::Request(ApiRequest)`; the TUI runs
//! [`execute`] on a tokio task and feeds the returned completion action back
//! into `update()`. Keeping the request as a value lets the reducer stay
//! free of I/O and lets tests assert on exactly what would be sent.

use log::debug;
use serde_json::{Map, Value};

use crate::api::{Backend, ProductInput, UserInput};
use crate::core::action::{Action, SaveKind, Secret};
use crate::core::state::Resource;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Login {
        username: String,
        password: Secret,
        remember: bool,
    },
    SendEmail {
        email: String,
        token: String,
    },
    SendCode {
        code: String,
        token: String,
    },
    SendNewPassword {
        password: Secret,
        token: String,
    },
    ListUsers,
    CreateUser(UserInput),
    UpdateUser {
        id: String,
        changes: Map<String, Value>,
    },
    DeleteUser(String),
    ListProducts,
    CreateProduct(ProductInput),
    UpdateProduct {
        id: String,
        changes: Map<String, Value>,
    },
    DeleteProduct(String),
}

/// Performs `request` against `backend` and wraps the outcome in the action
/// that completes it. Never fails: errors travel inside the action.
pub async fn execute(backend: &dyn Backend, request: ApiRequest) -> Action {
    debug!("Executing {:?}", request);
    match request {
        ApiRequest::Login {
            username,
            password,
            remember,
        } => {
            let result = backend.login(&username, password.expose()).await;
            Action::LoginFinished {
                username,
                remember,
                result,
            }
        }
        ApiRequest::SendEmail { email, token } => {
            Action::RecoveryEmailFinished(backend.send_email(&email, &token).await)
        }
        ApiRequest::SendCode { code, token } => {
            Action::RecoveryCodeFinished(backend.send_code(&code, &token).await)
        }
        ApiRequest::SendNewPassword { password, token } => Action::NewPasswordFinished(
            backend.send_new_password(password.expose(), &token).await,
        ),
        ApiRequest::ListUsers => Action::UsersLoaded(backend.list_users().await),
        ApiRequest::CreateUser(user) => saved(
            Resource::Users,
            SaveKind::Created,
            backend.create_user(&user).await,
        ),
        ApiRequest::UpdateUser { id, changes } => saved(
            Resource::Users,
            SaveKind::Updated,
            backend.update_user(&id, &changes).await,
        ),
        ApiRequest::DeleteUser(id) => saved(
            Resource::Users,
            SaveKind::Deleted,
            backend.delete_user(&id).await,
        ),
        ApiRequest::ListProducts => Action::ProductsLoaded(backend.list_products().await),
        ApiRequest::CreateProduct(product) => saved(
            Resource::Products,
            SaveKind::Created,
            backend.create_product(&product).await,
        ),
        ApiRequest::UpdateProduct { id, changes } => saved(
            Resource::Products,
            SaveKind::Updated,
            backend.update_product(&id, &changes).await,
        ),
        ApiRequest::DeleteProduct(id) => saved(
            Resource::Products,
            SaveKind::Deleted,
            backend.delete_product(&id).await,
        ),
    }
}

fn saved(
    resource: Resource,
    kind: SaveKind,
    result: Result<Value, crate::api::ApiError>,
) -> Action {
    Action::SaveFinished {
        resource,
        kind,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::test_support::StubBackend;
    use serde_json::json;

    #[tokio::test]
    async fn test_login_carries_username_and_remember() {
        let backend = StubBackend::default();
        let action = execute(
            &backend,
            ApiRequest::Login {
                username: "ana".into(),
                password: Secret::new("pw"),
                remember: true,
            },
        )
        .await;
        match action {
            Action::LoginFinished {
                username,
                remember,
                result,
            } => {
                assert_eq!(username, "ana");
                assert!(remember);
                assert_eq!(result.unwrap().token, "stub-token");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["login ana"]);
    }

    #[tokio::test]
    async fn test_update_passes_changes_through() {
        let backend = StubBackend::default();
        let mut changes = Map::new();
        changes.insert("stock".into(), json!("3"));
        let action = execute(
            &backend,
            ApiRequest::UpdateProduct {
                id: "p1".into(),
                changes,
            },
        )
        .await;
        assert_eq!(
            action,
            Action::SaveFinished {
                resource: Resource::Products,
                kind: SaveKind::Updated,
                result: Ok(Value::Null),
            }
        );
        assert_eq!(backend.calls(), vec![r#"update_product p1 {"stock":"3"}"#]);
    }

    #[tokio::test]
    async fn test_errors_travel_in_the_action() {
        let backend = StubBackend::failing(ApiError::Timeout);
        let action = execute(&backend, ApiRequest::ListUsers).await;
        assert_eq!(action, Action::UsersLoaded(Err(ApiError::Timeout)));
    }

    #[tokio::test]
    async fn test_recovery_uses_given_token() {
        let backend = StubBackend::default();
        execute(
            &backend,
            ApiRequest::SendCode {
                code: "42".into(),
                token: "r1".into(),
            },
        )
        .await;
        assert_eq!(backend.calls(), vec!["send_code 42 r1"]);
    }
}
