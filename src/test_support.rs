//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::{
    ApiError, AuthResponse, Backend, Product, ProductInput, RecoveryResponse, User, UserInput,
};
use crate::core::session::Session;
use crate::core::state::{App, Screen};

/// An in-memory backend that records every call and answers with empty
/// defaults, or with `failure` when set.
#[derive(Default)]
pub struct StubBackend {
    calls: Mutex<Vec<String>>,
    token: Mutex<Option<String>>,
    failure: Option<ApiError>,
}

impl StubBackend {
    pub fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn record<T>(&self, call: String, ok: T) -> Result<T, ApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(ok),
        }
    }
}

fn recovery() -> RecoveryResponse {
    RecoveryResponse {
        token: Some("stub-recovery".to_string()),
    }
}

#[async_trait]
impl Backend for StubBackend {
    fn set_token(&self, token: Option<String>) {
        if let Ok(mut current) = self.token.lock() {
            *current = token;
        }
    }

    async fn login(&self, username: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        let auth = AuthResponse {
            token: "stub-token".to_string(),
            extra: Map::new(),
        };
        self.record(format!("login {username}"), auth)
    }

    async fn send_email(&self, email: &str, token: &str) -> Result<RecoveryResponse, ApiError> {
        self.record(format!("send_email {email} {token}"), recovery())
    }

    async fn send_code(&self, code: &str, token: &str) -> Result<RecoveryResponse, ApiError> {
        self.record(format!("send_code {code} {token}"), recovery())
    }

    async fn send_new_password(
        &self,
        _password: &str,
        token: &str,
    ) -> Result<RecoveryResponse, ApiError> {
        self.record(format!("send_new_password {token}"), RecoveryResponse::default())
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.record("list_users".to_string(), Vec::new())
    }

    async fn create_user(&self, user: &UserInput) -> Result<Value, ApiError> {
        self.record(format!("create_user {}", user.name), Value::Null)
    }

    async fn update_user(&self, id: &str, changes: &Map<String, Value>) -> Result<Value, ApiError> {
        self.record(
            format!("update_user {id} {}", Value::Object(changes.clone())),
            Value::Null,
        )
    }

    async fn delete_user(&self, id: &str) -> Result<Value, ApiError> {
        self.record(format!("delete_user {id}"), Value::Null)
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.record("list_products".to_string(), Vec::new())
    }

    async fn create_product(&self, product: &ProductInput) -> Result<Value, ApiError> {
        self.record(format!("create_product {}", product.name), Value::Null)
    }

    async fn update_product(
        &self,
        id: &str,
        changes: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.record(
            format!("update_product {id} {}", Value::Object(changes.clone())),
            Value::Null,
        )
    }

    async fn delete_product(&self, id: &str) -> Result<Value, ApiError> {
        self.record(format!("delete_product {id}"), Value::Null)
    }
}

pub fn remembered_session(remember: bool) -> Session {
    Session {
        token: "tok".to_string(),
        username: "ana".to_string(),
        remember,
        logged_in_at: "2024-03-05T09:07:00Z".to_string(),
        extra: Map::new(),
    }
}

/// Creates a test App on the login screen with a StubBackend.
pub fn test_app() -> App {
    App::new(Arc::new(StubBackend::default()), None)
}

/// Creates a test App already logged in and on the home page.
pub fn logged_in_app() -> App {
    let app = App::new(Arc::new(StubBackend::default()), Some(remembered_session(true)));
    debug_assert_eq!(app.screen, Screen::Home);
    app
}
