//! reqwest implementation of [`Backend`].
//!
//! Resource and login calls go to `base_url`; the password-recovery calls go
//! to `auth_base_url`, which defaults to the same host.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::backend::Backend;
use super::error::ApiError;
use super::types::{
    AuthResponse, LoginRequest, Product, ProductInput, RecoveryResponse, User, UserInput,
};

/// Header carrying the session (or recovery) token. The backend reads the
/// raw token, without a `Bearer` prefix.
pub const AUTH_HEADER: &str = "Authentication";

pub struct HttpBackend {
    base_url: String,
    auth_base_url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    /// Creates a client for `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Root of the REST API (`/auth/login`, `/user`, `/product`)
    /// * `auth_base_url` - Optional root for the recovery endpoints (defaults to `base_url`)
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: &str,
        auth_base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let auth_base_url = auth_base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| base_url.clone());
        Ok(Self {
            base_url,
            auth_base_url,
            client,
            token: RwLock::new(None),
        })
    }

    fn session_token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Sends a JSON request and decodes the JSON response.
    ///
    /// Non-success statuses become `ApiError::Status` carrying the body
    /// (parsed as JSON when possible, otherwise as a JSON string). An empty
    /// success body decodes as `null`.
    async fn send<B, T>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        info!("{} {}", method, url);
        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.header(AUTH_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("{} answered {} ({} bytes)", url, status, text.len());

        if !status.is_success() {
            warn!("Backend error: {} - {}", status, text);
            let body = if text.trim().is_empty() {
                None
            } else {
                Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
            };
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };
        serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn resource<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.session_token();
        self.send(method, format!("{}{}", self.base_url, path), body, token.as_deref())
            .await
    }

    async fn recovery(&self, path: &str, body: Value, token: &str) -> Result<RecoveryResponse, ApiError> {
        let url = format!("{}{}", self.auth_base_url, path);
        let response: Option<RecoveryResponse> =
            self.send(Method::POST, url, Some(&body), Some(token)).await?;
        Ok(response.unwrap_or_default())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest { username, password };
        let url = format!("{}/auth/login", self.base_url);
        self.send(Method::POST, url, Some(&body), None).await
    }

    async fn send_email(&self, email: &str, token: &str) -> Result<RecoveryResponse, ApiError> {
        self.recovery("/forgot-my-password", json!({ "email": email }), token)
            .await
    }

    async fn send_code(&self, code: &str, token: &str) -> Result<RecoveryResponse, ApiError> {
        self.recovery("/forgot-my-password/code", json!({ "code": code }), token)
            .await
    }

    async fn send_new_password(
        &self,
        password: &str,
        token: &str,
    ) -> Result<RecoveryResponse, ApiError> {
        self.recovery("/new-password", json!({ "password": password }), token)
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let users: Option<Vec<User>> = self.resource::<(), _>(Method::GET, "/user", None).await?;
        Ok(users.unwrap_or_default())
    }

    async fn create_user(&self, user: &UserInput) -> Result<Value, ApiError> {
        self.resource(Method::POST, "/user", Some(user)).await
    }

    async fn update_user(&self, id: &str, changes: &Map<String, Value>) -> Result<Value, ApiError> {
        self.resource(Method::PUT, &format!("/user/{id}"), Some(changes))
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<Value, ApiError> {
        self.resource::<(), _>(Method::DELETE, &format!("/user/{id}"), None)
            .await
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let products: Option<Vec<Product>> =
            self.resource::<(), _>(Method::GET, "/product", None).await?;
        Ok(products.unwrap_or_default())
    }

    async fn create_product(&self, product: &ProductInput) -> Result<Value, ApiError> {
        self.resource(Method::POST, "/product", Some(product)).await
    }

    async fn update_product(
        &self,
        id: &str,
        changes: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.resource(Method::PATCH, &format!("/product/{id}"), Some(changes))
            .await
    }

    async fn delete_product(&self, id: &str) -> Result<Value, ApiError> {
        self.resource::<(), _>(Method::DELETE, &format!("/product/{id}"), None)
            .await
    }
}
