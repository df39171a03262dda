use async_trait::async_trait;
use serde_json::{Map, Value};

use super::error::ApiError;
use super::types::{AuthResponse, Product, ProductInput, RecoveryResponse, User, UserInput};

/// Everything the panel asks of the REST backend.
///
/// `HttpBackend` is the real implementation; tests substitute a stub so the
/// reducer and request runner can be exercised without a server.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Installs (or clears) the session token sent with every resource call.
    fn set_token(&self, token: Option<String>);

    async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError>;

    // Password recovery. Each step is authorized by the token the previous
    // step returned.
    async fn send_email(&self, email: &str, token: &str) -> Result<RecoveryResponse, ApiError>;
    async fn send_code(&self, code: &str, token: &str) -> Result<RecoveryResponse, ApiError>;
    async fn send_new_password(
        &self,
        password: &str,
        token: &str,
    ) -> Result<RecoveryResponse, ApiError>;

    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn create_user(&self, user: &UserInput) -> Result<Value, ApiError>;
    /// Sends only `changes`; the backend merges them into the stored user.
    async fn update_user(&self, id: &str, changes: &Map<String, Value>) -> Result<Value, ApiError>;
    async fn delete_user(&self, id: &str) -> Result<Value, ApiError>;

    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;
    async fn create_product(&self, product: &ProductInput) -> Result<Value, ApiError>;
    async fn update_product(
        &self,
        id: &str,
        changes: &Map<String, Value>,
    ) -> Result<Value, ApiError>;
    async fn delete_product(&self, id: &str) -> Result<Value, ApiError>;
}
