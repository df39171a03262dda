use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::table::{CellValue, Row};

// ============================================================================
// Auth
// ============================================================================

#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of a successful `/auth/login`. Anything besides the token is kept
/// as-is so it can be persisted with the session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Each password-recovery step answers with the token for the next step.
/// A missing token means the step was rejected.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct RecoveryResponse {
    #[serde(default)]
    pub token: Option<String>,
}

// ============================================================================
// Resources
// ============================================================================

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct User {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
}

impl From<&User> for UserInput {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            status: user.status.clone(),
        }
    }
}

impl Row for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::from(self.id.as_str()),
            "name" => CellValue::from(self.name.as_str()),
            "email" => CellValue::from(self.email.as_str()),
            "role" => CellValue::from(self.role.as_str()),
            "status" => CellValue::from(self.status.as_str()),
            _ => CellValue::Empty,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Product {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub category: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub stock: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct ProductInput {
    pub name: String,
    pub category: i64,
    pub price: String,
    pub stock: String,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category,
            price: product.price.clone(),
            stock: product.stock.clone(),
        }
    }
}

impl Row for Product {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> CellValue {
        match name {
            "id" => CellValue::from(self.id.as_str()),
            "name" => CellValue::from(self.name.as_str()),
            "category" => CellValue::from(self.category),
            "price" => CellValue::from(self.price.as_str()),
            "stock" => CellValue::from(self.stock.as_str()),
            _ => CellValue::Empty,
        }
    }
}

/// Fields of `after` whose value differs from the same field in `before`.
/// Used to send only what an edit form actually changed.
pub fn changed_fields<B: Serialize, A: Serialize>(before: &B, after: &A) -> Map<String, Value> {
    let before = serde_json::to_value(before).unwrap_or(Value::Null);
    let Ok(Value::Object(after)) = serde_json::to_value(after) else {
        return Map::new();
    };
    after
        .into_iter()
        .filter(|(key, value)| before.get(key) != Some(value))
        .collect()
}

// ============================================================================
// Lenient field decoding
// ============================================================================

/// Backends disagree on whether ids, prices and stock are strings or numbers.
/// Accept either; `null` becomes an empty string.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| serde::de::Error::custom(format!("not an integer: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("not an integer: {s:?}"))),
        Value::Null => Ok(0),
        other => Err(serde::de::Error::custom(format!(
            "expected integer, got {other}"
        ))),
    }
}
