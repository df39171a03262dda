use std::fmt;

use serde_json::Value;

/// Everything that can go wrong talking to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server answered with a non-success status. `body` is the parsed
    /// JSON body, or the raw text as a JSON string.
    Status { status: u16, body: Option<Value> },
    /// The request was sent but no response arrived in time.
    Timeout,
    /// No response at all (DNS, refused connection, reset).
    Connection(String),
    /// The request could not be built (bad URL, bad header).
    Request(String),
    /// The response arrived but its body was not what we expected.
    Decode(String),
}

impl ApiError {
    /// The single human-readable message shown in the error overlay.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { status: 404, .. } => "Recurso não encontrado (404).".to_string(),
            ApiError::Status { status: 500, .. } => "Erro interno do servidor (500).".to_string(),
            ApiError::Status { status, body } => body
                .as_ref()
                .and_then(body_message)
                .unwrap_or_else(|| format!("Erro inesperado: {status}")),
            ApiError::Timeout => {
                "A requisição demorou muito e foi abortada (timeout).".to_string()
            }
            ApiError::Connection(_) => {
                "Falha na conexão com o servidor. Verifique sua internet.".to_string()
            }
            ApiError::Request(msg) if !msg.is_empty() => msg.clone(),
            ApiError::Request(_) => "Ocorreu um erro desconhecido.".to_string(),
            ApiError::Decode(_) => "Ocorreu um erro inesperado!".to_string(),
        }
    }
}

/// Pulls a message out of a structured error body:
/// `{"detail": "..."}`, `{"detail": [{"msg": "..."}]}` or `{"message": "..."}`.
fn body_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    if let Some(detail) = object.get("detail") {
        if let Some(text) = detail.as_str() {
            return Some(text.to_string());
        }
        if let Some(msg) = detail
            .as_array()
            .and_then(|items| items.first())
            .and_then(|first| first.get("msg"))
            .and_then(Value::as_str)
            .filter(|msg| !msg.is_empty())
        {
            return Some(msg.to_string());
        }
    }
    object
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Status { status, body } => match body {
                Some(body) => write!(f, "HTTP {status}: {body}"),
                None => write!(f, "HTTP {status}"),
            },
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::Connection(msg) => write!(f, "connection error: {msg}"),
            ApiError::Request(msg) => write!(f, "request error: {msg}"),
            ApiError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_builder() {
            ApiError::Request(e.to_string())
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: None,
            }
        } else {
            ApiError::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(code: u16, body: Option<Value>) -> ApiError {
        ApiError::Status { status: code, body }
    }

    /// Each case: name, error => expected overlay message.
    macro_rules! test_user_messages {
        ( $($name:ident: $error:expr => $expected:expr,)+ ) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!($error.user_message(), $expected);
                }
            )+
        };
    }

    test_user_messages! {
        test_not_found: status(404, None) => "Recurso não encontrado (404).",
        test_not_found_ignores_body: status(404, Some(json!({"detail": "x"}))) => "Recurso não encontrado (404).",
        test_internal_error: status(500, Some(json!({"message": "db down"}))) => "Erro interno do servidor (500).",
        test_detail_string: status(400, Some(json!({"detail": "Usuário já existe"}))) => "Usuário já existe",
        test_detail_list: status(422, Some(json!({"detail": [{"loc": ["body"], "msg": "campo obrigatório"}]}))) => "campo obrigatório",
        test_detail_list_without_msg_falls_back: status(422, Some(json!({"detail": [{}]}))) => "Erro inesperado: 422",
        test_message_field: status(401, Some(json!({"message": "Credenciais inválidas"}))) => "Credenciais inválidas",
        test_detail_wins_over_message: status(400, Some(json!({"detail": "a", "message": "b"}))) => "a",
        test_plain_text_body: status(403, Some(json!("forbidden"))) => "Erro inesperado: 403",
        test_no_body: status(418, None) => "Erro inesperado: 418",
        test_timeout: ApiError::Timeout => "A requisição demorou muito e foi abortada (timeout).",
        test_connection: ApiError::Connection("refused".into()) => "Falha na conexão com o servidor. Verifique sua internet.",
        test_request_with_message: ApiError::Request("invalid URL".into()) => "invalid URL",
        test_request_without_message: ApiError::Request(String::new()) => "Ocorreu um erro desconhecido.",
        test_decode: ApiError::Decode("expected array".into()) => "Ocorreu um erro inesperado!",
    }

    #[test]
    fn test_display_includes_status() {
        assert_eq!(status(404, None).to_string(), "HTTP 404");
        assert_eq!(ApiError::Timeout.to_string(), "request timed out");
    }
}
