use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of the hello route
#[derive(Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

/// Incoming payload for account creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// Locale annotation attached to the created record; defaults to "en"
    #[serde(default)]
    pub account_locale: Option<String>,
}

impl RegistrationRequest {
    /// Locale to attach to the created account, falling back to "en"
    #[must_use]
    pub fn locale_or_default(&self) -> String {
        self.account_locale
            .clone()
            .unwrap_or_else(|| "en".to_string())
    }
}

/// The provider's representation of a created account, augmented locally
/// with `account_locale`. The annotation is call-scoped; nothing persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    pub display_name: String,
    pub disabled: bool,
    pub account_locale: String,
}

/// Incoming payload for credential sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Flattened projection of a successful sign-in, returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentials {
    pub id_token: String,
    pub refresh_token: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub uid: String,
}

/// Incoming payload for session validation.
/// The refresh token is accepted but plays no part in validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidationRequest {
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Successful outcome of session validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidationResult {
    pub is_valid: bool,
    pub uid: String,
    pub full_decoded_token: serde_json::Value,
}

/// Uniform error value returned by gateway operations in place of a raised
/// fault. `error` is either a fixed message or the raw provider error;
/// `error_raw` carries the raw error when the fixed message alone would leave
/// operators blind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: serde_json::Value,
    #[serde(rename = "errorRaw", skip_serializing_if = "Option::is_none")]
    pub error_raw: Option<serde_json::Value>,
}

impl ErrorResult {
    /// Error body with a fixed message and no raw detail
    #[must_use]
    pub fn message(message: &str) -> Self {
        Self {
            error: serde_json::Value::String(message.to_string()),
            error_raw: None,
        }
    }

    /// Error body carrying the raw provider error as the error itself
    #[must_use]
    pub fn raw(raw: serde_json::Value) -> Self {
        Self {
            error: raw,
            error_raw: None,
        }
    }

    /// Fixed message plus the raw provider error for diagnostics
    #[must_use]
    pub fn message_with_raw(message: &str, raw: serde_json::Value) -> Self {
        Self {
            error: serde_json::Value::String(message.to_string()),
            error_raw: Some(raw),
        }
    }
}

/// Unrelated blog content entity served by the `/blog` routes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub body: String,
    pub posted_at: DateTime<Utc>,
}
