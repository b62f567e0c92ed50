//! Firebase identity provider client
//!
//! Speaks the Identity Toolkit REST API. End-user endpoints are keyed by the
//! web API key; project-scoped admin endpoints (account creation, custom
//! claims) carry a service-account bearer token instead. The Admin SDK's
//! `checkRevoked` behavior is reproduced by comparing the token's issue time
//! against the account's `validSince` timestamp from an account lookup.

use crate::identity::credentials::{AdminTokenCache, ServiceAccount};
use crate::identity::provider::{
    codes, DecodedToken, IdTokenResult, IdentityProvider, NewAccount, ProviderError,
    ProviderSession, ProviderUser,
};
use crate::settings::ProviderSettings;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{json, Value};
use url::Url;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Identity Toolkit client holding the long-lived HTTP handle.
/// Safe for concurrent use; `reqwest::Client` is internally reference-counted.
pub struct FirebaseProvider {
    http: reqwest::Client,
    project_id: String,
    api_key: String,
    admin_tokens: AdminTokenCache,
}

impl FirebaseProvider {
    #[must_use]
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_id: settings.project_id.clone(),
            api_key: settings.web_api_key.clone(),
            admin_tokens: AdminTokenCache::new(ServiceAccount::new(settings)),
        }
    }

    /// POST a JSON body to an Identity Toolkit endpoint and translate a
    /// non-success payload into a [`ProviderError`]
    async fn post(&self, url: &str, body: &Value) -> Result<Value, ProviderError> {
        let url = Url::parse_with_params(url, &[("key", self.api_key.as_str())])
            .map_err(|e| ProviderError::new(codes::INTERNAL_ERROR, e.to_string()))?;

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(transport_error)?;

        if status.is_success() {
            Ok(payload)
        } else {
            Err(wire_error(&payload))
        }
    }

    async fn post_identity(&self, endpoint: &str, body: &Value) -> Result<Value, ProviderError> {
        self.post(&format!("{IDENTITY_TOOLKIT_URL}/{endpoint}"), body)
            .await
    }

    /// POST a form-encoded body; the token endpoints do not accept JSON
    async fn post_form(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        let url = Url::parse_with_params(url, &[("key", self.api_key.as_str())])
            .map_err(|e| ProviderError::new(codes::INTERNAL_ERROR, e.to_string()))?;

        let response = self
            .http
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(transport_error)?;

        if status.is_success() {
            Ok(payload)
        } else {
            Err(wire_error(&payload))
        }
    }

    /// POST to a project-scoped admin endpoint, authorized by the
    /// service-account bearer token instead of the API key
    async fn post_admin(&self, endpoint: &str, body: &Value) -> Result<Value, ProviderError> {
        let token = self.admin_tokens.bearer(&self.http).await?;

        let response = self
            .http
            .post(format!(
                "{IDENTITY_TOOLKIT_URL}/projects/{}/{endpoint}",
                self.project_id
            ))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(transport_error)?;

        if status.is_success() {
            Ok(payload)
        } else {
            Err(wire_error(&payload))
        }
    }

    /// Look up the account behind an ID token
    async fn lookup_account(&self, id_token: &str) -> Result<Value, ProviderError> {
        let payload = self
            .post_identity("accounts:lookup", &json!({ "idToken": id_token }))
            .await?;

        payload
            .get("users")
            .and_then(Value::as_array)
            .and_then(|users| users.first())
            .cloned()
            .ok_or_else(|| {
                ProviderError::new(codes::INVALID_ID_TOKEN, "no account matches this token")
            })
    }
}

#[async_trait]
impl IdentityProvider for FirebaseProvider {
    async fn create_account(&self, account: &NewAccount) -> Result<ProviderUser, ProviderError> {
        // One admin call carrying the whole profile, so a rejection never
        // leaves a half-written account behind
        let payload = self
            .post_admin("accounts", &admin_create_payload(account))
            .await?;

        let uid = string_field(&payload, "localId")?;

        Ok(ProviderUser {
            uid,
            email: account.email.clone(),
            email_verified: account.email_verified,
            display_name: account.display_name.clone(),
            disabled: account.disabled,
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        let payload = self
            .post_identity(
                "accounts:signInWithPassword",
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let uid = string_field(&payload, "localId")?;
        let id_token = string_field(&payload, "idToken")?;
        let refresh_token = string_field(&payload, "refreshToken")?;

        // Profile fields beyond the sign-in response come from a lookup
        let account = self.lookup_account(&id_token).await?;

        Ok(ProviderSession {
            uid,
            id_token,
            refresh_token,
            email: optional_string(&account, "email"),
            email_verified: account
                .get("emailVerified")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            display_name: optional_string(&account, "displayName"),
            photo_url: optional_string(&account, "photoUrl"),
        })
    }

    async fn id_token_result(
        &self,
        session: &ProviderSession,
        force_refresh: bool,
    ) -> Result<IdTokenResult, ProviderError> {
        let token = if force_refresh {
            let payload = self
                .post_form(SECURE_TOKEN_URL, &refresh_token_params(&session.refresh_token))
                .await?;
            string_field(&payload, "id_token")?
        } else {
            session.id_token.clone()
        };

        let claims = decode_token_payload(&token)?;
        Ok(IdTokenResult { token, claims })
    }

    async fn verify_id_token(
        &self,
        id_token: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, ProviderError> {
        let claims = decode_token_payload(id_token)?;

        // The lookup both authenticates the token against the project and
        // supplies the revocation watermark.
        let account = self.lookup_account(id_token).await?;

        if account
            .get("disabled")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Err(ProviderError::new(
                codes::USER_DISABLED,
                "the account behind this token is disabled",
            ));
        }

        if check_revoked {
            let issued_at = claims.get("iat").and_then(Value::as_i64).unwrap_or(0);
            let valid_since = account
                .get("validSince")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(0);
            if is_revoked(issued_at, valid_since) {
                return Err(ProviderError::new(
                    codes::ID_TOKEN_REVOKED,
                    "the token predates a credential reset",
                ));
            }
        }

        let uid = string_field(&account, "localId")?;
        Ok(DecodedToken { uid, claims })
    }

    async fn set_custom_claims(&self, uid: &str, claims: Value) -> Result<(), ProviderError> {
        let attributes = serde_json::to_string(&claims)
            .map_err(|e| ProviderError::new(codes::INTERNAL_ERROR, e.to_string()))?;

        self.post_admin(
            "accounts:update",
            &json!({
                "localId": uid,
                "customAttributes": attributes,
            }),
        )
        .await?;

        Ok(())
    }
}

/// Admin account-creation body; carries the whole profile so creation is a
/// single call
fn admin_create_payload(account: &NewAccount) -> Value {
    json!({
        "email": account.email,
        "password": account.password,
        "displayName": account.display_name,
        "emailVerified": account.email_verified,
        "disabled": account.disabled,
    })
}

/// Form parameters for exchanging a refresh token at the secure-token
/// endpoint
fn refresh_token_params(refresh_token: &str) -> [(&'static str, &str); 2] {
    [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ]
}

/// A token issued before the account's `validSince` watermark is revoked
#[must_use]
pub fn is_revoked(issued_at: i64, valid_since: i64) -> bool {
    issued_at < valid_since
}

/// Decode the claims segment of an ID token without verifying the signature.
/// Signature verification is the lookup call's job.
pub(crate) fn decode_token_payload(id_token: &str) -> Result<Value, ProviderError> {
    let segment = id_token.split('.').nth(1).ok_or_else(|| {
        ProviderError::new(codes::INVALID_ID_TOKEN, "token is not a three-part JWT")
    })?;

    let bytes = URL_SAFE_NO_PAD.decode(segment).map_err(|e| {
        ProviderError::new(codes::INVALID_ID_TOKEN, format!("bad payload encoding: {e}"))
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        ProviderError::new(codes::INVALID_ID_TOKEN, format!("bad payload JSON: {e}"))
    })
}

/// Translate an Identity Toolkit wire error into a tagged [`ProviderError`]
fn wire_error(payload: &Value) -> ProviderError {
    let message = payload
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN_ERROR")
        .to_string();
    ProviderError {
        code: translate_wire_message(&message).to_string(),
        message,
    }
}

fn transport_error(error: reqwest::Error) -> ProviderError {
    ProviderError::new(codes::NETWORK_REQUEST_FAILED, error.to_string())
}

/// Map the REST API's SCREAMING_CASE messages onto the `auth/*` code space.
/// Some messages carry a trailing explanation (`WEAK_PASSWORD : ...`), so
/// matching is on the leading word.
fn translate_wire_message(message: &str) -> &'static str {
    let head = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default();
    match head {
        "EMAIL_EXISTS" => codes::EMAIL_ALREADY_EXISTS,
        "INVALID_EMAIL" | "MISSING_EMAIL" => codes::INVALID_EMAIL,
        "INVALID_PASSWORD" | "MISSING_PASSWORD" => codes::WRONG_PASSWORD,
        "EMAIL_NOT_FOUND" => codes::USER_NOT_FOUND,
        "USER_DISABLED" => codes::USER_DISABLED,
        "WEAK_PASSWORD" => codes::WEAK_PASSWORD,
        "TOKEN_EXPIRED" => codes::ID_TOKEN_EXPIRED,
        "INVALID_ID_TOKEN" | "USER_NOT_FOUND" => codes::INVALID_ID_TOKEN,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => codes::TOO_MANY_REQUESTS,
        "OPERATION_NOT_ALLOWED" => codes::OPERATION_NOT_ALLOWED,
        _ => codes::INTERNAL_ERROR,
    }
}

fn string_field(payload: &Value, field: &str) -> Result<String, ProviderError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| {
            ProviderError::new(
                codes::INTERNAL_ERROR,
                format!("provider response is missing `{field}`"),
            )
        })
}

fn optional_string(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
