//! Service-account credentials for the provider's admin surface
//!
//! Admin endpoints are not authorized by the web API key; they require an
//! OAuth2 bearer token minted from the configured service account. A
//! short-lived RS256 assertion is exchanged at the token endpoint, and the
//! resulting access token is cached until shortly before it expires.

use crate::identity::provider::{codes, ProviderError};
use crate::settings::ProviderSettings;
use crate::utils::crypto::{create_jwt, create_jwt_header, JwtAlgorithm};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Mutex;

const OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const IDENTITY_SCOPE: &str = "https://www.googleapis.com/auth/identitytoolkit";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// The service-account identity the provider authenticates admin calls with
#[derive(Clone)]
pub struct ServiceAccount {
    client_email: String,
    private_key: String,
}

impl ServiceAccount {
    #[must_use]
    pub fn new(settings: &ProviderSettings) -> Self {
        Self {
            client_email: settings.client_email.clone(),
            private_key: settings.private_key.clone(),
        }
    }

    /// Sign a short-lived assertion to exchange for an admin access token
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the private key cannot be parsed or
    /// signing fails.
    pub fn signed_assertion(&self, issued_at: DateTime<Utc>) -> Result<String, ProviderError> {
        let header = create_jwt_header(&JwtAlgorithm::RS256);
        let iat = issued_at.timestamp();
        let payload = json!({
            "iss": self.client_email,
            "scope": IDENTITY_SCOPE,
            "aud": OAUTH_TOKEN_URL,
            "iat": iat,
            "exp": iat + ASSERTION_LIFETIME_SECS,
        });

        create_jwt(
            &header,
            &payload,
            JwtAlgorithm::RS256,
            self.private_key.as_bytes(),
        )
        .map_err(|e| ProviderError::new(codes::INTERNAL_ERROR, e.to_string()))
    }
}

struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Access-token cache over a [`ServiceAccount`].
/// Safe for concurrent use; a poisoned cache just forces a re-mint.
pub struct AdminTokenCache {
    account: ServiceAccount,
    cached: Mutex<Option<CachedToken>>,
}

impl AdminTokenCache {
    #[must_use]
    pub fn new(account: ServiceAccount) -> Self {
        Self {
            account,
            cached: Mutex::new(None),
        }
    }

    /// Bearer token for admin calls, minting a fresh one when the cached
    /// token is absent or within a minute of expiry
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when signing fails, the exchange cannot
    /// be reached, or the token endpoint rejects the assertion.
    pub async fn bearer(&self, http: &reqwest::Client) -> Result<String, ProviderError> {
        let now = Utc::now();
        if let Some(token) = self.cached(now.timestamp()) {
            return Ok(token);
        }

        let assertion = self.account.signed_assertion(now)?;
        let response = http
            .post(OAUTH_TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::new(codes::NETWORK_REQUEST_FAILED, e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::new(codes::NETWORK_REQUEST_FAILED, e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::new(
                codes::INTERNAL_ERROR,
                format!("admin token exchange failed: {payload}"),
            ));
        }

        let token = payload
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::new(
                    codes::INTERNAL_ERROR,
                    "token endpoint response is missing `access_token`",
                )
            })?
            .to_string();
        let expires_in = payload
            .get("expires_in")
            .and_then(Value::as_i64)
            .unwrap_or(ASSERTION_LIFETIME_SECS);

        self.store(token.clone(), expires_in, now.timestamp());
        Ok(token)
    }

    fn cached(&self, now: i64) -> Option<String> {
        self.cached
            .lock()
            .ok()?
            .as_ref()
            .filter(|entry| now < entry.expires_at - EXPIRY_LEEWAY_SECS)
            .map(|entry| entry.token.clone())
    }

    fn store(&self, token: String, expires_in: i64, now: i64) {
        if let Ok(mut guard) = self.cached.lock() {
            *guard = Some(CachedToken {
                token,
                expires_at: now + expires_in,
            });
        }
    }
}
