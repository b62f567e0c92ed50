//! Provider boundary for the Identity Gateway
//!
//! Everything the gateway needs from the external identity service is
//! expressed here as an object-safe trait, so the real client and the test
//! double are interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error codes the provider tags its rejections with.
///
/// The set mirrors the provider's own enumeration; the gateway only branches
/// on a handful of them and treats the rest as unclassified.
pub mod codes {
    pub const INVALID_EMAIL: &str = "auth/invalid-email";
    pub const WRONG_PASSWORD: &str = "auth/wrong-password";
    pub const USER_NOT_FOUND: &str = "auth/user-not-found";
    pub const USER_DISABLED: &str = "auth/user-disabled";
    pub const EMAIL_ALREADY_EXISTS: &str = "auth/email-already-exists";
    pub const WEAK_PASSWORD: &str = "auth/weak-password";
    pub const ID_TOKEN_EXPIRED: &str = "auth/id-token-expired";
    pub const ID_TOKEN_REVOKED: &str = "auth/id-token-revoked";
    pub const INVALID_ID_TOKEN: &str = "auth/invalid-id-token";
    pub const TOO_MANY_REQUESTS: &str = "auth/too-many-requests";
    pub const OPERATION_NOT_ALLOWED: &str = "auth/operation-not-allowed";
    pub const NETWORK_REQUEST_FAILED: &str = "auth/network-request-failed";
    pub const INTERNAL_ERROR: &str = "auth/internal-error";
}

/// A rejection from the external identity provider
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ProviderError {
    pub code: String,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// The raw error as a JSON value, for error bodies and logs
    #[must_use]
    pub fn as_json(&self) -> Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
        })
    }
}

/// Account-creation parameters passed to the provider
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub email_verified: bool,
    pub disabled: bool,
}

/// The provider's view of an account it created
#[derive(Debug, Clone)]
pub struct ProviderUser {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    pub display_name: String,
    pub disabled: bool,
}

/// A signed-in session as returned by the provider's credential sign-in
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub uid: String,
    pub id_token: String,
    pub refresh_token: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// An ID token plus its decoded claims
#[derive(Debug, Clone)]
pub struct IdTokenResult {
    pub token: String,
    pub claims: Value,
}

/// A verified, decoded ID token
#[derive(Debug, Clone)]
pub struct DecodedToken {
    pub uid: String,
    pub claims: Value,
}

/// The identity provider capabilities the gateway consumes
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account with the given parameters
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the provider refuses the account,
    /// e.g. a duplicate email or a malformed address.
    async fn create_account(&self, account: &NewAccount) -> Result<ProviderUser, ProviderError>;

    /// Sign in with an email/password pair
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] tagged `auth/invalid-email`,
    /// `auth/wrong-password` or another provider code.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError>;

    /// Fetch an ID-token result for a signed-in session. With
    /// `force_refresh` false the session's current token is reused.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] if the token cannot be produced or
    /// decoded.
    async fn id_token_result(
        &self,
        session: &ProviderSession,
        force_refresh: bool,
    ) -> Result<IdTokenResult, ProviderError>;

    /// Verify an ID token. With `check_revoked` true, a structurally valid
    /// token is still rejected when the provider has revoked it.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] tagged `auth/id-token-revoked` for
    /// revoked tokens, or another code for invalid ones.
    async fn verify_id_token(
        &self,
        id_token: &str,
        check_revoked: bool,
    ) -> Result<DecodedToken, ProviderError>;

    /// Attach custom authorization claims to an account
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderError`] when the provider rejects the update.
    async fn set_custom_claims(&self, uid: &str, claims: Value) -> Result<(), ProviderError>;
}
