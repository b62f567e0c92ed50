//! Mock identity provider for isolated testing
//!
//! Succeeds with canned data by default; individual operations can be
//! scripted to fail with a specific provider error.

use crate::identity::provider::{
    DecodedToken, IdTokenResult, IdentityProvider, NewAccount, ProviderError, ProviderSession,
    ProviderUser,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

pub const MOCK_UID: &str = "mock-uid-0001";
pub const MOCK_ID_TOKEN: &str = "mock.id.token";
pub const MOCK_REFRESH_TOKEN: &str = "mock-refresh-token";

#[derive(Default)]
pub struct MockIdentityProvider {
    create_account_error: Option<ProviderError>,
    sign_in_error: Option<ProviderError>,
    token_result_error: Option<ProviderError>,
    verify_error: Option<ProviderError>,
    claims_error: Option<ProviderError>,
    recorded_claims: Mutex<Vec<(String, Value)>>,
}

impl MockIdentityProvider {
    /// A provider where every operation succeeds with canned data
    #[must_use]
    pub fn happy_path() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_create_account_error(mut self, error: ProviderError) -> Self {
        self.create_account_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_sign_in_error(mut self, error: ProviderError) -> Self {
        self.sign_in_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_token_result_error(mut self, error: ProviderError) -> Self {
        self.token_result_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_verify_error(mut self, error: ProviderError) -> Self {
        self.verify_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_claims_error(mut self, error: ProviderError) -> Self {
        self.claims_error = Some(error);
        self
    }

    /// Claim assignments the provider has received, in call order
    ///
    /// # Panics
    ///
    /// Panics if the recording mutex was poisoned by a panicking test.
    #[must_use]
    pub fn recorded_claims(&self) -> Vec<(String, Value)> {
        self.recorded_claims
            .lock()
            .expect("claims mutex poisoned")
            .clone()
    }

    fn canned_claims() -> Value {
        json!({
            "iss": "https://mock-issuer.example",
            "sub": MOCK_UID,
            "user_id": MOCK_UID,
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
            "email": "ann@example.com",
            "email_verified": true,
        })
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn create_account(&self, account: &NewAccount) -> Result<ProviderUser, ProviderError> {
        if let Some(error) = &self.create_account_error {
            return Err(error.clone());
        }
        Ok(ProviderUser {
            uid: MOCK_UID.to_string(),
            email: account.email.clone(),
            email_verified: account.email_verified,
            display_name: account.display_name.clone(),
            disabled: account.disabled,
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        if let Some(error) = &self.sign_in_error {
            return Err(error.clone());
        }
        Ok(ProviderSession {
            uid: MOCK_UID.to_string(),
            id_token: MOCK_ID_TOKEN.to_string(),
            refresh_token: MOCK_REFRESH_TOKEN.to_string(),
            email: Some(email.to_string()),
            email_verified: true,
            display_name: Some("Ann".to_string()),
            photo_url: Some("https://cdn.example/ann.png".to_string()),
        })
    }

    async fn id_token_result(
        &self,
        session: &ProviderSession,
        _force_refresh: bool,
    ) -> Result<IdTokenResult, ProviderError> {
        if let Some(error) = &self.token_result_error {
            return Err(error.clone());
        }
        Ok(IdTokenResult {
            token: session.id_token.clone(),
            claims: Self::canned_claims(),
        })
    }

    async fn verify_id_token(
        &self,
        _id_token: &str,
        _check_revoked: bool,
    ) -> Result<DecodedToken, ProviderError> {
        if let Some(error) = &self.verify_error {
            return Err(error.clone());
        }
        Ok(DecodedToken {
            uid: MOCK_UID.to_string(),
            claims: Self::canned_claims(),
        })
    }

    async fn set_custom_claims(&self, uid: &str, claims: Value) -> Result<(), ProviderError> {
        self.recorded_claims
            .lock()
            .expect("claims mutex poisoned")
            .push((uid.to_string(), claims));
        if let Some(error) = &self.claims_error {
            return Err(error.clone());
        }
        Ok(())
    }
}
