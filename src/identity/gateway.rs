//! The Identity Gateway: three stateless operations over an injected provider
//!
//! Each operation is a single provider round-trip reshaped into the caller
//! contract. Provider faults never escape; they are folded into an
//! [`ErrorResult`] value tagged with a status-mapping kind so the HTTP layer
//! can stay out of the error-classification business.

use crate::identity::provider::{codes, IdentityProvider, NewAccount};
use crate::models::{
    ErrorResult, RegistrationRequest, SessionCredentials, SessionValidationRequest,
    SessionValidationResult, SignInRequest, UserRecord,
};
use log::{error, info, warn};
use serde_json::json;
use std::sync::Arc;

const INCORRECT_SIGN_IN: &str = "Incorrect sign-in information provided.";
const UNCAUGHT_SIGN_IN: &str = "Sign In Failed For Some Uncaught Reason";

/// Classification of a failed operation, used by the HTTP layer to pick a
/// status code. The body is what the caller sees; the kind never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Ambiguous credential failure; deliberately not telling the caller
    /// which half of the pair was wrong
    InvalidCredentials,
    /// The email is already registered
    DuplicateAccount,
    /// Structurally invalid or expired session token
    InvalidToken,
    /// Token explicitly revoked by the provider
    RevokedToken,
    /// Any provider rejection not classified above
    Provider,
}

/// A failed gateway operation: the error value for the caller plus the
/// status-mapping kind for the HTTP layer
#[derive(Debug, Clone)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub body: ErrorResult,
}

/// Stateless wrapper around the external identity provider.
///
/// Holds only the long-lived provider handle; nothing is shared across
/// requests beyond it.
pub struct IdentityGateway {
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityGateway {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Create an account and annotate the returned record with the caller's
    /// locale. Also queues a fire-and-forget claim assignment marking the
    /// account as a regular user; its failure is logged, never surfaced, so
    /// authorization is eventually consistent with registration.
    ///
    /// # Errors
    ///
    /// Returns the raw provider error as the error body; duplicate emails
    /// are tagged [`GatewayErrorKind::DuplicateAccount`].
    pub async fn register_account(
        &self,
        details: &RegistrationRequest,
    ) -> Result<UserRecord, GatewayError> {
        let account = NewAccount {
            email: details.email.clone(),
            password: details.password.clone(),
            display_name: details.display_name.clone(),
            email_verified: false,
            disabled: false,
        };

        let user = match self.provider.create_account(&account).await {
            Ok(user) => user,
            Err(provider_error) => {
                error!("Account creation failed: {provider_error}");
                let kind = if provider_error.code == codes::EMAIL_ALREADY_EXISTS {
                    GatewayErrorKind::DuplicateAccount
                } else {
                    GatewayErrorKind::Provider
                };
                return Err(GatewayError {
                    kind,
                    body: ErrorResult::raw(provider_error.as_json()),
                });
            }
        };

        let record = UserRecord {
            uid: user.uid,
            email: user.email,
            email_verified: user.email_verified,
            display_name: user.display_name,
            disabled: user.disabled,
            account_locale: details.locale_or_default(),
        };

        self.assign_regular_user_claim(record.uid.clone(), record.email.clone());

        Ok(record)
    }

    /// Fire-and-forget custom-claim assignment for a freshly created account
    fn assign_regular_user_claim(&self, uid: String, email: String) {
        let provider = Arc::clone(&self.provider);
        tokio::spawn(async move {
            match provider
                .set_custom_claims(&uid, json!({ "regularUser": true }))
                .await
            {
                Ok(()) => info!(
                    "Set a regularUser claim on the new account {email}; \
                     it takes effect on their next sign-in"
                ),
                Err(provider_error) => error!(
                    "Failed to set the regularUser claim on {email}: {provider_error}"
                ),
            }
        });
    }

    /// Sign in with credentials and return the flattened session projection.
    ///
    /// # Errors
    ///
    /// Wrong-password and invalid-email rejections collapse into one generic
    /// message so callers cannot probe which half was wrong; every other
    /// rejection returns a generic message plus the raw error.
    pub async fn authenticate(
        &self,
        details: &SignInRequest,
    ) -> Result<SessionCredentials, GatewayError> {
        let session = self
            .provider
            .sign_in_with_password(&details.email, &details.password)
            .await
            .map_err(|e| sign_in_error(&details.email, &e))?;

        // Fresh ID-token result for the new session, without forcing a refresh
        let token_result = self
            .provider
            .id_token_result(&session, false)
            .await
            .map_err(|e| sign_in_error(&details.email, &e))?;

        Ok(SessionCredentials {
            id_token: token_result.token,
            refresh_token: session.refresh_token,
            email: session.email,
            email_verified: session.email_verified,
            display_name: session.display_name,
            photo_url: session.photo_url,
            uid: session.uid,
        })
    }

    /// Verify a session token, rejecting revoked tokens even when they are
    /// structurally valid. Revoked and otherwise-invalid tokens produce the
    /// same error body; the distinction lives in the logs only.
    ///
    /// # Errors
    ///
    /// Returns the raw provider error as the error body.
    pub async fn validate_session(
        &self,
        details: &SessionValidationRequest,
    ) -> Result<SessionValidationResult, GatewayError> {
        match self.provider.verify_id_token(&details.id_token, true).await {
            Ok(decoded) => Ok(SessionValidationResult {
                is_valid: true,
                uid: decoded.uid,
                full_decoded_token: decoded.claims,
            }),
            Err(provider_error) => {
                let kind = if provider_error.code == codes::ID_TOKEN_REVOKED {
                    info!(
                        "Session token was revoked; the user must sign in again. \
                         Full error: {provider_error}"
                    );
                    GatewayErrorKind::RevokedToken
                } else {
                    info!("Session token is invalid. Full error: {provider_error}");
                    GatewayErrorKind::InvalidToken
                };
                Err(GatewayError {
                    kind,
                    body: ErrorResult::raw(provider_error.as_json()),
                })
            }
        }
    }
}

/// Fold a sign-in rejection into the caller-facing error contract
fn sign_in_error(email: &str, provider_error: &crate::identity::ProviderError) -> GatewayError {
    match provider_error.code.as_str() {
        codes::INVALID_EMAIL | codes::WRONG_PASSWORD => {
            warn!("Rejected sign-in for {email}: {}", provider_error.code);
            GatewayError {
                kind: GatewayErrorKind::InvalidCredentials,
                body: ErrorResult::message(INCORRECT_SIGN_IN),
            }
        }
        _ => {
            error!("User {email} failed sign in: {provider_error}");
            GatewayError {
                kind: GatewayErrorKind::Provider,
                body: ErrorResult::message_with_raw(UNCAUGHT_SIGN_IN, provider_error.as_json()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::provider::ProviderError;
    use crate::testing::MockIdentityProvider;
    use serde_json::Value;

    fn registration(locale: Option<&str>) -> RegistrationRequest {
        RegistrationRequest {
            email: "ann@example.com".to_string(),
            password: "hunter22".to_string(),
            display_name: "Ann".to_string(),
            account_locale: locale.map(ToString::to_string),
        }
    }

    fn sign_in() -> SignInRequest {
        SignInRequest {
            email: "ann@example.com".to_string(),
            password: "hunter22".to_string(),
        }
    }

    async fn settle_spawned_tasks() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_register_defaults_locale_to_en() {
        let gateway = IdentityGateway::new(Arc::new(MockIdentityProvider::happy_path()));

        let record = gateway.register_account(&registration(None)).await.unwrap();
        assert_eq!(record.account_locale, "en");
        assert!(!record.email_verified);
        assert!(!record.disabled);
    }

    #[tokio::test]
    async fn test_register_keeps_caller_locale() {
        let gateway = IdentityGateway::new(Arc::new(MockIdentityProvider::happy_path()));

        let record = gateway
            .register_account(&registration(Some("fr")))
            .await
            .unwrap();
        assert_eq!(record.account_locale, "fr");
    }

    #[tokio::test]
    async fn test_register_queues_regular_user_claim() {
        let mock = Arc::new(MockIdentityProvider::happy_path());
        let gateway = IdentityGateway::new(Arc::clone(&mock) as Arc<dyn IdentityProvider>);

        let record = gateway.register_account(&registration(None)).await.unwrap();
        settle_spawned_tasks().await;

        let recorded = mock.recorded_claims();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, record.uid);
        assert_eq!(
            recorded[0].1.get("regularUser").and_then(Value::as_bool),
            Some(true)
        );
    }

    #[tokio::test]
    async fn test_register_claim_failure_is_invisible_to_caller() {
        let mock = MockIdentityProvider::happy_path().with_claims_error(ProviderError::new(
            codes::INTERNAL_ERROR,
            "claims endpoint unavailable",
        ));
        let gateway = IdentityGateway::new(Arc::new(mock));

        let result = gateway.register_account(&registration(None)).await;
        settle_spawned_tasks().await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_an_error_value() {
        let mock = MockIdentityProvider::happy_path().with_create_account_error(
            ProviderError::new(codes::EMAIL_ALREADY_EXISTS, "EMAIL_EXISTS"),
        );
        let gateway = IdentityGateway::new(Arc::new(mock));

        let error = gateway
            .register_account(&registration(None))
            .await
            .unwrap_err();
        assert_eq!(error.kind, GatewayErrorKind::DuplicateAccount);
        assert_eq!(
            error.body.error.get("code").and_then(Value::as_str),
            Some(codes::EMAIL_ALREADY_EXISTS)
        );
    }

    #[tokio::test]
    async fn test_authenticate_returns_all_session_fields() {
        let gateway = IdentityGateway::new(Arc::new(MockIdentityProvider::happy_path()));

        let credentials = gateway.authenticate(&sign_in()).await.unwrap();
        assert!(!credentials.id_token.is_empty());
        assert!(!credentials.refresh_token.is_empty());
        assert!(credentials.email.is_some());
        assert!(credentials.email_verified);
        assert!(credentials.display_name.is_some());
        assert!(credentials.photo_url.is_some());
        assert!(!credentials.uid.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_and_invalid_email_are_indistinguishable() {
        for code in [codes::WRONG_PASSWORD, codes::INVALID_EMAIL] {
            let mock = MockIdentityProvider::happy_path()
                .with_sign_in_error(ProviderError::new(code, "rejected"));
            let gateway = IdentityGateway::new(Arc::new(mock));

            let error = gateway.authenticate(&sign_in()).await.unwrap_err();
            assert_eq!(error.kind, GatewayErrorKind::InvalidCredentials);
            assert_eq!(
                error.body.error.as_str(),
                Some("Incorrect sign-in information provided.")
            );
            assert!(error.body.error_raw.is_none());
        }
    }

    #[tokio::test]
    async fn test_unclassified_sign_in_failure_carries_raw_error() {
        let mock = MockIdentityProvider::happy_path().with_sign_in_error(ProviderError::new(
            codes::TOO_MANY_REQUESTS,
            "TOO_MANY_ATTEMPTS_TRY_LATER",
        ));
        let gateway = IdentityGateway::new(Arc::new(mock));

        let error = gateway.authenticate(&sign_in()).await.unwrap_err();
        assert_eq!(error.kind, GatewayErrorKind::Provider);
        assert_eq!(
            error.body.error.as_str(),
            Some("Sign In Failed For Some Uncaught Reason")
        );
        let raw = error.body.error_raw.expect("raw error should be attached");
        assert_eq!(
            raw.get("code").and_then(Value::as_str),
            Some(codes::TOO_MANY_REQUESTS)
        );
    }

    #[tokio::test]
    async fn test_token_fetch_failure_after_sign_in_is_a_provider_error() {
        let mock = MockIdentityProvider::happy_path().with_token_result_error(
            ProviderError::new(codes::NETWORK_REQUEST_FAILED, "connection reset"),
        );
        let gateway = IdentityGateway::new(Arc::new(mock));

        let error = gateway.authenticate(&sign_in()).await.unwrap_err();
        assert_eq!(error.kind, GatewayErrorKind::Provider);
        assert_eq!(
            error.body.error.as_str(),
            Some("Sign In Failed For Some Uncaught Reason")
        );
        assert!(error.body.error_raw.is_some());
    }

    #[tokio::test]
    async fn test_validate_session_success_shape() {
        let gateway = IdentityGateway::new(Arc::new(MockIdentityProvider::happy_path()));

        let request = SessionValidationRequest {
            id_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
        };
        let result = gateway.validate_session(&request).await.unwrap();
        assert!(result.is_valid);
        assert!(!result.uid.is_empty());
        assert!(result.full_decoded_token.is_object());
    }

    #[tokio::test]
    async fn test_revoked_and_invalid_tokens_share_the_error_body() {
        let revoked = MockIdentityProvider::happy_path().with_verify_error(ProviderError::new(
            codes::ID_TOKEN_REVOKED,
            "the token predates a credential reset",
        ));
        let invalid = MockIdentityProvider::happy_path().with_verify_error(ProviderError::new(
            codes::INVALID_ID_TOKEN,
            "bad payload encoding",
        ));

        let request = SessionValidationRequest {
            id_token: "token".to_string(),
            refresh_token: None,
        };

        let revoked_error = IdentityGateway::new(Arc::new(revoked))
            .validate_session(&request)
            .await
            .unwrap_err();
        let invalid_error = IdentityGateway::new(Arc::new(invalid))
            .validate_session(&request)
            .await
            .unwrap_err();

        // Kinds differ (status mapping and logs), bodies share the shape
        assert_eq!(revoked_error.kind, GatewayErrorKind::RevokedToken);
        assert_eq!(invalid_error.kind, GatewayErrorKind::InvalidToken);
        assert!(revoked_error.body.error_raw.is_none());
        assert!(invalid_error.body.error_raw.is_none());
        assert!(revoked_error.body.error.is_object());
        assert!(invalid_error.body.error.is_object());
    }
}
