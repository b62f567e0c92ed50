//! User routes: the HTTP face of the Identity Gateway
//!
//! Handlers only translate between JSON bodies and gateway calls; every
//! error already arrives classified, so the status mapping is a single
//! match. The mapping is: credential failure and token failures are 401,
//! duplicate accounts are 409, unclassified provider failures are 500.

use crate::identity::{GatewayError, GatewayErrorKind, IdentityGateway};
use crate::models::{RegistrationRequest, SessionValidationRequest, SignInRequest};
use crate::utils::ResponseBuilder;
use actix_web::{web, HttpResponse};

/// POST /user/register
pub async fn register_account(
    body: web::Json<RegistrationRequest>,
    gateway: web::Data<IdentityGateway>,
) -> HttpResponse {
    match gateway.register_account(&body).await {
        Ok(record) => ResponseBuilder::ok().json(&record),
        Err(error) => error_response(&error),
    }
}

/// POST /user/sign-in
pub async fn sign_in(
    body: web::Json<SignInRequest>,
    gateway: web::Data<IdentityGateway>,
) -> HttpResponse {
    match gateway.authenticate(&body).await {
        Ok(credentials) => ResponseBuilder::ok().json(&credentials),
        Err(error) => error_response(&error),
    }
}

/// POST /user/validate-session
pub async fn validate_session(
    body: web::Json<SessionValidationRequest>,
    gateway: web::Data<IdentityGateway>,
) -> HttpResponse {
    match gateway.validate_session(&body).await {
        Ok(result) => ResponseBuilder::ok().json(&result),
        Err(error) => error_response(&error),
    }
}

/// Translate a classified gateway error into a status code, passing the
/// error body through verbatim
fn error_response(error: &GatewayError) -> HttpResponse {
    match error.kind {
        GatewayErrorKind::InvalidCredentials
        | GatewayErrorKind::InvalidToken
        | GatewayErrorKind::RevokedToken => ResponseBuilder::unauthorized().json(&error.body),
        GatewayErrorKind::DuplicateAccount => ResponseBuilder::conflict().json(&error.body),
        GatewayErrorKind::Provider => ResponseBuilder::internal_server_error().json(&error.body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::provider::{codes, ProviderError};
    use crate::testing::{fixtures, MockIdentityProvider};
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use std::sync::Arc;

    macro_rules! service_with {
        ($mock:expr) => {{
            let gateway = IdentityGateway::new(Arc::new($mock));
            test::init_service(
                App::new().app_data(web::Data::new(gateway)).service(
                    web::scope("/user")
                        .route("/register", web::post().to(register_account))
                        .route("/sign-in", web::post().to(sign_in))
                        .route("/validate-session", web::post().to(validate_session)),
                ),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn test_register_returns_record_with_locale() {
        let app = service_with!(MockIdentityProvider::happy_path());

        let request = test::TestRequest::post()
            .uri("/user/register")
            .set_json(fixtures::registration_body(Some("de")))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body.get("accountLocale").and_then(Value::as_str),
            Some("de")
        );
        assert_eq!(
            body.get("emailVerified").and_then(Value::as_bool),
            Some(false)
        );
    }

    #[actix_web::test]
    async fn test_duplicate_registration_is_conflict() {
        let mock = MockIdentityProvider::happy_path().with_create_account_error(
            ProviderError::new(codes::EMAIL_ALREADY_EXISTS, "EMAIL_EXISTS"),
        );
        let app = service_with!(mock);

        let request = test::TestRequest::post()
            .uri("/user/register")
            .set_json(fixtures::registration_body(None))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(response).await;
        assert!(body.get("error").is_some());
    }

    #[actix_web::test]
    async fn test_sign_in_success_returns_credentials() {
        let app = service_with!(MockIdentityProvider::happy_path());

        let request = test::TestRequest::post()
            .uri("/user/sign-in")
            .set_json(fixtures::sign_in_body())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        for field in [
            "idToken",
            "refreshToken",
            "email",
            "emailVerified",
            "displayName",
            "photoURL",
            "uid",
        ] {
            assert!(body.get(field).is_some(), "missing field {field}");
        }
    }

    #[actix_web::test]
    async fn test_bad_credentials_are_unauthorized_with_fixed_message() {
        let mock = MockIdentityProvider::happy_path()
            .with_sign_in_error(ProviderError::new(codes::WRONG_PASSWORD, "rejected"));
        let app = service_with!(mock);

        let request = test::TestRequest::post()
            .uri("/user/sign-in")
            .set_json(fixtures::sign_in_body())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body.get("error").and_then(Value::as_str),
            Some("Incorrect sign-in information provided.")
        );
        assert!(body.get("errorRaw").is_none());
    }

    #[actix_web::test]
    async fn test_unclassified_sign_in_failure_is_server_error() {
        let mock = MockIdentityProvider::happy_path().with_sign_in_error(ProviderError::new(
            codes::TOO_MANY_REQUESTS,
            "TOO_MANY_ATTEMPTS_TRY_LATER",
        ));
        let app = service_with!(mock);

        let request = test::TestRequest::post()
            .uri("/user/sign-in")
            .set_json(fixtures::sign_in_body())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(
            body.get("error").and_then(Value::as_str),
            Some("Sign In Failed For Some Uncaught Reason")
        );
        assert!(body.get("errorRaw").is_some());
    }

    #[actix_web::test]
    async fn test_revoked_token_is_unauthorized() {
        let mock = MockIdentityProvider::happy_path().with_verify_error(ProviderError::new(
            codes::ID_TOKEN_REVOKED,
            "the token predates a credential reset",
        ));
        let app = service_with!(mock);

        let request = test::TestRequest::post()
            .uri("/user/validate-session")
            .set_json(fixtures::validation_body())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(response).await;
        assert!(body.get("isValid").is_none());
        assert!(body.get("error").is_some());
    }

    #[actix_web::test]
    async fn test_valid_session_reports_is_valid() {
        let app = service_with!(MockIdentityProvider::happy_path());

        let request = test::TestRequest::post()
            .uri("/user/validate-session")
            .set_json(fixtures::validation_body())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body.get("isValid").and_then(Value::as_bool), Some(true));
        assert!(body.get("uid").is_some());
        assert!(body.get("fullDecodedToken").is_some());
    }
}
