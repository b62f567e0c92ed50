//! HTTP response handling
//!
//! A unified interface for creating HTTP responses across the application,
//! with consistent JSON error shapes and explicit status codes.

use actix_web::{http::header, HttpResponse};
use serde_json::json;

/// Unified response builder for JSON success and error responses
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Create a `BadRequest` (400) error response with optional customization
    #[must_use]
    pub fn bad_request() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::BadRequest)
    }

    /// Create an `Unauthorized` (401) error response with optional customization
    #[must_use]
    pub fn unauthorized() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::Unauthorized)
    }

    /// Create a `NotFound` (404) error response with optional customization
    #[must_use]
    pub fn not_found() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::NotFound)
    }

    /// Create a `Conflict` (409) error response with optional customization
    #[must_use]
    pub fn conflict() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::Conflict)
    }

    /// Create an `InternalServerError` (500) error response with optional customization
    #[must_use]
    pub fn internal_server_error() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(ErrorType::InternalServerError)
    }

    /// Create an OK response (200) with JSON content
    #[must_use]
    pub fn ok() -> JsonResponseBuilder {
        JsonResponseBuilder::new(200)
    }

    /// Create a Created response (201) with JSON content
    #[must_use]
    pub fn created() -> JsonResponseBuilder {
        JsonResponseBuilder::new(201)
    }
}

/// Supported HTTP error response types
#[derive(Clone, Copy)]
enum ErrorType {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    InternalServerError,
}

/// Builder for error responses with fluent interface
pub struct ErrorResponseBuilder {
    error_type: ErrorType,
    error_code: Option<String>,
    message: Option<String>,
}

impl ErrorResponseBuilder {
    fn new(error_type: ErrorType) -> Self {
        Self {
            error_type,
            error_code: None,
            message: None,
        }
    }

    /// Set a custom error code (e.g. "`post_not_found`")
    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }

    /// Set a custom error message
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Build a response whose body is the given value, verbatim.
    /// Used where the error body is itself the caller contract.
    pub fn json<T: serde::Serialize>(self, body: &T) -> HttpResponse {
        self.response_builder()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .json(body)
    }

    /// Build the final `HttpResponse` with the `{error, message}` shape
    #[must_use]
    pub fn build(self) -> HttpResponse {
        let body = json!({
            "error": self
                .error_code
                .clone()
                .unwrap_or_else(|| self.default_error_code()),
            "message": self
                .message
                .clone()
                .unwrap_or_else(|| self.default_message()),
        });
        self.json(&body)
    }

    fn response_builder(&self) -> actix_web::HttpResponseBuilder {
        match self.error_type {
            ErrorType::BadRequest => HttpResponse::BadRequest(),
            ErrorType::Unauthorized => HttpResponse::Unauthorized(),
            ErrorType::NotFound => HttpResponse::NotFound(),
            ErrorType::Conflict => HttpResponse::Conflict(),
            ErrorType::InternalServerError => HttpResponse::InternalServerError(),
        }
    }

    /// Get the default error code for this error type
    fn default_error_code(&self) -> String {
        match self.error_type {
            ErrorType::BadRequest => "invalid_request",
            ErrorType::Unauthorized => "unauthorized",
            ErrorType::NotFound => "not_found",
            ErrorType::Conflict => "conflict",
            ErrorType::InternalServerError => "server_error",
        }
        .to_string()
    }

    /// Get the default error message for this error type
    fn default_message(&self) -> String {
        match self.error_type {
            ErrorType::BadRequest => "The request is malformed or invalid",
            ErrorType::Unauthorized => "Authentication is required to access this resource",
            ErrorType::NotFound => "The requested resource does not exist",
            ErrorType::Conflict => "The request conflicts with existing state",
            ErrorType::InternalServerError => "An internal server error occurred",
        }
        .to_string()
    }
}

/// Builder for JSON success responses
pub struct JsonResponseBuilder {
    status_code: u16,
}

impl JsonResponseBuilder {
    fn new(status_code: u16) -> Self {
        Self { status_code }
    }

    /// Build the response with JSON content
    #[must_use]
    pub fn json<T: serde::Serialize>(self, data: &T) -> HttpResponse {
        let mut builder = match self.status_code {
            201 => HttpResponse::Created(),
            _ => HttpResponse::Ok(),
        };
        builder
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .json(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_error_response_statuses() {
        assert_eq!(
            ResponseBuilder::bad_request().build().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ResponseBuilder::unauthorized().build().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ResponseBuilder::not_found().build().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ResponseBuilder::conflict().build().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ResponseBuilder::internal_server_error().build().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_custom_error_response() {
        let response = ResponseBuilder::not_found()
            .with_error_code("post_not_found")
            .with_message("No blog post with that id")
            .build();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_verbatim_body_keeps_status() {
        let body = json!({"error": "EMAIL_EXISTS"});
        let response = ResponseBuilder::conflict().json(&body);
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_json_response_builder() {
        let data = json!({"message": "success"});
        assert_eq!(ResponseBuilder::ok().json(&data).status(), StatusCode::OK);
        assert_eq!(
            ResponseBuilder::created().json(&data).status(),
            StatusCode::CREATED
        );
    }

}
