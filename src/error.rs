/// Application Error Handling
///
/// One error type flows through every handler and store call:
/// 1. Domain-specific error types (validation, database, token)
/// 2. A unified `AppError` classified into the API's error kinds
/// 3. HTTP response mapping with structured, loggable context

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use std::error::Error as StdError;
use std::fmt;

use crate::auth::IdentifierKind;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Field-level validation failures produced by the input schemas
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
    SuspiciousContent(String),
    WeakPassword,
    MalformedBody(String),
}

impl ValidationError {
    /// Name of the offending input field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField(field)
            | ValidationError::TooShort(field, _)
            | ValidationError::TooLong(field, _)
            | ValidationError::InvalidFormat(field)
            | ValidationError::SuspiciousContent(field) => field,
            ValidationError::WeakPassword => "password",
            ValidationError::MalformedBody(_) => "body",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
            ValidationError::WeakPassword => write!(
                f,
                "password must contain at least one digit, one lowercase letter, and one uppercase letter"
            ),
            ValidationError::MalformedBody(msg) => write!(f, "request body is malformed: {}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Columns guarded by a unique index in the `users` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(UniqueField),
    QueryExecution(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(field) => {
                write!(f, "Duplicate entry: {:?}", field)
            }
            DatabaseError::QueryExecution(msg) => write!(f, "Query error: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                match db_err.constraint() {
                    Some(name) if name.contains("email") => {
                        DatabaseError::UniqueConstraintViolation(UniqueField::Email)
                    }
                    Some(name) if name.contains("username") => {
                        DatabaseError::UniqueConstraintViolation(UniqueField::Username)
                    }
                    _ => DatabaseError::QueryExecution(err.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionPool(err.to_string())
            }
            _ => DatabaseError::UnexpectedError(err.to_string()),
        }
    }
}

/// Token authentication errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    TokenInvalid,
    TokenExpired,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
        }
    }
}

impl StdError for AuthError {}

/// Why a login attempt was rejected.
///
/// Only the HTTP status differs between the two; the message is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    UnknownAccount,
    WrongPassword,
}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug)]
pub enum AppError {
    InvalidInput(Vec<ValidationError>),
    DuplicateEmail,
    DuplicateUsername,
    InvalidCredentials {
        identifier: IdentifierKind,
        failure: CredentialFailure,
    },
    UserNotFound,
    Auth(AuthError),
    Forbidden(String),
    NotFound(&'static str),
    Database(DatabaseError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInput(errors) => {
                let fields: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                write!(f, "Invalid input: {}", fields.join("; "))
            }
            AppError::DuplicateEmail => write!(f, "Email already exists"),
            AppError::DuplicateUsername => write!(f, "Username already exists"),
            AppError::InvalidCredentials { identifier, .. } => {
                write!(f, "{}", identifier.invalid_credentials_message())
            }
            AppError::UserNotFound => write!(f, "User does not exist"),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(resource) => write!(f, "{} not found", resource),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(vec![err])
    }
}

impl From<Vec<ValidationError>> for AppError {
    fn from(errors: Vec<ValidationError>) -> Self {
        AppError::InvalidInput(errors)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueConstraintViolation(UniqueField::Email) => AppError::DuplicateEmail,
            DatabaseError::UniqueConstraintViolation(UniqueField::Username) => {
                AppError::DuplicateUsername
            }
            other => AppError::Database(other),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::from(err).into()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// One entry of the `details` list for invalid input
#[derive(Debug, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        Self {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Unique error ID, also present in the server log
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when error occurred
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::DuplicateEmail => (StatusCode::BAD_REQUEST, "DUPLICATE_EMAIL"),
            AppError::DuplicateUsername => (StatusCode::BAD_REQUEST, "DUPLICATE_USERNAME"),
            AppError::InvalidCredentials { failure, .. } => match failure {
                CredentialFailure::UnknownAccount => (StatusCode::NOT_FOUND, "INVALID_CREDENTIALS"),
                CredentialFailure::WrongPassword => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                }
            },
            AppError::UserNotFound => (StatusCode::BAD_REQUEST, "USER_NOT_FOUND"),
            AppError::Auth(AuthError::MissingToken) => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            AppError::Auth(_) => (StatusCode::UNAUTHORIZED, "TOKEN_INVALID"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    /// Message safe to show to clients
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(_) => "Invalid input".to_string(),
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Auth(AuthError::MissingToken) => "Missing authentication token".to_string(),
            AppError::Auth(_) => "Invalid or expired token".to_string(),
            other => other.to_string(),
        }
    }
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code) = self.classify();
        let mut body = ErrorResponse::new(
            request_id.to_string(),
            self.public_message(),
            code.to_string(),
            status.as_u16(),
        );
        if let AppError::InvalidInput(errors) = self {
            body = body.with_details(errors.iter().map(FieldError::from).collect());
        }
        (status, body)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
            AppError::InvalidCredentials { identifier, failure } => {
                tracing::warn!(
                    request_id = request_id,
                    identifier = ?identifier,
                    failure = ?failure,
                    "Invalid credentials attempt"
                );
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            other => {
                tracing::info!(request_id = request_id, error = %other, "Request rejected");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        self.classify().0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context attached to domain log lines
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::EmptyField("email".to_string());
        assert_eq!(err.to_string(), "email is empty");
        assert_eq!(err.field(), "email");
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate_kinds() {
        let email: AppError = DatabaseError::UniqueConstraintViolation(UniqueField::Email).into();
        let username: AppError =
            DatabaseError::UniqueConstraintViolation(UniqueField::Username).into();

        assert!(matches!(email, AppError::DuplicateEmail));
        assert!(matches!(username, AppError::DuplicateUsername));
        assert_eq!(email.to_string(), "Email already exists");
        assert_eq!(username.to_string(), "Username already exists");
    }

    #[test]
    fn test_credential_failures_share_message_but_not_status() {
        let unknown = AppError::InvalidCredentials {
            identifier: IdentifierKind::Email,
            failure: CredentialFailure::UnknownAccount,
        };
        let wrong = AppError::InvalidCredentials {
            identifier: IdentifierKind::Email,
            failure: CredentialFailure::WrongPassword,
        };

        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_invalid_input_carries_field_details() {
        let err = AppError::InvalidInput(vec![
            ValidationError::EmptyField("username".to_string()),
            ValidationError::WeakPassword,
        ]);
        let (status, body) = ErrorHandler::error_response(&err, "req-1");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "Invalid input");
        let details = body.details.expect("details should be present");
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "username");
        assert_eq!(details[1].field, "password");
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let err = AppError::Internal("bcrypt exploded".to_string());
        let (status, body) = ErrorHandler::error_response(&err, "req-2");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
        assert_eq!(body.error_id, "req-2");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_error_context_creation() {
        let ctx = ErrorContext::new("test_operation");
        assert_eq!(ctx.operation, "test_operation");
        assert!(ctx.user_id.is_none());

        let ctx_with_user = ctx.with_user_id("user-123");
        assert_eq!(ctx_with_user.user_id, Some("user-123".to_string()));
    }
}
