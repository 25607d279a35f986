/// Request schemas
///
/// Request bodies deserialize leniently (missing fields become empty
/// strings) and are then checked as a whole, so a client gets every field
/// error in one response.

use serde::Deserialize;

use crate::error::{AppError, ValidationError};
use crate::validators::{is_valid_email, is_valid_password, is_valid_text, is_valid_username};

const MAX_IDENTIFIER_LENGTH: usize = 254;
const MAX_LOGIN_PASSWORD_LENGTH: usize = 128;
const MAX_TITLE_LENGTH: usize = 200;
const MAX_CONTENT_LENGTH: usize = 10_000;
const MAX_COMMENT_LENGTH: usize = 2_000;

fn collect<T>(result: Result<T, ValidationError>, errors: &mut Vec<ValidationError>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}

/// POST /auth/signup body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A sign-up request that passed the user schema
#[derive(Debug)]
pub struct ValidSignUp {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(self) -> Result<ValidSignUp, AppError> {
        let mut errors = Vec::new();
        let username = collect(is_valid_username(&self.username), &mut errors);
        let email = collect(is_valid_email(&self.email), &mut errors);
        let password = collect(is_valid_password(&self.password), &mut errors);

        match (username, email, password) {
            (Some(username), Some(email), Some(())) if errors.is_empty() => Ok(ValidSignUp {
                username,
                email,
                password: self.password,
            }),
            _ => Err(AppError::InvalidInput(errors)),
        }
    }
}

/// POST /auth/login body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Email address or username
    pub identifier: String,
    pub password: String,
}

impl LoginRequest {
    /// Returns the request with a trimmed identifier
    pub fn validate(self) -> Result<LoginRequest, AppError> {
        let mut errors = Vec::new();
        let identifier = self.identifier.trim().to_string();

        if identifier.is_empty() {
            errors.push(ValidationError::EmptyField("identifier".to_string()));
        } else if identifier.len() > MAX_IDENTIFIER_LENGTH {
            errors.push(ValidationError::TooLong("identifier".to_string(), MAX_IDENTIFIER_LENGTH));
        }

        if self.password.is_empty() {
            errors.push(ValidationError::EmptyField("password".to_string()));
        } else if self.password.len() > MAX_LOGIN_PASSWORD_LENGTH {
            errors.push(ValidationError::TooLong(
                "password".to_string(),
                MAX_LOGIN_PASSWORD_LENGTH,
            ));
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidInput(errors));
        }

        Ok(LoginRequest {
            identifier,
            password: self.password,
        })
    }
}

/// POST /posts body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

impl PostRequest {
    /// Returns the trimmed `(title, content)`
    pub fn validate(self) -> Result<(String, String), AppError> {
        let mut errors = Vec::new();
        let title = collect(is_valid_text("title", &self.title, MAX_TITLE_LENGTH), &mut errors);
        let content = collect(
            is_valid_text("content", &self.content, MAX_CONTENT_LENGTH),
            &mut errors,
        );

        match (title, content) {
            (Some(title), Some(content)) => Ok((title, content)),
            _ => Err(AppError::InvalidInput(errors)),
        }
    }
}

/// PUT /posts/{post_id} body; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostUpdateRequest {
    pub fn validate(self) -> Result<(Option<String>, Option<String>), AppError> {
        let mut errors = Vec::new();

        if self.title.is_none() && self.content.is_none() {
            errors.push(ValidationError::EmptyField("title or content".to_string()));
        }

        let title = self
            .title
            .and_then(|t| collect(is_valid_text("title", &t, MAX_TITLE_LENGTH), &mut errors));
        let content = self.content.and_then(|c| {
            collect(is_valid_text("content", &c, MAX_CONTENT_LENGTH), &mut errors)
        });

        if !errors.is_empty() {
            return Err(AppError::InvalidInput(errors));
        }

        Ok((title, content))
    }
}

/// POST /posts/{post_id}/comments body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentRequest {
    pub content: String,
}

impl CommentRequest {
    pub fn validate(self) -> Result<String, AppError> {
        Ok(is_valid_text("content", &self.content, MAX_COMMENT_LENGTH)?)
    }
}
