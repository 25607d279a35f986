/// Session Lifecycle
///
/// Signup, login, logout and the active-flag toggle. HTTP concerns (cookies,
/// response bodies) stay in the route handlers.

use chrono::Utc;
use std::sync::Arc;

use crate::auth::claims::Identity;
use crate::auth::credentials::validate_credentials;
use crate::auth::jwt::{generate_token, TokenKind};
use crate::auth::ledger::RefreshTokenLedger;
use crate::auth::password::PasswordHasher;
use crate::configuration::JwtSettings;
use crate::error::{AppError, ErrorContext};
use crate::models::{NewUser, PublicUser, Role};
use crate::schemas::{LoginRequest, SignUpRequest};
use crate::store::{RefreshTokenStore, UserStore};

/// Tokens issued by a successful login
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct SessionController {
    users: Arc<dyn UserStore>,
    ledger: RefreshTokenLedger,
    hasher: PasswordHasher,
    jwt: JwtSettings,
}

impl SessionController {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        hasher: PasswordHasher,
        jwt: JwtSettings,
    ) -> Self {
        Self {
            users,
            ledger: RefreshTokenLedger::new(refresh_tokens),
            hasher,
            jwt,
        }
    }

    pub fn jwt(&self) -> &JwtSettings {
        &self.jwt
    }

    /// Register a new account with the default role
    ///
    /// # Errors
    /// - `InvalidInput` listing every failed field
    /// - `DuplicateEmail` / `DuplicateUsername`
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<PublicUser, AppError> {
        let context = ErrorContext::new("user_registration");
        let input = request.validate()?;
        let password_hash = self.hasher.hash(&input.password).await?;

        let user = self
            .users
            .insert(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                role: Role::default(),
            })
            .await?;

        tracing::info!(
            request_id = %context.request_id,
            operation = %context.operation,
            user_id = %user.id,
            "User registered successfully"
        );

        Ok(user.into())
    }

    /// Authenticate by email or username and start a fresh session.
    ///
    /// Any refresh token issued by an earlier login is dropped from the ledger.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, AppError> {
        let input = request.validate()?;
        let user =
            validate_credentials(self.users.as_ref(), &self.hasher, &input.identifier, &input.password)
                .await?;
        let context = ErrorContext::new("user_login").with_user_id(user.id);

        let tokens = TokenPair {
            access_token: generate_token(&user, TokenKind::Access, &self.jwt)?,
            refresh_token: generate_token(&user, TokenKind::Refresh, &self.jwt)?,
        };
        self.ledger.replace(user.id, &tokens.refresh_token).await?;

        tracing::info!(
            request_id = %context.request_id,
            operation = %context.operation,
            user_id = ?context.user_id,
            "User logged in successfully"
        );

        Ok(tokens)
    }

    /// Revoke every refresh token of the caller; returns how many were live
    pub async fn logout(&self, identity: &Identity) -> Result<u64, AppError> {
        let context = ErrorContext::new("user_logout").with_user_id(identity.user_id);
        let revoked = self.ledger.revoke(identity.user_id).await?;

        tracing::info!(
            request_id = %context.request_id,
            operation = %context.operation,
            user_id = ?context.user_id,
            "User logged out"
        );

        Ok(revoked)
    }

    /// Flip the caller's `is_active` flag and return the new value
    ///
    /// # Errors
    /// `UserNotFound` if the account behind the token is gone
    pub async fn toggle_active(&self, identity: &Identity) -> Result<bool, AppError> {
        let mut user = self
            .users
            .find_by_id(identity.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        user.is_active = !user.is_active;
        user.updated_at = Utc::now();
        let user = self.users.save(&user).await?;

        tracing::info!(user_id = %user.id, is_active = user.is_active, "User active flag toggled");
        Ok(user.is_active)
    }

    pub fn protected_echo(&self, identity: &Identity) -> Role {
        identity.role
    }
}
