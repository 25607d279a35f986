/// Authentication Routes
///
/// Handles signup, cookie-based login/logout, the protected echo and the
/// active-flag toggle. All `/auth` routes except signup and login sit behind
/// `JwtMiddleware`.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::{removal_cookie, token_cookie, Identity, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::error::AppError;
use crate::models::Role;
use crate::schemas::{LoginRequest, SignUpRequest};
use crate::state::AppState;

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub login: bool,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct MsgResponse {
    pub msg: &'static str,
}

#[derive(Serialize)]
pub struct ProtectedResponse {
    pub msg: &'static str,
    pub role: Role,
}

/// POST /auth/signup
///
/// Register a new user with username, email and password.
/// Returns the created user without its password digest.
///
/// # Errors
/// - 400: Validation errors, or email/username already taken
/// - 500: Internal server error
pub async fn signup(
    body: web::Json<SignUpRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.sessions.sign_up(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// POST /auth/login
///
/// Authenticate with an email address or a username. Tokens are delivered
/// only as http-only cookies, never in the body.
///
/// # Errors
/// - 400: Validation error
/// - 404: No account matches the identifier
/// - 401: Wrong password
///
/// 404 and 401 carry the same message.
pub async fn login(
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let tokens = state.sessions.login(body.into_inner()).await?;
    let secure = state.auth.secure_cookies;

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(
            ACCESS_COOKIE,
            tokens.access_token,
            state.jwt.access_token_expiry,
            secure,
        ))
        .cookie(token_cookie(
            REFRESH_COOKIE,
            tokens.refresh_token,
            state.jwt.refresh_token_expiry,
            secure,
        ))
        .json(LoginResponse {
            message: "Logged in successfully",
            login: true,
        }))
}

/// POST /auth/logout
///
/// Revoke the caller's refresh tokens and clear both cookies. Succeeds even
/// when no refresh token was on record.
pub async fn logout(
    identity: Identity,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.sessions.logout(&identity).await?;
    let secure = state.auth.secure_cookies;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(ACCESS_COOKIE, secure))
        .cookie(removal_cookie(REFRESH_COOKIE, secure))
        .json(MessageResponse {
            message: "Logged out successfully",
        }))
}

/// GET /auth/protected
pub async fn protected(identity: Identity, state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ProtectedResponse {
        msg: "You're authenticated!",
        role: state.sessions.protected_echo(&identity),
    })
}

/// PATCH /auth/active
///
/// # Errors
/// - 400: The account behind the token no longer exists
pub async fn toggle_active(
    identity: Identity,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let msg = if state.sessions.toggle_active(&identity).await? {
        "User is active"
    } else {
        "User is inactive"
    };

    Ok(HttpResponse::Ok().json(MsgResponse { msg }))
}
