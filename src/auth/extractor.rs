/// Actix extractor for authenticated callers.
///
/// Handlers that take an [`Identity`] argument require a valid access token.
/// If `JwtMiddleware` already verified the request the identity is read from
/// the request extensions, otherwise the token is verified here.

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

use crate::auth::claims::Identity;
use crate::auth::cookies::ACCESS_COOKIE;
use crate::auth::jwt::validate_token;
use crate::error::{AppError, AuthError};
use crate::state::AppState;

/// Access token from the `accessToken` cookie, or an `Authorization: Bearer` header
pub fn access_token_from(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(ACCESS_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

fn identify(req: &HttpRequest) -> Result<Identity, AppError> {
    if let Some(identity) = req.extensions().get::<Identity>().cloned() {
        return Ok(identity);
    }

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not registered".to_string()))?;
    let token = access_token_from(req).ok_or(AuthError::MissingToken)?;
    let claims = validate_token(&token, &state.jwt)?;

    Ok(claims.identity()?)
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(identify(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_token_read_from_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(ACCESS_COOKIE, "cookie-token"))
            .insert_header((AUTHORIZATION, "Bearer header-token"))
            .to_http_request();

        assert_eq!(access_token_from(&req), Some("cookie-token".to_string()));
    }

    #[test]
    fn test_token_falls_back_to_bearer_header() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer header-token"))
            .to_http_request();

        assert_eq!(access_token_from(&req), Some("header-token".to_string()));
    }

    #[test]
    fn test_empty_cookie_and_other_schemes_are_ignored() {
        let req = TestRequest::default()
            .cookie(Cookie::new(ACCESS_COOKIE, ""))
            .insert_header((AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();

        assert_eq!(access_token_from(&req), None);
    }
}
