/// JWT Claims structure
///
/// Payload shared by access and refresh tokens: the user's identity plus
/// the standard `exp`/`iat`/`iss` claims (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::Role;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create claims valid for `expiry_seconds` from now
    pub fn new(
        user_id: Uuid,
        username: String,
        role: Role,
        expiry_seconds: i64,
        issuer: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            username,
            role,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `TokenInvalid` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenInvalid)
    }

    /// The caller identity carried by a verified token
    pub fn identity(&self) -> Result<Identity, AuthError> {
        Ok(Identity {
            user_id: self.user_id()?,
            username: self.username.clone(),
            role: self.role,
        })
    }
}

/// Authenticated caller, populated from a verified access token
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "ursula".to_string(), Role::User, 3600, "test".to_string());

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "ursula");
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn test_identity_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "root".to_string(), Role::Admin, 3600, "test".to_string());

        let identity = claims.identity().unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.username, "root");
        assert!(identity.is_admin());
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims =
            Claims::new(Uuid::new_v4(), "ursula".to_string(), Role::User, 3600, "test".to_string());
        claims.sub = "invalid-uuid".to_string();

        assert_eq!(claims.user_id(), Err(AuthError::TokenInvalid));
        assert!(claims.identity().is_err());
    }
}
