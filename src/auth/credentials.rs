/// Credential Validation
///
/// Resolves a login identifier to a user and checks the password. Unknown
/// accounts and wrong passwords produce the same message for a given
/// identifier shape, so responses do not reveal which accounts exist.

use crate::auth::password::PasswordHasher;
use crate::error::{AppError, CredentialFailure};
use crate::models::User;
use crate::store::UserStore;

/// Shape of a login identifier; anything containing `@` is an email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    Username,
}

impl IdentifierKind {
    pub fn classify(identifier: &str) -> Self {
        if identifier.contains('@') {
            IdentifierKind::Email
        } else {
            IdentifierKind::Username
        }
    }

    /// Client-facing message for any failed login with this identifier shape.
    /// Clients match on the exact text, misspelling included.
    pub fn invalid_credentials_message(&self) -> &'static str {
        match self {
            IdentifierKind::Email => "Email or password inavalid",
            IdentifierKind::Username => "Username or password inavalid",
        }
    }
}

/// Look up the user behind `identifier` and verify `password`.
///
/// # Errors
/// - `InvalidCredentials` with `UnknownAccount` or `WrongPassword`
/// - `Database`/`Internal` if the store or the hasher fails
pub async fn validate_credentials(
    users: &dyn UserStore,
    hasher: &PasswordHasher,
    identifier: &str,
    password: &str,
) -> Result<User, AppError> {
    let kind = IdentifierKind::classify(identifier);
    let reject = |failure: CredentialFailure| AppError::InvalidCredentials {
        identifier: kind,
        failure,
    };

    let user = match kind {
        IdentifierKind::Email => users.find_by_email(identifier).await?,
        IdentifierKind::Username => users.find_by_username(identifier).await?,
    }
    .ok_or_else(|| reject(CredentialFailure::UnknownAccount))?;

    if !hasher.verify(password, &user.password_hash).await? {
        return Err(reject(CredentialFailure::WrongPassword));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};
    use crate::store::InMemoryUserStore;

    async fn store_with_user(hasher: &PasswordHasher) -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store
            .insert(NewUser {
                username: "ursula".to_string(),
                email: "ursula@example.com".to_string(),
                password_hash: hasher.hash("SecurePass123").await.unwrap(),
                role: Role::User,
            })
            .await
            .unwrap();
        store
    }

    fn failure_of(result: Result<User, AppError>) -> (IdentifierKind, CredentialFailure, String) {
        let err = result.expect_err("login should have been rejected");
        let message = err.to_string();
        match err {
            AppError::InvalidCredentials { identifier, failure } => (identifier, failure, message),
            other => panic!("Expected InvalidCredentials, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_identifier() {
        assert_eq!(IdentifierKind::classify("user@ex.com"), IdentifierKind::Email);
        assert_eq!(IdentifierKind::classify("ursula"), IdentifierKind::Username);
        assert_eq!(IdentifierKind::classify("@"), IdentifierKind::Email);
    }

    #[tokio::test]
    async fn test_accepts_email_and_username() {
        let hasher = PasswordHasher::new(4);
        let store = store_with_user(&hasher).await;

        let by_email = validate_credentials(&store, &hasher, "ursula@example.com", "SecurePass123")
            .await
            .unwrap();
        let by_username = validate_credentials(&store, &hasher, "ursula", "SecurePass123")
            .await
            .unwrap();

        assert_eq!(by_email.id, by_username.id);
    }

    #[tokio::test]
    async fn test_email_failures_are_indistinguishable() {
        let hasher = PasswordHasher::new(4);
        let store = store_with_user(&hasher).await;

        let unknown = failure_of(
            validate_credentials(&store, &hasher, "nobody@example.com", "SecurePass123").await,
        );
        let wrong = failure_of(
            validate_credentials(&store, &hasher, "ursula@example.com", "WrongPass123").await,
        );

        assert_eq!(unknown.0, IdentifierKind::Email);
        assert_eq!(unknown.1, CredentialFailure::UnknownAccount);
        assert_eq!(wrong.1, CredentialFailure::WrongPassword);
        assert_eq!(unknown.2, "Email or password inavalid");
        assert_eq!(unknown.2, wrong.2);
    }

    #[tokio::test]
    async fn test_username_failures_are_indistinguishable() {
        let hasher = PasswordHasher::new(4);
        let store = store_with_user(&hasher).await;

        let unknown =
            failure_of(validate_credentials(&store, &hasher, "nobody", "SecurePass123").await);
        let wrong =
            failure_of(validate_credentials(&store, &hasher, "ursula", "WrongPass123").await);

        assert_eq!(unknown.2, "Username or password inavalid");
        assert_eq!(unknown.2, wrong.2);
    }

    #[tokio::test]
    async fn test_email_identifier_is_not_looked_up_as_username() {
        let hasher = PasswordHasher::new(4);
        let store = InMemoryUserStore::new();
        // a username can never contain '@', but a stored one must still not match
        store
            .insert(NewUser {
                username: "odd@name".to_string(),
                email: "real@example.com".to_string(),
                password_hash: hasher.hash("SecurePass123").await.unwrap(),
                role: Role::User,
            })
            .await
            .unwrap();

        let result = validate_credentials(&store, &hasher, "odd@name", "SecurePass123").await;
        assert_eq!(failure_of(result).1, CredentialFailure::UnknownAccount);
    }
}
