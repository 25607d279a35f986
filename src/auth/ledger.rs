/// Refresh Token Ledger
///
/// Server-side record of each user's live refresh token:
/// - At most one record per user; a new login replaces the old one
/// - Tokens are hashed with SHA-256 before storage (never store plaintext)
/// - Logout deletes every record for the user

use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::RefreshTokenRecord;
use crate::store::RefreshTokenStore;

/// Hash a refresh token using SHA-256
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone)]
pub struct RefreshTokenLedger {
    store: Arc<dyn RefreshTokenStore>,
}

impl RefreshTokenLedger {
    pub fn new(store: Arc<dyn RefreshTokenStore>) -> Self {
        Self { store }
    }

    /// Make `token` the only live refresh token of `user_id`.
    ///
    /// Concurrent logins for the same user race; the last insert wins.
    pub async fn replace(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        let record = RefreshTokenRecord::new(user_id, hash_token(token));
        self.store.replace_for_user(record).await?;

        tracing::debug!(user_id = %user_id, "Refresh token replaced");
        Ok(())
    }

    /// Delete all refresh tokens of `user_id`, returning how many existed
    pub async fn revoke(&self, user_id: Uuid) -> Result<u64, AppError> {
        let revoked = self.store.delete_all_for_user(user_id).await?;

        tracing::info!(user_id = %user_id, revoked = revoked, "Refresh tokens revoked for user");
        Ok(revoked)
    }
}
