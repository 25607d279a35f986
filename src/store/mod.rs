/// Persistence interfaces
///
/// The session controller and routes only see these traits; Postgres and
/// in-memory implementations live in the submodules.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::models::{
    Comment, NewComment, NewPost, NewUser, Post, PostChanges, RefreshTokenRecord, User,
};

pub use memory::{InMemoryPostStore, InMemoryRefreshTokenStore, InMemoryUserStore};
pub use postgres::{PgPostStore, PgRefreshTokenStore, PgUserStore};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    /// Fails with `UniqueConstraintViolation` naming the clashing column
    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError>;

    /// Overwrite the stored record with the same id
    async fn save(&self, user: &User) -> Result<User, DatabaseError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Returns the number of deleted records; zero is not an error
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DatabaseError>;

    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DatabaseError>;

    /// Delete every record of `record.user_id`, then insert `record`.
    ///
    /// The delete must complete before the insert starts.
    async fn replace_for_user(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, DatabaseError> {
        self.delete_all_for_user(record.user_id).await?;
        self.insert(record).await
    }
}

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Newest first, comments included
    async fn list_all(&self) -> Result<Vec<Post>, DatabaseError>;

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DatabaseError>;

    async fn insert(&self, post: NewPost) -> Result<Post, DatabaseError>;

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, DatabaseError>;

    /// Deletes the post together with its comments
    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError>;

    async fn add_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError>;

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool, DatabaseError>;
}
