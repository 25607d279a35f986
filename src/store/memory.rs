/// In-memory stores used by the test suite and for running without Postgres

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{PostStore, RefreshTokenStore, UserStore};
use crate::error::{DatabaseError, UniqueField};
use crate::models::{
    Comment, NewComment, NewPost, NewUser, Post, PostChanges, RefreshTokenRecord, User,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DatabaseError> {
    mutex
        .lock()
        .map_err(|_| DatabaseError::UnexpectedError("in-memory store lock poisoned".to_string()))
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.lock().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Email wins when both columns clash
fn unique_clash(users: &HashMap<Uuid, User>, candidate: &User) -> Option<UniqueField> {
    let mut others = users.values().filter(|u| u.id != candidate.id);
    if others.clone().any(|u| u.email == candidate.email) {
        Some(UniqueField::Email)
    } else if others.any(|u| u.username == candidate.username) {
        Some(UniqueField::Username)
    } else {
        None
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let users = lock(&self.users)?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let users = lock(&self.users)?;
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, DatabaseError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut users = lock(&self.users)?;
        if let Some(field) = unique_clash(&users, &user) {
            return Err(DatabaseError::UniqueConstraintViolation(field));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<User, DatabaseError> {
        let mut users = lock(&self.users)?;
        if !users.contains_key(&user.id) {
            return Err(DatabaseError::QueryExecution(format!(
                "user {} no longer exists",
                user.id
            )));
        }
        if let Some(field) = unique_clash(&users, user) {
            return Err(DatabaseError::UniqueConstraintViolation(field));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    records: Mutex<Vec<RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records currently held for `user_id`
    pub fn records_for_user(&self, user_id: Uuid) -> Vec<RefreshTokenRecord> {
        self.records
            .lock()
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn delete_all_for_user(&self, user_id: Uuid) -> Result<u64, DatabaseError> {
        let mut records = lock(&self.records)?;
        let before = records.len();
        records.retain(|r| r.user_id != user_id);
        Ok((before - records.len()) as u64)
    }

    async fn insert(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DatabaseError> {
        lock(&self.records)?.push(record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct InMemoryPostStore {
    posts: Mutex<Vec<Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list_all(&self) -> Result<Vec<Post>, DatabaseError> {
        let posts = lock(&self.posts)?;
        Ok(posts.iter().rev().cloned().collect())
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, DatabaseError> {
        let posts = lock(&self.posts)?;
        Ok(posts
            .iter()
            .rev()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DatabaseError> {
        let posts = lock(&self.posts)?;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: NewPost) -> Result<Post, DatabaseError> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
            comments: Vec::new(),
        };
        lock(&self.posts)?.push(post.clone());
        Ok(post)
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, DatabaseError> {
        let mut posts = lock(&self.posts)?;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut posts = lock(&self.posts)?;
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn add_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let mut posts = lock(&self.posts)?;
        let post = posts
            .iter_mut()
            .find(|p| p.id == comment.post_id)
            .ok_or_else(|| {
                DatabaseError::QueryExecution(format!("post {} does not exist", comment.post_id))
            })?;
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content,
            created_at: Utc::now(),
        };
        post.comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool, DatabaseError> {
        let mut posts = lock(&self.posts)?;
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(false);
        };
        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);
        Ok(post.comments.len() < before)
    }
}
