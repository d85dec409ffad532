use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Page, PageRequest, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining the lookups every entity supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Returns `RepoError::NotFound` if nothing was removed.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Insert or replace a user.
    async fn save(&self, user: User) -> Result<User, RepoError>;

    /// Find a user by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Persist a validated post; the store assigns its id.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace the title of an existing post and refresh `updated_at`.
    /// Returns `None` when no post has that id.
    async fn update_title(&self, id: i64, title: String) -> Result<Option<Post>, RepoError>;

    /// Fetch one page of posts ordered by ascending id.
    async fn paginate(&self, request: PageRequest) -> Result<Page<Post>, RepoError>;
}
