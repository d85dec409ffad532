//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkwell_core::domain::{NewPost, Page, PageRequest, Post, User};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{BaseRepository, PostRepository, UserRepository};

/// Users keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store
            .values()
            .any(|existing| existing.email == user.email && existing.id != user.id)
        {
            return Err(RepoError::Constraint(format!(
                "email {} already taken",
                user.email
            )));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .store
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }
}

struct PostTable {
    rows: BTreeMap<i64, Post>,
    next_id: i64,
}

/// Posts kept in id order, with ids handed out like a sequence.
pub struct InMemoryPostRepository {
    table: RwLock<PostTable>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(PostTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;

        let id = table.next_id;
        table.next_id += 1;

        let post = Post {
            id,
            title: post.title,
            created_at: post.created_at,
            updated_at: post.created_at,
        };
        table.rows.insert(id, post.clone());

        Ok(post)
    }

    async fn update_title(&self, id: i64, title: String) -> Result<Option<Post>, RepoError> {
        let mut table = self.table.write().await;

        Ok(table.rows.get_mut(&id).map(|post| {
            post.title = title;
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn paginate(&self, request: PageRequest) -> Result<Page<Post>, RepoError> {
        let table = self.table.read().await;

        let items = table
            .rows
            .values()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.per_page).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(Page {
            items,
            total: table.rows.len() as u64,
            request,
        })
    }
}
