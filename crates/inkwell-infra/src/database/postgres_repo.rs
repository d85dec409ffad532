//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use inkwell_core::domain::{NewPost, Page, PageRequest, Post, User};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: User) -> Result<User, RepoError> {
        let active: user::ActiveModel = user.into();

        let model = UserEntity::insert(active)
            .on_conflict(
                OnConflict::column(user::Column::Id)
                    .update_columns([user::Column::Email, user::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let active: post::ActiveModel = post.into();
        let model = active.insert(&self.db).await.map_err(repo_error)?;

        tracing::debug!(post_id = model.id, "Post inserted");
        Ok(model.into())
    }

    async fn update_title(&self, id: i64, title: String) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(repo_error)?
        else {
            return Ok(None);
        };

        let mut active: post::ActiveModel = model.into();
        active.title = Set(title);
        active.updated_at = Set(Utc::now().into());

        match active.update(&self.db).await {
            Ok(model) => Ok(Some(model.into())),
            // Deleted between the lookup and the update.
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(repo_error(e)),
        }
    }

    async fn paginate(&self, request: PageRequest) -> Result<Page<Post>, RepoError> {
        let paginator = PostEntity::find()
            .order_by_asc(post::Column::Id)
            .paginate(&self.db, request.per_page);

        let total = paginator.num_items().await.map_err(repo_error)?;

        // Past the end: skip the row query so the paginator never computes
        // an offset for an arbitrarily large page.
        if request.offset() >= total {
            return Ok(Page {
                items: Vec::new(),
                total,
                request,
            });
        }

        let models = paginator
            .fetch_page(request.page - 1)
            .await
            .map_err(repo_error)?;

        Ok(Page {
            items: models.into_iter().map(Into::into).collect(),
            total,
            request,
        })
    }
}
