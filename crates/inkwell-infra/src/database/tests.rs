use std::collections::BTreeMap;

use chrono::Utc;
use inkwell_core::domain::{NewPost, PageRequest, Post, User};
use inkwell_core::error::RepoError;
use inkwell_core::ports::{BaseRepository, PostRepository, UserRepository};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_model(id: i64, title: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        title: title.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(7, "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Post = repo.find_by_id(7).await.unwrap().unwrap();

    assert_eq!(post.id, 7);
    assert_eq!(post.title, "Test Post");
}

#[tokio::test]
async fn test_find_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let post: Option<Post> = repo.find_by_id(1000).await.unwrap();
    assert!(post.is_none());
}

#[tokio::test]
async fn test_create_returns_assigned_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(1, "El post de prueba")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let created = repo
        .create(NewPost::new(Some("El post de prueba")).unwrap())
        .await
        .unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.title, "El post de prueba");
}

#[tokio::test]
async fn test_update_title_of_missing_post() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let updated = repo.update_title(1000, "nuevo".to_string()).await.unwrap();
    assert!(updated.is_none());
}

#[tokio::test]
async fn test_update_title() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(3, "old")]])
        .append_query_results([vec![post_model(3, "nuevo")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let updated = repo
        .update_title(3, "nuevo".to_string())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, 3);
    assert_eq!(updated.title, "nuevo");
}

#[tokio::test]
async fn test_delete_reports_missing_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    BaseRepository::<Post, i64>::delete(&repo, 5).await.unwrap();
    let second = BaseRepository::<Post, i64>::delete(&repo, 5).await;
    assert!(matches!(second, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_paginate() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([("num_items", Value::from(5i64))])]])
        .append_query_results([vec![post_model(3, "three"), post_model(4, "four")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo
        .paginate(PageRequest::new(Some(2), Some(2)).unwrap())
        .await
        .unwrap();

    assert_eq!(page.total, 5);
    assert_eq!(page.last_page(), 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, 3);
}

#[tokio::test]
async fn test_paginate_past_the_end_skips_row_query() {
    // Only the count query has a result; a row query would fail the mock.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([("num_items", Value::from(5i64))])]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let far = PageRequest {
        page: u64::MAX,
        per_page: 100,
    };
    let page = repo.paginate(far).await.unwrap();

    assert_eq!(page.total, 5);
    assert!(page.items.is_empty());

    let just_past = PageRequest::new(Some(4), Some(2)).unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([("num_items", Value::from(5i64))])]])
        .into_connection();
    let page = PostgresPostRepository::new(db)
        .paginate(just_past)
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.last_page(), 3);
}

fn user_model(email: &str) -> user::Model {
    let now = Utc::now();
    user::Model {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_save_user_returns_stored_row() {
    let stored = user_model("seed@example.com");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user = User {
        id: stored.id,
        email: stored.email.clone(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let saved = repo.save(user).await.unwrap();

    assert_eq!(saved.id, stored.id);
    assert_eq!(saved.email, "seed@example.com");
}

#[tokio::test]
async fn test_find_user_by_email() {
    let stored = user_model("seed@example.com");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![stored.clone()], Vec::new()])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let found = repo.find_by_email("seed@example.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(stored.id));
    assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
}
