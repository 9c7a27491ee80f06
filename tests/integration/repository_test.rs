//! Postgres-backed repository tests
//!
//! Run against `TEST_DATABASE_URL` (or `DATABASE_URL`) after applying the
//! workspace migrations. Skipped when neither is set.

use std::env;

use nextbase_accounts::{NewUser, UserRepository, UserStatus, UserStore};
use nextbase_common::RepositoryError;
use nextbase_example::{
    ExampleChanges, ExampleRepository, ExampleStatus, ExampleStore, NewExample,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn database() -> Option<PgPool> {
    dotenvy::from_filename(".env.test").ok();
    let url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()?;

    let pool = PgPool::connect(&url)
        .await
        .expect("test database should be reachable");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("migrations should apply");
    Some(pool)
}

fn new_example(title: &str) -> NewExample {
    NewExample {
        id: format!("example_test_{}", Uuid::new_v4().simple()),
        title: title.to_string(),
        description: None,
        status: ExampleStatus::Draft,
        is_active: true,
        display_order: 0,
        metadata: None,
    }
}

#[tokio::test]
async fn test_example_create_and_get() {
    let Some(pool) = database().await else {
        return;
    };
    let repo = ExampleRepository::new(pool);

    let mut input = new_example("Created");
    input.status = ExampleStatus::Published;
    input.metadata = Some(json!({ "tags": ["a", "b"] }));
    let created = repo.create(input.clone()).await.unwrap();

    assert_eq!(created.id, input.id);
    assert_eq!(created.status, ExampleStatus::Published);
    assert_eq!(created.count, 0);
    assert_eq!(created.metadata, Some(json!({ "tags": ["a", "b"] })));

    let fetched = repo.get(&input.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert!(repo.get("example_missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_example_duplicate_id_is_already_exists() {
    let Some(pool) = database().await else {
        return;
    };
    let repo = ExampleRepository::new(pool);

    let input = new_example("Original");
    repo.create(input.clone()).await.unwrap();

    let err = repo.create(input).await.unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists));
}

#[tokio::test]
async fn test_example_list_is_newest_first() {
    let Some(pool) = database().await else {
        return;
    };
    let repo = ExampleRepository::new(pool);

    let older = repo.create(new_example("Older")).await.unwrap();
    let newer = repo.create(new_example("Newer")).await.unwrap();

    let rows = repo.list(100, 0).await.unwrap();
    let position = |id: &str| rows.iter().position(|row| row.id == id).unwrap();
    assert!(position(&newer.id) < position(&older.id));

    let page = repo.list(1, 0).await.unwrap();
    assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn test_example_update_only_touches_given_fields() {
    let Some(pool) = database().await else {
        return;
    };
    let repo = ExampleRepository::new(pool);

    let mut input = new_example("Before");
    input.description = Some("kept".to_string());
    input.display_order = 3;
    let created = repo.create(input).await.unwrap();

    let updated = repo
        .update(
            &created.id,
            ExampleChanges {
                title: Some("After".to_string()),
                status: Some(ExampleStatus::Archived),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "After");
    assert_eq!(updated.status, ExampleStatus::Archived);
    assert_eq!(updated.description.as_deref(), Some("kept"));
    assert_eq!(updated.display_order, 3);
    assert!(updated.is_active);
    assert!(updated.updated_at >= created.updated_at);

    let missing = repo
        .update("example_missing", ExampleChanges::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_example_delete_returns_removed_row() {
    let Some(pool) = database().await else {
        return;
    };
    let repo = ExampleRepository::new(pool);

    let created = repo.create(new_example("Doomed")).await.unwrap();

    let deleted = repo.delete(&created.id).await.unwrap().unwrap();
    assert_eq!(deleted.id, created.id);
    assert_eq!(deleted.title, "Doomed");
    assert!(repo.get(&created.id).await.unwrap().is_none());
    assert!(repo.delete(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_create_and_find() {
    let Some(pool) = database().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let id = Uuid::new_v4().to_string();
    let email = format!("user_{}@nextbase.test", Uuid::new_v4().simple());
    let created = repo
        .create(NewUser {
            id: id.clone(),
            email: email.clone(),
            name: Some("Test User".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(created.status, UserStatus::Active);
    assert_eq!(created.name.as_deref(), Some("Test User"));
    assert!(created.phone_number.is_none());

    assert_eq!(repo.find_by_id(&id).await.unwrap(), Some(created.clone()));
    assert_eq!(repo.find_by_email(&email).await.unwrap(), Some(created));
    assert!(repo
        .find_by_email("nobody@nextbase.test")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_user_email_is_unique() {
    let Some(pool) = database().await else {
        return;
    };
    let repo = UserRepository::new(pool);

    let email = format!("dup_{}@nextbase.test", Uuid::new_v4().simple());
    repo.create(NewUser {
        id: Uuid::new_v4().to_string(),
        email: email.clone(),
        name: None,
    })
    .await
    .unwrap();

    let err = repo
        .create(NewUser {
            id: Uuid::new_v4().to_string(),
            email,
            name: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists));
}
