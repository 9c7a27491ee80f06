//! Example repository

use async_trait::async_trait;
use nextbase_common::RepositoryError;
use sqlx::PgPool;

use crate::domain::entities::{Example, ExampleChanges, NewExample};

const EXAMPLE_COLUMNS: &str = "id, title, description, status, is_active, display_order, \
     count, metadata, created_at, updated_at";

#[async_trait]
pub trait ExampleStore: Send + Sync {
    /// Newest first
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Example>, RepositoryError>;

    async fn get(&self, id: &str) -> Result<Option<Example>, RepositoryError>;

    async fn create(&self, example: NewExample) -> Result<Example, RepositoryError>;

    /// `None` when no row has that id
    async fn update(
        &self,
        id: &str,
        changes: ExampleChanges,
    ) -> Result<Option<Example>, RepositoryError>;

    /// Returns the deleted row
    async fn delete(&self, id: &str) -> Result<Option<Example>, RepositoryError>;
}

#[derive(Clone)]
pub struct ExampleRepository {
    pool: PgPool,
}

impl ExampleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExampleStore for ExampleRepository {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Example>, RepositoryError> {
        let query = format!(
            "SELECT {EXAMPLE_COLUMNS} FROM example ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );

        sqlx::query_as::<_, Example>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn get(&self, id: &str) -> Result<Option<Example>, RepositoryError> {
        let query = format!("SELECT {EXAMPLE_COLUMNS} FROM example WHERE id = $1");

        sqlx::query_as::<_, Example>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn create(&self, example: NewExample) -> Result<Example, RepositoryError> {
        let query = format!(
            r#"
            INSERT INTO example (id, title, description, status, is_active, display_order, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {EXAMPLE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Example>(&query)
            .bind(&example.id)
            .bind(&example.title)
            .bind(&example.description)
            .bind(example.status.as_str())
            .bind(example.is_active)
            .bind(example.display_order)
            .bind(&example.metadata)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn update(
        &self,
        id: &str,
        changes: ExampleChanges,
    ) -> Result<Option<Example>, RepositoryError> {
        let query = format!(
            r#"
            UPDATE example SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                is_active = COALESCE($5, is_active),
                display_order = COALESCE($6, display_order),
                metadata = COALESCE($7, metadata),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EXAMPLE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Example>(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.is_active)
            .bind(changes.display_order)
            .bind(&changes.metadata)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn delete(&self, id: &str) -> Result<Option<Example>, RepositoryError> {
        let query = format!("DELETE FROM example WHERE id = $1 RETURNING {EXAMPLE_COLUMNS}");

        sqlx::query_as::<_, Example>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }
}
