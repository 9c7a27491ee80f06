//! User repository

use async_trait::async_trait;
use chrono::Utc;
use nextbase_common::RepositoryError;
use sqlx::PgPool;

use crate::domain::entities::{NewUser, User};

const USER_COLUMNS: &str = "id, email, name, profile_image_url, birth_year, birth_month, \
     birth_day, phone_number, status, created_at, updated_at";

/// Persistence of application user rows
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO "user" (id, email, name, status, created_at, updated_at)
            VALUES ($1, $2, $3, 'active', $4, $4)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&query)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.name)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE id = $1"#);

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!(r#"SELECT {USER_COLUMNS} FROM "user" WHERE email = $1"#);

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)
    }
}
