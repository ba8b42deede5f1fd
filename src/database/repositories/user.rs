use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{
    models::{CreateUserInput, User, UserRole},
    utils::sql,
};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user (worker unless a role is given)
    pub async fn create(&self, input: CreateUserInput) -> Result<User> {
        let now = Utc::now();
        let role = input.role.unwrap_or_default();

        let user = sqlx::query_as::<_, User>(&sql(r#"
            INSERT INTO
                users (id, chat_id, name, role, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                id, chat_id, name, role, created_at, updated_at
        "#))
        .bind(Uuid::new_v4().to_string())
        .bind(input.chat_id)
        .bind(input.name)
        .bind(role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, chat_id, name, role, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_chat_id(&self, chat_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, chat_id, name, role, created_at, updated_at FROM users WHERE chat_id = ?",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Resolve a chat identity, creating a worker record on first contact.
    /// The chat identity is immutable; the display name follows the latest
    /// non-empty value the chat layer hands us.
    pub async fn find_or_create_by_chat_id(&self, chat_id: &str, name: &str) -> Result<User> {
        if let Some(user) = self.find_by_chat_id(chat_id).await? {
            if !name.is_empty() && name != user.name {
                return self.update_name(&user.id, name).await;
            }
            return Ok(user);
        }

        self.create(CreateUserInput {
            chat_id: chat_id.to_string(),
            name: name.to_string(),
            role: Some(UserRole::Worker),
        })
        .await
    }

    pub async fn update_name(&self, id: &str, name: &str) -> Result<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(&sql(r#"
            UPDATE users
            SET name = ?, updated_at = ?
            WHERE id = ?
            RETURNING
                id, chat_id, name, role, created_at, updated_at
        "#))
        .bind(name)
        .bind(now)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// All workers, for the reminder sweep and the admin roster
    pub async fn list_workers(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&sql(r#"
            SELECT id, chat_id, name, role, created_at, updated_at
            FROM users
            WHERE role = ?
            ORDER BY name ASC
        "#))
        .bind(UserRole::Worker)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&sql(r#"
            SELECT id, chat_id, name, role, created_at, updated_at
            FROM users
            ORDER BY role ASC, name ASC
        "#))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
