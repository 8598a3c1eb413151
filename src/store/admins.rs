use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Admin>> {
    let row = sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, username, email, password_hash, created_at
        FROM admins
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
    .context("find admin by email")?;
    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Admin>> {
    let row = sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, username, email, password_hash, created_at
        FROM admins
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find admin by id")?;
    Ok(row)
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    username: &str,
    email: &str,
) -> anyhow::Result<Admin> {
    let row = sqlx::query_as::<_, Admin>(
        r#"
        UPDATE admins
        SET username = $2, email = $3
        WHERE id = $1
        RETURNING id, username, email, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .fetch_one(db)
    .await
    .context("update admin profile")?;
    Ok(row)
}

pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE admins SET password_hash = $2 WHERE id = $1"#)
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await
        .context("update admin password")?;
    Ok(())
}
