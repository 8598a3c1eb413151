use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faculty {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    /// NULL until the account is approved and the owner set a password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub approved: bool,
    pub created_at: OffsetDateTime,
}

/// Listing row for the admin overview, with the assigned-event count
/// aggregated in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct FacultyWithEventCount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    pub approved: bool,
    pub events_assigned: i64,
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    phone: &str,
    department: &str,
    gender: &str,
) -> anyhow::Result<Faculty> {
    let row = sqlx::query_as::<_, Faculty>(
        r#"
        INSERT INTO faculties (id, name, email, phone, department, gender, password_hash, approved)
        VALUES ($1, $2, $3, $4, $5, $6, NULL, false)
        RETURNING id, name, email, phone, department, gender, password_hash, approved, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(department)
    .bind(gender)
    .fetch_one(db)
    .await
    .context("insert faculty")?;
    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Faculty>> {
    let row = sqlx::query_as::<_, Faculty>(
        r#"
        SELECT id, name, email, phone, department, gender, password_hash, approved, created_at
        FROM faculties
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find faculty by id")?;
    Ok(row)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Faculty>> {
    let row = sqlx::query_as::<_, Faculty>(
        r#"
        SELECT id, name, email, phone, department, gender, password_hash, approved, created_at
        FROM faculties
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
    .context("find faculty by email")?;
    Ok(row)
}

pub async fn list_unapproved(db: &PgPool) -> anyhow::Result<Vec<Faculty>> {
    let rows = sqlx::query_as::<_, Faculty>(
        r#"
        SELECT id, name, email, phone, department, gender, password_hash, approved, created_at
        FROM faculties
        WHERE approved = false
        ORDER BY created_at
        "#,
    )
    .fetch_all(db)
    .await
    .context("list unapproved faculties")?;
    Ok(rows)
}

pub async fn list_with_event_count(db: &PgPool) -> anyhow::Result<Vec<FacultyWithEventCount>> {
    let rows = sqlx::query_as::<_, FacultyWithEventCount>(
        r#"
        SELECT f.id, f.name, f.email, f.phone, f.department, f.gender, f.approved,
               count(e.id) AS events_assigned
        FROM faculties f
        LEFT JOIN events e ON e.faculty_id = f.id
        GROUP BY f.id
        ORDER BY f.created_at
        "#,
    )
    .fetch_all(db)
    .await
    .context("list faculties with event count")?;
    Ok(rows)
}

pub async fn set_approved(db: &PgPool, id: Uuid, approved: bool) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE faculties SET approved = $2 WHERE id = $1"#)
        .bind(id)
        .bind(approved)
        .execute(db)
        .await
        .context("set faculty approved")?;
    Ok(())
}

/// Self-service profile update; email, password and approval are not
/// touchable from here.
pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    name: &str,
    phone: &str,
    department: &str,
    gender: &str,
) -> anyhow::Result<Faculty> {
    let row = sqlx::query_as::<_, Faculty>(
        r#"
        UPDATE faculties
        SET name = $2, phone = $3, department = $4, gender = $5
        WHERE id = $1
        RETURNING id, name, email, phone, department, gender, password_hash, approved, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(phone)
    .bind(department)
    .bind(gender)
    .fetch_one(db)
    .await
    .context("update faculty profile")?;
    Ok(row)
}

/// Admin-side update; the service merges the patch into the loaded row and
/// writes every column back.
pub async fn update_full(
    db: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
    phone: &str,
    department: &str,
    gender: &str,
    approved: bool,
) -> anyhow::Result<Faculty> {
    let row = sqlx::query_as::<_, Faculty>(
        r#"
        UPDATE faculties
        SET name = $2, email = $3, phone = $4, department = $5, gender = $6, approved = $7
        WHERE id = $1
        RETURNING id, name, email, phone, department, gender, password_hash, approved, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(department)
    .bind(gender)
    .bind(approved)
    .fetch_one(db)
    .await
    .context("update faculty")?;
    Ok(row)
}

pub async fn set_password_hash(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE faculties SET password_hash = $2 WHERE id = $1"#)
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await
        .context("set faculty password")?;
    Ok(())
}

pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM faculties WHERE id = $1"#)
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("delete faculty")?;
    Ok(())
}
