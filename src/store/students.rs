use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Listing row for the admin overview, with the registration count
/// aggregated in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct StudentWithEventCount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    pub event_count: i64,
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    phone: &str,
    department: &str,
    gender: &str,
    password_hash: &str,
) -> anyhow::Result<Student> {
    let row = sqlx::query_as::<_, Student>(
        r#"
        INSERT INTO students (id, name, email, phone, department, gender, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, email, phone, department, gender, password_hash, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(department)
    .bind(gender)
    .bind(password_hash)
    .fetch_one(db)
    .await
    .context("insert student")?;
    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Student>> {
    let row = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, name, email, phone, department, gender, password_hash, created_at
        FROM students
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find student by id")?;
    Ok(row)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Student>> {
    let row = sqlx::query_as::<_, Student>(
        r#"
        SELECT id, name, email, phone, department, gender, password_hash, created_at
        FROM students
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
    .context("find student by email")?;
    Ok(row)
}

pub async fn list_with_event_count(db: &PgPool) -> anyhow::Result<Vec<StudentWithEventCount>> {
    let rows = sqlx::query_as::<_, StudentWithEventCount>(
        r#"
        SELECT s.id, s.name, s.email, s.phone, s.department, s.gender,
               count(r.id) AS event_count
        FROM students s
        LEFT JOIN registrations r ON r.student_id = s.id
        GROUP BY s.id
        ORDER BY s.created_at
        "#,
    )
    .fetch_all(db)
    .await
    .context("list students with event count")?;
    Ok(rows)
}

/// Self-service profile update; email and password are not touchable here.
pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    name: &str,
    department: &str,
    phone: &str,
    gender: &str,
) -> anyhow::Result<Student> {
    let row = sqlx::query_as::<_, Student>(
        r#"
        UPDATE students
        SET name = $2, department = $3, phone = $4, gender = $5
        WHERE id = $1
        RETURNING id, name, email, phone, department, gender, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(department)
    .bind(phone)
    .bind(gender)
    .fetch_one(db)
    .await
    .context("update student profile")?;
    Ok(row)
}

/// Admin-side update; the service merges the patch into the loaded row.
pub async fn update_full(
    db: &PgPool,
    id: Uuid,
    name: &str,
    email: &str,
    phone: &str,
    department: &str,
    gender: &str,
) -> anyhow::Result<Student> {
    let row = sqlx::query_as::<_, Student>(
        r#"
        UPDATE students
        SET name = $2, email = $3, phone = $4, department = $5, gender = $6
        WHERE id = $1
        RETURNING id, name, email, phone, department, gender, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(department)
    .bind(gender)
    .fetch_one(db)
    .await
    .context("update student")?;
    Ok(row)
}

pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE students SET password_hash = $2 WHERE id = $1"#)
        .bind(id)
        .bind(password_hash)
        .execute(db)
        .await
        .context("update student password")?;
    Ok(())
}

pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM students WHERE id = $1"#)
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("delete student")?;
    Ok(())
}
