use anyhow::Context;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::store::events::EventWithFaculty;

/// The columns the services read back; lookups are keyed by the
/// (student, event) pair instead of these fields.
#[derive(Debug, Clone, FromRow)]
pub struct Registration {
    pub id: Uuid,
    /// NULL until a faculty marks it.
    pub attendance: Option<bool>,
}

/// One roster line: the registered student plus their attendance mark.
#[derive(Debug, Clone, FromRow)]
pub struct RosterEntry {
    pub student_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub attendance: Option<bool>,
}

pub async fn create(db: &PgPool, student_id: Uuid, event_id: Uuid) -> anyhow::Result<Registration> {
    let row = sqlx::query_as::<_, Registration>(
        r#"
        INSERT INTO registrations (id, student_id, event_id)
        VALUES ($1, $2, $3)
        RETURNING id, attendance
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(student_id)
    .bind(event_id)
    .fetch_one(db)
    .await
    .context("insert registration")?;
    Ok(row)
}

pub async fn find_by_student_event(
    db: &PgPool,
    student_id: Uuid,
    event_id: Uuid,
) -> anyhow::Result<Option<Registration>> {
    let row = sqlx::query_as::<_, Registration>(
        r#"
        SELECT id, attendance
        FROM registrations
        WHERE student_id = $1 AND event_id = $2
        "#,
    )
    .bind(student_id)
    .bind(event_id)
    .fetch_optional(db)
    .await
    .context("find registration")?;
    Ok(row)
}

/// Returns how many rows went away, so the caller can 404 on zero.
pub async fn delete(db: &PgPool, student_id: Uuid, event_id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"DELETE FROM registrations WHERE student_id = $1 AND event_id = $2"#,
    )
    .bind(student_id)
    .bind(event_id)
    .execute(db)
    .await
    .context("delete registration")?;
    Ok(result.rows_affected())
}

pub async fn delete_by_event_tx(
    tx: &mut Transaction<'_, Postgres>,
    event_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM registrations WHERE event_id = $1"#)
        .bind(event_id)
        .execute(&mut **tx)
        .await
        .context("delete registrations for event")?;
    Ok(())
}

pub async fn delete_by_student_tx(
    tx: &mut Transaction<'_, Postgres>,
    student_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM registrations WHERE student_id = $1"#)
        .bind(student_id)
        .execute(&mut **tx)
        .await
        .context("delete registrations for student")?;
    Ok(())
}

pub async fn set_attendance(db: &PgPool, id: Uuid, present: bool) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE registrations SET attendance = $2 WHERE id = $1"#)
        .bind(id)
        .bind(present)
        .execute(db)
        .await
        .context("set attendance")?;
    Ok(())
}

pub async fn roster_by_event(db: &PgPool, event_id: Uuid) -> anyhow::Result<Vec<RosterEntry>> {
    let rows = sqlx::query_as::<_, RosterEntry>(
        r#"
        SELECT s.id AS student_id, s.name, s.email, s.phone, s.department,
               r.attendance
        FROM registrations r
        JOIN students s ON s.id = r.student_id
        WHERE r.event_id = $1
        ORDER BY r.created_at
        "#,
    )
    .bind(event_id)
    .fetch_all(db)
    .await
    .context("roster for event")?;
    Ok(rows)
}

pub async fn events_for_student(
    db: &PgPool,
    student_id: Uuid,
) -> anyhow::Result<Vec<EventWithFaculty>> {
    let rows = sqlx::query_as::<_, EventWithFaculty>(
        r#"
        SELECT e.id, e.name, e.description, e.date, e.venue,
               f.name AS faculty_name, f.email AS faculty_email,
               f.department AS faculty_department
        FROM registrations r
        JOIN events e ON e.id = r.event_id
        LEFT JOIN faculties f ON f.id = e.faculty_id
        WHERE r.student_id = $1
        ORDER BY r.created_at
        "#,
    )
    .bind(student_id)
    .fetch_all(db)
    .await
    .context("events for student")?;
    Ok(rows)
}
