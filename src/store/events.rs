use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Free text, as entered by the admin; never parsed.
    pub date: String,
    pub venue: String,
    /// NULL = unassigned.
    pub faculty_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Event joined with its assigned faculty, for listings. The faculty
/// columns are NULL when the event is unassigned.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithFaculty {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: String,
    pub venue: String,
    pub faculty_name: Option<String>,
    pub faculty_email: Option<String>,
    pub faculty_department: Option<String>,
}

pub async fn create(
    db: &PgPool,
    name: &str,
    description: &str,
    date: &str,
    venue: &str,
    faculty_id: Option<Uuid>,
) -> anyhow::Result<Event> {
    let row = sqlx::query_as::<_, Event>(
        r#"
        INSERT INTO events (id, name, description, date, venue, faculty_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, description, date, venue, faculty_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(date)
    .bind(venue)
    .bind(faculty_id)
    .fetch_one(db)
    .await
    .context("insert event")?;
    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Event>> {
    let row = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, name, description, date, venue, faculty_id, created_at
        FROM events
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find event by id")?;
    Ok(row)
}

pub async fn list_with_faculty(db: &PgPool) -> anyhow::Result<Vec<EventWithFaculty>> {
    let rows = sqlx::query_as::<_, EventWithFaculty>(
        r#"
        SELECT e.id, e.name, e.description, e.date, e.venue,
               f.name AS faculty_name, f.email AS faculty_email,
               f.department AS faculty_department
        FROM events e
        LEFT JOIN faculties f ON f.id = e.faculty_id
        ORDER BY e.created_at
        "#,
    )
    .fetch_all(db)
    .await
    .context("list events")?;
    Ok(rows)
}

pub async fn list_by_faculty(db: &PgPool, faculty_id: Uuid) -> anyhow::Result<Vec<Event>> {
    let rows = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, name, description, date, venue, faculty_id, created_at
        FROM events
        WHERE faculty_id = $1
        ORDER BY created_at
        "#,
    )
    .bind(faculty_id)
    .fetch_all(db)
    .await
    .context("list events by faculty")?;
    Ok(rows)
}

/// Full-row update; the service merges the patch into the loaded row first.
pub async fn update_full(
    db: &PgPool,
    id: Uuid,
    name: &str,
    description: &str,
    date: &str,
    venue: &str,
    faculty_id: Option<Uuid>,
) -> anyhow::Result<Event> {
    let row = sqlx::query_as::<_, Event>(
        r#"
        UPDATE events
        SET name = $2, description = $3, date = $4, venue = $5, faculty_id = $6
        WHERE id = $1
        RETURNING id, name, description, date, venue, faculty_id, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(date)
    .bind(venue)
    .bind(faculty_id)
    .fetch_one(db)
    .await
    .context("update event")?;
    Ok(row)
}

pub async fn set_faculty(db: &PgPool, id: Uuid, faculty_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE events SET faculty_id = $2 WHERE id = $1"#)
        .bind(id)
        .bind(faculty_id)
        .execute(db)
        .await
        .context("set event faculty")?;
    Ok(())
}

/// Moves every event of one faculty to another in a single statement; part
/// of the delete-faculty transaction.
pub async fn reassign_all_tx(
    tx: &mut Transaction<'_, Postgres>,
    from_faculty: Uuid,
    to_faculty: Uuid,
) -> anyhow::Result<u64> {
    let result = sqlx::query(r#"UPDATE events SET faculty_id = $2 WHERE faculty_id = $1"#)
        .bind(from_faculty)
        .bind(to_faculty)
        .execute(&mut **tx)
        .await
        .context("reassign events")?;
    Ok(result.rows_affected())
}

pub async fn clear_faculty_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"UPDATE events SET faculty_id = NULL WHERE id = $1"#)
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("clear event faculty")?;
    Ok(())
}

pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM events WHERE id = $1"#)
        .bind(id)
        .execute(&mut **tx)
        .await
        .context("delete event")?;
    Ok(())
}
