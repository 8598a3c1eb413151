use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Which principal table a session points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "principal_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

/// What a valid token resolves to: exactly one principal of one role. The
/// entity itself is never stored here; extractors re-load it on every
/// request.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub role: Role,
    pub principal_id: Uuid,
}

/// Creates a session and returns the opaque token handed to the client.
/// Expired rows are swept first, so the table never outgrows live logins.
pub async fn create(
    db: &PgPool,
    role: Role,
    principal_id: Uuid,
    ttl_minutes: i64,
) -> anyhow::Result<Uuid> {
    purge_expired(db).await?;
    let token = Uuid::new_v4();
    let expires_at = OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes);
    sqlx::query(
        r#"
        INSERT INTO sessions (token, role, principal_id, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(token)
    .bind(role)
    .bind(principal_id)
    .bind(expires_at)
    .execute(db)
    .await
    .context("insert session")?;
    Ok(token)
}

/// Looks a token up; expired sessions count as absent.
pub async fn find_valid(db: &PgPool, token: Uuid) -> anyhow::Result<Option<Session>> {
    let row = sqlx::query_as::<_, Session>(
        r#"
        SELECT role, principal_id
        FROM sessions
        WHERE token = $1 AND expires_at > now()
        "#,
    )
    .bind(token)
    .fetch_optional(db)
    .await
    .context("find session")?;
    Ok(row)
}

/// Deletes every expired session row.
pub async fn purge_expired(db: &PgPool) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM sessions WHERE expires_at <= now()"#)
        .execute(db)
        .await
        .context("purge expired sessions")?;
    Ok(())
}

/// Logout: destroys the session unconditionally. Deleting a token that does
/// not exist is not an error.
pub async fn delete(db: &PgPool, token: Uuid) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM sessions WHERE token = $1"#)
        .bind(token)
        .execute(db)
        .await
        .context("delete session")?;
    Ok(())
}

/// Drops every session of a principal; used when the account is deleted so
/// the deletion and the session purge commit together.
pub async fn delete_for_principal_tx(
    tx: &mut Transaction<'_, Postgres>,
    role: Role,
    principal_id: Uuid,
) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM sessions WHERE role = $1 AND principal_id = $2"#)
        .bind(role)
        .bind(principal_id)
        .execute(&mut **tx)
        .await
        .context("delete principal sessions")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(
            serde_json::to_string(&Role::Faculty).unwrap(),
            r#""faculty""#
        );
        assert_eq!(
            serde_json::to_string(&Role::Student).unwrap(),
            r#""student""#
        );
    }
}
