use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::{
    auth::sessions::{self, Role, Session},
    error::ApiError,
    state::AppState,
    store,
};

pub const SESSION_COOKIE: &str = "session";

/// Cookie set on login; carries the same opaque token the body returns.
pub fn session_cookie(token: Uuid) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// The session cookie wins; `Authorization: Bearer <token>` is the fallback
/// for clients that do not keep cookies.
fn token_from_parts(parts: &Parts) -> Option<Uuid> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(token) = Uuid::parse_str(cookie.value()) {
            return Some(token);
        }
    }
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))?;
    Uuid::parse_str(token).ok()
}

/// Raw session token carried by the request, role-agnostic. Logout uses it.
pub struct SessionToken(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for SessionToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, ApiError> {
        token_from_parts(parts)
            .map(SessionToken)
            .ok_or_else(ApiError::not_logged_in)
    }
}

async fn resolve_session(
    state: &AppState,
    parts: &Parts,
    role: Role,
) -> Result<Session, ApiError> {
    let token = token_from_parts(parts).ok_or_else(ApiError::not_logged_in)?;
    let session = sessions::find_valid(&state.db, token)
        .await?
        .ok_or_else(ApiError::not_logged_in)?;
    if session.role != role {
        return Err(ApiError::not_logged_in());
    }
    Ok(session)
}

/// Logged-in admin. The row is loaded fresh from the store on every request
/// so a profile update is visible immediately; nothing is cached in the
/// session.
pub struct CurrentAdmin(pub store::admins::Admin);

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let session = resolve_session(state, parts, Role::Admin).await?;
        let admin = store::admins::find_by_id(&state.db, session.principal_id)
            .await?
            .ok_or_else(ApiError::not_logged_in)?;
        Ok(CurrentAdmin(admin))
    }
}

/// Logged-in faculty. A session outliving its account (deleted or rejected
/// in the meantime) resolves to not-logged-in here.
pub struct CurrentFaculty(pub store::faculties::Faculty);

#[async_trait]
impl FromRequestParts<AppState> for CurrentFaculty {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let session = resolve_session(state, parts, Role::Faculty).await?;
        let faculty = store::faculties::find_by_id(&state.db, session.principal_id)
            .await?
            .ok_or_else(ApiError::not_logged_in)?;
        Ok(CurrentFaculty(faculty))
    }
}

/// Logged-in student.
pub struct CurrentStudent(pub store::students::Student);

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let session = resolve_session(state, parts, Role::Student).await?;
        let student = store::students::find_by_id(&state.db, session.principal_id)
            .await?
            .ok_or_else(ApiError::not_logged_in)?;
        Ok(CurrentStudent(student))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: &str, value: String) -> Parts {
        let (parts, _) = Request::builder()
            .header(header, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn reads_token_from_session_cookie() {
        let token = Uuid::new_v4();
        let parts = parts_with("cookie", format!("session={token}"));
        assert_eq!(token_from_parts(&parts), Some(token));
    }

    #[test]
    fn reads_token_from_bearer_header() {
        let token = Uuid::new_v4();
        let parts = parts_with("authorization", format!("Bearer {token}"));
        assert_eq!(token_from_parts(&parts), Some(token));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let parts = parts_with("cookie", "session=not-a-uuid".into());
        assert_eq!(token_from_parts(&parts), None);

        let parts = parts_with("authorization", "Bearer not-a-uuid".into());
        assert_eq!(token_from_parts(&parts), None);

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(token_from_parts(&parts), None);
    }

    #[test]
    fn session_cookie_is_http_only_and_root_scoped() {
        let cookie = session_cookie(Uuid::new_v4());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
