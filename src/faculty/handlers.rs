use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::{clear_session_cookie, session_cookie, CurrentFaculty, SessionToken},
        sessions,
    },
    error::ApiError,
    state::AppState,
    store,
};

use super::dto::{
    EventItem, FacultyProfile, LoginRequest, LoginResponse, MarkAttendanceRequest,
    MessageResponse, RegisterRequest, SetPasswordRequest, StudentAttendance,
    UpdatePasswordRequest, UpdateProfileRequest,
};
use super::services;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/faculty/register", post(register))
        .route("/faculty/login", post(login))
        .route("/faculty/set-password", post(set_password))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/faculty/logout", post(logout))
        .route("/faculty/me", get(me))
        .route("/faculty/update", put(update_profile))
        .route("/faculty/update-password", put(update_password))
        .route("/faculty/events", get(assigned_events))
        .route("/faculty/events/:event_id/students", get(students_by_event))
        .route("/faculty/events/:event_id/attendance", post(mark_attendance))
}

fn profile(faculty: store::faculties::Faculty) -> FacultyProfile {
    FacultyProfile {
        id: faculty.id,
        name: faculty.name,
        email: faculty.email,
        phone: faculty.phone,
        department: faculty.department,
        gender: faculty.gender,
        approved: faculty.approved,
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let faculty = services::register(&state, payload).await?;
    info!(faculty_id = %faculty.id, email = %faculty.email, "faculty registered");
    Ok(Json(MessageResponse {
        message: "Faculty registered. Wait for admin approval.".into(),
    }))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (token, faculty) = services::login(&state, &payload.email, &payload.password).await?;
    info!(faculty_id = %faculty.id, "faculty logged in");
    Ok((
        jar.add(session_cookie(token)),
        Json(LoginResponse {
            token,
            faculty: profile(faculty),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn set_password(
    State(state): State<AppState>,
    Json(payload): Json<SetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::set_password(&state, &payload.email, &payload.password).await?;
    info!(email = %payload.email, "faculty password set");
    Ok(Json(MessageResponse {
        message: "Password set successfully".into(),
    }))
}

#[instrument(skip(state, jar, token))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    token: Option<SessionToken>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(SessionToken(token)) = token {
        sessions::delete(&state.db, token).await?;
    }
    Ok((
        jar.remove(clear_session_cookie()),
        Json(MessageResponse {
            message: "Faculty logged out successfully".into(),
        }),
    ))
}

#[instrument(skip(faculty))]
pub async fn me(CurrentFaculty(faculty): CurrentFaculty) -> Json<FacultyProfile> {
    Json(profile(faculty))
}

#[instrument(skip(state, faculty, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentFaculty(faculty): CurrentFaculty,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<FacultyProfile>, ApiError> {
    let updated = store::faculties::update_profile(
        &state.db,
        faculty.id,
        &payload.name,
        &payload.phone,
        &payload.department,
        &payload.gender,
    )
    .await?;
    Ok(Json(profile(updated)))
}

#[instrument(skip(state, faculty, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentFaculty(faculty): CurrentFaculty,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::update_password(
        &state,
        &faculty,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;
    info!(faculty_id = %faculty.id, "faculty password updated");
    Ok(Json(MessageResponse {
        message: "Password updated successfully".into(),
    }))
}

#[instrument(skip(state, faculty))]
pub async fn assigned_events(
    State(state): State<AppState>,
    CurrentFaculty(faculty): CurrentFaculty,
) -> Result<Json<Vec<EventItem>>, ApiError> {
    let events = store::events::list_by_faculty(&state.db, faculty.id).await?;
    let items = events
        .into_iter()
        .map(|e| EventItem {
            id: e.id,
            name: e.name,
            description: e.description,
            date: e.date,
            venue: e.venue,
            faculty_name: faculty.name.clone(),
            faculty_email: faculty.email.clone(),
            faculty_department: faculty.department.clone(),
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, faculty))]
pub async fn students_by_event(
    State(state): State<AppState>,
    CurrentFaculty(faculty): CurrentFaculty,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<StudentAttendance>>, ApiError> {
    let roster = services::students_by_event(&state, &faculty, event_id).await?;
    let items = roster
        .into_iter()
        .map(|r| StudentAttendance {
            id: r.student_id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            department: r.department,
            attendance: r.attendance,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, faculty, payload))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    CurrentFaculty(faculty): CurrentFaculty,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::mark_attendance(&state, &faculty, event_id, payload.student_id, payload.present)
        .await?;
    info!(
        %event_id,
        student_id = %payload.student_id,
        present = payload.present,
        "attendance marked"
    );
    let label = if payload.present { "Present" } else { "Absent" };
    Ok(Json(MessageResponse {
        message: format!("Attendance marked as {label}"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn profile_hides_nothing_the_panel_needs() {
        let json = serde_json::to_string(&profile(store::faculties::Faculty {
            id: Uuid::new_v4(),
            name: "Dr. Rao".into(),
            email: "rao@campus.edu".into(),
            phone: "9999".into(),
            department: "CSE".into(),
            gender: "F".into(),
            password_hash: Some("$argon2id$...".into()),
            approved: true,
            created_at: OffsetDateTime::now_utc(),
        }))
        .unwrap();
        assert!(json.contains("rao@campus.edu"));
        assert!(json.contains(r#""approved":true"#));
        assert!(!json.contains("argon2id"));
    }
}
