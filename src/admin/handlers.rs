use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::{clear_session_cookie, session_cookie, CurrentAdmin, SessionToken},
        sessions,
    },
    error::ApiError,
    state::AppState,
    store,
};

use super::dto::{
    AdminProfile, CreateEventRequest, DeleteFacultyParams, EventDetails, EventPatch, EventSummary,
    FacultyListItem, FacultyPatch, FacultyProfile, LoginRequest, LoginResponse, MessageResponse,
    RejectParams, StudentAttendance, StudentListItem, StudentPatch, StudentProfile,
    UpdatePasswordRequest, UpdateProfileRequest,
};
use super::services;

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .route("/admin/me", get(me))
        .route("/admin/update", put(update_profile))
        .route("/admin/update-password", put(update_password))
}

pub fn management_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/unapproved-faculties", get(unapproved_faculties))
        .route("/admin/faculties", get(list_faculties))
        .route("/admin/approve-faculty/:id", put(approve_faculty))
        .route("/admin/reject-faculty/:id", put(reject_faculty))
        .route(
            "/admin/faculties/:id",
            put(update_faculty).delete(delete_faculty),
        )
        .route("/admin/students", get(list_students))
        .route(
            "/admin/students/:id",
            put(update_student).delete(delete_student),
        )
        .route("/admin/events", get(list_events))
        .route("/admin/create-event", post(create_event))
        .route("/admin/events/:id", put(update_event).delete(delete_event))
        .route("/admin/events/:event_id/students", get(students_by_event))
        .route(
            "/admin/events/:event_id/reassign/:new_faculty_id",
            put(reassign_event),
        )
}

// --- account ---

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (token, admin) = services::login(&state, &payload.email, &payload.password).await?;
    info!(admin_id = %admin.id, "admin logged in");
    Ok((
        jar.add(session_cookie(token)),
        Json(LoginResponse {
            token,
            admin: AdminProfile {
                id: admin.id,
                username: admin.username,
                email: admin.email,
            },
        }),
    ))
}

/// Destroys the session unconditionally; an absent or unknown token still
/// answers 200.
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
            message: "Logged out".into(),
        }),
    ))
}

#[instrument(skip(admin))]
pub async fn me(CurrentAdmin(admin): CurrentAdmin) -> Json<AdminProfile> {
    Json(AdminProfile {
        id: admin.id,
        username: admin.username,
        email: admin.email,
    })
}

#[instrument(skip(state, admin, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<AdminProfile>, ApiError> {
    let updated =
        services::update_profile(&state, admin.id, &payload.username, &payload.email).await?;
    Ok(Json(AdminProfile {
        id: updated.id,
        username: updated.username,
        email: updated.email,
    }))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::update_password(
        &state,
        &admin,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;
    info!(admin_id = %admin.id, "admin password updated");
    Ok(Json(MessageResponse {
        message: "Password updated".into(),
    }))
}

// --- faculties ---

#[instrument(skip(state))]
pub async fn unapproved_faculties(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
) -> Result<Json<Vec<FacultyProfile>>, ApiError> {
    let faculties = store::faculties::list_unapproved(&state.db).await?;
    let items = faculties
        .into_iter()
        .map(|f| FacultyProfile {
            id: f.id,
            name: f.name,
            email: f.email,
            phone: f.phone,
            department: f.department,
            gender: f.gender,
            approved: f.approved,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn list_faculties(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
) -> Result<Json<Vec<FacultyListItem>>, ApiError> {
    let faculties = store::faculties::list_with_event_count(&state.db).await?;
    let items = faculties
        .into_iter()
        .map(|f| FacultyListItem {
            id: f.id,
            name: f.name,
            email: f.email,
            phone: f.phone,
            department: f.department,
            gender: f.gender,
            approved: f.approved,
            events_assigned: f.events_assigned,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn approve_faculty(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::approve_faculty(&state, id).await?;
    info!(faculty_id = %id, "faculty approved");
    Ok(Json(MessageResponse {
        message: "Faculty approved and email sent".into(),
    }))
}

#[instrument(skip(state, params))]
pub async fn reject_faculty(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
    Query(params): Query<RejectParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::reject_faculty(&state, id, &params.reason).await?;
    info!(faculty_id = %id, "faculty rejected");
    Ok(Json(MessageResponse {
        message: "Faculty rejected and email sent".into(),
    }))
}

#[instrument(skip(state, patch))]
pub async fn update_faculty(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<FacultyPatch>,
) -> Result<Json<FacultyListItem>, ApiError> {
    let faculty = services::update_faculty(&state, id, patch).await?;
    let events_assigned = store::events::list_by_faculty(&state.db, faculty.id)
        .await?
        .len() as i64;
    Ok(Json(FacultyListItem {
        id: faculty.id,
        name: faculty.name,
        email: faculty.email,
        phone: faculty.phone,
        department: faculty.department,
        gender: faculty.gender,
        approved: faculty.approved,
        events_assigned,
    }))
}

#[instrument(skip(state, params))]
pub async fn delete_faculty(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteFacultyParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_faculty(&state, id, params.replacement_faculty_id).await?;
    info!(faculty_id = %id, "faculty deleted");
    Ok(Json(MessageResponse {
        message: "Faculty deleted successfully".into(),
    }))
}

// --- students ---

#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
) -> Result<Json<Vec<StudentListItem>>, ApiError> {
    let students = store::students::list_with_event_count(&state.db).await?;
    let items = students
        .into_iter()
        .map(|s| StudentListItem {
            id: s.id,
            name: s.name,
            email: s.email,
            phone: s.phone,
            department: s.department,
            gender: s.gender,
            event_count: s.event_count,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, patch))]
pub async fn update_student(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<StudentPatch>,
) -> Result<Json<StudentProfile>, ApiError> {
    let student = services::update_student(&state, id, patch).await?;
    Ok(Json(StudentProfile {
        id: student.id,
        name: student.name,
        email: student.email,
        phone: student.phone,
        department: student.department,
        gender: student.gender,
    }))
}

#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_student(&state, id).await?;
    info!(student_id = %id, "student deleted");
    Ok(Json(MessageResponse {
        message: "Student and registered events deleted successfully".into(),
    }))
}

// --- events ---

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
) -> Result<Json<Vec<EventSummary>>, ApiError> {
    let events = store::events::list_with_faculty(&state.db).await?;
    let items = events
        .into_iter()
        .map(|e| EventSummary {
            id: e.id,
            name: e.name,
            description: e.description,
            date: e.date,
            venue: e.venue,
            faculty_name: e.faculty_name.unwrap_or_else(|| "Unassigned".into()),
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_event(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Json(payload): Json<CreateEventRequest>,
) -> Result<Json<EventDetails>, ApiError> {
    let event = services::create_event(&state, payload).await?;
    info!(event_id = %event.id, "event created");
    Ok(Json(EventDetails {
        id: event.id,
        name: event.name,
        description: event.description,
        date: event.date,
        venue: event.venue,
        faculty_id: event.faculty_id,
    }))
}

#[instrument(skip(state, patch))]
pub async fn update_event(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<EventDetails>, ApiError> {
    let event = services::update_event(&state, id, patch).await?;
    Ok(Json(EventDetails {
        id: event.id,
        name: event.name,
        description: event.description,
        date: event.date,
        venue: event.venue,
        faculty_id: event.faculty_id,
    }))
}

#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete_event(&state, id).await?;
    info!(event_id = %id, "event deleted");
    Ok(Json(MessageResponse {
        message: "Event deleted successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn students_by_event(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<StudentAttendance>>, ApiError> {
    store::events::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;
    let roster = store::registrations::roster_by_event(&state.db, event_id).await?;
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

#[instrument(skip(state))]
pub async fn reassign_event(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path((event_id, new_faculty_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::reassign_event(&state, event_id, new_faculty_id).await?;
    info!(%event_id, faculty_id = %new_faculty_id, "event reassigned");
    Ok(Json(MessageResponse {
        message: "Event reassigned successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_carries_token_and_profile() {
        let token = Uuid::new_v4();
        let response = LoginResponse {
            token,
            admin: AdminProfile {
                id: Uuid::new_v4(),
                username: "admin".into(),
                email: "admin@campus.edu".into(),
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(&token.to_string()));
        assert!(json.contains("admin@campus.edu"));
    }
}
