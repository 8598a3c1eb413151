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
        extractors::{clear_session_cookie, session_cookie, CurrentStudent, SessionToken},
        sessions,
    },
    error::ApiError,
    state::AppState,
    store::{self, events::EventWithFaculty},
};

use super::dto::{
    AttendanceResponse, EventResponse, LoginRequest, LoginResponse, MessageResponse,
    SignupRequest, StudentProfile, UpdatePasswordRequest, UpdateProfileRequest,
};
use super::services;

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/students/signup", post(signup))
        .route("/students/login", post(login))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/students/logout", post(logout))
        .route("/students/profile", get(get_profile).put(update_profile))
        .route("/students/profile/password", put(update_password))
        .route("/students/register-event/:event_id", post(register_event))
        .route(
            "/students/unregister-event/:event_id",
            post(unregister_event),
        )
        .route("/students/events", get(list_events))
        .route("/students/registered-events", get(registered_events))
        .route("/students/events/:event_id/attendance", get(get_attendance))
}

fn profile(student: store::students::Student) -> StudentProfile {
    StudentProfile {
        id: student.id,
        name: student.name,
        email: student.email,
        phone: student.phone,
        department: student.department,
        gender: student.gender,
    }
}

fn event_response(e: EventWithFaculty) -> EventResponse {
    EventResponse {
        id: e.id,
        name: e.name,
        description: e.description,
        date: e.date,
        venue: e.venue,
        faculty_name: e.faculty_name.unwrap_or_else(|| "Unassigned".into()),
        faculty_email: e.faculty_email,
        faculty_department: e.faculty_department,
    }
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let student = services::signup(&state, payload).await?;
    info!(student_id = %student.id, email = %student.email, "student signed up");
    Ok(Json(MessageResponse {
        message: "Signup successful".into(),
    }))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (token, student) = services::login(&state, &payload.email, &payload.password).await?;
    info!(student_id = %student.id, "student logged in");
    Ok((
        jar.add(session_cookie(token)),
        Json(LoginResponse {
            token,
            student: profile(student),
        }),
    ))
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
            message: "Logged out successfully".into(),
        }),
    ))
}

#[instrument(skip(student))]
pub async fn get_profile(CurrentStudent(student): CurrentStudent) -> Json<StudentProfile> {
    Json(profile(student))
}

#[instrument(skip(state, student, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<StudentProfile>, ApiError> {
    let updated = store::students::update_profile(
        &state.db,
        student.id,
        &payload.name,
        &payload.department,
        &payload.phone,
        &payload.gender,
    )
    .await?;
    Ok(Json(profile(updated)))
}

#[instrument(skip(state, student, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::update_password(&state, &student, &payload.old_password, &payload.new_password)
        .await?;
    info!(student_id = %student.id, "student password updated");
    Ok(Json(MessageResponse {
        message: "Password updated successfully".into(),
    }))
}

#[instrument(skip(state, student))]
pub async fn register_event(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(event_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::register_event(&state, student.id, event_id).await?;
    info!(student_id = %student.id, %event_id, "student registered for event");
    Ok(Json(MessageResponse {
        message: "Event registered successfully".into(),
    }))
}

#[instrument(skip(state, student))]
pub async fn unregister_event(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(event_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::unregister_event(&state, student.id, event_id).await?;
    info!(student_id = %student.id, %event_id, "student unregistered from event");
    Ok(Json(MessageResponse {
        message: "Unregistered from event".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    CurrentStudent(_): CurrentStudent,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = store::events::list_with_faculty(&state.db).await?;
    Ok(Json(events.into_iter().map(event_response).collect()))
}

#[instrument(skip(state, student))]
pub async fn registered_events(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let events = store::registrations::events_for_student(&state.db, student.id).await?;
    Ok(Json(events.into_iter().map(event_response).collect()))
}

#[instrument(skip(state, student))]
pub async fn get_attendance(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(event_id): Path<Uuid>,
) -> Result<Json<AttendanceResponse>, ApiError> {
    let attendance = services::get_attendance(&state, student.id, event_id).await?;
    Ok(Json(AttendanceResponse { attendance }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn unassigned_event_reads_unassigned_with_null_contact() {
        let json = serde_json::to_string(&event_response(EventWithFaculty {
            id: Uuid::new_v4(),
            name: "Orientation".into(),
            description: "Welcome".into(),
            date: "2025-08-01".into(),
            venue: "Main Hall".into(),
            faculty_name: None,
            faculty_email: None,
            faculty_department: None,
        }))
        .unwrap();
        assert!(json.contains(r#""facultyName":"Unassigned""#));
        assert!(json.contains(r#""facultyEmail":null"#));
    }

    #[test]
    fn profile_never_carries_the_hash() {
        let json = serde_json::to_string(&profile(store::students::Student {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@campus.edu".into(),
            phone: "12345".into(),
            department: "ECE".into(),
            gender: "F".into(),
            password_hash: "$argon2id$...".into(),
            created_at: OffsetDateTime::now_utc(),
        }))
        .unwrap();
        assert!(json.contains("asha@campus.edu"));
        assert!(!json.contains("argon2id"));
    }
}
