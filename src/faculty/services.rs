use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password, is_valid_email, verify_password},
        sessions::{self, Role},
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
    store::{self, events::Event, faculties::Faculty, registrations::Registration},
};

use super::dto::RegisterRequest;

/// Registration gate: plausible email, unused email.
pub(crate) fn check_register(
    req: &RegisterRequest,
    existing: Option<&Faculty>,
) -> Result<(), ApiError> {
    if !is_valid_email(&req.email) {
        return Err(ApiError::BadRequest("invalid email".into()));
    }
    if existing.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }
    Ok(())
}

pub async fn register(state: &AppState, req: RegisterRequest) -> Result<Faculty, ApiError> {
    let existing = store::faculties::find_by_email(&state.db, &req.email).await?;
    check_register(&req, existing.as_ref())?;
    match store::faculties::create(
        &state.db,
        &req.name,
        &req.email,
        &req.phone,
        &req.department,
        &req.gender,
    )
    .await
    {
        Ok(faculty) => Ok(faculty),
        // Unique index backs the check above up against a concurrent insert.
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("email already registered".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// The login gate, in order: approval, password presence, password match.
/// Only the first two identify their cause; a bad password answers exactly
/// like an unknown email.
pub(crate) fn check_login(faculty: &Faculty, password: &str) -> Result<(), ApiError> {
    if !faculty.approved {
        return Err(ApiError::Unauthorized("account not approved yet".into()));
    }
    let Some(hash) = faculty.password_hash.as_deref() else {
        return Err(ApiError::Unauthorized("password not set yet".into()));
    };
    if !verify_password(password, hash)? {
        return Err(ApiError::invalid_credentials());
    }
    Ok(())
}

pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<(Uuid, Faculty), ApiError> {
    let faculty = store::faculties::find_by_email(&state.db, email)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;
    check_login(&faculty, password)?;
    let token = sessions::create(
        &state.db,
        Role::Faculty,
        faculty.id,
        state.config.session.ttl_minutes,
    )
    .await?;
    Ok((token, faculty))
}

pub async fn update_password(
    state: &AppState,
    faculty: &Faculty,
    current: &str,
    new: &str,
) -> Result<(), ApiError> {
    let verified = match faculty.password_hash.as_deref() {
        Some(hash) => verify_password(current, hash)?,
        None => false,
    };
    if !verified {
        return Err(ApiError::BadRequest("current password incorrect".into()));
    }
    let hash = hash_password(new)?;
    store::faculties::set_password_hash(&state.db, faculty.id, &hash).await?;
    Ok(())
}

/// Reached from the approval mail; identified by email only, since the mail
/// link carries no token.
pub async fn set_password(state: &AppState, email: &str, password: &str) -> Result<(), ApiError> {
    let faculty = store::faculties::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?;
    if password.len() < 8 {
        return Err(ApiError::BadRequest("password too short".into()));
    }
    let hash = hash_password(password)?;
    store::faculties::set_password_hash(&state.db, faculty.id, &hash).await?;
    Ok(())
}

pub(crate) fn check_ownership(event: &Event, faculty_id: Uuid) -> Result<(), ApiError> {
    if event.faculty_id != Some(faculty_id) {
        return Err(ApiError::Unauthorized("not assigned to this event".into()));
    }
    Ok(())
}

pub async fn students_by_event(
    state: &AppState,
    faculty: &Faculty,
    event_id: Uuid,
) -> Result<Vec<store::registrations::RosterEntry>, ApiError> {
    let event = store::events::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;
    check_ownership(&event, faculty.id)?;
    Ok(store::registrations::roster_by_event(&state.db, event_id).await?)
}

/// Marking requires an existing registration; it never creates one.
pub(crate) fn check_registration(
    registration: Option<Registration>,
) -> Result<Registration, ApiError> {
    registration.ok_or_else(|| ApiError::NotFound("student not registered for this event".into()))
}

pub async fn mark_attendance(
    state: &AppState,
    faculty: &Faculty,
    event_id: Uuid,
    student_id: Uuid,
    present: bool,
) -> Result<(), ApiError> {
    let event = store::events::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;
    check_ownership(&event, faculty.id)?;
    store::students::find_by_id(&state.db, student_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("student not found".into()))?;
    let registration = check_registration(
        store::registrations::find_by_student_event(&state.db, student_id, event_id).await?,
    )?;
    store::registrations::set_attendance(&state.db, registration.id, present).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn faculty(approved: bool, password_hash: Option<String>) -> Faculty {
        Faculty {
            id: Uuid::new_v4(),
            name: "Dr. Rao".into(),
            email: "rao@campus.edu".into(),
            phone: "9999".into(),
            department: "CSE".into(),
            gender: "F".into(),
            password_hash,
            approved,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn unapproved_faculty_cannot_log_in_even_with_password() {
        let hash = hash_password("secret-password").unwrap();
        let err = check_login(&faculty(false, Some(hash)), "secret-password").unwrap_err();
        assert_eq!(err.to_string(), "account not approved yet");
    }

    #[test]
    fn approved_but_passwordless_faculty_is_told_to_set_one() {
        let err = check_login(&faculty(true, None), "anything").unwrap_err();
        assert_eq!(err.to_string(), "password not set yet");
    }

    #[test]
    fn wrong_password_reads_like_unknown_email() {
        let hash = hash_password("secret-password").unwrap();
        let err = check_login(&faculty(true, Some(hash)), "wrong").unwrap_err();
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn correct_password_passes_the_gate() {
        let hash = hash_password("secret-password").unwrap();
        assert!(check_login(&faculty(true, Some(hash)), "secret-password").is_ok());
    }

    #[test]
    fn ownership_rejects_other_and_unassigned_events() {
        let faculty_id = Uuid::new_v4();
        let mut event = Event {
            id: Uuid::new_v4(),
            name: "Tech Fest".into(),
            description: "Annual fest".into(),
            date: "2025-09-01".into(),
            venue: "Auditorium".into(),
            faculty_id: Some(faculty_id),
            created_at: OffsetDateTime::now_utc(),
        };
        assert!(check_ownership(&event, faculty_id).is_ok());

        assert!(check_ownership(&event, Uuid::new_v4()).is_err());

        event.faculty_id = None;
        assert!(check_ownership(&event, faculty_id).is_err());
    }

    #[test]
    fn second_register_with_the_same_email_conflicts() {
        let req = RegisterRequest {
            name: "Dr. Rao".into(),
            email: "rao@campus.edu".into(),
            phone: "9999".into(),
            department: "CSE".into(),
            gender: "F".into(),
        };
        assert!(check_register(&req, None).is_ok());

        let err = check_register(&req, Some(&faculty(false, None))).unwrap_err();
        assert_eq!(err.to_string(), "email already registered");
    }

    #[test]
    fn marking_requires_an_existing_registration() {
        let err = check_registration(None).unwrap_err();
        assert_eq!(err.to_string(), "student not registered for this event");

        let id = Uuid::new_v4();
        let registration = check_registration(Some(Registration {
            id,
            attendance: None,
        }))
        .unwrap();
        assert_eq!(registration.id, id);
    }
}
