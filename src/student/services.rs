use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password, is_valid_email, verify_password},
        sessions::{self, Role},
    },
    error::{is_unique_violation, ApiError},
    state::AppState,
    store::{self, registrations::Registration, students::Student},
};

use super::dto::SignupRequest;

/// Signup gate: plausible email, long-enough password, unused email.
pub(crate) fn check_signup(
    req: &SignupRequest,
    existing: Option<&Student>,
) -> Result<(), ApiError> {
    if !is_valid_email(&req.email) {
        return Err(ApiError::BadRequest("invalid email".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest("password too short".into()));
    }
    if existing.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }
    Ok(())
}

pub async fn signup(state: &AppState, req: SignupRequest) -> Result<Student, ApiError> {
    let existing = store::students::find_by_email(&state.db, &req.email).await?;
    check_signup(&req, existing.as_ref())?;
    let hash = hash_password(&req.password)?;
    match store::students::create(
        &state.db,
        &req.name,
        &req.email,
        &req.phone,
        &req.department,
        &req.gender,
        &hash,
    )
    .await
    {
        Ok(student) => Ok(student),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("email already registered".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<(Uuid, Student), ApiError> {
    let student = store::students::find_by_email(&state.db, email)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;
    if !verify_password(password, &student.password_hash)? {
        return Err(ApiError::invalid_credentials());
    }
    let token = sessions::create(
        &state.db,
        Role::Student,
        student.id,
        state.config.session.ttl_minutes,
    )
    .await?;
    Ok((token, student))
}

pub async fn update_password(
    state: &AppState,
    student: &Student,
    old: &str,
    new: &str,
) -> Result<(), ApiError> {
    if !verify_password(old, &student.password_hash)? {
        return Err(ApiError::BadRequest("incorrect old password".into()));
    }
    let hash = hash_password(new)?;
    store::students::update_password(&state.db, student.id, &hash).await?;
    Ok(())
}

/// One registration per (student, event) pair; the pair frees up again once
/// the student unregisters.
pub(crate) fn check_can_register(existing: Option<&Registration>) -> Result<(), ApiError> {
    if existing.is_some() {
        return Err(ApiError::Conflict("already registered for this event".into()));
    }
    Ok(())
}

pub async fn register_event(
    state: &AppState,
    student_id: Uuid,
    event_id: Uuid,
) -> Result<(), ApiError> {
    store::events::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;
    let existing =
        store::registrations::find_by_student_event(&state.db, student_id, event_id).await?;
    check_can_register(existing.as_ref())?;
    match store::registrations::create(&state.db, student_id, event_id).await {
        Ok(_) => Ok(()),
        // Two concurrent registrations race to the UNIQUE constraint.
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("already registered for this event".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Unregistering discards the attendance value along with the registration.
pub async fn unregister_event(
    state: &AppState,
    student_id: Uuid,
    event_id: Uuid,
) -> Result<(), ApiError> {
    store::events::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;
    let deleted = store::registrations::delete(&state.db, student_id, event_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("not registered for this event".into()));
    }
    Ok(())
}

pub async fn get_attendance(
    state: &AppState,
    student_id: Uuid,
    event_id: Uuid,
) -> Result<Option<bool>, ApiError> {
    let registration =
        store::registrations::find_by_student_event(&state.db, student_id, event_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("not registered for this event".into()))?;
    Ok(registration.attendance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn signup_request() -> SignupRequest {
        SignupRequest {
            name: "Asha".into(),
            email: "asha@campus.edu".into(),
            phone: "12345".into(),
            department: "ECE".into(),
            gender: "F".into(),
            password: "long-enough-password".into(),
        }
    }

    fn student(email: &str) -> Student {
        Student {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: email.into(),
            phone: "12345".into(),
            department: "ECE".into(),
            gender: "F".into(),
            password_hash: "unused".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn registration() -> Registration {
        Registration {
            id: Uuid::new_v4(),
            attendance: None,
        }
    }

    #[test]
    fn second_signup_with_the_same_email_conflicts() {
        let req = signup_request();
        assert!(check_signup(&req, None).is_ok());

        let err = check_signup(&req, Some(&student(&req.email))).unwrap_err();
        assert_eq!(err.to_string(), "email already registered");
    }

    #[test]
    fn signup_gate_checks_shape_and_length_first() {
        let mut req = signup_request();
        req.email = "not-an-email".into();
        // shape outranks the duplicate check
        let err = check_signup(&req, Some(&student(&req.email))).unwrap_err();
        assert_eq!(err.to_string(), "invalid email");

        let mut req = signup_request();
        req.password = "short".into();
        assert_eq!(
            check_signup(&req, None).unwrap_err().to_string(),
            "password too short"
        );
    }

    #[test]
    fn unregistering_reopens_registration() {
        // nothing registered yet: allowed
        assert!(check_can_register(None).is_ok());

        // registered: the second attempt conflicts
        let existing = registration();
        let err = check_can_register(Some(&existing)).unwrap_err();
        assert_eq!(err.to_string(), "already registered for this event");

        // unregistered again, the row is gone: allowed again
        assert!(check_can_register(None).is_ok());
    }
}
