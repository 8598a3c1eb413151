use uuid::Uuid;

use crate::{
    auth::{
        password::{hash_password, verify_password},
        sessions::{self, Role},
    },
    error::{is_unique_violation, ApiError},
    mailer::send_best_effort,
    state::AppState,
    store,
};

use super::dto::{CreateEventRequest, EventPatch, FacultyPatch, StudentPatch};

pub async fn login(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<(Uuid, store::admins::Admin), ApiError> {
    let admin = store::admins::find_by_email(&state.db, email)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;
    if !verify_password(password, &admin.password_hash)? {
        return Err(ApiError::invalid_credentials());
    }
    let token = sessions::create(
        &state.db,
        Role::Admin,
        admin.id,
        state.config.session.ttl_minutes,
    )
    .await?;
    Ok((token, admin))
}

pub async fn update_profile(
    state: &AppState,
    admin_id: Uuid,
    username: &str,
    email: &str,
) -> Result<store::admins::Admin, ApiError> {
    match store::admins::update_profile(&state.db, admin_id, username, email).await {
        Ok(admin) => Ok(admin),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("email already in use".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update_password(
    state: &AppState,
    admin: &store::admins::Admin,
    current: &str,
    new: &str,
) -> Result<(), ApiError> {
    if !verify_password(current, &admin.password_hash)? {
        return Err(ApiError::BadRequest("current password incorrect".into()));
    }
    let hash = hash_password(new)?;
    store::admins::update_password(&state.db, admin.id, &hash).await?;
    Ok(())
}

/// Link mailed to an approved faculty; the page reads the email back out of
/// the query string, so the value has to be encoded (a bare `+` would decode
/// to a space).
pub(crate) fn password_setup_link(base: &str, email: &str) -> String {
    format!("{base}?email={}", urlencoding::encode(email))
}

pub async fn approve_faculty(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    let faculty = store::faculties::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?;
    store::faculties::set_approved(&state.db, id, true).await?;

    let link = password_setup_link(&state.config.password_setup_url, &faculty.email);
    send_best_effort(
        state.mailer.as_ref(),
        &faculty.email,
        "Faculty Approval",
        &format!(
            "Congratulations {}, your account has been approved.\nSet your password here: {}",
            faculty.name, link
        ),
    )
    .await;
    Ok(())
}

/// Rejection deletes the account outright. Events that were assigned to it
/// fall back to unassigned through the FK rule on `events.faculty_id`.
pub async fn reject_faculty(state: &AppState, id: Uuid, reason: &str) -> Result<(), ApiError> {
    let faculty = store::faculties::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?;

    send_best_effort(
        state.mailer.as_ref(),
        &faculty.email,
        "Faculty Rejected",
        &format!(
            "Sorry {}, your account was rejected.\nReason: {}",
            faculty.name, reason
        ),
    )
    .await;

    let mut tx = state.db.begin().await?;
    sessions::delete_for_principal_tx(&mut tx, Role::Faculty, id).await?;
    store::faculties::delete_tx(&mut tx, id).await?;
    tx.commit().await?;
    Ok(())
}

/// Decides whether deleting a faculty needs a replacement, and which one.
/// Without assigned events there is nothing to move and any given id is
/// ignored. With assigned events a replacement is mandatory and must be a
/// different faculty, or its events would end up unassigned.
pub(crate) fn replacement_plan(
    faculty_id: Uuid,
    has_assigned_events: bool,
    replacement_id: Option<Uuid>,
) -> Result<Option<Uuid>, ApiError> {
    if !has_assigned_events {
        return Ok(None);
    }
    let replacement_id = replacement_id.ok_or_else(|| {
        ApiError::Conflict("faculty has assigned events; provide replacementFacultyId".into())
    })?;
    if replacement_id == faculty_id {
        return Err(ApiError::Conflict(
            "replacement must be a different faculty".into(),
        ));
    }
    Ok(Some(replacement_id))
}

/// A faculty with assigned events can only be deleted with a replacement;
/// every event is moved over before the row goes away.
pub async fn delete_faculty(
    state: &AppState,
    id: Uuid,
    replacement_id: Option<Uuid>,
) -> Result<(), ApiError> {
    store::faculties::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?;

    let assigned = store::events::list_by_faculty(&state.db, id).await?;
    let replacement = match replacement_plan(id, !assigned.is_empty(), replacement_id)? {
        Some(replacement_id) => Some(
            store::faculties::find_by_id(&state.db, replacement_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("replacement faculty not found".into()))?,
        ),
        None => None,
    };

    let mut tx = state.db.begin().await?;
    if let Some(replacement) = replacement {
        store::events::reassign_all_tx(&mut tx, id, replacement.id).await?;
    }
    sessions::delete_for_principal_tx(&mut tx, Role::Faculty, id).await?;
    store::faculties::delete_tx(&mut tx, id).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn update_faculty(
    state: &AppState,
    id: Uuid,
    patch: FacultyPatch,
) -> Result<store::faculties::Faculty, ApiError> {
    let current = store::faculties::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?;

    let name = patch.name.unwrap_or(current.name);
    let email = patch.email.unwrap_or(current.email);
    let phone = patch.phone.unwrap_or(current.phone);
    let department = patch.department.unwrap_or(current.department);
    let gender = patch.gender.unwrap_or(current.gender);
    let approved = patch.approved.unwrap_or(current.approved);

    match store::faculties::update_full(
        &state.db,
        id,
        &name,
        &email,
        &phone,
        &department,
        &gender,
        approved,
    )
    .await
    {
        Ok(faculty) => Ok(faculty),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("email already in use".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update_student(
    state: &AppState,
    id: Uuid,
    patch: StudentPatch,
) -> Result<store::students::Student, ApiError> {
    let current = store::students::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("student not found".into()))?;

    let name = patch.name.unwrap_or(current.name);
    let email = patch.email.unwrap_or(current.email);
    let phone = patch.phone.unwrap_or(current.phone);
    let department = patch.department.unwrap_or(current.department);
    let gender = patch.gender.unwrap_or(current.gender);

    match store::students::update_full(
        &state.db,
        id,
        &name,
        &email,
        &phone,
        &department,
        &gender,
    )
    .await
    {
        Ok(student) => Ok(student),
        Err(e) if is_unique_violation(&e) => {
            Err(ApiError::Conflict("email already in use".into()))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn create_event(
    state: &AppState,
    req: CreateEventRequest,
) -> Result<store::events::Event, ApiError> {
    // A facultyId that does not resolve is an error, never a silent skip.
    let faculty = match req.faculty_id {
        Some(fid) => Some(
            store::faculties::find_by_id(&state.db, fid)
                .await?
                .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?,
        ),
        None => None,
    };

    let event = store::events::create(
        &state.db,
        &req.name,
        &req.description,
        &req.date,
        &req.venue,
        faculty.as_ref().map(|f| f.id),
    )
    .await?;

    if let Some(faculty) = faculty {
        send_best_effort(
            state.mailer.as_ref(),
            &faculty.email,
            "New Event Assigned",
            &format!(
                "You have been assigned to event: {} on {}",
                event.name, event.date
            ),
        )
        .await;
    }
    Ok(event)
}

pub async fn update_event(
    state: &AppState,
    id: Uuid,
    patch: EventPatch,
) -> Result<store::events::Event, ApiError> {
    let current = store::events::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;

    let faculty_id = match patch.faculty_id {
        None => current.faculty_id,
        Some(None) => None,
        Some(Some(fid)) => {
            store::faculties::find_by_id(&state.db, fid)
                .await?
                .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?;
            Some(fid)
        }
    };

    let name = patch.name.unwrap_or(current.name);
    let description = patch.description.unwrap_or(current.description);
    let date = patch.date.unwrap_or(current.date);
    let venue = patch.venue.unwrap_or(current.venue);

    let event =
        store::events::update_full(&state.db, id, &name, &description, &date, &venue, faculty_id)
            .await?;
    Ok(event)
}

/// Registrations go first, then the faculty reference, then the event row.
pub async fn delete_event(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    store::events::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;

    let mut tx = state.db.begin().await?;
    store::registrations::delete_by_event_tx(&mut tx, id).await?;
    store::events::clear_faculty_tx(&mut tx, id).await?;
    store::events::delete_tx(&mut tx, id).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete_student(state: &AppState, id: Uuid) -> Result<(), ApiError> {
    store::students::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("student not found".into()))?;

    let mut tx = state.db.begin().await?;
    store::registrations::delete_by_student_tx(&mut tx, id).await?;
    sessions::delete_for_principal_tx(&mut tx, Role::Student, id).await?;
    store::students::delete_tx(&mut tx, id).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn reassign_event(
    state: &AppState,
    event_id: Uuid,
    new_faculty_id: Uuid,
) -> Result<(), ApiError> {
    store::events::find_by_id(&state.db, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("event not found".into()))?;
    store::faculties::find_by_id(&state.db, new_faculty_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("faculty not found".into()))?;
    store::events::set_faculty(&state.db, event_id, new_faculty_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_link_appends_email_as_query() {
        assert_eq!(
            password_setup_link("http://localhost:5173/faculty/set-password", "rao@campus.edu"),
            "http://localhost:5173/faculty/set-password?email=rao%40campus.edu"
        );
    }

    #[test]
    fn setup_link_survives_decoding_of_special_characters() {
        let link = password_setup_link(
            "http://localhost:5173/faculty/set-password",
            "first.last+tag@dept.campus.edu",
        );
        let (base, query) = link.split_once('?').unwrap();
        assert_eq!(base, "http://localhost:5173/faculty/set-password");

        // A bare '+' in the query would come back as a space on the page.
        let value = query.strip_prefix("email=").unwrap();
        assert!(!value.contains('+'));
        assert_eq!(
            urlencoding::decode(value).unwrap(),
            "first.last+tag@dept.campus.edu"
        );
    }

    #[test]
    fn faculty_without_events_needs_no_replacement() {
        assert_eq!(replacement_plan(Uuid::new_v4(), false, None).unwrap(), None);
        // an id given anyway is simply ignored
        assert_eq!(
            replacement_plan(Uuid::new_v4(), false, Some(Uuid::new_v4())).unwrap(),
            None
        );
    }

    #[test]
    fn faculty_with_events_requires_a_replacement() {
        let err = replacement_plan(Uuid::new_v4(), true, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "faculty has assigned events; provide replacementFacultyId"
        );
    }

    #[test]
    fn replacement_receives_the_assigned_events() {
        let replacement = Uuid::new_v4();
        assert_eq!(
            replacement_plan(Uuid::new_v4(), true, Some(replacement)).unwrap(),
            Some(replacement)
        );
    }

    #[test]
    fn faculty_cannot_replace_itself() {
        let id = Uuid::new_v4();
        let err = replacement_plan(id, true, Some(id)).unwrap_err();
        assert_eq!(err.to_string(), "replacement must be a different faculty");
    }
}
