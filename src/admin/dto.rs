use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patch::double_option;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub admin: AdminProfile,
}

#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Faculty as the admin panel lists it, without the event count.
#[derive(Debug, Serialize)]
pub struct FacultyProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    pub approved: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyListItem {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    pub approved: bool,
    pub events_assigned: i64,
}

#[derive(Debug, Serialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListItem {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    pub event_count: i64,
}

/// Event row for the admin table; only the faculty name is joined in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: String,
    pub venue: String,
    pub faculty_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: String,
    pub venue: String,
    pub faculty_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendance {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub attendance: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub name: String,
    pub description: String,
    pub date: String,
    pub venue: String,
    #[serde(default)]
    pub faculty_id: Option<Uuid>,
}

/// Partial event update. `faculty_id` distinguishes three states: absent
/// keeps the current assignment, explicit null clears it, a value assigns
/// that faculty.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub faculty_id: Option<Option<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FacultyPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub approved: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectParams {
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFacultyParams {
    pub replacement_faculty_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_patch_distinguishes_absent_null_and_value() {
        let patch: EventPatch = serde_json::from_str(r#"{"name":"Tech Fest"}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Tech Fest"));
        assert_eq!(patch.faculty_id, None);

        let patch: EventPatch = serde_json::from_str(r#"{"facultyId":null}"#).unwrap();
        assert_eq!(patch.faculty_id, Some(None));

        let id = Uuid::new_v4();
        let patch: EventPatch =
            serde_json::from_str(&format!(r#"{{"facultyId":"{id}"}}"#)).unwrap();
        assert_eq!(patch.faculty_id, Some(Some(id)));
    }

    #[test]
    fn faculty_list_item_uses_camel_case() {
        let item = FacultyListItem {
            id: Uuid::new_v4(),
            name: "Dr. Rao".into(),
            email: "rao@campus.edu".into(),
            phone: "9999".into(),
            department: "CSE".into(),
            gender: "F".into(),
            approved: true,
            events_assigned: 3,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""eventsAssigned":3"#));
    }

    #[test]
    fn update_password_request_uses_camel_case() {
        let req: UpdatePasswordRequest = serde_json::from_str(
            r#"{"currentPassword":"old-secret","newPassword":"new-secret"}"#,
        )
        .unwrap();
        assert_eq!(req.current_password, "old-secret");
        assert_eq!(req.new_password, "new-secret");
    }

    #[test]
    fn event_summary_serializes_faculty_name() {
        let summary = EventSummary {
            id: Uuid::new_v4(),
            name: "Orientation".into(),
            description: "Welcome".into(),
            date: "2025-08-01".into(),
            venue: "Main Hall".into(),
            faculty_name: "Unassigned".into(),
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains(r#""facultyName":"Unassigned""#));
    }
}
