use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub faculty: FacultyProfile,
}

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

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Body of the public endpoint reached from the approval mail.
#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub student_id: Uuid,
    pub present: bool,
}

/// An event as the owning faculty sees it; the faculty columns are the
/// caller's own.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: String,
    pub venue: String,
    pub faculty_name: String,
    pub faculty_email: String,
    pub faculty_department: String,
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

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_attendance_request_uses_camel_case() {
        let id = Uuid::new_v4();
        let req: MarkAttendanceRequest =
            serde_json::from_str(&format!(r#"{{"studentId":"{id}","present":true}}"#)).unwrap();
        assert_eq!(req.student_id, id);
        assert!(req.present);
    }

    #[test]
    fn attendance_serializes_null_when_unmarked() {
        let entry = StudentAttendance {
            id: Uuid::new_v4(),
            name: "Asha".into(),
            email: "asha@campus.edu".into(),
            phone: "12345".into(),
            department: "ECE".into(),
            attendance: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""attendance":null"#));
    }
}
