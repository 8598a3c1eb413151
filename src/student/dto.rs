use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub gender: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub student: StudentProfile,
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

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub department: String,
    pub phone: String,
    pub gender: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Event as the catalog shows it; `facultyName` falls back to "Unassigned",
/// the other faculty columns stay null in that case.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: String,
    pub venue: String,
    pub faculty_name: String,
    pub faculty_email: Option<String>,
    pub faculty_department: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
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
    fn update_password_request_uses_camel_case() {
        let req: UpdatePasswordRequest =
            serde_json::from_str(r#"{"oldPassword":"old-secret","newPassword":"new-secret"}"#)
                .unwrap();
        assert_eq!(req.old_password, "old-secret");
        assert_eq!(req.new_password, "new-secret");
    }

    #[test]
    fn attendance_response_keeps_the_three_states() {
        assert_eq!(
            serde_json::to_string(&AttendanceResponse { attendance: None }).unwrap(),
            r#"{"attendance":null}"#
        );
        assert_eq!(
            serde_json::to_string(&AttendanceResponse {
                attendance: Some(true)
            })
            .unwrap(),
            r#"{"attendance":true}"#
        );
        assert_eq!(
            serde_json::to_string(&AttendanceResponse {
                attendance: Some(false)
            })
            .unwrap(),
            r#"{"attendance":false}"#
        );
    }
}
