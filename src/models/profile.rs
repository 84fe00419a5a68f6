use crate::entities::teacher_profile_entity;
use crate::models::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Derived from which profiles a user holds; a teacher profile wins over a student one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Teacher,
    Student,
    User,
}

impl Role {
    pub fn derive(has_teacher_profile: bool, has_student_profile: bool) -> Self {
        if has_teacher_profile {
            Role::Teacher
        } else if has_student_profile {
            Role::Student
        } else {
            Role::User
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfileResponse {
    pub id: i64,
    pub bio: Option<String>,
    pub expertise: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: UserResponse,
    pub role: Role,
    pub student_profile: Option<StudentProfileResponse>,
    pub teacher_profile: Option<TeacherProfileResponse>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateTeacherProfileRequest {
    pub bio: Option<String>,
    pub expertise: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    /// Only applied when the user has a teacher profile.
    pub bio: Option<String>,
    pub expertise: Option<String>,
}

impl From<teacher_profile_entity::Model> for TeacherProfileResponse {
    fn from(m: teacher_profile_entity::Model) -> Self {
        Self {
            id: m.id,
            bio: m.bio,
            expertise: m.expertise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teacher_profile_takes_precedence() {
        assert_eq!(Role::derive(true, true), Role::Teacher);
        assert_eq!(Role::derive(true, false), Role::Teacher);
        assert_eq!(Role::derive(false, true), Role::Student);
        assert_eq!(Role::derive(false, false), Role::User);
    }

    #[test]
    fn test_role_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"TEACHER\"");
    }
}
