use crate::entities::{
    student_profile_entity as student, teacher_profile_entity as teacher, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::access::{find_student, find_teacher};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    pool: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Current user with the role derived from the profiles they hold.
    pub async fn me(&self, user_id: i64) -> AppResult<MeResponse> {
        let user = self.find_user(user_id).await?;
        let student_profile = find_student(self.pool.as_ref(), user_id).await?;
        let teacher_profile = find_teacher(self.pool.as_ref(), user_id).await?;

        Ok(MeResponse {
            user: UserResponse::from(user),
            role: Role::derive(teacher_profile.is_some(), student_profile.is_some()),
            student_profile: student_profile.map(|s| StudentProfileResponse { id: s.id }),
            teacher_profile: teacher_profile.map(TeacherProfileResponse::from),
        })
    }

    pub async fn create_student_profile(&self, user_id: i64) -> AppResult<StudentProfileResponse> {
        if let Some(existing) = find_student(self.pool.as_ref(), user_id).await? {
            return Ok(StudentProfileResponse { id: existing.id });
        }

        let profile = student::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from_insert(e, "Student profile already exists"))?;

        log::info!("Student profile created: user_id={user_id}, profile_id={}", profile.id);
        Ok(StudentProfileResponse { id: profile.id })
    }

    pub async fn create_teacher_profile(
        &self,
        user_id: i64,
        request: CreateTeacherProfileRequest,
    ) -> AppResult<TeacherProfileResponse> {
        if let Some(existing) = find_teacher(self.pool.as_ref(), user_id).await? {
            return Ok(TeacherProfileResponse::from(existing));
        }

        let profile = teacher::ActiveModel {
            user_id: Set(user_id),
            bio: Set(request.bio),
            expertise: Set(request.expertise),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from_insert(e, "Teacher profile already exists"))?;

        log::info!("Teacher profile created: user_id={user_id}, profile_id={}", profile.id);
        Ok(TeacherProfileResponse::from(profile))
    }

    /// Applies name/image to the user and bio/expertise to the teacher profile. Every
    /// check runs before the first write; both writes share one transaction.
    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<MeResponse> {
        let user = self.find_user(user_id).await?;
        let name = match request.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(AppError::ValidationError("Name must not be empty".to_string()));
                }
                Some(name)
            }
            None => None,
        };
        let profile = if request.bio.is_some() || request.expertise.is_some() {
            Some(find_teacher(self.pool.as_ref(), user_id).await?.ok_or_else(|| {
                AppError::PermissionDenied("Teacher profile required".to_string())
            })?)
        } else {
            None
        };

        let now = Utc::now();
        let txn = self.pool.begin().await?;
        if name.is_some() || request.image.is_some() {
            let mut active: users::ActiveModel = user.into();
            if let Some(name) = name {
                active.name = Set(name);
            }
            if let Some(image) = request.image {
                active.image = Set(Some(image));
            }
            active.updated_at = Set(Some(now));
            active.update(&txn).await?;
        }
        if let Some(profile) = profile {
            let mut active: teacher::ActiveModel = profile.into();
            if let Some(bio) = request.bio {
                active.bio = Set(Some(bio));
            }
            if let Some(expertise) = request.expertise {
                active.expertise = Set(Some(expertise));
            }
            active.updated_at = Set(Some(now));
            active.update(&txn).await?;
        }
        txn.commit().await?;

        self.me(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user_row() -> users::Model {
        users::Model {
            id: 7,
            email: "grace@example.com".to_string(),
            name: "Grace".to_string(),
            password_hash: "x".to_string(),
            image: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[actix_web::test]
    async fn test_me_with_both_profiles_is_teacher() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row()]])
            .append_query_results([vec![student::Model {
                id: 3,
                user_id: 7,
                created_at: None,
            }]])
            .append_query_results([vec![teacher::Model {
                id: 5,
                user_id: 7,
                bio: None,
                expertise: Some("Compilers".to_string()),
                created_at: None,
                updated_at: None,
            }]])
            .into_connection();

        let me = UserService::new(Arc::new(db)).me(7).await.unwrap();

        assert_eq!(me.role, Role::Teacher);
        assert_eq!(me.student_profile.map(|s| s.id), Some(3));
        assert_eq!(me.teacher_profile.map(|t| t.id), Some(5));
        let json = serde_json::to_value(Role::Teacher).unwrap();
        assert_eq!(json, "TEACHER");
    }

    #[actix_web::test]
    async fn test_create_student_profile_is_idempotent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![student::Model {
                id: 11,
                user_id: 7,
                created_at: None,
            }]])
            .into_connection();

        let profile = UserService::new(Arc::new(db)).create_student_profile(7).await.unwrap();
        assert_eq!(profile.id, 11);
    }

    #[actix_web::test]
    async fn test_teacher_fields_without_teacher_profile_change_nothing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![user_row()]])
                .append_query_results([Vec::<teacher::Model>::new()])
                .into_connection(),
        );
        let service = UserService::new(db.clone());

        let result = service
            .update_profile(
                7,
                UpdateProfileRequest {
                    name: Some("Grace Hopper".to_string()),
                    bio: Some("Compilers".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::PermissionDenied(_))));

        drop(service);
        let Ok(db) = Arc::try_unwrap(db) else {
            panic!("connection still shared");
        };
        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("UPDATE"), "{log}");
    }
}
