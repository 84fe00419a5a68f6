//! Profile and ownership lookups shared by the services.

use crate::entities::{
    EnrollmentStatus, chapter_entity as chapter, course_entity as course,
    enrollment_entity as enrollment, student_profile_entity as student,
    teacher_profile_entity as teacher,
};
use crate::error::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub async fn find_student(
    pool: &DatabaseConnection,
    user_id: i64,
) -> AppResult<Option<student::Model>> {
    Ok(student::Entity::find()
        .filter(student::Column::UserId.eq(user_id))
        .one(pool)
        .await?)
}

pub async fn find_teacher(
    pool: &DatabaseConnection,
    user_id: i64,
) -> AppResult<Option<teacher::Model>> {
    Ok(teacher::Entity::find()
        .filter(teacher::Column::UserId.eq(user_id))
        .one(pool)
        .await?)
}

pub async fn require_student(pool: &DatabaseConnection, user_id: i64) -> AppResult<student::Model> {
    find_student(pool, user_id)
        .await?
        .ok_or_else(|| AppError::PermissionDenied("Student profile required".to_string()))
}

pub async fn require_teacher(pool: &DatabaseConnection, user_id: i64) -> AppResult<teacher::Model> {
    find_teacher(pool, user_id)
        .await?
        .ok_or_else(|| AppError::PermissionDenied("Teacher profile required".to_string()))
}

/// Loads a course and checks that the caller's teacher profile owns it.
pub async fn owned_course(
    pool: &DatabaseConnection,
    user_id: i64,
    course_id: i64,
) -> AppResult<course::Model> {
    let teacher = require_teacher(pool, user_id).await?;
    let course = course::Entity::find_by_id(course_id)
        .one(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    if course.teacher_id != teacher.id {
        return Err(AppError::Forbidden);
    }
    Ok(course)
}

/// Loads a chapter together with its course, checking course ownership.
pub async fn owned_chapter(
    pool: &DatabaseConnection,
    user_id: i64,
    chapter_id: i64,
) -> AppResult<(course::Model, chapter::Model)> {
    let chapter = chapter::Entity::find_by_id(chapter_id)
        .one(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Chapter not found".to_string()))?;
    let course = owned_course(pool, user_id, chapter.course_id).await?;
    Ok((course, chapter))
}

/// A free chapter is open to everyone signed in; otherwise the viewer must own the
/// course or hold a completed enrollment.
pub fn can_view_chapter(
    chapter_is_free: bool,
    is_owner: bool,
    enrollment_status: Option<EnrollmentStatus>,
) -> bool {
    chapter_is_free || is_owner || enrollment_status == Some(EnrollmentStatus::Completed)
}

/// Returns whether the viewer owns the course. A draft course is 404 for everyone
/// but its owner; a locked chapter of a published course is 403.
pub async fn ensure_chapter_access(
    pool: &DatabaseConnection,
    user_id: i64,
    course: &course::Model,
    chapter: &chapter::Model,
) -> AppResult<bool> {
    let is_owner = match find_teacher(pool, user_id).await? {
        Some(t) => t.id == course.teacher_id,
        None => false,
    };
    if !course.is_published && !is_owner {
        return Err(AppError::NotFound("Course not found".to_string()));
    }
    if chapter.is_free || is_owner {
        return Ok(is_owner);
    }

    let status = match find_student(pool, user_id).await? {
        Some(s) => enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(s.id))
            .filter(enrollment::Column::CourseId.eq(course.id))
            .one(pool)
            .await?
            .map(|e| e.status),
        None => None,
    };

    if can_view_chapter(chapter.is_free, is_owner, status) {
        Ok(is_owner)
    } else {
        Err(AppError::PermissionDenied(
            "Purchase the course to unlock this chapter".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_view_chapter() {
        assert!(can_view_chapter(true, false, None));
        assert!(can_view_chapter(false, true, None));
        assert!(can_view_chapter(false, false, Some(EnrollmentStatus::Completed)));
        assert!(!can_view_chapter(false, false, Some(EnrollmentStatus::Pending)));
        assert!(!can_view_chapter(false, false, None));
    }
}
