use crate::entities::{chapter_entity, resource_entity};
use crate::error::{AppError, AppResult};
use crate::models::QuizSummary;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fields are optional so that a missing `title` or `courseId` surfaces as a 400
/// from [`CreateChapterRequest::validate`] rather than a deserializer message.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterRequest {
    pub title: Option<String>,
    pub course_id: Option<i64>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_free: bool,
}

impl CreateChapterRequest {
    /// Returns the trimmed title and the course id.
    pub fn validate(&self) -> AppResult<(String, i64)> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::ValidationError("title is required".to_string()))?;
        let course_id = self
            .course_id
            .ok_or_else(|| AppError::ValidationError("courseId is required".to_string()))?;
        Ok((title.to_string(), course_id))
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_free: Option<bool>,
    /// Storage key returned by the video upload endpoint.
    pub video_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderChaptersRequest {
    pub chapter_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub position: i32,
    pub is_free: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: i64,
    pub chapter_id: i64,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateResourceRequest {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContentResponse {
    pub chapter: ChapterResponse,
    pub resources: Vec<ResourceResponse>,
    pub quizzes: Vec<QuizSummary>,
}

impl From<chapter_entity::Model> for ChapterResponse {
    fn from(m: chapter_entity::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            title: m.title,
            description: m.description,
            video_url: m.video_url,
            position: m.position,
            is_free: m.is_free,
        }
    }
}

impl From<resource_entity::Model> for ResourceResponse {
    fn from(m: resource_entity::Model) -> Self {
        Self {
            id: m.id,
            chapter_id: m.chapter_id,
            name: m.name,
            url: m.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_chapter_requires_title_and_course() {
        let missing_title: CreateChapterRequest =
            serde_json::from_str(r#"{"courseId": 3}"#).unwrap();
        assert!(matches!(
            missing_title.validate(),
            Err(AppError::ValidationError(_))
        ));

        let blank_title: CreateChapterRequest =
            serde_json::from_str(r#"{"title": "   ", "courseId": 3}"#).unwrap();
        assert!(blank_title.validate().is_err());

        let missing_course: CreateChapterRequest =
            serde_json::from_str(r#"{"title": "Intro"}"#).unwrap();
        assert!(missing_course.validate().is_err());

        let ok: CreateChapterRequest =
            serde_json::from_str(r#"{"title": " Intro ", "courseId": 3}"#).unwrap();
        assert_eq!(ok.validate().unwrap(), ("Intro".to_string(), 3));
    }
}
