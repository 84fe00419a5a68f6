use crate::entities::{category_entity, chapter_entity, course_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Programming")]
    pub name: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseQuery {
    pub category_id: Option<i64>,
    /// Case-insensitive match on the title.
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[schema(example = "Rust for Web Developers")]
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub price: i64,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub price: Option<i64>,
    /// Storage key returned by the thumbnail upload endpoint.
    pub thumbnail_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: i64,
    pub teacher_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterOutline {
    pub id: i64,
    pub title: String,
    pub position: i32,
    pub is_free: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailResponse {
    pub course: CourseResponse,
    pub category: Option<CategoryResponse>,
    pub teacher_name: Option<String>,
    pub chapters: Vec<ChapterOutline>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedCourseResponse {
    pub items: Vec<CourseResponse>,
    pub pagination: crate::utils::PaginationInfo,
}

impl From<course_entity::Model> for CourseResponse {
    fn from(m: course_entity::Model) -> Self {
        Self {
            id: m.id,
            teacher_id: m.teacher_id,
            category_id: m.category_id,
            title: m.title,
            description: m.description,
            price: m.price,
            thumbnail_url: m.thumbnail_url,
            is_published: m.is_published,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<category_entity::Model> for CategoryResponse {
    fn from(m: category_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
        }
    }
}

impl From<chapter_entity::Model> for ChapterOutline {
    fn from(m: chapter_entity::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            position: m.position,
            is_free: m.is_free,
        }
    }
}
