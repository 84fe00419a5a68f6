use crate::entities::{
    category_entity as category, chapter_entity as chapter, course_entity as course,
    teacher_profile_entity as teacher, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::StorageService;
use crate::models::*;
use crate::services::access::{find_teacher, owned_course, require_teacher};
use crate::utils::{PaginationInfo, PaginationParams};
use chrono::Utc;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct CourseService {
    pool: Arc<DatabaseConnection>,
    storage: StorageService,
}

/// A course can go live once it has a description and at least one chapter.
pub fn check_publishable(course: &course::Model, chapter_count: u64) -> AppResult<()> {
    if course.title.trim().is_empty() {
        return Err(AppError::ValidationError("Course title is required".to_string()));
    }
    if course
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .is_empty()
    {
        return Err(AppError::ValidationError(
            "Add a description before publishing".to_string(),
        ));
    }
    if chapter_count == 0 {
        return Err(AppError::ValidationError(
            "Add at least one chapter before publishing".to_string(),
        ));
    }
    Ok(())
}

fn validate_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 200 {
        return Err(AppError::ValidationError(
            "Title must be between 1 and 200 characters".to_string(),
        ));
    }
    Ok(title.to_string())
}

fn validate_price(price: i64) -> AppResult<i64> {
    if price < 0 {
        return Err(AppError::ValidationError("Price must not be negative".to_string()));
    }
    Ok(price)
}

/// `%search%` for ILIKE, with the pattern metacharacters in `search` matched literally.
pub fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

impl CourseService {
    pub fn new(pool: Arc<DatabaseConnection>, storage: StorageService) -> Self {
        Self { pool, storage }
    }

    async fn ensure_category(&self, category_id: i64) -> AppResult<()> {
        let exists = category::Entity::find_by_id(category_id)
            .one(self.pool.as_ref())
            .await?
            .is_some();
        if !exists {
            return Err(AppError::ValidationError(format!(
                "Category {category_id} does not exist"
            )));
        }
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryResponse>> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(self.pool.as_ref())
            .await?;
        Ok(categories.into_iter().map(CategoryResponse::from).collect())
    }

    pub async fn create_category(
        &self,
        user_id: i64,
        request: CreateCategoryRequest,
    ) -> AppResult<CategoryResponse> {
        require_teacher(self.pool.as_ref(), user_id).await?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Category name is required".to_string()));
        }

        let created = category::ActiveModel {
            name: Set(name),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from_insert(e, "Category already exists"))?;

        Ok(CategoryResponse::from(created))
    }

    pub async fn list_published(&self, query: CourseQuery) -> AppResult<PaginatedCourseResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut condition = Condition::all().add(course::Column::IsPublished.eq(true));
        if let Some(category_id) = query.category_id {
            condition = condition.add(course::Column::CategoryId.eq(category_id));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            condition = condition.add(
                Expr::col((course::Entity, course::Column::Title)).ilike(contains_pattern(search)),
            );
        }

        let paginator = course::Entity::find()
            .filter(condition)
            .order_by_desc(course::Column::CreatedAt)
            .paginate(self.pool.as_ref(), params.get_per_page());

        let total = paginator.num_items().await?;
        let courses = paginator.fetch_page(params.page_index()).await?;

        Ok(PaginatedCourseResponse {
            items: courses.into_iter().map(CourseResponse::from).collect(),
            pagination: PaginationInfo::new(params.get_page(), params.get_per_page(), total),
        })
    }

    pub async fn list_teacher_courses(&self, user_id: i64) -> AppResult<Vec<CourseResponse>> {
        let profile = require_teacher(self.pool.as_ref(), user_id).await?;
        let courses = course::Entity::find()
            .filter(course::Column::TeacherId.eq(profile.id))
            .order_by_desc(course::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(courses.into_iter().map(CourseResponse::from).collect())
    }

    /// Drafts are only visible to the teacher who owns them.
    pub async fn get_course_detail(
        &self,
        course_id: i64,
        viewer_id: Option<i64>,
    ) -> AppResult<CourseDetailResponse> {
        let found = course::Entity::find_by_id(course_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        if !found.is_published {
            let is_owner = match viewer_id {
                Some(user_id) => find_teacher(self.pool.as_ref(), user_id)
                    .await?
                    .is_some_and(|t| t.id == found.teacher_id),
                None => false,
            };
            if !is_owner {
                return Err(AppError::NotFound("Course not found".to_string()));
            }
        }

        let category = match found.category_id {
            Some(id) => category::Entity::find_by_id(id).one(self.pool.as_ref()).await?,
            None => None,
        };

        let teacher_name = match teacher::Entity::find_by_id(found.teacher_id)
            .one(self.pool.as_ref())
            .await?
        {
            Some(profile) => users::Entity::find_by_id(profile.user_id)
                .one(self.pool.as_ref())
                .await?
                .map(|u| u.name),
            None => None,
        };

        let chapters = chapter::Entity::find()
            .filter(chapter::Column::CourseId.eq(found.id))
            .order_by_asc(chapter::Column::Position)
            .all(self.pool.as_ref())
            .await?;

        Ok(CourseDetailResponse {
            course: CourseResponse::from(found),
            category: category.map(CategoryResponse::from),
            teacher_name,
            chapters: chapters.into_iter().map(ChapterOutline::from).collect(),
        })
    }

    pub async fn create_course(
        &self,
        user_id: i64,
        request: CreateCourseRequest,
    ) -> AppResult<CourseResponse> {
        let profile = require_teacher(self.pool.as_ref(), user_id).await?;
        let title = validate_title(&request.title)?;
        let price = validate_price(request.price)?;
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
        }

        let created = course::ActiveModel {
            teacher_id: Set(profile.id),
            category_id: Set(request.category_id),
            title: Set(title),
            description: Set(request.description),
            price: Set(price),
            is_published: Set(false),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Course created: id={}, teacher_id={}", created.id, profile.id);
        Ok(CourseResponse::from(created))
    }

    pub async fn update_course(
        &self,
        user_id: i64,
        course_id: i64,
        request: UpdateCourseRequest,
    ) -> AppResult<CourseResponse> {
        let existing = owned_course(self.pool.as_ref(), user_id, course_id).await?;
        let mut active: course::ActiveModel = existing.into();

        if let Some(title) = request.title {
            active.title = Set(validate_title(&title)?);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id).await?;
            active.category_id = Set(Some(category_id));
        }
        if let Some(price) = request.price {
            active.price = Set(validate_price(price)?);
        }
        if let Some(key) = request.thumbnail_key {
            if !key.starts_with("thumbnails/") {
                return Err(AppError::ValidationError("Invalid thumbnail key".to_string()));
            }
            active.thumbnail_url = Set(Some(self.storage.public_url(&key)));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(self.pool.as_ref()).await?;
        Ok(CourseResponse::from(updated))
    }

    pub async fn delete_course(&self, user_id: i64, course_id: i64) -> AppResult<()> {
        let existing = owned_course(self.pool.as_ref(), user_id, course_id).await?;
        existing.delete(self.pool.as_ref()).await?;
        log::info!("Course deleted: id={course_id}");
        Ok(())
    }

    pub async fn set_published(
        &self,
        user_id: i64,
        course_id: i64,
        published: bool,
    ) -> AppResult<CourseResponse> {
        let existing = owned_course(self.pool.as_ref(), user_id, course_id).await?;

        if published {
            let chapter_count = chapter::Entity::find()
                .filter(chapter::Column::CourseId.eq(existing.id))
                .count(self.pool.as_ref())
                .await?;
            check_publishable(&existing, chapter_count)?;
        }

        let mut active: course::ActiveModel = existing.into();
        active.is_published = Set(published);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.pool.as_ref()).await?;

        log::info!("Course id={course_id} published={published}");
        Ok(CourseResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: DatabaseConnection) -> CourseService {
        CourseService::new(Arc::new(db), StorageService::new(StorageConfig::default()))
    }

    fn draft(description: Option<&str>) -> course::Model {
        course::Model {
            id: 1,
            teacher_id: 2,
            category_id: None,
            title: "Rust 101".to_string(),
            description: description.map(str::to_string),
            price: 0,
            thumbnail_url: None,
            is_published: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_check_publishable() {
        assert!(check_publishable(&draft(Some("Learn Rust")), 1).is_ok());
        assert!(check_publishable(&draft(None), 1).is_err());
        assert!(check_publishable(&draft(Some("  ")), 1).is_err());
        assert!(check_publishable(&draft(Some("Learn Rust")), 0).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price(0).unwrap(), 0);
        assert!(validate_price(-1).is_err());
    }

    #[actix_web::test]
    async fn test_draft_is_hidden_from_anonymous_viewers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![draft(Some("Learn Rust"))]])
            .into_connection();

        let result = service(db).get_course_detail(1, None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_contains_pattern_escapes_metacharacters() {
        assert_eq!(contains_pattern("rust"), "%rust%");
        assert_eq!(contains_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(contains_pattern("C:\\dir"), "%C:\\\\dir%");
    }

    #[actix_web::test]
    async fn test_create_course_with_unknown_category_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![teacher::Model {
                id: 2,
                user_id: 1,
                bio: None,
                expertise: None,
                created_at: None,
                updated_at: None,
            }]])
            .append_query_results([Vec::<category::Model>::new()])
            .into_connection();

        let result = service(db)
            .create_course(
                1,
                CreateCourseRequest {
                    title: "Rust 101".to_string(),
                    description: None,
                    category_id: Some(404),
                    price: 0,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
