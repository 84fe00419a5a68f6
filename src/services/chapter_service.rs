use crate::entities::{
    chapter_entity as chapter, course_entity as course, quiz_entity as quiz,
    resource_entity as resource,
};
use crate::error::{AppError, AppResult};
use crate::external::StorageService;
use crate::models::*;
use crate::services::access::{ensure_chapter_access, owned_chapter, owned_course};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct ChapterService {
    pool: Arc<DatabaseConnection>,
    storage: StorageService,
}

/// `requested` must name every chapter of the course exactly once.
pub fn check_permutation(existing: &[i64], requested: &[i64]) -> AppResult<()> {
    let existing: HashSet<i64> = existing.iter().copied().collect();
    let unique: HashSet<i64> = requested.iter().copied().collect();

    if unique.len() != requested.len() {
        return Err(AppError::ValidationError(
            "chapterIds contains duplicates".to_string(),
        ));
    }
    if unique != existing {
        return Err(AppError::ValidationError(
            "chapterIds must list every chapter of the course".to_string(),
        ));
    }
    Ok(())
}

impl ChapterService {
    pub fn new(pool: Arc<DatabaseConnection>, storage: StorageService) -> Self {
        Self { pool, storage }
    }

    pub async fn create_chapter(
        &self,
        user_id: i64,
        request: CreateChapterRequest,
    ) -> AppResult<ChapterResponse> {
        let (title, course_id) = request.validate()?;
        let owned = owned_course(self.pool.as_ref(), user_id, course_id).await?;

        let last_position: Option<i32> = chapter::Entity::find()
            .select_only()
            .column_as(chapter::Column::Position.max(), "max_position")
            .filter(chapter::Column::CourseId.eq(owned.id))
            .into_tuple::<Option<i32>>()
            .one(self.pool.as_ref())
            .await?
            .flatten();

        let created = chapter::ActiveModel {
            course_id: Set(owned.id),
            title: Set(title),
            description: Set(request.description),
            position: Set(last_position.unwrap_or(0) + 1),
            is_free: Set(request.is_free),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Chapter created: id={}, course_id={}", created.id, owned.id);
        Ok(ChapterResponse::from(created))
    }

    pub async fn update_chapter(
        &self,
        user_id: i64,
        chapter_id: i64,
        request: UpdateChapterRequest,
    ) -> AppResult<ChapterResponse> {
        let (_, existing) = owned_chapter(self.pool.as_ref(), user_id, chapter_id).await?;
        let mut active: chapter::ActiveModel = existing.into();

        if let Some(title) = request.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::ValidationError("title must not be empty".to_string()));
            }
            active.title = Set(title);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(is_free) = request.is_free {
            active.is_free = Set(is_free);
        }
        if let Some(key) = request.video_key {
            if !key.starts_with("videos/") {
                return Err(AppError::ValidationError("Invalid video key".to_string()));
            }
            active.video_url = Set(Some(self.storage.public_url(&key)));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(self.pool.as_ref()).await?;
        Ok(ChapterResponse::from(updated))
    }

    /// Deletes a chapter and closes the gap it leaves in the ordering.
    pub async fn delete_chapter(&self, user_id: i64, chapter_id: i64) -> AppResult<()> {
        let (owned, existing) = owned_chapter(self.pool.as_ref(), user_id, chapter_id).await?;

        let txn = self.pool.begin().await?;
        existing.delete(&txn).await?;

        let remaining = chapter::Entity::find()
            .filter(chapter::Column::CourseId.eq(owned.id))
            .order_by_asc(chapter::Column::Position)
            .all(&txn)
            .await?;
        for (index, item) in remaining.into_iter().enumerate() {
            let position = index as i32 + 1;
            if item.position != position {
                let mut active: chapter::ActiveModel = item.into();
                active.position = Set(position);
                active.update(&txn).await?;
            }
        }

        txn.commit().await?;
        log::info!("Chapter deleted: id={chapter_id}, course_id={}", owned.id);
        Ok(())
    }

    pub async fn reorder_chapters(
        &self,
        user_id: i64,
        course_id: i64,
        request: ReorderChaptersRequest,
    ) -> AppResult<Vec<ChapterResponse>> {
        let owned = owned_course(self.pool.as_ref(), user_id, course_id).await?;

        let chapters = chapter::Entity::find()
            .filter(chapter::Column::CourseId.eq(owned.id))
            .all(self.pool.as_ref())
            .await?;
        let existing_ids: Vec<i64> = chapters.iter().map(|c| c.id).collect();
        check_permutation(&existing_ids, &request.chapter_ids)?;

        let txn = self.pool.begin().await?;
        let mut reordered = Vec::with_capacity(chapters.len());
        for (index, id) in request.chapter_ids.iter().enumerate() {
            let Some(item) = chapters.iter().find(|c| c.id == *id) else {
                continue;
            };
            let mut active: chapter::ActiveModel = item.clone().into();
            active.position = Set(index as i32 + 1);
            active.updated_at = Set(Some(Utc::now()));
            reordered.push(active.update(&txn).await?);
        }
        txn.commit().await?;

        Ok(reordered.into_iter().map(ChapterResponse::from).collect())
    }

    /// Full chapter body; locked chapters need ownership or a completed enrollment,
    /// and drafts are only visible to their owner.
    pub async fn get_chapter_content(
        &self,
        user_id: i64,
        course_id: i64,
        chapter_id: i64,
    ) -> AppResult<ChapterContentResponse> {
        let found_course = course::Entity::find_by_id(course_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
        let found_chapter = chapter::Entity::find_by_id(chapter_id)
            .one(self.pool.as_ref())
            .await?
            .filter(|c| c.course_id == found_course.id)
            .ok_or_else(|| AppError::NotFound("Chapter not found".to_string()))?;

        ensure_chapter_access(self.pool.as_ref(), user_id, &found_course, &found_chapter).await?;

        let resources = resource::Entity::find()
            .filter(resource::Column::ChapterId.eq(found_chapter.id))
            .order_by_asc(resource::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        let quizzes = quiz::Entity::find()
            .filter(quiz::Column::ChapterId.eq(found_chapter.id))
            .order_by_asc(quiz::Column::Id)
            .all(self.pool.as_ref())
            .await?;

        Ok(ChapterContentResponse {
            chapter: ChapterResponse::from(found_chapter),
            resources: resources.into_iter().map(ResourceResponse::from).collect(),
            quizzes: quizzes.into_iter().map(QuizSummary::from).collect(),
        })
    }

    pub async fn add_resource(
        &self,
        user_id: i64,
        chapter_id: i64,
        request: CreateResourceRequest,
    ) -> AppResult<ResourceResponse> {
        let (_, owned) = owned_chapter(self.pool.as_ref(), user_id, chapter_id).await?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("name is required".to_string()));
        }
        if url::Url::parse(&request.url).is_err() {
            return Err(AppError::ValidationError("url must be an absolute URL".to_string()));
        }

        let created = resource::ActiveModel {
            chapter_id: Set(owned.id),
            name: Set(name),
            url: Set(request.url),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(ResourceResponse::from(created))
    }

    pub async fn delete_resource(&self, user_id: i64, resource_id: i64) -> AppResult<()> {
        let existing = resource::Entity::find_by_id(resource_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Resource not found".to_string()))?;
        owned_chapter(self.pool.as_ref(), user_id, existing.chapter_id).await?;

        existing.delete(self.pool.as_ref()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::entities::teacher_profile_entity as teacher;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn service(db: Arc<DatabaseConnection>) -> ChapterService {
        ChapterService::new(db, StorageService::new(StorageConfig::default()))
    }

    fn course_row(is_published: bool) -> course::Model {
        course::Model {
            id: 31,
            teacher_id: 41,
            category_id: None,
            title: "Rust in Practice".to_string(),
            description: Some("Borrowing and lifetimes".to_string()),
            price: 99_000,
            thumbnail_url: None,
            is_published,
            created_at: None,
            updated_at: None,
        }
    }

    fn chapter_row(id: i64, position: i32, is_free: bool) -> chapter::Model {
        chapter::Model {
            id,
            course_id: 31,
            title: format!("Chapter {id}"),
            description: None,
            video_url: None,
            position,
            is_free,
            created_at: None,
            updated_at: None,
        }
    }

    fn teacher_row() -> teacher::Model {
        teacher::Model {
            id: 41,
            user_id: 1,
            bio: None,
            expertise: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn transaction_log(db: Arc<DatabaseConnection>) -> String {
        let Ok(db) = Arc::try_unwrap(db) else {
            panic!("connection still shared");
        };
        format!("{:?}", db.into_transaction_log())
    }

    #[test]
    fn test_check_permutation() {
        assert!(check_permutation(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(check_permutation(&[1, 2, 3], &[1, 2]).is_err());
        assert!(check_permutation(&[1, 2, 3], &[1, 2, 2, 3]).is_err());
        assert!(check_permutation(&[1, 2, 3], &[1, 2, 4]).is_err());
        assert!(check_permutation(&[], &[]).is_ok());
    }

    #[actix_web::test]
    async fn test_create_chapter_without_title_is_rejected_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = service(Arc::new(db))
            .create_chapter(
                1,
                CreateChapterRequest {
                    course_id: Some(4),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_locked_chapter_of_draft_course_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![course_row(false)]])
            .append_query_results([vec![chapter_row(21, 1, false)]])
            .append_query_results([Vec::<teacher::Model>::new()])
            .into_connection();

        let result = service(Arc::new(db)).get_chapter_content(9, 31, 21).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_delete_chapter_closes_the_gap() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![chapter_row(1, 1, true)]])
                .append_query_results([vec![teacher_row()]])
                .append_query_results([vec![course_row(true)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([vec![chapter_row(2, 2, false), chapter_row(3, 3, false)]])
                .append_query_results([vec![chapter_row(2, 1, false)]])
                .append_query_results([vec![chapter_row(3, 2, false)]])
                .into_connection(),
        );

        service(db.clone()).delete_chapter(1, 1).await.unwrap();

        let log = transaction_log(db);
        let updates: Vec<&str> = log.split("UPDATE").skip(1).collect();
        assert_eq!(updates.len(), 2, "{log}");
        assert!(updates[0].contains("[Int(Some(1))") && updates[0].contains("BigInt(Some(2))"));
        assert!(updates[1].contains("[Int(Some(2))") && updates[1].contains("BigInt(Some(3))"));
    }

    #[actix_web::test]
    async fn test_reorder_chapters_persists_requested_order() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![teacher_row()]])
                .append_query_results([vec![course_row(true)]])
                .append_query_results([vec![
                    chapter_row(1, 1, true),
                    chapter_row(2, 2, false),
                    chapter_row(3, 3, false),
                ]])
                .append_query_results([vec![chapter_row(3, 1, false)]])
                .append_query_results([vec![chapter_row(1, 2, true)]])
                .append_query_results([vec![chapter_row(2, 3, false)]])
                .into_connection(),
        );

        let reordered = service(db.clone())
            .reorder_chapters(
                1,
                31,
                ReorderChaptersRequest {
                    chapter_ids: vec![3, 1, 2],
                },
            )
            .await
            .unwrap();
        let ids: Vec<i64> = reordered.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let log = transaction_log(db);
        let updates: Vec<&str> = log.split("UPDATE").skip(1).collect();
        assert_eq!(updates.len(), 3, "{log}");
        assert!(updates[0].contains("[Int(Some(1))") && updates[0].contains("BigInt(Some(3))"));
        assert!(updates[2].contains("[Int(Some(3))") && updates[2].contains("BigInt(Some(2))"));
    }

    #[actix_web::test]
    async fn test_reorder_with_missing_chapter_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![teacher_row()]])
            .append_query_results([vec![course_row(true)]])
            .append_query_results([vec![chapter_row(1, 1, true), chapter_row(2, 2, false)]])
            .into_connection();

        let result = service(Arc::new(db))
            .reorder_chapters(
                1,
                31,
                ReorderChaptersRequest {
                    chapter_ids: vec![2],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
