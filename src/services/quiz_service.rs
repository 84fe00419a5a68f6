use crate::entities::{
    chapter_entity as chapter, course_entity as course, question_entity as question,
    question_option_entity as option, quiz_entity as quiz,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::access::{ensure_chapter_access, owned_chapter};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct QuizService {
    pool: Arc<DatabaseConnection>,
}

/// Grades answers against the correct option of each question. Questions left
/// unanswered count as wrong; answers to unknown questions are ignored.
pub fn grade_quiz(
    quiz_id: i64,
    questions: &[(question::Model, Vec<option::Model>)],
    answers: &[AnswerInput],
) -> QuizResultResponse {
    let selected: HashMap<i64, i64> = answers
        .iter()
        .map(|a| (a.question_id, a.option_id))
        .collect();

    let results: Vec<QuestionResult> = questions
        .iter()
        .map(|(q, options)| {
            let correct_option_id = options.iter().find(|o| o.is_correct).map(|o| o.id);
            let selected_option_id = selected.get(&q.id).copied();
            QuestionResult {
                question_id: q.id,
                selected_option_id,
                correct_option_id,
                is_correct: selected_option_id.is_some() && selected_option_id == correct_option_id,
            }
        })
        .collect();

    QuizResultResponse {
        quiz_id,
        score: results.iter().filter(|r| r.is_correct).count() as u32,
        total: results.len() as u32,
        results,
    }
}

async fn insert_options<C: ConnectionTrait>(
    conn: &C,
    question_id: i64,
    options: Vec<OptionInput>,
) -> AppResult<Vec<option::Model>> {
    let mut inserted = Vec::with_capacity(options.len());
    for input in options {
        let created = option::ActiveModel {
            question_id: Set(question_id),
            text: Set(input.text.trim().to_string()),
            is_correct: Set(input.is_correct),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        inserted.push(created);
    }
    Ok(inserted)
}

fn to_question_response(
    q: question::Model,
    options: Vec<option::Model>,
    reveal_answers: bool,
) -> QuestionResponse {
    QuestionResponse {
        id: q.id,
        quiz_id: q.quiz_id,
        text: q.text,
        position: q.position,
        options: options
            .into_iter()
            .map(|o| OptionResponse::from_model(o, reveal_answers))
            .collect(),
    }
}

impl QuizService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    async fn find_quiz(&self, quiz_id: i64) -> AppResult<quiz::Model> {
        quiz::Entity::find_by_id(quiz_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))
    }

    async fn owned_quiz(&self, user_id: i64, quiz_id: i64) -> AppResult<quiz::Model> {
        let found = self.find_quiz(quiz_id).await?;
        owned_chapter(self.pool.as_ref(), user_id, found.chapter_id).await?;
        Ok(found)
    }

    async fn owned_question(&self, user_id: i64, question_id: i64) -> AppResult<question::Model> {
        let found = question::Entity::find_by_id(question_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
        self.owned_quiz(user_id, found.quiz_id).await?;
        Ok(found)
    }

    /// Checks course visibility and chapter access for a quiz, and reports whether the
    /// caller owns the course.
    async fn viewable_quiz(&self, user_id: i64, quiz_id: i64) -> AppResult<(quiz::Model, bool)> {
        let found = self.find_quiz(quiz_id).await?;
        let found_chapter = chapter::Entity::find_by_id(found.chapter_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Chapter not found".to_string()))?;
        let found_course = course::Entity::find_by_id(found_chapter.course_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let is_owner =
            ensure_chapter_access(self.pool.as_ref(), user_id, &found_course, &found_chapter)
                .await?;
        Ok((found, is_owner))
    }

    async fn load_questions(
        &self,
        quiz_id: i64,
    ) -> AppResult<Vec<(question::Model, Vec<option::Model>)>> {
        let questions = question::Entity::find()
            .filter(question::Column::QuizId.eq(quiz_id))
            .order_by_asc(question::Column::Position)
            .all(self.pool.as_ref())
            .await?;
        if questions.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let mut by_question: HashMap<i64, Vec<option::Model>> = HashMap::new();
        for o in option::Entity::find()
            .filter(option::Column::QuestionId.is_in(ids))
            .order_by_asc(option::Column::Id)
            .all(self.pool.as_ref())
            .await?
        {
            by_question.entry(o.question_id).or_default().push(o);
        }

        Ok(questions
            .into_iter()
            .map(|q| {
                let options = by_question.remove(&q.id).unwrap_or_default();
                (q, options)
            })
            .collect())
    }

    pub async fn create_quiz(&self, user_id: i64, request: CreateQuizRequest) -> AppResult<QuizSummary> {
        let (chapter_id, title) = request.validate()?;
        let (_, owned) = owned_chapter(self.pool.as_ref(), user_id, chapter_id).await?;

        let created = quiz::ActiveModel {
            chapter_id: Set(owned.id),
            title: Set(title),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(QuizSummary::from(created))
    }

    /// Correct answers are only disclosed to the course owner.
    pub async fn get_quiz(&self, user_id: i64, quiz_id: i64) -> AppResult<QuizResponse> {
        let (found, is_owner) = self.viewable_quiz(user_id, quiz_id).await?;
        let questions = self.load_questions(found.id).await?;

        Ok(QuizResponse {
            id: found.id,
            chapter_id: found.chapter_id,
            title: found.title,
            questions: questions
                .into_iter()
                .map(|(q, options)| to_question_response(q, options, is_owner))
                .collect(),
        })
    }

    pub async fn update_quiz(
        &self,
        user_id: i64,
        quiz_id: i64,
        request: UpdateQuizRequest,
    ) -> AppResult<QuizSummary> {
        let found = self.owned_quiz(user_id, quiz_id).await?;
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::ValidationError("title is required".to_string()));
        }

        let mut active: quiz::ActiveModel = found.into();
        active.title = Set(title);
        active.updated_at = Set(Some(Utc::now()));
        let updated = active.update(self.pool.as_ref()).await?;
        Ok(QuizSummary::from(updated))
    }

    pub async fn delete_quiz(&self, user_id: i64, quiz_id: i64) -> AppResult<()> {
        let found = self.owned_quiz(user_id, quiz_id).await?;
        found.delete(self.pool.as_ref()).await?;
        Ok(())
    }

    pub async fn create_question(
        &self,
        user_id: i64,
        request: CreateQuestionRequest,
    ) -> AppResult<QuestionResponse> {
        let text = request.text.trim().to_string();
        if text.is_empty() {
            return Err(AppError::ValidationError("text is required".to_string()));
        }
        validate_options(&request.options)?;
        let found = self.owned_quiz(user_id, request.quiz_id).await?;

        let txn = self.pool.begin().await?;
        let last_position: Option<i32> = question::Entity::find()
            .select_only()
            .column_as(question::Column::Position.max(), "max_position")
            .filter(question::Column::QuizId.eq(found.id))
            .into_tuple::<Option<i32>>()
            .one(&txn)
            .await?
            .flatten();
        let created = question::ActiveModel {
            quiz_id: Set(found.id),
            text: Set(text),
            position: Set(last_position.unwrap_or(0) + 1),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let options = insert_options(&txn, created.id, request.options).await?;
        txn.commit().await?;

        Ok(to_question_response(created, options, true))
    }

    pub async fn update_question(
        &self,
        user_id: i64,
        question_id: i64,
        request: UpdateQuestionRequest,
    ) -> AppResult<QuestionResponse> {
        if let Some(options) = request.options.as_deref() {
            validate_options(options)?;
        }
        let found = self.owned_question(user_id, question_id).await?;

        let txn = self.pool.begin().await?;
        let updated = match request.text {
            Some(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(AppError::ValidationError("text must not be empty".to_string()));
                }
                let mut active: question::ActiveModel = found.into();
                active.text = Set(text);
                active.update(&txn).await?
            }
            None => found,
        };

        let options = match request.options {
            Some(inputs) => {
                option::Entity::delete_many()
                    .filter(option::Column::QuestionId.eq(updated.id))
                    .exec(&txn)
                    .await?;
                insert_options(&txn, updated.id, inputs).await?
            }
            None => {
                option::Entity::find()
                    .filter(option::Column::QuestionId.eq(updated.id))
                    .order_by_asc(option::Column::Id)
                    .all(&txn)
                    .await?
            }
        };
        txn.commit().await?;

        Ok(to_question_response(updated, options, true))
    }

    pub async fn delete_question(&self, user_id: i64, question_id: i64) -> AppResult<()> {
        let found = self.owned_question(user_id, question_id).await?;
        found.delete(self.pool.as_ref()).await?;
        Ok(())
    }

    /// Grades a submission; nothing is stored.
    pub async fn submit_quiz(
        &self,
        user_id: i64,
        quiz_id: i64,
        request: SubmitQuizRequest,
    ) -> AppResult<QuizResultResponse> {
        let (found, _) = self.viewable_quiz(user_id, quiz_id).await?;
        let questions = self.load_questions(found.id).await?;
        Ok(grade_quiz(found.id, &questions, &request.answers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::teacher_profile_entity as teacher;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn q(id: i64, position: i32) -> question::Model {
        question::Model {
            id,
            quiz_id: 1,
            text: format!("Question {id}"),
            position,
            created_at: None,
        }
    }

    fn o(id: i64, question_id: i64, is_correct: bool) -> option::Model {
        option::Model {
            id,
            question_id,
            text: format!("Option {id}"),
            is_correct,
        }
    }

    fn answer(question_id: i64, option_id: i64) -> AnswerInput {
        AnswerInput {
            question_id,
            option_id,
        }
    }

    #[test]
    fn test_grade_quiz() {
        let questions = vec![
            (q(1, 1), vec![o(10, 1, true), o(11, 1, false)]),
            (q(2, 2), vec![o(20, 2, false), o(21, 2, true)]),
            (q(3, 3), vec![o(30, 3, true), o(31, 3, false)]),
        ];

        let result = grade_quiz(1, &questions, &[answer(1, 10), answer(2, 20), answer(99, 1)]);

        assert_eq!(result.total, 3);
        assert_eq!(result.score, 1);
        assert!(result.results[0].is_correct);
        assert_eq!(result.results[1].correct_option_id, Some(21));
        assert_eq!(result.results[2].selected_option_id, None);
        assert!(!result.results[2].is_correct);
    }

    #[test]
    fn test_grade_empty_quiz() {
        let result = grade_quiz(4, &[], &[answer(1, 1)]);
        assert_eq!((result.score, result.total), (0, 0));
    }

    fn quiz_row() -> quiz::Model {
        quiz::Model {
            id: 11,
            chapter_id: 21,
            title: "Checkpoint".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn chapter_row(is_free: bool) -> chapter::Model {
        chapter::Model {
            id: 21,
            course_id: 31,
            title: "Ownership".to_string(),
            description: None,
            video_url: None,
            position: 1,
            is_free,
            created_at: None,
            updated_at: None,
        }
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

    fn teacher_row(id: i64) -> teacher::Model {
        teacher::Model {
            id,
            user_id: 1,
            bio: None,
            expertise: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[actix_web::test]
    async fn test_submit_locked_quiz_without_purchase_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![quiz_row()]])
            .append_query_results([vec![chapter_row(false)]])
            .append_query_results([vec![course_row(true)]])
            .append_query_results([Vec::<teacher::Model>::new()])
            .append_query_results([Vec::<crate::entities::student_profile_entity::Model>::new()])
            .into_connection();

        let result = QuizService::new(Arc::new(db))
            .submit_quiz(1, 11, SubmitQuizRequest { answers: vec![] })
            .await;

        assert!(matches!(result, Err(AppError::PermissionDenied(_))));
    }

    #[actix_web::test]
    async fn test_quiz_of_draft_course_is_hidden_from_others() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![quiz_row()]])
            .append_query_results([vec![chapter_row(true)]])
            .append_query_results([vec![course_row(false)]])
            .append_query_results([Vec::<teacher::Model>::new()])
            .into_connection();

        let result = QuizService::new(Arc::new(db)).get_quiz(1, 11).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[actix_web::test]
    async fn test_new_question_goes_after_the_highest_position() {
        // positions {2, 3} remain after question 1 was deleted
        let max_row = BTreeMap::from([("max_position", Value::Int(Some(3)))]);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![quiz_row()]])
                .append_query_results([vec![chapter_row(true)]])
                .append_query_results([vec![teacher_row(41)]])
                .append_query_results([vec![course_row(true)]])
                .append_query_results([vec![max_row]])
                .append_query_results([vec![q(5, 4)]])
                .append_query_results([vec![o(50, 5, true)]])
                .append_query_results([vec![o(51, 5, false)]])
                .into_connection(),
        );
        let service = QuizService::new(db.clone());

        let created = service
            .create_question(
                1,
                CreateQuestionRequest {
                    quiz_id: 11,
                    text: "Which trait moves a value?".to_string(),
                    options: vec![
                        OptionInput {
                            text: "FnOnce".to_string(),
                            is_correct: true,
                        },
                        OptionInput {
                            text: "Fn".to_string(),
                            is_correct: false,
                        },
                    ],
                },
            )
            .await
            .unwrap();
        assert_eq!(created.options.len(), 2);

        drop(service);
        let Ok(db) = Arc::try_unwrap(db) else {
            panic!("connection still shared");
        };
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("Int(Some(4))"), "{log}");
    }
}
