use crate::entities::{question_option_entity, quiz_entity};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuizSummary {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizRequest {
    pub chapter_id: Option<i64>,
    pub title: Option<String>,
}

impl CreateQuizRequest {
    pub fn validate(&self) -> AppResult<(i64, String)> {
        let chapter_id = self
            .chapter_id
            .ok_or_else(|| AppError::ValidationError("chapterId is required".to_string()))?;
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::ValidationError("title is required".to_string()))?;
        Ok((chapter_id, title.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateQuizRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionInput {
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

/// At least two non-blank options, exactly one of them correct.
pub fn validate_options(options: &[OptionInput]) -> AppResult<()> {
    if options.len() < 2 {
        return Err(AppError::ValidationError(
            "A question needs at least two options".to_string(),
        ));
    }
    if options.iter().any(|o| o.text.trim().is_empty()) {
        return Err(AppError::ValidationError(
            "Option text must not be empty".to_string(),
        ));
    }
    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct != 1 {
        return Err(AppError::ValidationError(
            "Exactly one option must be marked correct".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub quiz_id: i64,
    pub text: String,
    pub options: Vec<OptionInput>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateQuestionRequest {
    pub text: Option<String>,
    /// Replaces the whole option set when present.
    pub options: Option<Vec<OptionInput>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptionResponse {
    pub id: i64,
    pub text: String,
    /// Only disclosed to the course owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub position: i32,
    pub options: Vec<OptionResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: i64,
    pub chapter_id: i64,
    pub title: String,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: i64,
    pub option_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitQuizRequest {
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: i64,
    pub selected_option_id: Option<i64>,
    pub correct_option_id: Option<i64>,
    pub is_correct: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultResponse {
    pub quiz_id: i64,
    pub score: u32,
    pub total: u32,
    pub results: Vec<QuestionResult>,
}

impl From<quiz_entity::Model> for QuizSummary {
    fn from(m: quiz_entity::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
        }
    }
}

impl OptionResponse {
    pub fn from_model(m: question_option_entity::Model, reveal_answer: bool) -> Self {
        Self {
            id: m.id,
            text: m.text,
            is_correct: reveal_answer.then_some(m.is_correct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(text: &str, is_correct: bool) -> OptionInput {
        OptionInput {
            text: text.to_string(),
            is_correct,
        }
    }

    #[test]
    fn test_validate_options() {
        assert!(validate_options(&[opt("a", true), opt("b", false)]).is_ok());
        assert!(validate_options(&[opt("a", true)]).is_err());
        assert!(validate_options(&[opt("a", true), opt("b", true)]).is_err());
        assert!(validate_options(&[opt("a", false), opt("b", false)]).is_err());
        assert!(validate_options(&[opt("a", true), opt(" ", false)]).is_err());
    }

    #[test]
    fn test_create_quiz_validation() {
        let req = CreateQuizRequest {
            chapter_id: Some(1),
            title: Some("Checkpoint".to_string()),
        };
        assert_eq!(req.validate().unwrap(), (1, "Checkpoint".to_string()));
        assert!(CreateQuizRequest::default().validate().is_err());
    }

    #[test]
    fn test_hidden_answers_are_not_serialized() {
        let option = OptionResponse {
            id: 1,
            text: "a".to_string(),
            is_correct: None,
        };
        let json = serde_json::to_value(&option).unwrap();
        assert!(json.get("isCorrect").is_none());
    }
}
