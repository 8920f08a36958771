//! Questionnaire models

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use super::user::Gender;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    /// Only `text` questions exist today
    pub kind: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub required: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
    pub sort_order: i32,
}

fn default_required() -> bool {
    true
}

/// One answer stored together with the question text it was given for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAnswer {
    pub question_id: i64,
    pub order: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub answer: String,
}

impl StructuredAnswer {
    /// Pair every question with its answer; unanswered questions get ""
    pub fn structure(questions: &[Question], answers: &HashMap<i64, String>) -> Vec<StructuredAnswer> {
        questions
            .iter()
            .map(|question| StructuredAnswer {
                question_id: question.id,
                order: question.sort_order,
                title: question.title.clone(),
                subtitle: question.subtitle.clone(),
                answer: answers.get(&question.id).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswers {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub answers: Json<Vec<StructuredAnswer>>,
    pub total_questions: i32,
    pub completed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuestionnaireAnswers {
    /// Non-empty answers keyed by question id
    pub fn answer_map(&self) -> HashMap<i64, String> {
        self.answers
            .iter()
            .filter(|item| !item.answer.is_empty())
            .map(|item| (item.question_id, item.answer.clone()))
            .collect()
    }
}

/// Answers of one participant joined with their profile
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSummary {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_gender: Gender,
    pub user_age: i32,
    pub answers: Json<Vec<StructuredAnswer>>,
    pub total_questions: i32,
    pub completed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, order: i32) -> Question {
        Question {
            id,
            kind: "text".to_string(),
            title: format!("Q{}", id),
            subtitle: None,
            required: true,
            sort_order: order,
        }
    }

    #[test]
    fn test_structure_fills_missing_answers() {
        let questions = vec![question(1, 1), question(2, 2)];
        let mut answers = HashMap::new();
        answers.insert(2, "떡볶이".to_string());
        answers.insert(99, "ignored".to_string());

        let structured = StructuredAnswer::structure(&questions, &answers);
        assert_eq!(structured.len(), 2);
        assert_eq!(structured[0].answer, "");
        assert_eq!(structured[1].answer, "떡볶이");
        assert_eq!(structured[1].order, 2);
    }

    #[test]
    fn test_answer_map_skips_empty() {
        let now = Utc::now();
        let stored = QuestionnaireAnswers {
            id: 1,
            user_id: 1,
            event_id: 1,
            answers: Json(vec![
                StructuredAnswer { question_id: 1, order: 1, title: "a".into(), subtitle: None, answer: String::new() },
                StructuredAnswer { question_id: 2, order: 2, title: "b".into(), subtitle: None, answer: "yes".into() },
            ]),
            total_questions: 2,
            completed_at: now,
            updated_at: now,
        };
        let map = stored.answer_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&2).map(String::as_str), Some("yes"));
    }

    #[test]
    fn test_answer_keys_parse_from_json_object() {
        let map: HashMap<i64, String> = serde_json::from_str(r#"{"3":"hello"}"#).unwrap();
        assert_eq!(map.get(&3).map(String::as_str), Some("hello"));
    }
}
