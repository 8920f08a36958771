//! Questionnaire and venue menu service

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use crate::database::DatabaseService;
use crate::models::{AnswerSummary, CreateQuestionRequest, MenuItem, Question, QuestionnaireAnswers, StructuredAnswer};
use crate::utils::errors::{PartyGateError, Result};
use crate::utils::helpers::normalize_whitespace;
use crate::utils::logging::log_admin_action;

#[derive(Clone)]
#[derive(Debug)]
pub struct QuestionnaireService {
    database: Arc<DatabaseService>,
}

impl QuestionnaireService {
    pub fn new(database: Arc<DatabaseService>) -> Self {
        Self { database }
    }

    /// Questions in display order
    pub async fn questions(&self) -> Result<Vec<Question>> {
        self.database.questions.list().await
    }

    pub async fn create_question(&self, mut request: CreateQuestionRequest) -> Result<Question> {
        request.title = normalize_whitespace(&request.title);
        if request.title.is_empty() {
            return Err(PartyGateError::InvalidInput("질문 내용을 입력해주세요.".to_string()));
        }
        request.subtitle = request
            .subtitle
            .map(|subtitle| normalize_whitespace(&subtitle))
            .filter(|subtitle| !subtitle.is_empty());

        let question = self.database.questions.create(request).await?;
        log_admin_action("create_question", Some(&question.id.to_string()), Some(&question.title));
        Ok(question)
    }

    pub async fn delete_question(&self, question_id: i64) -> Result<()> {
        if !self.database.questions.delete(question_id).await? {
            return Err(PartyGateError::QuestionNotFound { question_id });
        }
        log_admin_action("delete_question", Some(&question_id.to_string()), None);
        Ok(())
    }

    /// Store a user's answers against the current question list
    ///
    /// Answers to unknown question ids are dropped; unanswered questions are
    /// stored as empty strings. Saving again replaces the earlier answers.
    pub async fn save_answers(
        &self,
        user_id: i64,
        event_id: i64,
        answers: HashMap<i64, String>,
    ) -> Result<QuestionnaireAnswers> {
        if self.database.users.find_by_id(user_id).await?.is_none() {
            return Err(PartyGateError::UserNotFound { user_id });
        }
        if self.database.events.find_by_id(event_id).await?.is_none() {
            return Err(PartyGateError::EventNotFound { event_id });
        }

        let questions = self.database.questions.list().await?;
        let trimmed: HashMap<i64, String> = answers
            .into_iter()
            .map(|(question_id, answer)| (question_id, answer.trim().to_string()))
            .collect();
        let structured = StructuredAnswer::structure(&questions, &trimmed);
        let total = i32::try_from(questions.len())
            .map_err(|_| PartyGateError::InvalidInput("Too many questions".to_string()))?;

        let stored = self.database.answers.upsert(user_id, event_id, structured, total).await?;
        info!(
            user_id = user_id,
            event_id = event_id,
            answered = stored.answer_map().len(),
            total_questions = total,
            "Questionnaire answers saved"
        );
        Ok(stored)
    }

    /// Non-empty answers keyed by question id; empty when nothing was saved
    pub async fn answers(&self, user_id: i64, event_id: i64) -> Result<HashMap<i64, String>> {
        let stored = self.database.answers.find(user_id, event_id).await?;
        debug!(user_id = user_id, event_id = event_id, found = stored.is_some(), "Loaded questionnaire answers");
        Ok(stored.map(|answers| answers.answer_map()).unwrap_or_default())
    }

    pub async fn answers_for_event(&self, event_id: i64) -> Result<Vec<AnswerSummary>> {
        self.database.answers.all_for_event(event_id).await
    }

    /// Menu items ordered by name
    pub async fn menu(&self) -> Result<Vec<MenuItem>> {
        self.database.menu.list().await
    }

    pub async fn create_menu_item(&self, name: &str) -> Result<MenuItem> {
        let name = normalize_whitespace(name);
        if name.is_empty() {
            return Err(PartyGateError::InvalidInput("메뉴 이름을 입력해주세요.".to_string()));
        }
        let item = self.database.menu.create(&name).await?;
        log_admin_action("create_menu_item", Some(&item.id.to_string()), Some(&item.name));
        Ok(item)
    }

    pub async fn delete_menu_item(&self, item_id: i64) -> Result<()> {
        if !self.database.menu.delete(item_id).await? {
            return Err(PartyGateError::MenuItemNotFound { item_id });
        }
        log_admin_action("delete_menu_item", Some(&item_id.to_string()), None);
        Ok(())
    }
}
