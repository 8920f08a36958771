//! Registration lifecycle against a real database
//!
//! Approve, reject and cancel with their ledger and history effects.

mod helpers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use futures::future::join_all;
use assert_matches::assert_matches;
use serial_test::serial;
use helpers::*;
use PartyGate::models::{
    ApprovalStatus, CreateQuestionRequest, EventStatus, Gender, NewRegistration, PaymentStatus, Registration,
    RemovalPolicy, REASON_ADMIN_REJECTED,
};
use PartyGate::services::{QuestionnaireService, RegistrationService, ReportService};
use PartyGate::PartyGateError;

#[tokio::test]
#[serial]
async fn test_approve_adds_participant_once() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);

    let event = seed_event(&database, 5, 5).await;
    let (user, registration) = seed_pending(&database, &event, "k-male-1", Gender::Male).await;
    assert_eq!(registration.approval_status(), ApprovalStatus::Pending);
    assert_eq!(registration.payment_status(), PaymentStatus::Pending);

    let first = service.approve(registration.id()).await.unwrap();
    assert!(first.ledger.membership_changed);
    assert_eq!(first.registration.user_id, user.id);

    let second = service.approve(registration.id()).await.unwrap();
    assert!(!second.ledger.membership_changed);
    assert_eq!(second.ledger.count_delta, 0);

    let event = service.get_event(event.id).await.unwrap();
    assert_eq!(event.male_count, 1);
    assert_eq!(event.female_count, 0);
    assert_eq!(event.participants, vec![user.id]);

    let stored = service.find_for(user.id, event.id).await.unwrap().unwrap();
    assert!(stored.is_approved());
}

#[tokio::test]
#[serial]
async fn test_card_registration_is_paid_and_pending() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);

    let event = seed_event(&database, 5, 5).await;
    let user = seed_user(&database, "k-card", Gender::Female).await;
    let registration = service.create(NewRegistration::paid(user.id, event.id, "pay_123")).await.unwrap();

    assert_eq!(registration.payment_status(), PaymentStatus::Completed);
    assert_eq!(registration.approval_status(), ApprovalStatus::Pending);
    assert_matches!(registration, Registration::Pending(_));
}

#[tokio::test]
#[serial]
async fn test_duplicate_registration_rejected() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();

    let event = seed_event(&database, 5, 5).await;
    let (user, _) = seed_pending(&database, &event, "k-dup", Gender::Male).await;

    let err = database
        .create_registration(NewRegistration::bank_transfer(user.id, event.id))
        .await
        .unwrap_err();
    assert_matches!(err, PartyGateError::DuplicateRegistration { .. });
    assert_eq!(db.count_records("registrations").await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn test_reject_records_history_and_removes_user() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);

    let event = seed_event(&database, 5, 5).await;
    let (user, registration) = seed_pending(&database, &event, "k-reject", Gender::Female).await;

    let rejection = service.reject(registration.id()).await.unwrap();
    assert_eq!(rejection.reason, REASON_ADMIN_REJECTED);
    assert_eq!(rejection.kakao_id.as_deref(), Some("k-reject"));

    assert!(database.users.find_by_id(user.id).await.unwrap().is_none());
    assert_eq!(db.count_records("registrations").await.unwrap(), 0);

    let event = service.get_event(event.id).await.unwrap();
    assert_eq!(event.female_count, 0);

    let check = service.check_prior_rejection("k-reject", event.id).await.unwrap();
    assert!(check.was_rejected);
    assert_eq!(check.user_name.as_deref(), Some(user.name.as_str()));

    let clean = service.check_prior_rejection("k-someone-else", event.id).await.unwrap();
    assert!(!clean.was_rejected);
}

#[tokio::test]
#[serial]
async fn test_reject_missing_registration() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let service = RegistrationService::new(db.service(), RemovalPolicy::MembershipGuarded);

    let err = service.reject(9999).await.unwrap_err();
    assert_matches!(err, PartyGateError::RegistrationNotFound(_));
    assert_eq!(db.count_records("rejections").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_cancel_approved_frees_slot() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);

    let event = seed_event(&database, 5, 5).await;
    let (user, registration) = seed_pending(&database, &event, "k-cancel", Gender::Male).await;
    service.approve(registration.id()).await.unwrap();

    let outcome = service.cancel(user.id, event.id).await.unwrap();
    assert_eq!(outcome.registration_id, registration.id());
    assert_eq!(outcome.ledger.count_delta, -1);

    let event = service.get_event(event.id).await.unwrap();
    assert_eq!(event.male_count, 0);
    assert!(event.participants.is_empty());
    assert!(database.users.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_cancel_pending_keeps_counts_by_default() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);

    let event = seed_event(&database, 5, 5).await;
    let (approved_user, approved) = seed_pending(&database, &event, "k-a", Gender::Male).await;
    service.approve(approved.id()).await.unwrap();
    let (pending_user, _) = seed_pending(&database, &event, "k-p", Gender::Male).await;

    let outcome = service.cancel(pending_user.id, event.id).await.unwrap();
    assert!(!outcome.ledger.membership_changed);
    assert_eq!(outcome.ledger.count_delta, 0);

    let event = service.get_event(event.id).await.unwrap();
    assert_eq!(event.male_count, 1);
    assert_eq!(event.participants, vec![approved_user.id]);
}

#[tokio::test]
#[serial]
async fn test_cancel_pending_with_legacy_accounting_decrements() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::Unconditional);

    let event = seed_event(&database, 5, 5).await;
    let (user, _) = seed_pending(&database, &event, "k-legacy", Gender::Female).await;

    let outcome = service.cancel(user.id, event.id).await.unwrap();
    assert!(!outcome.ledger.membership_changed);
    assert_eq!(outcome.ledger.count_delta, -1);

    let event = service.get_event(event.id).await.unwrap();
    assert_eq!(event.female_count, -1);
}

#[tokio::test]
#[serial]
async fn test_cancel_without_registration() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);

    let event = seed_event(&database, 5, 5).await;
    let user = seed_user(&database, "k-none", Gender::Male).await;

    let err = service.cancel(user.id, event.id).await.unwrap_err();
    assert_matches!(err, PartyGateError::RegistrationNotFound(_));
    // Nothing was deleted
    assert!(database.users.find_by_id(user.id).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn test_current_event_prefers_open() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);

    assert!(service.current_event().await.unwrap().is_none());
    assert_matches!(
        service.require_current_event().await,
        Err(PartyGateError::EventNotFound { .. })
    );

    let full = database.events.create(event_request("만석 파티", 5, 5, EventStatus::Full)).await.unwrap();
    database.events.create(event_request("지난 파티", 5, 5, EventStatus::Closed)).await.unwrap();
    assert_eq!(service.current_event().await.unwrap().unwrap().event.id, full.id);

    let open = database.events.create(event_request("열린 파티", 0, 3, EventStatus::Open)).await.unwrap();
    let current = service.current_event().await.unwrap().unwrap();
    assert_eq!(current.event.id, open.id);
    assert_eq!(current.slots.male_slots, 5);
    assert_eq!(current.slots.female_slots, 3);
    assert!(current.slots.can_join);
}

#[tokio::test]
#[serial]
async fn test_questionnaire_answers_and_report() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let registrations = RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded);
    let questionnaire = QuestionnaireService::new(database.clone());
    let report = ReportService::new(database.clone());

    let food = questionnaire
        .create_question(CreateQuestionRequest {
            title: "좋아하는 음식은?".to_string(),
            subtitle: None,
            required: true,
            sort_order: 1,
        })
        .await
        .unwrap();
    let mbti = questionnaire
        .create_question(CreateQuestionRequest {
            title: "MBTI".to_string(),
            subtitle: Some("모르면 비워두세요".to_string()),
            required: false,
            sort_order: 2,
        })
        .await
        .unwrap();

    let event = seed_event(&database, 5, 5).await;
    let (user, registration) = seed_pending(&database, &event, "k-q", Gender::Female).await;
    let (_, pending) = seed_pending(&database, &event, "k-q2", Gender::Male).await;
    registrations.approve(registration.id()).await.unwrap();

    let mut answers = HashMap::new();
    answers.insert(food.id, "  마라탕 ".to_string());
    answers.insert(404, "unknown question".to_string());
    let stored = questionnaire.save_answers(user.id, event.id, answers).await.unwrap();
    assert_eq!(stored.total_questions, 2);
    assert_eq!(stored.answers.len(), 2);

    let map = questionnaire.answers(user.id, event.id).await.unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&food.id).map(String::as_str), Some("마라탕"));
    assert!(!map.contains_key(&mbti.id));

    // Saving again replaces the earlier answers
    let mut updated = HashMap::new();
    updated.insert(mbti.id, "ENFP".to_string());
    questionnaire.save_answers(user.id, event.id, updated).await.unwrap();
    let map = questionnaire.answers(user.id, event.id).await.unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&mbti.id).map(String::as_str), Some("ENFP"));

    questionnaire.delete_question(mbti.id).await.unwrap();
    assert_matches!(
        questionnaire.delete_question(mbti.id).await,
        Err(PartyGateError::QuestionNotFound { .. })
    );

    let stats = report.event_stats(event.id).await.unwrap();
    assert_eq!(stats.female.approved, 1);
    assert_eq!(stats.male.pending, 1);
    assert_eq!(stats.male.remaining, 4);
    assert_eq!(stats.female.remaining, 4);

    let participants = report.participant_report(event.id).await.unwrap();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].user.id, user.id);
    assert_eq!(participants[0].answers.len(), 2);

    let pending_list = registrations.pending(event.id).await.unwrap();
    assert_eq!(pending_list.len(), 1);
    assert_eq!(pending_list[0].registration_id, pending.id());

    // Cancelling removes the stored answers
    registrations.cancel(user.id, event.id).await.unwrap();
    assert_eq!(db.count_records("questionnaire_answers").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_save_answers_requires_existing_user() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let questionnaire = QuestionnaireService::new(database.clone());
    let event = seed_event(&database, 5, 5).await;

    let err = questionnaire.save_answers(777, event.id, HashMap::new()).await.unwrap_err();
    assert_matches!(err, PartyGateError::UserNotFound { user_id: 777 });
}

#[tokio::test]
#[serial]
async fn test_menu_items() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let questionnaire = QuestionnaireService::new(db.service());

    questionnaire.create_menu_item("하이볼").await.unwrap();
    let beer = questionnaire.create_menu_item(" 생맥주 ").await.unwrap();
    assert_eq!(beer.name, "생맥주");

    let names: Vec<String> = questionnaire.menu().await.unwrap().into_iter().map(|item| item.name).collect();
    assert_eq!(names, vec!["생맥주".to_string(), "하이볼".to_string()]);

    questionnaire.delete_menu_item(beer.id).await.unwrap();
    assert_matches!(
        questionnaire.delete_menu_item(beer.id).await,
        Err(PartyGateError::MenuItemNotFound { .. })
    );
    assert_matches!(questionnaire.create_menu_item("   ").await, Err(PartyGateError::InvalidInput(_)));
}

#[tokio::test]
#[serial]
async fn test_resaving_answers_refreshes_completion_time() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let questionnaire = QuestionnaireService::new(database.clone());

    let event = seed_event(&database, 5, 5).await;
    let user = seed_user(&database, "k-resave", Gender::Female).await;

    let first = questionnaire.save_answers(user.id, event.id, HashMap::new()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = questionnaire.save_answers(user.id, event.id, HashMap::new()).await.unwrap();

    assert_eq!(second.id, first.id);
    assert!(second.completed_at > first.completed_at);

    let summaries = questionnaire.answers_for_event(event.id).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].completed_at, second.completed_at);
}

#[tokio::test]
#[serial]
async fn test_concurrent_approvals_keep_ledger_consistent() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = Arc::new(RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded));

    let event = seed_event(&database, 30, 30).await;
    let mut registration_ids = Vec::new();
    for i in 0..20 {
        let (_, registration) = seed_pending(&database, &event, &format!("k-rush-{}", i), Gender::Male).await;
        registration_ids.push(registration.id());
    }

    let handles = registration_ids.into_iter().map(|id| {
        let service = service.clone();
        tokio::spawn(async move { service.approve(id).await })
    });
    for result in join_all(handles).await {
        assert!(result.unwrap().is_ok());
    }

    let event = service.get_event(event.id).await.unwrap();
    assert_eq!(event.male_count, 20);
    assert_eq!(event.male_count as usize, event.participants.len());
}

#[tokio::test]
#[serial]
async fn test_concurrent_approvals_and_cancellations_keep_ledger_consistent() {
    let Some(db) = TestDatabase::try_new().await else { return };
    let database = db.service();
    let service = Arc::new(RegistrationService::new(database.clone(), RemovalPolicy::MembershipGuarded));

    let event = seed_event(&database, 30, 30).await;
    let mut approved_users = Vec::new();
    for i in 0..10 {
        let (user, registration) = seed_pending(&database, &event, &format!("k-early-{}", i), Gender::Male).await;
        service.approve(registration.id()).await.unwrap();
        approved_users.push(user.id);
    }
    let mut pending_ids = Vec::new();
    for i in 0..10 {
        let (_, registration) = seed_pending(&database, &event, &format!("k-late-{}", i), Gender::Male).await;
        pending_ids.push(registration.id());
    }

    let mut handles = Vec::new();
    for id in pending_ids {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.approve(id).await.map(|_| ()) }));
    }
    for user_id in approved_users.iter().take(5).copied() {
        let service = service.clone();
        let event_id = event.id;
        handles.push(tokio::spawn(async move { service.cancel(user_id, event_id).await.map(|_| ()) }));
    }
    for result in join_all(handles).await {
        assert!(result.unwrap().is_ok());
    }

    let event = service.get_event(event.id).await.unwrap();
    assert_eq!(event.male_count, 15);
    assert_eq!(event.male_count as usize, event.participants.len());
    for user_id in approved_users.iter().take(5) {
        assert!(!event.participants.contains(user_id));
    }
}
