//! Test data builders

use chrono::{Duration, Utc};
use PartyGate::database::DatabaseService;
use PartyGate::models::{
    CreateEventRequest, CreateUserRequest, Event, EventStatus, Gender, NewRegistration, Registration, User,
};

pub fn event_request(title: &str, max_male: i32, max_female: i32, status: EventStatus) -> CreateEventRequest {
    CreateEventRequest {
        title: title.to_string(),
        event_date: Utc::now() + Duration::days(7),
        time_label: "오후 8:00 - 11:00".to_string(),
        location: "강남 파티룸".to_string(),
        address: "서울 강남구 테헤란로 1".to_string(),
        mc_name: "MC 준".to_string(),
        description: "테스트 파티".to_string(),
        rules: vec!["지각 금지".to_string()],
        price: 30000,
        max_male_slots: max_male,
        max_female_slots: max_female,
        status: Some(status),
    }
}

pub fn user_request(kakao_id: &str, name: &str, gender: Gender) -> CreateUserRequest {
    CreateUserRequest {
        kakao_id: Some(kakao_id.to_string()),
        name: name.to_string(),
        phone_number: Some("01012345678".to_string()),
        gender,
        age: 27,
    }
}

pub async fn seed_event(database: &DatabaseService, max_male: i32, max_female: i32) -> Event {
    database
        .events
        .create(event_request("꺄르륵 파티", max_male, max_female, EventStatus::Open))
        .await
        .expect("Failed to create event")
}

pub async fn seed_user(database: &DatabaseService, kakao_id: &str, gender: Gender) -> User {
    database
        .initialize_user(user_request(kakao_id, &format!("guest-{}", kakao_id), gender))
        .await
        .expect("Failed to create user")
}

/// User with a pending bank transfer registration for the event
pub async fn seed_pending(database: &DatabaseService, event: &Event, kakao_id: &str, gender: Gender) -> (User, Registration) {
    let user = seed_user(database, kakao_id, gender).await;
    let registration = database
        .create_registration(NewRegistration::bank_transfer(user.id, event.id))
        .await
        .expect("Failed to create registration");
    (user, registration)
}
