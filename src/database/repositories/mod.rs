//! Database repositories module
//! 
//! This module contains all repository implementations for data access

pub mod user;
pub mod event;
pub mod registration;
pub mod rejection;
pub mod questionnaire;
pub mod menu;

// Re-export repositories
pub use user::UserRepository;
pub use event::EventRepository;
pub use registration::RegistrationRepository;
pub use rejection::RejectionRepository;
pub use questionnaire::{QuestionRepository, AnswerRepository};
pub use menu::MenuRepository;
