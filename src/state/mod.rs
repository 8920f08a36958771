//! State management module
//!
//! This module holds the shared application context and signup sessions

pub mod context;
pub mod storage;

// Re-export commonly used state components
pub use context::{AppContext, SignupSession, PaymentOrder, PaymentResult};
pub use storage::SessionStorage;
