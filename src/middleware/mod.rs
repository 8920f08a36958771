//! Middleware module
//!
//! This module contains middleware for request processing

pub mod auth;
pub mod rate_limit;

// Re-export commonly used middleware
pub use auth::{require_admin, require_gate_pass, require_member_pass, GATE_PASS_HEADER, MEMBER_PASS_HEADER};
pub use rate_limit::{RateLimitConfig, RateLimitMiddleware};
