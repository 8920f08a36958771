//! Test helpers module
//!
//! Database and Redis backends for integration tests plus data builders.
//! Backends resolve to `None` when neither an explicit URL nor Docker is
//! available, and the calling test returns early.

#![allow(dead_code)]

pub mod database_helper;
pub mod redis_helper;
pub mod test_data;

pub use database_helper::*;
pub use redis_helper::*;
pub use test_data::*;

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}
