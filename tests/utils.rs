#![allow(dead_code)]

use std::sync::Arc;

use fetchmock::{FetchMockError, Response};

pub const BLOCKED_MAPADO: &str = "Unable to fetch \"https://www.mapado.com\": it seems that you did block all calls but that you did not mock any call at all by calling `fetchMock`";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Puts the global hook back to its start-of-process state.
/// Every test touching the global hook calls this first and runs `#[serial]`.
pub fn reset_global() {
    init_logging();
    fetchmock::reset_mocks();
    fetchmock::restore_passthrough();
}

pub fn hello_world() -> Arc<Response> {
    Arc::new(Response::new("Hello world !"))
}

pub fn no_match(method: &str, url: &str) -> String {
    FetchMockError::NoMatchFound {
        method: method.to_string(),
        url: url.to_string(),
    }
    .to_string()
}
