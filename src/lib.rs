//! Test doubles for outbound fetch calls.
//!
//! Code under test sends its requests through [`fetch`] (or through a
//! [`FetchHook`] it was handed). Tests then either forbid the network
//! altogether with [`install_blocker`], or answer chosen requests with canned
//! responses through [`register_mock`] and the verb shortcuts.
//!
//! ```rust,ignore
//! use fetchmock::{Response, RequestOptions};
//!
//! fetchmock::install_blocker();
//! fetchmock::register_mock(
//!     |input, _| fetchmock::extract_url(input).starts_with("https://api.example.com"),
//!     Response::new("Hello world !"),
//! );
//!
//! let response = fetchmock::fetch_blocking("https://api.example.com/hello", None)?;
//! assert_eq!(response.text()?, "Hello world !");
//!
//! fetchmock::reset_mocks();
//! ```

use std::sync::Arc;

pub mod blocker;
pub mod config;
pub mod error;
pub mod mock;
pub mod network;
pub mod request;
pub mod response;

pub use config::Config;
pub use error::FetchMockError;
pub use mock::helpers::{Helper, IntoUrlShape, UrlShape, UrlTest, helper};
pub use mock::{Matcher, MatcherRegistry};
pub use network::{Fetch, FetchFuture, FetchHook, FetchResult, Mode, global};
pub use request::{
    DEFAULT_METHOD, FetchInput, RequestDescriptor, RequestOptions, extract_method, extract_url,
};
pub use response::Response;

/// Fails every later call made through [`fetch`] with
/// [`FetchMockError::AllCallsBlocked`], until something else is installed.
pub fn install_blocker() {
    global().install_blocker();
}

/// Answers calls accepted by `predicate` with `response`. Newer registrations
/// take priority over older ones.
pub fn register_mock<P, R>(predicate: P, response: R)
where
    P: Fn(&FetchInput, Option<&RequestOptions>) -> bool + Send + Sync + 'static,
    R: Into<Arc<Response>>,
{
    global().register_mock(predicate, response);
}

pub fn register_matcher(matcher: Matcher) {
    global().register_matcher(matcher);
}

/// Forgets every registered matcher. Mocking stays installed.
pub fn reset_mocks() {
    global().reset_mocks();
}

pub fn restore_passthrough() {
    global().restore_passthrough();
}

/// The fetch entry point for code under test.
pub fn fetch<I: Into<FetchInput>>(input: I, options: Option<RequestOptions>) -> FetchFuture {
    global().fetch(input, options)
}

pub fn fetch_blocking<I: Into<FetchInput>>(
    input: I,
    options: Option<RequestOptions>,
) -> FetchResult {
    global().fetch_blocking(input, options)
}

/// Registers a matcher for `method` calls whose URL passes `test` against `url`.
pub fn register_url<U, R>(
    method: reqwest::Method,
    test: UrlTest,
    url: U,
    response: R,
) -> Result<(), FetchMockError>
where
    U: IntoUrlShape,
    R: Into<Arc<Response>>,
{
    helper(method, test).register(global(), url, response)
}

/// Exact-URL (or pattern) GET mock.
///
/// The verb shortcuts compare against the method in [`RequestOptions`] only.
/// A [`FetchInput::Request`] sent without options counts as `GET`, whatever
/// its own method is, so `delete(..)` never matches it. Pass
/// `RequestOptions::with_method("DELETE")` along with such a request.
pub fn get<U, R>(url: U, response: R) -> Result<(), FetchMockError>
where
    U: IntoUrlShape,
    R: Into<Arc<Response>>,
{
    register_url(reqwest::Method::GET, UrlTest::Exact, url, response)
}

pub fn post<U, R>(url: U, response: R) -> Result<(), FetchMockError>
where
    U: IntoUrlShape,
    R: Into<Arc<Response>>,
{
    register_url(reqwest::Method::POST, UrlTest::Exact, url, response)
}

pub fn put<U, R>(url: U, response: R) -> Result<(), FetchMockError>
where
    U: IntoUrlShape,
    R: Into<Arc<Response>>,
{
    register_url(reqwest::Method::PUT, UrlTest::Exact, url, response)
}

pub fn patch<U, R>(url: U, response: R) -> Result<(), FetchMockError>
where
    U: IntoUrlShape,
    R: Into<Arc<Response>>,
{
    register_url(reqwest::Method::PATCH, UrlTest::Exact, url, response)
}

/// See [`get`] for how [`FetchInput::Request`] inputs are matched.
pub fn delete<U, R>(url: U, response: R) -> Result<(), FetchMockError>
where
    U: IntoUrlShape,
    R: Into<Arc<Response>>,
{
    register_url(reqwest::Method::DELETE, UrlTest::Exact, url, response)
}
