//! Shortcut matchers for one HTTP verb plus one test on the URL.
//!
//! ```rust,ignore
//! use fetchmock::mock::helpers::{helper, UrlTest};
//! use reqwest::Method;
//!
//! helper(Method::POST, UrlTest::StartsWith)
//!     .register(fetchmock::global(), "https://api.example.com/orders", Response::new("{}"))?;
//! ```
//!
//! Helpers add no matching rules of their own: each one builds an ordinary
//! [`Matcher`] and registers it like any other.

use super::Matcher;
use crate::error::FetchMockError;
use crate::network::FetchHook;
use crate::request::{extract_method, extract_url};
use crate::response::Response;
use log::debug;
use regex::Regex;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

/// Key of a JSON pattern object, as in `{"pattern": "^https://api\\."}`.
pub const PATTERN_KEY: &str = "pattern";

/// How a text URL shape is compared with the call's URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, EnumString)]
pub enum UrlTest {
    #[strum(serialize = "exact")]
    Exact,
    #[strum(serialize = "starts_with")]
    StartsWith,
    #[strum(serialize = "ends_with")]
    EndsWith,
    #[strum(serialize = "contains")]
    Contains,
}

/// What a helper tests the URL against.
#[derive(Debug, Clone)]
pub enum UrlShape {
    Text(String),
    /// A pattern is always tested with `is_match`, whatever the [`UrlTest`].
    Pattern(Regex),
}

impl UrlShape {
    pub fn test(&self, mode: UrlTest, url: &str) -> bool {
        match self {
            UrlShape::Pattern(pattern) => pattern.is_match(url),
            UrlShape::Text(text) => match mode {
                UrlTest::Exact => url == text,
                UrlTest::StartsWith => url.starts_with(text.as_str()),
                UrlTest::EndsWith => url.ends_with(text.as_str()),
                UrlTest::Contains => url.contains(text.as_str()),
            },
        }
    }
}

/// Anything a helper accepts as its URL argument.
///
/// Strings and regexes always convert. JSON values convert when they are a
/// string or a pattern object, and fail with
/// [`FetchMockError::InvalidHelperMatcher`] otherwise.
pub trait IntoUrlShape {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError>;
}

impl IntoUrlShape for UrlShape {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        Ok(self)
    }
}

impl IntoUrlShape for &str {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        Ok(UrlShape::Text(self.to_string()))
    }
}

impl IntoUrlShape for String {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        Ok(UrlShape::Text(self))
    }
}

impl IntoUrlShape for &String {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        Ok(UrlShape::Text(self.clone()))
    }
}

impl IntoUrlShape for Regex {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        Ok(UrlShape::Pattern(self))
    }
}

impl IntoUrlShape for &Regex {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        Ok(UrlShape::Pattern(self.clone()))
    }
}

impl IntoUrlShape for Value {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        match self {
            Value::String(text) => Ok(UrlShape::Text(text)),
            Value::Object(map) => match map.get(PATTERN_KEY) {
                Some(Value::String(source)) if map.len() == 1 => Regex::new(source)
                    .map(UrlShape::Pattern)
                    .map_err(|e| FetchMockError::InvalidPattern {
                        pattern: source.clone(),
                        reason: e.to_string(),
                    }),
                _ => Err(FetchMockError::InvalidHelperMatcher),
            },
            _ => Err(FetchMockError::InvalidHelperMatcher),
        }
    }
}

impl IntoUrlShape for &Value {
    fn into_url_shape(self) -> Result<UrlShape, FetchMockError> {
        self.clone().into_url_shape()
    }
}

/// A verb and a URL test, ready to build matchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Helper {
    method: Method,
    test: UrlTest,
}

/// Builds the helper for `method` and `test`.
pub fn helper(method: Method, test: UrlTest) -> Helper {
    Helper { method, test }
}

impl Helper {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn test(&self) -> UrlTest {
        self.test
    }

    /// Builds the matcher without registering it. Fails before building
    /// anything when `url` is not a usable shape.
    pub fn matcher<U, R>(&self, url: U, response: R) -> Result<Matcher, FetchMockError>
    where
        U: IntoUrlShape,
        R: Into<Arc<Response>>,
    {
        let shape = url.into_url_shape()?;
        let method = self.method.as_str().to_uppercase();
        let test = self.test;
        Ok(Matcher::new(
            move |input, options| {
                extract_method(options) == method && shape.test(test, &extract_url(input))
            },
            response,
        ))
    }

    /// Builds the matcher and registers it on `hook`. Nothing is registered
    /// when the URL shape is rejected.
    pub fn register<U, R>(
        &self,
        hook: &FetchHook,
        url: U,
        response: R,
    ) -> Result<(), FetchMockError>
    where
        U: IntoUrlShape,
        R: Into<Arc<Response>>,
    {
        let matcher = self.matcher(url, response)?;
        debug!("registering {} {} helper", self.method, self.test);
        hook.register_matcher(matcher);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{FetchInput, RequestOptions};
    use serde_json::json;

    #[test]
    fn test_text_shapes() {
        let shape = UrlShape::Text("https://api.test/v1".to_string());
        assert!(shape.test(UrlTest::Exact, "https://api.test/v1"));
        assert!(!shape.test(UrlTest::Exact, "https://api.test/v1/"));
        assert!(shape.test(UrlTest::StartsWith, "https://api.test/v1/items"));
        assert!(shape.test(UrlTest::EndsWith, "http://mirror/https://api.test/v1"));
        assert!(shape.test(UrlTest::Contains, "proxy?u=https://api.test/v1&x=1"));
        assert!(!shape.test(UrlTest::Contains, "https://api.test/v2"));
    }

    #[test]
    fn test_pattern_ignores_mode() {
        let shape = UrlShape::Pattern(Regex::new(r"/events/\d+$").unwrap());
        for mode in [UrlTest::Exact, UrlTest::StartsWith, UrlTest::EndsWith, UrlTest::Contains] {
            assert!(shape.test(mode, "https://api.test/events/42"));
            assert!(!shape.test(mode, "https://api.test/events/abc"));
        }
    }

    #[test]
    fn test_json_shapes() {
        assert!(matches!(
            json!("https://api.test").into_url_shape(),
            Ok(UrlShape::Text(_))
        ));
        assert!(matches!(
            json!({"pattern": "^https://"}).into_url_shape(),
            Ok(UrlShape::Pattern(_))
        ));
        let invalid_shapes = [
            json!(42),
            json!(null),
            json!(["a"]),
            json!({"url": "x"}),
            json!({"pattern": 1}),
        ];
        for invalid in invalid_shapes {
            assert!(matches!(
                invalid.into_url_shape(),
                Err(FetchMockError::InvalidHelperMatcher)
            ));
        }
    }

    #[test]
    fn test_json_pattern_that_does_not_compile() {
        let err = json!({"pattern": "(unclosed"}).into_url_shape().unwrap_err();
        assert!(matches!(err, FetchMockError::InvalidPattern { .. }));
    }

    #[test]
    fn test_helper_matcher_checks_method_and_url() {
        let matcher = helper(Method::PUT, UrlTest::Exact)
            .matcher(Regex::new(r"^https://api\.test/items/\d+$").unwrap(), Response::empty())
            .unwrap();
        let put = RequestOptions::with_method("put");
        let patch = RequestOptions::with_method("PATCH");

        let input = FetchInput::from("https://api.test/items/3");
        assert!(matcher.matches(&input, Some(&put)).unwrap());
        assert!(!matcher.matches(&input, Some(&patch)).unwrap());
        assert!(!matcher.matches(&input, None).unwrap());
    }

    #[test]
    fn test_get_helper_accepts_missing_options() {
        let matcher = helper(Method::GET, UrlTest::StartsWith)
            .matcher("https://api.test", Response::empty())
            .unwrap();
        assert!(matcher.matches(&FetchInput::from("https://api.test/a"), None).unwrap());
    }

    #[test]
    fn test_rejected_shape_registers_nothing() {
        let hook = FetchHook::new();
        let err = helper(Method::POST, UrlTest::Exact)
            .register(&hook, json!(true), Response::empty())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "input must be a string or a RegExp when using fetchMock helper"
        );
        assert_eq!(hook.matcher_count(), 0);
        assert_eq!(hook.mode(), crate::network::Mode::Passthrough);
    }

    #[test]
    fn test_url_test_names() {
        assert_eq!(UrlTest::StartsWith.to_string(), "starts_with");
        assert_eq!("contains".parse::<UrlTest>().unwrap(), UrlTest::Contains);
    }
}
