//! Request descriptor normalization.
//!
//! A fetch call receives heterogeneous input: a plain string, a parsed
//! [`Url`], or a full [`reqwest::Request`]. Matching and error reporting only
//! ever look at the normalized `(url, method)` pair computed here.

use std::fmt;
use url::Url;

/// Method used when a call does not name one.
pub const DEFAULT_METHOD: &str = "GET";

/// The first argument of a fetch call.
#[derive(Debug)]
pub enum FetchInput {
    /// A URL given as a plain string, kept exactly as written.
    Text(String),
    /// A parsed URL.
    Url(Url),
    /// A request that already carries its own URL, method, headers and body.
    ///
    /// Only its URL is used for matching. Its method is not: without
    /// [`RequestOptions`] the call is reported and matched as `GET`.
    Request(reqwest::Request),
}

impl From<&str> for FetchInput {
    fn from(value: &str) -> Self {
        FetchInput::Text(value.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(value: String) -> Self {
        FetchInput::Text(value)
    }
}

impl From<&String> for FetchInput {
    fn from(value: &String) -> Self {
        FetchInput::Text(value.clone())
    }
}

impl From<Url> for FetchInput {
    fn from(value: Url) -> Self {
        FetchInput::Url(value)
    }
}

impl From<&Url> for FetchInput {
    fn from(value: &Url) -> Self {
        FetchInput::Url(value.clone())
    }
}

impl From<reqwest::Request> for FetchInput {
    fn from(value: reqwest::Request) -> Self {
        FetchInput::Request(value)
    }
}

impl fmt::Display for FetchInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", extract_url(self))
    }
}

/// The optional second argument of a fetch call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// HTTP method in any casing. `None` means GET.
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for options that only carry a method.
    pub fn with_method(method: &str) -> Self {
        Self::new().method(method)
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Normalized `(url, method)` pair of a single call. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: String,
}

impl RequestDescriptor {
    pub fn from_call(input: &FetchInput, options: Option<&RequestOptions>) -> Self {
        Self {
            url: extract_url(input),
            method: extract_method(options),
        }
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Returns the full URL of a fetch input.
///
/// Strings are returned unchanged, parsed URLs in their serialized form, and
/// requests yield their own URL. No validation happens here.
pub fn extract_url(input: &FetchInput) -> String {
    match input {
        FetchInput::Text(url) => url.clone(),
        FetchInput::Url(url) => url.to_string(),
        FetchInput::Request(request) => request.url().to_string(),
    }
}

/// Returns the uppercased method of the given options, or `GET` when the
/// options are absent or name no method.
pub fn extract_method(options: Option<&RequestOptions>) -> String {
    options
        .and_then(|options| options.method.as_deref())
        .filter(|method| !method.is_empty())
        .map(|method| method.to_uppercase())
        .unwrap_or_else(|| DEFAULT_METHOD.to_string())
}
