use crate::error::FetchMockError;
use getset::{CopyGetters, Getters};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A response returned by a fetch call.
///
/// Canned responses are registered once and handed back as the same
/// `Arc<Response>` on every match; the passthrough handler builds a fresh one
/// from the live HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Response {
    #[getset(get_copy = "pub")]
    status: u16,
    #[getset(get = "pub")]
    headers: Vec<(String, String)>,
    #[getset(get = "pub")]
    body: Vec<u8>,
    /// Final URL, only known for responses that came from the network.
    #[getset(get = "pub")]
    url: Option<String>,
}

impl Response {
    /// A `200` response with the given body.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
            url: None,
        }
    }

    /// A `200` response with an empty body.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A `200` response whose body is `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, FetchMockError> {
        let body = serde_json::to_vec(value)?;
        Ok(Self::new(body).with_header("content-type", "application/json"))
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub(crate) fn with_url(mut self, url: String) -> Self {
        self.url = Some(url);
        self
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Result<&str, FetchMockError> {
        std::str::from_utf8(&self.body).map_err(|e| FetchMockError::Internal {
            message: format!("Response body is not valid UTF-8: {}", e),
        })
    }

    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, FetchMockError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::empty()
    }
}
