//! The real-network handler: what a [`super::FetchHook`] holds before any
//! blocker or mock is installed.

use super::{Fetch, FetchFuture, FetchResult, Mode};
use crate::config::Config;
use crate::error::FetchMockError;
use crate::request::{FetchInput, RequestOptions, extract_url};
use crate::response::Response;
use log::debug;
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

pub(crate) fn build_client(config: &Config) -> Result<reqwest::Client, FetchMockError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout() {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(user_agent) = config.user_agent() {
        builder = builder.user_agent(user_agent.as_str());
    }
    builder
        .build()
        .map_err(|e| FetchMockError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// Sends calls to the network with a `reqwest::Client` built from [`Config`].
///
/// The client is created on first use and reused afterwards.
pub struct Passthrough {
    config: Config,
    client: Mutex<Option<reqwest::Client>>,
}

impl Passthrough {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    fn client(&self) -> Result<reqwest::Client, FetchMockError> {
        let mut slot = self.client.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = build_client(&self.config)?;
        debug!("built passthrough client {}", self.config);
        *slot = Some(client.clone());
        Ok(client)
    }
}

impl Fetch for Passthrough {
    fn fetch(&self, input: FetchInput, options: Option<RequestOptions>) -> FetchFuture {
        let client = self.client();
        Box::pin(async move {
            if tokio::runtime::Handle::try_current().is_err() {
                return Err(FetchMockError::NoRuntime {
                    url: extract_url(&input),
                });
            }
            let client = client?;
            let request = build_request(input, options)?;
            let response = client.execute(request).await?;
            into_response(response).await
        })
    }

    fn mode(&self) -> Mode {
        Mode::Passthrough
    }
}

/// Turns a call into a `reqwest::Request`. Request inputs keep their own
/// method, headers and body; options override the method and body and add headers.
fn build_request(
    input: FetchInput,
    options: Option<RequestOptions>,
) -> Result<reqwest::Request, FetchMockError> {
    let mut request = match input {
        FetchInput::Text(url) => {
            let parsed = Url::parse(&url).map_err(|e| FetchMockError::Internal {
                message: format!("Invalid URL '{}': {}", url, e),
            })?;
            reqwest::Request::new(Method::GET, parsed)
        }
        FetchInput::Url(url) => reqwest::Request::new(Method::GET, url),
        FetchInput::Request(request) => request,
    };

    let Some(options) = options else {
        return Ok(request);
    };

    if let Some(method) = options.method.as_deref().filter(|m| !m.is_empty()) {
        *request.method_mut() = Method::from_bytes(method.to_uppercase().as_bytes()).map_err(
            |e| FetchMockError::Internal {
                message: format!("Invalid HTTP method '{}': {}", method, e),
            },
        )?;
    }
    for (name, value) in &options.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchMockError::Internal {
                message: format!("Invalid header name '{}': {}", name, e),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| FetchMockError::Internal {
            message: format!("Invalid value for header '{}': {}", name, e),
        })?;
        request.headers_mut().append(header_name, header_value);
    }
    if let Some(body) = options.body {
        *request.body_mut() = Some(body.into());
    }
    Ok(request)
}

async fn into_response(response: reqwest::Response) -> FetchResult {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    // Non-UTF-8 header values are dropped.
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.bytes().await?;

    let converted = headers.iter().fold(
        Response::new(body.to_vec()).with_status(status).with_url(url),
        |response, (name, value)| response.with_header(name, value),
    );
    Ok(Arc::new(converted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_from_text() {
        let request = build_request(FetchInput::from("https://www.mapado.com/v1"), None).unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url().as_str(), "https://www.mapado.com/v1");
    }

    #[test]
    fn test_build_request_applies_options() {
        let options = RequestOptions::with_method("post")
            .header("x-token", "abc")
            .body("payload");
        let request =
            build_request(FetchInput::from("https://api.test/items"), Some(options)).unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.headers().get("x-token").unwrap().to_str().unwrap(), "abc");
        assert_eq!(request.body().and_then(|b| b.as_bytes()), Some(&b"payload"[..]));
    }

    #[test]
    fn test_build_request_keeps_request_method() {
        let url = Url::parse("https://api.test/items/1").unwrap();
        let original = reqwest::Request::new(Method::DELETE, url);
        let request =
            build_request(FetchInput::from(original), Some(RequestOptions::new())).unwrap();
        assert_eq!(request.method(), &Method::DELETE);
    }

    #[test]
    fn test_build_request_rejects_relative_text_url() {
        let err = build_request(FetchInput::from("/relative/path"), None).unwrap_err();
        assert!(err.to_string().contains("Invalid URL '/relative/path'"));
    }

    #[test]
    fn test_outside_runtime_is_an_error() {
        let pending = Passthrough::new(Config::with_defaults())
            .fetch(FetchInput::from("http://127.0.0.1:9/"), None);
        let err = futures_executor::block_on(pending).unwrap_err();
        match err {
            FetchMockError::NoRuntime { url } => assert_eq!(url, "http://127.0.0.1:9/"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_build_request_rejects_bad_header() {
        let options = RequestOptions::new().header("bad header", "x");
        let err = build_request(FetchInput::from("https://api.test"), Some(options)).unwrap_err();
        assert!(err.to_string().contains("Invalid header name"));
    }
}
