//! The authenticated request pipeline.
//!
//! Every call goes through [`ApiClient::send`]: standard headers, optional
//! bearer token, uniform error surfacing, and camelCase normalization of the
//! response body.

use std::sync::Arc;

use log::{debug, error, warn};
use reqwest::header::{
    AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};
use reqwest::{Method, StatusCode};
use roster_core::normalize::camel_case_keys;
use roster_core::session::{LOGIN_PATH, SessionStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::navigator::Navigator;

/// Header marking requests as programmatic rather than navigations.
pub const REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Message used when neither the body nor the status carries one.
const FALLBACK_ERROR_MESSAGE: &str = "API request failed";

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Attach the access token as a bearer credential when one is stored.
    pub requires_auth: bool,
    /// Extra headers; they override the standard ones.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn authenticated() -> Self {
        Self {
            requires_auth: true,
            ..Default::default()
        }
    }
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

/// HTTP client for the Roster API. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        // The cookie store sends server-set cookies back on later calls.
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.clone(),
                session,
                navigator,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Headers for a request with `options`.
    pub fn build_headers(&self, options: &RequestOptions) -> ApiResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }

        if options.requires_auth {
            match self.inner.session.access_token() {
                Ok(Some(token)) => {
                    let value = HeaderValue::from_str(&format!("Bearer {token}"))
                        .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
                    headers.insert(AUTHORIZATION, value);
                }
                Ok(None) => debug!("no access token stored; sending unauthenticated"),
                Err(e) => warn!("failed to read access token: {e}"),
            }
        }

        Ok(headers)
    }

    /// Issue a request and return the normalized JSON body.
    ///
    /// `Ok(None)` means the server answered with no content.
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        options: &RequestOptions,
    ) -> ApiResult<Option<Value>> {
        let url = format!("{}{endpoint}", self.inner.base_url);
        let headers = self.build_headers(options)?;
        debug!("{method} {url}");

        let mut request = self.inner.http.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(&body)?);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.handle_unauthorized();
            }
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            warn!("{method} {url} failed: {} {message}", status.as_u16());
            return Err(if status == StatusCode::UNAUTHORIZED {
                ApiError::Unauthorized(message)
            } else {
                ApiError::Status {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let json: Value = serde_json::from_slice(&bytes)?;
        Ok(Some(camel_case_keys(json)))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        decode(self.send(Method::GET, endpoint, None, options).await?)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        decode(self.send(Method::POST, endpoint, Some(body), options).await?)
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        decode(self.send(Method::PUT, endpoint, Some(body), options).await?)
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> ApiResult<T> {
        decode(self.send(Method::DELETE, endpoint, None, options).await?)
    }

    /// Purge credentials and send the user to the login page.
    fn handle_unauthorized(&self) {
        if let Err(e) = self.inner.session.clear() {
            error!("failed to clear credentials after 401: {e}");
        }
        self.inner.navigator.redirect(LOGIN_PATH);
    }
}

/// Best-effort error message: the body's `message` string, else the status
/// text, else a generic fallback.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string));

    let message = from_body.unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_string());
    if message.is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// Decode a normalized body; an empty body decodes as JSON `null`.
fn decode<T: DeserializeOwned>(body: Option<Value>) -> ApiResult<T> {
    Ok(serde_json::from_value(body.unwrap_or(Value::Null))?)
}
