//! Request descriptors

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::headers::Headers;

/// Name of the header carrying the desired response content type
pub const ACCEPT: &str = "accept";

/// Content type requested by JSON consumers
pub const APPLICATION_JSON: &str = "application/json";

/// Content type requested by text consumers
pub const TEXT_ANY: &str = "text/*";

/// Credentials mode of a browser request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// Never send credentials
    Omit,
    /// Send credentials to the same origin only
    SameOrigin,
    /// Always send credentials
    Include,
}

/// Mode of a browser request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Cross-origin request subject to CORS
    Cors,
    /// Opaque cross-origin request
    NoCors,
    /// Same-origin request
    SameOrigin,
    /// Navigation request
    Navigate,
}

/// Options for a single request
///
/// `cancel` is handed to the transport untouched; cancelling the token aborts
/// the request and any body read that follows.
///
/// `credentials` and `mode` only mean something to browser-like transports.
/// [`ReqwestTransport`](crate::ReqwestTransport) ignores them, and the
/// `Server` and `Pooled` profiles clear them before dispatch.
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    /// HTTP method, `GET` by default
    pub method: Method,
    /// Request headers
    pub headers: Option<Headers>,
    /// Request body
    pub body: Option<Vec<u8>>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Cancellation token observed by the transport
    pub cancel: Option<CancellationToken>,
    /// Browser credentials mode, ignored by socket transports
    pub credentials: Option<Credentials>,
    /// Browser request mode, ignored by socket transports
    pub mode: Option<RequestMode>,
}

impl RequestInit {
    /// Options for a plain `GET`
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set a single header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .set(name, value);
        self
    }

    /// Replace all headers, normalizing whatever shape is given
    pub fn headers(mut self, headers: impl Into<Headers>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    /// Set the raw body
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as the JSON body, adding a content type when none is set
    pub fn json<T>(mut self, payload: &T) -> Result<Self, Error>
    where
        T: Serialize + ?Sized,
    {
        self.body = Some(serde_json::to_vec(payload)?);
        let headers = self.headers.get_or_insert_with(Headers::new);
        if !headers.contains_ignore_case("content-type") {
            headers.set("content-type", APPLICATION_JSON);
        }
        Ok(self)
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a cancellation token
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set the browser credentials mode
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the browser request mode
    pub fn mode(mut self, mode: RequestMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// Add `accept: <content_type>` unless the caller already chose one
///
/// Only the exact key `accept` counts as a choice.
pub fn with_accept(init: Option<RequestInit>, content_type: &str) -> RequestInit {
    let mut init = init.unwrap_or_default();
    let headers = init.headers.get_or_insert_with(Headers::new);
    if headers.get(ACCEPT).is_none_or(str::is_empty) {
        headers.set(ACCEPT, content_type);
    }
    init
}

/// A URL together with its options
///
/// Transports take requests by value, so a request cannot change once it has
/// been dispatched.
#[derive(Debug, Clone)]
pub struct Request {
    url: String,
    init: RequestInit,
}

impl Request {
    /// Create a request
    pub fn new(url: impl Into<String>, init: RequestInit) -> Self {
        Self {
            url: url.into(),
            init,
        }
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request options
    pub fn init(&self) -> &RequestInit {
        &self.init
    }

    /// Current headers, if any
    pub fn headers(&self) -> Option<&Headers> {
        self.init.headers.as_ref()
    }

    /// Headers for modification, created on first use
    pub fn headers_mut(&mut self) -> &mut Headers {
        self.init.headers.get_or_insert_with(Headers::new)
    }

    /// Split into URL and options
    pub fn into_parts(self) -> (String, RequestInit) {
        (self.url, self.init)
    }
}
