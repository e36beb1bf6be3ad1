//! Fetch client

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::ErrorContext;
use crate::outcome::{json_response, ok_response, text_response};
use crate::request::{with_accept, Request, RequestInit, APPLICATION_JSON, TEXT_ANY};
use crate::response::Response;
use crate::transport::{ReqwestTransport, Transport};

/// Client issuing status-checked requests through a [`Transport`]
///
/// Construct one per process and share it; clones share the transport and
/// therefore its connection pool.
pub struct Fetcher<T = ReqwestTransport> {
    transport: Arc<T>,
}

impl<T> Clone for Fetcher<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Fetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("transport", &self.transport)
            .finish()
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Create a client over a default [`ReqwestTransport`]
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }
}

impl<T: Transport> Fetcher<T> {
    /// Create a client over the given transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request without checking its outcome
    ///
    /// With an `accept` hint, `accept: <hint>` is added unless the caller set
    /// an `accept` header already. The options are then adjusted for the
    /// transport's profile.
    pub async fn dispatch(
        &self,
        url: &str,
        init: Option<RequestInit>,
        accept: Option<&str>,
    ) -> Response<T::Response> {
        let config = self.transport.config();
        let init = match accept {
            Some(content_type) => with_accept(init, content_type),
            None => init.unwrap_or_default(),
        };
        let init = config.adjust(init);

        tracing::debug!("Dispatching {} {}", init.method, url);
        self.transport.fetch(Request::new(url, init)).await
    }

    /// Send a request, fail on a non-success response and drain the body
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_ok(
        &self,
        url: &str,
        init: Option<RequestInit>,
        context: impl Into<ErrorContext>,
    ) -> Response<()> {
        ok_response(self.dispatch(url, init, None), context).await
    }

    /// Send a request accepting JSON, fail on a non-success response and
    /// parse the body as `R`
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_json<R>(
        &self,
        url: &str,
        init: Option<RequestInit>,
        context: impl Into<ErrorContext>,
    ) -> Response<R>
    where
        R: DeserializeOwned,
    {
        json_response(self.dispatch(url, init, Some(APPLICATION_JSON)), context).await
    }

    /// Send a request accepting text, fail on a non-success response and
    /// return the body
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_text(
        &self,
        url: &str,
        init: Option<RequestInit>,
        context: impl Into<ErrorContext>,
    ) -> Response<String> {
        text_response(self.dispatch(url, init, Some(TEXT_ANY)), context).await
    }
}

/// One-off [`Fetcher::fetch_ok`] over a fresh default client
///
/// Each call creates its own connection pool; share a [`Fetcher`] instead
/// when making many requests.
pub async fn fetch_ok(
    url: &str,
    init: Option<RequestInit>,
    context: impl Into<ErrorContext>,
) -> Response<()> {
    Fetcher::new().fetch_ok(url, init, context).await
}

/// One-off [`Fetcher::fetch_json`] over a fresh default client
pub async fn fetch_json<R: DeserializeOwned>(
    url: &str,
    init: Option<RequestInit>,
    context: impl Into<ErrorContext>,
) -> Response<R> {
    Fetcher::new().fetch_json(url, init, context).await
}

/// One-off [`Fetcher::fetch_text`] over a fresh default client
pub async fn fetch_text(
    url: &str,
    init: Option<RequestInit>,
    context: impl Into<ErrorContext>,
) -> Response<String> {
    Fetcher::new().fetch_text(url, init, context).await
}
