//! reqwest-based transport

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::Transport;
use crate::config::TransportConfig;
use crate::error::Error;
use crate::limit::{decode_prefix, BodyLimit};
use crate::request::Request;
use crate::response::{Response, ResponseHandle};

/// Transport backed by a single pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: Arc<TransportConfig>,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    /// Create a transport with default settings
    pub fn new() -> Self {
        Self::from_reqwest(reqwest::Client::new(), TransportConfig::default())
    }

    /// Create a transport with default client settings and the given configuration
    pub fn with_config(config: TransportConfig) -> Self {
        Self::from_reqwest(reqwest::Client::new(), config)
    }

    /// Create a new transport builder
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Create a transport from an existing reqwest::Client
    pub fn from_reqwest(client: reqwest::Client, config: TransportConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    fn build_request(
        &self,
        request: Request,
    ) -> Response<(reqwest::Request, Option<CancellationToken>)> {
        let (url, init) = self.config.prepare(request).into_parts();
        let url = Url::parse(&url).map_err(|e| Error::Build(format!("Invalid URL {url}: {e}")))?;
        let headers = match &init.headers {
            Some(headers) => headers.to_header_map()?,
            None => HeaderMap::new(),
        };

        let mut builder = self.client.request(init.method, url).headers(headers);
        if let Some(body) = init.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = init.timeout.or(self.config.timeout()) {
            builder = builder.timeout(timeout);
        }

        Ok((builder.build()?, init.cancel))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    type Response = ReqwestResponse;

    fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn fetch(&self, request: Request) -> Response<ReqwestResponse> {
        let (request, cancel) = self.build_request(request)?;
        let response = until_cancelled(cancel.as_ref(), self.client.execute(request)).await?;
        Ok(ReqwestResponse::new(
            response,
            cancel,
            self.config.body_limit(),
        ))
    }
}

async fn until_cancelled<F, T>(cancel: Option<&CancellationToken>, future: F) -> Response<T>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            result = future => result.map_err(Error::from),
        },
        None => future.await.map_err(Error::from),
    }
}

/// Response produced by [`ReqwestTransport`]
#[derive(Debug)]
pub struct ReqwestResponse {
    status: u16,
    inner: reqwest::Response,
    cancel: Option<CancellationToken>,
    body_limit: BodyLimit,
}

impl ReqwestResponse {
    pub(crate) fn new(
        response: reqwest::Response,
        cancel: Option<CancellationToken>,
        body_limit: BodyLimit,
    ) -> Self {
        Self {
            status: response.status().as_u16(),
            inner: response,
            cancel,
            body_limit,
        }
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Final URL of the response
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Unwrap the underlying reqwest::Response
    pub fn into_inner(self) -> reqwest::Response {
        self.inner
    }
}

#[async_trait]
impl ResponseHandle for ReqwestResponse {
    fn ok(&self) -> Option<bool> {
        Some((200..300).contains(&self.status))
    }

    fn status(&self) -> Option<u16> {
        Some(self.status)
    }

    fn body_limit(&self) -> BodyLimit {
        self.body_limit
    }

    async fn text(self) -> Response<String> {
        let Self { inner, cancel, .. } = self;
        until_cancelled(cancel.as_ref(), inner.text()).await
    }

    /// Stops pulling chunks once `max_bytes` are buffered. The prefix is
    /// decoded as UTF-8 whatever charset the response declares.
    async fn text_capped(self, max_bytes: usize) -> Response<String> {
        let Self { mut inner, cancel, .. } = self;
        let read = async move {
            let mut buf = Vec::new();
            while buf.len() < max_bytes {
                match inner.chunk().await? {
                    Some(chunk) => buf.extend_from_slice(&chunk),
                    None => break,
                }
            }
            buf.truncate(max_bytes);
            Ok::<_, reqwest::Error>(buf)
        };
        until_cancelled(cancel.as_ref(), read)
            .await
            .map(decode_prefix)
    }

    async fn bytes(self) -> Response<Vec<u8>> {
        let Self { inner, cancel, .. } = self;
        until_cancelled(cancel.as_ref(), inner.bytes())
            .await
            .map(|bytes| bytes.to_vec())
    }
}

/// Builder for [`ReqwestTransport`], configuring proxy and TLS settings
#[derive(Debug, Default)]
pub struct ReqwestTransportBuilder {
    config: TransportConfig,
    accept_invalid_certs: bool,
    proxy: Option<ProxyConfig>,
}

#[derive(Debug)]
struct ProxyConfig {
    url: Url,
    matcher: Option<regex::Regex>,
}

impl ReqwestTransportBuilder {
    /// Set the configuration shared by every request
    pub fn config(mut self, config: TransportConfig) -> Self {
        self.config = config;
        self
    }

    /// Accept invalid TLS certificates
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Send every request through a proxy
    pub fn proxy(mut self, url: Url) -> Self {
        self.proxy = Some(ProxyConfig { url, matcher: None });
        self
    }

    /// Send requests whose host matches `pattern` through a proxy
    pub fn proxy_with_matcher(mut self, url: Url, pattern: &str) -> Response<Self> {
        let matcher = regex::Regex::new(pattern)
            .map_err(|e| Error::Proxy(format!("Invalid proxy pattern: {}", e)))?;
        self.proxy = Some(ProxyConfig {
            url,
            matcher: Some(matcher),
        });
        Ok(self)
    }

    /// Build the transport
    pub fn build(self) -> Response<ReqwestTransport> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(proxy_config) = self.proxy {
            let proxy_url = proxy_config.url.to_string();
            let proxy = if let Some(matcher) = proxy_config.matcher {
                reqwest::Proxy::custom(move |url| {
                    if matcher.is_match(url.host_str().unwrap_or("")) {
                        Some(proxy_url.clone())
                    } else {
                        None
                    }
                })
            } else {
                reqwest::Proxy::all(&proxy_url).map_err(|e| Error::Proxy(e.to_string()))?
            };
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;
        Ok(ReqwestTransport::from_reqwest(client, self.config))
    }
}
