//! Transport configuration

use std::sync::Arc;
use std::time::Duration;

use crate::headers::Headers;
use crate::interceptor::Interceptor;
use crate::limit::BodyLimit;
use crate::profile::Profile;
use crate::request::{Request, RequestInit};

/// Settings shared by every request sent through one transport
///
/// Built once with [`TransportConfig::builder`] and owned by the transport.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    profile: Profile,
    default_headers: Headers,
    interceptors: Vec<Arc<dyn Interceptor>>,
    body_limit: BodyLimit,
    timeout: Option<Duration>,
}

impl TransportConfig {
    /// Create a new configuration builder
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Deployment profile
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Headers the transport adds to every request
    pub fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// Truncation policy for diagnostic bodies
    pub fn body_limit(&self) -> BodyLimit {
        self.body_limit
    }

    /// Timeout for requests that do not set their own
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Adjust caller options before dispatch
    pub fn adjust(&self, init: RequestInit) -> RequestInit {
        self.profile.adjust(init)
    }

    /// Finalize a request right before it is sent
    ///
    /// Default headers are merged first, then interceptors run in the order
    /// they were declared.
    pub fn prepare(&self, mut request: Request) -> Request {
        if !self.default_headers.is_empty() {
            request.headers_mut().fill_from(&self.default_headers);
        }
        for interceptor in &self.interceptors {
            interceptor.intercept(&mut request);
        }
        request
    }
}

/// Builder for [`TransportConfig`]
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    profile: Profile,
    default_headers: Headers,
    interceptors: Vec<Arc<dyn Interceptor>>,
    body_limit: BodyLimit,
    timeout: Option<Duration>,
}

impl TransportConfigBuilder {
    /// Set the deployment profile
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Add a header the transport sends with every request
    ///
    /// A header chosen by the caller takes precedence.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }

    /// Append an interceptor
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Set the truncation policy for diagnostic bodies
    pub fn body_limit(mut self, limit: BodyLimit) -> Self {
        self.body_limit = limit;
        self
    }

    /// Set the timeout for requests that do not set their own
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the configuration
    ///
    /// Profile interceptors run before the ones added explicitly.
    pub fn build(self) -> TransportConfig {
        let mut interceptors = self.profile.interceptors();
        interceptors.extend(self.interceptors);

        TransportConfig {
            profile: self.profile,
            default_headers: self.default_headers,
            interceptors,
            body_limit: self.body_limit,
            timeout: self.timeout,
        }
    }
}
