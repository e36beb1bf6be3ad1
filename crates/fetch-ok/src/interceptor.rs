//! Request interceptors run by transports right before sending

use std::fmt::Debug;

use crate::request::Request;

/// Fetch metadata header sent by browser-like clients
pub const SEC_FETCH_MODE: &str = "sec-fetch-mode";

/// Step applied to every outgoing request
///
/// Interceptors run after the transport has merged its own default headers,
/// so they observe the header set that goes on the wire.
pub trait Interceptor: Send + Sync + Debug {
    /// Modify the request in place
    fn intercept(&self, request: &mut Request);
}

/// Removes a header, in any letter case, from every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripHeader {
    name: String,
}

impl StripHeader {
    /// Strip `name` from outgoing requests
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name of the stripped header
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Interceptor for StripHeader {
    fn intercept(&self, request: &mut Request) {
        let Some(headers) = request.init().headers.as_ref() else {
            return;
        };
        if headers.contains_ignore_case(&self.name) {
            let removed = request.headers_mut().strip(&self.name);
            tracing::trace!("Stripped {} {} header(s) from {}", removed, self.name, request.url());
        }
    }
}
