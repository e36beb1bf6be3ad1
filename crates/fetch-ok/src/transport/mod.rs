//! HTTP transports

use std::fmt::Debug;

use async_trait::async_trait;

use crate::config::TransportConfig;
use crate::request::Request;
use crate::response::{Response, ResponseHandle};

pub mod reqwest_transport;

pub use reqwest_transport::{ReqwestResponse, ReqwestTransport, ReqwestTransportBuilder};

/// Capability to send a request and hand back its response
///
/// Implementations run [`TransportConfig::prepare`] on every request they
/// send, so default headers and interceptors apply no matter which entry
/// point produced the request.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Response handle produced by this transport
    type Response: ResponseHandle;

    /// Configuration shared by every request
    fn config(&self) -> &TransportConfig;

    /// Send the request
    async fn fetch(&self, request: Request) -> Response<Self::Response>;
}
