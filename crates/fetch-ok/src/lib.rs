//! Status-checked HTTP fetch helpers
//!
//! This crate wraps an HTTP transport so callers do not repeat "check the
//! status, read the body for diagnostics, fail" at every call site. A
//! response whose success flag is `false` becomes a [`ResponseError`]
//! carrying the status code, a truncated body and the caller's context.
//! Everything else is handed back for the body to be read once, as nothing,
//! JSON or text.
//!
//! # Example
//!
//! ```no_run
//! use fetch_ok::{thrown_has_status, ErrorContext, Fetcher};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! async fn example() -> fetch_ok::Response<Option<User>> {
//!     let fetcher = Fetcher::new();
//!     let context = ErrorContext::new("Could not load user").with("user", 42);
//!     match fetcher
//!         .fetch_json("https://api.example.com/users/42", None, context)
//!         .await
//!     {
//!         Ok(user) => Ok(Some(user)),
//!         Err(err) if thrown_has_status(&err, 404) => Ok(None),
//!         Err(err) => Err(err),
//!     }
//! }
//! ```

mod client;
mod config;
mod error;
mod headers;
mod helpers;
mod interceptor;
mod limit;
mod outcome;
mod profile;
mod request;
mod response;
pub mod transport;

pub use client::{fetch_json, fetch_ok, fetch_text, Fetcher};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use error::{BoxError, Error, ErrorContext, ErrorData, Missing, ResponseDetails, ResponseError};
pub use headers::Headers;
pub use helpers::{missing, thrown_has_status, OptionExt};
pub use interceptor::{Interceptor, StripHeader, SEC_FETCH_MODE};
pub use limit::{BodyLimit, ELLIPSIS, HEAD_CHARS, MAX_BODY_BYTES, MAX_BODY_CHARS, TAIL_CHARS};
pub use outcome::{ensure_ok, json_response, ok_response, text_response, throw_on_not_ok};
pub use profile::Profile;
pub use request::{
    with_accept, Credentials, Request, RequestInit, RequestMode, ACCEPT, APPLICATION_JSON,
    TEXT_ANY,
};
pub use response::{Response, ResponseHandle};
pub use transport::{ReqwestResponse, ReqwestTransport, ReqwestTransportBuilder, Transport};

/// HTTP method, re-exported from `reqwest`
pub use reqwest::Method;
/// Cancellation token accepted by [`RequestInit::cancel`]
pub use tokio_util::sync::CancellationToken;
