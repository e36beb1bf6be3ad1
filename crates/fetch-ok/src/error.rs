//! Error types

use std::error::Error as StdError;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Boxed error produced by a transport
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Caller-supplied data merged onto a [`ResponseError`]
pub type ErrorData = Map<String, Value>;

/// Errors returned by fetch operations
#[derive(Debug, Error)]
pub enum Error {
    /// The response reported failure
    #[error(transparent)]
    Response(#[from] ResponseError),
    /// Failure inside the underlying HTTP client, passed through as-is
    #[error(transparent)]
    Transport(BoxError),
    /// The request was cancelled through its cancellation token
    #[error("Request cancelled")]
    Cancelled,
    /// The request could not be built
    #[error("Request build error: {0}")]
    Build(String),
    /// Proxy configuration error
    #[error("Proxy error: {0}")]
    Proxy(String),
    /// The body of a successful response is not valid JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The body of a successful response could not be decoded
    #[error("Body decode error: {0}")]
    Body(String),
    /// A required value is absent
    #[error(transparent)]
    Missing(#[from] Missing),
}

impl Error {
    /// Wrap a transport failure without altering it
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(err.into())
    }

    /// Status code of the failed response, if this is a response error
    pub fn status(&self) -> Option<u16> {
        self.as_response().and_then(ResponseError::status)
    }

    /// The structured response error, if any
    pub fn as_response(&self) -> Option<&ResponseError> {
        match self {
            Error::Response(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the underlying client gave up waiting
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(err) => err
                .downcast_ref::<reqwest::Error>()
                .is_some_and(reqwest::Error::is_timeout),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Error::Build(err.to_string())
        } else if err.is_decode() {
            Error::Body(err.to_string())
        } else {
            Error::Transport(Box::new(err))
        }
    }
}

/// Status and (truncated) body of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseDetails {
    /// HTTP status code, when the response exposes one
    pub status: Option<u16>,
    /// Response body, truncated to the transport's [`BodyLimit`](crate::BodyLimit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Error raised when a response reports failure
///
/// Carries the caller's message, the response diagnostics and any extra data
/// the caller attached. In the serialized form the extra data sits at the top
/// level next to `message` and `response`, and wins on key collisions.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ResponseError {
    message: String,
    response: ResponseDetails,
    data: ErrorData,
}

impl ResponseError {
    pub(crate) fn new(context: ErrorContext, response: ResponseDetails) -> Self {
        Self {
            message: context.message,
            response,
            data: context.data,
        }
    }

    /// Caller-supplied message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Diagnostics of the failed response
    pub fn response(&self) -> &ResponseDetails {
        &self.response
    }

    /// Status code of the failed response
    pub fn status(&self) -> Option<u16> {
        self.response.status
    }

    /// Truncated body of the failed response
    pub fn body(&self) -> Option<&str> {
        self.response.body.as_deref()
    }

    /// Extra data attached by the caller
    pub fn data(&self) -> &ErrorData {
        &self.data
    }

    /// Look up a single extra-data key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Flattened JSON view of the error
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("message".to_string(), Value::String(self.message.clone()));
        map.insert(
            "response".to_string(),
            serde_json::to_value(&self.response).unwrap_or(Value::Null),
        );
        for (key, value) in &self.data {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

impl Serialize for ResponseError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// Message and extra data describing what a request was for
///
/// Converted into a [`ResponseError`] when the response fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    message: String,
    data: ErrorData,
}

impl ErrorContext {
    /// Create a context with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Attach a single extra-data entry
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Attach every entry of `data`
    pub fn with_data(mut self, data: ErrorData) -> Self {
        self.data.extend(data);
        self
    }

    /// Message of the context
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ErrorContext {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ErrorContext {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&String> for ErrorContext {
    fn from(message: &String) -> Self {
        Self::new(message.as_str())
    }
}

/// A required value was absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Missing {
    what: Option<String>,
}

impl Missing {
    /// Describe the absent value, if known
    pub fn new(what: Option<&str>) -> Self {
        Self {
            what: what.filter(|w| !w.is_empty()).map(str::to_string),
        }
    }

    /// Description of the absent value
    pub fn what(&self) -> Option<&str> {
        self.what.as_deref()
    }
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.what {
            Some(what) => write!(f, "Missing {what}."),
            None => f.write_str("Missing."),
        }
    }
}

impl StdError for Missing {}
