//! Small helpers for callers handling fetch results

use std::error::Error as StdError;

use crate::error::{Error, Missing, ResponseError};
use crate::response::Response;

/// Whether `err` is, or wraps, a [`ResponseError`] with the given status
///
/// The `source()` chain is searched, so errors wrapped by `anyhow` or by a
/// caller's own error type are recognized. Any other error yields `false`.
pub fn thrown_has_status(err: &(dyn StdError + 'static), status: u16) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(response) = as_response_error(err) {
            return response.status() == Some(status);
        }
        current = err.source();
    }
    false
}

fn as_response_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a ResponseError> {
    err.downcast_ref::<ResponseError>()
        .or_else(|| err.downcast_ref::<Error>().and_then(Error::as_response))
}

/// Fail with `Missing <what>.`, or `Missing.` without a description
///
/// ```
/// use fetch_ok::missing;
///
/// let err = missing::<()>(Some("token")).expect_err("always fails");
/// assert_eq!(err.to_string(), "Missing token.");
/// ```
pub fn missing<T>(what: Option<&str>) -> Response<T> {
    Err(Missing::new(what).into())
}

/// Turn an absent value into a [`Missing`] error
pub trait OptionExt<T> {
    /// Return the value or fail with `Missing <what>.`
    fn or_missing(self, what: &str) -> Response<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_missing(self, what: &str) -> Response<T> {
        match self {
            Some(value) => Ok(value),
            None => missing(Some(what)),
        }
    }
}
