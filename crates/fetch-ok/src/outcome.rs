//! Response outcome normalization and body consumers
//!
//! A response whose success flag is `false` becomes a [`ResponseError`];
//! any other response is handed back with its body unread. The consumers
//! build on that and read the body exactly once.

use std::future::IntoFuture;

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorContext, ResponseDetails, ResponseError};
use crate::response::{Response, ResponseHandle};

/// Turn a completed response into a [`ResponseError`] if it reports failure
///
/// On failure the body is read for diagnostics, no further than the
/// response's [`BodyLimit`](crate::BodyLimit) needs; a failing read leaves the
/// body out instead of replacing the error. Successful responses, and
/// responses without a success flag, are returned without touching the body.
pub async fn ensure_ok<R>(response: R, context: impl Into<ErrorContext>) -> Response<R>
where
    R: ResponseHandle,
{
    let context = context.into();
    if response.ok() != Some(false) {
        return Ok(response);
    }

    let status = response.status();
    let limit = response.body_limit();
    let read = match limit.read_cap() {
        Some(max_bytes) => response.text_capped(max_bytes).await,
        None => response.text().await,
    };
    let body = match read {
        Ok(text) => Some(text),
        Err(err) => {
            tracing::debug!("Could not read body of failed response: {}", err);
            None
        }
    };
    let body = limit.apply(body);

    tracing::warn!(status = status, "{}", context.message());
    Err(ResponseError::new(context, ResponseDetails { status, body }).into())
}

/// Wait for a pending response, then apply [`ensure_ok`]
///
/// Errors of the pending response itself are returned unchanged.
pub async fn throw_on_not_ok<F, R, E>(response: F, context: impl Into<ErrorContext>) -> Response<R>
where
    F: IntoFuture<Output = Result<R, E>>,
    R: ResponseHandle,
    E: Into<Error>,
{
    let context = context.into();
    let response = match response.await {
        Ok(response) => response,
        Err(err) => return Err(err.into()),
    };
    ensure_ok(response, context).await
}

/// Check the response and drain its body, discarding it
pub async fn ok_response<F, R, E>(response: F, context: impl Into<ErrorContext>) -> Response<()>
where
    F: IntoFuture<Output = Result<R, E>>,
    R: ResponseHandle,
    E: Into<Error>,
{
    throw_on_not_ok(response, context).await?.bytes().await?;
    Ok(())
}

/// Check the response and parse its body as JSON
///
/// A malformed body surfaces as [`Error::Json`].
pub async fn json_response<T, F, R, E>(response: F, context: impl Into<ErrorContext>) -> Response<T>
where
    T: DeserializeOwned,
    F: IntoFuture<Output = Result<R, E>>,
    R: ResponseHandle,
    E: Into<Error>,
{
    let bytes = throw_on_not_ok(response, context).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Check the response and return its body as text
pub async fn text_response<F, R, E>(
    response: F,
    context: impl Into<ErrorContext>,
) -> Response<String>
where
    F: IntoFuture<Output = Result<R, E>>,
    R: ResponseHandle,
    E: Into<Error>,
{
    throw_on_not_ok(response, context).await?.text().await
}
