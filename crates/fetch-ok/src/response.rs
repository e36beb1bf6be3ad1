//! HTTP response handles

use async_trait::async_trait;

use crate::error::Error;
use crate::limit::{cap_bytes, BodyLimit};

/// Response type - a result carrying the body type R or an [`Error`]
pub type Response<R, E = Error> = Result<R, E>;

/// A completed response whose body has not been read yet
///
/// Body readers consume the handle, so a body can be read at most once.
#[async_trait]
pub trait ResponseHandle: Send + Sized {
    /// Success flag reported by the transport, if it reports one
    fn ok(&self) -> Option<bool>;

    /// Numeric status code, if known
    fn status(&self) -> Option<u16>;

    /// Truncation policy for a diagnostic body read from this response
    fn body_limit(&self) -> BodyLimit {
        BodyLimit::default()
    }

    /// Read the body as text
    async fn text(self) -> Response<String>;

    /// Read at most `max_bytes` of the body as text
    ///
    /// The default reads the whole body and cuts it afterwards; transports
    /// that can stream should stop reading at the cap.
    async fn text_capped(self, max_bytes: usize) -> Response<String> {
        self.text().await.map(|text| cap_bytes(text, max_bytes))
    }

    /// Read the body as raw bytes
    async fn bytes(self) -> Response<Vec<u8>> {
        self.text().await.map(String::into_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TextOnly(&'static str);

    #[async_trait]
    impl ResponseHandle for TextOnly {
        fn ok(&self) -> Option<bool> {
            None
        }

        fn status(&self) -> Option<u16> {
            None
        }

        async fn text(self) -> Response<String> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_bytes_falls_back_to_text() {
        let bytes = TextOnly("hello 💮").bytes().await.expect("readable");
        assert_eq!(bytes, "hello 💮".as_bytes());
    }

    #[tokio::test]
    async fn test_default_capped_read_cuts_on_char_boundary() {
        let text = TextOnly("ab💮").text_capped(4).await.expect("readable");
        assert_eq!(text, "ab");
        assert_eq!(TextOnly("ab").body_limit(), BodyLimit::Head);
    }

    #[test]
    fn test_response_type_is_result() {
        let success: Response<i32> = Ok(42);
        assert!(matches!(success, Ok(42)));

        let error: Response<i32> = Err(Error::Cancelled);
        assert!(matches!(error, Err(Error::Cancelled)));
    }
}
