//! Deployment profiles

use std::sync::Arc;

use crate::interceptor::{Interceptor, StripHeader, SEC_FETCH_MODE};
use crate::request::RequestInit;

/// Environment a transport runs in
///
/// Each profile contributes its own adjustment of outgoing options and the
/// interceptors it needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    /// Browser-like client: options pass through untouched
    Browser,
    /// Direct socket client: browser-only options are dropped
    #[default]
    Server,
    /// Shared connection pool: like [`Profile::Server`], and the
    /// `sec-fetch-mode` header is stripped from every request
    Pooled,
}

impl Profile {
    /// Adjust caller options for this environment
    pub fn adjust(self, mut init: RequestInit) -> RequestInit {
        match self {
            Profile::Browser => init,
            Profile::Server | Profile::Pooled => {
                let credentials = init.credentials.take();
                let mode = init.mode.take();
                if credentials.is_some() || mode.is_some() {
                    tracing::trace!("Dropped browser-only request options");
                }
                init
            }
        }
    }

    /// Interceptors required by this environment
    pub fn interceptors(self) -> Vec<Arc<dyn Interceptor>> {
        match self {
            Profile::Pooled => vec![Arc::new(StripHeader::new(SEC_FETCH_MODE))],
            Profile::Browser | Profile::Server => Vec::new(),
        }
    }
}
