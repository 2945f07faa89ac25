//! Failure classification for responses.
//!
//! A connector carries one `FailurePolicy`; a request may still override the
//! verdict for its own responses through `Request::has_request_failed`.

use crate::http::HttpResponse;

/// Decides whether a received response represents a failed API call.
pub trait FailurePolicy: Send + Sync {
    fn is_failure(&self, response: &HttpResponse) -> bool;
}

/// Default policy: any 4xx or 5xx status is a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFailurePolicy;

impl FailurePolicy for StatusFailurePolicy {
    fn is_failure(&self, response: &HttpResponse) -> bool {
        response.is_client_error() || response.is_server_error()
    }
}

impl<F> FailurePolicy for F
where
    F: Fn(&HttpResponse) -> bool + Send + Sync,
{
    fn is_failure(&self, response: &HttpResponse) -> bool {
        self(response)
    }
}
