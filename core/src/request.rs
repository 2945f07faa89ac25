//! The contract every API call implements.
//!
//! # Design
//! A `Request` describes one endpoint: where it lives, what it sends by
//! default, and how a received `HttpResponse` becomes its `Dto`. The mapping
//! function is caller-defined and carries its own error type, so nothing in
//! this crate reinterprets mapping failures.
//!
//! A request may own a DTO and read its fields inside `default_body`; that
//! is how a previously fetched object seeds an outgoing payload.

use serde_json::Value;

use crate::dto::Dto;
use crate::http::{HttpMethod, HttpResponse};

pub trait Request {
    /// What `create_dto_from_response` produces.
    type Dto: Dto;

    /// What `create_dto_from_response` fails with.
    type Error;

    fn method(&self) -> HttpMethod;

    /// Path appended to the connector's base URL, starting with `/`.
    fn endpoint(&self) -> String;

    /// Headers added on top of the connector's defaults. Same-named
    /// connector headers are replaced.
    fn default_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn default_query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// JSON payload; `None` sends no body.
    fn default_body(&self) -> Option<Value> {
        None
    }

    /// Per-request failure verdict. `None` defers to the connector's policy.
    fn has_request_failed(&self, _response: &HttpResponse) -> Option<bool> {
        None
    }

    /// Map a received response into this request's DTO.
    fn create_dto_from_response(&self, response: &HttpResponse) -> Result<Self::Dto, Self::Error>;
}
