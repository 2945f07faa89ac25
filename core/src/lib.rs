//! Typed DTO mapping for HTTP API responses.
//!
//! # Overview
//! A `Request` describes one API call and supplies the function that maps
//! its response into a DTO. A `Connector` builds `HttpRequest` values and
//! binds received `HttpResponse` values back to their request as a
//! `Response`, which exposes `dto()` and `dto_or_fail()`. The host executes
//! the actual HTTP round-trip (host-does-IO), directly or through a
//! `Transport`.
//!
//! # Design
//! - `Response<R>` is generic over the request, so `dto()` returns the
//!   request's concrete DTO type without annotations at the call site.
//! - `dto()` maps regardless of status; `dto_or_fail()` first consults the
//!   failure classification and raises a `LogicError` for failed responses.
//! - Mapping errors are the request's own `Error` type and pass through
//!   untouched.
//! - DTOs may opt into a non-owning back-reference to their origin response
//!   via `Dto::attach_response` and `WithResponse`.
//! - Requests may own DTOs and derive their outgoing body from them.

pub mod connector;
pub mod dto;
pub mod error;
pub mod http;
pub mod policy;
pub mod request;
pub mod response;
pub mod servers;
pub mod types;

pub use connector::{Connector, ConnectorConfig, Transport};
pub use dto::{Dto, ResponseSlot, WithResponse};
pub use error::{ApiError, DtoError, LogicError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use policy::{FailurePolicy, StatusFailurePolicy};
pub use request::Request;
pub use response::Response;
pub use servers::{CreateServer, DeleteServer, GetServer, ListServers, UpdateServer};
pub use types::{ApiProblem, Server};
