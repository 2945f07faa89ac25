//! The DTO mapper.
//!
//! # Design
//! `Response<R>` pairs a received `HttpResponse` with the request that
//! produced it, so `dto()` can call that request's mapping function without
//! the caller naming the DTO type. The raw response sits behind an `Arc`,
//! which lets DTOs hold a `Weak` back-reference to it.
//!
//! The first successfully mapped DTO is cached. Later `dto()` and
//! `dto_or_fail()` calls return the same instance. If two threads race on the
//! first call both may run the mapping function; the first stored value wins.
//! Mapping errors are not cached, so a failed mapping is retried on the next
//! call.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::dto::Dto;
use crate::error::{ApiError, DtoError, LogicError};
use crate::http::HttpResponse;
use crate::policy::{FailurePolicy, StatusFailurePolicy};
use crate::request::Request;

/// A received response bound to the request that was sent.
pub struct Response<R: Request> {
    request: R,
    raw: Arc<HttpResponse>,
    policy: Arc<dyn FailurePolicy>,
    dto: OnceLock<R::Dto>,
}

impl<R: Request> Response<R> {
    pub fn new(request: R, raw: HttpResponse, policy: Arc<dyn FailurePolicy>) -> Self {
        Self {
            request,
            raw: Arc::new(raw),
            policy,
            dto: OnceLock::new(),
        }
    }

    /// A response classified with `StatusFailurePolicy`.
    pub fn with_default_policy(request: R, raw: HttpResponse) -> Self {
        Self::new(request, raw, Arc::new(StatusFailurePolicy))
    }

    pub fn request(&self) -> &R {
        &self.request
    }

    /// The shared raw response. DTO back-references point at this allocation.
    pub fn raw(&self) -> &Arc<HttpResponse> {
        &self.raw
    }

    pub fn status(&self) -> u16 {
        self.raw.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.header(name)
    }

    pub fn json_value(&self) -> Result<&Value, ApiError> {
        self.raw.json_value()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        self.raw.json()
    }

    /// Whether this response is classified as a failed call. The request's
    /// own verdict takes precedence over the connector's policy.
    pub fn failed(&self) -> bool {
        self.request
            .has_request_failed(&self.raw)
            .unwrap_or_else(|| self.policy.is_failure(&self.raw))
    }

    pub fn successful(&self) -> bool {
        !self.failed()
    }

    /// Run the mapping function and attach the origin response, bypassing
    /// the cache.
    pub fn create_dto(&self) -> Result<R::Dto, R::Error> {
        map_response(&self.request, &self.raw)
    }

    /// The DTO for this response, whatever its failure classification.
    pub fn dto(&self) -> Result<&R::Dto, R::Error> {
        if let Some(dto) = self.dto.get() {
            return Ok(dto);
        }
        let dto = self.create_dto()?;
        Ok(self.dto.get_or_init(|| dto))
    }

    /// Like `dto`, but refuses to map a response classified as failed.
    pub fn dto_or_fail(&self) -> Result<&R::Dto, DtoError<R::Error>> {
        if self.failed() {
            debug!(status = self.raw.status, "refusing to create dto from failed response");
            return Err(LogicError { status: self.raw.status }.into());
        }
        self.dto().map_err(DtoError::Mapping)
    }

    /// Take the DTO out, mapping it first if no call has cached one yet.
    ///
    /// This consumes the response. Unless another clone of `raw()` is held
    /// elsewhere, the DTO's back-reference is already dead on return; use
    /// `into_parts` to keep the origin alive.
    pub fn into_dto(self) -> Result<R::Dto, R::Error> {
        self.into_parts().map(|(dto, _)| dto)
    }

    /// Take the DTO out together with the raw response it points back to.
    pub fn into_parts(self) -> Result<(R::Dto, Arc<HttpResponse>), R::Error> {
        let dto = match self.dto.into_inner() {
            Some(dto) => dto,
            None => map_response(&self.request, &self.raw)?,
        };
        Ok((dto, self.raw))
    }
}

/// Run the request's mapping function and attach `raw` as the origin.
fn map_response<R: Request>(request: &R, raw: &Arc<HttpResponse>) -> Result<R::Dto, R::Error> {
    let mut dto = request.create_dto_from_response(raw)?;
    dto.attach_response(raw);
    Ok(dto)
}

impl<R> fmt::Debug for Response<R>
where
    R: Request + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("request", &self.request)
            .field("status", &self.raw.status)
            .field("dto_cached", &self.dto.get().is_some())
            .finish_non_exhaustive()
    }
}
