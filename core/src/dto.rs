//! Capability traits for data transfer objects.
//!
//! # Design
//! Every DTO type implements `Dto`. The trait's only hook,
//! `attach_response`, is called once by the mapper right after construction
//! and does nothing by default. DTOs that want to remember the response they
//! came from override it to fill a `ResponseSlot` and implement
//! `WithResponse` to expose the getter.
//!
//! The slot holds a `Weak` reference: a DTO never keeps its origin response
//! alive on its own.

use std::sync::{Arc, OnceLock, Weak};

use crate::http::HttpResponse;

/// A type that `Response::dto` can produce.
pub trait Dto {
    /// Receives the response the DTO was just built from.
    fn attach_response(&mut self, _origin: &Arc<HttpResponse>) {}
}

/// A DTO that carries a back-reference to its origin response.
pub trait WithResponse: Dto {
    /// The origin response, or `None` if none was attached or it has
    /// already been dropped.
    fn response(&self) -> Option<Arc<HttpResponse>>;
}

impl Dto for () {}

impl<T: Dto> Dto for Vec<T> {
    fn attach_response(&mut self, origin: &Arc<HttpResponse>) {
        for item in self.iter_mut() {
            item.attach_response(origin);
        }
    }
}

impl<T: Dto> Dto for Option<T> {
    fn attach_response(&mut self, origin: &Arc<HttpResponse>) {
        if let Some(item) = self {
            item.attach_response(origin);
        }
    }
}

/// Write-once, non-owning storage for a DTO's origin response.
///
/// Two slots always compare equal so that DTO equality is decided by field
/// values only. A clone starts empty: the copy has not been mapped from any
/// response yet.
#[derive(Debug, Default)]
pub struct ResponseSlot(OnceLock<Weak<HttpResponse>>);

impl ResponseSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `origin`. Returns `false` and leaves the slot untouched if it
    /// was already set.
    pub fn attach(&self, origin: &Arc<HttpResponse>) -> bool {
        self.0.set(Arc::downgrade(origin)).is_ok()
    }

    pub fn get(&self) -> Option<Arc<HttpResponse>> {
        self.0.get().and_then(Weak::upgrade)
    }

    pub fn is_attached(&self) -> bool {
        self.0.get().is_some()
    }
}

impl Clone for ResponseSlot {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl PartialEq for ResponseSlot {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ResponseSlot {}
