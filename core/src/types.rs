//! Domain DTOs for the fleet API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//!
//! `Server` keeps a back-reference to the response it was read from;
//! `ApiProblem` does not.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dto::{Dto, ResponseSlot, WithResponse};
use crate::http::HttpResponse;

/// A server as returned by the API. On the wire the address is `ip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: u64,
    pub name: String,
    #[serde(rename = "ip")]
    pub ip_address: String,
    #[serde(skip)]
    origin: ResponseSlot,
}

impl Server {
    pub fn new(id: u64, name: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ip_address: ip_address.into(),
            origin: ResponseSlot::new(),
        }
    }
}

impl Dto for Server {
    fn attach_response(&mut self, origin: &Arc<HttpResponse>) {
        self.origin.attach(origin);
    }
}

impl WithResponse for Server {
    fn response(&self) -> Option<Arc<HttpResponse>> {
        self.origin.get()
    }
}

/// Structured failure information read out of any response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiProblem {
    pub status: u16,
    pub message: String,
}

impl ApiProblem {
    /// Never fails: uses the `error` field when the body is a JSON object
    /// carrying one, the raw body text otherwise, and the bare status as a
    /// last resort.
    pub fn from_response(response: &HttpResponse) -> Self {
        let from_json = response
            .json_value()
            .ok()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let message = from_json
            .or_else(|| {
                let text = String::from_utf8_lossy(&response.body).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        Self {
            status: response.status,
            message,
        }
    }
}

impl Dto for ApiProblem {}
