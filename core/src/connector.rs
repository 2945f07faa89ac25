//! Shared API configuration and the host transport seam.
//!
//! # Design
//! `Connector` holds everything that is common to every request against one
//! API: base URL, default headers, user agent and failure policy. It turns a
//! `Request` into an `HttpRequest` and binds a received `HttpResponse` back
//! to its request as a `Response`. It performs no I/O itself; hosts plug in
//! a `Transport`, or run the round-trip between `build` and `respond` by hand.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::policy::{FailurePolicy, StatusFailurePolicy};
use crate::request::Request;
use crate::response::Response;

const DEFAULT_USER_AGENT: &str = concat!("fleet-core/", env!("CARGO_PKG_VERSION"));

/// Executes an `HttpRequest` and returns the fully received response.
///
/// Implementations report every received status as `Ok`; only failures to
/// complete the exchange are `ApiError::Transport`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Settings shared by every request sent through a `Connector`.
#[derive(Clone)]
pub struct ConnectorConfig {
    base_url: String,
    user_agent: String,
    headers: Vec<(String, String)>,
    failure_policy: Arc<dyn FailurePolicy>,
}

impl ConnectorConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            failure_policy: Arc::new(StatusFailurePolicy),
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header, replacing any existing one with the same name.
    /// A `user-agent` header sets the user agent.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name.eq_ignore_ascii_case("user-agent") {
            self.user_agent = value.into();
        } else {
            upsert_header(&mut self.headers, name, value.into());
        }
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: impl FailurePolicy + 'static) -> Self {
        self.failure_policy = Arc::new(policy);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for ConnectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Builds requests for, and binds responses from, one API.
#[derive(Debug, Clone)]
pub struct Connector {
    config: ConnectorConfig,
}

impl Connector {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(ConnectorConfig::new(base_url))
    }

    pub fn with_config(config: ConnectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Turn `request` into plain request data.
    pub fn build<R: Request>(&self, request: &R) -> Result<HttpRequest, ApiError> {
        let raw_url = format!("{}{}", self.config.base_url, request.endpoint());
        let mut url = Url::parse(&raw_url).map_err(|e| ApiError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;
        let query = request.default_query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let mut headers = self.config.headers.clone();
        upsert_header(&mut headers, "user-agent".to_string(), self.config.user_agent.clone());
        for (name, value) in request.default_headers() {
            upsert_header(&mut headers, name, value);
        }

        let body = match request.default_body() {
            Some(payload) => {
                let body = serde_json::to_string(&payload)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                if !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
                    headers.push(("content-type".to_string(), "application/json".to_string()));
                }
                Some(body)
            }
            None => None,
        };

        let method = request.method();
        debug!(method = method.as_str(), url = %url, "built request");
        Ok(HttpRequest {
            method,
            path: url.into(),
            headers,
            body,
        })
    }

    /// Bind a received response to the request that produced it.
    pub fn respond<R: Request>(&self, request: R, response: HttpResponse) -> Response<R> {
        Response::new(request, response, Arc::clone(&self.config.failure_policy))
    }

    /// Build, execute through `transport`, and bind the response.
    pub fn send<R, T>(&self, transport: &T, request: R) -> Result<Response<R>, ApiError>
    where
        R: Request,
        T: Transport + ?Sized,
    {
        let http_request = self.build(&request)?;
        let http_response = transport.execute(&http_request)?;
        debug!(
            method = http_request.method.as_str(),
            url = %http_request.path,
            status = http_response.status,
            "received response"
        );
        Ok(self.respond(request, http_response))
    }
}

fn upsert_header(headers: &mut Vec<(String, String)>, name: String, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
        Some(existing) => *existing = (name, value),
        None => headers.push((name, value)),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::{json, Value};

    use super::*;
    use crate::http::HttpMethod;

    struct Search {
        term: String,
    }

    impl Request for Search {
        type Dto = ();
        type Error = ApiError;

        fn method(&self) -> HttpMethod {
            HttpMethod::Post
        }

        fn endpoint(&self) -> String {
            "/search".to_string()
        }

        fn default_headers(&self) -> Vec<(String, String)> {
            vec![("Accept".to_string(), "application/vnd.fleet+json".to_string())]
        }

        fn default_query(&self) -> Vec<(String, String)> {
            vec![("q".to_string(), self.term.clone())]
        }

        fn default_body(&self) -> Option<Value> {
            Some(json!({ "term": self.term }))
        }

        fn create_dto_from_response(&self, _response: &HttpResponse) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn search() -> Search {
        Search {
            term: "a b&c".to_string(),
        }
    }

    /// Records what it was asked to execute and replies with a fixed status.
    struct Canned {
        status: u16,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Transport for Canned {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(HttpResponse::new(self.status, ""))
        }
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let connector = Connector::new("http://localhost:3000/");
        assert_eq!(connector.config().base_url(), "http://localhost:3000");
    }

    #[test]
    fn build_encodes_query() {
        let req = Connector::new("http://localhost:3000").build(&search()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/search?q=a+b%26c");
    }

    #[test]
    fn request_headers_replace_connector_headers() {
        let connector = Connector::with_config(
            ConnectorConfig::new("http://localhost:3000").with_header("x-api-key", "secret"),
        );
        let req = connector.build(&search()).unwrap();
        assert_eq!(req.header("accept"), Some("application/vnd.fleet+json"));
        assert_eq!(req.header("x-api-key"), Some("secret"));
        assert_eq!(req.header("user-agent"), Some(DEFAULT_USER_AGENT));
        assert_eq!(req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("accept")).count(), 1);
    }

    #[test]
    fn body_is_json_with_content_type() {
        let req = Connector::new("http://localhost:3000").build(&search()).unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.json_body().unwrap().unwrap(), json!({ "term": "a b&c" }));
    }

    #[test]
    fn custom_user_agent() {
        let connector = Connector::with_config(ConnectorConfig::new("http://x").with_user_agent("ops/2"));
        assert_eq!(connector.build(&search()).unwrap().header("user-agent"), Some("ops/2"));
    }

    #[test]
    fn user_agent_header_sets_user_agent() {
        let connector = Connector::with_config(
            ConnectorConfig::new("http://x").with_header("User-Agent", "ops/3"),
        );
        let req = connector.build(&search()).unwrap();
        assert_eq!(req.header("user-agent"), Some("ops/3"));
        assert_eq!(
            req.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("user-agent")).count(),
            1
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = Connector::new("not a url").build(&search()).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn send_runs_transport_and_binds_policy() {
        let connector = Connector::with_config(
            ConnectorConfig::new("http://localhost:3000")
                .with_failure_policy(|r: &HttpResponse| r.status != 202),
        );
        let transport = Canned {
            status: 200,
            seen: RefCell::new(Vec::new()),
        };
        let response = connector.send(&transport, search()).unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.failed());
        assert_eq!(transport.seen.borrow().len(), 1);
        assert_eq!(transport.seen.borrow()[0].path, "http://localhost:3000/search?q=a+b%26c");
    }
}
