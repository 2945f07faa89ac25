//! Requests for the fleet servers API.
//!
//! `CreateServer` and `UpdateServer` own a `Server` DTO and compute their
//! payload from it, so an object fetched earlier can be sent straight back.

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::request::Request;
use crate::types::Server;

/// `GET /servers`, optionally filtered by exact name.
#[derive(Debug, Clone, Default)]
pub struct ListServers {
    pub name: Option<String>,
}

impl ListServers {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl Request for ListServers {
    type Dto = Vec<Server>;
    type Error = ApiError;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        "/servers".to_string()
    }

    fn default_query(&self) -> Vec<(String, String)> {
        self.name
            .iter()
            .map(|name| ("name".to_string(), name.clone()))
            .collect()
    }

    fn create_dto_from_response(&self, response: &HttpResponse) -> Result<Vec<Server>, ApiError> {
        response.json()
    }
}

/// `GET /servers/{id}`.
#[derive(Debug, Clone, Copy)]
pub struct GetServer {
    pub id: u64,
}

impl Request for GetServer {
    type Dto = Server;
    type Error = ApiError;

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn endpoint(&self) -> String {
        format!("/servers/{}", self.id)
    }

    fn create_dto_from_response(&self, response: &HttpResponse) -> Result<Server, ApiError> {
        response.json()
    }
}

/// `POST /servers`, with name and address taken from `server`.
#[derive(Debug, Clone)]
pub struct CreateServer {
    server: Server,
}

impl CreateServer {
    pub fn new(server: Server) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &Server {
        &self.server
    }
}

impl Request for CreateServer {
    type Dto = Server;
    type Error = ApiError;

    fn method(&self) -> HttpMethod {
        HttpMethod::Post
    }

    fn endpoint(&self) -> String {
        "/servers".to_string()
    }

    fn default_body(&self) -> Option<Value> {
        Some(json!({
            "name": self.server.name,
            "ip": self.server.ip_address,
        }))
    }

    fn create_dto_from_response(&self, response: &HttpResponse) -> Result<Server, ApiError> {
        response.json()
    }
}

/// `PUT /servers/{id}`, replacing name and address with those of `server`.
#[derive(Debug, Clone)]
pub struct UpdateServer {
    server: Server,
}

impl UpdateServer {
    pub fn new(server: Server) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &Server {
        &self.server
    }
}

impl Request for UpdateServer {
    type Dto = Server;
    type Error = ApiError;

    fn method(&self) -> HttpMethod {
        HttpMethod::Put
    }

    fn endpoint(&self) -> String {
        format!("/servers/{}", self.server.id)
    }

    fn default_body(&self) -> Option<Value> {
        Some(json!({
            "name": self.server.name,
            "ip": self.server.ip_address,
        }))
    }

    fn create_dto_from_response(&self, response: &HttpResponse) -> Result<Server, ApiError> {
        response.json()
    }
}

/// `DELETE /servers/{id}`. A successful delete carries no body.
#[derive(Debug, Clone, Copy)]
pub struct DeleteServer {
    pub id: u64,
}

impl Request for DeleteServer {
    type Dto = ();
    type Error = ApiError;

    fn method(&self) -> HttpMethod {
        HttpMethod::Delete
    }

    fn endpoint(&self) -> String {
        format!("/servers/{}", self.id)
    }

    fn create_dto_from_response(&self, _response: &HttpResponse) -> Result<(), ApiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use crate::dto::WithResponse;
    use crate::error::DtoError;
    use crate::response::Response;

    fn connector() -> Connector {
        Connector::new("http://localhost:3000")
    }

    #[test]
    fn list_servers_request() {
        let req = connector().build(&ListServers::all()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/servers");
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn list_servers_filter_goes_in_query() {
        let req = connector().build(&ListServers::named("web 1")).unwrap();
        assert_eq!(req.path, "http://localhost:3000/servers?name=web+1");
    }

    #[test]
    fn get_server_request() {
        let req = connector().build(&GetServer { id: 42 }).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/servers/42");
    }

    #[test]
    fn create_server_body_comes_from_dto() {
        let server = Server::new(0, "srv1", "10.0.0.1");
        let request = CreateServer::new(server.clone());
        let req = connector().build(&request).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/servers");
        let body = req.json_body().unwrap().unwrap();
        assert_eq!(body["name"], server.name.as_str());
        assert_eq!(body["ip"], server.ip_address.as_str());
        assert!(body.get("id").is_none());
        // The request only reads the DTO it owns.
        assert_eq!(request.server(), &server);
    }

    #[test]
    fn update_server_targets_dto_id() {
        let server = Server::new(9, "renamed", "10.0.0.9");
        let req = connector().build(&UpdateServer::new(server)).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/servers/9");
        assert_eq!(
            req.json_body().unwrap().unwrap(),
            json!({"name": "renamed", "ip": "10.0.0.9"})
        );
    }

    #[test]
    fn fetched_dto_seeds_update() {
        let fetched = connector()
            .respond(
                GetServer { id: 1 },
                HttpResponse::new(200, r#"{"id":1,"name":"srv1","ip":"10.0.0.1"}"#),
            )
            .into_dto()
            .unwrap();
        let req = connector().build(&UpdateServer::new(fetched)).unwrap();
        assert_eq!(req.path, "http://localhost:3000/servers/1");
        assert_eq!(req.json_body().unwrap().unwrap(), json!({"name": "srv1", "ip": "10.0.0.1"}));
    }

    #[test]
    fn delete_server_request_and_dto() {
        let req = connector().build(&DeleteServer { id: 3 }).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());

        let response = connector().respond(DeleteServer { id: 3 }, HttpResponse::new(204, ""));
        assert!(response.dto_or_fail().is_ok());
        let missing = connector().respond(DeleteServer { id: 3 }, HttpResponse::new(404, ""));
        assert!(matches!(missing.dto_or_fail(), Err(DtoError::FailedResponse(_))));
    }

    #[test]
    fn list_dto_attaches_origin_to_every_server() {
        let response: Response<ListServers> = connector().respond(
            ListServers::all(),
            HttpResponse::new(
                200,
                r#"[{"id":1,"name":"a","ip":"10.0.0.1"},{"id":2,"name":"b","ip":"10.0.0.2"}]"#,
            ),
        );
        let servers = response.dto().unwrap();
        assert_eq!(servers.len(), 2);
        for server in servers {
            assert!(std::sync::Arc::ptr_eq(&server.response().unwrap(), response.raw()));
        }
    }

    #[test]
    fn get_server_mapping_reports_missing_field() {
        let response = connector().respond(GetServer { id: 1 }, HttpResponse::new(200, "{}"));
        match response.dto() {
            Err(ApiError::DeserializationError(msg)) => assert!(msg.contains("missing field `id`")),
            other => panic!("expected missing field error, got {other:?}"),
        }
    }
}
