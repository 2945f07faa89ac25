use std::{
    collections::BTreeMap,
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: u64,
    pub name: String,
    pub ip: String,
}

#[derive(Deserialize)]
pub struct ServerInput {
    pub name: String,
    pub ip: String,
}

#[derive(Deserialize)]
pub struct ListFilter {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    servers: BTreeMap<u64, Server>,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn not_found() -> (StatusCode, Json<ErrorBody>) {
    error(StatusCode::NOT_FOUND, "server not found")
}

fn validate(input: &ServerInput) -> ApiResult<()> {
    if input.name.trim().is_empty() {
        return Err(error(StatusCode::UNPROCESSABLE_ENTITY, "name must not be empty"));
    }
    Ok(())
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/servers", get(list_servers).post(create_server))
        .route(
            "/servers/{id}",
            get(get_server).put(update_server).delete(delete_server),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_servers(State(db): State<Db>, Query(filter): Query<ListFilter>) -> Json<Vec<Server>> {
    let store = db.read().await;
    Json(
        store
            .servers
            .values()
            .filter(|s| filter.name.as_ref().map_or(true, |name| &s.name == name))
            .cloned()
            .collect(),
    )
}

async fn create_server(
    State(db): State<Db>,
    Json(input): Json<ServerInput>,
) -> ApiResult<(StatusCode, Json<Server>)> {
    validate(&input)?;
    let mut store = db.write().await;
    store.next_id += 1;
    let server = Server {
        id: store.next_id,
        name: input.name,
        ip: input.ip,
    };
    store.servers.insert(server.id, server.clone());
    tracing::info!(id = server.id, name = %server.name, "server created");
    Ok((StatusCode::CREATED, Json(server)))
}

async fn get_server(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Server>> {
    let store = db.read().await;
    store.servers.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_server(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ServerInput>,
) -> ApiResult<Json<Server>> {
    validate(&input)?;
    let mut store = db.write().await;
    let server = store.servers.get_mut(&id).ok_or_else(not_found)?;
    server.name = input.name;
    server.ip = input.ip;
    Ok(Json(server.clone()))
}

async fn delete_server(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .servers
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(not_found)
}
