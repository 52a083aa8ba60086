//! In-process game backend for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

use space_empire::api::GameApi;
use space_empire::app::{App, Completion, Effect, perform};
use space_empire::game::Coordinate;
use space_empire::store::{GameState, LocalStorage};

pub const TOKEN: &str = "tok-123";

#[derive(Debug, Default)]
pub struct Backend {
    /// `"METHOD /path?query"` for every request served.
    pub requests: Vec<String>,
    /// Structures built so far, per entity id.
    pub built: Vec<(String, String)>,
    pub cookies: Vec<String>,
    pub minerals: f64,
}

pub type Shared = Arc<Mutex<Backend>>;

#[derive(Debug, Deserialize)]
struct At {
    x: i64,
    y: i64,
}

fn record(state: &Shared, line: String) {
    state.lock().unwrap().requests.push(line);
}

async fn system(State(state): State<Shared>, headers: HeaderMap, Query(at): Query<At>) -> Json<Value> {
    record(&state, format!("GET /v1/systems?x={}&y={}", at.x, at.y));
    if let Some(cookie) = headers.get("cookie").and_then(|v| v.to_str().ok()) {
        state.lock().unwrap().cookies.push(cookie.to_string());
    }
    Json(json!({
        "data": {
            "entity_id": "e1",
            "title": "Sol",
            "category": "system",
            "components": [
                {"type": "structure_slot", "title": "Orbitals", "structure_slots": 5,
                 "allowed_structure_types": ["mine", "refinery"]},
                {"type": "entities", "title": "Planets", "entities": [
                    {"entity_id": "p1", "title": "Earth", "components": []}
                ]}
            ]
        }
    }))
}

async fn structures(
    State(state): State<Shared>,
    Path(entity_id): Path<String>,
    Query(at): Query<At>,
) -> Json<Value> {
    record(&state, format!("GET /v1/entity/{entity_id}/structures?x={}&y={}", at.x, at.y));
    let backend = state.lock().unwrap();
    let built: Vec<Value> = backend
        .built
        .iter()
        .filter(|(owner, _)| owner == &entity_id)
        .enumerate()
        .map(|(n, (_, structure_type))| {
            json!({
                "structure_id": format!("s-{n}"),
                "level": 1,
                "structure_type": structure_type,
                "title": structure_type,
            })
        })
        .collect();
    Json(json!({
        "built_structures": built,
        "structure_templates": [
            {"structure_type": "mine", "title": "Mine"},
            {"structure_type": "refinery", "title": "Refinery"}
        ],
        "other_templates": {}
    }))
}

async fn build(
    State(state): State<Shared>,
    Path((entity_id, structure_type)): Path<(String, String)>,
    Query(at): Query<At>,
) -> StatusCode {
    record(
        &state,
        format!("POST /v1/entity/{entity_id}/structures/{structure_type}?x={}&y={}", at.x, at.y),
    );
    let mut backend = state.lock().unwrap();
    backend.built.push((entity_id, structure_type));
    backend.minerals -= 50.0;
    StatusCode::OK
}

async fn upgrade(
    State(state): State<Shared>,
    Path((entity_id, structure_id)): Path<(String, String)>,
    Query(at): Query<At>,
) -> StatusCode {
    record(
        &state,
        format!("PUT /v1/entity/{entity_id}/structures/{structure_id}?x={}&y={}", at.x, at.y),
    );
    StatusCode::OK
}

async fn destroy(State(state): State<Shared>, Path(structure_id): Path<String>) -> (StatusCode, Json<Value>) {
    record(&state, format!("DELETE /v1/structures/{structure_id}"));
    if structure_id == "s-foreign" {
        return (StatusCode::FORBIDDEN, Json(json!({"detail": "not owner"})));
    }
    (StatusCode::OK, Json(json!({})))
}

async fn resources(State(state): State<Shared>) -> Json<Value> {
    record(&state, "GET /v1/resources".to_string());
    let minerals = state.lock().unwrap().minerals;
    let descriptor = |amount: f64| json!({"amount": amount, "change": 0, "capacity": null, "updated_at": null});
    Json(json!({
        "energy": descriptor(10.0),
        "minerals": descriptor(minerals),
        "alloys": descriptor(0.0),
        "antimatter": descriptor(0.0),
        "research": descriptor(0.0),
        "authority": descriptor(0.0),
    }))
}

async fn time_warp(State(state): State<Shared>, Path(seconds): Path<u64>) -> StatusCode {
    record(&state, format!("POST /v1/time-warp/{seconds}"));
    StatusCode::OK
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Shared,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend {
            minerals: 500.0,
            ..Default::default()
        }));
        let router = Router::new()
            .route("/v1/systems", get(system))
            .route("/v1/entity/:entity_id/structures", get(structures))
            .route("/v1/entity/:entity_id/structures/:item", post(build).put(upgrade))
            .route("/v1/structures/:structure_id", delete(destroy))
            .route("/v1/resources", get(resources))
            .route("/v1/time-warp/:seconds", post(time_warp))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn api(&self) -> GameApi {
        GameApi::new(&format!("http://{}", self.addr), Some(TOKEN), Duration::from_secs(5)).unwrap()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }
}

pub fn new_app(storage: LocalStorage) -> App {
    App::new(GameState::new(Coordinate::new(0, 0), "u1", storage), 3600)
}

/// Runs `effects` and everything they lead to, one at a time.
pub async fn settle(app: &mut App, api: &GameApi, effects: Vec<Effect>) {
    let mut queue: std::collections::VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        let completion: Completion = perform(api, effect).await;
        queue.extend(app.apply(completion));
    }
}
