//! Fake practice service for client integration tests.
//!
//! Serves the scheduling and import endpoints from in-memory state on a
//! random local port and records every request it receives.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use practice_client::{ApiClient, ClientConfig};

pub type Shared = Arc<Mutex<ServiceState>>;

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Debug, Default)]
pub struct ServiceState {
    pub due_cards: Vec<Value>,
    pub new_cards: Vec<Value>,
    /// Query strings of card fetches, in order.
    pub card_queries: Vec<HashMap<String, String>>,
    /// (card type, id, body) of every review submission.
    pub reviews: Vec<(String, i64, Value)>,
    pub resets: Vec<(i64, Value)>,
    /// Replies to status polls; the last one repeats.
    pub statuses: VecDeque<Value>,
    pub status_polls: usize,
    /// Make every review fail with this status.
    pub fail_reviews: Option<StatusCode>,
    pub authorization: Vec<Option<String>>,
    /// Body of GET /api/anki-stats.
    pub overview: Value,
}

pub struct FakeService {
    pub state: Shared,
    pub base_url: String,
}

impl FakeService {
    pub async fn start(state: ServiceState) -> Self {
        let state = Arc::new(Mutex::new(state));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake service failed");
        });

        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_url: format!("{}/", self.base_url),
            ..ClientConfig::default()
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config()).expect("Failed to build client")
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut ServiceState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/quiz/:id/anki-cards", get(anki_cards))
        .route("/api/word/:id/review", post(review_word))
        .route("/api/sentence/:id/review", post(review_sentence))
        .route("/api/quiz/:id/reset-anki", post(reset_anki))
        .route("/api/anki-stats", get(anki_stats))
        .route("/quiz/:id/status", get(quiz_status))
        .route("/api/quiz/:id/cancel-processing", post(cancel_processing))
        .with_state(state)
}

pub fn word_card(id: i64, lemma: &str, translation: &str, is_new: bool) -> Value {
    json!({
        "id": id,
        "type": "word",
        "lemma": lemma,
        "translation": translation,
        "example_sentence": null,
        "explanation": null,
        "quiz_id": 1,
        "ease_factor": 2.5,
        "interval": if is_new { 0 } else { 3 },
        "repetitions": if is_new { 0 } else { 2 },
        "due_date": "2024-03-01T09:00:00.000000",
        "is_new": is_new,
        "is_due": true
    })
}

pub fn sentence_card(id: i64, text: &str, translation: &str, is_new: bool) -> Value {
    json!({
        "id": id,
        "type": "sentence",
        "text": text,
        "translation": translation,
        "quiz_id": 1,
        "ease_factor": 2.5,
        "interval": 0,
        "repetitions": 0,
        "due_date": "2024-03-01T09:00:00",
        "is_new": is_new,
        "is_due": true
    })
}

pub fn status(status: &str, message: &str) -> Value {
    json!({ "status": status, "message": message })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn anki_cards(
    State(state): State<Shared>,
    Path(_quiz_id): Path<i64>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.authorization.push(bearer(&headers));

    // An empty word_ids means no filter; it only applies to words.
    let word_ids: Option<Vec<i64>> = query
        .get("word_ids")
        .filter(|ids| !ids.is_empty())
        .map(|ids| ids.split(',').filter_map(|id| id.trim().parse().ok()).collect());
    let keep = |card: &&Value| match &word_ids {
        Some(ids) if card["type"] == "word" => {
            card["id"].as_i64().is_some_and(|id| ids.contains(&id))
        }
        _ => true,
    };
    let due: Vec<Value> = state.due_cards.iter().filter(keep).cloned().collect();
    let new: Vec<Value> = state.new_cards.iter().filter(keep).cloned().collect();

    let body = json!({
        "total_due": due.len(),
        "total_new": new.len(),
        "due_cards": due,
        "new_cards": new,
        "mode": query.get("mode"),
        "direction": query.get("direction"),
    });
    state.card_queries.push(query);
    Json(body)
}

async fn review_word(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    review(state, "word", id, body)
}

async fn review_sentence(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    review(state, "sentence", id, body)
}

fn review(state: Shared, card_type: &str, id: i64, body: Value) -> Reply {
    let mut state = state.lock().unwrap();
    if let Some(code) = state.fail_reviews {
        return Err((code, Json(json!({ "error": "Word not found" }))));
    }
    let rating = body["rating"].as_u64().unwrap_or(0);
    let direction = body["direction"].clone();
    state.reviews.push((card_type.to_string(), id, body));

    let interval = if rating == 1 { 1 } else { 6 };
    Ok(Json(json!({
        "success": true,
        "word_id": id,
        "direction": direction,
        "ease_factor": 2.5,
        "interval": interval,
        "repetitions": if rating == 1 { 0 } else { 1 },
        "due_date": "2024-03-07T09:00:00.000000",
        "tracking_enabled": true
    })))
}

async fn reset_anki(
    State(state): State<Shared>,
    Path(quiz_id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.resets.push((quiz_id, body.clone()));

    // Every reviewed card becomes new again.
    let due: Vec<Value> = state.due_cards.drain(..).collect();
    let reset_count = due.len();
    for mut card in due {
        card["is_new"] = json!(true);
        card["interval"] = json!(0);
        card["repetitions"] = json!(0);
        state.new_cards.push(card);
    }

    Json(json!({
        "success": true,
        "reset_count": reset_count,
        "mode": body["mode"],
        "direction": body["direction"]
    }))
}

async fn anki_stats(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.authorization.push(bearer(&headers));
    Json(state.overview.clone())
}

async fn quiz_status(State(state): State<Shared>, Path(_quiz_id): Path<i64>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.status_polls += 1;
    let reply = if state.statuses.len() > 1 {
        state.statuses.pop_front()
    } else {
        state.statuses.front().cloned()
    };
    Json(reply.unwrap_or_else(|| json!({ "status": "completed", "message": "" })))
}

async fn cancel_processing(State(state): State<Shared>, Path(_quiz_id): Path<i64>) -> Reply {
    let mut state = state.lock().unwrap();
    let current = state
        .statuses
        .front()
        .and_then(|s| s["status"].as_str())
        .unwrap_or("completed")
        .to_string();
    if current != "pending" && current != "processing" {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Cannot cancel: quiz is not being processed" })),
        ));
    }
    state.statuses = VecDeque::from([status("cancelled", "Processing cancelled by user")]);
    Ok(Json(json!({ "message": "Processing cancelled" })))
}
