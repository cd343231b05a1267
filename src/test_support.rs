use axum::{body::Body, http::Request, http::StatusCode, Router};
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceExt;

use crate::models::NewCheese;
use crate::routes;
use crate::state::AppState;
use crate::store::{CheeseStore, MemoryStore};

// Process-wide env vars are shared by every test thread.
static ENV_LOCK: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn new_cheese(name: &str, price: f64, is_best_seller: bool) -> NewCheese {
    NewCheese {
        name: name.to_string(),
        price,
        is_best_seller,
    }
}

/// Full router over a memory store holding `cheeses` in order
pub async fn setup_test_app(cheeses: Vec<NewCheese>) -> Router {
    let store = MemoryStore::new();
    for cheese in cheeses {
        store.insert(cheese).await.unwrap();
    }

    routes::router(AppState {
        store: Arc::new(store),
    })
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, JsonValue) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}
