#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub type Received = Arc<Mutex<Vec<(String, Value)>>>;

#[derive(Clone)]
struct MockState {
    received: Received,
    withdraw_status: StatusCode,
}

/// Starts an in-process bank API on a random port.
///
/// `/deposit` always answers 200; `/withdraw` answers `withdraw_status`.
/// Returns the base URL and the bodies received so far.
pub async fn spawn_mock_bank(withdraw_status: StatusCode) -> (String, Received) {
    let state = MockState {
        received: Arc::new(Mutex::new(Vec::new())),
        withdraw_status,
    };
    let received = state.received.clone();

    let app = Router::new()
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), received)
}

async fn deposit(State(state): State<MockState>, Json(body): Json<Value>) -> StatusCode {
    state.received.lock().await.push(("/deposit".to_string(), body));
    StatusCode::OK
}

async fn withdraw(State(state): State<MockState>, Json(body): Json<Value>) -> StatusCode {
    state.received.lock().await.push(("/withdraw".to_string(), body));
    state.withdraw_status
}

/// Number of digits after the decimal point in a JSON number.
pub fn decimal_digits(number: &Value) -> usize {
    let text = number.to_string();
    text.split_once('.').map_or(0, |(_, fraction)| fraction.len())
}
