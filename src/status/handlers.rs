use std::time::SystemTime;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use crate::health::{HostState, LinkState, RoundReport};
use crate::status::StatusState;

#[derive(Serialize)]
pub struct StatusSummary {
    pub version: &'static str,
    pub round: u64,
    pub hosts: usize,
    pub up: usize,
    pub down: usize,
    #[serde(with = "crate::health::types::unix_millis")]
    pub published_at: SystemTime,
    pub last_round: Option<RoundReport>,
}

pub async fn get_status(State(state): State<StatusState>) -> Json<StatusSummary> {
    let snapshot = state.board.load();
    Json(StatusSummary {
        version: env!("CARGO_PKG_VERSION"),
        round: snapshot.round,
        hosts: snapshot.hosts.len(),
        up: snapshot.count(LinkState::Up),
        down: snapshot.count(LinkState::Down),
        published_at: snapshot.published_at,
        last_round: snapshot.last_report.clone(),
    })
}

pub async fn get_hosts(State(state): State<StatusState>) -> Json<Vec<HostState>> {
    Json(state.board.load().hosts.clone())
}

pub async fn get_host(
    State(state): State<StatusState>,
    Path(address): Path<String>,
) -> Result<Json<HostState>, StatusCode> {
    state
        .board
        .load()
        .host(&address)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
