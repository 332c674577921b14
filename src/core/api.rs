use crate::core::aggregator::aggregate;
use crate::core::doctor::*;
use crate::core::ent::*;
use crate::core::render::{local_time, render_dashboard};

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use std::sync::Arc;

const STYLES_CSS: &str = include_str!("../../static/styles.css");
const SCRIPT_JS: &str = include_str!("../../static/script.js");

pub struct AppState {
    pub dc: Doctor,
    pub nodes: Vec<NodeConfig>,
    pub display: DisplayConfig,
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let statuses = aggregate(&state.dc, &state.nodes).await;
    Html(render_dashboard(&statuses, &state.display, &local_time()))
}

pub async fn status_index(State(state): State<Arc<AppState>>) -> Json<Vec<NodeStatusSummary>> {
    let statuses = aggregate(&state.dc, &state.nodes).await;
    Json(statuses.iter().map(AggregatedNodeStatus::summary).collect())
}

pub async fn styles_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLES_CSS)
}

pub async fn script_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript")], SCRIPT_JS)
}
