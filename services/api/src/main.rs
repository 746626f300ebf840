mod analytics;
mod error;
mod export;
mod github;
mod jira;
mod velocity;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use sprintdeck_cache::CacheManager;
use sprintdeck_common::types::ServiceInfo;
use sprintdeck_config::{init_tracing, AppConfig, BoardMapping, BoardMappings};
use tower_http::cors::CorsLayer;

use crate::github::client::{GithubClient, GithubClientConfig};
use crate::jira::client::{JiraClient, JiraClientConfig};

#[derive(Clone)]
pub struct AppState {
    pub info: ServiceInfo,
    pub jira: JiraClient,
    pub github: GithubClient,
    pub cache: Arc<CacheManager>,
    pub boards: Arc<BoardMappings>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(state.info.clone())
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.cache.stats().await;
    let body = format!(
        "# HELP sprintdeck_up Service up indicator\n\
         # TYPE sprintdeck_up gauge\n\
         sprintdeck_up 1\n\
         # HELP sprintdeck_info Service info\n\
         # TYPE sprintdeck_info gauge\n\
         sprintdeck_info{{service=\"sprintdeck-api\",version=\"{}\"}} 1\n\
         # HELP sprintdeck_cache_hits_total Cache lookups served from cache\n\
         # TYPE sprintdeck_cache_hits_total counter\n\
         sprintdeck_cache_hits_total {}\n\
         # HELP sprintdeck_cache_misses_total Cache lookups that missed\n\
         # TYPE sprintdeck_cache_misses_total counter\n\
         sprintdeck_cache_misses_total {}\n\
         # HELP sprintdeck_cache_entries Live cache entries\n\
         # TYPE sprintdeck_cache_entries gauge\n\
         sprintdeck_cache_entries {}\n",
        env!("CARGO_PKG_VERSION"),
        stats.hits,
        stats.misses,
        stats.entries
    );

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

#[derive(Debug, Serialize)]
struct BoardsResponse {
    data: Vec<BoardMapping>,
    count: usize,
}

async fn boards(State(state): State<AppState>) -> Json<BoardsResponse> {
    let data = state.boards.all().to_vec();
    let count = data.len();
    Json(BoardsResponse { data, count })
}

fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse::<HeaderValue>().unwrap(),
            "http://localhost:5173".parse::<HeaderValue>().unwrap(),
            "http://127.0.0.1:5173".parse::<HeaderValue>().unwrap(),
        ])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/metrics", get(metrics))
        .route("/api/boards", get(boards))
        .merge(velocity::router())
        .merge(analytics::router())
        .merge(export::router())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    error::set_dev_mode(config.is_development());
    tracing::info!(service = "sprintdeck-api", "starting");

    let jira_config = JiraClientConfig::from_env().expect("jira configuration");
    let github_config = GithubClientConfig::from_env().expect("github configuration");
    let jira = JiraClient::new(jira_config).expect("failed to create jira client");
    let github = GithubClient::new(github_config).expect("failed to create github client");

    let boards = BoardMappings::load(&config.board_mappings_path)
        .expect("failed to load board mappings");
    tracing::info!(boards = boards.all().len(), "board mappings loaded");

    let state = AppState {
        info: ServiceInfo::new("sprintdeck-api", &config.app_env),
        jira,
        github,
        cache: Arc::new(CacheManager::new()),
        boards: Arc::new(boards),
    };

    let app = build_router(state);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
