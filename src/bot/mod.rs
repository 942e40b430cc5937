pub mod commands;
pub mod handlers;
pub mod interactions;

use crate::feishu::client::FeishuClient;
use axum::Router;
use axum::routing::{get, post};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub feishu: FeishuClient,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bot/message", post(handlers::message_webhook))
        .route("/bot/callback", post(handlers::card_callback))
        .route("/health", get(handlers::health))
}
