use crate::bot::{AppState, commands, interactions};
use crate::database::queries;
use crate::feishu::message::{CardCallback, IncomingMessage};
use crate::utils::time::format_now;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::{Value, json};

const UNKNOWN_USER: &str = "未知用户";

// The platform retries on transport errors, so both endpoints answer with
// this fixed shape no matter what happened internally.
fn ack_ok() -> Json<Value> {
    Json(json!({"code": 0, "message": "ok"}))
}

fn ack_internal_error() -> Json<Value> {
    Json(json!({"code": 500, "message": "internal error"}))
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { UNKNOWN_USER } else { name }
}

/// POST /bot/message — inbound text events.
pub async fn message_webhook(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let message: IncomingMessage = match serde_json::from_slice(&body) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Ignoring malformed message payload: {}", e);
            return ack_ok();
        }
    };

    if message.msg_type != "text" {
        return ack_ok();
    }

    let user_id = message.sender.user_id;
    let user_name = display_name(&message.sender.sender_id.name).to_string();
    tracing::info!("Message from {}: {:?}", user_name, message.text.content);

    queries::register_user(&state.pool, &user_id, &user_name).await;

    let command = commands::parse_command(&message.text.content);
    match commands::handle_command(&state, &user_id, &user_name, command).await {
        Ok(()) => ack_ok(),
        Err(e) => {
            tracing::error!("Failed to handle message: {}", e);
            ack_internal_error()
        }
    }
}

/// POST /bot/callback — interactive-card button presses.
pub async fn card_callback(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let callback: CardCallback = match serde_json::from_slice(&body) {
        Ok(callback) => callback,
        Err(e) => {
            tracing::warn!("Ignoring malformed callback payload: {}", e);
            return ack_ok();
        }
    };

    if callback.event_type != "interactive" {
        return ack_ok();
    }

    let Some(action) = callback.action.card_action() else {
        tracing::info!("Ignoring unknown card action: {}", callback.action.value);
        return ack_ok();
    };

    let user_id = callback.operator.user_id;
    let user_name = display_name(&callback.operator.name).to_string();
    tracing::info!("Card action from {}: {:?}", user_name, action);

    match interactions::handle_card_action(&state, &user_id, &user_name, action).await {
        Ok(()) => ack_ok(),
        Err(e) => {
            tracing::error!("Failed to handle callback: {}", e);
            ack_internal_error()
        }
    }
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "飞书考勤机器人运行中",
        "admin_url": "/",
        "time": format_now(),
    }))
}
