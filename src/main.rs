mod admin;
mod bot;
mod config;
mod database;
mod feishu;
mod utils;

use anyhow::Result;
use config::Config;
use feishu::client::FeishuClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "feishu_kaoqin=info,axum=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let pool = database::create_connection(&config.database_url).await?;
    let feishu = FeishuClient::new(config.webhook_url.clone())?;

    let state = bot::AppState { pool, feishu };

    let app = bot::router().merge(admin::router()).with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Starting attendance bot on port {}...", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
