use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: String,
    pub database_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        // An empty webhook URL disables outbound sends instead of failing startup
        let webhook_url = env::var("FEISHU_WEBHOOK_URL").unwrap_or_default();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:attendance.db".to_string());

        let port = match env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a number, got {:?}", value))?,
            Err(_) => 5000,
        };

        Ok(Config {
            webhook_url,
            database_url,
            port,
        })
    }
}
