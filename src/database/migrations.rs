use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    create_attendance_table(pool).await?;
    create_users_table(pool).await?;
    create_settings_table(pool).await?;
    seed_default_settings(pool).await?;

    info!("Database migrations completed successfully");
    Ok(())
}

async fn create_attendance_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            user_name TEXT NOT NULL,
            date DATE NOT NULL,
            check_in_time TIME,
            check_out_time TIME,
            morning_status TEXT,
            evening_status TEXT,
            location TEXT,
            task TEXT,
            tasks_json TEXT,
            completion INTEGER DEFAULT 0,
            progress_status TEXT,
            work_summary TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(user_id, date)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            user_name TEXT NOT NULL,
            is_active INTEGER DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seeds the tunables the bot and admin console read at runtime. Existing
/// values win, so re-running at every startup is safe.
async fn seed_default_settings(pool: &SqlitePool) -> Result<()> {
    let default_settings: &[(&str, String)] = &[
        ("bot_name", "考勤小助手".to_string()),
        ("welcome_message", "你好！我是考勤小助手".to_string()),
        ("morning_time", "09:00".to_string()),
        ("noon_time", "13:00".to_string()),
        ("evening_time", "18:00".to_string()),
        ("report_time", "20:00".to_string()),
        ("week_report_time", "18:00".to_string()),
        ("month_report_time", "18:00".to_string()),
        (
            "task_tags",
            serde_json::to_string(&["视频剪辑", "文案撰写", "素材拍摄", "字幕压制", "封面设计", "平台发布"])?,
        ),
        (
            "status_options",
            serde_json::to_string(&["办公室坐班", "外出拍摄", "居家办公", "会议中"])?,
        ),
        ("schedule_enabled", "true".to_string()),
        ("company_location", String::new()),
        ("company_lat", String::new()),
        ("company_lng", String::new()),
        ("checkin_radius", "500".to_string()),
    ];

    for (key, value) in default_settings {
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(*key)
            .bind(value.as_str())
            .execute(pool)
            .await?;
    }

    Ok(())
}
