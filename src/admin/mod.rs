pub mod views;

use crate::bot::AppState;
use crate::database::queries;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(settings_page))
        .route("/settings/save", post(save_settings))
        .route("/timing", get(timing_page))
        .route("/timing/save", post(save_timing))
        .route("/tasks", get(tasks_page))
        .route("/tasks/save", post(save_tasks))
        .route("/status", get(status_page))
        .route("/status/save", post(save_status))
        .route("/data", get(data_page))
}

/// Storage faults surface as a plain 500 here; unlike the bot endpoints,
/// the admin console has no acknowledgment contract to honor.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Admin request failed: {}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

type PageResult = Result<Html<String>, AppError>;

async fn settings_page(State(state): State<AppState>) -> PageResult {
    let settings = queries::get_all_settings(&state.pool).await?;
    Ok(Html(views::render_settings(&settings, None)))
}

async fn timing_page(State(state): State<AppState>) -> PageResult {
    let settings = queries::get_all_settings(&state.pool).await?;
    Ok(Html(views::render_timing(&settings, None)))
}

async fn tasks_page(State(state): State<AppState>) -> PageResult {
    let settings = queries::get_all_settings(&state.pool).await?;
    Ok(Html(views::render_tasks(&settings, None)))
}

async fn status_page(State(state): State<AppState>) -> PageResult {
    let settings = queries::get_all_settings(&state.pool).await?;
    Ok(Html(views::render_status(&settings, None)))
}

async fn data_page(State(state): State<AppState>) -> PageResult {
    let records = queries::get_recent_records(&state.pool, 100).await?;
    Ok(Html(views::render_data(&records)))
}

// Every settable field has a hardcoded fallback, so a partial form never
// clears a setting to nothing unintentionally.

#[derive(Debug, Deserialize)]
struct GeneralSettingsForm {
    bot_name: Option<String>,
    welcome_message: Option<String>,
    company_location: Option<String>,
    checkin_radius: Option<String>,
    schedule_enabled: Option<String>,
}

async fn save_settings(
    State(state): State<AppState>,
    Form(form): Form<GeneralSettingsForm>,
) -> PageResult {
    let pool = &state.pool;
    queries::set_setting(pool, "bot_name", form.bot_name.as_deref().unwrap_or("考勤小助手")).await?;
    queries::set_setting(
        pool,
        "welcome_message",
        form.welcome_message.as_deref().unwrap_or("你好！"),
    )
    .await?;
    queries::set_setting(
        pool,
        "company_location",
        form.company_location.as_deref().unwrap_or(""),
    )
    .await?;
    queries::set_setting(pool, "checkin_radius", form.checkin_radius.as_deref().unwrap_or("500"))
        .await?;
    queries::set_setting(
        pool,
        "schedule_enabled",
        form.schedule_enabled.as_deref().unwrap_or("true"),
    )
    .await?;

    let settings = queries::get_all_settings(pool).await?;
    Ok(Html(views::render_settings(&settings, Some("保存成功！"))))
}

#[derive(Debug, Deserialize)]
struct TimingForm {
    morning_time: Option<String>,
    noon_time: Option<String>,
    evening_time: Option<String>,
    report_time: Option<String>,
    week_report_time: Option<String>,
    month_report_time: Option<String>,
}

async fn save_timing(State(state): State<AppState>, Form(form): Form<TimingForm>) -> PageResult {
    let pool = &state.pool;
    queries::set_setting(pool, "morning_time", form.morning_time.as_deref().unwrap_or("09:00"))
        .await?;
    queries::set_setting(pool, "noon_time", form.noon_time.as_deref().unwrap_or("13:00")).await?;
    queries::set_setting(pool, "evening_time", form.evening_time.as_deref().unwrap_or("18:00"))
        .await?;
    queries::set_setting(pool, "report_time", form.report_time.as_deref().unwrap_or("20:00"))
        .await?;
    queries::set_setting(
        pool,
        "week_report_time",
        form.week_report_time.as_deref().unwrap_or("18:00"),
    )
    .await?;
    queries::set_setting(
        pool,
        "month_report_time",
        form.month_report_time.as_deref().unwrap_or("18:00"),
    )
    .await?;

    let settings = queries::get_all_settings(pool).await?;
    Ok(Html(views::render_timing(&settings, Some("时间设置已保存！"))))
}

#[derive(Debug, Deserialize)]
struct TasksForm {
    task_tags: Option<String>,
}

async fn save_tasks(State(state): State<AppState>, Form(form): Form<TasksForm>) -> PageResult {
    queries::set_setting(&state.pool, "task_tags", form.task_tags.as_deref().unwrap_or("[]"))
        .await?;

    let settings = queries::get_all_settings(&state.pool).await?;
    Ok(Html(views::render_tasks(&settings, Some("任务标签已保存！"))))
}

#[derive(Debug, Deserialize)]
struct StatusForm {
    status_options: Option<String>,
}

async fn save_status(State(state): State<AppState>, Form(form): Form<StatusForm>) -> PageResult {
    queries::set_setting(
        &state.pool,
        "status_options",
        form.status_options.as_deref().unwrap_or("[]"),
    )
    .await?;

    let settings = queries::get_all_settings(&state.pool).await?;
    Ok(Html(views::render_status(&settings, Some("状态选项已保存！"))))
}
