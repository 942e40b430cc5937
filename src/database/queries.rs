use crate::database::models::{
    AttendanceRecord, CheckInOutcome, CheckOutOutcome, EVENING_STATUS_DONE, SettingsMap,
    TodayStatus, User, UserStatus,
};
use crate::utils::time::{current_time, today_date};
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{Row, SqlitePool};

// ---------- Settings ----------

pub async fn get_setting(pool: &SqlitePool, key: &str, default: &str) -> Result<String> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(match row {
        Some(row) => row.get("value"),
        None => default.to_string(),
    })
}

pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_all_settings(pool: &SqlitePool) -> Result<SettingsMap> {
    let rows = sqlx::query("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    let pairs = rows
        .into_iter()
        .map(|row| (row.get("key"), row.get("value")))
        .collect();

    Ok(SettingsMap::from_rows(pairs))
}

// ---------- Users ----------

/// Best-effort upsert. Registration is side work; it must never fail the
/// caller's primary action, so storage errors are logged and swallowed.
pub async fn register_user(pool: &SqlitePool, user_id: &str, user_name: &str) {
    let result =
        sqlx::query("INSERT OR REPLACE INTO users (user_id, user_name, is_active) VALUES (?, ?, 1)")
            .bind(user_id)
            .bind(user_name)
            .execute(pool)
            .await;

    if let Err(e) = result {
        tracing::warn!("Failed to register user {}: {}", user_id, e);
    }
}

pub async fn get_active_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT user_id, user_name, is_active FROM users WHERE is_active = 1",
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

// ---------- Attendance ----------

pub async fn check_in(
    pool: &SqlitePool,
    user_id: &str,
    user_name: &str,
    status: &str,
    task: &str,
    location: &str,
    tasks: &[String],
) -> Result<CheckInOutcome> {
    check_in_at(
        pool,
        user_id,
        user_name,
        status,
        task,
        location,
        tasks,
        today_date(),
        current_time(),
    )
    .await
}

// The conflict-ignoring insert is the uniqueness guard: two simultaneous
// check-ins for the same (user, date) resolve inside sqlite, and the loser
// sees zero affected rows.
#[allow(clippy::too_many_arguments)]
async fn check_in_at(
    pool: &SqlitePool,
    user_id: &str,
    user_name: &str,
    status: &str,
    task: &str,
    location: &str,
    tasks: &[String],
    date: NaiveDate,
    time: NaiveTime,
) -> Result<CheckInOutcome> {
    let tasks_json = serde_json::to_string(tasks)?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (user_id, user_name, date, check_in_time, morning_status, task, location, tasks_json)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id, date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(user_name)
    .bind(date)
    .bind(time)
    .bind(status)
    .bind(task)
    .bind(location)
    .bind(tasks_json)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(CheckInOutcome::AlreadyCheckedIn);
    }

    register_user(pool, user_id, user_name).await;

    Ok(CheckInOutcome::Created)
}

pub async fn check_out(
    pool: &SqlitePool,
    user_id: &str,
    completion: i64,
    work_summary: &str,
) -> Result<CheckOutOutcome> {
    check_out_at(pool, user_id, completion, work_summary, today_date(), current_time()).await
}

async fn check_out_at(
    pool: &SqlitePool,
    user_id: &str,
    completion: i64,
    work_summary: &str,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<CheckOutOutcome> {
    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out_time = ?, completion = ?, evening_status = ?, work_summary = ?
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(time)
    .bind(completion)
    .bind(EVENING_STATUS_DONE)
    .bind(work_summary)
    .bind(user_id)
    .bind(date)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(CheckOutOutcome::NotCheckedIn);
    }

    Ok(CheckOutOutcome::Completed)
}

/// Updates the free-text progress field on today's record. Zero affected
/// rows (no record yet) is a silent no-op, not an error.
pub async fn update_progress(pool: &SqlitePool, user_id: &str, progress_status: &str) -> Result<()> {
    update_progress_on(pool, user_id, progress_status, today_date()).await
}

async fn update_progress_on(
    pool: &SqlitePool,
    user_id: &str,
    progress_status: &str,
    date: NaiveDate,
) -> Result<()> {
    sqlx::query("UPDATE attendance SET progress_status = ? WHERE user_id = ? AND date = ?")
        .bind(progress_status)
        .bind(user_id)
        .bind(date)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn get_today_status(pool: &SqlitePool) -> Result<Vec<TodayStatus>> {
    get_status_for_date(pool, today_date()).await
}

async fn get_status_for_date(pool: &SqlitePool, date: NaiveDate) -> Result<Vec<TodayStatus>> {
    let rows = sqlx::query(
        r#"
        SELECT user_id, user_name, check_in_time, check_out_time, morning_status, evening_status,
               task, location, completion, progress_status, work_summary, tasks_json
        FROM attendance WHERE date = ? ORDER BY check_in_time ASC
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    let statuses = rows
        .into_iter()
        .map(|row| {
            let tasks_json: Option<String> = row.get("tasks_json");
            let tasks = tasks_json
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default();

            TodayStatus {
                user_id: row.get("user_id"),
                name: row.get("user_name"),
                check_in: row.get("check_in_time"),
                check_out: row.get("check_out_time"),
                morning_status: row.get("morning_status"),
                evening_status: row.get("evening_status"),
                task: row.get("task"),
                location: row.get("location"),
                completion: row.get("completion"),
                progress_status: row.get("progress_status"),
                work_summary: row.get("work_summary"),
                tasks,
            }
        })
        .collect();

    Ok(statuses)
}

pub async fn get_user_status(pool: &SqlitePool, user_id: &str) -> Result<Option<UserStatus>> {
    get_user_status_on(pool, user_id, today_date()).await
}

async fn get_user_status_on(
    pool: &SqlitePool,
    user_id: &str,
    date: NaiveDate,
) -> Result<Option<UserStatus>> {
    let row = sqlx::query(
        r#"
        SELECT user_name, check_in_time, check_out_time, morning_status, task, completion, progress_status
        FROM attendance WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| UserStatus {
        name: row.get("user_name"),
        check_in: row.get("check_in_time"),
        check_out: row.get("check_out_time"),
        status: row.get("morning_status"),
        task: row.get("task"),
        completion: row.get("completion"),
        progress_status: row.get("progress_status"),
    }))
}

/// Most recent records for the admin data view.
pub async fn get_recent_records(pool: &SqlitePool, limit: i64) -> Result<Vec<AttendanceRecord>> {
    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, user_id, user_name, date, check_in_time, check_out_time, morning_status,
               evening_status, location, task, tasks_json, completion, progress_status,
               work_summary, created_at
        FROM attendance ORDER BY date DESC, check_in_time DESC LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::run_migrations;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn check_in_creates_todays_record() {
        let pool = test_pool().await;

        let outcome = check_in_at(
            &pool, "u_alice", "alice", "Office", "Edit video", "Office", &[], date(3), time(9, 0),
        )
        .await
        .unwrap();
        assert_eq!(outcome, CheckInOutcome::Created);

        let status = get_user_status_on(&pool, "u_alice", date(3))
            .await
            .unwrap()
            .expect("record should exist");
        assert_eq!(status.name, "alice");
        assert_eq!(status.check_in, Some(time(9, 0)));
        assert_eq!(status.check_out, None);
        assert_eq!(status.status.as_deref(), Some("Office"));
        assert_eq!(status.task.as_deref(), Some("Edit video"));
    }

    #[tokio::test]
    async fn second_check_in_same_day_is_rejected() {
        let pool = test_pool().await;

        check_in_at(&pool, "u_bob", "bob", "居家办公", "剪辑", "家", &[], date(3), time(8, 30))
            .await
            .unwrap();

        let second = check_in_at(
            &pool, "u_bob", "bob", "会议中", "开会", "会议室", &[], date(3), time(9, 15),
        )
        .await
        .unwrap();
        assert_eq!(second, CheckInOutcome::AlreadyCheckedIn);

        // First record is untouched
        let status = get_user_status_on(&pool, "u_bob", date(3)).await.unwrap().unwrap();
        assert_eq!(status.check_in, Some(time(8, 30)));
        assert_eq!(status.status.as_deref(), Some("居家办公"));
        assert_eq!(status.task.as_deref(), Some("剪辑"));

        // And a new day starts a fresh state machine
        let next_day = check_in_at(
            &pool, "u_bob", "bob", "会议中", "开会", "会议室", &[], date(4), time(9, 15),
        )
        .await
        .unwrap();
        assert_eq!(next_day, CheckInOutcome::Created);
    }

    #[tokio::test]
    async fn check_out_without_check_in_creates_nothing() {
        let pool = test_pool().await;

        let outcome = check_out_at(&pool, "u_carol", 50, "", date(3), time(18, 0))
            .await
            .unwrap();
        assert_eq!(outcome, CheckOutOutcome::NotCheckedIn);

        assert!(get_user_status_on(&pool, "u_carol", date(3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn check_out_completes_the_record() {
        let pool = test_pool().await;

        check_in_at(&pool, "u_alice", "alice", "Office", "Edit video", "Office", &[], date(3), time(9, 0))
            .await
            .unwrap();

        let outcome = check_out_at(&pool, "u_alice", 75, "剪完两条视频", date(3), time(18, 30))
            .await
            .unwrap();
        assert_eq!(outcome, CheckOutOutcome::Completed);

        let status = get_user_status_on(&pool, "u_alice", date(3)).await.unwrap().unwrap();
        assert_eq!(status.check_out, Some(time(18, 30)));
        assert_eq!(status.completion, 75);

        let all = get_status_for_date(&pool, date(3)).await.unwrap();
        assert_eq!(all[0].evening_status.as_deref(), Some(EVENING_STATUS_DONE));
        assert_eq!(all[0].work_summary.as_deref(), Some("剪完两条视频"));

        // Repeated check-out overwrites in place
        check_out_at(&pool, "u_alice", 100, "", date(3), time(19, 0)).await.unwrap();
        let status = get_user_status_on(&pool, "u_alice", date(3)).await.unwrap().unwrap();
        assert_eq!(status.check_out, Some(time(19, 0)));
        assert_eq!(status.completion, 100);
    }

    #[tokio::test]
    async fn progress_update_is_a_silent_noop_without_record() {
        let pool = test_pool().await;

        // No record yet: succeeds without creating anything
        update_progress(&pool, "u_dave", "一切正常").await.unwrap();
        assert!(get_user_status(&pool, "u_dave").await.unwrap().is_none());

        check_in(&pool, "u_dave", "dave", "外出拍摄", "拍摄", "外景", &[])
            .await
            .unwrap();
        update_progress(&pool, "u_dave", "素材已回传").await.unwrap();

        let status = get_user_status(&pool, "u_dave").await.unwrap().unwrap();
        assert_eq!(status.progress_status.as_deref(), Some("素材已回传"));
    }

    #[tokio::test]
    async fn today_status_is_ordered_by_check_in_time() {
        let pool = test_pool().await;

        check_in_at(&pool, "u_b", "bob", "办公室坐班", "", "办公室", &[], date(3), time(9, 5))
            .await
            .unwrap();
        check_in_at(&pool, "u_a", "alice", "办公室坐班", "", "办公室", &[], date(3), time(8, 30))
            .await
            .unwrap();
        check_in_at(&pool, "u_c", "carol", "居家办公", "", "家", &[], date(3), time(10, 0))
            .await
            .unwrap();

        let statuses = get_status_for_date(&pool, date(3)).await.unwrap();
        let names: Vec<&str> = statuses.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn structured_tasks_round_trip() {
        let pool = test_pool().await;

        let tasks = vec!["剪辑".to_string(), "封面设计".to_string()];
        check_in_at(&pool, "u_a", "alice", "办公室坐班", "剪辑", "办公室", &tasks, date(3), time(9, 0))
            .await
            .unwrap();

        let statuses = get_status_for_date(&pool, date(3)).await.unwrap();
        assert_eq!(statuses[0].tasks, tasks);
    }

    #[tokio::test]
    async fn register_user_upserts_display_name() {
        let pool = test_pool().await;

        register_user(&pool, "u_a", "alice").await;
        register_user(&pool, "u_a", "Alice W").await;

        let users = get_active_users(&pool).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].user_name, "Alice W");
        assert!(users[0].is_active);
    }

    #[tokio::test]
    async fn settings_round_trip_preserves_json_lists() {
        let pool = test_pool().await;

        let tags = serde_json::to_string(&["视频剪辑", "直播运营"]).unwrap();
        set_setting(&pool, "task_tags", &tags).await.unwrap();

        let settings = get_all_settings(&pool).await.unwrap();
        assert_eq!(settings.list("task_tags"), vec!["视频剪辑", "直播运营"]);

        assert_eq!(get_setting(&pool, "task_tags", "[]").await.unwrap(), tags);
        assert_eq!(
            get_setting(&pool, "no_such_key", "fallback").await.unwrap(),
            "fallback"
        );
    }

    #[tokio::test]
    async fn recent_records_are_newest_first_and_limited() {
        let pool = test_pool().await;

        check_in_at(&pool, "u_a", "alice", "办公室坐班", "", "办公室", &[], date(1), time(9, 0))
            .await
            .unwrap();
        check_in_at(&pool, "u_a", "alice", "办公室坐班", "", "办公室", &[], date(2), time(9, 0))
            .await
            .unwrap();
        check_in_at(&pool, "u_b", "bob", "居家办公", "", "家", &[], date(2), time(8, 0))
            .await
            .unwrap();

        let records = get_recent_records(&pool, 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2));
        // Same date orders by check-in time descending
        assert_eq!(records[0].user_name, "alice");
        assert_eq!(records[1].user_name, "bob");
    }
}
