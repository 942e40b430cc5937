use crate::database::models::{PROGRESS_ALL_NORMAL, TodayStatus, User, UserStatus};
use crate::utils::time::format_opt_time;
use chrono::NaiveDate;
use std::collections::HashSet;

pub fn status_icon(status: &str) -> &'static str {
    match status {
        "办公室坐班" => "🏢",
        "外出拍摄" => "📹",
        "居家办公" => "💻",
        "会议中" => "📞",
        _ => "📌",
    }
}

/// Outbound texts address the acting user by name; the webhook transport
/// has no real mention entity, so this stays plain text.
pub fn mention(user_name: &str, message: &str) -> String {
    format!("@{} {}", user_name, message)
}

/// Composes the daily report: one block per checked-in user in check-in
/// order, then the roster of registered users without a record today.
/// The roster join is on user_id, so renamed users are not misclassified.
pub fn build_daily_report(date: NaiveDate, statuses: &[TodayStatus], roster: &[User]) -> String {
    let mut content = format!("📊 **今日团队去向** - {}\n\n", date.format("%Y-%m-%d"));

    for status in statuses {
        let morning = status.morning_status.as_deref().unwrap_or("");
        let task_text = status
            .task
            .as_deref()
            .filter(|task| !task.is_empty())
            .unwrap_or("未填写任务");
        let progress = status.progress_status.as_deref().unwrap_or("未确认");
        let progress_icon = if progress == PROGRESS_ALL_NORMAL { "🟢" } else { "🔴" };

        content.push_str(&format!("• {} {} {}\n", status.name, status_icon(morning), morning));
        content.push_str(&format!("  📝 {}\n", task_text));
        content.push_str(&format!("  {} 进度: {}\n", progress_icon, progress));
        if status.check_out.is_some() {
            content.push_str(&format!("  ⏰ 已签退 ({}%)\n", status.completion));
        }
        content.push('\n');
    }

    let checked_in: HashSet<&str> = statuses.iter().map(|s| s.user_id.as_str()).collect();
    let not_checked_in: Vec<&User> = roster
        .iter()
        .filter(|user| !checked_in.contains(user.user_id.as_str()))
        .collect();

    if !not_checked_in.is_empty() {
        content.push_str("⏰ **未签到**\n");
        for user in not_checked_in {
            content.push_str(&format!("• {}\n", user.user_name));
        }
    }

    content
}

/// Personal snapshot for the 状态 command.
pub fn format_user_status(status: &UserStatus) -> String {
    let mut text = format!("📊 {} 今日状态\n", status.name);
    text.push_str(&format!("签到时间：{}\n", format_opt_time(status.check_in)));
    text.push_str(&format!("签退时间：{}\n", format_opt_time(status.check_out)));
    text.push_str(&format!("状态：{}\n", status.status.as_deref().unwrap_or("-")));
    text.push_str(&format!(
        "任务：{}\n",
        status.task.as_deref().filter(|t| !t.is_empty()).unwrap_or("未填写任务")
    ));
    text.push_str(&format!(
        "进度：{}",
        status.progress_status.as_deref().unwrap_or("未确认")
    ));
    if status.check_out.is_some() {
        text.push_str(&format!("\n完成度：{}%", status.completion));
    }
    text
}
