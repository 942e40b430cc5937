use crate::bot::AppState;
use crate::database::queries;
use crate::feishu::message::{Card, CardAction, CardButton, CardTemplate};
use crate::utils::format::{build_daily_report, format_user_status, mention, status_icon};
use crate::utils::time::today_date;
use anyhow::Result;

const MAX_STATUS_BUTTONS: usize = 6;

const DEFAULT_STATUS_OPTIONS: [&str; 4] = ["办公室坐班", "外出拍摄", "居家办公", "会议中"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CheckIn,
    CheckOut,
    DailyReport,
    Status,
    Help,
    Unknown(String),
}

/// Exact-match dispatch after trimming; anything unrecognized echoes back
/// with a help hint.
pub fn parse_command(text: &str) -> Command {
    match text.trim() {
        "签到" | "/checkin" | "/签到" => Command::CheckIn,
        "签退" | "/checkout" | "/签退" => Command::CheckOut,
        "日报" | "/report" | "/日报" => Command::DailyReport,
        "状态" | "/status" | "/状态" => Command::Status,
        "帮助" | "/help" => Command::Help,
        other => Command::Unknown(other.to_string()),
    }
}

pub async fn handle_command(
    state: &AppState,
    user_id: &str,
    user_name: &str,
    command: Command,
) -> Result<()> {
    match command {
        Command::CheckIn => {
            let settings = queries::get_all_settings(&state.pool).await?;
            let statuses = configured_statuses(&settings.list("status_options"));
            let card = build_checkin_card(&settings.text("company_location", ""), &statuses);
            state.feishu.send_card(&card).await;
        }
        Command::CheckOut => {
            state.feishu.send_card(&build_checkout_card()).await;
        }
        Command::DailyReport => {
            let statuses = queries::get_today_status(&state.pool).await?;
            let roster = queries::get_active_users(&state.pool).await?;
            let content = build_daily_report(today_date(), &statuses, &roster);
            state.feishu.send_rich_text("📊 今日团队去向", &content).await;
        }
        Command::Status => {
            let message = match queries::get_user_status(&state.pool, user_id).await? {
                Some(snapshot) => format_user_status(&snapshot),
                None => mention(user_name, "您今天还没有签到！"),
            };
            state.feishu.send_text(&message).await;
        }
        Command::Help => {
            let settings = queries::get_all_settings(&state.pool).await?;
            let statuses = configured_statuses(&settings.list("status_options"));
            let help = build_help_text(&settings.text("bot_name", "考勤小助手"), &statuses);
            state.feishu.send_text(&help).await;
        }
        Command::Unknown(text) => {
            state
                .feishu
                .send_text(&format!("收到消息：{}\n\n发送「帮助」查看可用命令", text))
                .await;
        }
    }

    Ok(())
}

fn configured_statuses(configured: &[String]) -> Vec<String> {
    if configured.is_empty() {
        DEFAULT_STATUS_OPTIONS.iter().map(|s| s.to_string()).collect()
    } else {
        configured.to_vec()
    }
}

/// Morning card: one button per configured status, capped at six, laid out
/// two per action row.
pub fn build_checkin_card(location: &str, statuses: &[String]) -> Card {
    let location = if location.is_empty() { "公司地址未设置" } else { location };

    let mut card = Card::new("☀️ 早安！请签到", CardTemplate::Blue)
        .markdown(format!("📍 当前定位：{}\n选择您的状态：", location));

    let capped = &statuses[..statuses.len().min(MAX_STATUS_BUTTONS)];
    for row in capped.chunks(2) {
        let buttons = row
            .iter()
            .map(|status| {
                CardButton::new(
                    format!("{} {}", status_icon(status), status),
                    CardAction::Checkin { status: status.clone() },
                )
                .primary()
            })
            .collect();
        card = card.actions(buttons);
    }

    card
}

/// Evening card: the four fixed completion percentages.
pub fn build_checkout_card() -> Card {
    Card::new("🌙 辛苦了！请签退", CardTemplate::Green)
        .markdown("请选择完成度：")
        .actions(vec![
            CardButton::new("25% 🔴", CardAction::Checkout { completion: 25 }),
            CardButton::new("50% 🟡", CardAction::Checkout { completion: 50 }),
        ])
        .actions(vec![
            CardButton::new("75% 🟢", CardAction::Checkout { completion: 75 }),
            CardButton::new("100% ⭐", CardAction::Checkout { completion: 100 }).primary(),
        ])
}

pub fn build_help_text(bot_name: &str, statuses: &[String]) -> String {
    let mut text = format!(
        "🚗 **{}帮助**\n\n*可用命令：*\n• 签到 - 每日签到\n• 签退 - 每日签退\n• 日报 - 查看今日汇总\n• 状态 - 查看个人状态\n• 帮助 - 查看帮助信息\n\n*考勤状态：*",
        bot_name
    );
    for status in statuses {
        text.push_str(&format!("\n{} {}", status_icon(status), status));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_table_matches_exactly() {
        assert_eq!(parse_command("签到"), Command::CheckIn);
        assert_eq!(parse_command("/checkin"), Command::CheckIn);
        assert_eq!(parse_command(" 签退 "), Command::CheckOut);
        assert_eq!(parse_command("/report"), Command::DailyReport);
        assert_eq!(parse_command("状态"), Command::Status);
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("帮助"), Command::Help);
        assert_eq!(
            parse_command("xyz123"),
            Command::Unknown("xyz123".to_string())
        );
        // Substrings are not commands
        assert_eq!(
            parse_command("今天签到了吗"),
            Command::Unknown("今天签到了吗".to_string())
        );
    }

    #[test]
    fn checkin_card_uses_configured_statuses_in_rows_of_two() {
        let statuses: Vec<String> = ["办公室坐班", "外出拍摄", "居家办公"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let card = serde_json::to_value(build_checkin_card("北京市朝阳区", &statuses)).unwrap();

        assert_eq!(card["header"]["template"], "blue");
        let elements = card["elements"].as_array().unwrap();
        assert_eq!(elements[0]["tag"], "div");
        assert!(
            elements[0]["text"]["content"]
                .as_str()
                .unwrap()
                .contains("北京市朝阳区")
        );

        // 3 statuses fill two action rows: 2 + 1
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1]["actions"].as_array().unwrap().len(), 2);
        assert_eq!(elements[2]["actions"].as_array().unwrap().len(), 1);
        assert_eq!(
            elements[1]["actions"][0]["value"],
            json!({"action": "checkin", "status": "办公室坐班"})
        );
        assert_eq!(elements[1]["actions"][0]["text"]["content"], "🏢 办公室坐班");
    }

    #[test]
    fn checkin_card_caps_at_six_statuses() {
        let statuses: Vec<String> = (1..=9).map(|i| format!("状态{}", i)).collect();
        let card = serde_json::to_value(build_checkin_card("", &statuses)).unwrap();

        let button_count: usize = card["elements"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|e| e["tag"] == "action")
            .map(|e| e["actions"].as_array().unwrap().len())
            .sum();
        assert_eq!(button_count, 6);

        // Unset company location falls back to the placeholder
        assert!(
            card["elements"][0]["text"]["content"]
                .as_str()
                .unwrap()
                .contains("公司地址未设置")
        );
    }

    #[test]
    fn checkout_card_has_four_fixed_percentages() {
        let card = serde_json::to_value(build_checkout_card()).unwrap();
        assert_eq!(card["header"]["template"], "green");

        let completions: Vec<i64> = card["elements"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|e| e["tag"] == "action")
            .flat_map(|e| e["actions"].as_array().unwrap())
            .map(|b| b["value"]["completion"].as_i64().unwrap())
            .collect();
        assert_eq!(completions, vec![25, 50, 75, 100]);
    }

    #[test]
    fn help_text_interpolates_bot_name_and_statuses() {
        let statuses = vec!["办公室坐班".to_string(), "外出拍摄".to_string()];
        let help = build_help_text("考勤小助手", &statuses);
        assert!(help.contains("考勤小助手帮助"));
        assert!(help.contains("🏢 办公室坐班"));
        assert!(help.contains("📹 外出拍摄"));
    }
}
