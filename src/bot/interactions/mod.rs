use crate::bot::AppState;
use crate::database::models::{CheckInOutcome, CheckOutOutcome, DEFAULT_TASK};
use crate::database::queries;
use crate::feishu::message::CardAction;
use crate::utils::format::mention;
use anyhow::Result;

/// Applies a card button press to the ledger and reports the outcome back
/// to the chat. Domain conflicts become user-facing texts, not errors.
pub async fn handle_card_action(
    state: &AppState,
    user_id: &str,
    user_name: &str,
    action: CardAction,
) -> Result<()> {
    match action {
        CardAction::Checkin { status } => {
            // The check-in card offers no separate location input, so the
            // status label doubles as the location
            let outcome =
                queries::check_in(&state.pool, user_id, user_name, &status, DEFAULT_TASK, &status, &[])
                    .await?;
            let message = match outcome {
                CheckInOutcome::Created => {
                    format!("签到成功！\n状态：{}\n任务：{}", status, DEFAULT_TASK)
                }
                CheckInOutcome::AlreadyCheckedIn => "您今天已经签到过了！".to_string(),
            };
            state.feishu.send_text(&mention(user_name, &message)).await;
        }
        CardAction::Checkout { completion } => {
            let outcome = queries::check_out(&state.pool, user_id, completion, "").await?;
            let message = match outcome {
                CheckOutOutcome::Completed => {
                    format!("签退成功！\n今日完成度：{}%", completion)
                }
                CheckOutOutcome::NotCheckedIn => "您今天还没有签到！".to_string(),
            };
            state.feishu.send_text(&mention(user_name, &message)).await;
        }
    }

    Ok(())
}
