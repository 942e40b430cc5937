//! Server-rendered admin pages. Small HTML surface, so these are plain
//! string builders rather than a template engine.

use crate::database::models::{AttendanceRecord, SettingsMap};
use crate::utils::time::format_opt_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Settings,
    Timing,
    Tasks,
    Status,
    Data,
}

const STYLE: &str = r#"<style>
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f5f6f7; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 20px; }
.header h1 { font-size: 24px; }
.nav { background: white; padding: 15px 20px; border-bottom: 1px solid #e5e6e8; }
.nav a { color: #3370ff; text-decoration: none; margin-right: 20px; padding: 8px 16px; border-radius: 6px; }
.nav a:hover, .nav a.active { background: #f5f7ff; }
.container { max-width: 1200px; margin: 20px auto; padding: 0 20px; }
.card { background: white; border-radius: 12px; padding: 24px; margin-bottom: 20px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
.card h2 { font-size: 18px; margin-bottom: 20px; color: #1f2329; }
.form-group { margin-bottom: 20px; }
.form-group label { display: block; margin-bottom: 8px; font-weight: 500; color: #1f2329; }
.form-group input, .form-group select, .form-group textarea { width: 100%; padding: 10px 14px; border: 1px solid #e5e6e8; border-radius: 8px; font-size: 14px; }
.form-group textarea { min-height: 100px; resize: vertical; }
.form-row { display: grid; grid-template-columns: repeat(3, 1fr); gap: 20px; }
.btn { padding: 10px 24px; background: #00b365; color: white; border: none; border-radius: 8px; font-size: 14px; cursor: pointer; }
.btn:hover { background: #009a55; }
.tag-input { display: flex; flex-wrap: wrap; gap: 8px; margin-top: 8px; }
.tag { display: inline-flex; align-items: center; padding: 6px 12px; background: #f0f1f3; border-radius: 16px; font-size: 13px; }
.tag .remove { margin-left: 8px; cursor: pointer; color: #ff4d4f; }
.tag-input input { flex: 1; min-width: 120px; }
.alert { padding: 12px 16px; background: #e8f9f0; color: #00b365; border-radius: 8px; margin-bottom: 20px; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #f0f1f3; }
th { background: #f5f6f7; font-weight: 500; color: #5e6e82; }
</style>"#;

const TAG_EDITOR_SCRIPT: &str = r#"
function removeEntry(el, entry) {
    entries = entries.filter(e => e !== entry);
    document.getElementById('entriesInput').value = JSON.stringify(entries);
    el.parentElement.remove();
}

function addEntry(e) {
    if (e.key === 'Enter') {
        e.preventDefault();
        const entry = document.getElementById('newEntry').value.trim();
        if (entry && !entries.includes(entry)) {
            entries.push(entry);
            const span = document.createElement('span');
            span.className = 'tag';
            const remove = document.createElement('span');
            remove.className = 'remove';
            remove.textContent = '×';
            remove.onclick = function() { removeEntry(remove, entry); };
            span.textContent = entry;
            span.appendChild(remove);
            document.getElementById('newEntry').before(span);
            document.getElementById('entriesInput').value = JSON.stringify(entries);
            document.getElementById('newEntry').value = '';
        }
    }
}
"#;

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn nav_link(href: &str, label: &str, active: bool) -> String {
    format!(
        r#"<a href="{}"{}>{}</a>"#,
        href,
        if active { r#" class="active""# } else { "" },
        label
    )
}

fn layout(page: Page, message: Option<&str>, body: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>考勤机器人管理后台</title>\n");
    html.push_str(STYLE);
    html.push_str("\n</head>\n<body>\n");
    html.push_str("<div class=\"header\"><h1>🚗 考勤机器人管理后台</h1></div>\n");
    html.push_str("<div class=\"nav\">\n");
    html.push_str(&nav_link("/", "基本设置", page == Page::Settings));
    html.push_str(&nav_link("/timing", "定时任务", page == Page::Timing));
    html.push_str(&nav_link("/tasks", "任务标签", page == Page::Tasks));
    html.push_str(&nav_link("/status", "考勤状态", page == Page::Status));
    html.push_str(&nav_link("/data", "考勤数据", page == Page::Data));
    html.push_str("\n</div>\n<div class=\"container\">\n");
    if let Some(message) = message {
        html.push_str(&format!("<div class=\"alert\">{}</div>\n", escape(message)));
    }
    html.push_str(body);
    html.push_str("\n</div>\n</body>\n</html>\n");
    html
}

fn text_input(label: &str, name: &str, value: &str, input_type: &str) -> String {
    format!(
        "<div class=\"form-group\"><label>{}</label><input type=\"{}\" name=\"{}\" value=\"{}\"></div>\n",
        label,
        input_type,
        name,
        escape(value)
    )
}

pub fn render_settings(settings: &SettingsMap, message: Option<&str>) -> String {
    let schedule_enabled = settings.flag("schedule_enabled", true);
    let (on_selected, off_selected) = if schedule_enabled {
        (" selected", "")
    } else {
        ("", " selected")
    };

    let mut body = String::new();
    body.push_str("<div class=\"card\"><h2>基本设置</h2>\n");
    body.push_str("<form method=\"post\" action=\"/settings/save\">\n");
    body.push_str(&text_input(
        "机器人名称",
        "bot_name",
        &settings.text("bot_name", "考勤小助手"),
        "text",
    ));
    body.push_str(&format!(
        "<div class=\"form-group\"><label>欢迎语</label><textarea name=\"welcome_message\">{}</textarea></div>\n",
        escape(&settings.text("welcome_message", ""))
    ));
    body.push_str(&text_input(
        "公司地址（用于定位签到）",
        "company_location",
        &settings.text("company_location", ""),
        "text",
    ));
    body.push_str("<div class=\"form-row\">\n");
    body.push_str(&text_input(
        "签到有效半径（米）",
        "checkin_radius",
        &settings.text("checkin_radius", "500"),
        "number",
    ));
    body.push_str(&format!(
        "<div class=\"form-group\"><label>开启定时任务</label><select name=\"schedule_enabled\"><option value=\"true\"{}>开启</option><option value=\"false\"{}>关闭</option></select></div>\n",
        on_selected, off_selected
    ));
    body.push_str("</div>\n");
    body.push_str("<button type=\"submit\" class=\"btn\">保存设置</button>\n</form></div>");

    layout(Page::Settings, message, &body)
}

pub fn render_timing(settings: &SettingsMap, message: Option<&str>) -> String {
    let field = |label: &str, name: &str, default: &str| {
        text_input(label, name, &settings.text(name, default), "time")
    };

    let mut body = String::new();
    body.push_str("<div class=\"card\"><h2>定时任务设置</h2>\n");
    body.push_str("<form method=\"post\" action=\"/timing/save\">\n");
    body.push_str("<div class=\"form-row\">\n");
    body.push_str(&field("早安签到提醒时间", "morning_time", "09:00"));
    body.push_str(&field("午间进度确认时间", "noon_time", "13:00"));
    body.push_str(&field("晚间签退提醒时间", "evening_time", "18:00"));
    body.push_str("</div>\n<div class=\"form-row\">\n");
    body.push_str(&field("日报发送时间", "report_time", "20:00"));
    body.push_str(&field("周报发送时间", "week_report_time", "18:00"));
    body.push_str(&field("月报发送时间", "month_report_time", "18:00"));
    body.push_str("</div>\n");
    body.push_str("<button type=\"submit\" class=\"btn\">保存时间设置</button>\n</form></div>");

    layout(Page::Timing, message, &body)
}

/// Shared tag-editor form used by both vocabulary pages.
fn render_tag_editor(
    page: Page,
    message: Option<&str>,
    heading: &str,
    label: &str,
    action: &str,
    field_name: &str,
    entries: &[String],
    submit_label: &str,
) -> String {
    let entries_json = serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string());

    let mut body = String::new();
    body.push_str(&format!("<div class=\"card\"><h2>{}</h2>\n", heading));
    body.push_str(&format!("<form method=\"post\" action=\"{}\">\n", action));
    body.push_str(&format!("<div class=\"form-group\"><label>{}</label>\n", label));
    body.push_str("<div class=\"tag-input\">\n");
    for entry in entries {
        body.push_str(&format!(
            "<span class=\"tag\">{}<span class=\"remove\" onclick=\"removeEntry(this, '{}')\">×</span></span>\n",
            escape(entry),
            escape(entry)
        ));
    }
    body.push_str(&format!(
        "<input type=\"hidden\" name=\"{}\" id=\"entriesInput\" value=\"{}\">\n",
        field_name,
        escape(&entries_json)
    ));
    body.push_str(
        "<input type=\"text\" id=\"newEntry\" placeholder=\"输入后按回车添加\" onkeypress=\"addEntry(event)\">\n",
    );
    body.push_str("</div></div>\n");
    body.push_str(&format!(
        "<button type=\"submit\" class=\"btn\">{}</button>\n</form></div>\n",
        submit_label
    ));
    body.push_str(&format!(
        "<script>\nlet entries = {};\n{}</script>",
        entries_json, TAG_EDITOR_SCRIPT
    ));

    layout(page, message, &body)
}

pub fn render_tasks(settings: &SettingsMap, message: Option<&str>) -> String {
    render_tag_editor(
        Page::Tasks,
        message,
        "任务标签管理",
        "当前任务标签（点击删除，或输入新标签添加）",
        "/tasks/save",
        "task_tags",
        &settings.list("task_tags"),
        "保存任务标签",
    )
}

pub fn render_status(settings: &SettingsMap, message: Option<&str>) -> String {
    render_tag_editor(
        Page::Status,
        message,
        "考勤状态管理",
        "考勤状态选项",
        "/status/save",
        "status_options",
        &settings.list("status_options"),
        "保存状态选项",
    )
}

pub fn render_data(records: &[AttendanceRecord]) -> String {
    let mut body = String::new();
    body.push_str("<div class=\"card\"><h2>考勤数据查看</h2>\n");
    body.push_str("<p style=\"color: #8f959e; margin-bottom: 20px;\">查看团队考勤记录</p>\n");
    body.push_str("<table>\n<thead><tr><th>日期</th><th>姓名</th><th>签到时间</th><th>签退时间</th><th>状态</th><th>完成度</th></tr></thead>\n<tbody>\n");
    for record in records {
        body.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}%</td></tr>\n",
            record.date,
            escape(&record.user_name),
            format_opt_time(record.check_in_time),
            format_opt_time(record.check_out_time),
            escape(record.morning_status.as_deref().unwrap_or("-")),
            record.completion
        ));
    }
    body.push_str("</tbody>\n</table>\n</div>");

    layout(Page::Data, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> SettingsMap {
        SettingsMap::from_rows(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn settings_page_escapes_values() {
        let map = settings(&[("bot_name", "<script>alert(1)</script>")]);
        let html = render_settings(&map, None);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn nav_marks_the_active_page() {
        let map = settings(&[]);
        let html = render_timing(&map, Some("时间设置已保存！"));
        assert!(html.contains(r#"<a href="/timing" class="active">"#));
        assert!(html.contains("时间设置已保存"));
    }

    #[test]
    fn tag_editor_embeds_the_current_list() {
        let map = settings(&[("task_tags", r#"["视频剪辑","文案撰写"]"#)]);
        let html = render_tasks(&map, None);
        assert!(html.contains("视频剪辑"));
        assert!(html.contains("name=\"task_tags\""));
        assert!(html.contains("let entries ="));
    }
}
