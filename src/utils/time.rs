use chrono::{Local, NaiveDate, NaiveTime, Timelike};

pub fn today_date() -> NaiveDate {
    Local::now().date_naive()
}

/// Current wall-clock time, truncated to whole seconds for storage.
pub fn current_time() -> NaiveTime {
    Local::now().time().with_nanosecond(0).unwrap()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

pub fn format_opt_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(time) => format_time(time),
        None => "-".to_string(),
    }
}

pub fn format_now() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
