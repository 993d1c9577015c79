use chrono::{DateTime, Local, TimeZone, Utc};

pub use crate::timer::format_clock;

/// Medal for the podium, 1-based number after that
pub fn rank_label(index: usize) -> String {
    match index {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        n => (n + 1).to_string(),
    }
}

/// `Oct 19, 10:30 AM` in local time
pub fn format_date(date: &DateTime<Utc>) -> String {
    format_date_in(date, &Local)
}

pub fn format_date_in<Tz: TimeZone>(date: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.with_timezone(tz).format("%b %-d, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_labels() {
        assert_eq!(rank_label(0), "🥇");
        assert_eq!(rank_label(2), "🥉");
        assert_eq!(rank_label(3), "4");
        assert_eq!(rank_label(9), "10");
    }

    #[test]
    fn test_format_date_utc() {
        let date = Utc.with_ymd_and_hms(2026, 10, 19, 22, 5, 0).unwrap();
        assert_eq!(format_date_in(&date, &Utc), "Oct 19, 10:05 PM");
    }
}
