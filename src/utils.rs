//! Display formatting shared by the status panel and schedule list.

use chrono::NaiveDateTime;
use std::ops::RangeInclusive;

use crate::models::api::{ScheduleAction, Weekday};

/// Editable target range per display unit, matching the device's 16–31 °C
/// span.
pub fn temp_bounds(fahrenheit: bool) -> RangeInclusive<i32> {
    if fahrenheit { 60..=87 } else { 16..=31 }
}

pub fn temp_suffix(fahrenheit: bool) -> &'static str {
    if fahrenheit { "°F" } else { "°C" }
}

/// Parse a 24-hour `HH:MM` wall-clock time. The hour may be one or two
/// digits; the minute must be exactly two.
pub fn parse_time_of_day(s: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = s.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let h: u32 = hours.parse().ok()?;
    let m: u32 = minutes.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some((h, m))
}

/// Render `HH:MM` as 12-hour clock time ("13:05" → "1:05 PM"). Malformed
/// input is returned unchanged rather than dropped from the display.
pub fn format_time_12h(time: &str) -> String {
    match parse_time_of_day(time) {
        Some((h, m)) => {
            let suffix = if h >= 12 { "PM" } else { "AM" };
            let h12 = match h % 12 {
                0 => 12,
                other => other,
            };
            format!("{}:{:02} {}", h12, m, suffix)
        }
        None => time.to_string(),
    }
}

/// Summarize a day selection; an empty set means the schedule fires daily.
pub fn days_summary(days: &[Weekday]) -> String {
    if days.is_empty() {
        return "Every day".to_string();
    }
    days.iter()
        .map(|d| d.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line summary of a schedule action ("Power: On, Mode: Cool, ...").
pub fn action_summary(action: &ScheduleAction) -> String {
    let mut parts = Vec::new();
    if let Some(power) = action.power {
        parts.push(format!("Power: {}", if power { "On" } else { "Off" }));
    }
    if let Some(mode) = action.mode {
        parts.push(format!("Mode: {}", mode.label()));
    }
    if let Some(temperature) = action.temperature {
        let unit = temp_suffix(action.fahrenheit.unwrap_or(false));
        parts.push(format!("Temp: {}{}", temperature, unit));
    }
    if let Some(speed) = action.fan_speed {
        parts.push(format!("Fan: {}", speed.label()));
    }
    parts.join(", ")
}

pub fn format_last_run(last_run: Option<&NaiveDateTime>) -> String {
    match last_run {
        Some(ts) => format!("Last run: {}", ts.format("%Y-%m-%d %H:%M:%S")),
        None => "Never run".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::{FanSpeed, Mode};
    use chrono::NaiveDate;

    #[test]
    fn formats_afternoon_time() {
        assert_eq!(format_time_12h("13:05"), "1:05 PM");
    }

    #[test]
    fn formats_midnight_and_noon() {
        assert_eq!(format_time_12h("00:30"), "12:30 AM");
        assert_eq!(format_time_12h("12:00"), "12:00 PM");
        assert_eq!(format_time_12h("23:59"), "11:59 PM");
    }

    #[test]
    fn single_digit_hour_is_accepted() {
        assert_eq!(format_time_12h("7:45"), "7:45 AM");
    }

    #[test]
    fn malformed_time_passes_through() {
        assert_eq!(format_time_12h("soon"), "soon");
        assert_eq!(format_time_12h(""), "");
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("12:60"), None);
        assert_eq!(parse_time_of_day("1205"), None);
        assert_eq!(parse_time_of_day("12:5"), None);
        assert_eq!(parse_time_of_day("07:00"), Some((7, 0)));
    }

    #[test]
    fn empty_day_set_means_every_day() {
        assert_eq!(days_summary(&[]), "Every day");
        assert_eq!(days_summary(&[Weekday::Mon, Weekday::Wed]), "Mon, Wed");
    }

    #[test]
    fn bounds_follow_the_unit_flag() {
        assert_eq!(temp_bounds(true), 60..=87);
        assert_eq!(temp_bounds(false), 16..=31);
        assert_eq!(temp_suffix(true), "°F");
        assert_eq!(temp_suffix(false), "°C");
    }

    #[test]
    fn summarizes_full_action() {
        let action = ScheduleAction {
            power: Some(true),
            mode: Some(Mode::Cool),
            temperature: Some(72),
            fahrenheit: Some(true),
            fan_speed: Some(FanSpeed::Medium),
        };
        assert_eq!(
            action_summary(&action),
            "Power: On, Mode: Cool, Temp: 72°F, Fan: Medium"
        );
    }

    #[test]
    fn medium_fan_label_matches_status_panel() {
        let action = ScheduleAction {
            fan_speed: FanSpeed::from_raw(60),
            ..ScheduleAction::default()
        };
        assert_eq!(action_summary(&action), "Fan: Medium");
        assert_eq!(FanSpeed::Medium.label(), "Medium");
    }

    #[test]
    fn celsius_action_temperature_uses_celsius_suffix() {
        let action = ScheduleAction {
            temperature: Some(22),
            fahrenheit: Some(false),
            ..ScheduleAction::default()
        };
        assert_eq!(action_summary(&action), "Temp: 22°C");
    }

    #[test]
    fn last_run_formatting() {
        let ts = NaiveDate::from_ymd_opt(2026, 8, 5)
            .and_then(|d| d.and_hms_opt(7, 0, 2))
            .expect("valid timestamp");
        assert_eq!(format_last_run(Some(&ts)), "Last run: 2026-08-05 07:00:02");
        assert_eq!(format_last_run(None), "Never run");
    }
}
