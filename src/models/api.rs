//! Wire types for the AC backend's JSON REST API.
//!
//! Scope: types only — no client code.
//!
//! Notes
//! - Every response body is wrapped in the uniform [`Envelope`].
//! - Backend timestamps are naive ISO-8601 strings, hence `NaiveDateTime`.
//! - Schedule times-of-day stay `HH:MM` strings on the wire; validation
//!   happens client-side before submission.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =====================
// Response envelope
// =====================

/// Uniform `{success, data, error, message}` wrapper around every response.
///
/// A missing `success` flag counts as failure.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

// =====================
// Scalar ID newtype wrappers
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub i64);

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =====================
// Device state
// =====================

/// Operating modes accepted by the backend's mode map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Auto,
    Cool,
    Dry,
    Heat,
    Fan,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Auto => "auto",
            Mode::Cool => "cool",
            Mode::Dry => "dry",
            Mode::Heat => "heat",
            Mode::Fan => "fan",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Auto => "Auto",
            Mode::Cool => "Cool",
            Mode::Dry => "Dry",
            Mode::Heat => "Heat",
            Mode::Fan => "Fan",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Mode::Auto),
            "cool" => Ok(Mode::Cool),
            "dry" => Ok(Mode::Dry),
            "heat" => Ok(Mode::Heat),
            "fan" => Ok(Mode::Fan),
            other => Err(format!(
                "invalid mode `{other}` (expected auto, cool, dry, heat or fan)"
            )),
        }
    }
}

/// Fan speed: the device accepts exactly 20/40/60/80/102 on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FanSpeed {
    Low,
    MedLow,
    Medium,
    MedHigh,
    Auto,
}

impl FanSpeed {
    pub const ALL: [FanSpeed; 5] = [
        FanSpeed::Low,
        FanSpeed::MedLow,
        FanSpeed::Medium,
        FanSpeed::MedHigh,
        FanSpeed::Auto,
    ];

    pub fn as_raw(self) -> u8 {
        match self {
            FanSpeed::Low => 20,
            FanSpeed::MedLow => 40,
            FanSpeed::Medium => 60,
            FanSpeed::MedHigh => 80,
            FanSpeed::Auto => 102,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            20 => Some(FanSpeed::Low),
            40 => Some(FanSpeed::MedLow),
            60 => Some(FanSpeed::Medium),
            80 => Some(FanSpeed::MedHigh),
            102 => Some(FanSpeed::Auto),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FanSpeed::Low => "Low",
            FanSpeed::MedLow => "Med-Low",
            FanSpeed::Medium => "Medium",
            FanSpeed::MedHigh => "Med-High",
            FanSpeed::Auto => "Auto",
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl serde::Serialize for FanSpeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.as_raw())
    }
}

impl<'de> serde::Deserialize<'de> for FanSpeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = FanSpeed;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "an integer 20, 40, 60, 80 or 102 for FanSpeed")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u8::try_from(value)
                    .ok()
                    .and_then(FanSpeed::from_raw)
                    .ok_or_else(|| E::custom(format!("invalid fan speed {value}")))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u8::try_from(value)
                    .ok()
                    .and_then(FanSpeed::from_raw)
                    .ok_or_else(|| E::custom(format!("invalid fan speed {value}")))
            }
        }
        deserializer.deserialize_u64(V)
    }
}

/// Current device snapshot returned by `GET /status`. Read-mostly: the
/// client never mutates it except for the optimistic swing flip.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceStatus {
    pub running: bool,
    pub mode: Mode,
    pub target_temperature: f64,
    pub indoor_temperature: f64,
    pub outdoor_temperature: f64,
    pub fan_speed: FanSpeed,
    pub vertical_swing: bool,
    pub horizontal_swing: bool,
    /// Display unit for all three temperatures above.
    pub fahrenheit: bool,
    #[serde(default)]
    pub eco_mode: bool,
    #[serde(default)]
    pub turbo_mode: bool,
}

/// Axis selector for `POST /swing`; the payload carries only the chosen axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SwingAxis {
    Vertical,
    Horizontal,
}

impl SwingAxis {
    pub fn label(self) -> &'static str {
        match self {
            SwingAxis::Vertical => "vertical",
            SwingAxis::Horizontal => "horizontal",
        }
    }
}

/// Partial multi-field payload for `POST /control`; absent fields are left
/// untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fahrenheit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<FanSpeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_swing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_swing: Option<bool>,
}

impl ControlRequest {
    pub fn is_empty(&self) -> bool {
        self.running.is_none()
            && self.mode.is_none()
            && self.temperature.is_none()
            && self.fan_speed.is_none()
            && self.vertical_swing.is_none()
            && self.horizontal_swing.is_none()
    }
}

// =====================
// Schedules
// =====================

/// Weekday names as the backend stores them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub fn label(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mon" => Ok(Weekday::Mon),
            "tue" => Ok(Weekday::Tue),
            "wed" => Ok(Weekday::Wed),
            "thu" => Ok(Weekday::Thu),
            "fri" => Ok(Weekday::Fri),
            "sat" => Ok(Weekday::Sat),
            "sun" => Ok(Weekday::Sun),
            other => Err(format!("invalid weekday `{other}` (expected mon..sun)")),
        }
    }
}

/// The partial set of device attributes a schedule applies when it fires.
/// `fahrenheit` only qualifies `temperature` and does not count as an
/// action on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fahrenheit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<FanSpeed>,
}

impl ScheduleAction {
    pub fn is_empty(&self) -> bool {
        self.power.is_none()
            && self.mode.is_none()
            && self.temperature.is_none()
            && self.fan_speed.is_none()
    }
}

/// A persisted schedule record; `id` is assigned by the backend and never
/// fabricated client-side.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    /// 24-hour `HH:MM`.
    pub time: String,
    /// Empty means "every day".
    #[serde(default)]
    pub days: Vec<Weekday>,
    pub action: ScheduleAction,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_run: Option<NaiveDateTime>,
}

fn enabled_default() -> bool {
    true
}

/// Outgoing schedule record (sans id) for create and full-record update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleData {
    pub name: String,
    pub time: String,
    pub days: Vec<Weekday>,
    pub action: ScheduleAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Run summary for the remote scheduler process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
    #[serde(default)]
    pub pid: Option<i32>,
    pub enabled_schedules: u32,
    pub total_schedules: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_with_data() {
        let env: Envelope<Vec<i32>> =
            serde_json::from_str(r#"{"success": true, "data": [1, 2]}"#).expect("parse envelope");
        assert!(env.success);
        assert_eq!(env.data, Some(vec![1, 2]));
        assert_eq!(env.error, None);
    }

    #[test]
    fn envelope_missing_success_counts_as_failure() {
        let env: Envelope<Vec<i32>> =
            serde_json::from_str(r#"{"error": "boom"}"#).expect("parse envelope");
        assert!(!env.success);
        assert_eq!(env.error.as_deref(), Some("boom"));
    }

    #[test]
    fn fan_speed_wire_values() {
        for speed in FanSpeed::ALL {
            let json = serde_json::to_string(&speed).expect("serialize");
            let back: FanSpeed = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, speed);
        }
        assert_eq!(serde_json::to_string(&FanSpeed::Auto).expect("serialize"), "102");
        assert!(serde_json::from_str::<FanSpeed>("50").is_err());
    }

    #[test]
    fn mode_wire_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Cool).expect("serialize"), r#""cool""#);
        let mode: Mode = serde_json::from_str(r#""heat""#).expect("deserialize");
        assert_eq!(mode, Mode::Heat);
        assert!("FAN".parse::<Mode>().is_ok());
        assert!("turbo".parse::<Mode>().is_err());
    }

    #[test]
    fn action_with_only_unit_flag_is_empty() {
        let mut action = ScheduleAction::default();
        assert!(action.is_empty());
        action.fahrenheit = Some(true);
        assert!(action.is_empty());
        action.power = Some(false);
        assert!(!action.is_empty());
    }

    #[test]
    fn action_serializes_only_populated_fields() {
        let action = ScheduleAction {
            mode: Some(Mode::Cool),
            ..ScheduleAction::default()
        };
        let value = serde_json::to_value(&action).expect("serialize");
        assert_eq!(value, serde_json::json!({"mode": "cool"}));
    }

    #[test]
    fn parses_schedule_fixture() {
        let json = std::fs::read_to_string("tests/data/schedules.json").expect("fixture present");
        let schedules: Vec<Schedule> = serde_json::from_str(&json).expect("parse schedules");
        assert_eq!(schedules.len(), 2);

        let first = &schedules[0];
        assert_eq!(first.id, ScheduleId(1));
        assert_eq!(first.time, "07:00");
        assert_eq!(first.days.len(), 5);
        assert_eq!(first.action.mode, Some(Mode::Heat));
        assert_eq!(first.action.temperature, Some(70));
        assert!(first.enabled);
        assert!(first.last_run.is_some());

        let second = &schedules[1];
        assert!(second.days.is_empty());
        assert_eq!(second.action.fan_speed, Some(FanSpeed::Medium));
        assert!(!second.enabled);
        assert_eq!(second.last_run, None);
    }

    #[test]
    fn status_parses_without_optional_flags() {
        let json = r#"{
            "running": true, "mode": "cool",
            "target_temperature": 72.0, "indoor_temperature": 74.5,
            "outdoor_temperature": 88.0, "fan_speed": 60,
            "vertical_swing": false, "horizontal_swing": true,
            "fahrenheit": true
        }"#;
        let status: DeviceStatus = serde_json::from_str(json).expect("parse status");
        assert_eq!(status.mode, Mode::Cool);
        assert_eq!(status.fan_speed, FanSpeed::Medium);
        assert!(!status.eco_mode);
        assert!(!status.turbo_mode);
    }
}
