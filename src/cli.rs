//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::api::{FanSpeed, Mode, SwingAxis, Weekday};

#[derive(Debug, Parser)]
#[command(
    name = "ac-console",
    version,
    about = "Control panel for a networked air conditioner"
)]
pub struct Cli {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current device status
    Status {
        /// Keep polling and re-rendering at the configured interval
        #[arg(long)]
        watch: bool,
        /// Include swing, eco and turbo details
        #[arg(short, long)]
        verbose: bool,
    },
    /// Turn the AC on or off
    Power {
        // bool fields default to flags; this one takes an on/off value
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        state: bool,
    },
    /// Set the operating mode
    Mode {
        #[arg(value_parser = parse_mode)]
        mode: Mode,
    },
    /// Set the target temperature
    Temp {
        /// Absolute value, or `up` / `down` to nudge by one degree
        #[arg(value_parser = parse_temp_arg)]
        value: TempArg,
        /// Interpret the value as Celsius
        #[arg(long, conflicts_with = "fahrenheit")]
        celsius: bool,
        /// Interpret the value as Fahrenheit
        #[arg(long)]
        fahrenheit: bool,
    },
    /// Set the fan speed
    Fan {
        /// Named level (low, med-low, medium, med-high, auto) or raw value
        #[arg(value_parser = parse_fan)]
        speed: FanSpeed,
    },
    /// Toggle a swing axis
    Swing {
        #[arg(value_parser = parse_axis)]
        axis: SwingAxis,
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        state: bool,
    },
    /// Apply several settings in one request
    Set(SetArgs),
    /// Manage time-based schedules
    Schedules {
        #[command(subcommand)]
        command: SchedulesCommand,
    },
    /// Control the remote scheduler process
    Scheduler {
        #[command(subcommand)]
        command: SchedulerCommand,
    },
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[arg(long, value_parser = parse_on_off)]
    pub power: Option<bool>,
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<Mode>,
    /// Target temperature (Fahrenheit unless --celsius)
    #[arg(long)]
    pub temp: Option<i32>,
    #[arg(long)]
    pub celsius: bool,
    #[arg(long, value_parser = parse_fan)]
    pub fan: Option<FanSpeed>,
    #[arg(long, value_parser = parse_on_off)]
    pub vertical_swing: Option<bool>,
    #[arg(long, value_parser = parse_on_off)]
    pub horizontal_swing: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum SchedulesCommand {
    /// List all schedules with the scheduler run summary
    List,
    /// Create a schedule
    Add(ScheduleForm),
    /// Edit an existing schedule
    Edit(ScheduleEdit),
    /// Delete a schedule (asks for confirmation)
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Enable a schedule
    Enable { id: i64 },
    /// Disable a schedule
    Disable { id: i64 },
}

#[derive(Debug, Args)]
pub struct ScheduleForm {
    /// Schedule name
    pub name: String,
    /// Trigger time, 24-hour HH:MM
    pub time: String,
    /// Weekday the schedule fires on (repeatable); omit for every day
    #[arg(long = "day", value_parser = parse_weekday)]
    pub days: Vec<Weekday>,
    #[arg(long, value_parser = parse_on_off)]
    pub power: Option<bool>,
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<Mode>,
    /// Action temperature in Fahrenheit
    #[arg(long, conflicts_with = "temp_c")]
    pub temp_f: Option<i32>,
    /// Action temperature in Celsius
    #[arg(long)]
    pub temp_c: Option<i32>,
    #[arg(long, value_parser = parse_fan)]
    pub fan: Option<FanSpeed>,
}

#[derive(Debug, Args)]
pub struct ScheduleEdit {
    pub id: i64,
    #[arg(long)]
    pub name: Option<String>,
    /// Trigger time, 24-hour HH:MM
    #[arg(long)]
    pub time: Option<String>,
    /// Replace the day selection (repeatable)
    #[arg(long = "day", value_parser = parse_weekday)]
    pub days: Option<Vec<Weekday>>,
    /// Clear the day selection (fire every day)
    #[arg(long, conflicts_with = "days")]
    pub every_day: bool,
    #[arg(long, value_parser = parse_on_off)]
    pub power: Option<bool>,
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<Mode>,
    #[arg(long, conflicts_with = "temp_c")]
    pub temp_f: Option<i32>,
    #[arg(long)]
    pub temp_c: Option<i32>,
    #[arg(long, value_parser = parse_fan)]
    pub fan: Option<FanSpeed>,
}

#[derive(Debug, Subcommand)]
pub enum SchedulerCommand {
    /// Show whether the scheduler process is running
    Status,
    /// Start the scheduler process
    Start,
    /// Stop the scheduler process
    Stop,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TempArg {
    Up,
    Down,
    Set(i32),
}

fn parse_temp_arg(s: &str) -> Result<TempArg, String> {
    match s {
        "up" => Ok(TempArg::Up),
        "down" => Ok(TempArg::Down),
        _ => s
            .parse::<i32>()
            .map(TempArg::Set)
            .map_err(|_| format!("expected a number, `up` or `down`, got `{s}`")),
    }
}

fn parse_on_off(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("expected `on` or `off`, got `{other}`")),
    }
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s)
}

fn parse_weekday(s: &str) -> Result<Weekday, String> {
    Weekday::from_str(s)
}

fn parse_axis(s: &str) -> Result<SwingAxis, String> {
    match s.to_ascii_lowercase().as_str() {
        "vertical" | "v" => Ok(SwingAxis::Vertical),
        "horizontal" | "h" => Ok(SwingAxis::Horizontal),
        other => Err(format!("expected `vertical` or `horizontal`, got `{other}`")),
    }
}

fn parse_fan(s: &str) -> Result<FanSpeed, String> {
    match s.to_ascii_lowercase().as_str() {
        "low" => return Ok(FanSpeed::Low),
        "med-low" | "medlow" => return Ok(FanSpeed::MedLow),
        "medium" | "med" => return Ok(FanSpeed::Medium),
        "med-high" | "medhigh" => return Ok(FanSpeed::MedHigh),
        "auto" => return Ok(FanSpeed::Auto),
        _ => {}
    }
    s.parse::<u8>()
        .ok()
        .and_then(FanSpeed::from_raw)
        .ok_or_else(|| {
            format!("invalid fan speed `{s}` (expected low, med-low, medium, med-high, auto or one of 20/40/60/80/102)")
        })
}
