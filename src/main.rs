pub mod cli;
pub mod client;
pub mod config;
pub mod models {
    pub mod api;
}
pub mod notify;
pub mod services {
    pub mod device;
    pub mod schedules;
    pub mod watch;
}
#[cfg(test)]
pub mod testutil;
pub mod utils;

use clap::Parser;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::cli::{Cli, Command, ScheduleEdit, ScheduleForm, SchedulerCommand, SchedulesCommand, SetArgs, TempArg};
use crate::client::{AcClient, AcClientError};
use crate::config::Config;
use crate::models::api::{ControlRequest, DeviceStatus, Schedule, ScheduleId, SchedulerStatus};
use crate::notify::Notifier;
use crate::services::device::DevicePanel;
use crate::services::schedules::{SaveError, SchedulePanel, ScheduleDraft};
use crate::services::watch::{self, Visibility};

enum RunError {
    /// Startup or I/O problem worth its own log line.
    Fatal(String),
    /// A command failed; the notifier already carried the message.
    Command,
}

impl From<AcClientError> for RunError {
    fn from(_: AcClientError) -> Self {
        RunError::Command
    }
}

impl From<SaveError> for RunError {
    fn from(_: SaveError) -> Self {
        RunError::Command
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    let cfg = Config::from_env();
    info!(
        "Config loaded (api={}, poll={}s, command_reconcile={}ms, scheduler_reconcile={}ms)",
        cfg.api_base_url,
        cfg.poll_interval.as_secs(),
        cfg.command_reconcile_delay.as_millis(),
        cfg.scheduler_reconcile_delay.as_millis()
    );

    let notifier = Notifier::new(cfg.notification_ttl);
    let client = AcClient::new(&cfg.api_base_url, cfg.request_timeout, notifier.clone());

    match cli.command {
        Command::Status { watch, verbose } => cmd_status(&cfg, &client, &notifier, watch, verbose),
        Command::Power { state } => device_command(&cfg, &client, &notifier, |p| p.set_power(state)),
        Command::Mode { mode } => device_command(&cfg, &client, &notifier, |p| p.set_mode(mode)),
        Command::Temp {
            value,
            celsius,
            fahrenheit,
        } => cmd_temp(&cfg, &client, &notifier, value, celsius, fahrenheit),
        Command::Fan { speed } => {
            device_command(&cfg, &client, &notifier, |p| p.set_fan_speed(speed))
        }
        Command::Swing { axis, state } => {
            device_command(&cfg, &client, &notifier, |p| p.set_swing(axis, state))
        }
        Command::Set(args) => cmd_set(&cfg, &client, &notifier, args),
        Command::Schedules { command } => cmd_schedules(&cfg, &client, &notifier, command),
        Command::Scheduler { command } => cmd_scheduler(&cfg, &client, &notifier, command),
    }
}

// Device commands

fn device_command(
    cfg: &Config,
    client: &AcClient,
    notifier: &Notifier,
    op: impl FnOnce(&mut DevicePanel<'_>) -> Result<(), AcClientError>,
) -> Result<(), RunError> {
    let mut panel = DevicePanel::new(client, notifier.clone(), cfg.command_reconcile_delay);
    op(&mut panel)?;
    if let Some(status) = panel.status() {
        println!("{}", status_line(status));
    }
    Ok(())
}

fn cmd_status(
    cfg: &Config,
    client: &AcClient,
    notifier: &Notifier,
    watch: bool,
    verbose: bool,
) -> Result<(), RunError> {
    let mut panel = DevicePanel::new(client, notifier.clone(), cfg.command_reconcile_delay);
    if watch {
        let visibility = Visibility::new();
        info!(
            "Watching device status every {}s (ctrl-c to stop)",
            cfg.poll_interval.as_secs()
        );
        watch::run_loop(&mut panel, &visibility, cfg.poll_interval, |p| {
            match p.status() {
                Some(status) if p.connected() => {
                    let stamp = p
                        .last_update()
                        .map(|t| t.format("%H:%M:%S").to_string())
                        .unwrap_or_default();
                    println!("[{}] {}", stamp, status_line(status));
                }
                _ => println!("Disconnected"),
            }
        });
    }
    panel.refresh()?;
    if let Some(status) = panel.status() {
        print_status(status, verbose);
    }
    Ok(())
}

fn cmd_temp(
    cfg: &Config,
    client: &AcClient,
    notifier: &Notifier,
    value: TempArg,
    celsius: bool,
    fahrenheit: bool,
) -> Result<(), RunError> {
    let mut panel = DevicePanel::new(client, notifier.clone(), cfg.command_reconcile_delay);
    // Unit and current target come from the authoritative snapshot.
    panel.refresh()?;

    match value {
        TempArg::Up => {
            panel.adjust_temp(1);
            panel.submit_temp_input()?;
        }
        TempArg::Down => {
            panel.adjust_temp(-1);
            panel.submit_temp_input()?;
        }
        TempArg::Set(v) => {
            let unit_f = if celsius {
                false
            } else if fahrenheit {
                true
            } else {
                panel.fahrenheit()
            };
            let bounds = utils::temp_bounds(unit_f);
            if !bounds.contains(&v) {
                notifier.error(format!(
                    "Temperature out of range ({}-{}{})",
                    bounds.start(),
                    bounds.end(),
                    utils::temp_suffix(unit_f)
                ));
                return Err(RunError::Command);
            }
            panel.set_temperature_in(v, unit_f)?;
        }
    }

    if let Some(status) = panel.status() {
        println!("{}", status_line(status));
    }
    Ok(())
}

fn cmd_set(
    cfg: &Config,
    client: &AcClient,
    notifier: &Notifier,
    args: SetArgs,
) -> Result<(), RunError> {
    let request = ControlRequest {
        running: args.power,
        mode: args.mode,
        temperature: args.temp,
        fahrenheit: args.temp.map(|_| !args.celsius),
        fan_speed: args.fan,
        vertical_swing: args.vertical_swing,
        horizontal_swing: args.horizontal_swing,
    };
    if request.is_empty() {
        notifier.error("No changes specified");
        return Err(RunError::Command);
    }
    device_command(cfg, client, notifier, |p| p.apply_settings(&request))
}

// Schedule commands

fn cmd_schedules(
    cfg: &Config,
    client: &AcClient,
    notifier: &Notifier,
    command: SchedulesCommand,
) -> Result<(), RunError> {
    let mut panel = SchedulePanel::new(client, notifier.clone(), cfg.scheduler_reconcile_delay);
    match command {
        SchedulesCommand::List => {
            panel.reload()?;
            panel.reload_summary()?;
            if let Some(summary) = panel.summary() {
                println!("{}", summary_line(summary));
            }
            print_schedules(panel.schedules());
        }
        SchedulesCommand::Add(form) => {
            panel.open_add();
            if let Some(draft) = panel.draft_mut() {
                fill_draft_from_form(draft, form);
            }
            panel.save()?;
            print_schedules(panel.schedules());
        }
        SchedulesCommand::Edit(edit) => {
            panel.reload()?;
            let id = ScheduleId(edit.id);
            if !panel.open_edit(id) {
                notifier.error(format!("Schedule {} not found", id));
                return Err(RunError::Command);
            }
            if let Some(draft) = panel.draft_mut() {
                apply_edit_to_draft(draft, edit);
            }
            panel.save()?;
            print_schedules(panel.schedules());
        }
        SchedulesCommand::Delete { id, yes } => {
            panel.reload()?;
            let id = ScheduleId(id);
            let Some(schedule) = panel.find(id) else {
                notifier.error(format!("Schedule {} not found", id));
                return Err(RunError::Command);
            };
            let prompt = format!("Delete schedule {} \"{}\"?", id, schedule.name);
            if !yes && !confirm(&prompt)? {
                notifier.info("Cancelled");
                return Ok(());
            }
            panel.delete(id)?;
            print_schedules(panel.schedules());
        }
        SchedulesCommand::Enable { id } => {
            panel.set_enabled(ScheduleId(id), true)?;
            print_schedules(panel.schedules());
        }
        SchedulesCommand::Disable { id } => {
            panel.set_enabled(ScheduleId(id), false)?;
            print_schedules(panel.schedules());
        }
    }
    Ok(())
}

fn fill_draft_from_form(draft: &mut ScheduleDraft, form: ScheduleForm) {
    draft.name = form.name;
    draft.time = form.time;
    draft.days = form.days;
    draft.power = form.power;
    draft.mode = form.mode;
    if let Some(temp) = form.temp_f {
        draft.temperature = Some(temp);
        draft.fahrenheit = true;
    } else if let Some(temp) = form.temp_c {
        draft.temperature = Some(temp);
        draft.fahrenheit = false;
    }
    draft.fan_speed = form.fan;
}

fn apply_edit_to_draft(draft: &mut ScheduleDraft, edit: ScheduleEdit) {
    if let Some(name) = edit.name {
        draft.name = name;
    }
    if let Some(time) = edit.time {
        draft.time = time;
    }
    if edit.every_day {
        draft.days.clear();
    } else if let Some(days) = edit.days {
        draft.days = days;
    }
    if let Some(power) = edit.power {
        draft.power = Some(power);
    }
    if let Some(mode) = edit.mode {
        draft.mode = Some(mode);
    }
    if let Some(temp) = edit.temp_f {
        draft.temperature = Some(temp);
        draft.fahrenheit = true;
    } else if let Some(temp) = edit.temp_c {
        draft.temperature = Some(temp);
        draft.fahrenheit = false;
    }
    if let Some(fan) = edit.fan {
        draft.fan_speed = Some(fan);
    }
}

fn cmd_scheduler(
    cfg: &Config,
    client: &AcClient,
    notifier: &Notifier,
    command: SchedulerCommand,
) -> Result<(), RunError> {
    let mut panel = SchedulePanel::new(client, notifier.clone(), cfg.scheduler_reconcile_delay);
    match command {
        SchedulerCommand::Status => panel.reload_summary()?,
        SchedulerCommand::Start => panel.start_scheduler()?,
        SchedulerCommand::Stop => panel.stop_scheduler()?,
    }
    if let Some(summary) = panel.summary() {
        println!("{}", summary_line(summary));
    }
    Ok(())
}

// Rendering

fn status_line(status: &DeviceStatus) -> String {
    let unit = utils::temp_suffix(status.fahrenheit);
    format!(
        "Power: {} | Mode: {} | Target: {:.0}{} | Indoor: {:.1}{} | Fan: {}",
        if status.running { "ON" } else { "OFF" },
        status.mode.label(),
        status.target_temperature,
        unit,
        status.indoor_temperature,
        unit,
        status.fan_speed.label()
    )
}

fn print_status(status: &DeviceStatus, verbose: bool) {
    if !verbose {
        println!("{}", status_line(status));
        return;
    }
    let unit = utils::temp_suffix(status.fahrenheit);
    println!();
    println!("{:=<50}", "");
    println!("AIR CONDITIONER STATUS");
    println!("{:=<50}", "");
    println!();
    println!("Power:            {}", if status.running { "ON" } else { "OFF" });
    println!("Mode:             {}", status.mode.label());
    println!("Target Temp:      {:.1}{}", status.target_temperature, unit);
    println!("Indoor Temp:      {:.1}{}", status.indoor_temperature, unit);
    println!("Outdoor Temp:     {:.1}{}", status.outdoor_temperature, unit);
    println!("Fan Speed:        {}", status.fan_speed.label());
    println!("Vertical Swing:   {}", on_off(status.vertical_swing));
    println!("Horizontal Swing: {}", on_off(status.horizontal_swing));
    println!("Eco Mode:         {}", on_off(status.eco_mode));
    println!("Turbo Mode:       {}", on_off(status.turbo_mode));
    println!("{:=<50}", "");
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn summary_line(summary: &SchedulerStatus) -> String {
    let state = match (summary.running, summary.pid) {
        (true, Some(pid)) => format!("Running (pid {})", pid),
        (true, None) => "Running".to_string(),
        (false, _) => "Stopped".to_string(),
    };
    format!(
        "Scheduler: {} | Active schedules: {} / {}",
        state, summary.enabled_schedules, summary.total_schedules
    )
}

fn print_schedules(schedules: &[Schedule]) {
    if schedules.is_empty() {
        println!("No schedules yet");
        return;
    }
    println!(
        "{:<5} {:<8} {:<25} {:<10} {:<20}",
        "ID", "Enabled", "Name", "Time", "Days"
    );
    println!("{:=<80}", "");
    for schedule in schedules {
        println!(
            "{:<5} {:<8} {:<25} {:<10} {:<20}",
            schedule.id.0,
            if schedule.enabled { "yes" } else { "no" },
            schedule.name,
            utils::format_time_12h(&schedule.time),
            utils::days_summary(&schedule.days)
        );
        println!("      {}", utils::action_summary(&schedule.action));
        println!("      {}", utils::format_last_run(schedule.last_run.as_ref()));
    }
}

fn confirm(prompt: &str) -> Result<bool, RunError> {
    print!("{} [y/N] ", prompt);
    io::stdout()
        .flush()
        .map_err(|e| RunError::Fatal(e.to_string()))?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| RunError::Fatal(e.to_string()))?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes" | "Yes"))
}

// Environment

/// Load KEY=VALUE pairs from an env file. Values already present in the
/// process environment win. Quoting is minimal: surrounding single or
/// double quotes are stripped, nothing else is interpreted.
fn load_env_file(explicit: Option<&Path>) -> Result<(), String> {
    let path = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(format!("env file not found: {}", path.display()));
            }
            path.to_path_buf()
        }
        None => {
            let default = Path::new(".env");
            if !default.is_file() {
                return Ok(());
            }
            default.to_path_buf()
        }
    };

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let assignment = trimmed
            .strip_prefix("export ")
            .map(str::trim_start)
            .unwrap_or(trimmed);
        let Some((key, value)) = assignment.split_once('=') else {
            return Err(format!(
                "{}:{}: missing '=' in assignment",
                path.display(),
                index + 1
            ));
        };
        let key = key.trim();
        if key.is_empty() || key.chars().any(|c| c.is_whitespace()) {
            return Err(format!(
                "{}:{}: invalid environment variable name",
                path.display(),
                index + 1
            ));
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        if std::env::var_os(key).is_none() {
            // Updating process-level environment variables is unsafe on some
            // targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = load_env_file(cli.env_file.as_deref()) {
        eprintln!("fatal: {}", err);
        std::process::exit(1);
    }

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    info!(
        "ac-console {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );

    match run(cli) {
        Ok(()) => {}
        Err(RunError::Fatal(err)) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        }
        // The failure was already surfaced as a notification.
        Err(RunError::Command) => std::process::exit(1),
    }
}
