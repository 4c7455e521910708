//! Schedule panel: the cached schedule list, CRUD with immediate re-sync,
//! scheduler process control, and the add/edit editor state machine.
//!
//! The list is replaced wholesale on every successful fetch, with no
//! diffing or incremental merge. After a mutation the panel re-fetches the
//! list and the scheduler run-summary; the two are independent backend
//! queries with no atomicity between them.

use chrono::Utc;
use std::thread;
use std::time::Duration;

use crate::client::{AcClient, AcClientError};
use crate::models::api::{
    FanSpeed, Mode, Schedule, ScheduleAction, ScheduleData, ScheduleId, SchedulerStatus, Weekday,
};
use crate::notify::Notifier;
use crate::utils;

/// Working copy of the add/edit form. All action fields are optional until
/// validation; `fahrenheit` qualifies `temperature` and defaults to the
/// backend's display preference.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub name: String,
    pub time: String,
    pub days: Vec<Weekday>,
    pub power: Option<bool>,
    pub mode: Option<Mode>,
    pub temperature: Option<i32>,
    pub fahrenheit: bool,
    pub fan_speed: Option<FanSpeed>,
}

impl Default for ScheduleDraft {
    fn default() -> Self {
        ScheduleDraft {
            name: String::new(),
            time: String::new(),
            days: Vec::new(),
            power: None,
            mode: None,
            temperature: None,
            fahrenheit: true,
            fan_speed: None,
        }
    }
}

impl ScheduleDraft {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        ScheduleDraft {
            name: schedule.name.clone(),
            time: schedule.time.clone(),
            days: schedule.days.clone(),
            power: schedule.action.power,
            mode: schedule.action.mode,
            temperature: schedule.action.temperature,
            fahrenheit: schedule.action.fahrenheit.unwrap_or(true),
            fan_speed: schedule.action.fan_speed,
        }
    }

    fn action(&self) -> ScheduleAction {
        ScheduleAction {
            power: self.power,
            mode: self.mode,
            temperature: self.temperature,
            fahrenheit: self.temperature.map(|_| self.fahrenheit),
            fan_speed: self.fan_speed,
        }
    }

    /// Pre-flight form validation; an invalid draft is never sent.
    pub fn validate(&self) -> Result<ScheduleData, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }
        let time = self.time.trim();
        if time.is_empty() {
            return Err(DraftError::MissingTime);
        }
        if utils::parse_time_of_day(time).is_none() {
            return Err(DraftError::InvalidTime(time.to_string()));
        }
        let action = self.action();
        if action.is_empty() {
            return Err(DraftError::EmptyAction);
        }
        Ok(ScheduleData {
            name: name.to_string(),
            time: time.to_string(),
            days: self.days.clone(),
            action,
            created_at: None,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DraftError {
    EmptyName,
    MissingTime,
    InvalidTime(String),
    EmptyAction,
}

impl core::fmt::Display for DraftError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DraftError::EmptyName => f.write_str("Please enter a schedule name"),
            DraftError::MissingTime => f.write_str("Please select a time"),
            DraftError::InvalidTime(t) => {
                write!(f, "Invalid time `{}`: expected 24-hour HH:MM", t)
            }
            DraftError::EmptyAction => f.write_str("Please specify at least one action"),
        }
    }
}

impl std::error::Error for DraftError {}

#[derive(Debug)]
pub enum SaveError {
    /// `save` called with the editor closed.
    Closed,
    Invalid(DraftError),
    Api(AcClientError),
}

impl core::fmt::Display for SaveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SaveError::Closed => f.write_str("no schedule form is open"),
            SaveError::Invalid(e) => write!(f, "{}", e),
            SaveError::Api(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SaveError {}

/// The editor is the only explicit state machine in the client: closed, or
/// open in add/edit mode. It returns to `Closed` on cancel or successful
/// save; a failed save leaves it open with the draft intact.
#[derive(Debug, Clone, PartialEq)]
pub enum Editor {
    Closed,
    Open {
        editing: Option<ScheduleId>,
        draft: ScheduleDraft,
    },
}

pub struct SchedulePanel<'a> {
    client: &'a AcClient,
    notifier: Notifier,
    schedules: Vec<Schedule>,
    summary: Option<SchedulerStatus>,
    editor: Editor,
    reconcile_delay: Duration,
}

impl<'a> SchedulePanel<'a> {
    pub fn new(client: &'a AcClient, notifier: Notifier, reconcile_delay: Duration) -> Self {
        SchedulePanel {
            client,
            notifier,
            schedules: Vec::new(),
            summary: None,
            editor: Editor::Closed,
            reconcile_delay,
        }
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn summary(&self) -> Option<&SchedulerStatus> {
        self.summary.as_ref()
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn find(&self, id: ScheduleId) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    /// Replace the cached list wholesale.
    pub fn reload(&mut self) -> Result<(), AcClientError> {
        self.schedules = self.client.list_schedules()?;
        Ok(())
    }

    pub fn reload_summary(&mut self) -> Result<(), AcClientError> {
        self.summary = Some(self.client.scheduler_status()?);
        Ok(())
    }

    /// Partial enable/disable update. The displayed flag has already flipped
    /// by the time this runs, so a failure restores server truth by
    /// re-fetching the list instead of undoing locally.
    pub fn set_enabled(&mut self, id: ScheduleId, enabled: bool) -> Result<(), AcClientError> {
        match self.client.set_schedule_enabled(id, enabled) {
            Ok(_) => {
                self.notifier.success(format!(
                    "Schedule {}",
                    if enabled { "enabled" } else { "disabled" }
                ));
                let _ = self.reload();
                let _ = self.reload_summary();
                Ok(())
            }
            Err(e) => {
                let _ = self.reload();
                Err(e)
            }
        }
    }

    /// Destructive and not undoable; callers confirm with the user first.
    pub fn delete(&mut self, id: ScheduleId) -> Result<(), AcClientError> {
        self.client.delete_schedule(id)?;
        self.notifier.success("Schedule deleted");
        let _ = self.reload();
        let _ = self.reload_summary();
        Ok(())
    }

    // Editor state machine

    /// `Closed → Open(add)`: all fields cleared.
    pub fn open_add(&mut self) {
        self.editor = Editor::Open {
            editing: None,
            draft: ScheduleDraft::default(),
        };
    }

    /// `Closed → Open(edit, id)`: every field pre-populated from the cached
    /// record. Returns false (state unchanged) for an unknown id.
    pub fn open_edit(&mut self, id: ScheduleId) -> bool {
        match self.find(id) {
            Some(schedule) => {
                self.editor = Editor::Open {
                    editing: Some(id),
                    draft: ScheduleDraft::from_schedule(schedule),
                };
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editor = Editor::Closed;
    }

    pub fn draft_mut(&mut self) -> Option<&mut ScheduleDraft> {
        match &mut self.editor {
            Editor::Open { draft, .. } => Some(draft),
            Editor::Closed => None,
        }
    }

    /// Validate and submit the open draft. Only a successful save closes the
    /// editor; local rejections are notified and never reach the network.
    pub fn save(&mut self) -> Result<(), SaveError> {
        let (editing, draft) = match &self.editor {
            Editor::Open { editing, draft } => (*editing, draft.clone()),
            Editor::Closed => return Err(SaveError::Closed),
        };

        let mut data = match draft.validate() {
            Ok(data) => data,
            Err(e) => {
                self.notifier.error(e.to_string());
                return Err(SaveError::Invalid(e));
            }
        };

        let result = match editing {
            Some(id) => self
                .client
                .update_schedule(id, &data)
                .map(|_| "Schedule updated"),
            None => {
                data.created_at = Some(Utc::now().naive_utc());
                self.client.create_schedule(&data).map(|_| "Schedule created")
            }
        };

        match result {
            Ok(message) => {
                self.notifier.success(message);
                self.editor = Editor::Closed;
                let _ = self.reload();
                let _ = self.reload_summary();
                Ok(())
            }
            Err(e) => Err(SaveError::Api(e)),
        }
    }

    // Scheduler process control

    pub fn start_scheduler(&mut self) -> Result<(), AcClientError> {
        self.scheduler_command(true)
    }

    pub fn stop_scheduler(&mut self) -> Result<(), AcClientError> {
        self.scheduler_command(false)
    }

    /// Fire-and-poll: the scheduler takes a moment to settle before its
    /// status endpoint reflects the change.
    fn scheduler_command(&mut self, start: bool) -> Result<(), AcClientError> {
        if start {
            self.client.start_scheduler()?;
        } else {
            self.client.stop_scheduler()?;
        }
        self.notifier.success(if start {
            "Scheduler started"
        } else {
            "Scheduler stopped"
        });
        if !self.reconcile_delay.is_zero() {
            thread::sleep(self.reconcile_delay);
        }
        let _ = self.reload_summary();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::testutil::stub_server;

    const RECONCILE_NOW: Duration = Duration::ZERO;

    fn list_body(first_enabled: bool) -> String {
        format!(
            r#"{{"success": true, "data": [
                {{"id": 1, "name": "Morning Warmup", "time": "07:00",
                  "days": ["mon", "tue"], "action": {{"power": true, "mode": "heat"}},
                  "enabled": {first_enabled}}},
                {{"id": 2, "name": "Night Cool", "time": "22:30", "days": [],
                  "action": {{"fan_speed": 60}}, "enabled": true}}
            ]}}"#
        )
    }

    fn summary_body(running: bool, enabled: u32) -> String {
        format!(
            r#"{{"success": true, "data": {{"running": {running}, "pid": 4242,
                "enabled_schedules": {enabled}, "total_schedules": 2}}}}"#
        )
    }

    fn schedule_body() -> String {
        r#"{"success": true, "data": {"id": 1, "name": "Morning Warmup",
            "time": "07:00", "days": [], "action": {"power": true},
            "enabled": true}}"#
            .to_string()
    }

    fn failure(msg: &str) -> String {
        format!(r#"{{"success": false, "error": "{msg}"}}"#)
    }

    fn panel_with<'a>(client: &'a AcClient, notifier: &Notifier) -> SchedulePanel<'a> {
        SchedulePanel::new(client, notifier.clone(), RECONCILE_NOW)
    }

    fn client_for(base_url: &str) -> (AcClient, Notifier) {
        let notifier = Notifier::new(Duration::from_secs(60));
        let client = AcClient::new(base_url, Duration::from_secs(5), notifier.clone());
        (client, notifier)
    }

    #[test]
    fn drafts_reject_missing_fields_locally() {
        let mut draft = ScheduleDraft::default();
        assert_eq!(draft.validate().unwrap_err(), DraftError::EmptyName);

        draft.name = "Morning".to_string();
        assert_eq!(draft.validate().unwrap_err(), DraftError::MissingTime);

        draft.time = "7 am".to_string();
        assert!(matches!(
            draft.validate().unwrap_err(),
            DraftError::InvalidTime(_)
        ));

        draft.time = "07:00".to_string();
        assert_eq!(draft.validate().unwrap_err(), DraftError::EmptyAction);

        draft.power = Some(true);
        let data = draft.validate().expect("valid draft");
        assert_eq!(data.action.power, Some(true));
        assert_eq!(data.created_at, None);
    }

    #[test]
    fn unit_flag_alone_does_not_make_an_action() {
        let draft = ScheduleDraft {
            name: "Temp only".to_string(),
            time: "08:00".to_string(),
            // fahrenheit is set but temperature is not
            ..ScheduleDraft::default()
        };
        assert_eq!(draft.validate().unwrap_err(), DraftError::EmptyAction);
    }

    #[test]
    fn invalid_draft_never_reaches_the_network() {
        // Nothing listens on this port; a request would fail loudly.
        let (client, notifier) = client_for("http://127.0.0.1:9");
        let mut panel = panel_with(&client, &notifier);

        panel.open_add();
        let err = panel.save().expect_err("invalid draft");
        assert!(matches!(err, SaveError::Invalid(DraftError::EmptyName)));
        assert_eq!(
            notifier.messages(Level::Error),
            vec!["Please enter a schedule name".to_string()]
        );
        // the editor stays open for correction
        assert!(matches!(panel.editor(), Editor::Open { editing: None, .. }));
    }

    #[test]
    fn failed_toggle_restores_server_truth() {
        let server = stub_server(vec![
            (200, list_body(true)),
            (500, failure("schedules file locked")),
            (200, list_body(true)),
        ]);
        let (client, notifier) = client_for(server.base_url());
        let mut panel = panel_with(&client, &notifier);

        panel.reload().expect("reload");
        panel
            .set_enabled(ScheduleId(1), false)
            .expect_err("toggle fails");

        // the cached list reflects the re-fetch, not the optimistic flip
        assert!(panel.find(ScheduleId(1)).expect("schedule 1").enabled);
        assert!(notifier.messages(Level::Success).is_empty());

        let recorded = server.finish();
        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[1].method, "PUT");
        assert_eq!(recorded[1].path, "/schedules/1");
    }

    #[test]
    fn successful_toggle_resyncs_list_and_summary() {
        let server = stub_server(vec![
            (200, list_body(true)),
            (200, schedule_body()),
            (200, list_body(false)),
            (200, summary_body(true, 1)),
        ]);
        let (client, notifier) = client_for(server.base_url());
        let mut panel = panel_with(&client, &notifier);

        panel.reload().expect("reload");
        panel.set_enabled(ScheduleId(1), false).expect("toggle");

        assert!(!panel.find(ScheduleId(1)).expect("schedule 1").enabled);
        assert_eq!(panel.summary().expect("summary").enabled_schedules, 1);
        assert_eq!(
            notifier.messages(Level::Success),
            vec!["Schedule disabled".to_string()]
        );
        server.finish();
    }

    #[test]
    fn edit_prefills_and_cancel_closes() {
        let server = stub_server(vec![(200, list_body(true))]);
        let (client, notifier) = client_for(server.base_url());
        let mut panel = panel_with(&client, &notifier);
        panel.reload().expect("reload");

        assert!(!panel.open_edit(ScheduleId(99)));
        assert_eq!(*panel.editor(), Editor::Closed);

        assert!(panel.open_edit(ScheduleId(1)));
        match panel.editor() {
            Editor::Open { editing, draft } => {
                assert_eq!(*editing, Some(ScheduleId(1)));
                assert_eq!(draft.name, "Morning Warmup");
                assert_eq!(draft.time, "07:00");
                assert_eq!(draft.days, vec![Weekday::Mon, Weekday::Tue]);
                assert_eq!(draft.power, Some(true));
                assert_eq!(draft.mode, Some(Mode::Heat));
            }
            Editor::Closed => panic!("editor should be open"),
        }

        panel.cancel_edit();
        assert_eq!(*panel.editor(), Editor::Closed);

        // add mode starts from cleared fields
        panel.open_add();
        match panel.editor() {
            Editor::Open { editing, draft } => {
                assert_eq!(*editing, None);
                assert_eq!(*draft, ScheduleDraft::default());
            }
            Editor::Closed => panic!("editor should be open"),
        }
        server.finish();
    }

    #[test]
    fn successful_save_closes_editor_and_resyncs() {
        let server = stub_server(vec![
            (200, schedule_body()),
            (200, list_body(true)),
            (200, summary_body(false, 2)),
        ]);
        let (client, notifier) = client_for(server.base_url());
        let mut panel = panel_with(&client, &notifier);

        panel.open_add();
        {
            let draft = panel.draft_mut().expect("open draft");
            draft.name = "Morning Warmup".to_string();
            draft.time = "07:00".to_string();
            draft.power = Some(true);
        }
        panel.save().expect("save");

        assert_eq!(*panel.editor(), Editor::Closed);
        assert_eq!(panel.schedules().len(), 2);
        assert_eq!(
            notifier.messages(Level::Success),
            vec!["Schedule created".to_string()]
        );

        let recorded = server.finish();
        assert_eq!(recorded[0].method, "POST");
        assert_eq!(recorded[0].path, "/schedules");
        // creation stamps created_at; the partial toggle payload never does
        assert!(recorded[0].body.contains("created_at"));
    }

    #[test]
    fn failed_save_keeps_the_editor_open() {
        let server = stub_server(vec![(500, failure("disk full"))]);
        let (client, notifier) = client_for(server.base_url());
        let mut panel = panel_with(&client, &notifier);

        panel.open_add();
        {
            let draft = panel.draft_mut().expect("open draft");
            draft.name = "Night Cool".to_string();
            draft.time = "22:30".to_string();
            draft.fan_speed = Some(FanSpeed::Medium);
        }
        let err = panel.save().expect_err("save fails");
        assert!(matches!(err, SaveError::Api(_)));
        assert!(matches!(panel.editor(), Editor::Open { .. }));
        server.finish();
    }

    #[test]
    fn scheduler_start_notifies_then_polls_status() {
        let server = stub_server(vec![
            (200, r#"{"success": true, "message": "Scheduler started"}"#.to_string()),
            (200, summary_body(true, 2)),
        ]);
        let (client, notifier) = client_for(server.base_url());
        let mut panel = panel_with(&client, &notifier);

        panel.start_scheduler().expect("start");
        assert!(panel.summary().expect("summary").running);
        assert_eq!(panel.summary().expect("summary").pid, Some(4242));
        assert_eq!(
            notifier.messages(Level::Success),
            vec!["Scheduler started".to_string()]
        );

        let recorded = server.finish();
        assert_eq!(recorded[0].path, "/scheduler/start");
        assert_eq!(recorded[1].path, "/scheduler/status");
    }
}
