//! HTTP client for the AC control backend.
//!
//! - Blocking client using `ureq` (no async).
//! - Single chokepoint for all backend communication: every call goes
//!   through the `{success, data, error}` envelope unwrap here, and every
//!   failure (transport, non-2xx, parse, or an explicit `success:false`)
//!   is posted to the shared [`Notifier`] before it propagates.
//! - The backend keeps the envelope on 4xx/5xx responses, so error bodies
//!   are parsed for a message before falling back to the bare status code.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use crate::models::api::{
    ControlRequest, DeviceStatus, Envelope, FanSpeed, Mode, Schedule, ScheduleData, ScheduleId,
    SchedulerStatus, SwingAxis,
};
use crate::notify::Notifier;

#[derive(Debug)]
pub enum AcClientError {
    Transport(String),
    Http { status: u16, message: String },
    Json(String),
    /// `success:false` envelope; carries the backend's own message.
    Backend(String),
}

impl core::fmt::Display for AcClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AcClientError::Transport(s) => write!(f, "transport error: {}", s),
            AcClientError::Http { status, message } => write!(f, "http {}: {}", status, message),
            AcClientError::Json(e) => write!(f, "invalid response: {}", e),
            AcClientError::Backend(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for AcClientError {}

pub struct AcClient {
    agent: ureq::Agent,
    base_url: String,
    notifier: Notifier,
}

impl AcClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, notifier: Notifier) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        AcClient {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            notifier,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// GET/POST/PUT/DELETE returning the envelope's `data` payload.
    fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, AcClientError> {
        self.notify_on_error(|| {
            let envelope = self.call_raw::<T>(method, path, body)?;
            self.check(path, envelope)?
                .ok_or_else(|| AcClientError::Json(format!("{}: missing data in response", path)))
        })
    }

    /// Same, for acknowledgement-only endpoints (no `data`).
    fn execute(&self, method: &str, path: &str, body: Option<Value>) -> Result<(), AcClientError> {
        self.notify_on_error(|| {
            let envelope = self.call_raw::<Value>(method, path, body)?;
            self.check(path, envelope)?;
            Ok(())
        })
    }

    fn notify_on_error<T>(
        &self,
        op: impl FnOnce() -> Result<T, AcClientError>,
    ) -> Result<T, AcClientError> {
        match op() {
            Ok(value) => Ok(value),
            Err(e) => {
                self.notifier.error(e.to_string());
                Err(e)
            }
        }
    }

    fn call_raw<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> Result<Envelope<T>, AcClientError> {
        let url = self.url(path);
        let request = self.agent.request(method, &url).set("Accept", "application/json");
        let response = match body {
            Some(payload) => request.send_json(payload),
            None => request.call(),
        };
        match response {
            Ok(resp) => Self::parse_envelope(resp),
            // Error bodies still carry the envelope; prefer its message.
            Err(ureq::Error::Status(status, resp)) => match Self::parse_envelope(resp) {
                Ok(envelope) => Ok(envelope),
                Err(_) => Err(AcClientError::Http {
                    status,
                    message: "request failed".to_string(),
                }),
            },
            Err(ureq::Error::Transport(t)) => Err(AcClientError::Transport(t.to_string())),
        }
    }

    fn parse_envelope<T: DeserializeOwned>(
        resp: ureq::Response,
    ) -> Result<Envelope<T>, AcClientError> {
        let mut de = serde_json::Deserializer::from_reader(resp.into_reader());
        serde_path_to_error::deserialize(&mut de).map_err(|e| AcClientError::Json(e.to_string()))
    }

    fn check<T>(&self, path: &str, envelope: Envelope<T>) -> Result<Option<T>, AcClientError> {
        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(AcClientError::Backend(message));
        }
        if let Some(message) = &envelope.message {
            log::debug!("{}: {}", path, message);
        }
        Ok(envelope.data)
    }

    // Device control

    pub fn get_status(&self) -> Result<DeviceStatus, AcClientError> {
        self.request("GET", "/status", None)
    }

    pub fn set_power(&self, on: bool) -> Result<(), AcClientError> {
        self.execute("POST", "/power", Some(json!({ "on": on })))
    }

    pub fn set_mode(&self, mode: Mode) -> Result<(), AcClientError> {
        self.execute("POST", "/mode", Some(json!({ "mode": mode })))
    }

    pub fn set_temperature(&self, temperature: i32, fahrenheit: bool) -> Result<(), AcClientError> {
        self.execute(
            "POST",
            "/temperature",
            Some(json!({ "temperature": temperature, "fahrenheit": fahrenheit })),
        )
    }

    pub fn set_fan_speed(&self, speed: FanSpeed) -> Result<(), AcClientError> {
        self.execute("POST", "/fan", Some(json!({ "speed": speed })))
    }

    /// The payload names only the chosen axis; the other is left untouched.
    pub fn set_swing(&self, axis: SwingAxis, on: bool) -> Result<(), AcClientError> {
        let body = match axis {
            SwingAxis::Vertical => json!({ "vertical": on }),
            SwingAxis::Horizontal => json!({ "horizontal": on }),
        };
        self.execute("POST", "/swing", Some(body))
    }

    /// Combined multi-field setter (`POST /control`).
    pub fn apply_control(&self, request: &ControlRequest) -> Result<(), AcClientError> {
        let body =
            serde_json::to_value(request).map_err(|e| AcClientError::Json(e.to_string()))?;
        self.execute("POST", "/control", Some(body))
    }

    // Schedules

    pub fn list_schedules(&self) -> Result<Vec<Schedule>, AcClientError> {
        self.request("GET", "/schedules", None)
    }

    pub fn create_schedule(&self, data: &ScheduleData) -> Result<Schedule, AcClientError> {
        let body = serde_json::to_value(data).map_err(|e| AcClientError::Json(e.to_string()))?;
        self.request("POST", "/schedules", Some(body))
    }

    pub fn update_schedule(
        &self,
        id: ScheduleId,
        data: &ScheduleData,
    ) -> Result<Schedule, AcClientError> {
        let body = serde_json::to_value(data).map_err(|e| AcClientError::Json(e.to_string()))?;
        self.request("PUT", &format!("/schedules/{}", id), Some(body))
    }

    /// Partial update used by the enable/disable toggle.
    pub fn set_schedule_enabled(
        &self,
        id: ScheduleId,
        enabled: bool,
    ) -> Result<Schedule, AcClientError> {
        self.request(
            "PUT",
            &format!("/schedules/{}", id),
            Some(json!({ "enabled": enabled })),
        )
    }

    pub fn delete_schedule(&self, id: ScheduleId) -> Result<(), AcClientError> {
        self.execute("DELETE", &format!("/schedules/{}", id), None)
    }

    // Scheduler process

    pub fn scheduler_status(&self) -> Result<SchedulerStatus, AcClientError> {
        self.request("GET", "/scheduler/status", None)
    }

    pub fn start_scheduler(&self) -> Result<(), AcClientError> {
        self.execute("POST", "/scheduler/start", None)
    }

    pub fn stop_scheduler(&self) -> Result<(), AcClientError> {
        self.execute("POST", "/scheduler/stop", None)
    }
}
