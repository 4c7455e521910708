//! Device panel: cached status snapshot, command dispatch, and the
//! optimistic-update / reconciliation cycle.
//!
//! Every command is a two-phase operation: issue the mutation, and on
//! acceptance post a success notification immediately, then pull the
//! authoritative snapshot after a bounded delay and replace the cache
//! wholesale. The backend applies device writes asynchronously relative to
//! its HTTP response, so the redraw is best-effort; the next poll corrects
//! anything the delay missed.

use chrono::{DateTime, Local};
use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use crate::client::{AcClient, AcClientError};
use crate::models::api::{ControlRequest, DeviceStatus, FanSpeed, Mode, SwingAxis};
use crate::notify::Notifier;
use crate::utils;

pub struct DevicePanel<'a> {
    client: &'a AcClient,
    notifier: Notifier,
    status: Option<DeviceStatus>,
    /// The in-progress (unsent) target temperature mirroring the snapshot;
    /// adjusted locally and only sent on submit.
    temp_input: Option<i32>,
    connected: bool,
    last_update: Option<DateTime<Local>>,
    reconcile_delay: Duration,
}

impl<'a> DevicePanel<'a> {
    pub fn new(client: &'a AcClient, notifier: Notifier, reconcile_delay: Duration) -> Self {
        DevicePanel {
            client,
            notifier,
            status: None,
            temp_input: None,
            connected: false,
            last_update: None,
            reconcile_delay,
        }
    }

    pub fn status(&self) -> Option<&DeviceStatus> {
        self.status.as_ref()
    }

    pub fn temp_input(&self) -> Option<i32> {
        self.temp_input
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    /// Display unit of the cached snapshot; Fahrenheit before the first
    /// fetch (the backend's default display preference).
    pub fn fahrenheit(&self) -> bool {
        self.status.as_ref().map(|s| s.fahrenheit).unwrap_or(true)
    }

    pub fn temp_bounds(&self) -> RangeInclusive<i32> {
        utils::temp_bounds(self.fahrenheit())
    }

    pub fn temp_suffix(&self) -> &'static str {
        utils::temp_suffix(self.fahrenheit())
    }

    /// Fetch the authoritative snapshot and replace the cache wholesale.
    pub fn refresh(&mut self) -> Result<(), AcClientError> {
        match self.client.get_status() {
            Ok(status) => {
                self.replace_status(status);
                self.connected = true;
                self.last_update = Some(Local::now());
                Ok(())
            }
            Err(e) => {
                self.connected = false;
                Err(e)
            }
        }
    }

    fn replace_status(&mut self, status: DeviceStatus) {
        self.temp_input = Some(status.target_temperature.round() as i32);
        self.status = Some(status);
    }

    /// Nudge the pending temperature; results outside the active unit's
    /// bounds are silently dropped.
    pub fn adjust_temp(&mut self, delta: i32) {
        let Some(current) = self.temp_input else {
            return;
        };
        let next = current + delta;
        if self.temp_bounds().contains(&next) {
            self.temp_input = Some(next);
        }
    }

    /// Replace the pending temperature; returns false (input unchanged) when
    /// the value is out of bounds.
    pub fn set_temp_input(&mut self, value: i32) -> bool {
        if self.temp_bounds().contains(&value) {
            self.temp_input = Some(value);
            true
        } else {
            false
        }
    }

    // Commands

    pub fn set_power(&mut self, on: bool) -> Result<(), AcClientError> {
        self.client.set_power(on)?;
        self.notifier
            .success(format!("AC turned {}", if on { "on" } else { "off" }));
        self.reconcile();
        Ok(())
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), AcClientError> {
        self.client.set_mode(mode)?;
        self.notifier.success(format!("Mode set to {}", mode.as_str()));
        self.reconcile();
        Ok(())
    }

    /// Send the pending temperature in the active unit.
    pub fn submit_temp_input(&mut self) -> Result<(), AcClientError> {
        match self.temp_input {
            Some(value) => self.set_temperature_in(value, self.fahrenheit()),
            None => Ok(()),
        }
    }

    pub fn set_temperature_in(
        &mut self,
        temperature: i32,
        fahrenheit: bool,
    ) -> Result<(), AcClientError> {
        self.client.set_temperature(temperature, fahrenheit)?;
        self.notifier.success(format!(
            "Temperature set to {}{}",
            temperature,
            utils::temp_suffix(fahrenheit)
        ));
        self.reconcile();
        Ok(())
    }

    pub fn set_fan_speed(&mut self, speed: FanSpeed) -> Result<(), AcClientError> {
        self.client.set_fan_speed(speed)?;
        self.notifier
            .success(format!("Fan speed set to {}", speed.label()));
        self.reconcile();
        Ok(())
    }

    /// The swing flag flips in the cache before the backend confirms, like a
    /// toggle control does on click; a rejected command restores the
    /// pre-command value explicitly.
    pub fn set_swing(&mut self, axis: SwingAxis, on: bool) -> Result<(), AcClientError> {
        let previous = self.swing_flag(axis);
        self.apply_swing_flag(axis, on);
        if let Err(e) = self.client.set_swing(axis, on) {
            if let Some(value) = previous {
                self.apply_swing_flag(axis, value);
            }
            return Err(e);
        }
        self.notifier.success(format!(
            "{} swing {}",
            axis.label(),
            if on { "enabled" } else { "disabled" }
        ));
        self.reconcile();
        Ok(())
    }

    /// Combined multi-field update (`POST /control`).
    pub fn apply_settings(&mut self, request: &ControlRequest) -> Result<(), AcClientError> {
        self.client.apply_control(request)?;
        self.notifier.success("Settings updated");
        self.reconcile();
        Ok(())
    }

    fn swing_flag(&self, axis: SwingAxis) -> Option<bool> {
        self.status.as_ref().map(|s| match axis {
            SwingAxis::Vertical => s.vertical_swing,
            SwingAxis::Horizontal => s.horizontal_swing,
        })
    }

    fn apply_swing_flag(&mut self, axis: SwingAxis, value: bool) {
        if let Some(status) = self.status.as_mut() {
            match axis {
                SwingAxis::Vertical => status.vertical_swing = value,
                SwingAxis::Horizontal => status.horizontal_swing = value,
            }
        }
    }

    /// Second phase of every command: wait out the backend's apply window,
    /// then pull the authoritative snapshot. Failures here only surface a
    /// notification; the next poll self-corrects.
    fn reconcile(&mut self) {
        if !self.reconcile_delay.is_zero() {
            thread::sleep(self.reconcile_delay);
        }
        let _ = self.refresh();
    }
}
