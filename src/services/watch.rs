//! Status poll loop for watch mode.
//!
//! A single repeating fetch on a steady cadence. Polling is suspended while
//! the shared [`Visibility`] handle reports the panel hidden and resumes
//! with an immediate out-of-band fetch once it returns. This only saves
//! backend round-trips; correctness always comes from the next poll.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::services::device::DevicePanel;

const RESUME_CHECK: Duration = Duration::from_millis(200);

#[derive(Clone, Default)]
pub struct Visibility {
    hidden: Arc<AtomicBool>,
}

impl Visibility {
    pub fn new() -> Self {
        Visibility::default()
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::Relaxed);
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Relaxed)
    }
}

/// Poll forever. Fetch failures are already surfaced as notifications by
/// the client; the loop keeps its cadence regardless.
pub fn run_loop(
    panel: &mut DevicePanel<'_>,
    visibility: &Visibility,
    interval: Duration,
    mut render: impl FnMut(&DevicePanel<'_>),
) -> ! {
    loop {
        let tick_start = Instant::now();

        let _ = panel.refresh();
        render(panel);

        // Maintain steady cadence
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }

        if visibility.is_hidden() {
            while visibility.is_hidden() {
                thread::sleep(RESUME_CHECK);
            }
            // visibility returned: fall through to an immediate fetch, which
            // also restarts the cadence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_flag_round_trips() {
        let visibility = Visibility::new();
        assert!(!visibility.is_hidden());
        visibility.set_hidden(true);
        assert!(visibility.is_hidden());
        visibility.set_hidden(false);
        assert!(!visibility.is_hidden());
    }

    #[test]
    fn visibility_clones_share_state() {
        let visibility = Visibility::new();
        let handle = visibility.clone();
        handle.set_hidden(true);
        assert!(visibility.is_hidden());
    }
}
