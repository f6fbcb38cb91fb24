// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Keeping a beam on a moving target.
//!
//! The target is resolved once; its position is then re-evaluated every
//! update interval and the beam re-pointed. Each pointing is computed for the
//! middle of the interval it is used for.


use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crossbeam_utils::atomic::AtomicCell;
use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    constants::{DEFAULT_TRACKING_DURATION, DEFAULT_UPDATE_INTERVAL, TRACKING_SLEEP_INCREMENT},
    control::BeamController,
    coord::{epoch_now, ResolveError, Target},
    delays::PointingDirection,
};

/// Stops a tracking loop from another thread. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicCell<bool>>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Idle,
    Tracking,
}

/// What a tracking run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackingSummary {
    /// The number of times the beam was pointed.
    pub updates: usize,

    /// The number of updates skipped because the target was not above the
    /// horizon.
    pub skipped: usize,

    /// Did the run end early?
    pub cancelled: bool,
}

pub struct TrackingScheduler<'a> {
    controller: &'a BeamController,
    update_interval: Duration,
    state: AtomicCell<TrackingState>,
}

impl<'a> TrackingScheduler<'a> {
    /// A zero `update_interval` means the default.
    pub fn new(controller: &'a BeamController, update_interval: Duration) -> TrackingScheduler<'a> {
        let update_interval = if update_interval.is_zero() {
            DEFAULT_UPDATE_INTERVAL
        } else {
            update_interval
        };
        TrackingScheduler {
            controller,
            update_interval,
            state: AtomicCell::new(TrackingState::Idle),
        }
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn state(&self) -> TrackingState {
        self.state.load()
    }

    /// Follow `target` for `duration` (the default tracking duration if
    /// zero), re-pointing every update interval until the time is up or
    /// `cancel` is triggered. Only one run may be active at a time.
    pub fn track(
        &self,
        target: &Target,
        duration: Duration,
        cancel: &CancelToken,
    ) -> Result<TrackingSummary, TrackingError> {
        let ephemeris = self.controller.resolver().ephemeris(target)?;
        let duration = if duration.is_zero() {
            DEFAULT_TRACKING_DURATION
        } else {
            duration
        };
        let lookahead = duration.min(self.update_interval) / 2;
        let lookahead = hifitime::Duration::from_seconds(lookahead.as_secs_f64());

        self.state
            .compare_exchange(TrackingState::Idle, TrackingState::Tracking)
            .map_err(|_| TrackingError::AlreadyTracking)?;
        info!(
            "Tracking {target} with beam {} for {:.1} s, updating every {:.1} s",
            self.controller.beam(),
            duration.as_secs_f64(),
            self.update_interval.as_secs_f64()
        );

        let observer = &self.controller.station().location;
        let start = Instant::now();
        // `None` if the stop time is too far away to represent.
        let deadline = start.checked_add(duration);
        let mut summary = TrackingSummary::default();
        let mut iteration: u64 = 0;
        let mut offset = Duration::ZERO;
        loop {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let azel = ephemeris.azalt(epoch_now() + lookahead, observer);
            match PointingDirection::from_azel(azel) {
                Ok(dir) => {
                    debug!("Update {iteration}: pointing at {dir}");
                    let report = self.controller.point_direction(dir);
                    if !report.is_complete() {
                        warn!(
                            "{} pipelines missed tracking update {iteration}",
                            report.failed.len()
                        );
                    }
                    summary.updates += 1;
                }
                Err(e) => {
                    warn!("Skipping tracking update {iteration} for {target}: {e}");
                    summary.skipped += 1;
                }
            }

            // Updates are scheduled from the start, so slow updates don't
            // accumulate drift. The last sleep runs out the clock.
            iteration += 1;
            offset = offset.saturating_add(self.update_interval);
            let (until, last) = match (start.checked_add(offset), deadline) {
                (Some(next), Some(deadline)) if next < deadline => (next, false),
                (Some(next), None) => (next, false),
                (_, Some(deadline)) => (deadline, true),
                (None, None) => break,
            };
            if !sleep_until(until, cancel) {
                summary.cancelled = true;
                break;
            }
            if last {
                break;
            }
        }

        self.state.store(TrackingState::Idle);
        info!(
            "Finished tracking {target}: {} updates, {} skipped{}",
            summary.updates,
            summary.skipped,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        Ok(summary)
    }
}

/// Sleep until `until` in small steps. Returns `false` if cancelled first.
fn sleep_until(until: Instant, cancel: &CancelToken) -> bool {
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        let now = Instant::now();
        if now >= until {
            return true;
        }
        thread::sleep((until - now).min(TRACKING_SLEEP_INCREMENT));
    }
}

#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("A target is already being tracked")]
    AlreadyTracking,

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
