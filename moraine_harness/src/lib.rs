// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic frame driving, test doubles, and refresh metrics for
//! moraine tests and demos.
//!
//! [`FrameDriver`] stands in for a host's frame loop with a manual clock, so
//! interval-boundary scenarios can be scripted tick by tick. The doubles
//! ([`RecordingTarget`], [`RefreshStats`]) observe what the primitives did
//! without a real renderer. The end-to-end behavior of the session — request
//! coalescing, re-entrant scheduling, recache pacing, the refresh error
//! boundary — is tested here against these doubles.

#![no_std]

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Rect;

use moraine_core::defer::RefreshError;
use moraine_core::grid::OverlayPos;
use moraine_core::host::{FrameTick, OverlayTarget};
use moraine_core::time::{Duration, HostTime};
use moraine_core::trace::{RefreshRunEvent, TraceSink};

/// A scripted frame-loop clock.
///
/// Yields one [`FrameTick`] per [`next_tick`](Self::next_tick) call, pacing
/// `now` by a fixed frame interval. [`advance_to`](Self::advance_to) and
/// [`advance_by`](Self::advance_by) override the pacing for scenarios that
/// need frames at exact times.
#[derive(Clone, Debug)]
pub struct FrameDriver {
    now: HostTime,
    frame_interval: Duration,
    frame_index: u64,
}

impl FrameDriver {
    /// Creates a driver starting at `start`, pacing frames by
    /// `frame_interval`.
    #[must_use]
    pub const fn new(start: HostTime, frame_interval: Duration) -> Self {
        Self {
            now: start,
            frame_interval,
            frame_index: 0,
        }
    }

    /// Returns the tick for the current time, then paces the clock forward
    /// by one frame interval.
    pub fn next_tick(&mut self) -> FrameTick {
        let tick = FrameTick {
            now: self.now,
            frame_index: self.frame_index,
        };
        self.frame_index += 1;
        self.now = self.now.checked_add(self.frame_interval).unwrap_or(self.now);
        tick
    }

    /// Moves the clock to `now`. Does not move backwards.
    pub fn advance_to(&mut self, now: HostTime) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Moves the clock forward by `duration`.
    pub fn advance_by(&mut self, duration: Duration) {
        self.now = self.now.checked_add(duration).unwrap_or(self.now);
    }

    /// Returns the time the next tick will carry.
    #[must_use]
    pub const fn now(&self) -> HostTime {
        self.now
    }
}

/// An [`OverlayTarget`] that records drawn quads into a shared log.
///
/// Clones share the log, so a copy handed to a highlighter via
/// [`set_target`](moraine_core::highlight::CellHighlighter::set_target) can
/// still be inspected from the test.
#[derive(Clone, Debug, Default)]
pub struct RecordingTarget {
    log: Rc<RefCell<Vec<OverlayPos>>>,
}

impl RecordingTarget {
    /// Creates a target with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every quad drawn so far, in draw order.
    #[must_use]
    pub fn drawn(&self) -> Vec<OverlayPos> {
        self.log.borrow().clone()
    }

    /// Returns the number of quads drawn so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// Returns `true` if nothing has been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Forgets everything drawn so far.
    pub fn clear(&mut self) {
        self.log.borrow_mut().clear();
    }

    /// Returns the union of the drawn quads' ground-plane footprints, or
    /// `None` if nothing was drawn.
    ///
    /// Each quad covers one cell: a unit square centered on the position.
    #[must_use]
    pub fn damage_bounds(&self) -> Option<Rect> {
        self.log
            .borrow()
            .iter()
            .map(|pos| Rect::new(pos.x - 0.5, pos.z - 0.5, pos.x + 0.5, pos.z + 0.5))
            .reduce(|acc, rect| acc.union(rect))
    }
}

impl OverlayTarget for RecordingTarget {
    fn draw_quad(&mut self, pos: OverlayPos) {
        self.log.borrow_mut().push(pos);
    }
}

/// Coalescing metrics over a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshReport {
    /// Schedule requests noted by the driver/test.
    pub requests: u64,
    /// Successful callback runs.
    pub runs: u64,
    /// Callback failures caught at the boundary.
    pub failures: u64,
    /// Requests absorbed by coalescing (`requests - runs - failures`).
    pub coalesced: u64,
}

/// Counts refresh activity: a [`TraceSink`] for runs and failures, plus a
/// request counter fed by whoever issues the schedule calls.
#[derive(Debug, Default)]
pub struct RefreshStats {
    requests: u64,
    runs: u64,
    failures: u64,
}

impl RefreshStats {
    /// Creates zeroed stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notes one schedule request.
    pub fn note_request(&mut self) {
        self.requests = self.requests.saturating_add(1);
    }

    /// Returns the current report.
    #[must_use]
    pub fn report(&self) -> RefreshReport {
        RefreshReport {
            requests: self.requests,
            runs: self.runs,
            failures: self.failures,
            coalesced: self
                .requests
                .saturating_sub(self.runs)
                .saturating_sub(self.failures),
        }
    }
}

impl TraceSink for RefreshStats {
    fn on_refresh_run(&mut self, _e: &RefreshRunEvent) {
        self.runs = self.runs.saturating_add(1);
    }

    fn on_refresh_failed(&mut self, _frame_index: u64, _error: &RefreshError) {
        self.failures = self.failures.saturating_add(1);
    }
}
