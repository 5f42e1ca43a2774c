// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interval-cached cell highlighting.
//!
//! [`CellHighlighter`] wraps a selector that computes the authoritative set
//! of grid cells worth highlighting — typically an expensive query such as a
//! full-map scan. The selector runs at most once per recache interval; every
//! [`draw`](CellHighlighter::draw) call renders the cached render-space
//! positions, so per-frame cost is O(cached cells) while the query cost is
//! amortized across the interval.
//!
//! The interval is the tuning knob: selectors whose cost grows with map size
//! trade overlay freshness against frame-time impact by raising it. The
//! stock policy is half a second ([`DEFAULT_RECACHE_NANOS`]); an interval of
//! [`Duration::ZERO`] recomputes on every draw.
//!
//! # Error policy
//!
//! Selector errors propagate out of `draw` and leave the cache cleared. A
//! failing selector is a logic defect, not a transient condition; absorbing
//! it here would hide the defect behind stale rendering. Contrast with the
//! caught-and-logged boundary around [`DeferredRefresh`](crate::defer::DeferredRefresh)
//! callbacks, where a failed refresh must not break the frame loop.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::grid::{CellCoord, OverlayPos};
use crate::host::OverlayTarget;
use crate::time::{Duration, HostTime, Timebase};

/// Default recache interval: half a second, expressed in nanoseconds.
pub const DEFAULT_RECACHE_NANOS: u64 = 500_000_000;

/// Returns the default recache interval in the host's tick units.
#[must_use]
pub fn default_recache_interval(timebase: Timebase) -> Duration {
    Duration::from_nanos(DEFAULT_RECACHE_NANOS, timebase)
}

/// Error returned by a cell selector.
///
/// Propagates out of [`CellHighlighter::draw`]; see the module docs for the
/// fail-fast rationale.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectorError {
    message: String,
}

impl SelectorError {
    /// Creates an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell selector failed: {}", self.message)
    }
}

impl fmt::Debug for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SelectorError({:?})", self.message)
    }
}

impl core::error::Error for SelectorError {}

/// What one [`CellHighlighter::draw`] call did.
///
/// Lets the session emit trace events without the primitive owning a tracer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawReport {
    /// Whether the selector ran on this draw.
    pub recached: bool,
    /// Number of positions in the cache after this draw.
    pub cells: usize,
    /// Number of quads actually drawn (zero without a target).
    pub drawn: usize,
}

/// Caches a selector's cell set and draws it as an overlay.
///
/// Owns one cache entry: the last computed render-space positions (in
/// selector enumeration order), the next-recompute deadline, and a fixed
/// recache interval. The cached sequence is replaced wholesale on each
/// recompute, never merged.
pub struct CellHighlighter {
    selector: Box<dyn FnMut() -> Result<Vec<CellCoord>, SelectorError>>,
    recache_interval: Duration,
    next_recache: HostTime,
    cached: Vec<OverlayPos>,
    target: Option<Box<dyn OverlayTarget>>,
}

impl CellHighlighter {
    /// Creates a highlighter over the given selector and recache interval.
    ///
    /// The first [`draw`](Self::draw) always runs the selector. No render
    /// target is assigned yet; see [`set_target`](Self::set_target).
    #[must_use]
    pub fn new(
        selector: impl FnMut() -> Result<Vec<CellCoord>, SelectorError> + 'static,
        recache_interval: Duration,
    ) -> Self {
        Self {
            selector: Box::new(selector),
            recache_interval,
            next_recache: HostTime::EPOCH,
            cached: Vec::new(),
            target: None,
        }
    }

    /// Assigns the render target highlight quads are drawn into.
    pub fn set_target(&mut self, target: Box<dyn OverlayTarget>) {
        self.target = Some(target);
    }

    /// Removes the render target; the cache keeps updating on schedule.
    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Returns `true` if a render target is assigned.
    #[must_use]
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// Returns the configured recache interval.
    #[must_use]
    pub fn recache_interval(&self) -> Duration {
        self.recache_interval
    }

    /// Returns the cached render-space positions, in selector enumeration
    /// order.
    #[must_use]
    pub fn cached_positions(&self) -> &[OverlayPos] {
        &self.cached
    }

    /// Empties the cache and marks the recache deadline as due.
    ///
    /// The selector is not called here; the recompute happens lazily on the
    /// following [`draw`](Self::draw).
    pub fn clear_cache(&mut self) {
        self.next_recache = HostTime::EPOCH;
        self.cached.clear();
    }

    /// Recomputes the cache if its deadline has passed, then draws every
    /// cached position into the assigned target.
    ///
    /// Exactly one deadline check happens per call. Without a target the
    /// render step is skipped silently — not an error. Selector errors
    /// propagate and leave the cache cleared.
    pub fn draw(&mut self, now: HostTime) -> Result<DrawReport, SelectorError> {
        let recached = if now >= self.next_recache {
            self.recache(now)?;
            true
        } else {
            false
        };

        let mut drawn = 0;
        if let Some(target) = self.target.as_deref_mut() {
            for &pos in &self.cached {
                target.draw_quad(pos);
                drawn += 1;
            }
        }

        Ok(DrawReport {
            recached,
            cells: self.cached.len(),
            drawn,
        })
    }

    fn recache(&mut self, now: HostTime) -> Result<(), SelectorError> {
        // Deadline is stamped and the cache cleared before the selector runs:
        // on error the cache is empty, not stale.
        self.next_recache = now.checked_add(self.recache_interval).unwrap_or(now);
        self.cached.clear();
        let cells = (self.selector)()?;
        self.cached
            .extend(cells.into_iter().map(OverlayPos::above_cell));
        Ok(())
    }
}

impl fmt::Debug for CellHighlighter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellHighlighter")
            .field("recache_interval", &self.recache_interval)
            .field("next_recache", &self.next_recache)
            .field("cached", &self.cached.len())
            .field("has_target", &self.target.is_some())
            .finish_non_exhaustive()
    }
}
