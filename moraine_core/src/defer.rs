// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Next-frame coalescing of redundant refresh requests.
//!
//! Many independent call sites can each detect "dependencies changed" during
//! the same frame and each want a refresh. [`DeferredRefresh`] collapses any
//! number of such requests into exactly one execution of its bound callback
//! at the next frame boundary, so the refresh cost is paid at most once per
//! frame regardless of request fan-in.
//!
//! A scheduler instance is bound to exactly one logical task at construction.
//! It is not a queue: scheduling while a run is already pending is a no-op.
//!
//! # State machine
//!
//! ```text
//!            schedule()                 run_pending()
//!   Idle ───────────────► Pending ───────────────────► Idle
//!    ▲                      │  ▲                         │
//!    │                      └──┘                         │
//!    │                  schedule() (no-op)               │
//!    └───────────────────────────────────────────────────┘
//! ```
//!
//! The pending flag is cleared *before* the callback runs, so a callback that
//! calls [`RefreshHandle::schedule`] on its own handle re-arms the scheduler
//! for a subsequent frame instead of being swallowed as a duplicate.
//!
//! # Failure boundary
//!
//! The callback's error is caught at the single invocation point and returned
//! as [`RefreshOutcome::Failed`] for the caller to log; it never unwinds into
//! the host's frame loop, and the flag is never left stuck.
//!
//! The shared flag is an `Rc<Cell<bool>>`: cheap, single-threaded, and
//! deliberately `!Send` — these primitives live on the frame-loop thread.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use core::fmt;

/// Error returned by a refresh callback.
///
/// Carries a human-readable message; the session converts it to a trace
/// entry at the invocation boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshError {
    message: String,
}

impl RefreshError {
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

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refresh callback failed: {}", self.message)
    }
}

impl fmt::Debug for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefreshError({:?})", self.message)
    }
}

impl core::error::Error for RefreshError {}

/// Result of one [`DeferredRefresh::run_pending`] call.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RefreshOutcome {
    /// Nothing was scheduled; the callback did not run.
    Idle,
    /// The callback ran and succeeded.
    Ran,
    /// The callback ran and failed; the error was caught at the boundary.
    Failed(RefreshError),
}

/// A cloneable handle that can schedule the bound refresh.
///
/// Handles share the scheduler's pending flag. A callback typically captures
/// its own handle so it can re-schedule itself (e.g. to retry on the next
/// frame).
#[derive(Clone)]
pub struct RefreshHandle {
    pending: Rc<Cell<bool>>,
}

impl RefreshHandle {
    /// Requests a run of the bound callback at the next frame boundary.
    ///
    /// No-op if a run is already pending (coalescing).
    #[inline]
    pub fn schedule(&self) {
        self.pending.set(true);
    }

    /// Returns `true` while a run is awaiting the next frame boundary.
    #[inline]
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.pending.get()
    }
}

impl fmt::Debug for RefreshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RefreshHandle(pending: {})", self.pending.get())
    }
}

/// Coalesces repeated scheduling requests into a single next-frame execution
/// of one bound callback.
///
/// Constructed once at host startup and driven by the session's frame hook;
/// there is no cancellation — once pending, the callback will run at the
/// next boundary.
pub struct DeferredRefresh {
    pending: Rc<Cell<bool>>,
    callback: Box<dyn FnMut() -> Result<(), RefreshError>>,
}

impl DeferredRefresh {
    /// Binds `callback` as this scheduler's one logical task.
    #[must_use]
    pub fn new(callback: impl FnMut() -> Result<(), RefreshError> + 'static) -> Self {
        Self {
            pending: Rc::new(Cell::new(false)),
            callback: Box::new(callback),
        }
    }

    /// Returns a handle sharing this scheduler's pending flag.
    #[must_use]
    pub fn handle(&self) -> RefreshHandle {
        RefreshHandle {
            pending: Rc::clone(&self.pending),
        }
    }

    /// Requests a run at the next frame boundary; no-op while pending.
    #[inline]
    pub fn schedule(&self) {
        self.pending.set(true);
    }

    /// Returns `true` while a run is awaiting the next frame boundary.
    #[inline]
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.pending.get()
    }

    /// Runs the bound callback if a run is pending.
    ///
    /// Called once per frame boundary. The pending flag is cleared before
    /// the callback is invoked, so re-entrant scheduling from inside the
    /// callback is honored on a subsequent frame. Callback errors are caught
    /// and returned as [`RefreshOutcome::Failed`] rather than propagated.
    pub fn run_pending(&mut self) -> RefreshOutcome {
        if !self.pending.replace(false) {
            return RefreshOutcome::Idle;
        }
        match (self.callback)() {
            Ok(()) => RefreshOutcome::Ran,
            Err(e) => RefreshOutcome::Failed(e),
        }
    }
}

impl fmt::Debug for DeferredRefresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRefresh")
            .field("pending", &self.pending.get())
            .finish_non_exhaustive()
    }
}
