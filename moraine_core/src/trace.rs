// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the overlay frame loop.
//!
//! [`TraceSink`] has one method per event with default no-op bodies, so
//! sinks implement only what they care about. [`Tracer`] wraps an optional
//! `&mut dyn TraceSink`: with the `trace` feature **off** every method
//! compiles to nothing; **on**, each method is a single `Option` branch
//! before dispatch.
//!
//! The session emits all events; the primitives stay tracer-free and report
//! through return values ([`RefreshOutcome`](crate::defer::RefreshOutcome),
//! [`DrawReport`](crate::highlight::DrawReport)) instead.

use crate::defer::RefreshError;
use crate::session::HighlighterId;
use crate::time::HostTime;

/// Emitted at the top of each session frame, before any work runs.
#[derive(Clone, Copy, Debug)]
pub struct FrameBeginEvent {
    /// Host-assigned frame counter.
    pub frame_index: u64,
    /// Host time when the frame began.
    pub now: HostTime,
}

/// Emitted when a pending deferred refresh ran successfully.
#[derive(Clone, Copy, Debug)]
pub struct RefreshRunEvent {
    /// Frame on which the coalesced run executed.
    pub frame_index: u64,
}

/// Emitted for each highlighter drawn during a frame.
#[derive(Clone, Copy, Debug)]
pub struct DrawEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which highlighter was drawn.
    pub highlighter: HighlighterId,
    /// Whether the selector ran on this draw.
    pub recached: bool,
    /// Cached positions after the draw.
    pub cells: usize,
    /// Quads actually drawn (zero without a render target).
    pub drawn: usize,
}

/// Receives trace events from the overlay frame loop.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called at the top of each session frame.
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        _ = e;
    }

    /// Called when a pending deferred refresh ran successfully.
    fn on_refresh_run(&mut self, e: &RefreshRunEvent) {
        _ = e;
    }

    /// Called when a deferred refresh callback failed.
    ///
    /// This is the log half of the scheduler's error boundary: the error was
    /// caught at the invocation point and the frame loop continues.
    fn on_refresh_failed(&mut self, frame_index: u64, error: &RefreshError) {
        _ = (frame_index, error);
    }

    /// Called after each highlighter draw.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

/// Thin wrapper around an optional [`TraceSink`].
///
/// With the `trace` feature off, every method compiles to nothing; on, each
/// method checks the inner `Option` (one branch) before dispatching.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`FrameBeginEvent`].
    #[inline]
    pub fn frame_begin(&mut self, e: &FrameBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_frame_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RefreshRunEvent`].
    #[inline]
    pub fn refresh_run(&mut self, e: &RefreshRunEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_refresh_run(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a refresh failure.
    #[inline]
    pub fn refresh_failed(&mut self, frame_index: u64, error: &RefreshError) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_refresh_failed(frame_index, error);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (frame_index, error);
        }
    }

    /// Emits a [`DrawEvent`].
    #[inline]
    pub fn draw(&mut self, e: &DrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
