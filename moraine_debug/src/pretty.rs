// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).
//! Timestamps are converted to microseconds using a [`Timebase`].

use std::io::Write;

use moraine_core::defer::RefreshError;
use moraine_core::time::Timebase;
use moraine_core::trace::{DrawEvent, FrameBeginEvent, RefreshRunEvent, TraceSink};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    timebase: Timebase,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("timebase", &self.timebase)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr(timebase: Timebase) -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
            timebase,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W, timebase: Timebase) -> Self {
        Self { writer, timebase }
    }

    fn ticks_to_us(&self, ticks: u64) -> f64 {
        self.timebase.ticks_to_nanos(ticks) as f64 / 1000.0
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[frame] index={} now={:.1}µs",
            e.frame_index,
            self.ticks_to_us(e.now.ticks()),
        );
    }

    fn on_refresh_run(&mut self, e: &RefreshRunEvent) {
        let _ = writeln!(self.writer, "[refresh] frame={} ok", e.frame_index);
    }

    fn on_refresh_failed(&mut self, frame_index: u64, error: &RefreshError) {
        let _ = writeln!(
            self.writer,
            "[refresh] frame={frame_index} FAILED: {}",
            error.message(),
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let recached = if e.recached { "recached" } else { "cached" };
        let _ = writeln!(
            self.writer,
            "[draw] frame={} hl={} {recached} cells={} drawn={}",
            e.frame_index, e.highlighter.0, e.cells, e.drawn,
        );
    }
}
