// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads bytes recorded by a
//! [`RecorderSink`](crate::recorder::RecorderSink) and writes
//! [Chrome Trace Event Format][spec] JSON to the given writer, suitable for
//! `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
//!
//! Only [`FrameBegin`](crate::recorder::RecordedEvent::FrameBegin) records
//! carry a timestamp; the exporter stamps every other event with the most
//! recent frame's time.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use moraine_core::time::Timebase;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a Chrome Trace Event Format JSON array.
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut frame_ts = 0.0_f64;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::FrameBegin(e) => {
                frame_ts = ticks_to_us(e.now.ticks(), timebase);
                events.push(json!({
                    "ph": "i",
                    "name": "FrameBegin",
                    "cat": "Frame",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::RefreshRun(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "RefreshRun",
                    "cat": "Refresh",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                    }
                }));
            }
            RecordedEvent::RefreshFailed {
                frame_index,
                message,
            } => {
                events.push(json!({
                    "ph": "i",
                    "name": "RefreshFailed",
                    "cat": "Refresh",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": frame_index,
                        "error": message,
                    }
                }));
            }
            RecordedEvent::Draw(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Draw",
                    "cat": "Overlay",
                    "ts": frame_ts,
                    "pid": 0,
                    "tid": e.highlighter.0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "recached": e.recached,
                        "cells": e.cells,
                        "drawn": e.drawn,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ticks_to_us(ticks: u64, timebase: Timebase) -> f64 {
    timebase.ticks_to_nanos(ticks) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use moraine_core::defer::RefreshError;
    use moraine_core::session::HighlighterId;
    use moraine_core::time::HostTime;
    use moraine_core::trace::{DrawEvent, FrameBeginEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 0,
            now: HostTime(1_000_000),
        });
        rec.on_refresh_failed(0, &RefreshError::new("boom"));
        rec.on_draw(&DrawEvent {
            frame_index: 0,
            highlighter: HighlighterId(1),
            recached: false,
            cells: 3,
            drawn: 3,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["name"], "FrameBegin");
        assert_eq!(parsed[0]["ts"], 1000.0);

        // Later events inherit the frame's timestamp.
        assert_eq!(parsed[1]["name"], "RefreshFailed");
        assert_eq!(parsed[1]["ts"], 1000.0);
        assert_eq!(parsed[1]["args"]["error"], "boom");

        assert_eq!(parsed[2]["name"], "Draw");
        assert_eq!(parsed[2]["tid"], 1);
        assert_eq!(parsed[2]["args"]["cells"], 3);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
