// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records (tag byte + fixed fields; failure
//! messages are length-prefixed UTF-8). [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].

use moraine_core::defer::RefreshError;
use moraine_core::session::HighlighterId;
use moraine_core::time::HostTime;
use moraine_core::trace::{DrawEvent, FrameBeginEvent, RefreshRunEvent, TraceSink};

const TAG_FRAME_BEGIN: u8 = 1;
const TAG_REFRESH_RUN: u8 = 2;
const TAG_REFRESH_FAILED: u8 = 3;
const TAG_DRAW: u8 = 4;

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "error messages are short; 4 GiB of message is not a real input"
        )]
        self.write_u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
    }
}

impl TraceSink for RecorderSink {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.write_u8(TAG_FRAME_BEGIN);
        self.write_u64(e.frame_index);
        self.write_u64(e.now.ticks());
    }

    fn on_refresh_run(&mut self, e: &RefreshRunEvent) {
        self.write_u8(TAG_REFRESH_RUN);
        self.write_u64(e.frame_index);
    }

    fn on_refresh_failed(&mut self, frame_index: u64, error: &RefreshError) {
        self.write_u8(TAG_REFRESH_FAILED);
        self.write_u64(frame_index);
        self.write_str(error.message());
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.write_u8(TAG_DRAW);
        self.write_u64(e.frame_index);
        self.write_u32(e.highlighter.0);
        self.write_u8(u8::from(e.recached));
        self.write_u64(e.cells as u64);
        self.write_u64(e.drawn as u64);
    }
}

/// A decoded trace event.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A frame began.
    FrameBegin(FrameBeginEvent),
    /// A deferred refresh ran successfully.
    RefreshRun(RefreshRunEvent),
    /// A deferred refresh failed at the error boundary.
    RefreshFailed {
        /// Frame on which the callback failed.
        frame_index: u64,
        /// The caught error's message.
        message: String,
    },
    /// A highlighter was drawn.
    Draw(DrawEvent),
}

/// Decodes recorded bytes back into events.
///
/// Truncated or malformed trailing data ends the iteration.
pub fn decode(bytes: &[u8]) -> impl Iterator<Item = RecordedEvent> + '_ {
    Decoder { bytes, pos: 0 }
}

struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Decoder<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let end = self.pos.checked_add(4)?;
        let v = u32::from_le_bytes(self.bytes.get(self.pos..end)?.try_into().ok()?);
        self.pos = end;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        let end = self.pos.checked_add(8)?;
        let v = u64::from_le_bytes(self.bytes.get(self.pos..end)?.try_into().ok()?);
        self.pos = end;
        Some(v)
    }

    fn read_str(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let end = self.pos.checked_add(len)?;
        let s = String::from_utf8_lossy(self.bytes.get(self.pos..end)?).into_owned();
        self.pos = end;
        Some(s)
    }

    fn read_usize(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }
}

impl Iterator for Decoder<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<RecordedEvent> {
        match self.read_u8()? {
            TAG_FRAME_BEGIN => Some(RecordedEvent::FrameBegin(FrameBeginEvent {
                frame_index: self.read_u64()?,
                now: HostTime(self.read_u64()?),
            })),
            TAG_REFRESH_RUN => Some(RecordedEvent::RefreshRun(RefreshRunEvent {
                frame_index: self.read_u64()?,
            })),
            TAG_REFRESH_FAILED => Some(RecordedEvent::RefreshFailed {
                frame_index: self.read_u64()?,
                message: self.read_str()?,
            }),
            TAG_DRAW => Some(RecordedEvent::Draw(DrawEvent {
                frame_index: self.read_u64()?,
                highlighter: HighlighterId(self.read_u32()?),
                recached: self.read_u8()? != 0,
                cells: self.read_usize()?,
                drawn: self.read_usize()?,
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_all_event_kinds() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 7,
            now: HostTime(123_456),
        });
        rec.on_refresh_run(&RefreshRunEvent { frame_index: 7 });
        rec.on_refresh_failed(8, &RefreshError::new("hotkey rebind failed"));
        rec.on_draw(&DrawEvent {
            frame_index: 8,
            highlighter: HighlighterId(2),
            recached: true,
            cells: 40,
            drawn: 0,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 4);

        match &events[0] {
            RecordedEvent::FrameBegin(e) => {
                assert_eq!(e.frame_index, 7);
                assert_eq!(e.now, HostTime(123_456));
            }
            other => panic!("expected FrameBegin, got {other:?}"),
        }
        match &events[2] {
            RecordedEvent::RefreshFailed {
                frame_index,
                message,
            } => {
                assert_eq!(*frame_index, 8);
                assert_eq!(message, "hotkey rebind failed");
            }
            other => panic!("expected RefreshFailed, got {other:?}"),
        }
        match &events[3] {
            RecordedEvent::Draw(e) => {
                assert_eq!(e.highlighter, HighlighterId(2));
                assert!(e.recached);
                assert_eq!(e.cells, 40);
                assert_eq!(e.drawn, 0);
            }
            other => panic!("expected Draw, got {other:?}"),
        }
    }

    #[test]
    fn truncated_input_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_frame_begin(&FrameBeginEvent {
            frame_index: 1,
            now: HostTime(2),
        });
        let bytes = rec.into_bytes();
        // Drop the last byte of the record.
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
