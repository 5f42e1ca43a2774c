// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-loop coordination primitives for grid overlay rendering.
//!
//! `moraine_core` provides two small primitives for frame-driven host
//! applications, plus the session wiring around them. It is `no_std`
//! compatible (with `alloc`) and single-threaded by construction.
//!
//! # Architecture
//!
//! Host events flow through the session into the primitives, which call
//! back into host-supplied closures:
//!
//! ```text
//!   Host (frame loop + events)
//!       │ dependencies_changed / selection_changed / frame
//!       ▼
//!   OverlaySession ──► DeferredRefresh::run_pending() ──► refresh callback
//!       │                     (coalesced, next frame, error boundary)
//!       ▼
//!   CellHighlighter::draw() ──► selector (at most once per interval)
//!       │
//!       ▼
//!   OverlayTarget::draw_quad() (per cached position, every frame)
//! ```
//!
//! **[`defer`]** — [`DeferredRefresh`](defer::DeferredRefresh) coalesces any
//! number of same-frame refresh requests into exactly one next-frame
//! execution of its bound callback, with a caught-error boundary.
//!
//! **[`highlight`]** — [`CellHighlighter`](highlight::CellHighlighter)
//! recomputes an expensive cell selection at most once per recache interval
//! and renders the cached result cheaply on every draw.
//!
//! **[`session`]** — [`OverlaySession`](session::OverlaySession), the
//! explicitly constructed composition root mapping host hooks onto the
//! primitives.
//!
//! **[`host`]** — The contract a host implements: [`FrameTick`](host::FrameTick)
//! delivery and the [`OverlayTarget`](host::OverlayTarget) render seam.
//!
//! **[`grid`]** — Grid cells and their render-space overlay positions.
//!
//! **[`time`]** — Monotonic tick time, durations, and timebase conversion.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) and the zero-overhead
//! [`Tracer`](trace::Tracer) wrapper for frame-loop instrumentation.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod defer;
pub mod grid;
pub mod highlight;
pub mod host;
pub mod session;
pub mod time;
pub mod trace;
