// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for frame-driven integrations.
//!
//! Moraine embeds into a host application that owns the real frame loop.
//! The host provides the following pieces:
//!
//! - **Startup wiring** — Construct a [`DeferredRefresh`] (binding the
//!   actual refresh logic), one [`CellHighlighter`] per overlay (binding the
//!   actual selector), and an [`OverlaySession`] owning both. The session
//!   lives until the host session ends; nothing here is rebuilt per frame.
//!
//! - **Per-frame hook** — Produces a [`FrameTick`] from the host's frame
//!   callback and calls [`OverlaySession::frame`]. This is the only tick
//!   source; the scheduler detects "next frame" purely from these calls.
//!
//! - **Event hooks** — Settings-changed and dependency-changed events call
//!   [`OverlaySession::dependencies_changed`]; selection-changed events call
//!   [`OverlaySession::selection_changed`].
//!
//! - **Render target** — Implements the [`OverlayTarget`] trait and assigns
//!   it to a highlighter. Without a target the cache still updates and
//!   nothing is drawn.
//!
//! A per-simulation-tick cadence, if the host has one, is its own concern:
//! neither primitive consumes it.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_frame(&mut self) {
//!     let tick = FrameTick { now: host_now(), frame_index: self.frame_index };
//!     self.frame_index += 1;
//!     // Runs any pending deferred refresh, then draws every highlighter.
//!     if let Err(e) = self.session.frame(&tick, &mut Tracer::none()) {
//!         // Selector failures surface here by design; see the error policy
//!         // notes on `CellHighlighter::draw`.
//!         panic!("defective selector: {e}");
//!     }
//! }
//! ```
//!
//! [`CellHighlighter`]: crate::highlight::CellHighlighter
//! [`DeferredRefresh`]: crate::defer::DeferredRefresh
//! [`OverlaySession`]: crate::session::OverlaySession
//! [`OverlaySession::frame`]: crate::session::OverlaySession::frame
//! [`OverlaySession::dependencies_changed`]: crate::session::OverlaySession::dependencies_changed
//! [`OverlaySession::selection_changed`]: crate::session::OverlaySession::selection_changed

use crate::grid::OverlayPos;
use crate::time::HostTime;

/// A frame opportunity delivered by the host's per-frame hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameTick {
    /// Current host time when the frame began.
    pub now: HostTime,
    /// Monotonically increasing frame counter, assigned by the host.
    pub frame_index: u64,
}

/// The visual resource highlight quads are drawn into.
///
/// Implemented by the host's renderer; test doubles record positions
/// instead. Assigning a target is optional — a highlighter without one
/// keeps its cache warm and skips rendering.
pub trait OverlayTarget {
    /// Draws one highlight quad at the given render-space position.
    fn draw_quad(&mut self, pos: OverlayPos);
}
