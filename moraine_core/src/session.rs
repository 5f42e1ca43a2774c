// Copyright 2026 the Moraine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session wiring for the overlay primitives.
//!
//! [`OverlaySession`] is the composition root: it owns the deferred refresh
//! scheduler and every highlighter, and maps the host's lifecycle hooks onto
//! them. It is constructed explicitly at host startup with its collaborators
//! injected — there is no global accessor — and torn down by dropping it.
//!
//! Per frame, the session runs the pending deferred refresh *first*, then
//! draws the highlighters. Consuming the pending flag at the top of the
//! frame is what gives the ordering guarantee: any `schedule()` issued while
//! the frame is being processed (from an event handler, a draw, or the
//! refresh callback itself) lands on the next frame, never the current one.

use alloc::vec::Vec;
use core::fmt;

use crate::defer::{DeferredRefresh, RefreshHandle, RefreshOutcome};
use crate::highlight::{CellHighlighter, SelectorError};
use crate::host::FrameTick;
use crate::trace::{DrawEvent, FrameBeginEvent, RefreshRunEvent, Tracer};

/// Identifies a highlighter within its session.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlighterId(pub u32);

impl fmt::Debug for HighlighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HighlighterId({})", self.0)
    }
}

/// Owns the overlay primitives and maps host lifecycle hooks onto them.
#[derive(Debug)]
pub struct OverlaySession {
    refresh: DeferredRefresh,
    highlighters: Vec<CellHighlighter>,
}

impl OverlaySession {
    /// Creates a session around the given refresh scheduler.
    #[must_use]
    pub fn new(refresh: DeferredRefresh) -> Self {
        Self {
            refresh,
            highlighters: Vec::new(),
        }
    }

    /// Adds a highlighter; its cache is drawn on every frame from now on.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "a session holds a handful of highlighters"
    )]
    pub fn add_highlighter(&mut self, highlighter: CellHighlighter) -> HighlighterId {
        let id = HighlighterId(self.highlighters.len() as u32);
        self.highlighters.push(highlighter);
        id
    }

    /// Returns a highlighter by id, e.g. to assign its render target.
    pub fn highlighter_mut(&mut self, id: HighlighterId) -> Option<&mut CellHighlighter> {
        self.highlighters.get_mut(id.0 as usize)
    }

    /// Returns a handle for scheduling the deferred refresh from host event
    /// handlers or from the refresh callback itself.
    #[must_use]
    pub fn refresh_handle(&self) -> RefreshHandle {
        self.refresh.handle()
    }

    /// Host hook: settings or designator dependencies changed.
    ///
    /// Any number of calls within one frame coalesce into a single refresh
    /// on the next frame boundary.
    pub fn dependencies_changed(&self) {
        self.refresh.schedule();
    }

    /// Host hook: the selection constraints behind one highlighter changed.
    ///
    /// Clears that cache; the recompute happens on the following frame's
    /// draw. Unknown ids are ignored.
    pub fn selection_changed(&mut self, id: HighlighterId) {
        if let Some(hl) = self.highlighters.get_mut(id.0 as usize) {
            hl.clear_cache();
        }
    }

    /// Host hook: a world or map (re)load invalidated every cache.
    pub fn clear_all_caches(&mut self) {
        for hl in &mut self.highlighters {
            hl.clear_cache();
        }
    }

    /// Host hook: one frame boundary.
    ///
    /// Runs the pending deferred refresh (converting a callback failure into
    /// a trace entry — it never propagates), then draws every highlighter.
    /// Selector errors propagate to the caller by design.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "a session holds a handful of highlighters"
    )]
    pub fn frame(
        &mut self,
        tick: &FrameTick,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), SelectorError> {
        tracer.frame_begin(&FrameBeginEvent {
            frame_index: tick.frame_index,
            now: tick.now,
        });

        match self.refresh.run_pending() {
            RefreshOutcome::Idle => {}
            RefreshOutcome::Ran => tracer.refresh_run(&RefreshRunEvent {
                frame_index: tick.frame_index,
            }),
            RefreshOutcome::Failed(e) => tracer.refresh_failed(tick.frame_index, &e),
        }

        for (i, hl) in self.highlighters.iter_mut().enumerate() {
            let report = hl.draw(tick.now)?;
            tracer.draw(&DrawEvent {
                frame_index: tick.frame_index,
                highlighter: HighlighterId(i as u32),
                recached: report.recached,
                cells: report.cells,
                drawn: report.drawn,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use super::*;
    use crate::defer::RefreshError;
    use crate::grid::CellCoord;
    use crate::highlight::{DEFAULT_RECACHE_NANOS, default_recache_interval};
    use crate::time::{Duration, HostTime, Timebase};

    fn tick(frame_index: u64, now: u64) -> FrameTick {
        FrameTick {
            now: HostTime(now),
            frame_index,
        }
    }

    #[test]
    fn events_coalesce_across_one_frame() {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let mut session = OverlaySession::new(DeferredRefresh::new(move || {
            counter.set(counter.get() + 1);
            Ok(())
        }));

        // A load event fans out to many dependents, each reporting a change.
        for _ in 0..20 {
            session.dependencies_changed();
        }
        session.frame(&tick(0, 0), &mut Tracer::none()).unwrap();
        assert_eq!(runs.get(), 1);

        session.frame(&tick(1, 16), &mut Tracer::none()).unwrap();
        assert_eq!(runs.get(), 1, "no residual refresh on the next frame");
    }

    #[test]
    fn refresh_runs_before_draws() {
        // The refresh callback flips a flag; the selector observes it. If
        // draws ran first, the first frame would cache the stale value.
        let refreshed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&refreshed);
        let mut session = OverlaySession::new(DeferredRefresh::new(move || {
            flag.set(true);
            Ok(())
        }));

        let seen = Rc::new(Cell::new(false));
        let observed = Rc::clone(&seen);
        let watch = Rc::clone(&refreshed);
        let id = session.add_highlighter(CellHighlighter::new(
            move || {
                observed.set(watch.get());
                Ok(vec![])
            },
            Duration::ZERO,
        ));
        assert_eq!(id, HighlighterId(0));

        session.dependencies_changed();
        session.frame(&tick(0, 0), &mut Tracer::none()).unwrap();
        assert!(seen.get(), "selector must see the refreshed state");
    }

    #[test]
    fn failed_refresh_does_not_stop_the_frame() {
        let mut session =
            OverlaySession::new(DeferredRefresh::new(|| Err(RefreshError::new("nope"))));
        let draws = Rc::new(Cell::new(0));
        let counter = Rc::clone(&draws);
        session.add_highlighter(CellHighlighter::new(
            move || {
                counter.set(counter.get() + 1);
                Ok(vec![CellCoord::new(0, 0)])
            },
            default_recache_interval(Timebase::NANOS),
        ));

        session.dependencies_changed();
        session.frame(&tick(0, 0), &mut Tracer::none()).unwrap();
        assert_eq!(draws.get(), 1, "draws proceed after a caught failure");

        // The loop stays functional on later frames too.
        session.dependencies_changed();
        session
            .frame(&tick(1, DEFAULT_RECACHE_NANOS), &mut Tracer::none())
            .unwrap();
        assert_eq!(draws.get(), 2);
    }

    #[test]
    fn selector_error_propagates_from_frame() {
        let mut session = OverlaySession::new(DeferredRefresh::new(|| Ok(())));
        session.add_highlighter(CellHighlighter::new(
            || Err(SelectorError::new("defect")),
            Duration::ZERO,
        ));

        let err = session
            .frame(&tick(0, 0), &mut Tracer::none())
            .unwrap_err();
        assert_eq!(err.message(), "defect");
    }

    #[test]
    fn selection_changed_clears_only_that_cache() {
        let mut session = OverlaySession::new(DeferredRefresh::new(|| Ok(())));
        let a = session.add_highlighter(CellHighlighter::new(
            || Ok(vec![CellCoord::new(0, 0)]),
            default_recache_interval(Timebase::NANOS),
        ));
        let b = session.add_highlighter(CellHighlighter::new(
            || Ok(vec![CellCoord::new(1, 1)]),
            default_recache_interval(Timebase::NANOS),
        ));

        session.frame(&tick(0, 0), &mut Tracer::none()).unwrap();
        session.selection_changed(a);

        assert!(
            session
                .highlighter_mut(a)
                .unwrap()
                .cached_positions()
                .is_empty()
        );
        assert_eq!(
            session.highlighter_mut(b).unwrap().cached_positions().len(),
            1,
            "the other cache is untouched"
        );

        // Unknown ids are ignored.
        session.selection_changed(HighlighterId(99));
    }

    #[test]
    fn clear_all_caches_resets_every_highlighter() {
        let mut session = OverlaySession::new(DeferredRefresh::new(|| Ok(())));
        let a = session.add_highlighter(CellHighlighter::new(
            || Ok(vec![CellCoord::new(0, 0)]),
            default_recache_interval(Timebase::NANOS),
        ));
        let b = session.add_highlighter(CellHighlighter::new(
            || Ok(vec![CellCoord::new(1, 1)]),
            default_recache_interval(Timebase::NANOS),
        ));
        session.frame(&tick(0, 0), &mut Tracer::none()).unwrap();

        session.clear_all_caches();
        for id in [a, b] {
            assert!(
                session
                    .highlighter_mut(id)
                    .unwrap()
                    .cached_positions()
                    .is_empty()
            );
        }
    }
}
