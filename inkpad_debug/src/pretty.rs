// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use inkpad_core::stroke::StrokeState;
use inkpad_core::trace::{
    CommitEvent, DirtyRectEvent, RedrawEvent, RefineEvent, SamplesEvent, StrokeBeginEvent,
    StrokeEndEvent, SurfaceResetEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    lines: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, lines: 0 }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Number of events written so far.
    #[must_use]
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Consumes the sink and returns its writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        self.lines += 1;
        let _ = self.writer.write_fmt(args);
        let _ = self.writer.write_all(b"\n");
    }
}

fn state_name(state: StrokeState) -> &'static str {
    match state {
        StrokeState::Active => "active",
        StrokeState::Committed => "committed",
        StrokeState::Discarded => "discarded",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_stroke_begin(&mut self, e: &StrokeBeginEvent) {
        let replaced = if e.replaced { " REPLACED" } else { "" };
        self.line(format_args!(
            "[begin] contact={} width={}{replaced}",
            e.contact, e.width,
        ));
    }

    fn on_samples(&mut self, e: &SamplesEvent) {
        self.line(format_args!(
            "[samples] contact={} +{} ~{} total={}",
            e.contact, e.settled, e.predicted, e.total,
        ));
    }

    fn on_refine(&mut self, e: &RefineEvent) {
        let outcome = if e.applied { "applied" } else { "ignored" };
        self.line(format_args!(
            "[refine] contact={} id={} {outcome}",
            e.contact, e.correlation.0,
        ));
    }

    fn on_stroke_end(&mut self, e: &StrokeEndEvent) {
        self.line(format_args!(
            "[end] contact={} {} samples={}",
            e.contact,
            state_name(e.state),
            e.samples,
        ));
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let mode = if e.baked { "baked" } else { "deferred" };
        self.line(format_args!(
            "[commit] stroke={} samples={} {mode}",
            e.index, e.samples,
        ));
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        let rebuild = if e.full_rebuild { " REBUILD" } else { "" };
        self.line(format_args!(
            "[redraw] frame={} baked={} active={}{rebuild}",
            e.frame_index, e.baked_strokes, e.active_strokes,
        ));
    }

    fn on_surface_reset(&mut self, e: &SurfaceResetEvent) {
        self.line(format_args!("[reset] restored={}", e.restored));
    }

    fn on_dirty_rect(&mut self, e: &DirtyRectEvent) {
        self.line(format_args!(
            "[dirty] contact={} ({:.1}, {:.1})-({:.1}, {:.1})",
            e.contact, e.x0, e.y0, e.x1, e.y1,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_core::contact::{ContactId, CorrelationId};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn begin_and_samples_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_stroke_begin(&StrokeBeginEvent {
            contact: ContactId(2),
            width: 3.0,
            replaced: true,
        });
        sink.on_samples(&SamplesEvent {
            contact: ContactId(2),
            settled: 5,
            predicted: 1,
            total: 6,
        });
        assert_eq!(sink.lines(), 2);
        let out = output(sink);
        assert!(out.contains("[begin] contact=#2 width=3 REPLACED"), "got: {out}");
        assert!(out.contains("[samples] contact=#2 +5 ~1 total=6"), "got: {out}");
    }

    #[test]
    fn lifecycle_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_refine(&RefineEvent {
            contact: ContactId(1),
            correlation: CorrelationId(8),
            applied: false,
        });
        sink.on_stroke_end(&StrokeEndEvent {
            contact: ContactId(1),
            state: StrokeState::Discarded,
            samples: 12,
        });
        sink.on_commit(&CommitEvent {
            index: 3,
            samples: 40,
            baked: false,
        });
        let out = output(sink);
        assert!(out.contains("[refine] contact=#1 id=8 ignored"), "got: {out}");
        assert!(out.contains("[end] contact=#1 discarded samples=12"), "got: {out}");
        assert!(out.contains("[commit] stroke=3 samples=40 deferred"), "got: {out}");
    }

    #[test]
    fn surface_lines() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_redraw(&RedrawEvent {
            frame_index: 7,
            full_rebuild: true,
            baked_strokes: 4,
            active_strokes: 1,
        });
        sink.on_surface_reset(&SurfaceResetEvent { restored: 0 });
        sink.on_dirty_rect(&DirtyRectEvent {
            contact: ContactId(4),
            x0: -90.0,
            y0: 10.5,
            x1: 110.0,
            y1: 210.0,
        });
        let out = output(sink);
        assert_eq!(out.lines().count(), 3);
        assert!(out.contains("[redraw] frame=7 baked=4 active=1 REBUILD"), "got: {out}");
        assert!(out.contains("[reset] restored=0"), "got: {out}");
        assert!(out.contains("[dirty] contact=#4 (-90.0, 10.5)-(110.0, 210.0)"), "got: {out}");
    }
}
