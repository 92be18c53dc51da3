// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instrumentation for stroke input and canvas redraws.
//!
//! This module provides a [`TraceSink`] trait with one method per event. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`) gates [`DirtyRectEvent`] and the
//!   corresponding `TraceSink` method.

use crate::contact::{ContactId, CorrelationId};
use crate::stroke::StrokeState;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a contact begins a stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeBeginEvent {
    /// The contact.
    pub contact: ContactId,
    /// Line width of the new stroke.
    pub width: f32,
    /// Whether an existing active stroke was discarded to make room.
    pub replaced: bool,
}

/// Emitted after an input batch is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplesEvent {
    /// The contact.
    pub contact: ContactId,
    /// Settled samples in the batch.
    pub settled: u32,
    /// Predicted samples in the batch.
    pub predicted: u32,
    /// Stroke length after the batch, predictions included.
    pub total: u32,
}

/// Emitted when a refinement arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefineEvent {
    /// The contact.
    pub contact: ContactId,
    /// Correlation id of the refined sample.
    pub correlation: CorrelationId,
    /// Whether the refinement matched a pending sample.
    pub applied: bool,
}

/// Emitted when a contact's stroke ends or is cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeEndEvent {
    /// The contact.
    pub contact: ContactId,
    /// [`Committed`](StrokeState::Committed) or
    /// [`Discarded`](StrokeState::Discarded).
    pub state: StrokeState,
    /// Samples in the finished stroke.
    pub samples: u32,
}

/// Emitted when a finished stroke is added to the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitEvent {
    /// Position of the stroke in the committed list.
    pub index: u32,
    /// Samples in the stroke.
    pub samples: u32,
    /// Whether it was drawn into the backing raster immediately, rather
    /// than deferred to the next rebuild.
    pub baked: bool,
}

/// Emitted after a redraw request is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedrawEvent {
    /// Monotonic redraw counter.
    pub frame_index: u64,
    /// Whether the backing raster was rebuilt from scratch.
    pub full_rebuild: bool,
    /// Strokes baked into the backing raster.
    pub baked_strokes: u32,
    /// Active strokes composited on top.
    pub active_strokes: u32,
}

/// Emitted when the canvas is cleared or restored from a sketch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceResetEvent {
    /// Strokes installed after the reset (zero for a clear).
    pub restored: u32,
}

/// The area an input batch invalidated, in logical coordinates.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirtyRectEvent {
    /// The contact.
    pub contact: ContactId,
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub y1: f64,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the input and redraw paths.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a stroke begins.
    fn on_stroke_begin(&mut self, e: &StrokeBeginEvent) {
        _ = e;
    }

    /// Called after an input batch.
    fn on_samples(&mut self, e: &SamplesEvent) {
        _ = e;
    }

    /// Called when a refinement arrives.
    fn on_refine(&mut self, e: &RefineEvent) {
        _ = e;
    }

    /// Called when a stroke ends or is cancelled.
    fn on_stroke_end(&mut self, e: &StrokeEndEvent) {
        _ = e;
    }

    /// Called when a stroke is committed to the canvas.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }

    /// Called after a redraw.
    fn on_redraw(&mut self, e: &RedrawEvent) {
        _ = e;
    }

    /// Called when the canvas is cleared or restored.
    fn on_surface_reset(&mut self, e: &SurfaceResetEvent) {
        _ = e;
    }

    /// Called with each batch's dirty rect (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_dirty_rect(&mut self, e: &DirtyRectEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
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

macro_rules! dispatch {
    ($self:ident, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
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

    /// Emits a [`StrokeBeginEvent`].
    #[inline]
    pub fn stroke_begin(&mut self, e: &StrokeBeginEvent) {
        dispatch!(self, on_stroke_begin, e);
    }

    /// Emits a [`SamplesEvent`].
    #[inline]
    pub fn samples(&mut self, e: &SamplesEvent) {
        dispatch!(self, on_samples, e);
    }

    /// Emits a [`RefineEvent`].
    #[inline]
    pub fn refine(&mut self, e: &RefineEvent) {
        dispatch!(self, on_refine, e);
    }

    /// Emits a [`StrokeEndEvent`].
    #[inline]
    pub fn stroke_end(&mut self, e: &StrokeEndEvent) {
        dispatch!(self, on_stroke_end, e);
    }

    /// Emits a [`CommitEvent`].
    #[inline]
    pub fn commit(&mut self, e: &CommitEvent) {
        dispatch!(self, on_commit, e);
    }

    /// Emits a [`RedrawEvent`].
    #[inline]
    pub fn redraw(&mut self, e: &RedrawEvent) {
        dispatch!(self, on_redraw, e);
    }

    /// Emits a [`SurfaceResetEvent`].
    #[inline]
    pub fn surface_reset(&mut self, e: &SurfaceResetEvent) {
        dispatch!(self, on_surface_reset, e);
    }

    /// Emits a [`DirtyRectEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn dirty_rect(&mut self, e: &DirtyRectEvent) {
        if let Some(s) = &mut self.sink {
            s.on_dirty_rect(e);
        }
    }
}

/// Saturating `usize` to `u32` conversion for event counters.
#[inline]
#[must_use]
pub fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn begin() -> StrokeBeginEvent {
        StrokeBeginEvent {
            contact: ContactId(3),
            width: 3.0,
            replaced: false,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_stroke_begin(&begin());
        sink.on_redraw(&RedrawEvent {
            frame_index: 0,
            full_rebuild: true,
            baked_strokes: 0,
            active_strokes: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.stroke_begin(&begin());
        tracer.surface_reset(&SurfaceResetEvent { restored: 0 });
    }

    #[test]
    fn counts_saturate() {
        assert_eq!(count(7), 7);
        assert_eq!(count(usize::MAX), u32::MAX);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            contacts: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_stroke_begin(&mut self, e: &StrokeBeginEvent) {
                self.contacts.push(e.contact.0);
            }
        }

        let mut sink = RecordingSink {
            contacts: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.stroke_begin(&begin());
        drop(tracer);
        assert_eq!(sink.contacts, &[3]);
    }
}
