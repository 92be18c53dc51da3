// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`]. Floats are stored as their raw bits,
//! so decoded values compare equal to the originals.

use inkpad_core::contact::{ContactId, CorrelationId};
use inkpad_core::stroke::StrokeState;
use inkpad_core::trace::{
    CommitEvent, DirtyRectEvent, RedrawEvent, RefineEvent, SamplesEvent, StrokeBeginEvent,
    StrokeEndEvent, SurfaceResetEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_STROKE_BEGIN: u8 = 1;
const TAG_SAMPLES: u8 = 2;
const TAG_REFINE: u8 = 3;
const TAG_STROKE_END: u8 = 4;
const TAG_COMMIT: u8 = 5;
const TAG_REDRAW: u8 = 6;
const TAG_SURFACE_RESET: u8 = 7;
const TAG_DIRTY_RECT: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

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

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_state(&mut self, s: StrokeState) {
        self.write_u8(match s {
            StrokeState::Active => 0,
            StrokeState::Committed => 1,
            StrokeState::Discarded => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_stroke_begin(&mut self, e: &StrokeBeginEvent) {
        self.write_u8(TAG_STROKE_BEGIN);
        self.write_u64(e.contact.0);
        self.write_u32(e.width.to_bits());
        self.write_bool(e.replaced);
    }

    fn on_samples(&mut self, e: &SamplesEvent) {
        self.write_u8(TAG_SAMPLES);
        self.write_u64(e.contact.0);
        self.write_u32(e.settled);
        self.write_u32(e.predicted);
        self.write_u32(e.total);
    }

    fn on_refine(&mut self, e: &RefineEvent) {
        self.write_u8(TAG_REFINE);
        self.write_u64(e.contact.0);
        self.write_u64(e.correlation.0);
        self.write_bool(e.applied);
    }

    fn on_stroke_end(&mut self, e: &StrokeEndEvent) {
        self.write_u8(TAG_STROKE_END);
        self.write_u64(e.contact.0);
        self.write_state(e.state);
        self.write_u32(e.samples);
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.write_u8(TAG_COMMIT);
        self.write_u32(e.index);
        self.write_u32(e.samples);
        self.write_bool(e.baked);
    }

    fn on_redraw(&mut self, e: &RedrawEvent) {
        self.write_u8(TAG_REDRAW);
        self.write_u64(e.frame_index);
        self.write_bool(e.full_rebuild);
        self.write_u32(e.baked_strokes);
        self.write_u32(e.active_strokes);
    }

    fn on_surface_reset(&mut self, e: &SurfaceResetEvent) {
        self.write_u8(TAG_SURFACE_RESET);
        self.write_u32(e.restored);
    }

    fn on_dirty_rect(&mut self, e: &DirtyRectEvent) {
        self.write_u8(TAG_DIRTY_RECT);
        self.write_u64(e.contact.0);
        self.write_f64(e.x0);
        self.write_f64(e.y0);
        self.write_f64(e.x1);
        self.write_f64(e.y1);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`StrokeBeginEvent`].
    StrokeBegin(StrokeBeginEvent),
    /// A [`SamplesEvent`].
    Samples(SamplesEvent),
    /// A [`RefineEvent`].
    Refine(RefineEvent),
    /// A [`StrokeEndEvent`].
    StrokeEnd(StrokeEndEvent),
    /// A [`CommitEvent`].
    Commit(CommitEvent),
    /// A [`RedrawEvent`].
    Redraw(RedrawEvent),
    /// A [`SurfaceResetEvent`].
    SurfaceReset(SurfaceResetEvent),
    /// A [`DirtyRectEvent`].
    DirtyRect(DirtyRectEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.data.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_contact(&mut self) -> Option<ContactId> {
        self.read_u64().map(ContactId)
    }

    fn read_state(&mut self) -> Option<StrokeState> {
        Some(match self.read_u8()? {
            0 => StrokeState::Active,
            1 => StrokeState::Committed,
            _ => StrokeState::Discarded,
        })
    }

    fn decode_stroke_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StrokeBegin(StrokeBeginEvent {
            contact: self.read_contact()?,
            width: f32::from_bits(self.read_u32()?),
            replaced: self.read_bool()?,
        }))
    }

    fn decode_samples(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Samples(SamplesEvent {
            contact: self.read_contact()?,
            settled: self.read_u32()?,
            predicted: self.read_u32()?,
            total: self.read_u32()?,
        }))
    }

    fn decode_refine(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Refine(RefineEvent {
            contact: self.read_contact()?,
            correlation: CorrelationId(self.read_u64()?),
            applied: self.read_bool()?,
        }))
    }

    fn decode_stroke_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StrokeEnd(StrokeEndEvent {
            contact: self.read_contact()?,
            state: self.read_state()?,
            samples: self.read_u32()?,
        }))
    }

    fn decode_commit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Commit(CommitEvent {
            index: self.read_u32()?,
            samples: self.read_u32()?,
            baked: self.read_bool()?,
        }))
    }

    fn decode_redraw(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Redraw(RedrawEvent {
            frame_index: self.read_u64()?,
            full_rebuild: self.read_bool()?,
            baked_strokes: self.read_u32()?,
            active_strokes: self.read_u32()?,
        }))
    }

    fn decode_surface_reset(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SurfaceReset(SurfaceResetEvent {
            restored: self.read_u32()?,
        }))
    }

    fn decode_dirty_rect(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::DirtyRect(DirtyRectEvent {
            contact: self.read_contact()?,
            x0: self.read_f64()?,
            y0: self.read_f64()?,
            x1: self.read_f64()?,
            y1: self.read_f64()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_STROKE_BEGIN => self.decode_stroke_begin(),
            TAG_SAMPLES => self.decode_samples(),
            TAG_REFINE => self.decode_refine(),
            TAG_STROKE_END => self.decode_stroke_end(),
            TAG_COMMIT => self.decode_commit(),
            TAG_REDRAW => self.decode_redraw(),
            TAG_SURFACE_RESET => self.decode_surface_reset(),
            TAG_DIRTY_RECT => self.decode_dirty_rect(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
