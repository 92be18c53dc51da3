// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host input entry points.
//!
//! Each callback forwards to the surface's
//! [`StrokeBuilder`](inkpad_core::builder::StrokeBuilder), folds the
//! resulting dirty rect into the accumulated damage, and notifies the
//! [`DamageListener`](crate::DamageListener). Ending a contact commits its
//! stroke; cancelling one never does.

use inkpad_core::contact::{ContactId, CorrelationId};
use inkpad_core::dirty::DirtyRect;
use inkpad_core::sample::{PendingProperties, Sample};
use inkpad_core::stroke::Stroke;
use inkpad_core::style::StrokeStyle;
use inkpad_core::trace::{self, RefineEvent, SamplesEvent, StrokeBeginEvent, StrokeEndEvent};
use kurbo::Point;

use crate::{CanvasSurface, SurfaceError};

/// How [`CanvasSurface::on_contact_begin`] handled the contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeginOutcome {
    /// A new stroke began.
    Began,
    /// The contact already had an active stroke, which was discarded.
    Replaced,
}

impl CanvasSurface {
    /// A contact touched down.
    ///
    /// A contact that is already active indicates lost input events; its
    /// stroke is discarded and a fresh one begins.
    pub fn on_contact_begin(
        &mut self,
        contact: ContactId,
        style: StrokeStyle,
    ) -> Result<BeginOutcome, SurfaceError> {
        let previous = self.builder.replace_stroke(contact, style)?;
        let outcome = match previous {
            Some(stroke) => {
                log::warn!("contact {contact} began twice; discarding its active stroke");
                self.notify(discarded_area(&stroke, self.config.builder.dirty_margin));
                BeginOutcome::Replaced
            }
            None => BeginOutcome::Began,
        };
        self.tracer().stroke_begin(&StrokeBeginEvent {
            contact,
            width: style.width,
            replaced: outcome == BeginOutcome::Replaced,
        });
        Ok(outcome)
    }

    /// New samples for an active contact.
    pub fn on_contact_move(
        &mut self,
        contact: ContactId,
        samples: &[Sample],
        predicted: &[Sample],
    ) -> Result<DirtyRect, SurfaceError> {
        let dirty = self.apply_batch(contact, samples, predicted)?;
        self.notify(dirty);
        Ok(dirty)
    }

    /// A contact lifted: applies its last samples and commits the stroke.
    ///
    /// Predictions in the final batch are dropped with the rest of the
    /// stroke's predictions.
    pub fn on_contact_end(
        &mut self,
        contact: ContactId,
        samples: &[Sample],
        predicted: &[Sample],
    ) -> Result<DirtyRect, SurfaceError> {
        let batch = self.apply_batch(contact, samples, predicted)?;
        self.damage.add_dirty(batch);
        let stroke = self.builder.end_stroke(contact)?;
        self.trace_end(contact, &stroke);
        // Commit records its own damage.
        let dirty = batch.union(self.commit_stroke(stroke));
        self.signal(dirty);
        Ok(dirty)
    }

    /// The host cancelled a contact. Its stroke leaves no trace.
    pub fn on_contact_cancel(&mut self, contact: ContactId) -> Result<DirtyRect, SurfaceError> {
        let stroke = self.builder.cancel_stroke(contact)?;
        self.trace_end(contact, &stroke);
        let dirty = discarded_area(&stroke, self.config.builder.dirty_margin);
        self.notify(dirty);
        Ok(dirty)
    }

    /// A refinement for an earlier estimated sample.
    ///
    /// Refinements for unknown contacts or ids are ignored.
    pub fn on_sample_refinement(
        &mut self,
        contact: ContactId,
        correlation: CorrelationId,
        location: Point,
        remaining: PendingProperties,
    ) -> DirtyRect {
        let tracked = self.builder.pending_refinements(contact);
        let dirty = self
            .builder
            .refine_sample(contact, correlation, location, remaining);
        let applied =
            !dirty.is_empty() || self.builder.pending_refinements(contact) < tracked;
        self.tracer().refine(&RefineEvent {
            contact,
            correlation,
            applied,
        });
        self.notify(dirty);
        dirty
    }

    fn apply_batch(
        &mut self,
        contact: ContactId,
        samples: &[Sample],
        predicted: &[Sample],
    ) -> Result<DirtyRect, SurfaceError> {
        let dirty = self.builder.add_samples(contact, samples, predicted)?;
        let total = self
            .builder
            .stroke(contact)
            .map_or(0, |stroke| stroke.samples().len());
        let event = SamplesEvent {
            contact,
            settled: trace::count(samples.len()),
            predicted: trace::count(predicted.len()),
            total: trace::count(total),
        };
        let mut tracer = self.tracer();
        tracer.samples(&event);
        #[cfg(feature = "trace-rich")]
        if let Some(rect) = dirty.rect() {
            tracer.dirty_rect(&trace::DirtyRectEvent {
                contact,
                x0: rect.x0,
                y0: rect.y0,
                x1: rect.x1,
                y1: rect.y1,
            });
        }
        Ok(dirty)
    }

    fn trace_end(&mut self, contact: ContactId, stroke: &Stroke) {
        self.tracer().stroke_end(&StrokeEndEvent {
            contact,
            state: stroke.state(),
            samples: trace::count(stroke.samples().len()),
        });
    }

    fn notify(&mut self, dirty: DirtyRect) {
        self.damage.add_dirty(dirty);
        self.signal(dirty);
    }

    fn signal(&mut self, dirty: DirtyRect) {
        if let (Some(rect), Some(listener)) = (dirty.rect(), self.listener.as_mut()) {
            listener.dirty_region_changed(rect);
        }
    }
}

/// Area an abandoned in-flight stroke was drawn over.
fn discarded_area(stroke: &Stroke, margin: f64) -> DirtyRect {
    stroke
        .sample_bounds()
        .map_or(DirtyRect::EMPTY, |r| DirtyRect::from_rect(r.inflate(margin, margin)))
}
