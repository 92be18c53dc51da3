// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-contact stroke accumulation.
//!
//! [`StrokeBuilder`] holds at most one active [`Stroke`] per [`ContactId`].
//! Each input batch addressed to a contact first purges the stroke's
//! predicted suffix, then appends the settled samples, then the new
//! predictions. The returned [`DirtyRect`] covers everything that moved.
//!
//! Samples that arrive with estimated properties are remembered in a side
//! table keyed by [`CorrelationId`] so a later refinement can find them.
//! Refinements for contacts or ids the builder no longer knows about are
//! ignored: they routinely race with the end of a gesture.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map::Entry;

use kurbo::Point;
use thiserror::Error;

use crate::contact::{ContactId, CorrelationId};
use crate::dirty::{DEFAULT_MARGIN, DirtyRect};
use crate::geometry::{DEFAULT_MIN_DISTANCE_SQ, PathGeometry, StrokeCurve};
use crate::sample::{PendingProperties, Sample, SampleKind};
use crate::stroke::{Stroke, StrokeState};
use crate::style::StrokeStyle;

/// Tuning for a [`StrokeBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuilderConfig {
    /// Margin added around changed sample locations in dirty rects. Must
    /// cover the widest stroke plus the antialiasing fringe.
    pub dirty_margin: f64,
    /// Squared distance below which a new location is treated as jitter.
    pub min_distance_sq: f64,
    /// Settled samples kept per stroke; later ones are dropped.
    pub max_samples_per_stroke: usize,
}

impl BuilderConfig {
    /// The default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dirty_margin: DEFAULT_MARGIN,
            min_distance_sq: DEFAULT_MIN_DISTANCE_SQ,
            max_samples_per_stroke: 100_000,
        }
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Input sequencing faults.
///
/// These indicate that the host and the builder disagree about which
/// contacts are live.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum BuilderError {
    /// A stroke is already active for the contact.
    #[error("contact {0} already has an active stroke")]
    AlreadyActive(ContactId),
    /// No stroke is active for the contact.
    #[error("no active stroke for contact {0}")]
    NoActiveStroke(ContactId),
    /// The style's width is not finite and positive.
    #[error("invalid stroke width {0}")]
    InvalidWidth(f32),
}

#[derive(Clone, Debug)]
struct ActiveStroke {
    stroke: Stroke,
    geometry: PathGeometry,
    /// Index of each sample still awaiting refinement.
    pending: BTreeMap<CorrelationId, usize>,
    capped: bool,
}

impl ActiveStroke {
    fn new(style: StrokeStyle, config: &BuilderConfig) -> Self {
        Self {
            stroke: Stroke::new(style),
            geometry: PathGeometry::new(config.min_distance_sq),
            pending: BTreeMap::new(),
            capped: false,
        }
    }
}

/// Accumulates input batches into per-contact strokes.
#[derive(Clone, Debug, Default)]
pub struct StrokeBuilder {
    config: BuilderConfig,
    active: BTreeMap<ContactId, ActiveStroke>,
}

impl StrokeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            active: BTreeMap::new(),
        }
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Begins a stroke for `contact`.
    ///
    /// Fails with [`BuilderError::AlreadyActive`] if the contact already
    /// has one; the existing stroke is left untouched. See
    /// [`replace_stroke`](Self::replace_stroke) for the recovering variant.
    pub fn begin_stroke(
        &mut self,
        contact: ContactId,
        style: StrokeStyle,
    ) -> Result<&Stroke, BuilderError> {
        validate(&style)?;
        match self.active.entry(contact) {
            Entry::Occupied(_) => Err(BuilderError::AlreadyActive(contact)),
            Entry::Vacant(slot) => {
                log::debug!("begin stroke for contact {contact}");
                Ok(&slot.insert(ActiveStroke::new(style, &self.config)).stroke)
            }
        }
    }

    /// Begins a stroke for `contact`, discarding any stroke already active
    /// for it.
    ///
    /// Returns the discarded stroke, if there was one.
    pub fn replace_stroke(
        &mut self,
        contact: ContactId,
        style: StrokeStyle,
    ) -> Result<Option<Stroke>, BuilderError> {
        validate(&style)?;
        let previous = self
            .active
            .insert(contact, ActiveStroke::new(style, &self.config))
            .map(|entry| {
                let mut stroke = entry.stroke;
                stroke.finish(StrokeState::Discarded);
                stroke
            });
        if previous.is_some() {
            log::debug!("replaced active stroke for contact {contact}");
        }
        Ok(previous)
    }

    /// Applies one input batch to the contact's stroke.
    ///
    /// Samples in `batch` tagged [`SampleKind::Predicted`] are handled like
    /// those in `predicted`. Empty input only purges stale predictions.
    pub fn add_samples(
        &mut self,
        contact: ContactId,
        batch: &[Sample],
        predicted: &[Sample],
    ) -> Result<DirtyRect, BuilderError> {
        let margin = self.config.dirty_margin;
        let cap = self.config.max_samples_per_stroke;
        let entry = self
            .active
            .get_mut(&contact)
            .ok_or(BuilderError::NoActiveStroke(contact))?;

        let mut dirty = DirtyRect::EMPTY;
        let mut purged = 0_usize;
        entry.stroke.purge_predicted(|removed, previous| {
            dirty.add_point(removed, margin);
            if let Some(previous) = previous {
                dirty.add_point(previous, margin);
            }
            purged += 1;
        });

        let mut appended = false;
        if !batch.is_empty() || !predicted.is_empty() {
            // The new segment connects to what is currently drawn.
            if let Some(last) = entry.stroke.samples().last() {
                dirty.add_point(last.location, margin);
            }
            dirty.merge(entry.geometry.pending_region(margin));
        }

        for sample in batch.iter().filter(|s| !s.kind.is_predicted()) {
            if entry.stroke.settled_len() >= cap {
                if !entry.capped {
                    entry.capped = true;
                    log::warn!(
                        "stroke for contact {contact} reached {cap} samples; dropping further input"
                    );
                }
                break;
            }
            let index = entry.stroke.samples().len();
            if let Some(id) = sample.correlation.filter(|_| sample.awaits_refinement()) {
                entry.pending.insert(id, index);
            }
            entry.stroke.push(*sample);
            dirty.add_point(sample.location, margin);
            appended = true;
        }

        let predictions = batch
            .iter()
            .filter(|s| s.kind.is_predicted())
            .chain(predicted);
        for sample in predictions {
            entry.stroke.push(Sample::new(sample.location, SampleKind::Predicted));
            dirty.add_point(sample.location, margin);
        }

        if appended {
            entry.geometry.update(&entry.stroke);
            dirty.merge(entry.geometry.pending_region(margin));
        }

        log::trace!(
            "contact {contact}: +{} samples, +{} predicted, {purged} purged",
            batch.len(),
            predicted.len()
        );
        Ok(dirty)
    }

    /// Applies a late refinement to an estimated sample.
    ///
    /// Unknown contacts and correlation ids are ignored and yield an empty
    /// rect. Once `remaining` is empty the sample is no longer tracked.
    pub fn refine_sample(
        &mut self,
        contact: ContactId,
        correlation: CorrelationId,
        location: Point,
        remaining: PendingProperties,
    ) -> DirtyRect {
        let margin = self.config.dirty_margin;
        let Some(entry) = self.active.get_mut(&contact) else {
            log::trace!("ignoring refinement for inactive contact {contact}");
            return DirtyRect::EMPTY;
        };
        let Some(&index) = entry.pending.get(&correlation) else {
            log::trace!("ignoring unknown refinement {correlation:?} for contact {contact}");
            return DirtyRect::EMPTY;
        };

        let mut dirty = DirtyRect::EMPTY;
        let old = entry
            .stroke
            .samples()
            .get(index)
            .map(|s| s.location)
            .filter(|&old| old != location);
        if let Some(old) = old {
            entry.stroke.relocate(index, location);
            dirty.add_point(old, margin);
            // Everything after the rollback point is walked and drawn again.
            dirty.merge(entry.geometry.rewind(&entry.stroke, index, margin));
            for sample in &entry.stroke.samples()[entry.geometry.cursor()..] {
                dirty.add_point(sample.location, margin);
            }
        }

        entry.stroke.set_pending(index, remaining);
        if remaining.is_empty() {
            entry.pending.remove(&correlation);
        }
        dirty
    }

    /// Ends the contact's stroke and returns it, committed.
    pub fn end_stroke(&mut self, contact: ContactId) -> Result<Stroke, BuilderError> {
        self.finish(contact, StrokeState::Committed)
    }

    /// Cancels the contact's stroke and returns it, discarded.
    pub fn cancel_stroke(&mut self, contact: ContactId) -> Result<Stroke, BuilderError> {
        self.finish(contact, StrokeState::Discarded)
    }

    fn finish(&mut self, contact: ContactId, state: StrokeState) -> Result<Stroke, BuilderError> {
        let entry = self
            .active
            .remove(&contact)
            .ok_or(BuilderError::NoActiveStroke(contact))?;
        if !entry.pending.is_empty() {
            log::debug!(
                "contact {contact} finished with {} unrefined samples",
                entry.pending.len()
            );
        }
        let mut stroke = entry.stroke;
        stroke.finish(state);
        log::debug!(
            "stroke for contact {contact} {state:?} with {} samples",
            stroke.samples().len()
        );
        Ok(stroke)
    }

    /// Discards every active stroke.
    pub fn clear(&mut self) {
        if !self.active.is_empty() {
            log::debug!("discarding {} active strokes", self.active.len());
        }
        self.active.clear();
    }

    /// Number of active strokes.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if `contact` has an active stroke.
    #[must_use]
    pub fn is_active(&self, contact: ContactId) -> bool {
        self.active.contains_key(&contact)
    }

    /// Returns the contact's active stroke.
    #[must_use]
    pub fn stroke(&self, contact: ContactId) -> Option<&Stroke> {
        self.active.get(&contact).map(|entry| &entry.stroke)
    }

    /// Number of samples of the contact's stroke still awaiting refinement.
    #[must_use]
    pub fn pending_refinements(&self, contact: ContactId) -> usize {
        self.active.get(&contact).map_or(0, |entry| entry.pending.len())
    }

    /// Iterates over active strokes in contact order.
    pub fn active_strokes(&self) -> impl Iterator<Item = (ContactId, &Stroke)> + '_ {
        self.active.iter().map(|(id, entry)| (*id, &entry.stroke))
    }

    /// Returns the drawable curve of the contact's stroke.
    pub fn curve(&mut self, contact: ContactId) -> Option<StrokeCurve<'_>> {
        let entry = self.active.get_mut(&contact)?;
        Some(entry.geometry.curve_for_stroke(&entry.stroke))
    }

    /// Iterates over the drawable curves of all active strokes, in contact
    /// order, alongside their styles.
    pub fn curves(&mut self) -> impl Iterator<Item = (&StrokeStyle, StrokeCurve<'_>)> + '_ {
        self.active.values_mut().map(|entry| {
            let ActiveStroke {
                stroke, geometry, ..
            } = entry;
            let stroke: &Stroke = stroke;
            (stroke.style(), geometry.curve_for_stroke(stroke))
        })
    }
}

fn validate(style: &StrokeStyle) -> Result<(), BuilderError> {
    if style.has_valid_width() {
        Ok(())
    } else {
        Err(BuilderError::InvalidWidth(style.width))
    }
}
