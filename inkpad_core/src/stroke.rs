// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stroke model: an ordered run of samples under a fixed style.

use alloc::vec::Vec;

use kurbo::{Point, Rect};

use crate::sample::{PendingProperties, Sample, SampleKind};
use crate::style::StrokeStyle;

/// Lifecycle state of a [`Stroke`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeState {
    /// Still receiving samples.
    #[default]
    Active,
    /// Finished; part of permanent history.
    Committed,
    /// Cancelled; must leave no trace.
    Discarded,
}

/// One contact's drawing: a style fixed at creation plus a growing sample
/// sequence.
///
/// Predicted samples, when present, always form a suffix of
/// [`samples`](Self::samples); the builder purges them before appending
/// anything else.
#[derive(Clone, Debug)]
pub struct Stroke {
    style: StrokeStyle,
    samples: Vec<Sample>,
    state: StrokeState,
    /// Bumped whenever a stored non-predicted sample is modified in place.
    revision: u64,
}

impl Stroke {
    /// Creates an empty active stroke.
    #[must_use]
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            style,
            samples: Vec::new(),
            state: StrokeState::Active,
            revision: 0,
        }
    }

    /// Creates a committed stroke from already-finalized samples.
    ///
    /// Used when loading persisted sketches. Predicted samples are dropped.
    #[must_use]
    pub fn committed(style: StrokeStyle, samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            style,
            samples: samples
                .into_iter()
                .filter(|s| !s.kind.is_predicted())
                .collect(),
            state: StrokeState::Committed,
            revision: 0,
        }
    }

    /// Returns the style.
    #[inline]
    #[must_use]
    pub const fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Returns all samples, predicted suffix included.
    #[inline]
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Returns the samples that will persist (everything but predictions).
    #[must_use]
    pub fn settled_samples(&self) -> &[Sample] {
        &self.samples[..self.settled_len()]
    }

    /// Returns the predicted suffix.
    #[must_use]
    pub fn predicted_samples(&self) -> &[Sample] {
        &self.samples[self.settled_len()..]
    }

    /// Number of non-predicted samples.
    #[must_use]
    pub fn settled_len(&self) -> usize {
        self.samples
            .iter()
            .rposition(|s| !s.kind.is_predicted())
            .map_or(0, |i| i + 1)
    }

    /// Returns the lifecycle state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> StrokeState {
        self.state
    }

    /// Returns the modification revision of the settled samples.
    #[inline]
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if the stroke holds no settled samples.
    ///
    /// Empty strokes (a tap cancelled before any movement) produce no mark.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settled_len() == 0
    }

    /// Bounding box of all sample locations, without any width allowance.
    #[must_use]
    pub fn sample_bounds(&self) -> Option<Rect> {
        let mut iter = self.samples.iter().map(|s| s.location);
        let first = iter.next()?;
        Some(iter.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
    }

    // -- Mutation (crate-internal, driven by the builder) --

    pub(crate) fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Removes the predicted suffix, calling `removed` with each removed
    /// location and the location that preceded it.
    pub(crate) fn purge_predicted(&mut self, mut removed: impl FnMut(Point, Option<Point>)) {
        let settled = self.settled_len();
        let mut previous = settled.checked_sub(1).map(|i| self.samples[i].location);
        for sample in &self.samples[settled..] {
            removed(sample.location, previous);
            previous = Some(sample.location);
        }
        self.samples.truncate(settled);
    }

    /// Moves the settled sample at `index` to `location`.
    pub(crate) fn relocate(&mut self, index: usize, location: Point) -> Option<Point> {
        let sample = self.samples.get_mut(index)?;
        debug_assert!(
            sample.kind != SampleKind::Predicted,
            "predicted samples are never refined"
        );
        let old = sample.location;
        sample.location = location;
        self.revision += 1;
        Some(old)
    }

    pub(crate) fn set_pending(&mut self, index: usize, pending: PendingProperties) {
        if let Some(sample) = self.samples.get_mut(index) {
            sample.pending = pending;
        }
    }

    /// Ends the stroke. Outstanding estimates are abandoned: refinements
    /// arriving after this point are ignored.
    pub(crate) fn finish(&mut self, state: StrokeState) {
        self.purge_predicted(|_, _| {});
        for sample in &mut self.samples {
            sample.correlation = None;
            sample.pending = PendingProperties::empty();
        }
        self.state = state;
    }
}

// The revision is bookkeeping for cached geometry, not content.
impl PartialEq for Stroke {
    fn eq(&self, other: &Self) -> bool {
        self.style == other.style && self.state == other.state && self.samples == other.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Tool;

    #[test]
    fn new_stroke_is_active_and_empty() {
        let stroke = Stroke::new(Tool::Pen.style());
        assert_eq!(stroke.state(), StrokeState::Active);
        assert!(stroke.is_empty());
        assert_eq!(stroke.sample_bounds(), None);
    }

    #[test]
    fn predicted_suffix_is_split_out() {
        let mut stroke = Stroke::new(Tool::Pen.style());
        stroke.push(Sample::final_at(1.0, 1.0));
        stroke.push(Sample::coalesced_at(2.0, 2.0));
        stroke.push(Sample::predicted_at(3.0, 3.0));
        stroke.push(Sample::predicted_at(4.0, 4.0));
        assert_eq!(stroke.settled_len(), 2);
        assert_eq!(stroke.predicted_samples().len(), 2);
        assert_eq!(stroke.settled_samples().len(), 2);
    }

    #[test]
    fn purge_reports_preceding_points() {
        let mut stroke = Stroke::new(Tool::Pen.style());
        stroke.push(Sample::final_at(1.0, 1.0));
        stroke.push(Sample::predicted_at(3.0, 3.0));
        stroke.push(Sample::predicted_at(4.0, 4.0));

        let mut seen = Vec::new();
        stroke.purge_predicted(|p, prev| seen.push((p, prev)));
        assert_eq!(
            seen,
            [
                (Point::new(3.0, 3.0), Some(Point::new(1.0, 1.0))),
                (Point::new(4.0, 4.0), Some(Point::new(3.0, 3.0))),
            ]
        );
        assert_eq!(stroke.samples().len(), 1);
    }

    #[test]
    fn committed_constructor_drops_predictions() {
        let stroke = Stroke::committed(
            Tool::Pencil.style(),
            [Sample::final_at(0.0, 0.0), Sample::predicted_at(1.0, 1.0)],
        );
        assert_eq!(stroke.state(), StrokeState::Committed);
        assert_eq!(stroke.samples().len(), 1);
    }

    #[test]
    fn relocate_bumps_revision() {
        let mut stroke = Stroke::new(Tool::Pen.style());
        stroke.push(Sample::final_at(1.0, 1.0));
        let before = stroke.revision();
        let old = stroke.relocate(0, Point::new(2.0, 2.0));
        assert_eq!(old, Some(Point::new(1.0, 1.0)));
        assert_eq!(stroke.revision(), before + 1);
        assert_eq!(stroke.relocate(5, Point::ZERO), None);
    }

    #[test]
    fn bounds_cover_every_sample() {
        let mut stroke = Stroke::new(Tool::Pen.style());
        stroke.push(Sample::final_at(5.0, 1.0));
        stroke.push(Sample::final_at(-2.0, 8.0));
        assert_eq!(stroke.sample_bounds(), Some(Rect::new(-2.0, 1.0, 5.0, 8.0)));
    }
}
