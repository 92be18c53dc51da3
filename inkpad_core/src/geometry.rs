// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental stroke smoothing.
//!
//! [`PathGeometry`] turns a stroke's settled samples into cubic Bézier
//! segments using a sliding five-point window:
//!
//! ```text
//!   accepted:  p0  p1  p2  p3  p4
//!   emit:      curve_to(p1, p2, mid(p2, p4))
//!   slide:     [mid(p2, p4), p4]   (three more points until the next emit)
//! ```
//!
//! A location joins the window only if its squared distance from the last
//! accepted location is at least the configured threshold, which filters
//! jitter from noisy digitizers.
//!
//! Emitted segments are cached. A cursor records how many settled samples
//! have been consumed, so each update walks only the samples that arrived
//! since the previous one; a long gesture costs O(new samples) per frame
//! instead of O(all samples). Predicted samples are never consumed: they
//! only extend the provisional tail returned with each [`StrokeCurve`].
//!
//! Every emitted segment records a checkpoint of the walk. When a consumed
//! sample is refined after the fact, [`rewind`](PathGeometry::rewind) rolls
//! back to the last checkpoint taken before that sample and only the samples
//! after it are walked again. Any other change to the stroke's
//! [revision](Stroke::revision) rebuilds the cache from scratch.

use alloc::vec::Vec;

use kurbo::{BezPath, PathEl, Point, Rect, Shape};

use crate::dirty::DirtyRect;
use crate::sample::Sample;
use crate::stroke::Stroke;

/// Default squared distance, in logical points, below which a new location
/// is treated as jitter.
pub const DEFAULT_MIN_DISTANCE_SQ: f64 = 1.0;

/// Number of accepted locations that produce the first segment.
const WINDOW: usize = 5;

/// Walk state right after an emit.
///
/// Depends only on the samples before `cursor`.
#[derive(Clone, Copy, Debug)]
struct Checkpoint {
    cursor: usize,
    elements: usize,
    /// Window contents: the segment end and the last accepted location.
    window: [Point; 2],
    accepted: usize,
    segments: usize,
}

/// Cached, incrementally extended geometry for one stroke.
#[derive(Clone, Debug)]
pub struct PathGeometry {
    min_distance_sq: f64,
    committed: BezPath,
    window: [Point; WINDOW],
    window_len: usize,
    last_accepted: Option<Point>,
    /// Settled samples consumed so far.
    cursor: usize,
    /// Stroke revision the cache was built from.
    revision: u64,
    accepted: usize,
    segments: usize,
    /// Lifetime count of samples walked, including rebuilds.
    processed: u64,
    checkpoints: Vec<Checkpoint>,
}

impl Default for PathGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISTANCE_SQ)
    }
}

impl PathGeometry {
    /// Creates empty geometry with the given jitter threshold.
    #[must_use]
    pub fn new(min_distance_sq: f64) -> Self {
        Self {
            min_distance_sq,
            committed: BezPath::new(),
            window: [Point::ZERO; WINDOW],
            window_len: 0,
            last_accepted: None,
            cursor: 0,
            revision: 0,
            accepted: 0,
            segments: 0,
            processed: 0,
            checkpoints: Vec::new(),
        }
    }

    /// Builds geometry for a complete stroke in one pass.
    #[must_use]
    pub fn for_stroke(stroke: &Stroke, min_distance_sq: f64) -> Self {
        let mut geometry = Self::new(min_distance_sq);
        geometry.update(stroke);
        geometry
    }

    /// Consumes settled samples that arrived since the last update.
    ///
    /// Returns the number of samples walked.
    pub fn update(&mut self, stroke: &Stroke) -> usize {
        let settled = stroke.settled_samples();
        if stroke.revision() != self.revision || settled.len() < self.cursor {
            log::trace!(
                "rebuilding stroke geometry (revision {} -> {})",
                self.revision,
                stroke.revision()
            );
            self.reset();
            self.revision = stroke.revision();
        }

        let fresh = &settled[self.cursor..];
        for sample in fresh {
            self.cursor += 1;
            self.accept(sample.location);
        }
        self.processed += fresh.len() as u64;
        fresh.len()
    }

    /// Discards cached state derived from the settled sample at `index`,
    /// which was relocated once since the last update.
    ///
    /// Rolls back to the last checkpoint taken before `index` and adopts the
    /// stroke's current revision, so the next [`update`](Self::update) walks
    /// only the samples from that checkpoint on. If the cache has missed
    /// any other change it is cleared instead.
    ///
    /// Returns the area of the discarded segments and provisional tail,
    /// inflated by `margin`.
    pub fn rewind(&mut self, stroke: &Stroke, index: usize, margin: f64) -> DirtyRect {
        let mut dirty = DirtyRect::EMPTY;
        let in_sync = self.revision.wrapping_add(1) == stroke.revision();
        if !in_sync || index < self.cursor {
            while self
                .checkpoints
                .last()
                .is_some_and(|c| !in_sync || c.cursor > index)
            {
                self.checkpoints.pop();
            }
            let checkpoint = self.checkpoints.last().copied();
            let kept = checkpoint.map_or(0, |c| c.elements);
            dirty = self.pending_region(margin);
            for el in &self.committed.elements()[kept..] {
                add_element(&mut dirty, el, margin);
            }
            match checkpoint {
                Some(checkpoint) => self.restore(checkpoint),
                None => self.reset(),
            }
            dirty.merge(self.pending_region(margin));
        }
        self.revision = stroke.revision();
        dirty
    }

    /// Brings the cache up to date and returns a drawable handle.
    ///
    /// Calling this repeatedly as a stroke grows never re-walks samples that
    /// were already consumed.
    pub fn curve_for_stroke(&mut self, stroke: &Stroke) -> StrokeCurve<'_> {
        self.update(stroke);
        self.curve(stroke.predicted_samples())
    }

    /// Returns a drawable handle for the current cache plus `predicted`.
    ///
    /// Does not consume new samples; call [`update`](Self::update) first.
    #[must_use]
    pub fn curve(&self, predicted: &[Sample]) -> StrokeCurve<'_> {
        let mut tail = Vec::with_capacity(self.window_len.saturating_sub(1) + predicted.len());
        if self.window_len > 1 {
            tail.extend_from_slice(&self.window[1..self.window_len]);
        }
        if self.last_accepted.is_some() {
            tail.extend(predicted.iter().map(|s| s.location));
        }
        StrokeCurve {
            committed: &self.committed,
            tail,
        }
    }

    /// Area affected by appending `new_samples` to the stroke, inflated by
    /// `margin`.
    ///
    /// Covers the new locations plus every point still buffered in the
    /// window, since the next emitted segment replaces the provisional tail
    /// drawn through them.
    #[must_use]
    pub fn dirty_region(&self, new_samples: &[Sample], margin: f64) -> DirtyRect {
        let mut dirty = self.pending_region(margin);
        for sample in new_samples {
            dirty.add_point(sample.location, margin);
        }
        dirty
    }

    /// Area covered by the buffered window, inflated by `margin`.
    #[must_use]
    pub fn pending_region(&self, margin: f64) -> DirtyRect {
        let mut dirty = DirtyRect::EMPTY;
        for &point in &self.window[..self.window_len] {
            dirty.add_point(point, margin);
        }
        dirty
    }

    /// Number of cubic segments emitted.
    #[inline]
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.segments
    }

    /// Number of locations that passed the jitter filter.
    #[inline]
    #[must_use]
    pub const fn accepted_count(&self) -> usize {
        self.accepted
    }

    /// Lifetime number of samples walked, rebuilds included.
    #[inline]
    #[must_use]
    pub const fn processed_samples(&self) -> u64 {
        self.processed
    }

    /// Number of settled samples consumed into the cache.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The cached segments.
    #[inline]
    #[must_use]
    pub const fn committed_path(&self) -> &BezPath {
        &self.committed
    }

    fn reset(&mut self) {
        self.checkpoints.clear();
        self.committed.truncate(0);
        self.window_len = 0;
        self.last_accepted = None;
        self.cursor = 0;
        self.accepted = 0;
        self.segments = 0;
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.committed.truncate(checkpoint.elements);
        self.window[..2].copy_from_slice(&checkpoint.window);
        self.window_len = 2;
        self.last_accepted = Some(checkpoint.window[1]);
        self.cursor = checkpoint.cursor;
        self.accepted = checkpoint.accepted;
        self.segments = checkpoint.segments;
    }

    fn accept(&mut self, point: Point) {
        let emitted = match self.last_accepted {
            None => {
                self.committed.move_to(point);
                self.window[0] = point;
                self.window_len = 1;
                false
            }
            Some(last) if last.distance_squared(point) < self.min_distance_sq => return,
            Some(_) => {
                self.window[self.window_len] = point;
                self.window_len += 1;
                self.window_len == WINDOW
            }
        };
        if emitted {
            self.emit();
        }
        self.last_accepted = Some(point);
        self.accepted += 1;
        if emitted {
            self.checkpoints.push(Checkpoint {
                cursor: self.cursor,
                elements: self.committed.elements().len(),
                window: [self.window[0], self.window[1]],
                accepted: self.accepted,
                segments: self.segments,
            });
        }
    }

    fn emit(&mut self) {
        let [_, c1, c2, _, next] = self.window;
        let end = c2.midpoint(next);
        self.committed.curve_to(c1, c2, end);
        self.window[0] = end;
        self.window[1] = next;
        self.window_len = 2;
        self.segments += 1;
    }
}

fn add_element(dirty: &mut DirtyRect, el: &PathEl, margin: f64) {
    match *el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => dirty.add_point(p, margin),
        PathEl::QuadTo(a, b) => {
            dirty.add_point(a, margin);
            dirty.add_point(b, margin);
        }
        PathEl::CurveTo(a, b, c) => {
            dirty.add_point(a, margin);
            dirty.add_point(b, margin);
            dirty.add_point(c, margin);
        }
        PathEl::ClosePath => {}
    }
}

/// A drawable view of a stroke's geometry.
///
/// Consists of the cached segments followed by a provisional polyline
/// through the points not yet smoothed and any predicted samples. The tail
/// continues from the committed path's current point.
#[derive(Clone, Debug)]
pub struct StrokeCurve<'a> {
    committed: &'a BezPath,
    tail: Vec<Point>,
}

impl StrokeCurve<'_> {
    /// The cached segments.
    #[must_use]
    pub fn committed(&self) -> &BezPath {
        self.committed
    }

    /// Points of the provisional tail.
    #[must_use]
    pub fn tail(&self) -> &[Point] {
        &self.tail
    }

    /// Returns `true` if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Iterates over the path elements, committed segments first.
    pub fn elements(&self) -> impl Iterator<Item = PathEl> + '_ {
        self.committed
            .elements()
            .iter()
            .copied()
            .chain(self.tail.iter().map(|&p| PathEl::LineTo(p)))
    }

    /// Collects the full curve into an owned path.
    #[must_use]
    pub fn to_bez_path(&self) -> BezPath {
        BezPath::from_vec(self.elements().collect())
    }

    /// Bounding box of the curve's geometry (control points included in
    /// the committed part), without any stroke-width allowance.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let mut bounds = self.committed.bounding_box();
        for &p in &self.tail {
            bounds = bounds.union_pt(p);
        }
        Some(bounds)
    }
}
