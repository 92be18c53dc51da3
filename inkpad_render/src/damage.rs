// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage accumulation between repaints.
//!
//! Damage drains two ways: [`take_damage`](crate::CanvasSurface::take_damage)
//! empties it, and every served redraw removes the rectangles it covered.
//! Past a small count the rectangles collapse into their bounding box, so a
//! host that never drains still holds a bounded region.

use inkpad_core::dirty::DirtyRect;
use kurbo::Rect;

/// Rectangles kept before they collapse into their bounding box.
const MAX_RECTS: usize = 16;

/// The part of the surface that needs repainting.
///
/// Hosts drain it with [`CanvasSurface::take_damage`](crate::CanvasSurface::take_damage)
/// and repaint only what it names.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// The entire surface needs repainting.
    #[default]
    Full,
    /// Rectangles in logical coordinates that need repainting.
    Rects(Vec<Rect>),
    /// Nothing changed.
    None,
}

impl DamageRegion {
    /// Returns `true` if no region needs repainting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        match (&mut *self, other) {
            (Self::Full, _) | (_, Self::None) => {}
            (_, Self::Full) => *self = Self::Full,
            (Self::None, _) => *self = other.clone(),
            (Self::Rects(a), Self::Rects(b)) => {
                a.extend_from_slice(b);
                coalesce(a);
            }
        }
    }

    /// Adds a dirty rect. Empty rects are ignored.
    pub fn add_dirty(&mut self, dirty: DirtyRect) {
        let Some(rect) = dirty.rect() else {
            return;
        };
        match self {
            Self::Full => {}
            Self::Rects(rects) => {
                rects.push(rect);
                coalesce(rects);
            }
            Self::None => *self = Self::Rects(vec![rect]),
        }
    }

    /// Removes the damage a repaint of `served` took care of.
    ///
    /// Only the parts inside `surface` count: a rectangle is dropped once
    /// `served` covers its visible part. Full damage clears only when
    /// `served` covers the whole surface.
    pub fn subtract(&mut self, served: Rect, surface: Rect) {
        match self {
            Self::Full if covers(served, surface) => *self = Self::None,
            Self::Rects(rects) => {
                rects.retain(|r| {
                    let visible = r.intersect(surface);
                    visible.area() > 0.0 && !covers(served, visible)
                });
                if rects.is_empty() {
                    *self = Self::None;
                }
            }
            Self::Full | Self::None => {}
        }
    }

    /// Bounding box of the damage, or `None` when nothing or everything is
    /// damaged.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rects(rects) => rects.iter().copied().reduce(|a, b| a.union(b)),
            Self::Full | Self::None => None,
        }
    }
}

fn coalesce(rects: &mut Vec<Rect>) {
    if rects.len() <= MAX_RECTS {
        return;
    }
    if let Some(bounds) = rects.iter().copied().reduce(|a, b| a.union(b)) {
        rects.clear();
        rects.push(bounds);
    }
}

fn covers(outer: Rect, inner: Rect) -> bool {
    outer.union(inner) == outer
}

/// Receives the area invalidated by each input batch.
///
/// Hosts typically forward the rectangle to their view system to schedule
/// a partial repaint.
pub trait DamageListener {
    /// Called after an input batch with the area it changed, in logical
    /// coordinates. Not called when nothing changed.
    fn dirty_region_changed(&mut self, rect: Rect);
}

impl<F: FnMut(Rect)> DamageListener for F {
    fn dirty_region_changed(&mut self, rect: Rect) {
        self(rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn full_absorbs_everything() {
        let mut d = DamageRegion::Full;
        d.merge(&DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]));
        d.add_dirty(DirtyRect::around(Point::ZERO, 1.0));
        assert_eq!(d, DamageRegion::Full);
    }

    #[test]
    fn none_takes_other() {
        let mut d = DamageRegion::None;
        d.merge(&DamageRegion::None);
        assert!(d.is_empty());
        d.add_dirty(DirtyRect::EMPTY);
        assert!(d.is_empty());
        d.add_dirty(DirtyRect::around(Point::new(5.0, 5.0), 1.0));
        assert_eq!(d, DamageRegion::Rects(vec![Rect::new(4.0, 4.0, 6.0, 6.0)]));
    }

    #[test]
    fn rects_accumulate_and_bound() {
        let mut d = DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0)]);
        d.merge(&DamageRegion::Rects(vec![Rect::new(10.0, 10.0, 12.0, 13.0)]));
        assert_eq!(d.bounds(), Some(Rect::new(0.0, 0.0, 12.0, 13.0)));
        d.merge(&DamageRegion::Full);
        assert_eq!(d, DamageRegion::Full);
        assert_eq!(d.bounds(), None);
    }

    #[test]
    fn many_rects_collapse_to_bounds() {
        let mut d = DamageRegion::None;
        for i in 0..1000 {
            let x = f64::from(i);
            d.add_dirty(DirtyRect::from_rect(Rect::new(x, 0.0, x + 1.0, 2.0)));
            match &d {
                DamageRegion::Rects(rects) => assert!(rects.len() <= MAX_RECTS),
                other => panic!("expected rects, got {other:?}"),
            }
        }
        assert_eq!(d.bounds(), Some(Rect::new(0.0, 0.0, 1000.0, 2.0)));

        let mut merged = DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 1.0, 1.0); MAX_RECTS]);
        merged.merge(&DamageRegion::Rects(vec![Rect::new(5.0, 5.0, 6.0, 6.0)]));
        assert_eq!(merged, DamageRegion::Rects(vec![Rect::new(0.0, 0.0, 6.0, 6.0)]));
    }

    #[test]
    fn serving_a_region_removes_covered_rects() {
        let surface = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut d = DamageRegion::Rects(vec![
            Rect::new(10.0, 10.0, 20.0, 20.0),
            Rect::new(50.0, 50.0, 60.0, 60.0),
        ]);
        d.subtract(Rect::new(0.0, 0.0, 30.0, 30.0), surface);
        assert_eq!(d, DamageRegion::Rects(vec![Rect::new(50.0, 50.0, 60.0, 60.0)]));

        // Only the on-surface part has to be served.
        let mut d = DamageRegion::Rects(vec![Rect::new(-50.0, 80.0, 40.0, 200.0)]);
        d.subtract(Rect::new(0.0, 80.0, 40.0, 100.0), surface);
        assert!(d.is_empty());

        let mut d = DamageRegion::Full;
        d.subtract(Rect::new(0.0, 0.0, 30.0, 30.0), surface);
        assert_eq!(d, DamageRegion::Full);
        d.subtract(surface, surface);
        assert!(d.is_empty());
    }
}
