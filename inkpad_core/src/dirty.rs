// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-rectangle accumulation.
//!
//! Every input batch reports the screen area it affected as a [`DirtyRect`].
//! Hosts use it to schedule a repaint of exactly that region instead of the
//! whole canvas.
//!
//! A sample only marks its own location; the stroke's width and antialiasing
//! fringe are covered by inflating the union by a fixed margin. The margin
//! must be at least the widest expected stroke plus the fringe.

use kurbo::{Point, Rect};

/// Default margin, in logical points, added around dirty sample locations.
pub const DEFAULT_MARGIN: f64 = 100.0;

/// A possibly-empty union of rectangles.
///
/// Unlike [`Rect`], the empty state is explicit: unioning a point into an
/// empty `DirtyRect` yields a zero-area rectangle at that point rather than
/// a rectangle stretched to include the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DirtyRect(Option<Rect>);

impl DirtyRect {
    /// The empty dirty rect.
    pub const EMPTY: Self = Self(None);

    /// Creates a dirty rect covering `rect`.
    #[must_use]
    pub const fn from_rect(rect: Rect) -> Self {
        Self(Some(rect))
    }

    /// Creates a dirty rect covering `point` inflated by `margin` on all sides.
    #[must_use]
    pub fn around(point: Point, margin: f64) -> Self {
        Self(Some(Rect::from_points(point, point).inflate(margin, margin)))
    }

    /// Returns `true` if nothing is dirty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the covered rectangle, if any.
    #[inline]
    #[must_use]
    pub const fn rect(&self) -> Option<Rect> {
        self.0
    }

    /// Extends this dirty rect to cover `rect`.
    pub fn add_rect(&mut self, rect: Rect) {
        self.0 = Some(match self.0 {
            Some(current) => current.union(rect),
            None => rect,
        });
    }

    /// Extends this dirty rect to cover `point` inflated by `margin`.
    pub fn add_point(&mut self, point: Point, margin: f64) {
        self.add_rect(Rect::from_points(point, point).inflate(margin, margin));
    }

    /// Extends this dirty rect to cover `other`.
    pub fn merge(&mut self, other: Self) {
        if let Some(rect) = other.0 {
            self.add_rect(rect);
        }
    }

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.merge(other);
        self
    }

    /// Returns `true` if `point` lies inside the covered area.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.0.is_some_and(|r| r.contains(point))
    }
}

impl From<Rect> for DirtyRect {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        let d = DirtyRect::default();
        assert!(d.is_empty());
        assert_eq!(d.rect(), None);
        assert!(!d.contains(Point::ZERO));
    }

    #[test]
    fn first_point_does_not_include_origin() {
        let mut d = DirtyRect::EMPTY;
        d.add_point(Point::new(500.0, 500.0), 10.0);
        assert_eq!(d.rect(), Some(Rect::new(490.0, 490.0, 510.0, 510.0)));
        assert!(!d.contains(Point::ZERO));
    }

    #[test]
    fn union_covers_both() {
        let a = DirtyRect::around(Point::new(0.0, 0.0), 1.0);
        let b = DirtyRect::around(Point::new(10.0, 20.0), 1.0);
        let u = a.union(b);
        assert_eq!(u.rect(), Some(Rect::new(-1.0, -1.0, 11.0, 21.0)));
    }

    #[test]
    fn merging_empty_is_identity() {
        let a = DirtyRect::around(Point::new(3.0, 4.0), 2.0);
        assert_eq!(a.union(DirtyRect::EMPTY), a);
        assert_eq!(DirtyRect::EMPTY.union(a), a);
    }
}
