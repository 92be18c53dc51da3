// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input observations.
//!
//! A [`Sample`] is one observed pointer position. Input arrives in batches:
//! the last sample of a batch is [`SampleKind::Final`], the ones the input
//! system merged in between are [`SampleKind::Coalesced`], and speculative
//! positions ahead of the finger are [`SampleKind::Predicted`]. Predictions
//! are never correct; they are drawn for one frame and then replaced.

use bitflags::bitflags;
use kurbo::Point;

use crate::contact::CorrelationId;

/// Stability classification of a [`Sample`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SampleKind {
    /// The sample reported for the input event itself.
    #[default]
    Final,
    /// An intermediate sample merged into the event by the input system.
    Coalesced,
    /// A speculative sample; discarded on the next batch.
    Predicted,
}

impl SampleKind {
    /// Returns `true` for [`Predicted`](Self::Predicted) samples.
    #[inline]
    #[must_use]
    pub const fn is_predicted(self) -> bool {
        matches!(self, Self::Predicted)
    }
}

bitflags! {
    /// Sample properties whose values are still estimates.
    ///
    /// A sample carrying a non-empty set expects a refinement matched by its
    /// [`CorrelationId`].
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct PendingProperties: u8 {
        /// The precise location has not been finalized.
        const LOCATION = 1 << 0;
        /// Contact force is estimated.
        const FORCE = 1 << 1;
        /// Stylus azimuth is estimated.
        const AZIMUTH = 1 << 2;
        /// Stylus altitude is estimated.
        const ALTITUDE = 1 << 3;
        /// Stylus roll is estimated.
        const ROLL = 1 << 4;
    }
}

/// One raw input observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Location in logical canvas coordinates.
    pub location: Point,
    /// Stability classification.
    pub kind: SampleKind,
    /// Correlation id for a later refinement, if any.
    pub correlation: Option<CorrelationId>,
    /// Properties still awaiting refinement.
    pub pending: PendingProperties,
}

impl Sample {
    /// Creates a sample with no pending refinement.
    #[must_use]
    pub const fn new(location: Point, kind: SampleKind) -> Self {
        Self {
            location,
            kind,
            correlation: None,
            pending: PendingProperties::empty(),
        }
    }

    /// Shorthand for a [`SampleKind::Final`] sample at `(x, y)`.
    #[must_use]
    pub const fn final_at(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), SampleKind::Final)
    }

    /// Shorthand for a [`SampleKind::Coalesced`] sample at `(x, y)`.
    #[must_use]
    pub const fn coalesced_at(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), SampleKind::Coalesced)
    }

    /// Shorthand for a [`SampleKind::Predicted`] sample at `(x, y)`.
    #[must_use]
    pub const fn predicted_at(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), SampleKind::Predicted)
    }

    /// Marks this sample as awaiting refinement of `pending`.
    #[must_use]
    pub const fn with_estimate(
        mut self,
        correlation: CorrelationId,
        pending: PendingProperties,
    ) -> Self {
        self.correlation = Some(correlation);
        self.pending = pending;
        self
    }

    /// Returns `true` if a refinement is still expected for this sample.
    #[inline]
    #[must_use]
    pub fn awaits_refinement(&self) -> bool {
        self.correlation.is_some() && !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_sample_awaits_nothing() {
        let s = Sample::final_at(1.0, 2.0);
        assert_eq!(s.location, Point::new(1.0, 2.0));
        assert!(!s.awaits_refinement());
    }

    #[test]
    fn estimate_requires_both_id_and_properties() {
        let s = Sample::coalesced_at(0.0, 0.0)
            .with_estimate(CorrelationId(3), PendingProperties::LOCATION);
        assert!(s.awaits_refinement());

        let empty = Sample::coalesced_at(0.0, 0.0)
            .with_estimate(CorrelationId(4), PendingProperties::empty());
        assert!(!empty.awaits_refinement());
    }

    #[test]
    fn predicted_kind() {
        assert!(Sample::predicted_at(0.0, 0.0).kind.is_predicted());
        assert!(!SampleKind::Coalesced.is_predicted());
    }
}
