// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contact and correlation identity types.
//!
//! Both are assigned by the input-event boundary; the core treats them as
//! opaque keys and never interprets the value.

use core::fmt;

/// Identifies one continuous input gesture for its duration.
///
/// A contact begins on touch-down and ends on touch-up or cancellation. At
/// most one stroke is active per contact at a time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContactId(pub u64);

impl fmt::Debug for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContactId({})", self.0)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Matches a provisional sample with the refinement that later arrives for it.
///
/// The input subsystem hands out one of these for every sample whose
/// properties are still estimated; the same value accompanies the update.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CorrelationId(pub u64);

impl fmt::Debug for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CorrelationId({})", self.0)
    }
}
