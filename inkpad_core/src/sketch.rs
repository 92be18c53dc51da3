// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The persisted document: a named, timestamped list of committed strokes.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::stroke::Stroke;

/// A named collection of committed strokes.
///
/// The timestamp is supplied by the caller; the core has no clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Sketch {
    /// Name, unique within the host's storage.
    pub name: String,
    /// Creation time in seconds since the Unix epoch.
    pub created: u64,
    /// Strokes in drawing order.
    pub strokes: Vec<Stroke>,
}

impl Sketch {
    /// Creates an empty sketch.
    #[must_use]
    pub fn new(name: impl Into<String>, created: u64) -> Self {
        Self {
            name: name.into(),
            created,
            strokes: Vec::new(),
        }
    }

    /// Creates an empty sketch named after its creation time.
    #[must_use]
    pub fn untitled(created: u64) -> Self {
        Self::new(format!("sketch-{created}"), created)
    }

    /// Replaces the strokes.
    #[must_use]
    pub fn with_strokes(mut self, strokes: impl IntoIterator<Item = Stroke>) -> Self {
        self.strokes = strokes.into_iter().collect();
        self
    }

    /// Total settled samples across all strokes.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.strokes.iter().map(Stroke::settled_len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untitled_uses_timestamp() {
        let sketch = Sketch::untitled(1_700_000_000);
        assert_eq!(sketch.name, "sketch-1700000000");
        assert_eq!(sketch.created, 1_700_000_000);
        assert!(sketch.strokes.is_empty());
        assert_eq!(sketch.sample_count(), 0);
    }
}
