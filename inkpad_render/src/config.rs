// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surface configuration.

use inkpad_core::builder::BuilderConfig;
use inkpad_core::style::Color;

/// Size, density and input tuning for a [`CanvasSurface`](crate::CanvasSurface).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    /// Width in logical points.
    pub width: f64,
    /// Height in logical points.
    pub height: f64,
    /// Device pixels per logical point.
    pub scale: f64,
    /// Color behind the backing raster in composited frames.
    pub background: Color,
    /// Input tuning for the surface's stroke builder.
    pub builder: BuilderConfig,
}

impl SurfaceConfig {
    /// A 375 × 667 point phone screen at 3× density.
    #[must_use]
    pub const fn phone() -> Self {
        Self::with_size(375.0, 667.0, 3.0)
    }

    /// A 1024 × 1366 point tablet screen at 2× density.
    #[must_use]
    pub const fn tablet() -> Self {
        Self::with_size(1024.0, 1366.0, 2.0)
    }

    /// A white surface of the given logical size and density.
    #[must_use]
    pub const fn with_size(width: f64, height: f64, scale: f64) -> Self {
        Self {
            width,
            height,
            scale,
            background: Color::WHITE,
            builder: BuilderConfig::new(),
        }
    }

    /// Backing raster size in device pixels, rounded up.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        (to_pixels(self.width * self.scale), to_pixels(self.height * self.scale))
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::phone()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int casts saturate; negative and NaN sizes become zero"
)]
fn to_pixels(v: f64) -> u32 {
    v.ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_pixel_sizes() {
        assert_eq!(SurfaceConfig::phone().pixel_size(), (1125, 2001));
        assert_eq!(SurfaceConfig::tablet().pixel_size(), (2048, 2732));
    }

    #[test]
    fn fractional_sizes_round_up() {
        assert_eq!(SurfaceConfig::with_size(10.5, 3.2, 1.0).pixel_size(), (11, 4));
        assert_eq!(SurfaceConfig::with_size(-4.0, f64::NAN, 2.0).pixel_size(), (0, 0));
    }
}
