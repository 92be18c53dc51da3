// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backing-raster canvas surface and sketch flattening for inkpad.
//!
//! This crate turns [`inkpad_core`] strokes into pixels with `tiny-skia`.
//! It provides:
//!
//! - [`CanvasSurface`]: owns the committed strokes, a cached backing raster
//!   of them, and the [`StrokeBuilder`](inkpad_core::builder::StrokeBuilder)
//!   for in-flight contacts. Redraws blit the raster and draw only active
//!   curves on top.
//! - [`DamageRegion`] and [`DamageListener`]: spatial damage tracking so
//!   hosts repaint only what input touched.
//! - [`flatten`]: renders a [`Sketch`](inkpad_core::sketch::Sketch) to an
//!   opaque image without a surface.
//! - [`SurfaceConfig`]: logical size, density and input tuning.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Delivers surface events to an installed
//!   [`TraceSink`](inkpad_core::trace::TraceSink).
//! - `trace-rich` (disabled by default, implies `trace`): Adds per-batch
//!   dirty-rect events.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod damage;
mod input;
mod raster;
mod surface;

pub use config::SurfaceConfig;
pub use damage::{DamageListener, DamageRegion};
pub use input::BeginOutcome;
pub use surface::{CanvasSurface, Frame, SurfaceError, flatten};
