// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The backing-raster canvas.
//!
//! Committed strokes are rasterized into a persistent backing pixmap exactly
//! once. A redraw blits that pixmap and strokes only the in-flight curves on
//! top, so per-frame cost is proportional to the number of active strokes
//! rather than the length of the drawing's history.
//!
//! The backing raster is rebuilt from the committed list only when it is
//! missing: after creation, [`clear`](CanvasSurface::clear),
//! [`restore`](CanvasSurface::restore),
//! [`resize`](CanvasSurface::resize), or
//! [`invalidate`](CanvasSurface::invalidate). Rebuilds draw into a fresh
//! buffer and swap it in, so a failed allocation leaves the previous raster
//! untouched.

use std::sync::Arc;

use inkpad_core::builder::{BuilderError, StrokeBuilder};
use inkpad_core::dirty::DirtyRect;
use inkpad_core::sketch::Sketch;
use inkpad_core::stroke::{Stroke, StrokeState};
use inkpad_core::trace::{self, CommitEvent, RedrawEvent, SurfaceResetEvent, TraceSink, Tracer};
use kurbo::Rect;
use thiserror::Error;
use tiny_skia::{IntRect, Pixmap, PixmapPaint, Transform};

use crate::config::SurfaceConfig;
use crate::damage::{DamageListener, DamageRegion};
use crate::raster;

/// Failures of raster operations.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SurfaceError {
    /// A pixel buffer could not be allocated.
    #[error("failed to allocate a {width}x{height} pixel buffer")]
    Allocation {
        /// Requested width in device pixels.
        width: u32,
        /// Requested height in device pixels.
        height: u32,
    },
    /// The surface has no pixels.
    #[error("surface has zero area")]
    EmptySurface,
    /// The host and the surface disagree about which contacts are live.
    #[error(transparent)]
    Sequencing(#[from] BuilderError),
}

/// A composited region of the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Area covered, in device pixels.
    pub bounds: IntRect,
    /// Pixels of that area.
    pub pixmap: Pixmap,
}

/// A canvas with a persistent backing raster.
pub struct CanvasSurface {
    pub(crate) config: SurfaceConfig,
    pub(crate) builder: StrokeBuilder,
    committed: Vec<Stroke>,
    /// Leading committed strokes already drawn into `backing`.
    baked: usize,
    backing: Option<Pixmap>,
    snapshot: Option<Arc<Pixmap>>,
    needs_full_redraw: bool,
    pub(crate) damage: DamageRegion,
    frame_index: u64,
    pub(crate) listener: Option<Box<dyn DamageListener>>,
    trace_sink: Option<Box<dyn TraceSink>>,
}

impl std::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("config", &self.config)
            .field("committed", &self.committed.len())
            .field("baked", &self.baked)
            .field("active", &self.builder.active_count())
            .field("needs_full_redraw", &self.needs_full_redraw)
            .field("damage", &self.damage)
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    /// Creates an empty surface.
    ///
    /// The backing raster is allocated lazily on the first redraw.
    pub fn new(config: SurfaceConfig) -> Result<Self, SurfaceError> {
        let (width, height) = config.pixel_size();
        if width == 0 || height == 0 {
            return Err(SurfaceError::EmptySurface);
        }
        Ok(Self {
            builder: StrokeBuilder::new(config.builder),
            config,
            committed: Vec::new(),
            baked: 0,
            backing: None,
            snapshot: None,
            needs_full_redraw: true,
            damage: DamageRegion::Full,
            frame_index: 0,
            listener: None,
            trace_sink: None,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Returns the stroke builder holding the active strokes.
    #[must_use]
    pub fn builder(&self) -> &StrokeBuilder {
        &self.builder
    }

    /// Committed strokes in drawing order.
    #[must_use]
    pub fn committed_strokes(&self) -> &[Stroke] {
        &self.committed
    }

    /// Returns `true` if the next redraw rebuilds the backing raster.
    #[must_use]
    pub fn needs_full_redraw(&self) -> bool {
        self.needs_full_redraw
    }

    /// Installs the listener notified after each input batch.
    pub fn set_damage_listener(&mut self, listener: impl DamageListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Installs a trace sink. Events are only delivered with the `trace`
    /// feature enabled.
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.trace_sink = sink;
    }

    pub(crate) fn tracer(&mut self) -> Tracer<'_> {
        match self.trace_sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        }
    }

    /// Returns and resets the damage accumulated since the last call.
    pub fn take_damage(&mut self) -> DamageRegion {
        std::mem::replace(&mut self.damage, DamageRegion::None)
    }

    /// Forces the next redraw to rebuild the backing raster.
    pub fn invalidate(&mut self) {
        self.needs_full_redraw = true;
        self.damage = DamageRegion::Full;
    }

    /// Changes the logical size or density and schedules a rebuild.
    ///
    /// Fails with [`SurfaceError::EmptySurface`] if the new size has no
    /// pixels, leaving the surface unchanged. The current raster stays in
    /// place until the rebuild succeeds.
    pub fn resize(&mut self, width: f64, height: f64, scale: f64) -> Result<(), SurfaceError> {
        let config = SurfaceConfig {
            width,
            height,
            scale,
            ..self.config
        };
        let (pixel_width, pixel_height) = config.pixel_size();
        if pixel_width == 0 || pixel_height == 0 {
            return Err(SurfaceError::EmptySurface);
        }
        self.config = config;
        self.invalidate();
        Ok(())
    }

    /// Adds a finished stroke to the drawing.
    ///
    /// Strokes without samples, and discarded strokes, are ignored. If the
    /// backing raster is current the stroke is drawn into it right away;
    /// otherwise the next rebuild picks it up. Either way it is rasterized
    /// exactly once.
    pub fn commit_stroke(&mut self, stroke: Stroke) -> DirtyRect {
        if stroke.is_empty() {
            log::trace!("ignoring commit of empty stroke");
            return DirtyRect::EMPTY;
        }
        if stroke.state() == StrokeState::Discarded {
            log::warn!("ignoring commit of discarded stroke");
            return DirtyRect::EMPTY;
        }

        let mut dirty = DirtyRect::EMPTY;
        if let Some(bounds) = stroke.sample_bounds() {
            let margin = self.config.builder.dirty_margin;
            dirty.add_rect(bounds.inflate(margin, margin));
        }

        let index = self.committed.len();
        let samples = stroke.samples().len();
        self.committed.push(stroke);
        let baked = self.bake_pending();
        self.damage.add_dirty(dirty);

        log::debug!("committed stroke {index} ({samples} samples, baked: {baked})");
        self.tracer().commit(&CommitEvent {
            index: trace::count(index),
            samples: trace::count(samples),
            baked,
        });
        dirty
    }

    /// Draws committed strokes not yet in the current backing raster.
    ///
    /// Returns `false` if there is no current raster to draw into.
    fn bake_pending(&mut self) -> bool {
        if self.needs_full_redraw {
            return false;
        }
        let Some(backing) = self.backing.as_mut() else {
            return false;
        };
        let transform = raster::device_transform(self.config.scale);
        let min_distance_sq = self.config.builder.min_distance_sq;
        for stroke in &self.committed[self.baked..] {
            raster::draw_stroke(backing, stroke, min_distance_sq, transform);
        }
        if self.baked < self.committed.len() {
            self.baked = self.committed.len();
            self.snapshot = None;
        }
        true
    }

    /// Discards every stroke and the backing raster.
    pub fn clear(&mut self) {
        self.reset();
        self.tracer().surface_reset(&SurfaceResetEvent { restored: 0 });
    }

    /// Replaces the drawing with `strokes`, rasterized on the next redraw.
    pub fn restore(&mut self, strokes: impl IntoIterator<Item = Stroke>) {
        self.reset();
        self.committed = strokes
            .into_iter()
            .filter(|s| s.state() != StrokeState::Discarded)
            .collect();
        log::debug!("restored {} strokes", self.committed.len());
        let restored = trace::count(self.committed.len());
        self.tracer().surface_reset(&SurfaceResetEvent { restored });
    }

    /// Replaces the drawing with a sketch's strokes.
    pub fn restore_sketch(&mut self, sketch: &Sketch) {
        self.restore(sketch.strokes.iter().cloned());
    }

    fn reset(&mut self) {
        self.builder.clear();
        self.committed.clear();
        self.baked = 0;
        self.backing = None;
        self.snapshot = None;
        self.needs_full_redraw = true;
        self.damage = DamageRegion::Full;
    }

    /// Snapshot of the committed drawing as a sketch.
    #[must_use]
    pub fn to_sketch(&self, name: impl Into<String>, created: u64) -> Sketch {
        Sketch::new(name, created).with_strokes(self.committed.iter().cloned())
    }

    /// Brings the backing raster up to date, rebuilding it if needed.
    ///
    /// Returns whether a full rebuild happened.
    fn ensure_backing(&mut self) -> Result<bool, SurfaceError> {
        if !self.needs_full_redraw && self.backing.is_some() {
            self.bake_pending();
            return Ok(false);
        }

        let (width, height) = self.config.pixel_size();
        let mut fresh = raster::allocate(width, height)?;
        let transform = raster::device_transform(self.config.scale);
        let min_distance_sq = self.config.builder.min_distance_sq;
        for stroke in &self.committed {
            raster::draw_stroke(&mut fresh, stroke, min_distance_sq, transform);
        }
        log::debug!(
            "rebuilt {width}x{height} backing raster from {} strokes",
            self.committed.len()
        );

        self.backing = Some(fresh);
        self.baked = self.committed.len();
        self.snapshot = None;
        self.needs_full_redraw = false;
        Ok(true)
    }

    /// Immutable image of the backing raster, regenerated lazily after
    /// each change.
    pub fn snapshot(&mut self) -> Result<Arc<Pixmap>, SurfaceError> {
        self.ensure_backing()?;
        if let Some(snapshot) = &self.snapshot {
            return Ok(Arc::clone(snapshot));
        }
        let backing = self.backing.as_ref().ok_or(SurfaceError::EmptySurface)?;
        let snapshot = Arc::new(backing.clone());
        self.snapshot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Composites `region` (logical coordinates): background, backing
    /// raster, then every active stroke.
    ///
    /// Accumulated damage that `region` covers is considered repainted.
    ///
    /// Returns `None` if the region lies outside the surface.
    pub fn request_redraw(&mut self, region: Rect) -> Result<Option<Frame>, SurfaceError> {
        let full_rebuild = self.ensure_backing()?;
        let Some(bounds) = self.device_bounds(region) else {
            return Ok(None);
        };

        let mut pixmap = raster::allocate(bounds.width(), bounds.height())?;
        pixmap.fill(raster::skia_color(self.config.background));
        let snapshot = self.snapshot()?;
        let backing: &Pixmap = &snapshot;
        pixmap.draw_pixmap(
            -bounds.x(),
            -bounds.y(),
            backing.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        let transform = raster::device_transform(self.config.scale)
            .post_translate(-bounds.x() as f32, -bounds.y() as f32);
        let mut active = 0_usize;
        for (style, curve) in self.builder.curves() {
            raster::draw_curve(&mut pixmap, style, &curve, transform);
            active += 1;
        }

        self.frame_index += 1;
        let event = RedrawEvent {
            frame_index: self.frame_index,
            full_rebuild,
            baked_strokes: trace::count(self.baked),
            active_strokes: trace::count(active),
        };
        self.tracer().redraw(&event);
        let surface = Rect::new(0.0, 0.0, self.config.width, self.config.height);
        self.damage.subtract(region, surface);
        Ok(Some(Frame { bounds, pixmap }))
    }

    /// Same as [`request_redraw`](Self::request_redraw).
    pub fn on_redraw(&mut self, region: Rect) -> Result<Option<Frame>, SurfaceError> {
        self.request_redraw(region)
    }

    /// Renders the whole surface over white: backing raster plus active
    /// strokes, in one synchronous pass.
    pub fn export_flattened_image(&mut self) -> Result<Pixmap, SurfaceError> {
        self.ensure_backing()?;
        let (width, height) = self.config.pixel_size();
        let mut pixmap = raster::allocate(width, height)?;
        pixmap.fill(tiny_skia::Color::WHITE);
        if let Some(backing) = &self.backing {
            pixmap.draw_pixmap(
                0,
                0,
                backing.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        let transform = raster::device_transform(self.config.scale);
        for (style, curve) in self.builder.curves() {
            raster::draw_curve(&mut pixmap, style, &curve, transform);
        }
        Ok(pixmap)
    }

    /// Converts a logical region to device pixels clipped to the surface.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "values are clamped to the surface's pixel size first"
    )]
    fn device_bounds(&self, region: Rect) -> Option<IntRect> {
        let (width, height) = self.config.pixel_size();
        let r = region.scale_from_origin(self.config.scale).expand();
        let x0 = r.x0.max(0.0);
        let y0 = r.y0.max(0.0);
        let x1 = r.x1.min(f64::from(width));
        let y1 = r.y1.min(f64::from(height));
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        IntRect::from_ltrb(x0 as i32, y0 as i32, x1 as i32, y1 as i32)
    }
}

/// Renders a sketch at `config`'s size over white.
pub fn flatten(sketch: &Sketch, config: &SurfaceConfig) -> Result<Pixmap, SurfaceError> {
    let (width, height) = config.pixel_size();
    let mut pixmap = raster::allocate(width, height)?;
    pixmap.fill(tiny_skia::Color::WHITE);
    let transform = raster::device_transform(config.scale);
    for stroke in &sketch.strokes {
        raster::draw_stroke(&mut pixmap, stroke, config.builder.min_distance_sq, transform);
    }
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_core::sample::Sample;
    use inkpad_core::style::{Color, StrokeStyle, Tool};

    fn config() -> SurfaceConfig {
        SurfaceConfig::with_size(100.0, 80.0, 2.0)
    }

    fn horizontal(y: f64) -> Stroke {
        Stroke::committed(
            Tool::Pen.style(),
            (0..30).map(|i| Sample::final_at(10.0 + f64::from(i) * 2.0, y)),
        )
    }

    fn is_white(pixmap: &Pixmap, x: u32, y: u32) -> bool {
        let p = pixmap.pixel(x, y).unwrap();
        (p.red(), p.green(), p.blue(), p.alpha()) == (255, 255, 255, 255)
    }

    #[test]
    fn empty_surface_is_rejected() {
        let err = CanvasSurface::new(SurfaceConfig::with_size(0.0, 10.0, 2.0)).err();
        assert_eq!(err, Some(SurfaceError::EmptySurface));
    }

    #[test]
    fn first_redraw_rebuilds() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        assert!(surface.needs_full_redraw());
        let frame = surface
            .request_redraw(Rect::new(0.0, 0.0, 100.0, 80.0))
            .unwrap()
            .unwrap();
        assert_eq!((frame.bounds.width(), frame.bounds.height()), (200, 160));
        assert!(!surface.needs_full_redraw());
        assert!(is_white(&frame.pixmap, 10, 10));
    }

    #[test]
    fn region_outside_surface_yields_nothing() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        let frame = surface
            .request_redraw(Rect::new(200.0, 200.0, 300.0, 300.0))
            .unwrap();
        assert!(frame.is_none());
    }

    #[test]
    fn region_is_clipped_and_offset() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        surface.request_redraw(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        surface.commit_stroke(horizontal(40.0));
        let frame = surface
            .request_redraw(Rect::new(20.0, 30.0, 500.0, 50.0))
            .unwrap()
            .unwrap();
        assert_eq!(frame.bounds, IntRect::from_ltrb(40, 60, 200, 100).unwrap());
        // Logical (30, 40) is device (60, 80), offset by the region origin.
        let p = frame.pixmap.pixel(20, 20).unwrap();
        assert_eq!((p.red(), p.alpha()), (0, 255));
    }

    #[test]
    fn commit_after_rebuild_bakes_immediately() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        surface.request_redraw(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        let before = surface.snapshot().unwrap();

        let dirty = surface.commit_stroke(horizontal(40.0));
        assert!(dirty.contains(kurbo::Point::new(30.0, 40.0)));
        let after = surface.snapshot().unwrap();
        assert!(!Arc::ptr_eq(&before, &after), "snapshot regenerated");
        assert_eq!(after.pixel(60, 80).unwrap().alpha(), 255);
        assert_eq!(before.pixel(60, 80).unwrap().alpha(), 0);

        // Unchanged raster hands out the cached snapshot.
        assert!(Arc::ptr_eq(&after, &surface.snapshot().unwrap()));
    }

    #[test]
    fn empty_commits_are_ignored() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        let dirty = surface.commit_stroke(Stroke::committed(Tool::Pen.style(), []));
        assert!(dirty.is_empty());
        assert!(surface.committed_strokes().is_empty());
    }

    #[test]
    fn restore_defers_to_next_redraw() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        surface.request_redraw(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        surface.restore([horizontal(20.0), horizontal(60.0)]);
        assert!(surface.needs_full_redraw());
        assert_eq!(surface.committed_strokes().len(), 2);

        let image = surface.export_flattened_image().unwrap();
        assert!(!surface.needs_full_redraw());
        assert!(!is_white(&image, 60, 40));
        assert!(!is_white(&image, 60, 120));
        assert!(is_white(&image, 60, 80));
    }

    #[test]
    fn take_damage_resets() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        assert_eq!(surface.take_damage(), DamageRegion::Full);
        assert!(surface.take_damage().is_empty());
        surface.request_redraw(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        surface.commit_stroke(horizontal(40.0));
        assert!(matches!(surface.take_damage(), DamageRegion::Rects(r) if r.len() == 1));
    }

    #[test]
    fn failed_rebuild_keeps_previous_raster() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        surface.commit_stroke(horizontal(40.0));
        let before = surface.snapshot().unwrap();

        // Wider than tiny-skia can address, so allocation is refused up front.
        surface.resize(600_000_000.0, 80.0, 1.0).unwrap();
        let err = surface.request_redraw(Rect::new(0.0, 0.0, 10.0, 10.0)).err();
        assert_eq!(
            err,
            Some(SurfaceError::Allocation {
                width: 600_000_000,
                height: 80
            })
        );
        assert!(surface.needs_full_redraw());
        assert_eq!(surface.backing.as_ref().map(Pixmap::data), Some(before.data()));

        surface.resize(100.0, 80.0, 2.0).unwrap();
        let after = surface.snapshot().unwrap();
        assert_eq!(before.data(), after.data());
    }

    #[test]
    fn resize_rejects_empty_sizes() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        surface.request_redraw(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        for (width, height, scale) in [
            (0.0, 80.0, 2.0),
            (100.0, -5.0, 2.0),
            (f64::NAN, 80.0, 2.0),
            (100.0, 80.0, 0.0),
        ] {
            assert_eq!(
                surface.resize(width, height, scale),
                Err(SurfaceError::EmptySurface)
            );
        }
        assert_eq!(*surface.config(), config());
        assert!(!surface.needs_full_redraw());

        surface.resize(50.0, 40.0, 1.0).unwrap();
        assert!(surface.needs_full_redraw());
        let image = surface.export_flattened_image().unwrap();
        assert_eq!((image.width(), image.height()), (50, 40));
    }

    #[test]
    fn translucent_strokes_are_drawn_once() {
        let ink = StrokeStyle::new(Color::rgba(0.0, 0.0, 0.0, 0.3), 3.0);
        let stroke_at = |y: f64| {
            let samples = (0..30).map(|i| Sample::final_at(10.0 + f64::from(i) * 2.0, y));
            Stroke::committed(ink, samples)
        };
        let alpha = |surface: &mut CanvasSurface| {
            let snapshot = surface.snapshot().unwrap();
            snapshot.pixel(60, 80).unwrap().alpha()
        };
        let whole = Rect::new(0.0, 0.0, 100.0, 80.0);

        let mut surface = CanvasSurface::new(config()).unwrap();
        surface.request_redraw(whole).unwrap();
        surface.commit_stroke(stroke_at(40.0));
        let single = alpha(&mut surface);
        assert!(single > 0 && single < 255, "alpha {single}");

        surface.request_redraw(whole).unwrap();
        assert_eq!(alpha(&mut surface), single);
        surface.export_flattened_image().unwrap();
        assert_eq!(alpha(&mut surface), single);

        surface.commit_stroke(stroke_at(10.0));
        surface.request_redraw(whole).unwrap();
        assert_eq!(alpha(&mut surface), single);

        surface.invalidate();
        surface.request_redraw(whole).unwrap();
        assert!(!surface.needs_full_redraw());
        assert_eq!(alpha(&mut surface), single);
        assert_eq!(surface.committed_strokes().len(), 2);
    }

    #[test]
    fn flatten_matches_committed_drawing() {
        let sketch = Sketch::new("s", 0).with_strokes([horizontal(40.0)]);
        let image = flatten(&sketch, &config()).unwrap();
        assert!(!is_white(&image, 60, 80));
        assert!(is_white(&image, 60, 20));
        assert_eq!((image.width(), image.height()), (200, 160));
    }

    #[test]
    fn to_sketch_copies_committed_strokes() {
        let mut surface = CanvasSurface::new(config()).unwrap();
        surface.commit_stroke(horizontal(40.0));
        let sketch = surface.to_sketch("mine", 12);
        assert_eq!(sketch.name, "mine");
        assert_eq!(sketch.strokes, surface.committed_strokes());
    }
}
