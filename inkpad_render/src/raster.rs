// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion of stroke geometry to `tiny-skia` drawing calls.

use inkpad_core::geometry::{PathGeometry, StrokeCurve};
use inkpad_core::stroke::Stroke;
use inkpad_core::style::{Cap, Color, Join, StrokeStyle};
use kurbo::PathEl;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

use crate::SurfaceError;

/// Allocates a transparent pixmap.
pub(crate) fn allocate(width: u32, height: u32) -> Result<Pixmap, SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::EmptySurface);
    }
    Pixmap::new(width, height).ok_or(SurfaceError::Allocation { width, height })
}

pub(crate) fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_array().map(|c| c.clamp(0.0, 1.0));
    tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::BLACK)
}

fn line_cap(cap: Cap) -> LineCap {
    match cap {
        Cap::Butt => LineCap::Butt,
        Cap::Round => LineCap::Round,
        Cap::Square => LineCap::Square,
    }
}

fn line_join(join: Join) -> LineJoin {
    match join {
        Join::Miter => LineJoin::Miter,
        Join::Round => LineJoin::Round,
        Join::Bevel => LineJoin::Bevel,
    }
}

/// Builds a `tiny-skia` path. Returns `None` for paths with nothing to
/// draw, such as a lone move.
#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32; canvas coordinates fit comfortably"
)]
pub(crate) fn to_skia_path(elements: impl IntoIterator<Item = PathEl>) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in elements {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Strokes `curve` into `pixmap` with `style`.
pub(crate) fn draw_curve(
    pixmap: &mut Pixmap,
    style: &StrokeStyle,
    curve: &StrokeCurve<'_>,
    transform: Transform,
) {
    let Some(path) = to_skia_path(curve.elements()) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(skia_color(style.color));
    paint.anti_alias = true;
    let stroke = tiny_skia::Stroke {
        width: style.width,
        line_cap: line_cap(style.cap),
        line_join: line_join(style.join),
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
}

/// Strokes a finished stroke into `pixmap`, smoothing it from scratch.
pub(crate) fn draw_stroke(
    pixmap: &mut Pixmap,
    stroke: &Stroke,
    min_distance_sq: f64,
    transform: Transform,
) {
    if stroke.is_empty() {
        return;
    }
    let geometry = PathGeometry::for_stroke(stroke, min_distance_sq);
    draw_curve(pixmap, stroke.style(), &geometry.curve(&[]), transform);
}

/// Maps logical coordinates to device pixels.
#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia transforms are f32"
)]
pub(crate) fn device_transform(scale: f64) -> Transform {
    Transform::from_scale(scale as f32, scale as f32)
}
