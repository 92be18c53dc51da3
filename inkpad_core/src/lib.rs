// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke capture, incremental smoothing, and sketch encoding for touch
//! drawing.
//!
//! `inkpad_core` turns per-contact pointer input into smooth strokes with
//! bounded per-frame cost. It is `no_std` compatible (with `alloc`) and has
//! no notion of pixels; rasterization lives in `inkpad_render`.
//!
//! # Architecture
//!
//! ```text
//!   host input (per contact)
//!       │  begin / batch / refine / end / cancel
//!       ▼
//!   StrokeBuilder ──► Stroke (samples, style, state)
//!       │                 │
//!       │ DirtyRect       ▼
//!       │            PathGeometry ──► StrokeCurve (cached segments + tail)
//!       ▼
//!   host repaint          Sketch ◄──► codec (bytes for storage)
//! ```
//!
//! **[`builder`]**: one active [`Stroke`](stroke::Stroke) per
//! [`ContactId`](contact::ContactId). Predicted samples are purged before
//! every batch; estimated samples are matched to later refinements by
//! [`CorrelationId`](contact::CorrelationId).
//!
//! **[`geometry`]**: five-point windowed cubic smoothing with an explicit
//! cursor, so each update only walks new samples.
//!
//! **[`dirty`]**: margin-inflated dirty rectangles reported per batch.
//!
//! **[`codec`]**: fixed-width little-endian sketch format with exact
//! round-tripping.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-batch
//!   dirty-rect events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod builder;
pub mod codec;
pub mod contact;
pub mod dirty;
pub mod geometry;
pub mod sample;
pub mod sketch;
pub mod stroke;
pub mod style;
pub mod trace;
