// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON dumps for inkpad diagnostics.
//!
//! This crate provides [`TraceSink`](inkpad_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`json::export`]: writes recorded bytes as a JSON event array, and
//!   [`json::sketch_to_json`] describes a decoded sketch.

pub mod json;
pub mod pretty;
pub mod recorder;
