// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON dumps of recordings and sketches.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes a JSON array with one object per event. [`sketch_to_json`]
//! describes a decoded [`Sketch`] for inspection in bug reports.

use std::io::{self, Write};

use inkpad_core::sketch::Sketch;
use inkpad_core::stroke::Stroke;
use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
///
/// Each element has an `"event"` name, a `"seq"` position in the
/// recording, and the event's fields under `"args"`.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes)
        .enumerate()
        .map(|(seq, recorded)| event_to_json(seq, &recorded))
        .collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn event_to_json(seq: usize, recorded: &RecordedEvent) -> Value {
    let (name, args) = match recorded {
        RecordedEvent::StrokeBegin(e) => (
            "StrokeBegin",
            json!({
                "contact": e.contact.0,
                "width": e.width,
                "replaced": e.replaced,
            }),
        ),
        RecordedEvent::Samples(e) => (
            "Samples",
            json!({
                "contact": e.contact.0,
                "settled": e.settled,
                "predicted": e.predicted,
                "total": e.total,
            }),
        ),
        RecordedEvent::Refine(e) => (
            "Refine",
            json!({
                "contact": e.contact.0,
                "correlation": e.correlation.0,
                "applied": e.applied,
            }),
        ),
        RecordedEvent::StrokeEnd(e) => (
            "StrokeEnd",
            json!({
                "contact": e.contact.0,
                "state": format!("{:?}", e.state),
                "samples": e.samples,
            }),
        ),
        RecordedEvent::Commit(e) => (
            "Commit",
            json!({
                "index": e.index,
                "samples": e.samples,
                "baked": e.baked,
            }),
        ),
        RecordedEvent::Redraw(e) => (
            "Redraw",
            json!({
                "frame_index": e.frame_index,
                "full_rebuild": e.full_rebuild,
                "baked_strokes": e.baked_strokes,
                "active_strokes": e.active_strokes,
            }),
        ),
        RecordedEvent::SurfaceReset(e) => (
            "SurfaceReset",
            json!({
                "restored": e.restored,
            }),
        ),
        RecordedEvent::DirtyRect(e) => (
            "DirtyRect",
            json!({
                "contact": e.contact.0,
                "rect": [e.x0, e.y0, e.x1, e.y1],
            }),
        ),
    };
    json!({
        "event": name,
        "seq": seq,
        "args": args,
    })
}

/// Describes a sketch: its metadata and, per stroke, style and extent.
///
/// Sample coordinates are omitted; the per-stroke `bounds` is
/// `[x0, y0, x1, y1]` or `null` for an empty stroke.
#[must_use]
pub fn sketch_to_json(sketch: &Sketch) -> Value {
    let strokes: Vec<Value> = sketch.strokes.iter().map(stroke_to_json).collect();
    json!({
        "name": sketch.name,
        "created": sketch.created,
        "sample_count": sketch.sample_count(),
        "strokes": strokes,
    })
}

fn stroke_to_json(stroke: &Stroke) -> Value {
    let style = stroke.style();
    let bounds = stroke
        .sample_bounds()
        .map(|r| json!([r.x0, r.y0, r.x1, r.y1]));
    json!({
        "color": style.color.to_array(),
        "width": style.width,
        "join": format!("{:?}", style.join),
        "cap": format!("{:?}", style.cap),
        "samples": stroke.samples().len(),
        "bounds": bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use inkpad_core::contact::ContactId;
    use inkpad_core::sample::Sample;
    use inkpad_core::stroke::StrokeState;
    use inkpad_core::style::Tool;
    use inkpad_core::trace::{CommitEvent, SamplesEvent, StrokeEndEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_samples(&SamplesEvent {
            contact: ContactId(1),
            settled: 3,
            predicted: 0,
            total: 3,
        });
        rec.on_stroke_end(&StrokeEndEvent {
            contact: ContactId(1),
            state: StrokeState::Committed,
            samples: 3,
        });
        rec.on_commit(&CommitEvent {
            index: 0,
            samples: 3,
            baked: true,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["event"], "Samples");
        assert_eq!(parsed[0]["args"]["settled"], 3);
        assert_eq!(parsed[1]["event"], "StrokeEnd");
        assert_eq!(parsed[1]["args"]["state"], "Committed");
        assert_eq!(parsed[2]["event"], "Commit");
        assert_eq!(parsed[2]["seq"], 2);
        assert_eq!(parsed[2]["args"]["baked"], true);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn sketch_summary() {
        let sketch = Sketch::new("doodle", 1_234).with_strokes([
            Stroke::committed(
                Tool::Eraser.style(),
                [Sample::final_at(1.0, 2.0), Sample::final_at(5.0, 8.0)],
            ),
            Stroke::committed(Tool::Pen.style(), Vec::new()),
        ]);
        let v = sketch_to_json(&sketch);
        assert_eq!(v["name"], "doodle");
        assert_eq!(v["created"], 1_234);
        assert_eq!(v["sample_count"], 2);
        assert_eq!(v["strokes"][0]["width"], 20.0);
        assert_eq!(v["strokes"][0]["cap"], "Round");
        assert_eq!(v["strokes"][0]["bounds"], json!([1.0, 2.0, 5.0, 8.0]));
        assert_eq!(v["strokes"][1]["samples"], 0);
        assert!(v["strokes"][1]["bounds"].is_null());
    }
}
