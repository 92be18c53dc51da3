// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary sketch encoding.
//!
//! The format is what the host's storage layer persists verbatim, so it is
//! fixed-width and little-endian throughout, and floats are written
//! bit-for-bit. Re-encoding a decoded sketch reproduces the input exactly.
//!
//! ```text
//! magic     "INKP"
//! version   u16
//! name      u32 byte length, UTF-8 bytes
//! created   u64
//! strokes   u32 count, then per stroke:
//!   color   f32 r, g, b, a
//!   width   f32
//!   join    u8
//!   cap     u8
//!   samples u32 count, then per sample: f64 x, f64 y, u8 kind
//! ```
//!
//! Predicted samples are never written.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use thiserror::Error;

use crate::sample::{Sample, SampleKind};
use crate::sketch::Sketch;
use crate::stroke::Stroke;
use crate::style::{Cap, Color, Join, StrokeStyle};

/// Leading bytes of every encoded sketch.
pub const MAGIC: [u8; 4] = *b"INKP";

/// Current format version.
pub const VERSION: u16 = 1;

const KIND_FINAL: u8 = 0;
const KIND_COALESCED: u8 = 1;

const STROKE_HEADER_LEN: usize = 4 * 4 + 4 + 1 + 1 + 4;
const SAMPLE_LEN: usize = 8 + 8 + 1;

/// Errors from [`deserialize`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The input ended inside a field.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof {
        /// Offset of the incomplete field.
        offset: usize,
    },
    /// The input does not start with [`MAGIC`].
    #[error("not an encoded sketch")]
    BadMagic,
    /// The format version is not supported.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    /// The sketch name is not valid UTF-8.
    #[error("sketch name is not valid UTF-8")]
    InvalidName,
    /// A stroke's join tag is unknown.
    #[error("stroke {stroke}: invalid join tag {tag}")]
    InvalidJoin {
        /// Index of the offending stroke.
        stroke: usize,
        /// The tag read.
        tag: u8,
    },
    /// A stroke's cap tag is unknown.
    #[error("stroke {stroke}: invalid cap tag {tag}")]
    InvalidCap {
        /// Index of the offending stroke.
        stroke: usize,
        /// The tag read.
        tag: u8,
    },
    /// A sample's kind tag is unknown.
    #[error("stroke {stroke}: invalid sample kind {tag}")]
    InvalidSampleKind {
        /// Index of the offending stroke.
        stroke: usize,
        /// The tag read.
        tag: u8,
    },
    /// A stroke's width is not finite and positive.
    #[error("stroke {stroke}: invalid width {width}")]
    InvalidWidth {
        /// Index of the offending stroke.
        stroke: usize,
        /// The width read.
        width: f32,
    },
    /// Bytes remain after the last stroke.
    #[error("{0} trailing bytes after sketch")]
    TrailingBytes(usize),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encodes a sketch.
///
/// Every stroke is written regardless of its state; decoding yields them
/// as committed.
#[must_use]
pub fn serialize(sketch: &Sketch) -> Vec<u8> {
    let mut w = Writer::default();
    w.buf.extend_from_slice(&MAGIC);
    w.write_u16(VERSION);

    let name = sketch.name.as_bytes();
    let len = w.write_len(name.len());
    w.buf.extend_from_slice(&name[..len]);
    w.write_u64(sketch.created);

    let count = w.write_len(sketch.strokes.len());
    for stroke in &sketch.strokes[..count] {
        w.write_stroke(stroke);
    }
    w.buf
}

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_bits().to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_le_bytes());
    }

    /// Writes a length prefix and returns how many items to write after it.
    fn write_len(&mut self, len: usize) -> usize {
        let clamped = u32::try_from(len).unwrap_or(u32::MAX);
        self.write_u32(clamped);
        clamped as usize
    }

    fn write_stroke(&mut self, stroke: &Stroke) {
        let style = stroke.style();
        for c in style.color.to_array() {
            self.write_f32(c);
        }
        self.write_f32(style.width);
        self.write_u8(style.join.tag());
        self.write_u8(style.cap.tag());

        let settled = stroke.settled_samples();
        let count = self.write_len(settled.len());
        for sample in &settled[..count] {
            self.write_f64(sample.location.x);
            self.write_f64(sample.location.y);
            self.write_u8(match sample.kind {
                SampleKind::Coalesced => KIND_COALESCED,
                SampleKind::Final | SampleKind::Predicted => KIND_FINAL,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decodes a sketch produced by [`serialize`].
pub fn deserialize(bytes: &[u8]) -> Result<Sketch, DecodeError> {
    let mut r = Reader { data: bytes, pos: 0 };

    if r.read_array::<4>()? != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let version = r.read_u16()?;
    if version != VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let name_len = r.read_u32()? as usize;
    let name = r.read_bytes(name_len)?;
    let name = String::from_utf8(name.to_vec()).map_err(|_| DecodeError::InvalidName)?;
    let created = r.read_u64()?;

    let count = r.read_u32()? as usize;
    let mut strokes = Vec::with_capacity(count.min(r.remaining() / STROKE_HEADER_LEN));
    for index in 0..count {
        strokes.push(r.read_stroke(index)?);
    }

    if r.remaining() > 0 {
        return Err(DecodeError::TrailingBytes(r.remaining()));
    }

    log::debug!("decoded sketch {name:?} with {} strokes", strokes.len());
    Ok(Sketch {
        name,
        created,
        strokes,
    })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&[u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof { offset: self.pos });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let offset = self.pos;
        self.read_bytes(N)?
            .try_into()
            .map_err(|_| DecodeError::UnexpectedEof { offset })
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.read_array().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.read_u32().map(f32::from_bits)
    }

    fn read_f64(&mut self) -> Result<f64, DecodeError> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_stroke(&mut self, stroke: usize) -> Result<Stroke, DecodeError> {
        let color = Color::rgba(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        );
        let width = self.read_f32()?;
        let join_tag = self.read_u8()?;
        let cap_tag = self.read_u8()?;

        let join = Join::from_tag(join_tag).ok_or(DecodeError::InvalidJoin {
            stroke,
            tag: join_tag,
        })?;
        let cap = Cap::from_tag(cap_tag).ok_or(DecodeError::InvalidCap {
            stroke,
            tag: cap_tag,
        })?;
        let style = StrokeStyle {
            color,
            width,
            join,
            cap,
        };
        if !style.has_valid_width() {
            return Err(DecodeError::InvalidWidth { stroke, width });
        }

        let count = self.read_u32()? as usize;
        let mut samples = Vec::with_capacity(count.min(self.remaining() / SAMPLE_LEN));
        for _ in 0..count {
            let x = self.read_f64()?;
            let y = self.read_f64()?;
            let kind = match self.read_u8()? {
                KIND_FINAL => SampleKind::Final,
                KIND_COALESCED => SampleKind::Coalesced,
                tag => return Err(DecodeError::InvalidSampleKind { stroke, tag }),
            };
            samples.push(Sample::new(Point::new(x, y), kind));
        }
        Ok(Stroke::committed(style, samples))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Tool;

    /// Deterministic xorshift so the large fixture needs no extra crates.
    struct Rng(u64);

    impl Rng {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            self.0
        }

        fn coord(&mut self) -> f64 {
            (self.next() % 100_000) as f64 / 97.0
        }
    }

    fn stroke(style: StrokeStyle, points: &[(f64, f64)]) -> Stroke {
        Stroke::committed(
            style,
            points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| {
                    let kind = if i % 3 == 2 {
                        SampleKind::Final
                    } else {
                        SampleKind::Coalesced
                    };
                    Sample::new(Point::new(x, y), kind)
                }),
        )
    }

    fn large_sketch(count: usize) -> Sketch {
        let mut rng = Rng(0x2545_f491_4f6c_dd1d);
        let tools = [Tool::Pencil, Tool::Pen, Tool::Eraser];
        let strokes = (0..count).map(|i| {
            let mut style = tools[i % 3].style();
            if i % 7 == 0 {
                style.color = Color::rgba(0.1, 0.7, 0.3, 0.5);
                style.join = Join::Bevel;
                style.cap = Cap::Square;
            }
            // Every tenth stroke is a degenerate tap.
            let len = if i % 10 == 0 { 0 } else { (rng.next() % 40) as usize };
            let points: Vec<_> = (0..len).map(|_| (rng.coord(), rng.coord())).collect();
            stroke(style, &points)
        });
        Sketch::new("large", 1_700_000_123).with_strokes(strokes)
    }

    fn assert_round_trip(sketch: &Sketch) {
        let bytes = serialize(sketch);
        let decoded = deserialize(&bytes).unwrap();
        assert_eq!(&decoded, sketch);
        assert_eq!(serialize(&decoded), bytes, "re-encoding is byte-identical");
    }

    #[test]
    fn round_trip_empty_sketch() {
        let sketch = Sketch::untitled(0);
        assert_round_trip(&sketch);
        let bytes = serialize(&sketch);
        assert_eq!(&bytes[..4], b"INKP");
        assert_eq!(bytes.len(), 4 + 2 + 4 + "sketch-0".len() + 8 + 4);
    }

    #[test]
    fn round_trip_single_stroke() {
        let sketch = Sketch::new("one", 42).with_strokes([stroke(
            Tool::Pen.style(),
            &[(0.5, 1.25), (10.0, 10.0), (-3.0, 1e9)],
        )]);
        assert_round_trip(&sketch);
    }

    #[test]
    fn round_trip_thousand_strokes_with_taps() {
        let sketch = large_sketch(1000);
        assert!(sketch.strokes.iter().any(Stroke::is_empty));
        assert_round_trip(&sketch);
    }

    #[test]
    fn round_trip_unicode_name() {
        assert_round_trip(&Sketch::new("Skizze \u{1f58c}", 7));
    }

    #[test]
    fn predicted_samples_are_not_written() {
        let mut live = Stroke::new(Tool::Pen.style());
        live.push(Sample::final_at(1.0, 1.0));
        live.push(Sample::predicted_at(2.0, 2.0));
        let sketch = Sketch::new("p", 0).with_strokes([live]);

        let decoded = deserialize(&serialize(&sketch)).unwrap();
        assert_eq!(decoded.strokes[0].samples().len(), 1);
        assert_eq!(decoded.strokes[0].samples()[0].location, Point::new(1.0, 1.0));
    }

    #[test]
    fn float_bits_are_preserved() {
        let mut style = Tool::Pen.style();
        style.color = Color::rgba(f32::from_bits(0x3e4c_cccd), -0.0, 1.0, 0.25);
        let sketch = Sketch::new("bits", 1).with_strokes([stroke(style, &[(0.1 + 0.2, -0.0)])]);
        let bytes = serialize(&sketch);
        assert_eq!(serialize(&deserialize(&bytes).unwrap()), bytes);
    }

    #[test]
    fn every_truncation_is_an_error() {
        let sketch = Sketch::new("t", 9).with_strokes([
            stroke(Tool::Pen.style(), &[(1.0, 2.0), (3.0, 4.0)]),
            stroke(Tool::Eraser.style(), &[]),
        ]);
        let bytes = serialize(&sketch);
        for len in 0..bytes.len() {
            match deserialize(&bytes[..len]) {
                Err(DecodeError::UnexpectedEof { offset }) => assert!(offset <= len),
                other => panic!("expected UnexpectedEof at {len}, got {other:?}"),
            }
        }
    }

    #[test]
    fn bad_magic_and_version() {
        let mut bytes = serialize(&Sketch::untitled(1));
        bytes[0] = b'X';
        assert_eq!(deserialize(&bytes), Err(DecodeError::BadMagic));

        let mut bytes = serialize(&Sketch::untitled(1));
        bytes[4..6].copy_from_slice(&2_u16.to_le_bytes());
        assert_eq!(deserialize(&bytes), Err(DecodeError::UnsupportedVersion(2)));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = serialize(&Sketch::untitled(1));
        bytes.extend_from_slice(&[0, 0, 0]);
        assert_eq!(deserialize(&bytes), Err(DecodeError::TrailingBytes(3)));
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut bytes = serialize(&Sketch::new("ab", 1));
        // Name bytes start after magic, version and length.
        bytes[10] = 0xff;
        assert_eq!(deserialize(&bytes), Err(DecodeError::InvalidName));
    }

    fn single_stroke_bytes() -> (Vec<u8>, usize) {
        let sketch = Sketch::new("", 0).with_strokes([stroke(Tool::Pen.style(), &[(1.0, 1.0)])]);
        // Stroke data starts after magic, version, empty name, created, count.
        (serialize(&sketch), 4 + 2 + 4 + 8 + 4)
    }

    #[test]
    fn invalid_style_tags_are_rejected() {
        let (mut bytes, stroke_at) = single_stroke_bytes();
        bytes[stroke_at + 20] = 9;
        assert_eq!(
            deserialize(&bytes),
            Err(DecodeError::InvalidJoin { stroke: 0, tag: 9 })
        );

        let (mut bytes, stroke_at) = single_stroke_bytes();
        bytes[stroke_at + 21] = 3;
        assert_eq!(
            deserialize(&bytes),
            Err(DecodeError::InvalidCap { stroke: 0, tag: 3 })
        );
    }

    #[test]
    fn invalid_width_is_rejected() {
        let (mut bytes, stroke_at) = single_stroke_bytes();
        bytes[stroke_at + 16..stroke_at + 20].copy_from_slice(&(-2.0_f32).to_le_bytes());
        assert_eq!(
            deserialize(&bytes),
            Err(DecodeError::InvalidWidth {
                stroke: 0,
                width: -2.0
            })
        );
    }

    #[test]
    fn invalid_sample_kind_is_rejected() {
        let (mut bytes, _) = single_stroke_bytes();
        let last = bytes.len() - 1;
        bytes[last] = 2;
        assert_eq!(
            deserialize(&bytes),
            Err(DecodeError::InvalidSampleKind { stroke: 0, tag: 2 })
        );
    }

    #[test]
    fn huge_counts_do_not_preallocate() {
        let mut bytes = serialize(&Sketch::new("", 0));
        let len = bytes.len();
        bytes[len - 4..].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            deserialize(&bytes),
            Err(DecodeError::UnexpectedEof { .. })
        ));
    }
}
