// Copyright 2026 the Inkpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke styling and tool presets.

/// A linear RGBA color with `f32` components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque 50% gray.
    pub const GRAY: Self = Self::rgba(0.5, 0.5, 0.5, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from its four components.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the components as `[r, g, b, a]`.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Creates a color from `[r, g, b, a]`.
    #[must_use]
    pub const fn from_array([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// How consecutive stroke segments are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Join {
    /// Sharp corner.
    Miter,
    /// Rounded corner.
    #[default]
    Round,
    /// Cut-off corner.
    Bevel,
}

impl Join {
    /// Returns the wire tag for this join.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Miter => 0,
            Self::Round => 1,
            Self::Bevel => 2,
        }
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Miter),
            1 => Some(Self::Round),
            2 => Some(Self::Bevel),
            _ => None,
        }
    }
}

/// How the open ends of a stroke are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cap {
    /// Flat end at the last point.
    Butt,
    /// Semicircular end.
    #[default]
    Round,
    /// Square end projecting half the width.
    Square,
}

impl Cap {
    /// Returns the wire tag for this cap.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Butt => 0,
            Self::Round => 1,
            Self::Square => 2,
        }
    }

    /// Parses a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Butt),
            1 => Some(Self::Round),
            2 => Some(Self::Square),
            _ => None,
        }
    }
}

/// Style attributes fixed at stroke creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Color,
    /// Line width in logical points. Must be finite and positive.
    pub width: f32,
    /// Segment join.
    pub join: Join,
    /// End cap.
    pub cap: Cap,
}

impl StrokeStyle {
    /// Creates a style with round joins and caps.
    #[must_use]
    pub const fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            join: Join::Round,
            cap: Cap::Round,
        }
    }

    /// Returns `true` if the width is usable for drawing.
    #[must_use]
    pub fn has_valid_width(&self) -> bool {
        self.width.is_finite() && self.width > 0.0
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Tool::Pen.style()
    }
}

/// Drawing tool presets.
///
/// The selected tool is passed explicitly when a stroke begins; nothing in
/// the core reads an ambient "current tool".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tool {
    /// Thin gray line.
    Pencil,
    /// Medium black line.
    #[default]
    Pen,
    /// Wide line in the paper color.
    Eraser,
}

impl Tool {
    /// Line width for this tool.
    #[must_use]
    pub const fn line_width(self) -> f32 {
        match self {
            Self::Pencil => 1.0,
            Self::Pen => 3.0,
            Self::Eraser => 20.0,
        }
    }

    /// Line color for this tool.
    #[must_use]
    pub const fn line_color(self) -> Color {
        match self {
            Self::Pencil => Color::GRAY,
            Self::Pen => Color::BLACK,
            Self::Eraser => Color::WHITE,
        }
    }

    /// The full stroke style for this tool.
    #[must_use]
    pub const fn style(self) -> StrokeStyle {
        StrokeStyle::new(self.line_color(), self.line_width())
    }
}
