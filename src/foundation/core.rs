use std::time::Duration;

use crate::foundation::error::{RaceError, RaceResult};

pub use kurbo::{Point, Rect};

/// 0-based index of a redrawn frame.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> RaceResult<Self> {
        let fps = Self { num, den };
        fps.validate()?;
        Ok(fps)
    }

    /// Reject zero numerator or denominator.
    pub fn validate(self) -> RaceResult<()> {
        if self.den == 0 {
            return Err(RaceError::validation("Fps den must be > 0"));
        }
        if self.num == 0 {
            return Err(RaceError::validation("Fps num must be > 0"));
        }
        Ok(())
    }

    /// Wall-clock deadline of frame `frame` relative to the first frame.
    ///
    /// Computed from the rational rate so long runs do not accumulate rounding drift.
    pub fn frame_offset(self, frame: u64) -> Duration {
        let nanos = u128::from(frame) * u128::from(self.den) * 1_000_000_000 / u128::from(self.num);
        Duration::from_nanos(nanos.min(u128::from(u64::MAX)) as u64)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

/// Output canvas dimensions in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

/// Insets that carve the plotting rectangle out of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Padding {
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset (holds the timeline axis and counters).
    pub bottom: f64,
    /// Left inset (holds the bar name labels).
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 30.0,
            right: 30.0,
            bottom: 60.0,
            left: 100.0,
        }
    }
}

impl Padding {
    /// Plotting rectangle for `canvas`. May be empty when the insets exceed the canvas.
    pub fn plot_rect(&self, canvas: Canvas) -> Rect {
        let x1 = (f64::from(canvas.width) - self.right).max(self.left);
        let y1 = (f64::from(canvas.height) - self.bottom).max(self.top);
        Rect::new(self.left, self.top, x1, y1)
    }
}

/// Which part of a bar's state a transition animates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    /// Extent and represented value.
    Value,
    /// Vertical slot (rank swaps).
    Slot,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value => f.write_str("value"),
            Self::Slot => f.write_str("slot"),
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> RaceResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
            return Err(RaceError::validation(format!("invalid hex color '{s}'")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| RaceError::validation(format!("invalid hex color '{s}'")))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }

    /// `#rrggbb` form, alpha dropped.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a `[0, 1]` opacity.
    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

/// Fill colors assigned to bars by series order.
pub const PALETTE: [Rgba8; 10] = [
    Rgba8::rgb(0x4e, 0x79, 0xa7),
    Rgba8::rgb(0xf2, 0x8e, 0x2b),
    Rgba8::rgb(0xe1, 0x57, 0x59),
    Rgba8::rgb(0x76, 0xb7, 0xb2),
    Rgba8::rgb(0x59, 0xa1, 0x4f),
    Rgba8::rgb(0xed, 0xc9, 0x48),
    Rgba8::rgb(0xb0, 0x7a, 0xa1),
    Rgba8::rgb(0xff, 0x9d, 0xa7),
    Rgba8::rgb(0x9c, 0x75, 0x5f),
    Rgba8::rgb(0xba, 0xb0, 0xac),
];

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
