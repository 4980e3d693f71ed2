//! Color codec for `[color=...]` rich-text values.
//!
//! Accepted notations, tried in order:
//!
//! 1. a named color from [`NAMED_COLORS`] (case-sensitive)
//! 2. `#rrggbb` or `#rrggbbaa` hex
//! 3. three or four numbers separated by commas and/or whitespace; if any
//!    channel exceeds 1 the tuple is read as 0-255 bytes, otherwise as
//!    0-1 floats
//!
//! Serialization produces the canonical set of notations for a color, with
//! the matching named color first when there is one.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref HEX: Regex = Regex::new(
        r"^#([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})?$"
    )
    .unwrap();
    static ref NUMBER: Regex = Regex::new(r"^\d+(?:\.\d+)?$").unwrap();
}

/// Maximum per-channel difference for a color to be shown by name.
const NAME_TOLERANCE: f32 = 0.004;
/// Alpha above this is treated as opaque and omitted from notations.
const OPAQUE_ALPHA: f32 = 0.996;
/// Absorbs single-precision error before flooring a channel to a byte.
const BYTE_EPSILON: f64 = 1e-4;

/// Normalized RGBA color, every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Color {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Color::new(red, green, blue, 1.0)
    }

    /// Whether every channel is within `tolerance` of `other`.
    pub fn approx_eq(&self, other: &Color, tolerance: f32) -> bool {
        (self.red - other.red).abs() < tolerance
            && (self.green - other.green).abs() < tolerance
            && (self.blue - other.blue).abs() < tolerance
            && (self.alpha - other.alpha).abs() < tolerance
    }

    /// The named color matching this one, if any.
    pub fn name(&self) -> Option<&'static str> {
        NAMED_COLORS
            .iter()
            .find(|(_, named)| named.approx_eq(self, NAME_TOLERANCE))
            .map(|(name, _)| *name)
    }

    pub fn is_opaque(&self) -> bool {
        self.alpha > OPAQUE_ALPHA
    }

    /// All textual notations for this color: the name (if one matches), hex,
    /// 0-255 bytes, and 0-1 floats rounded to three places. Alpha appears in
    /// the numeric notations only when the color is not opaque.
    pub fn notations(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(4);
        if let Some(name) = self.name() {
            out.push(name.to_string());
        }

        let mut channels = vec![self.red, self.green, self.blue];
        if !self.is_opaque() {
            channels.push(self.alpha);
        }
        let bytes: Vec<u8> = channels.iter().map(|c| to_byte(*c)).collect();

        let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
        out.push(format!("#{}", hex));
        out.push(
            bytes
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
        out.push(
            channels
                .iter()
                .map(|c| round3(*c).to_string())
                .collect::<Vec<_>>()
                .join(", "),
        );
        out
    }
}

impl fmt::Display for Color {
    /// Formats as the preferred notation: the name, or hex otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.notations().into_iter().next() {
            Some(s) => f.write_str(&s),
            None => Ok(()),
        }
    }
}

/// Why a color notation was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorParseError {
    #[error("unrecognized color notation '{0}'")]
    Unrecognized(String),
    #[error("expected 3 or 4 color channels, found {0}")]
    ChannelCount(usize),
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((_, color)) = NAMED_COLORS.iter().find(|(name, _)| *name == s) {
            return Ok(*color);
        }
        if let Some(caps) = HEX.captures(s) {
            let channel = |i: usize| {
                caps.get(i)
                    .and_then(|m| u8::from_str_radix(m.as_str(), 16).ok())
                    .map(|b| b as f32 / 255.0)
            };
            return match (channel(1), channel(2), channel(3)) {
                (Some(r), Some(g), Some(b)) => Ok(Color::new(r, g, b, channel(4).unwrap_or(1.0))),
                _ => Err(ColorParseError::Unrecognized(s.to_string())),
            };
        }
        parse_tuple(s)
    }
}

/// Parse a color value, returning `None` for anything unrecognized.
pub fn parse_color(s: &str) -> Option<Color> {
    s.parse().ok()
}

fn parse_tuple(s: &str) -> Result<Color, ColorParseError> {
    let parts: Vec<&str> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() || !parts.iter().all(|p| NUMBER.is_match(p)) {
        return Err(ColorParseError::Unrecognized(s.to_string()));
    }
    if parts.len() != 3 && parts.len() != 4 {
        return Err(ColorParseError::ChannelCount(parts.len()));
    }
    let mut values = Vec::with_capacity(4);
    for part in &parts {
        let v: f32 = part
            .parse()
            .map_err(|_| ColorParseError::Unrecognized(s.to_string()))?;
        values.push(v);
    }
    if values.iter().any(|v| *v > 1.0) {
        for v in values.iter_mut() {
            *v /= 255.0;
        }
    }
    Ok(Color::new(
        values[0],
        values[1],
        values[2],
        values.get(3).copied().unwrap_or(1.0),
    ))
}

/// Floors to 0-255. Channels arrive as f32 over the wire, so 128/255 can
/// land just below 128 without the epsilon.
fn to_byte(channel: f32) -> u8 {
    (f64::from(channel).clamp(0.0, 1.0) * 255.0 + BYTE_EPSILON).floor() as u8
}

fn round3(channel: f32) -> f64 {
    (f64::from(channel) * 1000.0).round() / 1000.0
}

/// Named colors understood by the game, in lookup order.
///
/// `default` and `orange` share a value; serialization reports `default`.
pub static NAMED_COLORS: &[(&str, Color)] = &[
    ("default", Color::rgb(1.000, 0.630, 0.259)),
    ("red", Color::rgb(1.000, 0.166, 0.141)),
    ("green", Color::rgb(0.173, 0.824, 0.250)),
    ("blue", Color::rgb(0.343, 0.683, 1.000)),
    ("orange", Color::rgb(1.000, 0.630, 0.259)),
    ("yellow", Color::rgb(1.000, 0.828, 0.231)),
    ("pink", Color::rgb(1.000, 0.520, 0.633)),
    ("purple", Color::rgb(0.821, 0.440, 0.998)),
    ("white", Color::rgb(0.9, 0.9, 0.9)),
    ("black", Color::rgb(0.5, 0.5, 0.5)),
    ("gray", Color::rgb(0.7, 0.7, 0.7)),
    ("brown", Color::rgb(0.757, 0.522, 0.371)),
    ("cyan", Color::rgb(0.335, 0.918, 0.866)),
    ("acid", Color::rgb(0.708, 0.996, 0.134)),
];
