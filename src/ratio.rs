//! Target aspect ratios written as `W:H`.
//!
//! Ratios arrive as text from the command line or `boxer.toml` and are turned
//! into a single `width / height` scalar. Everything that goes wrong here is an
//! invalid-argument problem on the caller's side, so [`RatioError`] is kept
//! separate from the imaging and I/O errors: a front-end can match on it and
//! show "ratio must be W:H" without inspecting anything else.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RatioError {
    #[error("aspect ratio must be in format W:H (e.g. 16:9), got {0:?}")]
    Format(String),
    #[error("aspect ratio must be in format W:H (e.g. 16:9): {0:?} is not a number")]
    NotNumeric(String),
    #[error("aspect ratio height must be non-zero, got {0:?}")]
    ZeroHeight(String),
    #[error("aspect ratio must be positive and finite, got {0}")]
    OutOfRange(f64),
}

/// Width divided by height. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AspectRatio(f64);

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio(1.0);

    pub fn new(value: f64) -> Result<Self, RatioError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(RatioError::OutOfRange(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl FromStr for AspectRatio {
    type Err = RatioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_ratio(s)
    }
}

/// Parse `"W:H"` into `W / H`.
///
/// Both sides may be any decimal number (`"2.39:1"` is fine). Surrounding
/// whitespace on either side is ignored.
///
/// ```
/// # use image_boxer::ratio::parse_ratio;
/// let r = parse_ratio("16:9").unwrap();
/// assert!((r.value() - 16.0 / 9.0).abs() < 1e-12);
/// assert!(parse_ratio("4:0").is_err());
/// ```
pub fn parse_ratio(text: &str) -> Result<AspectRatio, RatioError> {
    let mut parts = text.split(':');
    let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RatioError::Format(text.to_string()));
    };

    let width = parse_side(w)?;
    let height = parse_side(h)?;
    if height == 0.0 {
        return Err(RatioError::ZeroHeight(text.to_string()));
    }
    AspectRatio::new(width / height)
}

fn parse_side(side: &str) -> Result<f64, RatioError> {
    let side = side.trim();
    side.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RatioError::NotNumeric(side.to_string()))
}

/// A named ratio offered to users who don't want to type one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioPreset {
    pub label: &'static str,
    pub text: &'static str,
}

impl RatioPreset {
    pub fn ratio(&self) -> AspectRatio {
        // Presets are constants checked by `presets_all_parse`.
        parse_ratio(self.text).unwrap_or(AspectRatio::SQUARE)
    }
}

pub const PRESETS: &[RatioPreset] = &[
    RatioPreset {
        label: "Widescreen",
        text: "16:9",
    },
    RatioPreset {
        label: "Standard",
        text: "4:3",
    },
    RatioPreset {
        label: "Square",
        text: "1:1",
    },
    RatioPreset {
        label: "Ultrawide",
        text: "2:1",
    },
    RatioPreset {
        label: "Classic Photo",
        text: "3:2",
    },
];
