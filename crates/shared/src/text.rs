//! Configuration of embossed text volumes.
//!
//! Optional properties distinguish "user never touched this" from an explicit
//! value, so project files written by older versions stay reproducible.

use serde::{Deserialize, Serialize};

use crate::approx_eq;

fn approx_eq_opt(a: Option<f32>, b: Option<f32>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => approx_eq(a, b),
        _ => false,
    }
}

/// User-defined shaping properties of an embossed text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    /// Extra space between letters, negative means closer letters
    pub char_gap: Option<i32>,
    /// Extra space between lines, negative means closer lines
    pub line_gap: Option<i32>,
    /// Z depth of the text [mm]
    pub emboss: f32,
    /// Positive widens the glyph shape, negative thins it [mm]
    pub boldness: Option<f32>,
    /// Positive skews glyphs clockwise (italic), negative counter-clockwise
    pub skew: Option<f32>,
    /// Letter height [mm]
    pub size: f32,
    pub family: Option<String>,
    pub face_name: Option<String>,
    pub style: Option<String>,
    pub weight: Option<String>,
}

impl TextStyle {
    pub fn new(size: f32, emboss: f32) -> Self {
        Self {
            char_gap: None,
            line_gap: None,
            emboss,
            boldness: None,
            skew: None,
            size,
            family: None,
            face_name: None,
            style: None,
            weight: None,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(10.0, 2.0)
    }
}

impl PartialEq for TextStyle {
    fn eq(&self, other: &Self) -> bool {
        self.char_gap == other.char_gap
            && self.line_gap == other.line_gap
            && approx_eq(self.emboss, other.emboss)
            && approx_eq(self.size, other.size)
            && approx_eq_opt(self.boldness, other.boldness)
            && approx_eq_opt(self.skew, other.skew)
    }
}

/// How a text volume is created; snapshotted for undo/redo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub style: TextStyle,
    pub text: String,
}

impl TextConfig {
    pub fn new(style: TextStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            style: TextStyle::default(),
            text: "None".to_string(),
        }
    }
}
