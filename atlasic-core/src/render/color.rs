//! Node coloring: category palette, in-degree heat and git touch heat.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Category;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS text: `#rrggbb` when opaque, `rgba(..)` otherwise.
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

pub const BACKGROUND: Rgba = Rgba::rgb(0x1e, 0x1e, 0x1e);
pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
pub const ACCENT: Rgba = Rgba::rgb(0x61, 0xda, 0xfb);
pub const EDGE: Rgba = Rgba::rgba(153, 153, 153, 0.6);
pub const EDGE_BATCHED: Rgba = Rgba::rgba(153, 153, 153, 0.3);
pub const HIGHLIGHT_GLOW: Rgba = Rgba::rgba(97, 218, 251, 0.8);
pub const HOVER_GLOW: Rgba = Rgba::rgba(255, 255, 255, 0.5);

pub fn category_color(category: Category) -> Rgba {
    match category {
        Category::Component => Rgba::rgb(0x61, 0xda, 0xfb),
        Category::Utility => Rgba::rgb(0xff, 0xd7, 0x00),
        Category::Api => Rgba::rgb(0xff, 0x6b, 0x6b),
        Category::Test => Rgba::rgb(0x4e, 0xcd, 0xc4),
        Category::Model => Rgba::rgb(0x9b, 0x59, 0xb6),
        Category::Config | Category::Other => Rgba::rgb(0x95, 0xa5, 0xa6),
    }
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Polynomial approximation of the Turbo colormap, `t` clamped to `[0, 1]`.
pub fn turbo(t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let r = 34.61 + t * (1172.33 - t * (10793.56 - t * (33300.12 - t * (38394.49 - t * 14825.05))));
    let g = 23.31 + t * (557.33 + t * (1225.33 - t * (3574.96 - t * (1073.77 + t * 707.56))));
    let b = 27.2 + t * (3211.1 - t * (15327.97 - t * (27814.0 - t * (22569.18 - t * 6838.66))));
    Rgba::rgb(channel(r), channel(g), channel(b))
}

/// Maps `value / max` into the upper 85% of the Turbo ramp so zero stays
/// visible against the background.
pub fn heat_color(value: f64, max: f64) -> Rgba {
    let ratio = if max > 0.0 { value / max } else { 0.0 };
    turbo(0.15 + 0.85 * ratio)
}

/// How nodes are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Category,
    InDegree,
    Heat,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "category" | "types" => Ok(Self::Category),
            "in-degree" | "indegree" => Ok(Self::InDegree),
            "heat" => Ok(Self::Heat),
            other => Err(format!("unknown color mode: {}", other)),
        }
    }
}

/// Externally computed per-file scores keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatScores {
    pub scores: HashMap<String, f64>,
    pub max: f64,
}

impl HeatScores {
    /// Builds the table and derives `max` from the values.
    pub fn new(scores: HashMap<String, f64>) -> Self {
        let max = scores.values().copied().fold(0.0, f64::max);
        Self { scores, max }
    }

    /// Score for a node id; absent ids read as 0.
    pub fn score(&self, id: &str) -> f64 {
        self.scores.get(id).copied().unwrap_or(0.0)
    }
}

/// Per-frame inputs the palette needs beyond the node itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub mode: ColorMode,
    /// At least 1.
    pub max_in_degree: f64,
    pub max_heat: f64,
}

impl ColorScale {
    pub fn node_color(&self, category: Category, in_degree: usize, heat: f64) -> Rgba {
        match self.mode {
            ColorMode::Category => category_color(category),
            ColorMode::InDegree => heat_color(in_degree as f64, self.max_in_degree),
            ColorMode::Heat => heat_color(heat, self.max_heat),
        }
    }
}
