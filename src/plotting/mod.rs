use ndarray::ArrayView2;
use std::{fmt, str::FromStr};

use crate::error::VizError;

pub mod boundary;
pub mod contour;
pub mod display;
pub mod grid;
pub mod palette;
pub mod svg;

pub use boundary::{plot_decision_boundary, BoundaryOptions, BoundaryReport, DecisionBoundaryRenderer};
pub use grid::SamplingGrid;
pub use display::{normalize_image, show, NormalizedImage};
pub use palette::Palette;
pub use svg::SvgSurface;

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = VizError;

    /// Parse a `#rrggbb` string (the leading `#` is optional)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || VizError::InvalidColor(s.to_string());

        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Visible data range of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Extent {
        Extent {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dash {
    Solid,
    Dashed,
}

/// Stroke used for line contours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub dash: Dash,
    pub width: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            color: Color::BLACK,
            dash: Dash::Solid,
            width: 1.5,
        }
    }
}

/// Background box drawn behind a text annotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBox {
    pub face: Color,
    pub edge: Color,
    pub rounded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextStyle {
    pub background: Option<TextBox>,
}

/// A drawing target. Coordinates are given in data space; the surface owns
/// the mapping to its own pixels and the visible extent.
///
/// Layers with a lower z-order are painted first. Scatter layers sit at
/// z-order 1 and text at 3.
pub trait RenderSurface {
    /// Scatter one point per row of `points` (x in column 0, y in column 1)
    /// with the matching entry of `colors`, without point borders.
    fn scatter(&mut self, points: &ArrayView2<f64>, colors: &[Color], alpha: f64);

    fn draw_text(&mut self, position: (f64, f64), text: &str, style: &TextStyle);

    /// Fill every cell of `grid` with the palette color of its label.
    /// `labels[[i, j]]` is the label sampled at `(grid.xs()[j], grid.ys()[i])`.
    fn fill_contour(
        &mut self,
        grid: &SamplingGrid,
        labels: &ArrayView2<usize>,
        palette: &Palette,
        alpha: f64,
        z_order: i32,
    ) -> crate::error::Result<()>;

    /// Draw the iso-lines of `scores` at each of `levels`
    fn line_contour(
        &mut self,
        grid: &SamplingGrid,
        scores: &ArrayView2<f64>,
        levels: &[f64],
        style: &LineStyle,
        alpha: f64,
        z_order: i32,
    );

    /// Show a normalized image filling the drawing area
    fn draw_image(&mut self, image: &NormalizedImage) -> crate::error::Result<()>;

    fn hide_axes(&mut self);

    fn visible_extent(&self) -> Extent;
}
