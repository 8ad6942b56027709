use base64::Engine;
use image::ImageFormat;
use log::debug;
use ndarray::ArrayView2;
use std::fmt::Write;
use std::{fs, io::Cursor, path::Path};

use super::contour::{iso_segments, Segment};
use super::{
    Color, Dash, Extent, LineStyle, NormalizedImage, Palette, RenderSurface, SamplingGrid,
    TextStyle,
};
use crate::error::{Result, VizError};

/// Fraction of the data range added on every side when autoscaling
const DATA_MARGIN: f64 = 0.05;
const SCATTER_Z_ORDER: i32 = 1;
const TEXT_Z_ORDER: i32 = 3;
const POINT_RADIUS: f64 = 3.0;
const FONT_SIZE: f64 = 12.0;

// Space around the plot area, in pixels: left, right, top, bottom
const PAD_LEFT: f64 = 56.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_TOP: f64 = 16.0;
const PAD_BOTTOM: f64 = 32.0;

#[derive(Debug, Clone)]
enum Shape {
    Points {
        points: Vec<(f64, f64)>,
        colors: Vec<Color>,
    },
    Text {
        position: (f64, f64),
        text: String,
        style: TextStyle,
    },
    /// Axis-aligned rectangles in data space: (x0, x1, y0, y1, color)
    Cells(Vec<(f64, f64, f64, f64, Color)>),
    Lines {
        segments: Vec<Segment>,
        style: LineStyle,
    },
    /// Base64 encoded PNG with its pixel size
    Image {
        png: String,
        width: usize,
        height: usize,
    },
}

#[derive(Debug, Clone)]
struct Layer {
    z_order: i32,
    alpha: f64,
    shape: Shape,
}

/// Surface that collects layers and writes them out as an SVG document.
///
/// Unless an extent is fixed with [`SvgSurface::set_extent`], the visible
/// extent follows the scattered data with a 5% margin on each side. Contours,
/// text and images never move the extent.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    extent: Option<Extent>,
    data_bounds: Option<Extent>,
    axes_visible: bool,
    layers: Vec<Layer>,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> SvgSurface {
        SvgSurface {
            width,
            height,
            extent: None,
            data_bounds: None,
            axes_visible: true,
            layers: vec![],
        }
    }

    /// Pin the visible extent instead of following the data
    pub fn set_extent(&mut self, extent: Extent) {
        self.extent = Some(extent);
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn axes_visible(&self) -> bool {
        self.axes_visible
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_svg())?;
        debug!("wrote {} layers to {}", self.layers.len(), path.as_ref().display());

        Ok(())
    }

    /// Render the document. Layers are painted by ascending z-order, and in
    /// insertion order within the same z-order
    pub fn to_svg(&self) -> String {
        let extent = self.visible_extent();
        let frame = Frame::new(self.width, self.height, extent);
        let mut out = String::new();

        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="{FONT_SIZE}">"#,
            w = self.width,
            h = self.height,
        );
        let _ = writeln!(
            out,
            r#"<defs><clipPath id="plot-area"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath></defs>"#,
            frame.left, frame.top, frame.plot_width, frame.plot_height
        );
        let _ = writeln!(
            out,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            Color::WHITE
        );

        let mut order: Vec<&Layer> = self.layers.iter().collect();
        // Stable, so insertion order survives within a z-order
        order.sort_by_key(|layer| layer.z_order);

        for layer in order {
            write_layer(&mut out, &frame, layer);
        }

        if self.axes_visible {
            write_axes(&mut out, &frame, &extent);
        }

        out.push_str("</svg>\n");
        out
    }

    fn push(&mut self, z_order: i32, alpha: f64, shape: Shape) {
        self.layers.push(Layer {
            z_order,
            alpha,
            shape,
        });
    }

    fn grow_bounds(&mut self, points: &[(f64, f64)]) {
        for &(x, y) in points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
            let bounds = self
                .data_bounds
                .get_or_insert_with(|| Extent::new(x, x, y, y));
            bounds.x_min = bounds.x_min.min(x);
            bounds.x_max = bounds.x_max.max(x);
            bounds.y_min = bounds.y_min.min(y);
            bounds.y_max = bounds.y_max.max(y);
        }
    }
}

impl RenderSurface for SvgSurface {
    fn scatter(&mut self, points: &ArrayView2<f64>, colors: &[Color], alpha: f64) {
        let points: Vec<(f64, f64)> = points.outer_iter().map(|p| (p[0], p[1])).collect();

        self.grow_bounds(&points);
        self.push(
            SCATTER_Z_ORDER,
            alpha,
            Shape::Points {
                points,
                colors: colors.to_vec(),
            },
        );
    }

    fn draw_text(&mut self, position: (f64, f64), text: &str, style: &TextStyle) {
        self.push(
            TEXT_Z_ORDER,
            1.0,
            Shape::Text {
                position,
                text: text.to_string(),
                style: *style,
            },
        );
    }

    fn fill_contour(
        &mut self,
        grid: &SamplingGrid,
        labels: &ArrayView2<usize>,
        palette: &Palette,
        alpha: f64,
        z_order: i32,
    ) -> Result<()> {
        let side = grid.side();
        if labels.dim() != (side, side) {
            return Err(VizError::ShapeMismatch {
                what: "region labels",
                expected: side * side,
                actual: labels.len(),
            });
        }

        let extent = grid.extent();
        let x_edges = cell_edges(grid.xs().as_slice().unwrap_or(&[]), extent.x_min, extent.x_max);
        let y_edges = cell_edges(grid.ys().as_slice().unwrap_or(&[]), extent.y_min, extent.y_max);
        let mut cells = Vec::new();

        for (i, row) in labels.outer_iter().enumerate() {
            // Merge runs of equal labels along the row
            let mut start = 0;
            for j in 1..=row.len() {
                if j < row.len() && row[j] == row[start] {
                    continue;
                }
                let color = palette.color(row[start])?;
                cells.push((x_edges[start], x_edges[j], y_edges[i], y_edges[i + 1], color));
                start = j;
            }
        }

        self.push(z_order, alpha, Shape::Cells(cells));
        Ok(())
    }

    fn line_contour(
        &mut self,
        grid: &SamplingGrid,
        scores: &ArrayView2<f64>,
        levels: &[f64],
        style: &LineStyle,
        alpha: f64,
        z_order: i32,
    ) {
        let segments = levels
            .iter()
            .flat_map(|&level| iso_segments(&grid.xs(), &grid.ys(), scores, level))
            .collect();

        self.push(
            z_order,
            alpha,
            Shape::Lines {
                segments,
                style: *style,
            },
        );
    }

    fn draw_image(&mut self, image: &NormalizedImage) -> Result<()> {
        let (height, width) = image.dims();
        let mut png = Cursor::new(Vec::new());
        image.to_dynamic_image().write_to(&mut png, ImageFormat::Png)?;

        self.push(
            0,
            1.0,
            Shape::Image {
                png: base64::engine::general_purpose::STANDARD.encode(png.into_inner()),
                width,
                height,
            },
        );
        Ok(())
    }

    fn hide_axes(&mut self) {
        self.axes_visible = false;
    }

    fn visible_extent(&self) -> Extent {
        if let Some(extent) = self.extent {
            return extent;
        }

        match self.data_bounds {
            Some(bounds) => {
                let (x_min, x_max) = pad_range(bounds.x_min, bounds.x_max);
                let (y_min, y_max) = pad_range(bounds.y_min, bounds.y_max);
                Extent::new(x_min, x_max, y_min, y_max)
            }
            None => Extent::new(0.0, 1.0, 0.0, 1.0),
        }
    }
}

/// Widen a data range by the autoscale margin. A single value is widened
/// around itself first so the range never collapses
fn pad_range(min: f64, max: f64) -> (f64, f64) {
    let (min, max) = if max > min {
        (min, max)
    } else {
        let half = if min == 0.0 { 0.5 } else { min.abs() * 0.05 };
        (min - half, max + half)
    };
    let pad = (max - min) * DATA_MARGIN;

    (min - pad, max + pad)
}

/// Boundaries between neighbouring samples, clamped to the grid extent.
/// Returns `samples.len() + 1` edges
fn cell_edges(samples: &[f64], min: f64, max: f64) -> Vec<f64> {
    let mut edges = Vec::with_capacity(samples.len() + 1);
    edges.push(min);
    edges.extend(samples.windows(2).map(|w| (w[0] + w[1]) / 2.0));
    edges.push(max);
    edges
}

/// Maps data coordinates to pixels
struct Frame {
    left: f64,
    top: f64,
    plot_width: f64,
    plot_height: f64,
    extent: Extent,
}

impl Frame {
    fn new(width: u32, height: u32, extent: Extent) -> Frame {
        Frame {
            left: PAD_LEFT,
            top: PAD_TOP,
            plot_width: (width as f64 - PAD_LEFT - PAD_RIGHT).max(1.0),
            plot_height: (height as f64 - PAD_TOP - PAD_BOTTOM).max(1.0),
            extent,
        }
    }

    fn px(&self, x: f64) -> f64 {
        let span = self.extent.width();
        if span == 0.0 {
            return self.left + self.plot_width / 2.0;
        }
        self.left + (x - self.extent.x_min) / span * self.plot_width
    }

    fn py(&self, y: f64) -> f64 {
        let span = self.extent.height();
        if span == 0.0 {
            return self.top + self.plot_height / 2.0;
        }
        self.top + (self.extent.y_max - y) / span * self.plot_height
    }
}

fn write_layer(out: &mut String, frame: &Frame, layer: &Layer) {
    let alpha = layer.alpha;

    match &layer.shape {
        Shape::Points { points, colors } => {
            let _ = writeln!(out, r#"<g clip-path="url(#plot-area)" fill-opacity="{alpha}" stroke="none">"#);
            for (&(x, y), color) in points.iter().zip(colors) {
                let _ = writeln!(
                    out,
                    r#"<circle cx="{:.2}" cy="{:.2}" r="{POINT_RADIUS}" fill="{color}"/>"#,
                    frame.px(x),
                    frame.py(y)
                );
            }
            out.push_str("</g>\n");
        }
        Shape::Cells(cells) => {
            let _ = writeln!(out, r#"<g clip-path="url(#plot-area)" fill-opacity="{alpha}" stroke="none">"#);
            for &(x0, x1, y0, y1, color) in cells {
                let (left, right) = (frame.px(x0), frame.px(x1));
                let (top, bottom) = (frame.py(y1), frame.py(y0));
                let _ = writeln!(
                    out,
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{color}"/>"#,
                    left,
                    top,
                    right - left,
                    bottom - top
                );
            }
            out.push_str("</g>\n");
        }
        Shape::Lines { segments, style } => {
            let dash = match style.dash {
                Dash::Solid => String::new(),
                Dash::Dashed => format!(r#" stroke-dasharray="{:.1} {:.1}""#, style.width * 3.7, style.width * 1.6),
            };
            let _ = write!(
                out,
                r#"<path clip-path="url(#plot-area)" fill="none" stroke="{}" stroke-width="{}" stroke-opacity="{alpha}"{dash} d=""#,
                style.color, style.width
            );
            for segment in segments {
                let _ = write!(
                    out,
                    "M{:.2} {:.2}L{:.2} {:.2}",
                    frame.px(segment.start.0),
                    frame.py(segment.start.1),
                    frame.px(segment.end.0),
                    frame.py(segment.end.1)
                );
            }
            out.push_str("\"/>\n");
        }
        Shape::Text {
            position,
            text,
            style,
        } => {
            let (x, y) = (frame.px(position.0), frame.py(position.1));
            if let Some(background) = style.background {
                let pad = FONT_SIZE * 0.3;
                let width = text.chars().count() as f64 * FONT_SIZE * 0.6 + 2.0 * pad;
                let height = FONT_SIZE + 2.0 * pad;
                let radius = if background.rounded { pad } else { 0.0 };
                let _ = writeln!(
                    out,
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{radius:.2}" fill="{}" stroke="{}"/>"#,
                    x - pad,
                    y - FONT_SIZE - pad * 0.5,
                    width,
                    height,
                    background.face,
                    background.edge
                );
            }
            let _ = writeln!(
                out,
                r#"<text x="{:.2}" y="{:.2}" fill="{}">{}</text>"#,
                x,
                y,
                Color::BLACK,
                escape(text)
            );
        }
        Shape::Image { png, width, height } => {
            let _ = writeln!(
                out,
                r#"<image x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" preserveAspectRatio="xMidYMid meet" style="image-rendering:pixelated" data-pixels="{width}x{height}" href="data:image/png;base64,{png}"/>"#,
                frame.left, frame.top, frame.plot_width, frame.plot_height
            );
        }
    }
}

fn write_axes(out: &mut String, frame: &Frame, extent: &Extent) {
    let bottom = frame.top + frame.plot_height;
    let _ = writeln!(
        out,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}"/>"#,
        frame.left,
        frame.top,
        frame.plot_width,
        frame.plot_height,
        Color::BLACK
    );

    const TICKS: usize = 5;
    for k in 0..TICKS {
        let t = k as f64 / (TICKS - 1) as f64;
        let x = extent.x_min + t * extent.width();
        let y = extent.y_min + t * extent.height();

        let _ = writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            frame.px(x),
            bottom + FONT_SIZE + 4.0,
            tick_label(x)
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            frame.left - 4.0,
            frame.py(y) + FONT_SIZE * 0.35,
            tick_label(y)
        );
    }
}

fn tick_label(v: f64) -> String {
    let label = format!("{:.2}", v);
    // Avoid "-0.00"
    if label.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        "0.00".to_string()
    } else {
        label
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
