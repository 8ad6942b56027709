use log::debug;
use ndarray::{Array1, ArrayView, ArrayView2, Dimension};

use super::{Color, Dash, LineStyle, Palette, RenderSurface, SamplingGrid, TextBox, TextStyle};
use crate::error::{Result, VizError};
use crate::model::{Classifier, MarginModel};

/// Z-order of the predicted-class regions, below everything else
pub const REGION_Z_ORDER: i32 = -1;
/// Z-order of the margin lines, between the regions and the scatter
pub const MARGIN_Z_ORDER: i32 = 0;
pub const REGION_ALPHA: f64 = 0.2;
pub const MARGIN_ALPHA: f64 = 0.5;
/// Score levels outlining the margin
pub const MARGIN_LEVELS: [f64; 2] = [-1.0, 1.0];

#[derive(Debug, Clone)]
pub struct BoundaryOptions {
    /// Target number of grid samples; the grid is `floor(sqrt(point_count))` per side
    pub point_count: usize,
    pub palette: Palette,
    /// Transparency of the scattered data points
    pub alpha: f64,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        BoundaryOptions {
            point_count: 1000,
            palette: Palette::default(),
            alpha: 0.1,
        }
    }
}

/// What a render computed
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryReport {
    /// Fraction of data points whose prediction equals their label
    pub accuracy: f64,
    pub grid_side: usize,
    pub annotation: String,
}

/// Draws a classifier's decision regions underneath its labeled data
pub struct DecisionBoundaryRenderer<'a> {
    classifier: &'a dyn Classifier,
    margin: Option<&'a dyn MarginModel>,
    options: BoundaryOptions,
}

impl<'a> DecisionBoundaryRenderer<'a> {
    pub fn new(classifier: &'a dyn Classifier, options: BoundaryOptions) -> Self {
        DecisionBoundaryRenderer {
            classifier,
            margin: None,
            options,
        }
    }

    /// Also outline the margin where `margin` scores -1 and +1
    pub fn with_margin(mut self, margin: &'a dyn MarginModel) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn options(&self) -> &BoundaryOptions {
        &self.options
    }

    /// Render onto `surface`. Every call appends a fresh set of layers.
    ///
    /// `x` holds one 2-D point per row, `y` the matching labels in any shape
    /// (read in row-major order). The classifier is queried once on `x` and
    /// once on the sampling grid, which spans the surface's visible extent
    /// after the data has been scattered.
    pub fn render<D: Dimension>(
        &self,
        x: &ArrayView2<f64>,
        y: &ArrayView<usize, D>,
        surface: &mut dyn RenderSurface,
    ) -> Result<BoundaryReport> {
        let options = &self.options;
        let labels: Array1<usize> = y.iter().copied().collect();

        if x.ncols() != 2 {
            return Err(VizError::ColumnCount { columns: x.ncols() });
        }
        if x.nrows() == 0 {
            return Err(VizError::EmptyDataset);
        }
        if labels.len() != x.nrows() {
            return Err(VizError::ShapeMismatch {
                what: "labels",
                expected: x.nrows(),
                actual: labels.len(),
            });
        }
        if !(0.0..=1.0).contains(&options.alpha) {
            return Err(VizError::InvalidAlpha(options.alpha));
        }
        if options.point_count == 0 {
            return Err(VizError::InvalidPointCount(options.point_count));
        }

        let predicted = self.classifier.predict(x);
        let score = accuracy(&predicted, &labels)?;
        let colors = options.palette.colors_for(labels.iter().copied())?;
        options.palette.ensure_covers(predicted.iter().copied())?;

        surface.scatter(x, &colors, options.alpha);

        let extent = surface.visible_extent();
        let grid = SamplingGrid::new(extent, options.point_count)?;
        debug!(
            "sampling {}x{} grid over x [{}, {}], y [{}, {}]",
            grid.side(),
            grid.side(),
            extent.x_min,
            extent.x_max,
            extent.y_min,
            extent.y_max
        );

        let grid_predicted = self.classifier.predict(&grid.points());
        let regions = grid.reshape(grid_predicted)?;
        options.palette.ensure_covers(regions.iter().copied())?;

        let annotation = format_accuracy(score);
        let position = (
            (extent.x_min + extent.x_max) / 2.0,
            extent.y_min + extent.height() * 0.1,
        );
        surface.draw_text(position, &annotation, &annotation_style());

        surface.fill_contour(
            &grid,
            &regions.view(),
            &options.palette,
            REGION_ALPHA,
            REGION_Z_ORDER,
        )?;

        if let Some(margin) = self.margin {
            let scores = grid.reshape(margin.margin(&grid.points()))?;
            let style = LineStyle {
                color: Color::BLACK,
                dash: Dash::Dashed,
                ..LineStyle::default()
            };

            surface.line_contour(
                &grid,
                &scores.view(),
                &MARGIN_LEVELS,
                &style,
                MARGIN_ALPHA,
                MARGIN_Z_ORDER,
            );
        }

        debug!("rendered decision boundary, {}", annotation);

        Ok(BoundaryReport {
            accuracy: score,
            grid_side: grid.side(),
            annotation,
        })
    }
}

/// Render `classifier`'s decision boundary with the given options.
/// Shorthand for [`DecisionBoundaryRenderer`]
pub fn plot_decision_boundary<D: Dimension>(
    classifier: &dyn Classifier,
    x: &ArrayView2<f64>,
    y: &ArrayView<usize, D>,
    surface: &mut dyn RenderSurface,
    options: BoundaryOptions,
    margin: Option<&dyn MarginModel>,
) -> Result<BoundaryReport> {
    let mut renderer = DecisionBoundaryRenderer::new(classifier, options);
    if let Some(margin) = margin {
        renderer = renderer.with_margin(margin);
    }

    renderer.render(x, y, surface)
}

/// Fraction of positions where `predicted` equals `truth`
pub fn accuracy(predicted: &Array1<usize>, truth: &Array1<usize>) -> Result<f64> {
    if predicted.len() != truth.len() {
        return Err(VizError::ShapeMismatch {
            what: "predictions",
            expected: truth.len(),
            actual: predicted.len(),
        });
    }
    if truth.is_empty() {
        return Err(VizError::EmptyDataset);
    }

    let correct = predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();

    Ok(correct as f64 / truth.len() as f64)
}

/// `acc: 87.3%`
pub fn format_accuracy(accuracy: f64) -> String {
    format!("acc: {:.1}%", accuracy * 100.0)
}

fn annotation_style() -> TextStyle {
    TextStyle {
        background: Some(TextBox {
            face: Color::WHITE,
            edge: Color::BLACK,
            rounded: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plotting::recording::{Call, RecordingSurface};
    use crate::plotting::Extent;
    use ndarray::{array, Array2};
    use std::cell::Cell;

    fn threshold(x: &ArrayView2<f64>) -> Array1<usize> {
        x.column(0).mapv(|v| if v < 0.5 { 0 } else { 1 })
    }

    fn diagonal_margin(x: &ArrayView2<f64>) -> Array1<f64> {
        x.column(0).to_owned() + x.column(1)
    }

    fn unit_surface() -> RecordingSurface {
        RecordingSurface::new(Extent::new(-1.0, 1.0, 0.0, 10.0))
    }

    /// Counts how often it is queried and with how many rows
    struct Counting {
        calls: Cell<usize>,
        rows: Cell<usize>,
    }

    impl Classifier for Counting {
        fn predict(&self, inputs: &ArrayView2<f64>) -> Array1<usize> {
            self.calls.set(self.calls.get() + 1);
            self.rows.set(self.rows.get() + inputs.nrows());
            Array1::zeros(inputs.nrows())
        }
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&array![0, 1, 2], &array![0, 1, 2]).unwrap(), 1.0);
        assert_eq!(accuracy(&array![1, 0, 0], &array![0, 1, 2]).unwrap(), 0.0);
        assert_eq!(accuracy(&array![0, 1, 1, 0], &array![0, 1, 0, 1]).unwrap(), 0.5);
        assert!(accuracy(&array![0], &array![0, 1]).is_err());
        assert!(accuracy(&array![], &array![]).is_err());
    }

    #[test]
    fn test_format_accuracy() {
        assert_eq!(format_accuracy(0.873), "acc: 87.3%");
        assert_eq!(format_accuracy(1.0), "acc: 100.0%");
        assert_eq!(format_accuracy(0.0), "acc: 0.0%");
        assert_eq!(format_accuracy(0.5), "acc: 50.0%");
    }

    #[test]
    fn test_layers_in_order() {
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [-1.0, -1.0]];
        let y = array![0, 1, 0, 1];
        let mut surface = unit_surface();
        let options = BoundaryOptions {
            point_count: 4,
            ..BoundaryOptions::default()
        };

        let report = DecisionBoundaryRenderer::new(&threshold, options)
            .render(&x.view(), &y.view(), &mut surface)
            .unwrap();

        assert_eq!(report.accuracy, 0.5);
        assert_eq!(report.annotation, "acc: 50.0%");
        assert_eq!(report.grid_side, 2);
        assert_eq!(surface.calls.len(), 3);

        match &surface.calls[0] {
            Call::Scatter {
                points,
                colors,
                alpha,
            } => {
                assert_eq!(points, &x);
                assert_eq!(*alpha, 0.1);
                assert_eq!(colors[0], crate::plotting::palette::DEFAULT_COLORS[0]);
                assert_eq!(colors[1], crate::plotting::palette::DEFAULT_COLORS[1]);
            }
            other => panic!("expected scatter first, got {:?}", other),
        }

        match &surface.calls[1] {
            Call::Text {
                position,
                text,
                style,
            } => {
                assert_eq!(*position, (0.0, 1.0));
                assert_eq!(text, "acc: 50.0%");
                assert!(style.background.map_or(false, |b| b.rounded));
            }
            other => panic!("expected annotation second, got {:?}", other),
        }

        match &surface.calls[2] {
            Call::Fill {
                side,
                labels,
                alpha,
                z_order,
            } => {
                assert_eq!(*side, 2);
                // Grid x coordinates are -1 and 1 on both rows
                assert_eq!(labels, &array![[0, 1], [0, 1]]);
                assert_eq!(*alpha, REGION_ALPHA);
                assert_eq!(*z_order, REGION_Z_ORDER);
            }
            other => panic!("expected filled regions third, got {:?}", other),
        }
    }

    #[test]
    fn test_margin_lines() {
        let x = array![[0.0, 0.0], [1.0, 1.0]];
        let y = array![0, 1];
        let mut surface = unit_surface();
        let options = BoundaryOptions {
            point_count: 9,
            ..BoundaryOptions::default()
        };

        plot_decision_boundary(
            &threshold,
            &x.view(),
            &y.view(),
            &mut surface,
            options,
            Some(&diagonal_margin),
        )
        .unwrap();

        match surface.calls.last() {
            Some(Call::Lines {
                side,
                scores,
                levels,
                style,
                alpha,
                z_order,
            }) => {
                assert_eq!(*side, 3);
                assert_eq!(levels, &vec![-1.0, 1.0]);
                assert_eq!(style.dash, Dash::Dashed);
                assert_eq!(style.color, Color::BLACK);
                assert_eq!(*alpha, MARGIN_ALPHA);
                assert_eq!(*z_order, MARGIN_Z_ORDER);
                // Row i holds y = 0, 5, 10; column j holds x = -1, 0, 1
                assert_eq!(scores[[0, 0]], -1.0);
                assert_eq!(scores[[1, 2]], 6.0);
                assert_eq!(scores[[2, 1]], 10.0);
            }
            other => panic!("expected margin lines last, got {:?}", other),
        }
        assert!(REGION_Z_ORDER < MARGIN_Z_ORDER && MARGIN_Z_ORDER < 1);
    }

    #[test]
    fn test_classifier_called_twice() {
        let counting = Counting {
            calls: Cell::new(0),
            rows: Cell::new(0),
        };
        let x = Array2::zeros((5, 2));
        let y = Array1::<usize>::zeros(5);
        let mut surface = unit_surface();

        let report = DecisionBoundaryRenderer::new(&counting, BoundaryOptions::default())
            .render(&x.view(), &y.view(), &mut surface)
            .unwrap();

        assert_eq!(counting.calls.get(), 2);
        assert_eq!(counting.rows.get(), 5 + 961);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.annotation, "acc: 100.0%");
    }

    #[test]
    fn test_labels_any_shape() {
        let x = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let y = array![[0, 1], [0, 1]];
        let mut surface = unit_surface();

        let report = plot_decision_boundary(
            &threshold,
            &x.view(),
            &y.view(),
            &mut surface,
            BoundaryOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(report.accuracy, 1.0);
    }

    #[test]
    fn test_preconditions_leave_surface_untouched() {
        let mut surface = unit_surface();
        let renderer = DecisionBoundaryRenderer::new(&threshold, BoundaryOptions::default());

        let one_column = array![[0.0], [1.0]];
        assert!(matches!(
            renderer.render(&one_column.view(), &array![0, 1].view(), &mut surface),
            Err(VizError::ColumnCount { columns: 1 })
        ));

        let x = array![[0.0, 0.0], [1.0, 1.0]];
        assert!(matches!(
            renderer.render(&x.view(), &array![0, 1, 0].view(), &mut surface),
            Err(VizError::ShapeMismatch { .. })
        ));

        let unknown_label = array![0, 9];
        assert!(matches!(
            renderer.render(&x.view(), &unknown_label.view(), &mut surface),
            Err(VizError::MissingColor { label: 9 })
        ));

        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            renderer.render(&empty.view(), &Array1::<usize>::zeros(0).view(), &mut surface),
            Err(VizError::EmptyDataset)
        ));

        let opaque = DecisionBoundaryRenderer::new(
            &threshold,
            BoundaryOptions {
                alpha: 1.5,
                ..BoundaryOptions::default()
            },
        );
        assert!(matches!(
            opaque.render(&x.view(), &array![0, 1].view(), &mut surface),
            Err(VizError::InvalidAlpha(_))
        ));

        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_grid_prediction_without_color() {
        let palette = Palette::from_colors(&[Color::BLACK]);
        let x = array![[0.0, 0.0]];
        let y = array![0];
        let mut surface = unit_surface();

        let result = DecisionBoundaryRenderer::new(
            &threshold,
            BoundaryOptions {
                palette,
                ..BoundaryOptions::default()
            },
        )
        .render(&x.view(), &y.view(), &mut surface);

        // The grid reaches x = 1, which predicts class 1
        assert!(matches!(result, Err(VizError::MissingColor { label: 1 })));
    }

    #[test]
    fn test_repeated_render_appends_layers() {
        let x = array![[0.0, 0.0], [1.0, 1.0]];
        let y = array![0, 1];
        let mut surface = unit_surface();
        let renderer = DecisionBoundaryRenderer::new(&threshold, BoundaryOptions::default())
            .with_margin(&diagonal_margin);

        let first = renderer.render(&x.view(), &y.view(), &mut surface).unwrap();
        let second = renderer.render(&x.view(), &y.view(), &mut surface).unwrap();

        assert_eq!(first, second);
        assert_eq!(surface.calls.len(), 8);
        assert_eq!(surface.calls[..4], surface.calls[4..]);
    }
}
