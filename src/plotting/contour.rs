//! Iso-line extraction over a sampled grid using marching squares.

use ndarray::{ArrayView1, ArrayView2};

/// A line segment in data coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// Segments where `values` crosses `level`.
///
/// `values[[i, j]]` is the sample at `(xs[j], ys[i])`. Crossing points are
/// linearly interpolated along cell edges. Cells touching a NaN are skipped.
pub fn iso_segments(
    xs: &ArrayView1<f64>,
    ys: &ArrayView1<f64>,
    values: &ArrayView2<f64>,
    level: f64,
) -> Vec<Segment> {
    let (rows, cols) = values.dim();
    if rows < 2 || cols < 2 || xs.len() != cols || ys.len() != rows {
        return vec![];
    }

    let mut segments = Vec::new();

    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            // Corners, counter-clockwise from the lower left
            let ll = values[[i, j]];
            let lr = values[[i, j + 1]];
            let ur = values[[i + 1, j + 1]];
            let ul = values[[i + 1, j]];

            if ll.is_nan() || lr.is_nan() || ur.is_nan() || ul.is_nan() {
                continue;
            }

            let mut case = 0u8;
            if ll >= level {
                case |= 1;
            }
            if lr >= level {
                case |= 2;
            }
            if ur >= level {
                case |= 4;
            }
            if ul >= level {
                case |= 8;
            }

            let (x0, x1) = (xs[j], xs[j + 1]);
            let (y0, y1) = (ys[i], ys[i + 1]);

            let bottom = || (interpolate(x0, x1, ll, lr, level), y0);
            let right = || (x1, interpolate(y0, y1, lr, ur, level));
            let top = || (interpolate(x0, x1, ul, ur, level), y1);
            let left = || (x0, interpolate(y0, y1, ll, ul, level));

            let mut push = |start: (f64, f64), end: (f64, f64)| {
                segments.push(Segment { start, end });
            };

            match case {
                0 | 15 => {}
                1 | 14 => push(left(), bottom()),
                2 | 13 => push(bottom(), right()),
                3 | 12 => push(left(), right()),
                4 | 11 => push(right(), top()),
                6 | 9 => push(bottom(), top()),
                7 | 8 => push(left(), top()),
                5 | 10 => {
                    // Saddle: resolve with the cell center
                    let center = (ll + lr + ur + ul) / 4.0;
                    let center_high = center >= level;
                    if (case == 5) == center_high {
                        push(left(), top());
                        push(bottom(), right());
                    } else {
                        push(left(), bottom());
                        push(right(), top());
                    }
                }
                _ => unreachable!("marching squares case is a 4-bit mask"),
            }
        }
    }

    segments
}

/// Position between `a` and `b` where the value crosses `level`
fn interpolate(a: f64, b: f64, value_a: f64, value_b: f64, level: f64) -> f64 {
    let delta = value_b - value_a;
    if delta.abs() < f64::EPSILON {
        return (a + b) / 2.0;
    }

    let t = ((level - value_a) / delta).clamp(0.0, 1.0);
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn test_vertical_line() {
        // value = x, level 0.5 crosses every row at x = 0.5
        let xs = array![0.0, 1.0];
        let ys = array![0.0, 1.0, 2.0];
        let values = Array2::from_shape_fn((3, 2), |(_, j)| xs[j]);
        let segments = iso_segments(&xs.view(), &ys.view(), &values.view(), 0.5);

        assert_eq!(segments.len(), 2);
        for segment in segments {
            assert!((segment.start.0 - 0.5).abs() < 1e-12);
            assert!((segment.end.0 - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_level_outside_range() {
        let xs = Array1::linspace(-1.0, 1.0, 5);
        let values = Array2::from_shape_fn((5, 5), |(i, j)| xs[i] + xs[j]);
        let segments = iso_segments(&xs.view(), &xs.view(), &values.view(), 10.0);

        assert!(segments.is_empty());
    }

    #[test]
    fn test_diagonal_margins() {
        // value = x + y; both margin levels produce lines on x + y = level
        let xs = Array1::linspace(-2.0, 2.0, 9);
        let values = Array2::from_shape_fn((9, 9), |(i, j)| xs[i] + xs[j]);

        for level in [-1.0, 1.0] {
            let segments = iso_segments(&xs.view(), &xs.view(), &values.view(), level);
            assert!(!segments.is_empty());
            for segment in segments {
                assert!((segment.start.0 + segment.start.1 - level).abs() < 1e-9);
                assert!((segment.end.0 + segment.end.1 - level).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_degenerate_grid() {
        let xs = array![0.0];
        let values = array![[1.0]];

        assert!(iso_segments(&xs.view(), &xs.view(), &values.view(), 0.0).is_empty());
    }
}
