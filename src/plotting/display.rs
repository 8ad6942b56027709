use image::{DynamicImage, GrayImage, RgbImage};
use ndarray::{Array2, Array3, ArrayViewD, Axis, Ix2, Ix3};

use super::RenderSurface;
use crate::error::{Result, VizError};

/// Image rescaled to [0, 1], ready to display
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedImage {
    /// `height x width`, shown with a gray colormap
    Gray(Array2<f64>),
    /// `height x width x 3`
    Rgb(Array3<f64>),
}

impl NormalizedImage {
    /// (height, width)
    pub fn dims(&self) -> (usize, usize) {
        match self {
            NormalizedImage::Gray(im) => im.dim(),
            NormalizedImage::Rgb(im) => (im.shape()[0], im.shape()[1]),
        }
    }

    /// Quantize to an 8-bit image
    pub fn to_dynamic_image(&self) -> DynamicImage {
        let quantize = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (height, width) = self.dims();

        match self {
            NormalizedImage::Gray(im) => DynamicImage::ImageLuma8(GrayImage::from_fn(
                width as u32,
                height as u32,
                |x, y| image::Luma([quantize(im[[y as usize, x as usize]])]),
            )),
            NormalizedImage::Rgb(im) => DynamicImage::ImageRgb8(RgbImage::from_fn(
                width as u32,
                height as u32,
                |x, y| {
                    let (row, col) = (y as usize, x as usize);
                    image::Rgb([
                        quantize(im[[row, col, 0]]),
                        quantize(im[[row, col, 1]]),
                        quantize(im[[row, col, 2]]),
                    ])
                },
            )),
        }
    }
}

/// Min-max rescale an image to [0, 1].
///
/// Accepts `H x W` grayscale, `H x W x 1` (squeezed to grayscale) and
/// `H x W x 3` RGB arrays. A constant image has no range; it is shifted to
/// all zeros instead of being divided by zero.
pub fn normalize_image(im: &ArrayViewD<f64>) -> Result<NormalizedImage> {
    let channels = match im.ndim() {
        2 => None,
        3 => Some(im.shape()[2]),
        ndim => return Err(VizError::UnsupportedRank { ndim }),
    };
    if let Some(channels) = channels {
        if channels != 1 && channels != 3 {
            return Err(VizError::UnsupportedChannels { channels });
        }
    }

    let im_min = im.fold(f64::INFINITY, |m, &v| m.min(v));
    let im_max = im.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let mut im_scale = im_max - im_min;
    if im_scale == 0.0 || !im_scale.is_finite() {
        im_scale = 1.0;
    }
    let scaled = im.mapv(|v| (v - im_min) / im_scale);

    let shape_error = |_| VizError::UnsupportedRank { ndim: im.ndim() };
    match channels {
        None => Ok(NormalizedImage::Gray(
            scaled.into_dimensionality::<Ix2>().map_err(shape_error)?,
        )),
        Some(1) => Ok(NormalizedImage::Gray(
            scaled
                .index_axis_move(Axis(2), 0)
                .into_dimensionality::<Ix2>()
                .map_err(shape_error)?,
        )),
        Some(_) => Ok(NormalizedImage::Rgb(
            scaled.into_dimensionality::<Ix3>().map_err(shape_error)?,
        )),
    }
}

/// Normalize `im` and draw it on `surface` with the axes hidden
pub fn show(im: &ArrayViewD<f64>, surface: &mut dyn RenderSurface) -> Result<NormalizedImage> {
    let normalized = normalize_image(im)?;

    surface.draw_image(&normalized)?;
    surface.hide_axes();

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plotting::recording::{Call, RecordingSurface};
    use crate::plotting::Extent;
    use ndarray::{array, Array, IxDyn};

    #[test]
    fn test_constant_image_is_zero() {
        let im = Array::from_elem(IxDyn(&[3, 4]), 7.5);

        match normalize_image(&im.view()).unwrap() {
            NormalizedImage::Gray(out) => {
                assert_eq!(out.dim(), (3, 4));
                assert!(out.iter().all(|&v| v == 0.0));
            }
            other => panic!("expected grayscale, got {:?}", other),
        }
    }

    #[test]
    fn test_grayscale_rescaled() {
        let im = array![[2.0, 4.0], [6.0, 10.0]].into_dyn();

        assert_eq!(
            normalize_image(&im.view()).unwrap(),
            NormalizedImage::Gray(array![[0.0, 0.25], [0.5, 1.0]])
        );
    }

    #[test]
    fn test_single_channel_squeezed() {
        let im = Array::from_shape_fn(IxDyn(&[2, 3, 1]), |ix| (ix[0] * 3 + ix[1]) as f64);

        match normalize_image(&im.view()).unwrap() {
            NormalizedImage::Gray(out) => {
                assert_eq!(out.dim(), (2, 3));
                assert_eq!(out[[1, 2]], 1.0);
                assert_eq!(out[[0, 0]], 0.0);
            }
            other => panic!("expected grayscale, got {:?}", other),
        }
    }

    #[test]
    fn test_rgb_keeps_shape_and_range() {
        let im = Array::from_shape_fn(IxDyn(&[4, 5, 3]), |ix| {
            (ix[0] as f64 - 2.0) * 40.0 + ix[1] as f64 * 3.0 - ix[2] as f64
        });

        match normalize_image(&im.view()).unwrap() {
            NormalizedImage::Rgb(out) => {
                assert_eq!(out.shape(), &[4, 5, 3]);
                assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
                assert_eq!(out.fold(f64::INFINITY, |m, &v| m.min(v)), 0.0);
                assert_eq!(out.fold(f64::NEG_INFINITY, |m, &v| m.max(v)), 1.0);
            }
            other => panic!("expected rgb, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_channels() {
        let im = Array::<f64, _>::zeros(IxDyn(&[2, 2, 4]));

        assert!(matches!(
            normalize_image(&im.view()),
            Err(VizError::UnsupportedChannels { channels: 4 })
        ));
    }

    #[test]
    fn test_unsupported_rank() {
        let im = Array::<f64, _>::zeros(IxDyn(&[5]));

        assert!(matches!(
            normalize_image(&im.view()),
            Err(VizError::UnsupportedRank { ndim: 1 })
        ));
    }

    #[test]
    fn test_show_draws_and_hides_axes() {
        let mut surface = RecordingSurface::new(Extent::new(0.0, 1.0, 0.0, 1.0));
        let im = array![[0.0, 1.0]].into_dyn();

        let shown = show(&im.view(), &mut surface).unwrap();

        assert_eq!(surface.calls, vec![Call::Image(shown), Call::HideAxes]);
    }

    #[test]
    fn test_to_dynamic_image() {
        let image = NormalizedImage::Gray(array![[0.0, 1.0], [0.5, 0.25]]).to_dynamic_image();
        let gray = image.to_luma8();

        assert_eq!(gray.dimensions(), (2, 2));
        assert_eq!(gray.get_pixel(1, 0).0, [255]);
        assert_eq!(gray.get_pixel(0, 1).0, [128]);
    }
}
