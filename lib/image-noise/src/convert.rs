use crate::{NoiseError, NoiseImage, NoiseResult};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array3;
use std::path::Path;

/// Converts an image to RGB samples shaped `(height, width, 3)`.
pub fn image_to_array(image: &DynamicImage) -> NoiseImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f64
    })
}

pub fn load_image_array(path: impl AsRef<Path>) -> NoiseResult<NoiseImage> {
    Ok(image_to_array(&image::open(path)?))
}

/// Converts samples back to an 8-bit RGB image.
///
/// Values are rounded and saturated to `[0, 255]`; NaN becomes 0.
/// Single-channel arrays are written as grey.
pub fn array_to_rgb8(array: &NoiseImage) -> NoiseResult<RgbImage> {
    let (rows, cols, channels) = array.dim();
    if channels != 1 && channels != 3 {
        return Err(NoiseError::InvalidParameter(format!(
            "expected 1 or 3 channels, got {channels}"
        )));
    }

    let width = u32::try_from(cols)
        .map_err(|_| NoiseError::InvalidParameter(format!("width {cols} is too large")))?;
    let height = u32::try_from(rows)
        .map_err(|_| NoiseError::InvalidParameter(format!("height {rows} is too large")))?;

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let sample = |c: usize| saturate(array[[y, x, c.min(channels - 1)]]);
        Rgb([sample(0), sample(1), sample(2)])
    }))
}

fn saturate(v: f64) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}
