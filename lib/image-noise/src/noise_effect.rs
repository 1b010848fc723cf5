use crate::{Noise, NoiseError, NoiseImage, NoiseResult, NoiseSource};
use derivative::Derivative;
use derive_setters::Setters;
use std::collections::HashSet;

/// Additive Gaussian noise: `out = in + N(mean, std_dev)` per sample.
///
/// The result is not clamped, so it can leave the input's numeric range.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GaussianNoiseConfig {
    #[derivative(Default(value = "10.0"))]
    mean: f64,

    #[derivative(Default(value = "25.0"))]
    std_dev: f64,
}

impl GaussianNoiseConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Noise for GaussianNoiseConfig {
    fn apply<S: NoiseSource + ?Sized>(
        &self,
        image: &NoiseImage,
        source: &mut S,
    ) -> NoiseResult<NoiseImage> {
        check_std_dev(self.std_dev)?;
        Ok(image.mapv(|v| v + source.normal(self.mean, self.std_dev)))
    }
}

/// Impulse noise: a fraction of samples forced to `salt_value` or `pepper_value`.
///
/// `ceil(amount * size * salt_vs_pepper)` salt coordinates and
/// `ceil(amount * size * (1 - salt_vs_pepper))` pepper coordinates are drawn
/// with replacement, independently per axis. The two sets may overlap.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SaltAndPepperConfig {
    #[derivative(Default(value = "0.04"))]
    amount: f64,

    #[derivative(Default(value = "0.5"))]
    salt_vs_pepper: f64,

    #[derivative(Default(value = "255.0"))]
    salt_value: f64,

    #[derivative(Default(value = "0.0"))]
    pepper_value: f64,
}

impl SaltAndPepperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of salt and pepper coordinates drawn for `size` samples.
    pub fn counts(&self, size: usize) -> (usize, usize) {
        let size = size as f64;
        let salt = (self.amount * size * self.salt_vs_pepper).ceil() as usize;
        let pepper = (self.amount * size * (1.0 - self.salt_vs_pepper)).ceil() as usize;
        (salt, pepper)
    }
}

impl Noise for SaltAndPepperConfig {
    fn apply<S: NoiseSource + ?Sized>(
        &self,
        image: &NoiseImage,
        source: &mut S,
    ) -> NoiseResult<NoiseImage> {
        for (name, value) in [("amount", self.amount), ("salt_vs_pepper", self.salt_vs_pepper)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(NoiseError::InvalidParameter(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        let mut out = image.to_owned();
        if out.is_empty() {
            return Ok(out);
        }

        let (num_salt, num_pepper) = self.counts(out.len());
        scatter(&mut out, num_salt, self.salt_value, source);
        scatter(&mut out, num_pepper, self.pepper_value, source);

        Ok(out)
    }
}

fn scatter<S: NoiseSource + ?Sized>(out: &mut NoiseImage, count: usize, value: f64, source: &mut S) {
    let (rows, cols, channels) = out.dim();

    for _ in 0..count {
        let row = source.index(rows);
        let col = source.index(cols);
        let channel = source.index(channels);
        out[[row, col, channel]] = value;
    }
}

/// Shot noise: `out = Poisson(in * scale) / scale`, where `scale` is the
/// number of distinct sample values rounded up to a power of two.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoissonNoiseConfig;

impl PoissonNoiseConfig {
    pub fn new() -> Self {
        Self
    }
}

/// `2^ceil(log2(distinct sample values))`.
pub fn poisson_scale(image: &NoiseImage) -> f64 {
    // `+ 0.0` folds -0.0 into 0.0 so both count as one value
    let distinct = image
        .iter()
        .map(|v| (v + 0.0).to_bits())
        .collect::<HashSet<_>>()
        .len();

    if distinct == 0 {
        return 1.0;
    }

    2f64.powf((distinct as f64).log2().ceil())
}

impl Noise for PoissonNoiseConfig {
    fn apply<S: NoiseSource + ?Sized>(
        &self,
        image: &NoiseImage,
        source: &mut S,
    ) -> NoiseResult<NoiseImage> {
        if let Some(v) = image.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(NoiseError::InvalidParameter(format!(
                "poisson rate must be finite and non-negative, got {v}"
            )));
        }

        let scale = poisson_scale(image);
        log::trace!("poisson scale = {scale}");

        Ok(image.mapv(|v| source.poisson(v * scale) / scale))
    }
}

/// Multiplicative noise: `out = in + in * N(0, std_dev)` per sample.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SpeckleNoiseConfig {
    #[derivative(Default(value = "1.0"))]
    std_dev: f64,
}

impl SpeckleNoiseConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Noise for SpeckleNoiseConfig {
    fn apply<S: NoiseSource + ?Sized>(
        &self,
        image: &NoiseImage,
        source: &mut S,
    ) -> NoiseResult<NoiseImage> {
        check_std_dev(self.std_dev)?;
        Ok(image.mapv(|v| v + v * source.normal(0.0, self.std_dev)))
    }
}

fn check_std_dev(std_dev: f64) -> NoiseResult<()> {
    if std_dev.is_finite() && std_dev >= 0.0 {
        Ok(())
    } else {
        Err(NoiseError::InvalidParameter(format!(
            "std_dev must be finite and non-negative, got {std_dev}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RngNoise;
    use ndarray::Array3;

    /// Returns zero noise and the identity for poisson.
    struct ZeroNoise;

    impl NoiseSource for ZeroNoise {
        fn normal(&mut self, _mean: f64, _std_dev: f64) -> f64 {
            0.0
        }

        fn index(&mut self, _bound: usize) -> usize {
            0
        }

        fn poisson(&mut self, lambda: f64) -> f64 {
            lambda
        }
    }

    /// Walks the flattened column axis so every coordinate is distinct.
    struct SequentialIndex {
        next: usize,
    }

    impl NoiseSource for SequentialIndex {
        fn normal(&mut self, mean: f64, _std_dev: f64) -> f64 {
            mean
        }

        fn index(&mut self, bound: usize) -> usize {
            if bound == 1 {
                return 0;
            }
            let i = self.next % bound;
            self.next += 1;
            i
        }

        fn poisson(&mut self, lambda: f64) -> f64 {
            lambda
        }
    }

    fn ramp(rows: usize, cols: usize, channels: usize) -> NoiseImage {
        Array3::from_shape_fn((rows, cols, channels), |(r, c, ch)| {
            ((r * 31 + c * 7 + ch * 3) % 256) as f64
        })
    }

    #[test]
    fn test_gaussian_zero_noise_is_identity() -> NoiseResult<()> {
        let image = ramp(6, 5, 3);
        let out = GaussianNoiseConfig::new().apply(&image, &mut ZeroNoise)?;
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn test_gaussian_adds_mean_offset() -> NoiseResult<()> {
        let image = Array3::from_elem((2, 2, 1), 100.0);
        let mut source = SequentialIndex { next: 0 };
        let out = GaussianNoiseConfig::new().apply(&image, &mut source)?;

        // SequentialIndex returns the mean for every normal draw
        assert!(out.iter().all(|v| *v == 110.0));
        Ok(())
    }

    #[test]
    fn test_gaussian_is_not_clamped() -> NoiseResult<()> {
        let image = Array3::from_elem((32, 32, 3), 250.0);
        let out = GaussianNoiseConfig::new().apply(&image, &mut RngNoise::seeded(5))?;
        assert!(out.iter().any(|v| *v > 255.0));
        Ok(())
    }

    #[test]
    fn test_speckle_zero_noise_is_identity() -> NoiseResult<()> {
        let image = ramp(4, 7, 3);
        let out = SpeckleNoiseConfig::new().apply(&image, &mut ZeroNoise)?;
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn test_speckle_keeps_zero_samples() -> NoiseResult<()> {
        let image = Array3::zeros((8, 8, 3));
        let out = SpeckleNoiseConfig::new().apply(&image, &mut RngNoise::seeded(1))?;
        assert!(out.iter().all(|v| *v == 0.0));
        Ok(())
    }

    #[test]
    fn test_salt_and_pepper_counts() {
        let config = SaltAndPepperConfig::new();
        assert_eq!(config.counts(100), (2, 2));
        assert_eq!(config.counts(60), (2, 2));
        assert_eq!(config.counts(1024 * 768 * 3), (47186, 47186));
        assert_eq!(config.counts(1), (1, 1));
    }

    #[test]
    fn test_salt_and_pepper_distinct_coordinates() -> NoiseResult<()> {
        let image = Array3::from_elem((1, 100, 1), 128.0);
        let mut source = SequentialIndex { next: 0 };
        let out = SaltAndPepperConfig::new().apply(&image, &mut source)?;

        assert_eq!(out.iter().filter(|v| **v == 255.0).count(), 2);
        assert_eq!(out.iter().filter(|v| **v == 0.0).count(), 2);
        assert_eq!(out.iter().filter(|v| **v == 128.0).count(), 96);

        // Salt is written first, pepper continues where salt stopped
        assert_eq!(out[[0, 0, 0]], 255.0);
        assert_eq!(out[[0, 1, 0]], 255.0);
        assert_eq!(out[[0, 2, 0]], 0.0);
        assert_eq!(out[[0, 3, 0]], 0.0);
        Ok(())
    }

    #[test]
    fn test_salt_and_pepper_random_overlap_bounded() -> NoiseResult<()> {
        let image = Array3::from_elem((16, 16, 3), 128.0);
        let (num_salt, num_pepper) = SaltAndPepperConfig::new().counts(image.len());
        let out = SaltAndPepperConfig::new().apply(&image, &mut RngNoise::seeded(21))?;

        let salt = out.iter().filter(|v| **v == 255.0).count();
        let pepper = out.iter().filter(|v| **v == 0.0).count();
        assert!(salt >= 1 && salt <= num_salt);
        assert!(pepper >= 1 && pepper <= num_pepper);
        assert!(salt + pepper + out.iter().filter(|v| **v == 128.0).count() == out.len());

        // The source is left untouched
        assert!(image.iter().all(|v| *v == 128.0));
        Ok(())
    }

    #[test]
    fn test_salt_and_pepper_rejects_bad_amount() {
        let image = ramp(2, 2, 1);
        let result = SaltAndPepperConfig::new()
            .with_amount(1.5)
            .apply(&image, &mut ZeroNoise);
        assert!(matches!(result, Err(NoiseError::InvalidParameter(_))));
    }

    #[test]
    fn test_poisson_scale() {
        let with_values = |values: &[f64]| {
            Array3::from_shape_vec((1, values.len(), 1), values.to_vec()).unwrap()
        };

        assert_eq!(poisson_scale(&with_values(&[5.0, 5.0])), 1.0);
        assert_eq!(poisson_scale(&with_values(&[0.0, 1.0])), 2.0);
        assert_eq!(poisson_scale(&with_values(&[0.0, 1.0, 2.0])), 4.0);
        assert_eq!(poisson_scale(&with_values(&[0.0, -0.0, 3.0])), 2.0);
        assert_eq!(poisson_scale(&Array3::zeros((0, 0, 0))), 1.0);

        let full_range = Array3::from_shape_fn((16, 16, 1), |(r, c, _)| (r * 16 + c) as f64);
        assert_eq!(poisson_scale(&full_range), 256.0);
    }

    #[test]
    fn test_poisson_identity_source() -> NoiseResult<()> {
        let image = ramp(3, 3, 3);
        let out = PoissonNoiseConfig::new().apply(&image, &mut ZeroNoise)?;
        assert_eq!(out, image);
        Ok(())
    }

    #[test]
    fn test_poisson_rejects_negative_samples() {
        let image = Array3::from_elem((2, 2, 1), -1.0);
        let result = PoissonNoiseConfig::new().apply(&image, &mut ZeroNoise);
        assert!(matches!(result, Err(NoiseError::InvalidParameter(_))));
    }

    #[test]
    fn test_poisson_zero_image_stays_zero() -> NoiseResult<()> {
        let image = Array3::zeros((4, 4, 3));
        let out = PoissonNoiseConfig::new().apply(&image, &mut RngNoise::seeded(2))?;
        assert!(out.iter().all(|v| *v == 0.0));
        Ok(())
    }
}
