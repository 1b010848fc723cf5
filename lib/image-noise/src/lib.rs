pub mod convert;
pub mod noise_effect;
pub mod source;

pub use convert::{array_to_rgb8, image_to_array, load_image_array};
pub use noise_effect::{
    GaussianNoiseConfig, PoissonNoiseConfig, SaltAndPepperConfig, SpeckleNoiseConfig,
};
pub use source::{NoiseSource, RngNoise};

use ndarray::Array3;
use std::{fmt, str::FromStr};

/// Image samples laid out as `(rows, cols, channels)`.
pub type NoiseImage = Array3<f64>;

pub type NoiseResult<T> = Result<T, NoiseError>;

#[derive(thiserror::Error, Debug)]
pub enum NoiseError {
    #[error("Unsupported noise model: {0}")]
    UnsupportedModel(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// A noise model that derives a new image from `image`.
///
/// The input is never modified. All randomness is drawn from `source`.
pub trait Noise {
    fn apply<S: NoiseSource + ?Sized>(
        &self,
        image: &NoiseImage,
        source: &mut S,
    ) -> NoiseResult<NoiseImage>;
}

#[derive(Debug, Clone)]
pub enum NoiseModel {
    Gaussian(GaussianNoiseConfig),
    SaltAndPepper(SaltAndPepperConfig),
    Poisson(PoissonNoiseConfig),
    Speckle(SpeckleNoiseConfig),
}

impl NoiseModel {
    pub const NAMES: [&'static str; 4] = ["gaussian", "salt_and_pepper", "poisson", "speckle"];

    /// Every model with its default parameters, in `NAMES` order.
    pub fn all() -> Vec<NoiseModel> {
        vec![
            NoiseModel::Gaussian(GaussianNoiseConfig::new()),
            NoiseModel::SaltAndPepper(SaltAndPepperConfig::new()),
            NoiseModel::Poisson(PoissonNoiseConfig::new()),
            NoiseModel::Speckle(SpeckleNoiseConfig::new()),
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoiseModel::Gaussian(_) => Self::NAMES[0],
            NoiseModel::SaltAndPepper(_) => Self::NAMES[1],
            NoiseModel::Poisson(_) => Self::NAMES[2],
            NoiseModel::Speckle(_) => Self::NAMES[3],
        }
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoiseModel {
    type Err = NoiseError;

    fn from_str(name: &str) -> NoiseResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "gaussian" | "gauss" => Ok(NoiseModel::Gaussian(GaussianNoiseConfig::new())),
            "salt_and_pepper" | "s&p" => Ok(NoiseModel::SaltAndPepper(SaltAndPepperConfig::new())),
            "poisson" => Ok(NoiseModel::Poisson(PoissonNoiseConfig::new())),
            "speckle" => Ok(NoiseModel::Speckle(SpeckleNoiseConfig::new())),
            _ => Err(NoiseError::UnsupportedModel(name.to_string())),
        }
    }
}

impl Noise for NoiseModel {
    fn apply<S: NoiseSource + ?Sized>(
        &self,
        image: &NoiseImage,
        source: &mut S,
    ) -> NoiseResult<NoiseImage> {
        match self {
            NoiseModel::Gaussian(config) => config.apply(image, source),
            NoiseModel::SaltAndPepper(config) => config.apply(image, source),
            NoiseModel::Poisson(config) => config.apply(image, source),
            NoiseModel::Speckle(config) => config.apply(image, source),
        }
    }
}

/// Applies the noise model called `model` to a copy of `image`.
///
/// Fails with [`NoiseError::UnsupportedModel`] for unknown names.
pub fn apply<S: NoiseSource + ?Sized>(
    model: &str,
    image: &NoiseImage,
    source: &mut S,
) -> NoiseResult<NoiseImage> {
    model.parse::<NoiseModel>()?.apply(image, source)
}
