use anyhow::Result;
use image::{DynamicImage, Rgb, RgbImage};
use image_noise::{
    Noise, NoiseError, NoiseModel, RngNoise, apply, array_to_rgb8, image_to_array,
    load_image_array,
};
use ndarray::Array3;

fn test_image() -> Array3<f64> {
    Array3::from_shape_fn((12, 9, 3), |(r, c, ch)| ((r * 20 + c * 5 + ch) % 256) as f64)
}

#[test]
fn test_every_model_keeps_shape() -> Result<()> {
    let image = test_image();
    let mut source = RngNoise::seeded(1234);

    for name in NoiseModel::NAMES {
        let out = apply(name, &image, &mut source)?;
        assert_eq!(out.dim(), image.dim(), "model {name}");
    }

    for model in NoiseModel::all() {
        let out = model.apply(&image, &mut source)?;
        assert_eq!(out.dim(), image.dim(), "model {model}");
    }

    Ok(())
}

#[test]
fn test_legacy_aliases() -> Result<()> {
    assert_eq!("gauss".parse::<NoiseModel>()?.name(), "gaussian");
    assert_eq!("s&p".parse::<NoiseModel>()?.name(), "salt_and_pepper");
    assert_eq!(" Speckle ".parse::<NoiseModel>()?.name(), "speckle");
    Ok(())
}

#[test]
fn test_unsupported_model() {
    let image = test_image();
    let mut source = RngNoise::seeded(1);

    for name in ["", "blur", "gaussian_blur", "salt"] {
        match apply(name, &image, &mut source) {
            Err(NoiseError::UnsupportedModel(got)) => assert_eq!(got, name),
            other => panic!("expected UnsupportedModel for {name:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_same_seed_same_output() -> Result<()> {
    let image = test_image();

    for name in NoiseModel::NAMES {
        let a = apply(name, &image, &mut RngNoise::seeded(77))?;
        let b = apply(name, &image, &mut RngNoise::seeded(77))?;
        assert_eq!(a, b, "model {name}");
    }

    Ok(())
}

#[test]
fn test_noisy_file_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("input.png");

    let rgb = RgbImage::from_fn(16, 8, |x, y| Rgb([(x * 10) as u8, (y * 20) as u8, 128]));
    DynamicImage::ImageRgb8(rgb).save(&input)?;

    let array = load_image_array(&input)?;
    assert_eq!(array.dim(), (8, 16, 3));

    let noisy = apply("speckle", &array, &mut RngNoise::seeded(3))?;
    let output = dir.path().join("speckle.jpg");
    array_to_rgb8(&noisy)?.save(&output)?;

    let reloaded = image_to_array(&image::open(&output)?);
    assert_eq!(reloaded.dim(), array.dim());
    Ok(())
}
