use std::path::{Path, PathBuf};

use icalign::{AlignConfig, AlignOptions, ImageRef, TransformType};
use icalign_estimator::InverseCompositional;
use icalign_image::Image;
use icalign_io::{
    functional::{read_image_any, write_image_any},
    text, GenericImage,
};

fn pattern(x: f32, y: f32) -> f32 {
    128.0 + 60.0 * (0.21 * x).sin() * (0.17 * y).cos() + 30.0 * (0.11 * (x + y)).cos()
}

fn shifted_gray(width: usize, height: usize, tx: f32, ty: f32) -> Image<f32, 1> {
    Image::from_fn([width, height].into(), |x, y, _| {
        pattern(x as f32 - tx, y as f32 - ty)
    })
}

fn write<const C: usize>(dir: &Path, name: &str, image: &Image<f32, C>) -> PathBuf {
    let path = dir.join(name);
    write_image_any(&path, image).expect("write test image");
    path
}

#[test]
fn identical_color_images_give_identity() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let image = Image::<f32, 3>::from_fn([64, 64].into(), |x, y, c| {
        pattern(x as f32 + 3.0 * c as f32, y as f32)
    });
    let a = write(dir.path(), "a.tif", &image);
    let output = dir.path().join("warped.tif");

    let config = AlignConfig::from_options(
        ImageRef::new(&a),
        ImageRef::new(&a),
        AlignOptions {
            output_file: output.clone(),
            output_format: 2,
            nparams: 2,
            grayscale: 0,
            ..Default::default()
        },
    );

    let params = icalign::run(&config, &InverseCompositional)?;
    assert_eq!(params.kind(), TransformType::Translation);
    for &v in params.as_slice() {
        approx::assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);
    }

    let GenericImage::Rgb(warped) = read_image_any(&output)? else {
        panic!("the warped image keeps three channels");
    };
    for (w, i) in warped.as_slice().iter().zip(image.as_slice()) {
        approx::assert_abs_diff_eq!(w, i, epsilon = 1e-3);
    }

    Ok(())
}

#[test]
fn recovers_translation_across_scales() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let a = write(dir.path(), "a.tif", &shifted_gray(96, 96, 0.0, 0.0));
    let b = write(dir.path(), "b.tif", &shifted_gray(96, 96, 2.0, -1.0));
    let output = dir.path().join("params.txt");

    let config = AlignConfig::from_options(
        ImageRef::new(&a),
        ImageRef::new(&b),
        AlignOptions {
            output_file: output.clone(),
            nparams: 2,
            tolerance: 1e-4,
            ..Default::default()
        },
    );

    let params = icalign::run(&config, &InverseCompositional)?;
    approx::assert_abs_diff_eq!(params.as_slice()[0], 2.0, epsilon = 0.05);
    approx::assert_abs_diff_eq!(params.as_slice()[1], -1.0, epsilon = 0.05);

    let written = text::read_parameters_txt(&output)?;
    assert_eq!(written, params.as_slice());

    Ok(())
}

#[test]
fn masked_region_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    // a corrupted block in the first image, excluded by its mask
    let mut first = shifted_gray(96, 96, 0.0, 0.0);
    let width = first.width();
    for (i, v) in first.as_slice_mut().iter_mut().enumerate() {
        let (x, y) = (i % width, i / width);
        if (20..50).contains(&x) && (30..60).contains(&y) {
            *v = 0.0;
        }
    }
    let mask = Image::<f32, 1>::from_fn([96, 96].into(), |x, y, _| {
        if (8..62).contains(&x) && (18..72).contains(&y) {
            0.0
        } else {
            255.0
        }
    });

    let a = write(dir.path(), "a.tif", &first);
    let m = write(dir.path(), "mask.tif", &mask);
    let b = write(dir.path(), "b.tif", &shifted_gray(96, 96, -1.5, 0.5));

    let config = AlignConfig::from_options(
        ImageRef::new(&a).with_mask(&m),
        ImageRef::new(&b),
        AlignOptions {
            output_file: dir.path().join("params.txt"),
            nparams: 2,
            tolerance: 1e-4,
            ..Default::default()
        },
    );

    let params = icalign::run(&config, &InverseCompositional)?;
    approx::assert_abs_diff_eq!(params.as_slice()[0], -1.5, epsilon = 0.05);
    approx::assert_abs_diff_eq!(params.as_slice()[1], 0.5, epsilon = 0.05);

    Ok(())
}
