use icalign::{pyramid::PyramidSpec, AlignError, Frame};
use icalign_image::{Image, ImageSize};
use icalign_imgproc::pyramid::{zoom_out, zoom_size};

/// Replace every positive mask value by one and the others by zero.
fn binarize<const C: usize>(mask: &Image<f32, C>) -> Result<Image<f32, C>, AlignError> {
    let data = mask
        .as_slice()
        .iter()
        .map(|&v| if v > 0.0 { 1.0 } else { 0.0 })
        .collect();
    Ok(Image::new(mask.size(), data)?)
}

fn zoom<const C: usize>(src: &Image<f32, C>, factor: f32) -> Result<Image<f32, C>, AlignError> {
    let size = ImageSize {
        width: zoom_size(src.width(), factor),
        height: zoom_size(src.height(), factor),
    };
    let mut dst = Image::<f32, C>::from_size_val(size, 0.0)?;
    zoom_out(src, &mut dst, factor)?;
    Ok(dst)
}

/// Build the pyramid of a frame, finest level first.
///
/// Each level is the previous one zoomed out by the pyramid zoom factor. Masks are binarized
/// first and zoomed the same way; a zoomed mask value above 0.5 marks a valid pixel.
pub fn build_pyramid<const C: usize>(
    frame: &Frame<C>,
    spec: &PyramidSpec,
) -> Result<Vec<Frame<C>>, AlignError> {
    let factor = spec.zoom_factor as f32;

    let mut levels = Vec::with_capacity(spec.levels);
    levels.push(Frame {
        image: frame.image.clone(),
        mask: frame.mask.as_ref().map(binarize).transpose()?,
    });

    for level in 1..spec.levels {
        let previous = &levels[level - 1];
        let next = Frame {
            image: zoom(&previous.image, factor)?,
            mask: previous
                .mask
                .as_ref()
                .map(|mask| zoom(mask, factor))
                .transpose()?,
        };
        log::debug!(
            "pyramid level {level}: {}x{}",
            next.image.width(),
            next.image.height()
        );
        levels.push(next);
    }

    Ok(levels)
}

/// Whether every channel of the mask at pixel `index` marks a valid pixel.
pub fn mask_valid<const C: usize>(mask: Option<&Image<f32, C>>, index: usize) -> bool {
    match mask {
        Some(mask) => mask.as_slice()[index * C..(index + 1) * C]
            .iter()
            .all(|&v| v > 0.5),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyramid_sizes_and_masks() -> Result<(), AlignError> {
        let image = Image::<f32, 1>::from_fn([80, 64].into(), |x, y, _| (x + y) as f32);
        let mask = Image::<f32, 1>::from_fn([80, 64].into(), |x, _, _| if x < 40 { 0.0 } else { 3.0 });
        let frame = Frame {
            image,
            mask: Some(mask),
        };

        let spec = PyramidSpec {
            levels: 3,
            zoom_factor: 0.5,
        };
        let levels = build_pyramid(&frame, &spec)?;

        assert_eq!(levels.len(), 3);
        assert_eq!(levels[1].image.size(), ImageSize::from([40, 32]));
        assert_eq!(levels[2].image.size(), ImageSize::from([20, 16]));

        let finest_mask = levels[0].mask.as_ref().expect("mask kept");
        assert_eq!(finest_mask.as_slice()[79], 1.0);
        assert_eq!(finest_mask.as_slice()[0], 0.0);

        let coarse_mask = levels[2].mask.as_ref();
        assert!(mask_valid(coarse_mask, 19));
        assert!(!mask_valid(coarse_mask, 0));
        assert!(mask_valid(None::<&Image<f32, 1>>, 0));

        Ok(())
    }
}
