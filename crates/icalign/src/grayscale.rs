use icalign_image::Image;
use icalign_imgproc::color::gray_from_rgb_mean;

use crate::{
    error::AlignError,
    loader::{Frame, ImagePair},
};

fn reduce_image(image: &Image<f32, 3>) -> Result<Image<f32, 1>, AlignError> {
    let mut gray = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
    gray_from_rgb_mean(image, &mut gray)?;
    Ok(gray)
}

/// Reduce a three channel frame, image and mask, to a single channel.
pub fn reduce_frame(frame: &Frame<3>) -> Result<Frame<1>, AlignError> {
    Ok(Frame {
        image: reduce_image(&frame.image)?,
        mask: frame.mask.as_ref().map(reduce_image).transpose()?,
    })
}

/// Reduce both frames of a three channel pair to a single channel.
///
/// Each value becomes the unweighted mean `(r + g + b) / 3`. Both images and both masks are
/// reduced together.
pub fn reduce_pair(pair: &ImagePair<3>) -> Result<ImagePair<1>, AlignError> {
    Ok(ImagePair {
        first: reduce_frame(&pair.first)?,
        second: reduce_frame(&pair.second)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use icalign_image::ImageSize;

    #[test]
    fn reduce_pair_with_mask() -> Result<(), AlignError> {
        let size = ImageSize {
            width: 3,
            height: 2,
        };
        let image = Image::<f32, 3>::from_fn(size, |x, y, c| (x + 10 * y + 100 * c) as f32);
        let mask = Image::<f32, 3>::from_fn(size, |x, _, c| if c == 0 { x as f32 } else { 0.0 });

        let pair = ImagePair {
            first: Frame {
                image: image.clone(),
                mask: Some(mask),
            },
            second: Frame::new(image),
        };

        let gray = reduce_pair(&pair)?;

        // (v + v + 100 + v + 200) / 3 = v + 100
        assert_eq!(gray.first.image.get([1, 2, 0]), Some(&112.0));
        assert_eq!(gray.second.image, gray.first.image);

        let mask = gray.first.mask.expect("mask is reduced along its image");
        approx::assert_relative_eq!(mask.as_slice()[2], 2.0 / 3.0);
        assert!(gray.second.mask.is_none());

        Ok(())
    }
}
