use std::path::Path;

use icalign_image::Image;
use icalign_io::{functional::read_image_any, GenericImage};

use crate::{
    error::{AlignError, Geometry},
    image_ref::ImageRef,
};

/// An image and its optional mask, sharing the same geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<const C: usize> {
    /// The pixels of the image.
    pub image: Image<f32, C>,
    /// The mask of the image. A pixel takes part in the estimation where its mask is positive.
    pub mask: Option<Image<f32, C>>,
}

impl<const C: usize> Frame<C> {
    /// An image without a mask.
    pub fn new(image: Image<f32, C>) -> Self {
        Self { image, mask: None }
    }

    /// The geometry of the image.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            width: self.image.width(),
            height: self.image.height(),
            channels: C,
        }
    }
}

/// The reference frame and the frame aligned onto it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePair<const C: usize> {
    /// The reference frame.
    pub first: Frame<C>,
    /// The frame aligned onto the reference.
    pub second: Frame<C>,
}

/// A loaded image pair with the channel count resolved at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedPair {
    /// Single channel images.
    Gray(ImagePair<1>),
    /// Three channel images.
    Rgb(ImagePair<3>),
}

impl LoadedPair {
    /// The geometry shared by both images.
    pub fn geometry(&self) -> Geometry {
        match self {
            LoadedPair::Gray(pair) => pair.first.geometry(),
            LoadedPair::Rgb(pair) => pair.first.geometry(),
        }
    }
}

fn geometry_of(image: &GenericImage) -> Geometry {
    let size = image.size();
    Geometry {
        width: size.width,
        height: size.height,
        channels: image.num_channels(),
    }
}

fn load(path: &Path) -> Result<GenericImage, AlignError> {
    read_image_any(path).map_err(|source| AlignError::LoadFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Conversion out of a [`GenericImage`] with a known channel count.
trait FromGeneric: Sized {
    fn from_generic(image: GenericImage) -> Option<Self>;
}

impl FromGeneric for Image<f32, 1> {
    fn from_generic(image: GenericImage) -> Option<Self> {
        match image {
            GenericImage::Gray(image) => Some(image),
            GenericImage::Rgb(_) => None,
        }
    }
}

impl FromGeneric for Image<f32, 3> {
    fn from_generic(image: GenericImage) -> Option<Self> {
        match image {
            GenericImage::Rgb(image) => Some(image),
            GenericImage::Gray(_) => None,
        }
    }
}

/// A loaded image with its optional, already validated, mask.
struct LoadedFrame {
    image: GenericImage,
    mask: Option<GenericImage>,
}

impl LoadedFrame {
    fn into_frame<const C: usize>(self, geometries: (Geometry, Geometry)) -> Result<Frame<C>, AlignError>
    where
        Image<f32, C>: FromGeneric,
    {
        let to_typed = |image: GenericImage| {
            Image::<f32, C>::from_generic(image)
                .ok_or(AlignError::GeometryMismatch(geometries.0, geometries.1))
        };

        Ok(Frame {
            image: to_typed(self.image)?,
            mask: self.mask.map(to_typed).transpose()?,
        })
    }
}

fn load_frame(reference: &ImageRef, index: usize) -> Result<LoadedFrame, AlignError> {
    let image = load(&reference.image)?;

    let mask = match &reference.mask {
        Some(mask_path) => {
            log::info!("use mask for image{index}");
            let mask = load(mask_path)?;
            let (expected, found) = (geometry_of(&image), geometry_of(&mask));
            if expected != found {
                return Err(AlignError::MaskMismatch {
                    path: mask_path.clone(),
                    expected,
                    found,
                });
            }
            Some(mask)
        }
        None => None,
    };

    Ok(LoadedFrame { image, mask })
}

/// Load both images of an alignment, and their masks.
///
/// # Arguments
///
/// * `first` - The reference image.
/// * `second` - The image aligned onto the reference.
///
/// # Errors
///
/// Fails if an image or mask cannot be decoded, if a mask does not have the geometry of its
/// image, or if the two images differ in width, height or channel count.
pub fn load_pair(first: &ImageRef, second: &ImageRef) -> Result<LoadedPair, AlignError> {
    let first = load_frame(first, 1)?;
    let second = load_frame(second, 2)?;

    let (g1, g2) = (geometry_of(&first.image), geometry_of(&second.image));
    if g1 != g2 {
        return Err(AlignError::GeometryMismatch(g1, g2));
    }

    log::debug!("loaded two {g1} images");

    Ok(match g1.channels {
        1 => LoadedPair::Gray(ImagePair {
            first: first.into_frame((g1, g2))?,
            second: second.into_frame((g1, g2))?,
        }),
        _ => LoadedPair::Rgb(ImagePair {
            first: first.into_frame((g1, g2))?,
            second: second.into_frame((g1, g2))?,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use icalign_io::functional::write_image_any;

    fn write_rgb(dir: &Path, name: &str, width: usize, height: usize) -> std::path::PathBuf {
        let path = dir.join(name);
        let image = Image::<f32, 3>::from_fn([width, height].into(), |x, y, c| (x + y + c) as f32);
        write_image_any(&path, &image).expect("write test image");
        path
    }

    fn write_gray(dir: &Path, name: &str, width: usize, height: usize) -> std::path::PathBuf {
        let path = dir.join(name);
        let image = Image::<f32, 1>::from_fn([width, height].into(), |x, y, _| (x * y) as f32);
        write_image_any(&path, &image).expect("write test image");
        path
    }

    #[test]
    fn load_rgb_pair_with_masks() -> Result<(), AlignError> {
        let dir = tempfile::tempdir().map_err(icalign_io::IoError::from)?;
        let a = write_rgb(dir.path(), "a.tif", 8, 6);
        let b = write_rgb(dir.path(), "b.tif", 8, 6);
        let m = write_rgb(dir.path(), "m.png", 8, 6);

        let pair = load_pair(
            &ImageRef::new(&a).with_mask(&m),
            &ImageRef::new(&b).with_mask(&m),
        )?;

        let LoadedPair::Rgb(pair) = pair else {
            panic!("expected three channel images");
        };
        assert!(pair.first.mask.is_some());
        assert!(pair.second.mask.is_some());
        assert_eq!(
            pair.first.geometry(),
            Geometry {
                width: 8,
                height: 6,
                channels: 3
            }
        );

        Ok(())
    }

    #[test]
    fn load_gray_pair() -> Result<(), AlignError> {
        let dir = tempfile::tempdir().map_err(icalign_io::IoError::from)?;
        let a = write_gray(dir.path(), "a.png", 5, 5);

        let pair = load_pair(&ImageRef::new(&a), &ImageRef::new(&a))?;
        assert!(matches!(pair, LoadedPair::Gray(_)));
        assert_eq!(pair.geometry().channels, 1);

        Ok(())
    }

    #[test]
    fn load_size_mismatch() -> Result<(), AlignError> {
        let dir = tempfile::tempdir().map_err(icalign_io::IoError::from)?;
        let a = write_rgb(dir.path(), "a.tif", 64, 64);
        let b = write_rgb(dir.path(), "b.tif", 32, 32);

        let result = load_pair(&ImageRef::new(&a), &ImageRef::new(&b));
        assert!(matches!(result, Err(AlignError::GeometryMismatch(g1, g2))
            if g1.width == 64 && g2.width == 32));

        Ok(())
    }

    #[test]
    fn load_channel_mismatch() -> Result<(), AlignError> {
        let dir = tempfile::tempdir().map_err(icalign_io::IoError::from)?;
        let a = write_rgb(dir.path(), "a.tif", 8, 8);
        let b = write_gray(dir.path(), "b.tif", 8, 8);

        let result = load_pair(&ImageRef::new(&a), &ImageRef::new(&b));
        assert!(matches!(result, Err(AlignError::GeometryMismatch(..))));

        Ok(())
    }

    #[test]
    fn load_mask_mismatch() -> Result<(), AlignError> {
        let dir = tempfile::tempdir().map_err(icalign_io::IoError::from)?;
        let a = write_rgb(dir.path(), "a.tif", 8, 8);
        let m = write_gray(dir.path(), "m.tif", 8, 8);

        let result = load_pair(&ImageRef::new(&a), &ImageRef::new(&a).with_mask(&m));
        assert!(matches!(result, Err(AlignError::MaskMismatch { .. })));

        Ok(())
    }

    #[test]
    fn load_missing_image() -> Result<(), AlignError> {
        let dir = tempfile::tempdir().map_err(icalign_io::IoError::from)?;
        let a = write_gray(dir.path(), "a.png", 4, 4);
        let missing = dir.path().join("missing.png");

        let result = load_pair(&ImageRef::new(&a), &ImageRef::new(&missing));
        assert!(matches!(result, Err(AlignError::LoadFailed { path, .. }) if path == missing));

        Ok(())
    }
}
