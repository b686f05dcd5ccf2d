use crate::error::IoError;
use icalign_image::{Image, ImageSize};
use std::path::Path;

/// A real valued image with the channel count resolved at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericImage {
    /// Single channel image.
    Gray(Image<f32, 1>),
    /// Three channel image.
    Rgb(Image<f32, 3>),
}

impl GenericImage {
    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            GenericImage::Gray(image) => image.size(),
            GenericImage::Rgb(image) => image.size(),
        }
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        match self {
            GenericImage::Gray(image) => image.num_channels(),
            GenericImage::Rgb(image) => image.num_channels(),
        }
    }
}

fn is_tiff(file_path: &Path) -> bool {
    file_path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case("tiff") || ext.eq_ignore_ascii_case("tif")
    })
}

/// Reads an image from the given file path.
///
/// TIFF files are decoded with [`crate::tiff::read_image_tiff_f32`], any other format supported
/// by the image crate is decoded into real values in the native range of its samples. An alpha
/// channel is dropped.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// A single channel or a three channel image.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be decoded, or holds an unsupported
/// pixel layout.
pub fn read_image_any(file_path: impl AsRef<Path>) -> Result<GenericImage, IoError> {
    // resolve the file path correctly
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    if is_tiff(&file_path) {
        return crate::tiff::read_image_tiff_f32(file_path);
    }

    let img = image::ImageReader::open(&file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let image = match img.color() {
        image::ColorType::L8 | image::ColorType::La8 => {
            let data = img.into_luma8().into_raw();
            GenericImage::Gray(Image::new(size, data.into_iter().map(f32::from).collect())?)
        }
        image::ColorType::L16 | image::ColorType::La16 => {
            let data = img.into_luma16().into_raw();
            GenericImage::Gray(Image::new(size, data.into_iter().map(f32::from).collect())?)
        }
        image::ColorType::Rgb8 | image::ColorType::Rgba8 => {
            let data = img.into_rgb8().into_raw();
            GenericImage::Rgb(Image::new(size, data.into_iter().map(f32::from).collect())?)
        }
        image::ColorType::Rgb16 | image::ColorType::Rgba16 => {
            let data = img.into_rgb16().into_raw();
            GenericImage::Rgb(Image::new(size, data.into_iter().map(f32::from).collect())?)
        }
        image::ColorType::Rgb32F | image::ColorType::Rgba32F => {
            GenericImage::Rgb(Image::new(size, img.into_rgb32f().into_raw())?)
        }
        other => {
            return Err(IoError::UnsupportedImageFormat(format!(
                "{other:?} in {}",
                file_path.display()
            )))
        }
    };

    Ok(image)
}

fn to_u8_saturating(value: f32) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

/// Writes a real valued image to the given file path.
///
/// TIFF paths keep the values as single precision floats, NaN included. Any other extension is
/// encoded by the image crate as 8 bit samples, rounded and saturated to `[0, 255]`, with NaN
/// written as 0.
///
/// # Arguments
///
/// * `file_path` - The destination path. Its extension selects the format.
/// * `image` - The image to write, with one or three channels.
pub fn write_image_any<const C: usize>(
    file_path: impl AsRef<Path>,
    image: &Image<f32, C>,
) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let color_type = match C {
        1 => image::ColorType::L8,
        3 => image::ColorType::Rgb8,
        _ => {
            return Err(IoError::UnsupportedImageFormat(format!(
                "{C} channels in {}",
                file_path.display()
            )))
        }
    };

    if is_tiff(file_path) {
        let data = image.as_slice().to_vec();
        return match C {
            1 => crate::tiff::write_image_tiff_mono32f(file_path, &Image::new(image.size(), data)?),
            _ => crate::tiff::write_image_tiff_rgb32f(file_path, &Image::new(image.size(), data)?),
        };
    }

    let buf = image
        .as_slice()
        .iter()
        .map(|&v| to_u8_saturating(v))
        .collect::<Vec<_>>();

    image::save_buffer(
        file_path,
        &buf,
        image.width() as u32,
        image.height() as u32,
        color_type,
    )?;

    Ok(())
}
