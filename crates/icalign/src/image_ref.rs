use std::{path::PathBuf, str::FromStr};

use crate::error::AlignError;

/// An image path with an optional mask path, written `path` or `path:maskpath`.
///
/// The first colon separates the image from the mask. Later colons belong to the mask path.
///
/// # Examples
///
/// ```
/// use icalign::ImageRef;
///
/// let reference: ImageRef = "frame.png:masks/frame:0.png".parse().unwrap();
/// assert_eq!(reference.image.to_str(), Some("frame.png"));
/// assert_eq!(reference.mask.unwrap().to_str(), Some("masks/frame:0.png"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Path to the image.
    pub image: PathBuf,
    /// Path to the mask of the image, if any.
    pub mask: Option<PathBuf>,
}

impl ImageRef {
    /// Reference an image without a mask.
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            mask: None,
        }
    }

    /// Attach a mask to the reference.
    pub fn with_mask(mut self, mask: impl Into<PathBuf>) -> Self {
        self.mask = Some(mask.into());
        self
    }
}

impl FromStr for ImageRef {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (image, mask) = match s.split_once(':') {
            Some((image, mask)) => (image, Some(mask)),
            None => (s, None),
        };

        if image.is_empty() || mask.is_some_and(str::is_empty) {
            return Err(AlignError::InvalidImageReference(s.to_string()));
        }

        Ok(Self {
            image: image.into(),
            mask: mask.map(PathBuf::from),
        })
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.mask {
            Some(mask) => write!(f, "{}:{}", self.image.display(), mask.display()),
            None => write!(f, "{}", self.image.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_without_mask() -> Result<(), AlignError> {
        let reference: ImageRef = "data/a.tif".parse()?;
        assert_eq!(reference, ImageRef::new("data/a.tif"));
        Ok(())
    }

    #[test]
    fn parse_with_mask() -> Result<(), AlignError> {
        let reference: ImageRef = "a.png:m.png".parse()?;
        assert_eq!(reference, ImageRef::new("a.png").with_mask("m.png"));
        assert_eq!(reference.to_string(), "a.png:m.png");
        Ok(())
    }

    #[test]
    fn parse_invalid() {
        assert!("".parse::<ImageRef>().is_err());
        assert!(":m.png".parse::<ImageRef>().is_err());
        assert!("a.png:".parse::<ImageRef>().is_err());
    }
}
