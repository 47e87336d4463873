use crate::error::{Error, Result};

/// Borrowed 8-bit grayscale image handed to the decoding engine
///
/// One byte per pixel, row-major. The buffer may be longer than
/// `width * height` (trailing bytes are ignored) but never shorter.
#[derive(Debug, Clone, Copy)]
pub struct GrayFrame<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> GrayFrame<'a> {
    /// Validate dimensions against the buffer
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let needed = width
            .checked_mul(height)
            .ok_or_else(|| Error::invalid(format!("image dimensions {}x{} overflow", width, height)))?;
        if data.len() < needed {
            return Err(Error::invalid(format!(
                "buffer too small for specified dimensions: {} bytes, need {}",
                data.len(),
                needed
            )));
        }
        Ok(Self { data, width, height })
    }

    /// Wrap an `image` crate luma buffer
    pub fn from_luma(image: &'a image::GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(image.as_raw(), width as usize, height as usize)
    }

    /// Pixel rows, trimmed to `width * height`
    pub fn pixels(&self) -> &'a [u8] {
        &self.data[..self.width * self.height]
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row `y` (panics if out of range, like slice indexing)
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}

impl<'a> TryFrom<&'a image::GrayImage> for GrayFrame<'a> {
    type Error = Error;

    fn try_from(image: &'a image::GrayImage) -> Result<Self> {
        Self::from_luma(image)
    }
}
