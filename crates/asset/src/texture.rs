//! Texture decoding and data structures.

use image::ImageFormat;

/// Texture data in CPU-friendly format before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub filter: FilterMode,
}

/// Supported texture formats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextureFormat {
    Rgba8,
}

/// Sampling filter used for both minification and magnification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

impl TextureData {
    /// Create a new texture with given dimensions and RGBA8 format.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * 4) as usize,
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
            format: TextureFormat::Rgba8,
            filter: FilterMode::default(),
        }
    }

    /// Decode PNG bytes into an RGBA8 texture.
    pub fn decode_png(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::debug!("Decoded texture {}x{} with {} bytes", width, height, data.len());

        Ok(Self::new_rgba8(width, height, data))
    }

    /// 1x1 opaque white; multiplies to the tint it is drawn with.
    pub fn white() -> Self {
        Self::new_rgba8(1, 1, vec![255; 4])
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    /// Get the number of bytes per pixel for the format.
    pub fn bytes_per_pixel(&self) -> u32 {
        match self.format {
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Check if the texture data is valid.
    pub fn is_valid(&self) -> bool {
        let expected_size = (self.width * self.height * self.bytes_per_pixel()) as usize;
        self.data.len() == expected_size && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use image::{Rgba, RgbaImage};

    use super::*;

    /// 4x2 PNG with a red left half and a blue right half.
    pub(crate) fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).expect("encode png");
        out.into_inner()
    }

    #[test]
    fn decodes_png_into_rgba8() {
        let tex = TextureData::decode_png(&png_bytes()).expect("decode");
        assert_eq!((tex.width, tex.height), (4, 2));
        assert!(tex.is_valid());
        assert_eq!(&tex.data[0..4], &[255, 0, 0, 255]);
        assert_eq!(&tex.data[12..16], &[0, 0, 255, 255]);
        assert_eq!(tex.filter, FilterMode::Nearest);
    }

    #[test]
    fn rejects_non_png_bytes() {
        assert!(TextureData::decode_png(b"GIF89a not really").is_err());
        assert!(TextureData::decode_png(&[]).is_err());
    }

    #[test]
    fn white_is_valid() {
        let tex = TextureData::white().with_filter(FilterMode::Linear);
        assert!(tex.is_valid());
        assert_eq!(tex.filter, FilterMode::Linear);
    }
}
