use glam::Vec2;

use crate::api::error::EngineResult;

/// Dimensions of a loaded raster image, reported by the host on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Decode encoded image bytes (PNG) and read their dimensions.
    /// For native hosts; browsers report `naturalWidth`/`naturalHeight` instead.
    pub fn from_bytes(bytes: &[u8]) -> EngineResult<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::new(img.width(), img.height()))
    }

    /// Size as an entity extent in pixels.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::EngineError;
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(w, h);
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_dimensions() {
        let info = ImageInfo::from_bytes(&png_bytes(34, 24)).unwrap();
        assert_eq!(info, ImageInfo::new(34, 24));
        assert_eq!(info.size(), Vec2::new(34.0, 24.0));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = ImageInfo::from_bytes(b"definitely not a png").unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }
}
