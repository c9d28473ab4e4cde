//! Texture handling for page faces.
//!
//! The host owns rasterization: the book publishes [`TextureRequest`]s for
//! its vector-markup page faces and the host answers each one with PNG
//! bytes, possibly much later. Until then a face renders with the
//! transparent placeholder; a failed rasterization keeps it forever (no
//! retries).

use crate::error::Result;

/// Raw RGBA8 texture data.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// RGBA8 pixel data (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a new texture from RGBA data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// The 1x1 fully transparent placeholder used while an image is
    /// pending or after it failed.
    pub fn transparent_placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0, 0],
        }
    }

    /// Decode PNG bytes delivered by the host's rasterizer.
    pub fn from_png_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)?;
        let rgba = img.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    /// Check if any texel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.pixels.chunks(4).any(|pixel| pixel[3] < 255)
    }
}

/// The loading state of one face texture.
///
/// The state is swapped whole: a reader either sees the placeholder or the
/// finished texture, never a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSlot {
    /// No image assigned (blank paper faces).
    Blank,
    /// Waiting on the host's rasterizer.
    Pending,
    /// Rasterized and decoded.
    Ready(TextureData),
    /// Rasterization failed; the placeholder stays for this instance's
    /// lifetime.
    Failed,
}

impl TextureSlot {
    /// The texture to render right now. Pending and failed slots resolve
    /// to the transparent placeholder.
    pub fn render_data(&self) -> TextureData {
        match self {
            TextureSlot::Ready(data) => data.clone(),
            _ => TextureData::transparent_placeholder(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TextureSlot::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, TextureSlot::Ready(_))
    }
}

/// A rasterization job for the host: vector markup to a raster of the
/// requested size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRequest {
    /// Correlates the host's completion with the requesting face.
    pub id: u64,
    /// Vector markup to rasterize.
    pub markup: String,
    pub width: u32,
    pub height: u32,
}

/// Synchronous rasterizer, for CLIs and tests. Browser hosts answer
/// [`TextureRequest`]s asynchronously instead.
pub trait Rasterizer {
    /// Convert vector markup to PNG bytes at the given size.
    fn rasterize(&self, markup: &str, width: u32, height: u32) -> Result<Vec<u8>>;
}
