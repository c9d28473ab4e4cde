//! Book configuration.

use super::page::ImageSource;
use super::style::BookStyle;
use serde::{Deserialize, Serialize};

/// Number of bend segments along a page's width.
pub const PAGE_SEGMENTS: usize = 30;

/// Everything needed to build a book.
///
/// `page_images` is the full ordered image list: front cover, front cover
/// inner, the inner page faces two per page, back cover inner, back cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Ordered vector-markup sources for every face of the book.
    pub page_images: Vec<ImageSource>,
    pub page_width: f32,
    pub page_height: f32,
    pub page_depth: f32,
    pub cover_width: f32,
    pub cover_height: f32,
    pub cover_depth: f32,
    pub spine_width: f32,
    /// Page index the book opens to.
    pub next_page: usize,
    /// Bend segments per page.
    pub segments: usize,
    /// Duration of one page-turn transient, milliseconds.
    pub turn_duration_ms: f64,
    /// Raster size requested from the host for each face texture.
    pub raster_width: u32,
    /// Raster size requested from the host for each face texture.
    pub raster_height: u32,
    pub style: BookStyle,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            page_images: Vec::new(),
            page_width: 1.28,
            page_height: 1.71,
            page_depth: 0.003,
            cover_width: 1.32,
            cover_height: 1.75,
            cover_depth: 0.012,
            spine_width: 0.12,
            next_page: 0,
            segments: PAGE_SEGMENTS,
            turn_duration_ms: 400.0,
            raster_width: 512,
            raster_height: 512,
            style: BookStyle::default(),
        }
    }
}

impl BookConfig {
    /// Width of one bend segment, derived from the cover width so page and
    /// cover rigs share joint spacing.
    pub fn segment_width(&self) -> f32 {
        self.cover_width / self.segments as f32
    }

    pub fn front_cover(&self) -> Option<&ImageSource> {
        self.page_images.first()
    }

    pub fn front_cover_inner(&self) -> Option<&ImageSource> {
        self.page_images.get(1)
    }

    pub fn back_cover(&self) -> Option<&ImageSource> {
        self.page_images.last()
    }

    pub fn back_cover_inner(&self) -> Option<&ImageSource> {
        let len = self.page_images.len();
        len.checked_sub(2).and_then(|i| self.page_images.get(i))
    }

    /// The inner page faces, covers stripped from both ends.
    pub fn inner_images(&self) -> &[ImageSource] {
        if self.page_images.len() <= 4 {
            return &[];
        }
        &self.page_images[2..self.page_images.len() - 2]
    }
}

/// A partial options update, merged into a live book.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub next_page: Option<usize>,
    pub turn_duration_ms: Option<f64>,
    pub style: Option<BookStyle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(n: usize) -> Vec<ImageSource> {
        (0..n).map(|i| format!("<svg>{}</svg>", i)).collect()
    }

    #[test]
    fn test_image_layout_accessors() {
        let config = BookConfig {
            page_images: images(8),
            ..BookConfig::default()
        };
        assert_eq!(config.front_cover().unwrap(), "<svg>0</svg>");
        assert_eq!(config.front_cover_inner().unwrap(), "<svg>1</svg>");
        assert_eq!(config.back_cover_inner().unwrap(), "<svg>6</svg>");
        assert_eq!(config.back_cover().unwrap(), "<svg>7</svg>");
        assert_eq!(config.inner_images().len(), 4);
    }

    #[test]
    fn test_inner_images_empty_when_only_covers() {
        let config = BookConfig {
            page_images: images(4),
            ..BookConfig::default()
        };
        assert!(config.inner_images().is_empty());
    }

    #[test]
    fn test_segment_width() {
        let config = BookConfig {
            cover_width: 3.0,
            segments: 30,
            ..BookConfig::default()
        };
        assert!((config.segment_width() - 0.1).abs() < 1e-6);
    }
}
