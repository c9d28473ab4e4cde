//! Page records and image collation.

use serde::{Deserialize, Serialize};

/// Vector markup for one page face, rasterized by the host.
pub type ImageSource = String;

/// One leaf of the book: a front face and a back face.
///
/// Slots without images are "extra" pages: invisible placeholders that keep
/// the page indexing aligned with the covers at both ends of the stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRecord {
    /// Position in the page stack, 0-based.
    pub index: usize,
    /// Image shown when the page lies to the right (unopened).
    pub front: Option<ImageSource>,
    /// Image shown when the page has been turned to the left.
    pub back: Option<ImageSource>,
}

impl PageRecord {
    /// Check if this is an invisible placeholder slot.
    pub fn is_extra(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }
}

/// Pair an ordered list of inner images into page records, two per page.
///
/// With `extra_slots`, an empty record is prepended and appended so the
/// first and last visible pages sit one slot in from the covers. An odd
/// trailing image becomes a page with a blank back face.
pub fn collate_pages(pictures: &[ImageSource], extra_slots: bool) -> Vec<PageRecord> {
    let mut pages = Vec::new();

    if pictures.len() >= 2 {
        if extra_slots {
            pages.push(PageRecord::default());
        }

        for pair in pictures.chunks(2) {
            pages.push(PageRecord {
                index: 0,
                front: Some(pair[0].clone()),
                back: pair.get(1).cloned(),
            });
        }

        if extra_slots {
            pages.push(PageRecord::default());
        }
    }

    for (i, page) in pages.iter_mut().enumerate() {
        page.index = i;
    }

    pages
}

/// Which cover of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverSide {
    Front,
    Back,
}

impl CoverSide {
    /// Sign convention for the cover's stacking direction: front covers sit
    /// at negative Z when closed, back covers at positive Z.
    pub fn stack_sign(&self) -> f32 {
        match self {
            CoverSide::Front => -1.0,
            CoverSide::Back => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pics(n: usize) -> Vec<ImageSource> {
        (0..n).map(|i| format!("<svg>{}</svg>", i)).collect()
    }

    #[test]
    fn test_collate_pairs_images() {
        let pages = collate_pages(&pics(6), false);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].front.as_deref(), Some("<svg>2</svg>"));
        assert_eq!(pages[1].back.as_deref(), Some("<svg>3</svg>"));
        assert!(pages.iter().all(|p| !p.is_extra()));
    }

    #[test]
    fn test_collate_extra_slots() {
        let pages = collate_pages(&pics(4), true);
        assert_eq!(pages.len(), 4);
        assert!(pages[0].is_extra());
        assert!(pages[3].is_extra());
        assert!(!pages[1].is_extra());
        // Indices stay contiguous across extras
        assert_eq!(pages.iter().map(|p| p.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_collate_too_few_images() {
        assert!(collate_pages(&pics(1), true).is_empty());
        assert!(collate_pages(&[], false).is_empty());
    }

    #[test]
    fn test_collate_odd_count_blank_back() {
        let pages = collate_pages(&pics(5), false);
        assert_eq!(pages.len(), 3);
        assert!(pages[2].front.is_some());
        assert!(pages[2].back.is_none());
    }
}
