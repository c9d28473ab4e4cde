//! The assembled book.

use std::collections::HashMap;
use std::sync::Arc;

use super::cover::CoverNode;
use super::page::PageNode;
use super::spine::SpineNode;
use super::FrameContext;
use crate::controller::PageSequencer;
use crate::error::{FlipbookError, Result};
use crate::rig::{PlateFace, PlateGeometry};
use crate::texture::{Rasterizer, TextureData, TextureRequest, TextureSlot};
use crate::types::{collate_pages, BookConfig, BookPatch, CoverSide};

/// Where a finished rasterization lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureKey {
    Page { index: usize, face: PlateFace },
    Cover { side: CoverSide, face: PlateFace },
}

/// The whole book: sequencer, covers, spine and page stack.
///
/// The embedding host drives it with one [`Book::frame`] call per render
/// frame and answers the texture requests it publishes. All navigation
/// state lives in the sequencer; every node reads one snapshot of it per
/// frame.
#[derive(Debug)]
pub struct Book {
    config: BookConfig,
    sequencer: PageSequencer,
    pages: Vec<PageNode>,
    front_cover: CoverNode,
    back_cover: CoverNode,
    spine: Option<SpineNode>,
    pending_requests: Vec<TextureRequest>,
    in_flight: HashMap<u64, TextureKey>,
    next_request_id: u64,
    clock_ms: f64,
}

impl Book {
    /// Build a book from its configuration.
    pub fn new(config: BookConfig) -> Result<Self> {
        let records = collate_pages(config.inner_images(), true);
        if records.is_empty() {
            return Err(FlipbookError::InvalidConfig(
                "page_images must hold four cover faces and at least two inner faces".to_string(),
            ));
        }
        let total_pages = records.len();

        let page_plate = Arc::new(PlateGeometry::build(
            config.page_width,
            config.page_height,
            config.page_depth,
            config.segments,
        )?);
        let cover_plate = Arc::new(PlateGeometry::build(
            config.cover_width,
            config.cover_height,
            config.cover_depth,
            config.segments,
        )?);

        let pages = records
            .into_iter()
            .map(|record| {
                let is_cover_page = record.index == 0 || record.index + 1 == total_pages;
                PageNode::new(
                    record,
                    is_cover_page,
                    page_plate.clone(),
                    config.turn_duration_ms,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let front_cover = CoverNode::new(CoverSide::Front, cover_plate.clone())?;
        let back_cover = CoverNode::new(CoverSide::Back, cover_plate)?;

        let spine = if config.style.spine {
            Some(SpineNode::new(
                config.spine_width,
                config.cover_height,
                config.cover_depth,
            )?)
        } else {
            None
        };

        let sequencer = PageSequencer::new(total_pages, config.next_page);

        let mut book = Self {
            config,
            sequencer,
            pages,
            front_cover,
            back_cover,
            spine,
            pending_requests: Vec::new(),
            in_flight: HashMap::new(),
            next_request_id: 1,
            clock_ms: 0.0,
        };
        book.queue_all_textures();
        Ok(book)
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn total_pages(&self) -> usize {
        self.sequencer.total_pages()
    }

    pub fn current_page(&self) -> usize {
        self.sequencer.current()
    }

    pub fn requested_page(&self) -> usize {
        self.sequencer.requested()
    }

    pub fn book_closed(&self) -> bool {
        self.sequencer.book_closed()
    }

    pub fn opened(&self, page_index: usize) -> bool {
        self.sequencer.opened(page_index)
    }

    pub fn is_settled(&self) -> bool {
        self.sequencer.is_settled()
    }

    pub fn pages(&self) -> &[PageNode] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&PageNode> {
        self.pages.get(index)
    }

    pub fn front_cover(&self) -> &CoverNode {
        &self.front_cover
    }

    pub fn back_cover(&self) -> &CoverNode {
        &self.back_cover
    }

    pub fn spine(&self) -> Option<&SpineNode> {
        self.spine.as_ref()
    }

    /// Request a page programmatically (the `next_page` option path).
    pub fn set_page(&mut self, page: usize) {
        self.sequencer.request(page, self.clock_ms);
    }

    /// Pointer click on a page: advance past it, or turn it back if it is
    /// already open.
    pub fn click_page(&mut self, page_index: usize) {
        if page_index >= self.total_pages() {
            return;
        }
        let target = if self.opened(page_index) {
            page_index
        } else {
            page_index + 1
        };
        self.set_page(target);
    }

    /// Pointer click on a cover: close the book on that side.
    pub fn click_cover(&mut self, side: CoverSide) {
        let target = match side {
            CoverSide::Front => 0,
            CoverSide::Back => self.total_pages(),
        };
        self.set_page(target);
    }

    pub fn hover_page(&mut self, page_index: usize, hovered: bool) {
        if let Some(page) = self.pages.get_mut(page_index) {
            page.set_highlighted(hovered);
        }
    }

    /// Advance the whole book by one frame.
    ///
    /// `now_ms` is the host clock in milliseconds, `dt` the frame delta in
    /// seconds. The sequencer steps first; every node then reads the same
    /// navigation snapshot.
    pub fn frame(&mut self, now_ms: f64, dt: f32) {
        self.clock_ms = now_ms;
        self.sequencer.poll(now_ms);

        let ctx = FrameContext {
            now_ms,
            dt,
            current_page: self.sequencer.current(),
            requested_page: self.sequencer.requested(),
            total_pages: self.sequencer.total_pages(),
            book_closed: self.sequencer.book_closed(),
        };

        let style = self.config.style.clone();
        let spine_width = self.config.spine_width;
        let page_depth = self.config.page_depth;

        self.front_cover.update(&ctx, &style, spine_width);
        self.back_cover.update(&ctx, &style, spine_width);
        if let Some(spine) = &mut self.spine {
            spine.update(&ctx, &style);
        }
        for page in &mut self.pages {
            page.update(&ctx, &style, spine_width, page_depth);
        }
    }

    /// Merge a partial options update into the live book.
    pub fn apply_patch(&mut self, patch: BookPatch) -> Result<()> {
        if let Some(duration) = patch.turn_duration_ms {
            self.config.turn_duration_ms = duration;
            for page in &mut self.pages {
                page.set_turn_duration(duration);
            }
        }
        if let Some(style) = patch.style {
            let spine_changed = style.spine != self.config.style.spine;
            self.config.style = style;
            if spine_changed {
                self.spine = if self.config.style.spine {
                    Some(SpineNode::new(
                        self.config.spine_width,
                        self.config.cover_height,
                        self.config.cover_depth,
                    )?)
                } else {
                    None
                };
            }
        }
        if let Some(page) = patch.next_page {
            self.set_page(page);
        }
        Ok(())
    }

    /// Drain the rasterization jobs the host should run.
    pub fn take_texture_requests(&mut self) -> Vec<TextureRequest> {
        std::mem::take(&mut self.pending_requests)
    }

    /// Number of faces still waiting on the host.
    pub fn pending_texture_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Deliver a finished rasterization.
    ///
    /// A failure (or undecodable bytes) downgrades the face to the
    /// transparent placeholder permanently; the frame loop never sees an
    /// error. Completions for unknown ids are stale and discarded.
    pub fn complete_rasterization(&mut self, id: u64, result: std::result::Result<Vec<u8>, String>) {
        let Some(key) = self.in_flight.remove(&id) else {
            log::debug!("discarding stale rasterization completion {}", id);
            return;
        };

        let slot = match result.and_then(|bytes| {
            TextureData::from_png_bytes(&bytes).map_err(|e| e.to_string())
        }) {
            Ok(data) => TextureSlot::Ready(data),
            Err(error) => {
                log::warn!("rasterization failed for request {}: {}", id, error);
                TextureSlot::Failed
            }
        };

        match key {
            TextureKey::Page { index, face } => {
                if let Some(page) = self.pages.get_mut(index) {
                    page.set_texture(face, slot);
                }
            }
            TextureKey::Cover { side, face } => {
                let cover = match side {
                    CoverSide::Front => &mut self.front_cover,
                    CoverSide::Back => &mut self.back_cover,
                };
                cover.set_texture(face, slot);
            }
        }
    }

    /// Run every pending request through a synchronous rasterizer.
    pub fn rasterize_with(&mut self, rasterizer: &dyn Rasterizer) {
        for request in self.take_texture_requests() {
            let result = rasterizer
                .rasterize(&request.markup, request.width, request.height)
                .map_err(|e| e.to_string());
            self.complete_rasterization(request.id, result);
        }
    }

    fn queue_all_textures(&mut self) {
        let cover_jobs: Vec<(CoverSide, PlateFace, Option<String>)> = vec![
            (
                CoverSide::Front,
                self.front_cover.outer_face(),
                self.config.front_cover().cloned(),
            ),
            (
                CoverSide::Front,
                self.front_cover.inner_face(),
                self.config.front_cover_inner().cloned(),
            ),
            (
                CoverSide::Back,
                self.back_cover.outer_face(),
                self.config.back_cover().cloned(),
            ),
            (
                CoverSide::Back,
                self.back_cover.inner_face(),
                self.config.back_cover_inner().cloned(),
            ),
        ];
        for (side, face, markup) in cover_jobs {
            if let Some(markup) = markup {
                self.queue_texture(TextureKey::Cover { side, face }, markup);
            }
        }

        let page_jobs: Vec<(usize, PlateFace, String)> = self
            .pages
            .iter()
            .filter(|page| page.visible)
            .flat_map(|page| {
                let mut jobs = Vec::new();
                if let Some(front) = &page.record.front {
                    jobs.push((page.index, PlateFace::Front, front.clone()));
                }
                if let Some(back) = &page.record.back {
                    jobs.push((page.index, PlateFace::Back, back.clone()));
                }
                jobs
            })
            .collect();
        for (index, face, markup) in page_jobs {
            self.queue_texture(TextureKey::Page { index, face }, markup);
        }
    }

    fn queue_texture(&mut self, key: TextureKey, markup: String) {
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight.insert(id, key);
        self.pending_requests.push(TextureRequest {
            id,
            markup,
            width: self.config.raster_width,
            height: self.config.raster_height,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::TurnPhase;
    use crate::types::BookStyle;

    fn config(inner_faces: usize) -> BookConfig {
        let mut images = vec!["<svg>front-cover</svg>".to_string(), "<svg>front-inner</svg>".to_string()];
        images.extend((0..inner_faces).map(|i| format!("<svg>page-{}</svg>", i)));
        images.push("<svg>back-inner</svg>".to_string());
        images.push("<svg>back-cover</svg>".to_string());
        BookConfig {
            page_images: images,
            ..BookConfig::default()
        }
    }

    /// 16 inner faces -> 8 image pages + 2 extras = 10 page slots.
    fn book() -> Book {
        Book::new(config(16)).unwrap()
    }

    fn run(book: &mut Book, from_ms: f64, to_ms: f64) {
        let mut now = from_ms;
        while now < to_ms {
            now += 16.0;
            book.frame(now, 0.016);
        }
    }

    #[test]
    fn test_build_derives_page_count() {
        let book = book();
        assert_eq!(book.total_pages(), 10);
        assert!(book.book_closed());
        assert!(!book.pages()[0].visible);
        assert!(!book.pages()[9].visible);
        assert!(book.pages()[1..9].iter().all(|p| p.visible));
    }

    #[test]
    fn test_rejects_books_without_inner_pages() {
        assert!(matches!(
            Book::new(config(0)),
            Err(FlipbookError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_flip_to_back_cover() {
        let mut book = book();
        book.set_page(10);
        run(&mut book, 0.0, 5_000.0);

        assert_eq!(book.current_page(), 10);
        assert!(book.book_closed());
        assert!(book.is_settled());
        for page in 0..10 {
            assert!(book.opened(page));
        }
    }

    #[test]
    fn test_redirect_mid_flight() {
        let mut book = book();
        book.set_page(8);
        let mut now = 0.0;
        while book.current_page() != 5 {
            now += 16.0;
            book.frame(now, 0.016);
        }

        book.set_page(2);
        run(&mut book, now, now + 5_000.0);
        assert_eq!(book.current_page(), 2);
    }

    #[test]
    fn test_step_flips_opened_and_starts_turn() {
        let mut book = book();
        book.set_page(4);
        run(&mut book, 0.0, 5_000.0);
        assert_eq!(book.current_page(), 4);
        assert!(book.opened(3));
        assert!(!book.opened(4));

        // One more step: page 4 starts turning
        book.set_page(5);
        let mut now = 5_000.0;
        while !book.opened(4) {
            now += 16.0;
            book.frame(now, 0.016);
        }
        assert_eq!(book.pages()[4].phase(now), TurnPhase::Turning);
        run(&mut book, now, now + 1_000.0);
        assert_eq!(book.pages()[4].phase(now + 1_000.0), TurnPhase::SettledOpen);
    }

    #[test]
    fn test_out_of_range_request_clamps() {
        let mut book = book();
        book.set_page(99);
        assert_eq!(book.requested_page(), 10);
    }

    #[test]
    fn test_texture_requests_cover_all_faces() {
        let mut book = book();
        let requests = book.take_texture_requests();
        // 4 cover faces + 8 visible pages with front and back
        assert_eq!(requests.len(), 4 + 16);
        assert_eq!(book.pending_texture_count(), 20);
        // Drained: a second take is empty
        assert!(book.take_texture_requests().is_empty());
    }

    #[test]
    fn test_failed_rasterization_leaves_placeholder() {
        let mut book = book();
        let requests = book.take_texture_requests();
        let first = requests[0].id;
        book.complete_rasterization(first, Err("boom".to_string()));

        // Failure is local: everything else still pending, nothing panics
        assert_eq!(book.pending_texture_count(), 19);
        let data = book.front_cover().materials.slot(book.front_cover().outer_face());
        assert_eq!(
            data.texture.render_data(),
            TextureData::transparent_placeholder()
        );
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut book = book();
        book.take_texture_requests();
        book.complete_rasterization(9_999, Ok(vec![1, 2, 3]));
        assert_eq!(book.pending_texture_count(), 20);
    }

    #[test]
    fn test_click_semantics() {
        let mut book = book();
        book.click_page(3);
        assert_eq!(book.requested_page(), 4);
        run(&mut book, 0.0, 5_000.0);

        // Clicking an opened page turns it back
        book.click_page(3);
        assert_eq!(book.requested_page(), 3);

        book.click_cover(CoverSide::Back);
        assert_eq!(book.requested_page(), 10);
        book.click_cover(CoverSide::Front);
        assert_eq!(book.requested_page(), 0);
    }

    #[test]
    fn test_patch_merges_options() {
        let mut book = book();
        book.apply_patch(BookPatch {
            next_page: Some(3),
            turn_duration_ms: Some(250.0),
            style: Some(BookStyle::spineless()),
        })
        .unwrap();

        assert_eq!(book.requested_page(), 3);
        assert_eq!(book.config().turn_duration_ms, 250.0);
        assert!(book.spine().is_none());

        book.apply_patch(BookPatch {
            style: Some(BookStyle::soft()),
            ..BookPatch::default()
        })
        .unwrap();
        assert!(book.spine().is_some());
    }
}
