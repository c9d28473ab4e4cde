//! WASM bindings for flipbook-rig.
//!
//! This module provides the JavaScript-friendly mount/update/unmount
//! surface for browser hosts. The host owns the canvas, render pipeline
//! and rasterization; the handle owns the book and answers with flat
//! buffers each frame.

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the browser console
    console_error_panic_hook::set_once();
}

/// A mounted book. Dropping the handle (or calling `dispose`) releases
/// every resource; pending rasterizations become no-ops.
#[wasm_bindgen]
pub struct BookHandle {
    inner: Option<crate::Book>,
}

#[wasm_bindgen]
impl BookHandle {
    /// Mount a book from a JSON `BookConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: &str) -> Result<BookHandle, JsError> {
        let config: crate::BookConfig =
            serde_json::from_str(options_json).map_err(|e| JsError::new(&e.to_string()))?;
        let book = crate::Book::new(config).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(BookHandle { inner: Some(book) })
    }

    /// Merge a JSON `BookPatch` into the live book.
    pub fn update(&mut self, patch_json: &str) -> Result<(), JsError> {
        let patch: crate::BookPatch =
            serde_json::from_str(patch_json).map_err(|e| JsError::new(&e.to_string()))?;
        self.book_mut()?
            .apply_patch(patch)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Release the book. Later calls fail cleanly.
    pub fn dispose(&mut self) {
        self.inner = None;
    }

    /// Advance one frame. `now_ms` is the host clock, `dt` in seconds.
    pub fn frame(&mut self, now_ms: f64, dt: f32) -> Result<(), JsError> {
        self.book_mut()?.frame(now_ms, dt);
        Ok(())
    }

    pub fn set_page(&mut self, page: usize) -> Result<(), JsError> {
        self.book_mut()?.set_page(page);
        Ok(())
    }

    pub fn click_page(&mut self, page_index: usize) -> Result<(), JsError> {
        self.book_mut()?.click_page(page_index);
        Ok(())
    }

    pub fn click_cover(&mut self, back_cover: bool) -> Result<(), JsError> {
        let side = if back_cover {
            crate::CoverSide::Back
        } else {
            crate::CoverSide::Front
        };
        self.book_mut()?.click_cover(side);
        Ok(())
    }

    pub fn hover_page(&mut self, page_index: usize, hovered: bool) -> Result<(), JsError> {
        self.book_mut()?.hover_page(page_index, hovered);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn current_page(&self) -> usize {
        self.inner.as_ref().map(|b| b.current_page()).unwrap_or(0)
    }

    #[wasm_bindgen(getter)]
    pub fn requested_page(&self) -> usize {
        self.inner.as_ref().map(|b| b.requested_page()).unwrap_or(0)
    }

    #[wasm_bindgen(getter)]
    pub fn total_pages(&self) -> usize {
        self.inner.as_ref().map(|b| b.total_pages()).unwrap_or(0)
    }

    #[wasm_bindgen(getter)]
    pub fn book_closed(&self) -> bool {
        self.inner.as_ref().map(|b| b.book_closed()).unwrap_or(true)
    }

    #[wasm_bindgen(getter)]
    pub fn is_settled(&self) -> bool {
        self.inner.as_ref().map(|b| b.is_settled()).unwrap_or(true)
    }

    /// Drain pending rasterization jobs as a JSON array of
    /// `{id, markup, width, height}`.
    pub fn take_texture_requests(&mut self) -> Result<String, JsError> {
        #[derive(serde::Serialize)]
        struct Job {
            id: u64,
            markup: String,
            width: u32,
            height: u32,
        }

        let jobs: Vec<Job> = self
            .book_mut()?
            .take_texture_requests()
            .into_iter()
            .map(|r| Job {
                id: r.id,
                markup: r.markup,
                width: r.width,
                height: r.height,
            })
            .collect();
        serde_json::to_string(&jobs).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Deliver PNG bytes for a rasterization job.
    pub fn complete_rasterization(&mut self, id: u64, png_bytes: &[u8]) {
        // Completions after dispose are no-ops by design
        if let Some(book) = self.inner.as_mut() {
            book.complete_rasterization(id, Ok(png_bytes.to_vec()));
        }
    }

    /// Report a failed rasterization job; the face keeps its placeholder.
    pub fn fail_rasterization(&mut self, id: u64, error: &str) {
        if let Some(book) = self.inner.as_mut() {
            book.complete_rasterization(id, Err(error.to_string()));
        }
    }

    /// Skinned world-space positions for one page, flattened.
    pub fn page_positions(&self, page_index: usize) -> Result<js_sys::Float32Array, JsError> {
        let book = self.book_ref()?;
        let page = book
            .page(page_index)
            .ok_or_else(|| JsError::new("page index out of range"))?;
        let flat: Vec<f32> = page
            .skinned_positions()
            .into_iter()
            .flatten()
            .collect();
        Ok(js_sys::Float32Array::from(flat.as_slice()))
    }

    /// Current joint matrices for one page, 16 floats per joint.
    pub fn page_joint_matrices(&self, page_index: usize) -> Result<js_sys::Float32Array, JsError> {
        let book = self.book_ref()?;
        let page = book
            .page(page_index)
            .ok_or_else(|| JsError::new("page index out of range"))?;
        let buffers =
            crate::mesh_output::RigBuffers::capture(page.plate(), page.chain(), page.skin());
        let flat: Vec<f32> = buffers.joint_matrices.into_iter().flatten().collect();
        Ok(js_sys::Float32Array::from(flat.as_slice()))
    }

    /// Static rig buffers for one page as JSON (upload once, then refresh
    /// matrices per frame).
    pub fn page_buffers(&self, page_index: usize) -> Result<String, JsError> {
        let book = self.book_ref()?;
        let page = book
            .page(page_index)
            .ok_or_else(|| JsError::new("page index out of range"))?;
        let buffers =
            crate::mesh_output::RigBuffers::capture(page.plate(), page.chain(), page.skin());
        serde_json::to_string(&buffers).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Export one page as a skinned GLB in its current pose.
    pub fn export_page_glb(&self, page_index: usize) -> Result<Vec<u8>, JsError> {
        let book = self.book_ref()?;
        let page = book
            .page(page_index)
            .ok_or_else(|| JsError::new("page index out of range"))?;
        crate::export_skinned_glb(page.plate(), page.chain(), page.skin())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    fn book_ref(&self) -> Result<&crate::Book, JsError> {
        self.inner
            .as_ref()
            .ok_or_else(|| JsError::new("book has been disposed"))
    }

    fn book_mut(&mut self) -> Result<&mut crate::Book, JsError> {
        self.inner
            .as_mut()
            .ok_or_else(|| JsError::new("book has been disposed"))
    }
}
