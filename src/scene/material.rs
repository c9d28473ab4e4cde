//! Retained material state for plate faces.

use crate::anim::easing::damp;
use crate::rig::PlateFace;
use crate::texture::TextureSlot;

/// Highlight emissive color (orange).
pub const HIGHLIGHT_EMISSIVE: [f32; 3] = [1.0, 0.647, 0.0];

/// Paper base color.
pub const PAPER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Cover base color.
pub const COVER_COLOR: [f32; 4] = [0.91, 0.859, 0.773, 1.0];

/// Mutable render parameters for one plate face.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
    pub texture: TextureSlot,
    /// Base color (RGBA).
    pub color: [f32; 4],
    pub roughness: f32,
    pub emissive_color: [f32; 3],
    /// Eased toward the highlight target each frame.
    pub emissive_intensity: f32,
}

impl MaterialParams {
    /// Untextured paper edge material.
    pub fn paper() -> Self {
        Self {
            texture: TextureSlot::Blank,
            color: PAPER_COLOR,
            roughness: 0.1,
            emissive_color: HIGHLIGHT_EMISSIVE,
            emissive_intensity: 0.0,
        }
    }

    /// A face carrying a page image.
    pub fn textured(roughness: f32) -> Self {
        Self {
            texture: TextureSlot::Pending,
            roughness,
            ..Self::paper()
        }
    }

    /// Plain cover-board material.
    pub fn cover_board() -> Self {
        Self {
            texture: TextureSlot::Blank,
            color: COVER_COLOR,
            roughness: 0.3,
            emissive_color: HIGHLIGHT_EMISSIVE,
            emissive_intensity: 0.0,
        }
    }
}

/// The six face materials of one plate, in material-slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMaterials {
    slots: [MaterialParams; 6],
}

impl FaceMaterials {
    /// Inner page: paper edges, textured front and back.
    pub fn page(is_cover_page: bool) -> Self {
        let roughness = if is_cover_page { 0.2 } else { 0.1 };
        Self {
            slots: [
                MaterialParams::paper(),
                MaterialParams::paper(),
                MaterialParams::paper(),
                MaterialParams::paper(),
                MaterialParams::textured(roughness),
                MaterialParams::textured(roughness),
            ],
        }
    }

    /// Cover plate: board edges, textured outer and inner faces.
    pub fn cover() -> Self {
        Self {
            slots: [
                MaterialParams::cover_board(),
                MaterialParams::cover_board(),
                MaterialParams::cover_board(),
                MaterialParams::cover_board(),
                MaterialParams::textured(0.3),
                MaterialParams::textured(0.3),
            ],
        }
    }

    pub fn slot(&self, face: PlateFace) -> &MaterialParams {
        &self.slots[face.slot()]
    }

    pub fn slot_mut(&mut self, face: PlateFace) -> &mut MaterialParams {
        &mut self.slots[face.slot()]
    }

    /// Ease the image faces' emissive intensity toward a target.
    pub fn ease_emissive(&mut self, target: f32, tau: f32, dt: f32) {
        for face in [PlateFace::Front, PlateFace::Back] {
            let slot = self.slot_mut(face);
            slot.emissive_intensity = damp(slot.emissive_intensity, target, tau, dt);
        }
    }
}
