//! A single rigged page in the stack.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use super::material::FaceMaterials;
use super::FrameContext;
use crate::anim::easing::{damp, damp_angle};
use crate::anim::{joint_angles, TurnPhase, TurnState};
use crate::error::Result;
use crate::rig::{BoneChain, PlateFace, PlateGeometry, Skin};
use crate::texture::TextureSlot;
use crate::types::{BookStyle, PageRecord};

/// Retained state of one page: rig, turn state and materials.
///
/// The node owns two eased Z offsets because the stacking offset moves
/// between the outer pivot group and the mesh itself depending on whether
/// the book rests on an opening edge.
#[derive(Debug, Clone)]
pub struct PageNode {
    pub index: usize,
    pub record: PageRecord,
    /// Extra alignment slots exist in the stack but never render.
    pub visible: bool,
    plate: Arc<PlateGeometry>,
    chain: BoneChain,
    skin: Skin,
    turn_state: TurnState,
    pub materials: FaceMaterials,
    highlighted: bool,
    /// Eased rotation of the page's pivot group around the turn axis.
    pivot_turn: f32,
    group_z: f32,
    mesh_z: f32,
}

impl PageNode {
    pub fn new(
        record: PageRecord,
        is_cover_page: bool,
        plate: Arc<PlateGeometry>,
        turn_duration_ms: f64,
    ) -> Result<Self> {
        let chain = BoneChain::new(plate.segments() + 1, plate.segment_width());
        let skin = Skin::bind(&plate, &chain)?;
        let visible = !record.is_extra();

        Ok(Self {
            index: record.index,
            record,
            visible,
            plate,
            chain,
            skin,
            turn_state: TurnState::new(false, turn_duration_ms),
            materials: FaceMaterials::page(is_cover_page),
            highlighted: false,
            pivot_turn: 0.0,
            group_z: 0.0,
            mesh_z: 0.0,
        })
    }

    pub fn plate(&self) -> &PlateGeometry {
        &self.plate
    }

    pub fn chain(&self) -> &BoneChain {
        &self.chain
    }

    pub fn skin(&self) -> &Skin {
        &self.skin
    }

    pub fn pivot_turn(&self) -> f32 {
        self.pivot_turn
    }

    /// Z offset of the outer pivot group.
    pub fn group_z(&self) -> f32 {
        self.group_z
    }

    /// Z offset of the mesh inside the pivot group.
    pub fn mesh_z(&self) -> f32 {
        self.mesh_z
    }

    pub fn phase(&self, now_ms: f64) -> TurnPhase {
        self.turn_state.phase(now_ms)
    }

    pub fn opened(&self) -> bool {
        self.turn_state.opened()
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub fn set_turn_duration(&mut self, duration_ms: f64) {
        self.turn_state = TurnState::new(self.turn_state.opened(), duration_ms);
    }

    /// Swap in a resolved (or failed) face texture. Atomic from the render
    /// loop's perspective: the slot changes in one assignment.
    pub fn set_texture(&mut self, face: PlateFace, slot: TextureSlot) {
        self.materials.slot_mut(face).texture = slot;
    }

    /// Advance the page by one frame.
    pub fn update(
        &mut self,
        ctx: &FrameContext,
        style: &BookStyle,
        spine_width: f32,
        page_depth: f32,
    ) {
        let opened = ctx.current_page > self.index;
        let turning = self.turn_state.update(opened, ctx.now_ms);

        // Stacking offset rides the pivot group in the interior and the
        // mesh on the opening edges.
        let on_edge = ctx.requested_page == 1
            || ctx.requested_page + 1 == ctx.total_pages;
        let stack_z = spine_width / 2.0 - self.index as f32 * page_depth;
        let (group_target, mesh_target) = if on_edge {
            (0.0, stack_z)
        } else {
            (stack_z, 0.0)
        };
        self.group_z = damp(self.group_z, group_target, style.turn_tau, ctx.dt);
        self.mesh_z = damp(self.mesh_z, mesh_target, style.turn_tau, ctx.dt);

        let mut target_angle = if opened { -FRAC_PI_2 } else { FRAC_PI_2 };
        if !ctx.book_closed {
            let middle = ctx.total_pages as f32 / 2.0;
            target_angle +=
                ((self.index as f32 - middle) * style.interior_tilt_degrees).to_radians();
        }

        if ctx.book_closed {
            // Pages flatten into the closed stack
            self.pivot_turn = damp_angle(self.pivot_turn, 0.0, style.turn_tau, ctx.dt);
            self.ease_chain_to_rest(style, ctx.dt);
        } else if ctx.requested_page == 1 {
            self.pivot_turn = damp_angle(self.pivot_turn, FRAC_PI_2, style.turn_tau, ctx.dt);
            self.ease_chain_to_rest(style, ctx.dt);
        } else if ctx.requested_page + 1 == ctx.total_pages {
            self.pivot_turn = damp_angle(self.pivot_turn, -FRAC_PI_2, style.turn_tau, ctx.dt);
            self.ease_chain_to_rest(style, ctx.dt);
        } else {
            for joint in 0..self.chain.len() {
                let target = joint_angles(
                    joint,
                    self.chain.len(),
                    ctx.total_pages,
                    target_angle,
                    turning,
                    false,
                    &style.curvature,
                );
                let (turn, fold) = self.chain.angles(joint);
                let next_fold = damp_angle(fold, target.fold, style.fold_tau, ctx.dt);

                if joint == 0 {
                    // The root's swing lives on the pivot group
                    self.pivot_turn =
                        damp_angle(self.pivot_turn, target.turn, style.turn_tau, ctx.dt);
                    self.chain.set_angles(joint, turn, next_fold);
                } else {
                    let next_turn = damp_angle(turn, target.turn, style.turn_tau, ctx.dt);
                    self.chain.set_angles(joint, next_turn, next_fold);
                }
            }
        }

        let emissive_target = if self.highlighted {
            style.highlight_intensity
        } else {
            0.0
        };
        self.materials
            .ease_emissive(emissive_target, style.turn_tau, ctx.dt);
    }

    fn ease_chain_to_rest(&mut self, style: &BookStyle, dt: f32) {
        for joint in 0..self.chain.len() {
            let (turn, fold) = self.chain.angles(joint);
            self.chain.set_angles(
                joint,
                damp_angle(turn, 0.0, style.turn_tau, dt),
                damp_angle(fold, 0.0, style.fold_tau, dt),
            );
        }
    }

    /// Skinned world-space vertex positions for the current pose.
    pub fn skinned_positions(&self) -> Vec<[f32; 3]> {
        self.skin.skin_positions(&self.plate, &self.chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FrameContext;

    fn page(index: usize) -> PageNode {
        let plate = Arc::new(PlateGeometry::build(1.28, 1.71, 0.003, 30).unwrap());
        let record = PageRecord {
            index,
            front: Some("<svg/>".to_string()),
            back: Some("<svg/>".to_string()),
        };
        PageNode::new(record, false, plate, 400.0).unwrap()
    }

    fn ctx(now_ms: f64, current: usize, requested: usize, total: usize) -> FrameContext {
        FrameContext {
            now_ms,
            dt: 1.0 / 60.0,
            current_page: current,
            requested_page: requested,
            total_pages: total,
            book_closed: current == 0 || current == total,
        }
    }

    fn settle(node: &mut PageNode, current: usize, requested: usize, total: usize) {
        let style = BookStyle::soft();
        for frame in 0..600 {
            let now = 10_000.0 + frame as f64 * 16.0;
            node.update(&ctx(now, current, requested, total), &style, 0.12, 0.003);
        }
    }

    #[test]
    fn test_open_page_swings_negative() {
        let mut node = page(3);
        // current 5 > 3: opened, interior
        settle(&mut node, 5, 5, 10);
        assert!(node.pivot_turn() < 0.0);
        assert!(node.opened());
    }

    #[test]
    fn test_unopened_page_swings_positive() {
        let mut node = page(7);
        settle(&mut node, 5, 5, 10);
        assert!(node.pivot_turn() > 0.0);
        assert!(!node.opened());
    }

    #[test]
    fn test_closed_book_flattens_everything() {
        let mut node = page(3);
        settle(&mut node, 5, 5, 10);
        settle(&mut node, 0, 0, 10);

        assert!(node.pivot_turn().abs() < 1e-3);
        for joint in 0..node.chain().len() {
            let (turn, fold) = node.chain().angles(joint);
            assert!(turn.abs() < 1e-3);
            assert!(fold.abs() < 1e-3);
        }
    }

    #[test]
    fn test_turn_transient_peaks_then_settles() {
        let mut node = page(3);
        let style = BookStyle::soft();
        settle(&mut node, 3, 3, 10);

        // Step current past the page: opened flips at now=20000
        node.update(&ctx(20_000.0, 4, 4, 10), &style, 0.12, 0.003);
        assert_eq!(node.phase(20_000.0), TurnPhase::Turning);

        node.update(&ctx(20_200.0, 4, 4, 10), &style, 0.12, 0.003);
        assert_eq!(node.phase(20_200.0), TurnPhase::Turning);

        node.update(&ctx(20_500.0, 4, 4, 10), &style, 0.12, 0.003);
        assert_eq!(node.phase(20_500.0), TurnPhase::SettledOpen);
    }

    #[test]
    fn test_stack_offset_follows_index() {
        let mut near = page(1);
        let mut far = page(8);
        settle(&mut near, 5, 5, 10);
        settle(&mut far, 5, 5, 10);
        // Deeper pages sit closer to the back of the stack
        assert!(near.group_z() > far.group_z());
        assert!(near.mesh_z().abs() < 1e-4);
    }

    #[test]
    fn test_extra_slots_are_invisible() {
        let plate = Arc::new(PlateGeometry::build(1.0, 1.0, 0.01, 30).unwrap());
        let node = PageNode::new(PageRecord::default(), false, plate, 400.0).unwrap();
        assert!(!node.visible);
    }

    #[test]
    fn test_highlight_drives_emissive() {
        let mut node = page(3);
        node.set_highlighted(true);
        settle(&mut node, 5, 5, 10);
        let glow = node.materials.slot(PlateFace::Front).emissive_intensity;
        assert!((glow - 0.22).abs() < 1e-2);

        node.set_highlighted(false);
        settle(&mut node, 5, 5, 10);
        let glow = node.materials.slot(PlateFace::Front).emissive_intensity;
        assert!(glow < 1e-2);
    }
}
