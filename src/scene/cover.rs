//! Cover plates and their positioning.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use super::material::FaceMaterials;
use super::FrameContext;
use crate::anim::easing::{damp_angle, damp_vec3};
use crate::error::Result;
use crate::rig::{BoneChain, PlateFace, PlateGeometry, Skin};
use crate::texture::TextureSlot;
use crate::types::{BookStyle, CoverSide};
use glam::Vec3;

/// Target placement for a cover or spine node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    /// Rotation around the turn axis.
    pub angle: f32,
}

/// Compute where a cover wants to be for the given navigation state.
///
/// Closed books hold both covers flat against the stack. On the opening
/// edges the cover splays to a right angle and slides laterally with the
/// reading progress so the open silhouette stays symmetric; in the
/// interior it rests splayed at the stack's side.
pub fn cover_pose(
    side: CoverSide,
    current_page: usize,
    total_pages: usize,
    book_closed: bool,
    spine_width: f32,
) -> Pose {
    let is_back = side == CoverSide::Back;
    let stack_z = side.stack_sign() * spine_width / 2.0;

    if book_closed {
        return Pose {
            position: Vec3::new(0.0, 0.0, stack_z),
            angle: 0.0,
        };
    }

    let splay = if is_back { -FRAC_PI_2 } else { FRAC_PI_2 };

    if current_page == 1 || current_page + 1 == total_pages {
        let progress = if current_page == 1 {
            0.0
        } else {
            current_page as f32 / (total_pages.saturating_sub(1)) as f32
        };
        let spread = spine_width / 2.0 * (progress * 2.0);
        let x = if is_back {
            spine_width / 2.0 - spread
        } else {
            -spine_width / 2.0 + spread
        };
        Pose {
            position: Vec3::new(x, 0.0, 0.0),
            angle: splay,
        }
    } else {
        Pose {
            position: Vec3::new(0.0, 0.0, stack_z),
            angle: splay,
        }
    }
}

/// Retained state of one cover plate.
#[derive(Debug, Clone)]
pub struct CoverNode {
    pub side: CoverSide,
    plate: Arc<PlateGeometry>,
    chain: BoneChain,
    skin: Skin,
    pub materials: FaceMaterials,
    position: Vec3,
    pivot_angle: f32,
}

impl CoverNode {
    pub fn new(side: CoverSide, plate: Arc<PlateGeometry>) -> Result<Self> {
        let chain = BoneChain::new(plate.segments() + 1, plate.segment_width());
        let skin = Skin::bind(&plate, &chain)?;

        Ok(Self {
            side,
            plate,
            chain,
            skin,
            materials: FaceMaterials::cover(),
            position: Vec3::ZERO,
            pivot_angle: 0.0,
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

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn pivot_angle(&self) -> f32 {
        self.pivot_angle
    }

    /// The plate face showing the outward cover art.
    pub fn outer_face(&self) -> PlateFace {
        match self.side {
            CoverSide::Front => PlateFace::Back,
            CoverSide::Back => PlateFace::Front,
        }
    }

    /// The plate face visible when the cover lies open.
    pub fn inner_face(&self) -> PlateFace {
        match self.side {
            CoverSide::Front => PlateFace::Front,
            CoverSide::Back => PlateFace::Back,
        }
    }

    pub fn set_texture(&mut self, face: PlateFace, slot: TextureSlot) {
        self.materials.slot_mut(face).texture = slot;
    }

    /// Advance the cover by one frame.
    pub fn update(&mut self, ctx: &FrameContext, style: &BookStyle, spine_width: f32) {
        let pose = cover_pose(
            self.side,
            ctx.current_page,
            ctx.total_pages,
            ctx.book_closed,
            spine_width,
        );
        self.position = damp_vec3(self.position, pose.position, style.turn_tau, ctx.dt);
        self.pivot_angle = damp_angle(self.pivot_angle, pose.angle, style.turn_tau, ctx.dt);
    }
}
