//! Segmented plate geometry.
//!
//! A page or cover starts life as a rectangular prism subdivided into
//! column segments along its width. Every vertex carries the pair of
//! chain joints that influence it plus a blend weight, which is what lets
//! the flat plate bend smoothly once a [`BoneChain`] drives it.
//!
//! [`BoneChain`]: crate::rig::bones::BoneChain

use crate::error::{FlipbookError, Result};

/// A vertex of a plate mesh, with skin binding attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in plate-local space.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
    /// Influencing joint indices (two used, padded to four).
    pub skin_indices: [u16; 4],
    /// Influence weights matching `skin_indices`.
    pub skin_weights: [f32; 4],
}

impl Vertex {
    /// Create an unskinned vertex (all weights zero).
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            skin_indices: [0; 4],
            skin_weights: [0.0; 4],
        }
    }
}

/// One face of the plate box, in material-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateFace {
    Right,
    Left,
    Top,
    Bottom,
    /// The +Z face, carrying the page's front image.
    Front,
    /// The -Z face, carrying the page's back image.
    Back,
}

impl PlateFace {
    pub const ALL: [PlateFace; 6] = [
        PlateFace::Right,
        PlateFace::Left,
        PlateFace::Top,
        PlateFace::Bottom,
        PlateFace::Front,
        PlateFace::Back,
    ];

    /// Material slot index for this face.
    pub fn slot(&self) -> usize {
        match self {
            PlateFace::Right => 0,
            PlateFace::Left => 1,
            PlateFace::Top => 2,
            PlateFace::Bottom => 3,
            PlateFace::Front => 4,
            PlateFace::Back => 5,
        }
    }
}

/// Index range of one face within a plate's index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGroup {
    pub face: PlateFace,
    /// First index of the range.
    pub start: u32,
    /// Number of indices in the range.
    pub count: u32,
}

/// A segmented plate mesh, immutable after build.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGeometry {
    width: f32,
    height: f32,
    depth: f32,
    segments: usize,
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// Per-face index ranges for material assignment.
    pub groups: Vec<FaceGroup>,
}

impl PlateGeometry {
    /// Build a plate of the given dimensions, subdivided into `segments`
    /// columns along the width and two rows along the height.
    ///
    /// The mesh is translated so its local origin sits on the bend edge
    /// (x = 0), which makes joint 0 of the driving chain coincide with the
    /// spine-facing edge. Building twice with equal inputs yields identical
    /// output.
    pub fn build(width: f32, height: f32, depth: f32, segments: usize) -> Result<Self> {
        if segments == 0 {
            return Err(FlipbookError::InvalidGeometry(
                "segment count must be at least 1".to_string(),
            ));
        }
        if width <= 0.0 || height <= 0.0 || depth <= 0.0 {
            return Err(FlipbookError::InvalidGeometry(format!(
                "plate dimensions must be positive, got {}x{}x{}",
                width, height, depth
            )));
        }

        let (mut vertices, indices, groups) = build_box(width, height, depth, segments, 2, 1);

        let segment_width = width / segments as f32;
        for vertex in &mut vertices {
            // Shift the bend edge onto the origin
            vertex.position[0] += width / 2.0;

            let (index, weight) = segment_binding(vertex.position[0], segment_width, segments);
            vertex.skin_indices = [index as u16, (index + 1) as u16, 0, 0];
            vertex.skin_weights = [1.0 - weight, weight, 0.0, 0.0];
        }

        Ok(Self {
            width,
            height,
            depth,
            segments,
            vertices,
            indices,
            groups,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Number of bend segments along the width.
    pub fn segments(&self) -> usize {
        self.segments
    }

    /// Width of one bend segment.
    pub fn segment_width(&self) -> f32 {
        self.width / self.segments as f32
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get positions as a flat array (for buffer upload).
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    /// Get normals as a flat array.
    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }

    /// Get UVs as a flat array.
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.uv).collect()
    }

    /// Get skin joint indices as a flat array.
    pub fn skin_indices_flat(&self) -> Vec<u16> {
        self.vertices.iter().flat_map(|v| v.skin_indices).collect()
    }

    /// Get skin weights as a flat array.
    pub fn skin_weights_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.skin_weights).collect()
    }
}

/// Joint binding for a point along the bend axis: the lower influencing
/// joint index and the fractional weight toward the next one.
pub fn segment_binding(x: f32, segment_width: f32, segments: usize) -> (usize, f32) {
    let raw = (x / segment_width).floor().max(0.0) as usize;
    let index = raw.min(segments - 1);
    let weight = (x / segment_width - index as f32).clamp(0.0, 1.0);
    (index, weight)
}

/// Build an axis-aligned box centered on the origin, one vertex grid and
/// one index group per face, in material-slot order.
pub(crate) fn build_box(
    width: f32,
    height: f32,
    depth: f32,
    width_segments: usize,
    height_segments: usize,
    depth_segments: usize,
) -> (Vec<Vertex>, Vec<u32>, Vec<FaceGroup>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut groups = Vec::new();

    let (w, h, d) = (width_segments, height_segments, depth_segments);
    let faces: [(PlateFace, usize, usize, usize, f32, f32, [f32; 3], usize, usize); 6] = [
        // (face, u axis, v axis, w axis, u dir, v dir, plane size, grid)
        (PlateFace::Right, 2, 1, 0, -1.0, -1.0, [depth, height, width / 2.0], d, h),
        (PlateFace::Left, 2, 1, 0, 1.0, -1.0, [depth, height, -width / 2.0], d, h),
        (PlateFace::Top, 0, 2, 1, 1.0, 1.0, [width, depth, height / 2.0], w, d),
        (PlateFace::Bottom, 0, 2, 1, 1.0, -1.0, [width, depth, -height / 2.0], w, d),
        (PlateFace::Front, 0, 1, 2, 1.0, -1.0, [width, height, depth / 2.0], w, h),
        (PlateFace::Back, 0, 1, 2, -1.0, -1.0, [width, height, -depth / 2.0], w, h),
    ];

    for (face, u, v, n, udir, vdir, [plane_w, plane_h, offset], grid_x, grid_y) in faces {
        let index_start = indices.len() as u32;
        let vertex_start = vertices.len() as u32;

        let step_x = plane_w / grid_x as f32;
        let step_y = plane_h / grid_y as f32;

        for iy in 0..=grid_y {
            let y = iy as f32 * step_y - plane_h / 2.0;
            for ix in 0..=grid_x {
                let x = ix as f32 * step_x - plane_w / 2.0;

                let mut position = [0.0f32; 3];
                position[u] = x * udir;
                position[v] = y * vdir;
                position[n] = offset;

                let mut normal = [0.0f32; 3];
                normal[n] = offset.signum();

                let uv = [ix as f32 / grid_x as f32, 1.0 - iy as f32 / grid_y as f32];

                vertices.push(Vertex::new(position, normal, uv));
            }
        }

        let row = (grid_x + 1) as u32;
        for iy in 0..grid_y as u32 {
            for ix in 0..grid_x as u32 {
                let a = vertex_start + ix + row * iy;
                let b = vertex_start + ix + row * (iy + 1);
                let c = vertex_start + ix + 1 + row * (iy + 1);
                let e = vertex_start + ix + 1 + row * iy;

                indices.extend_from_slice(&[a, b, e]);
                indices.extend_from_slice(&[b, c, e]);
            }
        }

        groups.push(FaceGroup {
            face,
            start: index_start,
            count: indices.len() as u32 - index_start,
        });
    }

    (vertices, indices, groups)
}

/// Recompute area-weighted vertex normals after displacing positions.
pub(crate) fn recompute_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for vertex in vertices.iter_mut() {
        vertex.normal = [0.0; 3];
    }

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = glam::Vec3::from(vertices[a].position);
        let pb = glam::Vec3::from(vertices[b].position);
        let pc = glam::Vec3::from(vertices[c].position);
        let face = (pb - pa).cross(pc - pa);

        for &i in &[a, b, c] {
            vertices[i].normal[0] += face.x;
            vertices[i].normal[1] += face.y;
            vertices[i].normal[2] += face.z;
        }
    }

    for vertex in vertices.iter_mut() {
        let n = glam::Vec3::from(vertex.normal).normalize_or_zero();
        vertex.normal = n.to_array();
    }
}
