//! glTF/GLB export of a rigged plate.
//!
//! Exports one page (or cover) plate as a skinned binary glTF: vertex
//! attributes with joint influences, the bone chain as a node hierarchy,
//! and inverse bind matrices, so any glTF loader can animate the page.

use crate::error::{FlipbookError, Result};
use crate::rig::{BoneChain, PlateGeometry, Skin};
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::mem;

/// Export a plate and its chain to GLB, joint rotations baked from the
/// chain's current pose.
pub fn export_skinned_glb(plate: &PlateGeometry, chain: &BoneChain, skin: &Skin) -> Result<Vec<u8>> {
    if plate.vertices.is_empty() {
        return Err(FlipbookError::Export("cannot export empty plate".to_string()));
    }
    if chain.len() != skin.joint_count() {
        return Err(FlipbookError::Export(
            "chain and skin joint counts disagree".to_string(),
        ));
    }

    // Binary buffer: attributes, inverse binds, then per-face index ranges
    let mut buffer_data: Vec<u8> = Vec::new();

    let positions = plate.positions_flat();
    let normals = plate.normals_flat();
    let uvs = plate.uvs_flat();
    let joints_attr = plate.skin_indices_flat();
    let weights_attr = plate.skin_weights_flat();
    let inverse_binds: Vec<f32> = skin
        .inverse_bind_matrices()
        .iter()
        .flat_map(|m| m.to_cols_array())
        .collect();

    let pos_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&positions));
    let norm_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&normals));
    let uv_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&uvs));
    let joint_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&joints_attr));
    let weight_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&weights_attr));
    let ibm_offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&inverse_binds));

    let group_offsets: Vec<(usize, usize)> = plate
        .groups
        .iter()
        .map(|group| {
            let offset = buffer_data.len();
            let range =
                &plate.indices[group.start as usize..(group.start + group.count) as usize];
            buffer_data.extend_from_slice(cast_slice(range));
            (offset, range.len())
        })
        .collect();

    let vertex_count = plate.vertex_count();
    let (bounds_min, bounds_max) = plate_bounds(plate);

    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();
    let mut push_view = |offset: usize, size: usize, target: Option<json::buffer::Target>| {
        buffer_views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: USize64(size as u64),
            byte_offset: Some(USize64(offset as u64)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            target: target.map(Valid),
        });
        (buffer_views.len() - 1) as u32
    };

    let pos_view = push_view(pos_offset, norm_offset - pos_offset, Some(json::buffer::Target::ArrayBuffer));
    let norm_view = push_view(norm_offset, uv_offset - norm_offset, Some(json::buffer::Target::ArrayBuffer));
    let uv_view = push_view(uv_offset, joint_offset - uv_offset, Some(json::buffer::Target::ArrayBuffer));
    let joint_view = push_view(joint_offset, weight_offset - joint_offset, Some(json::buffer::Target::ArrayBuffer));
    let weight_view = push_view(weight_offset, ibm_offset - weight_offset, Some(json::buffer::Target::ArrayBuffer));
    let first_group_offset = group_offsets.first().map(|g| g.0).unwrap_or(buffer_data.len());
    let ibm_view = push_view(ibm_offset, first_group_offset - ibm_offset, None);

    accessors.push(create_accessor(pos_view, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, Some(bounds_min), Some(bounds_max)));
    let pos_accessor = 0u32;
    accessors.push(create_accessor(norm_view, vertex_count, json::accessor::Type::Vec3, json::accessor::ComponentType::F32, None, None));
    accessors.push(create_accessor(uv_view, vertex_count, json::accessor::Type::Vec2, json::accessor::ComponentType::F32, None, None));
    accessors.push(create_accessor(joint_view, vertex_count, json::accessor::Type::Vec4, json::accessor::ComponentType::U16, None, None));
    accessors.push(create_accessor(weight_view, vertex_count, json::accessor::Type::Vec4, json::accessor::ComponentType::F32, None, None));
    accessors.push(create_accessor(ibm_view, chain.len(), json::accessor::Type::Mat4, json::accessor::ComponentType::F32, None, None));
    let ibm_accessor = (accessors.len() - 1) as u32;

    // One material and one primitive per plate face
    let materials: Vec<json::Material> = plate
        .groups
        .iter()
        .map(|_| create_material([1.0, 1.0, 1.0, 1.0]))
        .collect();

    let mut primitives = Vec::new();
    for (slot, &(offset, count)) in group_offsets.iter().enumerate() {
        let idx_view = push_view(offset, count * mem::size_of::<u32>(), Some(json::buffer::Target::ElementArrayBuffer));
        accessors.push(create_accessor(idx_view, count, json::accessor::Type::Scalar, json::accessor::ComponentType::U32, None, None));
        let idx_accessor = (accessors.len() - 1) as u32;
        primitives.push(create_primitive(pos_accessor, idx_accessor, slot as u32));
    }

    // Node 0: the skinned mesh. Nodes 1..: the joint chain.
    let mut nodes = Vec::new();
    nodes.push(json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: Some(json::Index::new(0)),
        rotation: None,
        scale: None,
        translation: None,
        skin: Some(json::Index::new(0)),
        weights: None,
    });

    for (i, joint) in chain.joints().iter().enumerate() {
        let node_index = 1 + i as u32;
        let child = if i + 1 < chain.len() {
            Some(vec![json::Index::new(node_index + 1)])
        } else {
            None
        };
        let rotation = glam::Quat::from_euler(glam::EulerRot::XYZ, joint.fold, joint.turn, 0.0);
        nodes.push(json::Node {
            camera: None,
            children: child,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: None,
            rotation: Some(json::scene::UnitQuaternion(rotation.to_array())),
            scale: None,
            translation: Some(joint.local_offset.to_array()),
            skin: None,
            weights: None,
        });
    }

    let skins = vec![json::Skin {
        extensions: Default::default(),
        extras: Default::default(),
        inverse_bind_matrices: Some(json::Index::new(ibm_accessor)),
        joints: (0..chain.len())
            .map(|i| json::Index::new(1 + i as u32))
            .collect(),
        skeleton: Some(json::Index::new(1)),
    }];

    let total_buffer_size = buffer_data.len();
    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        materials,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        }],
        nodes,
        skins,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0), json::Index::new(1)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    // Serialize JSON
    let json_string = json::serialize::to_string(&root)
        .map_err(|e| FlipbookError::Export(format!("failed to serialize glTF JSON: {}", e)))?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON and buffer to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + 8 + padded_json_len + 8 + padded_buffer_len;

    let mut glb = Vec::with_capacity(total_size);

    // GLB header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend_from_slice(&vec![0x20u8; json_padding]);

    // BIN chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(&buffer_data);
    glb.extend_from_slice(&vec![0u8; buffer_padding]);

    Ok(glb)
}

fn plate_bounds(plate: &PlateGeometry) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for vertex in &plate.vertices {
        for axis in 0..3 {
            min[axis] = min[axis].min(vertex.position[axis]);
            max[axis] = max[axis].max(vertex.position[axis]);
        }
    }
    (min, max)
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Create a skinned primitive for one face group.
fn create_primitive(
    positions_accessor: u32,
    indices_accessor: u32,
    material: u32,
) -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(positions_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(positions_accessor + 1),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::TexCoords(0)),
        json::Index::new(positions_accessor + 2),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Joints(0)),
        json::Index::new(positions_accessor + 3),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Weights(0)),
        json::Index::new(positions_accessor + 4),
    );

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Create an untextured material with the given base color.
fn create_material(base_color: [f32; 4]) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: None,
            base_color_factor: json::material::PbrBaseColorFactor(base_color),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        alpha_cutoff: None,
        double_sided: true,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Cast a slice of T to a slice of bytes.
fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    unsafe { std::slice::from_raw_parts(ptr, len) }
}
