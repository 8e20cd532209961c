//! Vertex buffer: bone-local positions and normals, one segment per vertex

use glam::{Mat4, Vec3};

use super::constants::EXPORT_SCALE;
use super::section::Section;
use crate::formats::mesh::vertex::{pack_uv, quantize_normal, quantize_position, PackedVertex};

/// Pack one vertex bound to `bind` and skinned through segment `bone`.
pub fn pack_vertex(position: [f32; 3], normal: [f32; 3], uv: [f32; 2], bind: &Mat4, bone: u16) -> PackedVertex {
    let inverse = bind.inverse();
    let local = inverse.transform_point3(Vec3::from_array(position));
    let local_normal = inverse.transform_vector3(Vec3::from_array(normal)).normalize_or_zero();
    let packed_uv = pack_uv(uv[0], uv[1]);

    PackedVertex {
        position: local.to_array().map(|p| quantize_position(p, EXPORT_SCALE)),
        normal: local_normal.to_array().map(quantize_normal),
        bone,
        uv: [packed_uv as u16, (packed_uv >> 16) as u16],
    }
}

pub fn write_vertices(section: &mut Section, vertices: &[PackedVertex]) {
    for vertex in vertices {
        section.write_bytes(&vertex.to_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::mesh::vertex::unpack_uv;

    #[test]
    fn test_position_is_bone_local() {
        let bind = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let v = pack_vertex([11.0, 2.0, -0.3], [0.0, 0.0, 1.0], [0.5, 0.25], &bind, 40);
        assert_eq!(v.position, [10, 20, -3]);
        assert_eq!(v.normal, [0, 0, 127]);
        assert_eq!(v.bone, 40);
        assert_eq!(unpack_uv(v.uv[0]), 0.5);
        assert_eq!(unpack_uv(v.uv[1]), 0.25);
    }

    #[test]
    fn test_normal_rotated_into_bone_space() {
        let bind = Mat4::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let v = pack_vertex([0.0; 3], [0.0, 1.0, 0.0], [0.0; 2], &bind, 0);
        assert_eq!(v.normal, [127, 0, 0]);
    }
}
