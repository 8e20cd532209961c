//! Hit-collision (HInfo) blocks
//!
//! An HInfo block is eight words: `{count, list}` pairs for spheres, boxes,
//! markers and capsules. List offsets are relative to the model base.

use glam::Vec3;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::formats::common::LeView;

pub const HINFO_HEADER_SIZE: usize = 32;
pub const SPHERE_SIZE: usize = 24;
pub const BOX_SIZE: usize = 48;
pub const MARKER_SIZE: usize = 32;
pub const CAPSULE_SIZE: usize = 26;

/// Physics properties shared by spheres, boxes and capsules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitProperties {
    pub flags: i16,
    pub id: i8,
    pub rank: i8,
    pub mass: u16,
    pub buoyancy_factor: u8,
    pub explosion_factor: u8,
    pub material_type: u8,
    pub damage: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HSphere {
    pub radius: i16,
    pub position: [i16; 3],
    pub radius_squared: u32,
    pub props: HitProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HBox {
    pub width: [f32; 4],
    pub position: [f32; 4],
    pub quat: f32,
    pub props: HitProperties,
}

/// An attachment point, relative to `bone`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HMarker {
    pub bone: i32,
    pub index: i32,
    pub position: Vec3,
    pub rotation: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HCapsule {
    pub position: [i16; 3],
    pub quat: f32,
    pub radius: u16,
    pub length: u16,
    pub props: HitProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HitCollisionBlock {
    pub spheres: Vec<HSphere>,
    pub boxes: Vec<HBox>,
    pub markers: Vec<HMarker>,
    pub capsules: Vec<HCapsule>,
}

impl HitCollisionBlock {
    /// Read the block at `base + offset`.
    pub fn read(view: &LeView<'_>, base: usize, offset: u32) -> Result<Self> {
        let at = base + offset as usize;
        let list = |i: usize, size: usize| -> Result<(usize, usize)> {
            let count = view.i32_at(at + i * 8)?;
            let list = view.u32_at(at + i * 8 + 4)? as usize;
            let count = usize::try_from(count).map_err(|_| {
                Error::malformed(format!("HInfo at {at:#x} has negative count {count}"))
            })?;
            if count > 0 {
                // Whole list must lie inside the file.
                view.bytes(base + list, count * size)?;
            }
            Ok((count, base + list))
        };

        let (num_spheres, spheres_at) = list(0, SPHERE_SIZE)?;
        let (num_boxes, boxes_at) = list(1, BOX_SIZE)?;
        let (num_markers, markers_at) = list(2, MARKER_SIZE)?;
        let (num_capsules, capsules_at) = list(3, CAPSULE_SIZE)?;

        Ok(Self {
            spheres: (0..num_spheres)
                .map(|i| read_sphere(view, spheres_at + i * SPHERE_SIZE))
                .collect::<Result<_>>()?,
            boxes: (0..num_boxes)
                .map(|i| read_box(view, boxes_at + i * BOX_SIZE))
                .collect::<Result<_>>()?,
            markers: (0..num_markers)
                .map(|i| read_marker(view, markers_at + i * MARKER_SIZE))
                .collect::<Result<_>>()?,
            capsules: (0..num_capsules)
                .map(|i| read_capsule(view, capsules_at + i * CAPSULE_SIZE))
                .collect::<Result<_>>()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
            && self.boxes.is_empty()
            && self.markers.is_empty()
            && self.capsules.is_empty()
    }
}

/// Trailing `mass, buoyancy, explosion, material, pad, damage` run.
fn read_tail(view: &LeView<'_>, at: usize, flags: i16, id: i8, rank: i8) -> Result<HitProperties> {
    Ok(HitProperties {
        flags,
        id,
        rank,
        mass: view.u16_at(at)?,
        buoyancy_factor: view.u8_at(at + 2)?,
        explosion_factor: view.u8_at(at + 3)?,
        material_type: view.u8_at(at + 4)?,
        damage: view.i16_at(at + 6)?,
    })
}

fn read_sphere(view: &LeView<'_>, at: usize) -> Result<HSphere> {
    let flags = view.i16_at(at)?;
    let id = view.i8_at(at + 2)?;
    let rank = view.i8_at(at + 3)?;
    Ok(HSphere {
        radius: view.i16_at(at + 4)?,
        position: [
            view.i16_at(at + 6)?,
            view.i16_at(at + 8)?,
            view.i16_at(at + 10)?,
        ],
        radius_squared: view.u32_at(at + 12)?,
        props: read_tail(view, at + 16, flags, id, rank)?,
    })
}

fn read_box(view: &LeView<'_>, at: usize) -> Result<HBox> {
    let vec4 = |at: usize| -> Result<[f32; 4]> {
        let [x, y, z] = view.vec3_at(at)?;
        Ok([x, y, z, view.f32_at(at + 12)?])
    };
    Ok(HBox {
        width: vec4(at)?,
        position: vec4(at + 16)?,
        quat: view.f32_at(at + 32)?,
        props: read_tail(
            view,
            at + 40,
            view.i16_at(at + 36)?,
            view.i8_at(at + 38)?,
            view.i8_at(at + 39)?,
        )?,
    })
}

fn read_marker(view: &LeView<'_>, at: usize) -> Result<HMarker> {
    Ok(HMarker {
        bone: view.i32_at(at)?,
        index: view.i32_at(at + 4)?,
        position: Vec3::from_array(view.vec3_at(at + 8)?),
        rotation: Vec3::from_array(view.vec3_at(at + 20)?),
    })
}

fn read_capsule(view: &LeView<'_>, at: usize) -> Result<HCapsule> {
    Ok(HCapsule {
        position: [view.i16_at(at)?, view.i16_at(at + 2)?, view.i16_at(at + 4)?],
        quat: view.f32_at(at + 6)?,
        radius: view.u16_at(at + 14)?,
        length: view.u16_at(at + 16)?,
        props: read_tail(
            view,
            at + 18,
            view.i16_at(at + 10)?,
            view.i8_at(at + 12)?,
            view.i8_at(at + 13)?,
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_markers_and_sphere() {
        let mut data = vec![0u8; 0x100];
        let put_u32 = |d: &mut Vec<u8>, at: usize, v: u32| d[at..at + 4].copy_from_slice(&v.to_le_bytes());
        // Header at 0x10: 1 sphere at 0x40, 2 markers at 0x60.
        put_u32(&mut data, 0x10, 1);
        put_u32(&mut data, 0x14, 0x40);
        put_u32(&mut data, 0x20, 2);
        put_u32(&mut data, 0x24, 0x60);
        data[0x44..0x46].copy_from_slice(&25i16.to_le_bytes());
        data[0x56..0x58].copy_from_slice(&(-3i16).to_le_bytes());
        put_u32(&mut data, 0x60, 7);
        put_u32(&mut data, 0x80, 9);
        data[0x88..0x8C].copy_from_slice(&1.5f32.to_le_bytes());

        let view = LeView::new(&data);
        let block = HitCollisionBlock::read(&view, 0, 0x10).unwrap();
        assert_eq!(block.spheres.len(), 1);
        assert_eq!(block.spheres[0].radius, 25);
        assert_eq!(block.spheres[0].props.damage, -3);
        assert_eq!(block.markers.len(), 2);
        assert_eq!(block.markers[0].bone, 7);
        assert_eq!(block.markers[1].bone, 9);
        assert_eq!(block.markers[1].position.x, 1.5);
        assert!(block.boxes.is_empty());
    }

    #[test]
    fn test_list_past_end_is_malformed() {
        let mut data = vec![0u8; 0x40];
        data[0..4].copy_from_slice(&100u32.to_le_bytes());
        data[4..8].copy_from_slice(&0x20u32.to_le_bytes());
        let view = LeView::new(&data);
        assert!(matches!(
            HitCollisionBlock::read(&view, 0, 0),
            Err(Error::MalformedContainer { .. })
        ));
    }
}
