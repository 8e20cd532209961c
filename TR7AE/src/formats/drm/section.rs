//! Section and relocation records

use serde::Serialize;

use crate::error::Result;
use crate::formats::common::LeView;

/// Size of one section header in the DRM table (and after `SECT`).
pub const SECTION_HEADER_SIZE: usize = 20;

/// Size of one relocation record.
pub const RELOCATION_SIZE: usize = 8;

/// Payload kind of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionType {
    /// Generic data: meshes, level structures, scripts.
    Generic,
    /// A PCD texture.
    Texture,
    /// Any other engine section kind, kept verbatim.
    Other(u8),
}

impl SectionType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Generic,
            5 => Self::Texture,
            other => Self::Other(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            Self::Generic => 0,
            Self::Texture => 5,
            Self::Other(v) => v,
        }
    }
}

/// One pointer-patch record of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Relocation {
    /// Index of the section the stored pointer is relative to.
    pub target_section: i16,
    /// Low three bits of the packed field.
    pub kind: u8,
    /// Location of the 4-byte pointer slot inside the referring section.
    pub offset: u32,
}

impl Relocation {
    pub fn new(target_section: i16, offset: u32) -> Self {
        Self {
            target_section,
            kind: 0,
            offset,
        }
    }

    pub(crate) fn read(view: &LeView<'_>, at: usize) -> Result<Self> {
        let packed = view.i16_at(at)?;
        Ok(Self {
            target_section: packed >> 3,
            kind: (packed & 7) as u8,
            offset: view.u32_at(at + 4)?,
        })
    }

    /// Serialized record: packed `i16`, zero `i16`, `u32` offset.
    pub fn to_bytes(self) -> [u8; RELOCATION_SIZE] {
        let packed = (self.target_section << 3) | i16::from(self.kind & 7);
        let mut out = [0u8; RELOCATION_SIZE];
        out[0..2].copy_from_slice(&packed.to_le_bytes());
        out[4..8].copy_from_slice(&self.offset.to_le_bytes());
        out
    }
}

/// Raw header fields of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SectionHeader {
    pub size: u32,
    pub section_type: u8,
    pub packed_data: u32,
    pub id: u32,
}

impl SectionHeader {
    pub fn read(view: &LeView<'_>, at: usize) -> Result<Self> {
        Ok(Self {
            size: view.u32_at(at)?,
            section_type: view.u8_at(at + 4)?,
            packed_data: view.u32_at(at + 8)?,
            id: view.u32_at(at + 12)?,
        })
    }

    pub fn relocation_count(&self) -> usize {
        (self.packed_data >> 8) as usize
    }
}

/// One relocatable chunk of a container, immutable once parsed.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// Position in the section table.
    pub index: usize,
    /// Payload length in bytes.
    pub size: u32,
    pub section_type: SectionType,
    /// Engine-assigned identifier (texture sections use it as texture id).
    pub id: u32,
    pub relocations: Vec<Relocation>,
    /// Absolute file offset of the first payload byte.
    pub payload_offset: usize,
}

impl Section {
    /// The relocation patching the slot at `offset` within this section.
    ///
    /// When several records name the same slot the last one wins.
    pub fn find_relocation(&self, offset: u32) -> Option<&Relocation> {
        self.relocations.iter().rev().find(|r| r.offset == offset)
    }

    pub fn payload_end(&self) -> usize {
        self.payload_offset + self.size as usize
    }

    pub fn is_texture(&self) -> bool {
        self.section_type == SectionType::Texture
    }
}

/// A resolved pointer: absolute file offset plus the section it lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub section: usize,
    pub offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relocation_packing() {
        let reloc = Relocation::new(5, 0x58);
        let bytes = reloc.to_bytes();
        assert_eq!(bytes, [40, 0, 0, 0, 0x58, 0, 0, 0]);

        let view = LeView::new(&bytes);
        assert_eq!(Relocation::read(&view, 0).unwrap(), reloc);
    }

    #[test]
    fn test_last_matching_relocation_wins() {
        let section = Section {
            index: 0,
            size: 16,
            section_type: SectionType::Generic,
            id: 0,
            relocations: vec![Relocation::new(1, 4), Relocation::new(2, 4)],
            payload_offset: 0,
        };
        assert_eq!(section.find_relocation(4).map(|r| r.target_section), Some(2));
        assert!(section.find_relocation(8).is_none());
    }

    #[test]
    fn test_section_type_codes() {
        assert_eq!(SectionType::from_u8(0), SectionType::Generic);
        assert_eq!(SectionType::from_u8(5), SectionType::Texture);
        assert_eq!(SectionType::from_u8(9).to_u8(), 9);
    }
}
