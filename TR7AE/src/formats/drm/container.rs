//! Section container reader
//!
//! Two framings share the section/relocation layout:
//!
//! - **DRM**: `u32 version (14)`, `u32 section_count`, then `section_count`
//!   20-byte headers, then for each section in order its relocation table
//!   followed by its payload.
//! - **Standalone section** (`.gnc`, `.pcd`): `"SECT"` magic, one 20-byte
//!   header, the relocation table, then the payload.

use tracing::{debug, warn};

use super::section::{
    Pointer, Relocation, Section, SectionHeader, SectionType, RELOCATION_SIZE,
    SECTION_HEADER_SIZE,
};
use crate::error::{Error, Result};
use crate::formats::common::LeView;
use crate::formats::texture::{self, Material, Texture};

/// Container version of PC Legend and Anniversary DRM files.
pub const DRM_VERSION: u32 = 14;

/// `"SECT"` magic of a standalone section file.
pub const SECT_MAGIC: u32 = 0x54434553;

/// Offset of the section header in a standalone file.
const SECT_HEADER_OFFSET: usize = 4;

/// Which framing a container was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Drm,
    Standalone,
}

/// Options for [`SectionContainer::parse_drm`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerOptions {
    /// Decode every texture section into a texture + material pair.
    pub load_textures: bool,
}

/// A parsed section container borrowing the file bytes.
#[derive(Debug)]
pub struct SectionContainer<'a> {
    data: &'a [u8],
    pub kind: ContainerKind,
    pub sections: Vec<Section>,
    /// Textures decoded from texture sections, in section order.
    pub textures: Vec<Texture>,
    /// One material per entry of `textures`.
    pub materials: Vec<Material>,
}

impl<'a> SectionContainer<'a> {
    /// Returns true if `data` starts with the DRM version word.
    pub fn is_drm(data: &[u8]) -> bool {
        LeView::new(data).peek_u32(0) == Some(DRM_VERSION)
    }

    /// Returns true if `data` starts with the `"SECT"` magic.
    pub fn is_standalone(data: &[u8]) -> bool {
        LeView::new(data).peek_u32(0) == Some(SECT_MAGIC)
    }

    /// Parse a multi-section DRM file.
    pub fn parse_drm(data: &'a [u8], options: ContainerOptions) -> Result<Self> {
        let view = LeView::new(data);
        let version = view.u32_at(0)?;
        if version != DRM_VERSION {
            return Err(Error::TypeMismatch {
                expected: "DRM version 14",
                found: format!("version {version}"),
            });
        }

        let section_count = view.u32_at(4)? as usize;
        let table_end = section_count
            .checked_mul(SECTION_HEADER_SIZE)
            .and_then(|n| n.checked_add(8))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::malformed(format!(
                    "section table of {section_count} entries does not fit in {} bytes",
                    data.len()
                ))
            })?;

        let headers = (0..section_count)
            .map(|i| SectionHeader::read(&view, 8 + i * SECTION_HEADER_SIZE))
            .collect::<Result<Vec<_>>>()?;

        debug!("DRM with {section_count} sections");

        let mut cursor = table_end;
        let mut sections = Vec::with_capacity(section_count);
        for (index, header) in headers.iter().enumerate() {
            let section = read_section_body(&view, index, header, cursor)?;
            cursor = section.payload_end();
            sections.push(section);
        }

        for section in &sections {
            for reloc in &section.relocations {
                let target = reloc.target_section;
                if target < 0 || target as usize >= section_count {
                    return Err(Error::malformed(format!(
                        "section {} relocation at {:#x} targets section {target} of {section_count}",
                        section.index, reloc.offset
                    )));
                }
            }
        }

        let mut container = Self {
            data,
            kind: ContainerKind::Drm,
            sections,
            textures: Vec::new(),
            materials: Vec::new(),
        };
        if options.load_textures {
            container.load_textures();
        }
        Ok(container)
    }

    /// Parse a standalone `"SECT"` file.
    ///
    /// Its relocations name sections of the DRM it was extracted from, so
    /// targets are not validated and every pointer resolves into the single
    /// section.
    pub fn parse_standalone(data: &'a [u8]) -> Result<Self> {
        let view = LeView::new(data);
        let magic = view.u32_at(0)?;
        if magic != SECT_MAGIC {
            return Err(Error::TypeMismatch {
                expected: "SECT magic",
                found: format!("{magic:#010x}"),
            });
        }
        let header = SectionHeader::read(&view, SECT_HEADER_OFFSET)?;
        let section = read_section_body(
            &view,
            0,
            &header,
            SECT_HEADER_OFFSET + SECTION_HEADER_SIZE,
        )?;

        Ok(Self {
            data,
            kind: ContainerKind::Standalone,
            sections: vec![section],
            textures: Vec::new(),
            materials: Vec::new(),
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn view(&self) -> LeView<'a> {
        LeView::new(self.data)
    }

    pub fn section(&self, index: usize) -> Result<&Section> {
        self.sections.get(index).ok_or_else(|| {
            Error::malformed(format!(
                "section index {index} out of range ({} sections)",
                self.sections.len()
            ))
        })
    }

    /// The payload bytes of a section.
    pub fn payload(&self, section: &Section) -> &'a [u8] {
        // Bounds were validated when the section was read.
        &self.data[section.payload_offset..section.payload_end()]
    }

    /// Resolve the 4-byte pointer slot at absolute `cursor` inside `section`.
    ///
    /// Returns `None` when no relocation patches that slot; the caller skips
    /// the four stored bytes either way.
    pub fn resolve_pointer_at(&self, cursor: usize, section: &Section) -> Result<Option<Pointer>> {
        let Some(relative) = cursor.checked_sub(section.payload_offset) else {
            return Err(Error::malformed(format!(
                "cursor {cursor:#x} precedes section {} payload",
                section.index
            )));
        };
        let Ok(relative) = u32::try_from(relative) else {
            return Ok(None);
        };
        let Some(reloc) = section.find_relocation(relative) else {
            return Ok(None);
        };

        let target = match self.kind {
            ContainerKind::Drm => self.section(reloc.target_section as usize)?,
            ContainerKind::Standalone => section,
        };
        let raw = self.view().u32_at(cursor)? as usize;
        Ok(Some(Pointer {
            section: target.index,
            offset: target.payload_offset + raw,
        }))
    }

    fn load_textures(&mut self) {
        for section in self.sections.iter().filter(|s| s.is_texture()) {
            let name = format!("Texture_{}", section.id);
            let payload = &self.data[section.payload_offset..section.payload_end()];
            match texture::pcd::decode_embedded(payload, &name) {
                Ok(tex) => {
                    debug!(
                        "section {} texture {}x{} {:?}",
                        section.index, tex.width, tex.height, tex.format
                    );
                    self.materials.push(Material {
                        name: format!("Material_{}", section.id),
                        texture: Some(name),
                    });
                    self.textures.push(tex);
                }
                Err(e) => warn!("skipping texture section {}: {e}", section.index),
            }
        }
    }
}

fn read_section_body(
    view: &LeView<'_>,
    index: usize,
    header: &SectionHeader,
    relocations_at: usize,
) -> Result<Section> {
    let count = header.relocation_count();
    let payload_offset = count
        .checked_mul(RELOCATION_SIZE)
        .and_then(|n| n.checked_add(relocations_at))
        .ok_or_else(|| Error::malformed(format!("section {index} relocation count overflows")))?;

    let relocations = (0..count)
        .map(|i| Relocation::read(view, relocations_at + i * RELOCATION_SIZE))
        .collect::<Result<Vec<_>>>()?;

    // Checks that the whole payload is present.
    view.bytes(payload_offset, header.size as usize).map_err(|_| {
        Error::malformed(format!(
            "section {index} payload of {} bytes at {payload_offset:#x} exceeds file size {}",
            header.size,
            view.len()
        ))
    })?;

    Ok(Section {
        index,
        size: header.size,
        section_type: SectionType::from_u8(header.section_type),
        id: header.id,
        relocations,
        payload_offset,
    })
}
