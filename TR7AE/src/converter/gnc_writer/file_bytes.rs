//! Standalone `"SECT"` file around the mesh payload

use super::constants::{
    FIXED_RELOCATIONS, HEADER_RELOCATION_COUNT, RELOCATION_TARGET_SECTION, TEMPLATE_RELOCATIONS_OFFSET,
    TEMPLATE_RELOCATIONS_SIZE,
};
use super::section::Section;
use super::GncWriter;
use crate::error::{Error, Result};
use crate::formats::drm::section::RELOCATION_SIZE;
use crate::formats::drm::{Relocation, SectionContainer, SECT_MAGIC};

impl GncWriter<'_> {
    pub(super) fn build_file_bytes(&self, section: &Section) -> Result<Vec<u8>> {
        let template_relocations = template_relocations(self.template)?;
        let count = section.relocations.len() + template_relocations.len() / RELOCATION_SIZE;
        let count_byte = u8::try_from(count).map_err(|_| Error::ExportLimitExceeded {
            limit: "relocation count",
            actual: count,
            max: usize::from(u8::MAX),
        })?;
        debug_assert!(count >= FIXED_RELOCATIONS);

        let mut output = Vec::with_capacity(0x18 + count * RELOCATION_SIZE + section.len());
        output.extend_from_slice(&SECT_MAGIC.to_le_bytes());
        output.extend_from_slice(&(section.len() as u32).to_le_bytes());
        output.extend_from_slice(&0i32.to_le_bytes());
        output.extend_from_slice(&[0, count_byte, 0, 0]);
        output.extend_from_slice(&0i32.to_le_bytes());
        output.extend_from_slice(&u32::MAX.to_le_bytes());

        let (header, rest) = section.relocations.split_at(HEADER_RELOCATION_COUNT);
        for &offset in header {
            output.extend_from_slice(&Relocation::new(RELOCATION_TARGET_SECTION, offset).to_bytes());
        }
        output.extend_from_slice(template_relocations);
        for &offset in rest {
            output.extend_from_slice(&Relocation::new(RELOCATION_TARGET_SECTION, offset).to_bytes());
        }

        output.extend_from_slice(&section.data);
        Ok(output)
    }
}

/// The bone-HInfo relocation records of the reference mesh.
fn template_relocations(template: &[u8]) -> Result<&[u8]> {
    if !SectionContainer::is_standalone(template) {
        return Err(Error::template("not a standalone SECT mesh file"));
    }
    template
        .get(TEMPLATE_RELOCATIONS_OFFSET..TEMPLATE_RELOCATIONS_OFFSET + TEMPLATE_RELOCATIONS_SIZE)
        .ok_or_else(|| Error::template("relocation table is too short"))
}
