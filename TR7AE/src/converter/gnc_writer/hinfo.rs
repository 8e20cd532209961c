//! Hit-collision block cloned from the reference mesh
//!
//! The block is copied verbatim and only its internal list pointers are
//! rebased. Attachment markers (holstered guns, shotgun, gear) are hidden by
//! pushing their distance field out of range.

use super::constants::{
    DETACHED_MARKER, GEAR_MARKER_SLOTS, GUN_MARKER_SLOTS, HINFO_BLOB_SIZE, HINFO_BONE_SLOTS,
    HINFO_POINTER_PATCHES, HINFO_STARTS, HINFO_TRAILER, HINFO_TRAILER_OFFSET, SHOTGUN_MARKER_SLOTS,
    TEMPLATE_HINFO_OFFSET,
};
use super::section::Section;
use super::ExportOptions;
use crate::error::{Error, Result};

/// The raw block inside a reference mesh file.
pub fn template_blob(template: &[u8]) -> Result<&[u8]> {
    template
        .get(TEMPLATE_HINFO_OFFSET..TEMPLATE_HINFO_OFFSET + HINFO_BLOB_SIZE)
        .ok_or_else(|| {
            Error::template(format!(
                "{} bytes is too short to hold the hit-collision block at {TEMPLATE_HINFO_OFFSET}",
                template.len()
            ))
        })
}

/// Append the block and rebase it to its new position.
///
/// Requires the bone table to be written already. Returns the block start.
pub fn write_hinfo(section: &mut Section, blob: &[u8], options: ExportOptions) -> Result<usize> {
    let start = section.len();
    section.write_bytes(blob);

    for (slot, target) in HINFO_POINTER_PATCHES {
        section.patch_u32(start + slot, start as u32 + target);
        section.relocations.push((start + slot) as u32);
    }

    for (bone_slot, hinfo) in HINFO_BONE_SLOTS.into_iter().zip(HINFO_STARTS) {
        if bone_slot + 4 > start {
            return Err(Error::model(format!(
                "bone HInfo slot {bone_slot} lies outside the bone table"
            )));
        }
        section.patch_u32(bone_slot, start as u32 + hinfo);
    }

    for (i, word) in HINFO_TRAILER.into_iter().enumerate() {
        section.patch_u32(start + HINFO_TRAILER_OFFSET + i * 4, word);
    }

    let hidden = [
        (options.remove_guns, &GUN_MARKER_SLOTS[..]),
        (options.remove_shotgun, &SHOTGUN_MARKER_SLOTS[..]),
        (options.remove_gear, &GEAR_MARKER_SLOTS[..]),
    ];
    for (_, slots) in hidden.into_iter().filter(|(enabled, _)| *enabled) {
        for slot in slots {
            section.patch_f32(start + slot, DETACHED_MARKER);
        }
    }
    Ok(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::gnc_writer::constants::{BONES_START, MIN_BONES_FOR_HINFO, RECORD_SIZE};

    fn table() -> Section {
        let mut section = Section::new();
        section.write_zeros(BONES_START + MIN_BONES_FOR_HINFO * RECORD_SIZE);
        section
    }

    fn word(section: &Section, at: usize) -> u32 {
        u32::from_le_bytes(section.data[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_blob_is_rebased() {
        let mut section = table();
        let blob = vec![0u8; HINFO_BLOB_SIZE];
        let start = write_hinfo(&mut section, &blob, ExportOptions::default()).unwrap();

        assert_eq!(section.len(), start + HINFO_BLOB_SIZE);
        assert_eq!(word(&section, start + 4), start as u32 + 32);
        assert_eq!(word(&section, start + 1132), start as u32 + 1144);
        assert_eq!(section.relocations.len(), 13);
        assert_eq!(word(&section, 540), start as u32);
        assert_eq!(word(&section, 7196), start as u32 + 1112);
        assert_eq!(word(&section, start + 1168), 914765757);
        assert_eq!(word(&section, start + 1172), 1038634627);
        assert_eq!(word(&section, start + 1040), 0);
    }

    #[test]
    fn test_attachments_hidden() {
        let mut section = table();
        let blob = vec![0u8; HINFO_BLOB_SIZE];
        let options = ExportOptions {
            remove_guns: true,
            remove_shotgun: true,
            remove_gear: false,
        };
        let start = write_hinfo(&mut section, &blob, options).unwrap();
        let far = DETACHED_MARKER.to_bits();
        assert_eq!(word(&section, start + 1160), far);
        assert_eq!(word(&section, start + 1040), far);
        assert_eq!(word(&section, start + 384), far);
        assert_eq!(word(&section, start + 824), 0);
    }

    #[test]
    fn test_gear_hidden_alone() {
        let mut section = table();
        let blob = vec![0u8; HINFO_BLOB_SIZE];
        let options = ExportOptions {
            remove_gear: true,
            ..ExportOptions::default()
        };
        let start = write_hinfo(&mut section, &blob, options).unwrap();
        assert_eq!(word(&section, start + 824), DETACHED_MARKER.to_bits());
        assert_eq!(word(&section, start + 1160), 0);
        assert_eq!(word(&section, start + 384), 0);
    }

    #[test]
    fn test_short_template_rejected() {
        assert!(matches!(template_blob(&[0u8; 100]), Err(Error::InvalidTemplate { .. })));
        let template = vec![0u8; TEMPLATE_HINFO_OFFSET + HINFO_BLOB_SIZE];
        assert_eq!(template_blob(&template).unwrap().len(), HINFO_BLOB_SIZE);
    }
}
