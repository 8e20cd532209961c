//! GNC mesh format constants
//!
//! Everything here is a literal of the shipped `5_0.gnc` layout. The header
//! words without a name are copied as found.

/// Quantization scale of exported positions (all three axes).
pub const EXPORT_SCALE: f32 = 0.1;

/// Bones start right after the fixed header.
pub const BONES_START: usize = 0x1A0;

/// Size of a bone or VirtSegment record.
pub const RECORD_SIZE: usize = 0x40;

/// Relocation target of every pointer in a standalone mesh section.
pub const RELOCATION_TARGET_SECTION: i16 = 5;

// ============================================================================
// Header
// ============================================================================

pub const HEADER_BONE_TABLE: usize = 0x0C;
pub const HEADER_VERTEX_LIST: usize = 0x24;
pub const HEADER_FACE_LIST: usize = 0x58;
pub const HEADER_ENV_MAPPED_VERTICES: usize = 0x5C;
pub const HEADER_EYE_ENV_MAPPED_VERTICES: usize = 0x60;

pub const HEADER_DEPTH_RANGE: [f32; 2] = [509.1641, 259248.1];

/// Bone mirror data pointer (Lara's, valid for every character).
pub const BONE_MIRROR_DATA: u32 = 372;
pub const DRAW_GROUP_CENTER: u32 = 148;

pub const HEADER_WORDS_AT_0X94: [i32; 2] = [458752, 295];
/// Zero words between 0x9C and 0x16C.
pub const HEADER_ZERO_RUN: usize = 52;
pub const HEADER_TAIL: [i32; 13] = [
    -1441792, 470, 201394954, 302842135, 17894913, 318836751, 488178197, 19540226, 973223990,
    1768232271, 4, 0, 0,
];

/// Header slots carrying a relocation, in file order.
pub const HEADER_RELOCATION_COUNT: usize = 7;

// ============================================================================
// Records
// ============================================================================

/// `w` of a bone position.
pub const BONE_POSITION_W: u32 = 0x3F80_0000;

/// VirtSegment flags.
pub const VIRT_SEGMENT_FLAGS: i32 = 8;

// ============================================================================
// Template blocks
// ============================================================================

/// Relocations for the 11 bone HInfo slots, copied from the template.
pub const TEMPLATE_RELOCATIONS_OFFSET: usize = 120;
pub const TEMPLATE_RELOCATIONS_SIZE: usize = 88;

/// Hit-collision block cloned from the template.
pub const TEMPLATE_HINFO_OFFSET: usize = 15168;
pub const HINFO_BLOB_SIZE: usize = 1176;

/// `(slot, target)` pointer pairs inside the HInfo blob, blob-relative.
pub const HINFO_POINTER_PATCHES: [(usize, u32); 13] = [
    (4, 32),
    (60, 88),
    (76, 112),
    (452, 464),
    (612, 624),
    (676, 688),
    (724, 752),
    (796, 808),
    (844, 872),
    (860, 896),
    (1012, 1024),
    (1060, 1088),
    (1132, 1144),
];

/// Blob-relative start of each HInfo header.
pub const HINFO_STARTS: [u32; 11] = [0, 56, 432, 592, 656, 720, 776, 840, 992, 1056, 1112];

/// Absolute HInfo slot of the bone receiving each entry of [`HINFO_STARTS`].
pub const HINFO_BONE_SLOTS: [usize; 11] = [540, 668, 796, 4188, 5340, 5724, 6684, 6876, 6940, 7068, 7196];

/// Lowest bone count that has every slot of [`HINFO_BONE_SLOTS`].
pub const MIN_BONES_FOR_HINFO: usize = 106;

/// Trailing words at the end of the blob.
pub const HINFO_TRAILER_OFFSET: usize = 1168;
pub const HINFO_TRAILER: [u32; 2] = [914765757, 1038634627];

/// Marker distance that hides an attachment.
pub const DETACHED_MARKER: f32 = 9999999.0;
pub const GUN_MARKER_SLOTS: [usize; 2] = [1160, 1040];
pub const SHOTGUN_MARKER_SLOTS: [usize; 1] = [384];
pub const GEAR_MARKER_SLOTS: [usize; 1] = [824];

// ============================================================================
// Limits
// ============================================================================

pub const MAX_VERTICES: usize = 21850;
pub const MAX_INDICES_PER_SUBMESH: usize = 32767;
pub const MAX_INFLUENCES: usize = 2;
/// The relocation count is stored in one byte: 31 fixed + one per submesh.
pub const FIXED_RELOCATIONS: usize = 31;
pub const MAX_SUBMESHES: usize = 255 - FIXED_RELOCATIONS;
/// Underscore-separated fields of `Mesh_<n>_tpageid_<id>_dg_<group>`.
pub const NAME_FIELDS: usize = 6;
