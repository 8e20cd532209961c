//! DRM section containers
//!
//! A DRM is a self-relocating archive: every section carries a table of
//! pointer slots that the engine patches to section-relative addresses at
//! load time. Readers follow those slots with
//! [`SectionContainer::resolve_pointer_at`].

pub mod container;
pub mod level;
pub mod section;

pub use container::{ContainerKind, ContainerOptions, SectionContainer, DRM_VERSION, SECT_MAGIC};
pub use level::{decode_level, is_level, LEVEL_VERSION};
pub use section::{Pointer, Relocation, Section, SectionType};
