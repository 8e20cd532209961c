//! Payload builder for the mesh section

/// The mesh payload being built, plus the pointer slots it relocates.
pub struct Section {
    pub data: Vec<u8>,
    /// Payload offsets of pointer slots, in the order they are emitted.
    pub relocations: Vec<u32>,
}

impl Section {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            relocations: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn pos(&self) -> u32 {
        self.data.len() as u32
    }

    pub fn write_u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i16(&mut self, v: i16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.data.extend(std::iter::repeat_n(0u8, count));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a section-relative pointer and record its relocation.
    pub fn write_ptr(&mut self, target_offset: u32) {
        self.relocations.push(self.pos());
        self.write_u32(target_offset);
    }

    /// Overwrite a `u32` already written at `at`.
    pub fn patch_u32(&mut self, at: usize, v: u32) {
        self.data[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    pub fn patch_f32(&mut self, at: usize, v: f32) {
        self.data[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }
}
