use bytemuck::{Pod, Zeroable};
use crate::renderer::contexts::resource_ctx::Handle;

/// Data unique to each draw call passed as a push constant.
/// Shaders index the bindless tables with these values.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Pod, Zeroable)]
pub struct PerDrawData {
    pub object_index: u32,
    pub material_index: u32,
    pub texture_index: u32,
    pub vertex_offset: u32,
}

impl PerDrawData {
    pub fn new(
        object: Handle,
        material: Handle,
        texture: Handle,
        vertex_offset: u32,
    ) -> Self {
        Self {
            object_index: object.index(),
            material_index: material.index(),
            texture_index: texture.index(),
            vertex_offset,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::contexts::resource_ctx::ResourceClass;

    #[test]
    fn push_constant_block_is_four_words() {
        assert_eq!(size_of::<PerDrawData>(), 16);
    }

    #[test]
    fn handles_land_in_their_words() {
        let data = PerDrawData::new(
            Handle::new(ResourceClass::StorageBuffer, 3),
            Handle::new(ResourceClass::StorageBuffer, 5),
            Handle::new(ResourceClass::SampledImage, 9),
            128,
        );
        let words: &[u32] = bytemuck::cast_slice(data.as_bytes());
        assert_eq!(words, &[3, 5, 9, 128]);
    }
}
