use ash::vk;
use crate::renderer::config::ClassCapacities;
use crate::renderer::contexts::resource_ctx::handle::Handle;
use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;
use crate::renderer::contexts::resource_ctx::texture_slot::{ImageBinding, TextureSlot};

/// Range of a buffer bound to a uniform or storage buffer slot
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BufferBinding {
    pub buffer: vk::Buffer,
    pub offset: vk::DeviceSize,
    pub range: vk::DeviceSize,
}

impl BufferBinding {
    pub fn new(buffer: vk::Buffer, offset: vk::DeviceSize, range: vk::DeviceSize) -> Self {
        Self { buffer, offset, range }
    }

    pub fn whole(buffer: vk::Buffer) -> Self {
        Self::new(buffer, 0, vk::WHOLE_SIZE)
    }

    pub fn descriptor_info(&self) -> vk::DescriptorBufferInfo {
        vk::DescriptorBufferInfo::default()
            .buffer(self.buffer)
            .offset(self.offset)
            .range(self.range)
    }
}

/// What a binding-table slot references
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResourceView {
    Buffer(BufferBinding),
    Image(ImageBinding),
}

impl ResourceView {
    pub fn fits(&self, class: ResourceClass) -> bool {
        match self {
            Self::Buffer(_) => matches!(
                class,
                ResourceClass::UniformBuffer | ResourceClass::StorageBuffer
            ),
            Self::Image(_) => class == ResourceClass::SampledImage,
        }
    }
}

/// Registry-side record of one issued handle
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotRecord {
    Buffer(BufferBinding),
    Texture(TextureSlot),
}

impl SlotRecord {
    pub fn is_placeholder(&self) -> bool {
        match self {
            Self::Buffer(_) => false,
            Self::Texture(slot) => slot.is_placeholder(),
        }
    }
}

/// Holds the slot records of every class, indexed by handle index.
/// The registry only keeps the Vulkan handles here; it never destroys them.
pub struct RenderResourceStorage {
    uniform_buffers: Vec<BufferBinding>,
    storage_buffers: Vec<BufferBinding>,
    sampled_images: Vec<TextureSlot>,
}

impl RenderResourceStorage {
    pub fn new(capacities: &ClassCapacities) -> Self {
        Self {
            uniform_buffers: Vec::with_capacity(capacities.uniform_buffers as usize),
            storage_buffers: Vec::with_capacity(capacities.storage_buffers as usize),
            sampled_images: Vec::with_capacity(capacities.sampled_images as usize),
        }
    }

    pub fn push_buffer(&mut self, handle: Handle, buffer: BufferBinding) {
        let buffers = match handle.class() {
            ResourceClass::UniformBuffer => &mut self.uniform_buffers,
            ResourceClass::StorageBuffer => &mut self.storage_buffers,
            ResourceClass::SampledImage => panic!("{handle} is not a buffer handle"),
        };
        assert_eq!(buffers.len(), handle.index() as usize, "{handle} issued out of order");
        buffers.push(buffer);
    }

    pub fn push_texture(&mut self, handle: Handle, slot: TextureSlot) {
        assert_eq!(handle.class(), ResourceClass::SampledImage, "{handle} is not a texture handle");
        assert_eq!(
            self.sampled_images.len(),
            handle.index() as usize,
            "{handle} issued out of order",
        );
        self.sampled_images.push(slot);
    }

    pub fn texture(&self, index: u32) -> Option<&TextureSlot> {
        self.sampled_images.get(index as usize)
    }

    pub fn texture_mut(&mut self, index: u32) -> Option<&mut TextureSlot> {
        self.sampled_images.get_mut(index as usize)
    }

    pub fn record(&self, handle: Handle) -> Option<SlotRecord> {
        let index = handle.index() as usize;
        match handle.class() {
            ResourceClass::UniformBuffer => self.uniform_buffers.get(index).copied().map(SlotRecord::Buffer),
            ResourceClass::StorageBuffer => self.storage_buffers.get(index).copied().map(SlotRecord::Buffer),
            ResourceClass::SampledImage => self.sampled_images.get(index).copied().map(SlotRecord::Texture),
        }
    }

    pub fn placeholder_count(&self) -> usize {
        self.sampled_images
            .iter()
            .filter(|slot| slot.is_placeholder())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle as VkHandle;

    fn buffer(raw: u64) -> BufferBinding {
        BufferBinding::whole(vk::Buffer::from_raw(raw))
    }

    fn image(raw: u64) -> ImageBinding {
        ImageBinding::new(vk::ImageView::from_raw(raw), vk::Sampler::null())
    }

    #[test]
    fn records_are_found_by_class_and_index() {
        let mut storage = RenderResourceStorage::new(&ClassCapacities::default());
        storage.push_buffer(Handle::new(ResourceClass::UniformBuffer, 0), buffer(1));
        storage.push_buffer(Handle::new(ResourceClass::StorageBuffer, 0), buffer(2));
        storage.push_texture(
            Handle::new(ResourceClass::SampledImage, 0),
            TextureSlot::Placeholder(image(3)),
        );

        assert_eq!(
            storage.record(Handle::new(ResourceClass::StorageBuffer, 0)),
            Some(SlotRecord::Buffer(buffer(2))),
        );
        assert_eq!(storage.record(Handle::new(ResourceClass::StorageBuffer, 1)), None);
        assert!(storage
            .record(Handle::new(ResourceClass::SampledImage, 0))
            .unwrap()
            .is_placeholder());
        assert_eq!(storage.placeholder_count(), 1);
        assert_eq!(
            storage.record(Handle::new(ResourceClass::UniformBuffer, 0)),
            Some(SlotRecord::Buffer(buffer(1))),
        );
    }

    #[test]
    #[should_panic(expected = "issued out of order")]
    fn skipping_an_index_is_a_logic_fault() {
        let mut storage = RenderResourceStorage::new(&ClassCapacities::default());
        storage.push_buffer(Handle::new(ResourceClass::StorageBuffer, 1), buffer(1));
    }

    #[test]
    fn views_only_fit_their_own_classes() {
        let view = ResourceView::Buffer(buffer(1));
        assert!(view.fits(ResourceClass::UniformBuffer));
        assert!(view.fits(ResourceClass::StorageBuffer));
        assert!(!view.fits(ResourceClass::SampledImage));
        assert!(ResourceView::Image(image(1)).fits(ResourceClass::SampledImage));
    }

    #[test]
    fn whole_buffer_covers_the_full_range() {
        let info = buffer(9).descriptor_info();
        assert_eq!(info.offset, 0);
        assert_eq!(info.range, vk::WHOLE_SIZE);
    }
}
