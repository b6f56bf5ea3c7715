use crate::renderer::contexts::resource_ctx::ResourceClass;

const UNIFORM_BUFFER_SLOTS: u32 = 16;
const STORAGE_BUFFER_SLOTS: u32 = 1024;
const SAMPLED_IMAGE_SLOTS: u32 = 1024;
const FRAMES_IN_FLIGHT: usize = 2;

/// Fixed slot budget of every resource class, decided once when the binding tables are built
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClassCapacities {
    pub uniform_buffers: u32,
    pub storage_buffers: u32,
    pub sampled_images: u32,
}

impl Default for ClassCapacities {
    fn default() -> Self {
        Self {
            uniform_buffers: UNIFORM_BUFFER_SLOTS,
            storage_buffers: STORAGE_BUFFER_SLOTS,
            sampled_images: SAMPLED_IMAGE_SLOTS,
        }
    }
}

impl ClassCapacities {
    pub fn get(&self, class: ResourceClass) -> u32 {
        match class {
            ResourceClass::UniformBuffer => self.uniform_buffers,
            ResourceClass::StorageBuffer => self.storage_buffers,
            ResourceClass::SampledImage => self.sampled_images,
        }
    }

    pub fn with(mut self, class: ResourceClass, capacity: u32) -> Self {
        match class {
            ResourceClass::UniformBuffer => self.uniform_buffers = capacity,
            ResourceClass::StorageBuffer => self.storage_buffers = capacity,
            ResourceClass::SampledImage => self.sampled_images = capacity,
        }
        self
    }
}

/// Start-up options of the registry like the number of frames in flight and the slot budgets
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RegistryConfig {
    pub frames_in_flight: usize,
    pub capacities: ClassCapacities,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: FRAMES_IN_FLIGHT,
            capacities: ClassCapacities::default(),
        }
    }
}
