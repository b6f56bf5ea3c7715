use std::sync::Arc;
use ash::vk;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use gpu_descriptor::{
    DescriptorAllocator,
    DescriptorSet,
    DescriptorSetLayoutCreateFlags,
    DescriptorTotalCount,
};
use smallvec::SmallVec;
use crate::renderer::config::ClassCapacities;
use crate::renderer::contexts::resource_ctx::descriptor_set_layout_builder::DescriptorSetLayoutBuilder;
use crate::renderer::contexts::resource_ctx::{BindingBackend, Handle, ResourceView};
use crate::renderer::shader_data::PerDrawData;
use crate::renderer::vk::descriptor_device::DescriptorAshDevice;

/// Conservative `maxUpdateAfterBindDescriptorsInAllPools`, below what desktop drivers report
const DEFAULT_UPDATE_AFTER_BIND_DESCRIPTOR_LIMIT: u32 = 500_000;

/// Per-set descriptor counts of the bindless layout
pub fn bindless_descriptor_count(capacities: &ClassCapacities) -> DescriptorTotalCount {
    DescriptorTotalCount {
        sampler: 0,
        combined_image_sampler: capacities.sampled_images,
        sampled_image: 0,
        storage_image: 0,
        uniform_texel_buffer: 0,
        storage_texel_buffer: 0,
        uniform_buffer: capacities.uniform_buffers,
        storage_buffer: capacities.storage_buffers,
        uniform_buffer_dynamic: 0,
        storage_buffer_dynamic: 0,
        input_attachment: 0,
        acceleration_structure: 0,
        inline_uniform_block_bytes: 0,
        inline_uniform_block_bindings: 0,
    }
}

/// Binding tables backed by Vulkan descriptor sets.
///
/// The device must have been created with the descriptor indexing update-after-bind and
/// partially-bound features for every resource class. Without them, enable
/// `idle_before_write` so every write waits for the device to go idle first.
pub struct AshBindingBackend {
    device: Arc<ash::Device>,
    descriptor_allocator: DescriptorAllocator<vk::DescriptorPool, vk::DescriptorSet>,
    descriptor_set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    idle_before_write: bool,
}

impl AshBindingBackend {
    pub fn new(device: Arc<ash::Device>) -> Self {
        Self::with_update_after_bind_limit(device, DEFAULT_UPDATE_AFTER_BIND_DESCRIPTOR_LIMIT)
    }

    /// `limit` should come from the device's `maxUpdateAfterBindDescriptorsInAllPools`
    pub fn with_update_after_bind_limit(device: Arc<ash::Device>, limit: u32) -> Self {
        Self {
            device,
            descriptor_allocator: DescriptorAllocator::new(limit),
            descriptor_set_layout: vk::DescriptorSetLayout::null(),
            pipeline_layout: vk::PipelineLayout::null(),
            idle_before_write: false,
        }
    }

    pub fn with_idle_before_write(mut self, idle_before_write: bool) -> Self {
        if idle_before_write {
            log::warn!("Binding writes will wait for the device to go idle");
        }
        self.idle_before_write = idle_before_write;
        self
    }

    pub fn descriptor_set_layout(&self) -> vk::DescriptorSetLayout {
        self.descriptor_set_layout
    }

    /// Layout every bindless pipeline is created with
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    fn create_bindless_pipeline_layout(
        bindless_descriptor_set_layout: vk::DescriptorSetLayout,
        device: &ash::Device,
    ) -> Result<vk::PipelineLayout> {
        let push_constant_size = size_of::<PerDrawData>() as u32;
        let push_constant_range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::ALL)
            .offset(0)
            .size(push_constant_size);
        let push_constant_ranges = [push_constant_range];

        let set_layouts = [bindless_descriptor_set_layout];
        let pipeline_layout_create_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&set_layouts)
            .push_constant_ranges(&push_constant_ranges);

        let pipeline_layout = unsafe {
            device.create_pipeline_layout(&pipeline_layout_create_info, None)?
        };

        Ok(pipeline_layout)
    }

    fn slot_write<'a>(
        set: &DescriptorSet<vk::DescriptorSet>,
        handle: Handle,
    ) -> vk::WriteDescriptorSet<'a> {
        vk::WriteDescriptorSet::default()
            .dst_set(*set.raw())
            .dst_binding(handle.class().binding())
            .dst_array_element(handle.index())
            .descriptor_type(handle.class().descriptor_type())
    }

    fn destroy_layouts(&mut self) {
        unsafe {
            if self.pipeline_layout != vk::PipelineLayout::null() {
                self.device.destroy_pipeline_layout(self.pipeline_layout, None);
            }
            if self.descriptor_set_layout != vk::DescriptorSetLayout::null() {
                self.device.destroy_descriptor_set_layout(self.descriptor_set_layout, None);
            }
        }
        self.pipeline_layout = vk::PipelineLayout::null();
        self.descriptor_set_layout = vk::DescriptorSetLayout::null();
    }
}

impl BindingBackend for AshBindingBackend {
    type Table = DescriptorSet<vk::DescriptorSet>;

    fn create_tables(
        &mut self,
        capacities: &ClassCapacities,
        frames_in_flight: usize,
    ) -> Result<Vec<Self::Table>> {
        if self.descriptor_set_layout != vk::DescriptorSetLayout::null() {
            return Err(eyre!("Bindless descriptor sets were already created"));
        }

        self.descriptor_set_layout = DescriptorSetLayoutBuilder::bindless(capacities)
            .build(
                vk::DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND_POOL,
                &self.device,
            )?;

        let sets = Self::create_bindless_pipeline_layout(self.descriptor_set_layout, &self.device)
            .and_then(|pipeline_layout| {
                self.pipeline_layout = pipeline_layout;
                let device = DescriptorAshDevice::from(self.device.clone());
                let sets = unsafe {
                    self.descriptor_allocator.allocate(
                        &device,
                        &self.descriptor_set_layout,
                        DescriptorSetLayoutCreateFlags::UPDATE_AFTER_BIND,
                        &bindless_descriptor_count(capacities),
                        frames_in_flight as u32,
                    )?
                };
                Ok(sets)
            });

        match sets {
            Ok(sets) => {
                log::debug!("Allocated {} bindless descriptor sets", sets.len());
                Ok(sets)
            }
            Err(err) => {
                self.destroy_layouts();
                Err(err)
            }
        }
    }

    fn write_binding(
        &mut self,
        tables: &[Self::Table],
        handle: Handle,
        view: &ResourceView,
    ) {
        if self.idle_before_write {
            if let Err(err) = unsafe { self.device.device_wait_idle() } {
                panic!("Failed to wait for device idle before binding write: {}", err);
            }
        }

        let buffer_infos: [vk::DescriptorBufferInfo; 1];
        let image_infos: [vk::DescriptorImageInfo; 1];
        let writes: SmallVec<[vk::WriteDescriptorSet; 3]> = match view {
            ResourceView::Buffer(buffer) => {
                buffer_infos = [buffer.descriptor_info()];
                tables
                    .iter()
                    .map(|set| Self::slot_write(set, handle).buffer_info(&buffer_infos))
                    .collect()
            }
            ResourceView::Image(image) => {
                image_infos = [image.descriptor_info()];
                tables
                    .iter()
                    .map(|set| Self::slot_write(set, handle).image_info(&image_infos))
                    .collect()
            }
        };

        unsafe {
            self.device.update_descriptor_sets(&writes, &[]);
        }
    }

    fn destroy_tables(&mut self, tables: Vec<Self::Table>) {
        let device = DescriptorAshDevice::from(self.device.clone());
        unsafe {
            self.descriptor_allocator.free(&device, tables);
            self.descriptor_allocator.cleanup(&device);
        }
        self.destroy_layouts();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_count_follows_capacities() {
        let capacities = ClassCapacities {
            uniform_buffers: 2,
            storage_buffers: 64,
            sampled_images: 512,
        };
        let count = bindless_descriptor_count(&capacities);

        assert_eq!(count.uniform_buffer, 2);
        assert_eq!(count.storage_buffer, 64);
        assert_eq!(count.combined_image_sampler, 512);
        assert_eq!(count.sampled_image, 0);
        assert_eq!(count.sampler, 0);
    }
}
