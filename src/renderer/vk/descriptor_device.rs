use std::sync::Arc;
use ash::vk;
use gpu_descriptor::{
    CreatePoolError,
    DescriptorDevice,
    DescriptorPoolCreateFlags,
    DescriptorTotalCount,
    DeviceAllocationError,
};
use smallvec::SmallVec;

/// Lets `gpu_descriptor` create pools and sets on an ash device
pub struct DescriptorAshDevice(pub Arc<ash::Device>);

impl From<Arc<ash::Device>> for DescriptorAshDevice {
    fn from(device: Arc<ash::Device>) -> Self {
        Self(device)
    }
}

/// Vulkan pool sizes for every non-zero entry of `count`
pub fn pool_sizes(count: &DescriptorTotalCount) -> SmallVec<[vk::DescriptorPoolSize; 13]> {
    if count.inline_uniform_block_bytes != 0 || count.inline_uniform_block_bindings != 0 {
        panic!("Inline uniform blocks are not supported");
    }

    [
        (vk::DescriptorType::SAMPLER, count.sampler),
        (vk::DescriptorType::COMBINED_IMAGE_SAMPLER, count.combined_image_sampler),
        (vk::DescriptorType::SAMPLED_IMAGE, count.sampled_image),
        (vk::DescriptorType::STORAGE_IMAGE, count.storage_image),
        (vk::DescriptorType::UNIFORM_TEXEL_BUFFER, count.uniform_texel_buffer),
        (vk::DescriptorType::STORAGE_TEXEL_BUFFER, count.storage_texel_buffer),
        (vk::DescriptorType::UNIFORM_BUFFER, count.uniform_buffer),
        (vk::DescriptorType::STORAGE_BUFFER, count.storage_buffer),
        (vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC, count.uniform_buffer_dynamic),
        (vk::DescriptorType::STORAGE_BUFFER_DYNAMIC, count.storage_buffer_dynamic),
        (vk::DescriptorType::INPUT_ATTACHMENT, count.input_attachment),
        (vk::DescriptorType::ACCELERATION_STRUCTURE_KHR, count.acceleration_structure),
    ]
    .into_iter()
    .filter(|(_, descriptor_count)| *descriptor_count != 0)
    .map(|(ty, descriptor_count)| vk::DescriptorPoolSize { ty, descriptor_count })
    .collect()
}

pub fn pool_create_flags(flags: DescriptorPoolCreateFlags) -> vk::DescriptorPoolCreateFlags {
    let mut ash_flags = vk::DescriptorPoolCreateFlags::empty();

    if flags.contains(DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET) {
        ash_flags |= vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET;
    }

    if flags.contains(DescriptorPoolCreateFlags::UPDATE_AFTER_BIND) {
        ash_flags |= vk::DescriptorPoolCreateFlags::UPDATE_AFTER_BIND;
    }

    ash_flags
}

impl DescriptorDevice<vk::DescriptorSetLayout, vk::DescriptorPool, vk::DescriptorSet>
for DescriptorAshDevice
{
    unsafe fn create_descriptor_pool(
        &self,
        descriptor_count: &DescriptorTotalCount,
        max_sets: u32,
        flags: DescriptorPoolCreateFlags,
    ) -> Result<vk::DescriptorPool, CreatePoolError> {
        let sizes = pool_sizes(descriptor_count);

        let result = unsafe {
            self.0.create_descriptor_pool(
                &vk::DescriptorPoolCreateInfo::default()
                    .max_sets(max_sets)
                    .pool_sizes(&sizes)
                    .flags(pool_create_flags(flags)),
                None,
            )
        };

        match result {
            Ok(pool) => Ok(pool),
            Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY) => Err(CreatePoolError::OutOfDeviceMemory),
            Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY) => Err(CreatePoolError::OutOfHostMemory),
            Err(vk::Result::ERROR_FRAGMENTATION) => Err(CreatePoolError::Fragmentation),
            Err(err) => panic!("Unexpected return code '{}'", err),
        }
    }

    unsafe fn destroy_descriptor_pool(&self, pool: vk::DescriptorPool) {
        unsafe {
            self.0.destroy_descriptor_pool(pool, None)
        }
    }

    unsafe fn alloc_descriptor_sets<'a>(
        &self,
        pool: &mut vk::DescriptorPool,
        layouts: impl ExactSizeIterator<Item = &'a vk::DescriptorSetLayout>,
        sets: &mut impl Extend<vk::DescriptorSet>,
    ) -> Result<(), DeviceAllocationError> {
        let set_layouts: SmallVec<[_; 16]> = layouts.copied().collect();

        unsafe {
            match self.0.allocate_descriptor_sets(
                &vk::DescriptorSetAllocateInfo::default()
                    .set_layouts(&set_layouts)
                    .descriptor_pool(*pool),
            ) {
                Ok(allocated) => {
                    sets.extend(allocated);
                    Ok(())
                }
                Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY) => {
                    Err(DeviceAllocationError::OutOfHostMemory)
                }
                Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY) => {
                    Err(DeviceAllocationError::OutOfDeviceMemory)
                }
                Err(vk::Result::ERROR_FRAGMENTED_POOL) => Err(DeviceAllocationError::FragmentedPool),
                Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY) => Err(DeviceAllocationError::OutOfPoolMemory),
                Err(err) => panic!("Unexpected return code '{}'", err),
            }
        }
    }

    unsafe fn dealloc_descriptor_sets(
        &self,
        pool: &mut vk::DescriptorPool,
        sets: impl Iterator<Item = vk::DescriptorSet>,
    ) {
        let sets: SmallVec<[_; 16]> = sets.collect();
        unsafe {
            match self.0.free_descriptor_sets(*pool, &sets) {
                Ok(()) => {}
                Err(err) => panic!("Unexpected return code '{}'", err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_count() -> DescriptorTotalCount {
        DescriptorTotalCount {
            sampler: 0,
            combined_image_sampler: 0,
            sampled_image: 0,
            storage_image: 0,
            uniform_texel_buffer: 0,
            storage_texel_buffer: 0,
            uniform_buffer: 0,
            storage_buffer: 0,
            uniform_buffer_dynamic: 0,
            storage_buffer_dynamic: 0,
            input_attachment: 0,
            acceleration_structure: 0,
            inline_uniform_block_bytes: 0,
            inline_uniform_block_bindings: 0,
        }
    }

    #[test]
    fn zero_counts_are_skipped() {
        let count = DescriptorTotalCount {
            uniform_buffer: 16,
            combined_image_sampler: 1024,
            ..empty_count()
        };
        let sizes = pool_sizes(&count);

        assert_eq!(sizes.len(), 2);
        assert!(sizes.iter().any(|size| {
            size.ty == vk::DescriptorType::UNIFORM_BUFFER && size.descriptor_count == 16
        }));
        assert!(sizes.iter().any(|size| {
            size.ty == vk::DescriptorType::COMBINED_IMAGE_SAMPLER && size.descriptor_count == 1024
        }));
    }

    #[test]
    #[should_panic(expected = "Inline uniform blocks")]
    fn inline_uniform_blocks_are_unsupported() {
        pool_sizes(&DescriptorTotalCount {
            inline_uniform_block_bytes: 64,
            ..empty_count()
        });
    }

    #[test]
    fn update_after_bind_pools_keep_the_flag() {
        let flags = pool_create_flags(
            DescriptorPoolCreateFlags::UPDATE_AFTER_BIND | DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET,
        );
        assert!(flags.contains(vk::DescriptorPoolCreateFlags::UPDATE_AFTER_BIND));
        assert!(flags.contains(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET));
    }
}
