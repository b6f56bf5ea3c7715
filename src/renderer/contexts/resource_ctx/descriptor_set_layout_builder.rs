use ash::vk;
use color_eyre::Result;
use crate::renderer::config::ClassCapacities;
use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;

pub struct DescriptorSetLayoutBuilder<'a> {
    bindings: Vec<vk::DescriptorSetLayoutBinding<'a>>,
    binding_flags: Vec<vk::DescriptorBindingFlags>,
}

impl DescriptorSetLayoutBuilder<'_> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            binding_flags: Vec::new(),
        }
    }

    pub fn add_binding(
        mut self,
        binding: u32,
        descriptor_type: vk::DescriptorType,
        descriptor_count: u32,
        stages: vk::ShaderStageFlags,
        binding_flags: vk::DescriptorBindingFlags,
    ) -> Self {
        let binding = vk::DescriptorSetLayoutBinding::default()
            .binding(binding)
            .descriptor_type(descriptor_type)
            .descriptor_count(descriptor_count)
            .stage_flags(stages);

        self.bindings.push(binding);
        self.binding_flags.push(binding_flags);
        self
    }

    pub fn add_binding_for_class(
        self,
        class: ResourceClass,
        descriptor_count: u32,
    ) -> Self {
        self.add_binding(
            class.binding(),
            class.descriptor_type(),
            descriptor_count,
            vk::ShaderStageFlags::ALL,
            class.descriptor_binding_flags(),
        )
    }

    /// One binding per resource class, each sized to that class' slot budget
    pub fn bindless(capacities: &ClassCapacities) -> Self {
        ResourceClass::ALL
            .iter()
            .fold(Self::new(), |builder, class| {
                builder.add_binding_for_class(*class, capacities.get(*class))
            })
    }

    pub fn bindings(&self) -> &[vk::DescriptorSetLayoutBinding<'_>] {
        &self.bindings
    }

    pub fn build(
        self,
        flags: vk::DescriptorSetLayoutCreateFlags,
        device: &ash::Device,
    ) -> Result<vk::DescriptorSetLayout> {
        let mut binding_flags_info = vk::DescriptorSetLayoutBindingFlagsCreateInfo::default()
            .binding_flags(&self.binding_flags);
        let layout_info = vk::DescriptorSetLayoutCreateInfo::default()
            .bindings(&self.bindings)
            .flags(flags)
            .push_next(&mut binding_flags_info);
        Ok(unsafe {
            device.create_descriptor_set_layout(&layout_info, None)?
        })
    }
}

impl Default for DescriptorSetLayoutBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindless_layout_has_one_binding_per_class() {
        let capacities = ClassCapacities {
            uniform_buffers: 4,
            storage_buffers: 8,
            sampled_images: 16,
        };
        let builder = DescriptorSetLayoutBuilder::bindless(&capacities);
        let bindings = builder.bindings();

        assert_eq!(bindings.len(), ResourceClass::COUNT);
        for class in ResourceClass::ALL {
            let binding = &bindings[class.index()];
            assert_eq!(binding.binding, class.binding());
            assert_eq!(binding.descriptor_type, class.descriptor_type());
            assert_eq!(binding.descriptor_count, capacities.get(*class));
            assert_eq!(binding.stage_flags, vk::ShaderStageFlags::ALL);
        }
    }
}
