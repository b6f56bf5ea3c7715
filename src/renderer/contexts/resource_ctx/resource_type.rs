use std::fmt;
use ash::vk;

/// Kind of resource a handle refers to. Every class owns one binding of the bindless set.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ResourceClass {
    UniformBuffer,
    StorageBuffer,
    SampledImage,
}

impl ResourceClass {
    pub const ALL: &'static [Self] = &[
        Self::UniformBuffer,
        Self::StorageBuffer,
        Self::SampledImage,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Position of the class in per-class arrays
    pub fn index(self) -> usize {
        match self {
            Self::UniformBuffer => 0,
            Self::StorageBuffer => 1,
            Self::SampledImage => 2,
        }
    }

    /// Binding point inside the bindless descriptor set. Shaders must use the same numbers.
    pub fn binding(self) -> u32 {
        self.index() as u32
    }

    pub fn descriptor_type(self) -> vk::DescriptorType {
        match self {
            Self::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
            Self::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
            Self::SampledImage => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        }
    }

    pub fn descriptor_binding_flags(self) -> vk::DescriptorBindingFlags {
        vk::DescriptorBindingFlags::PARTIALLY_BOUND
            | vk::DescriptorBindingFlags::UPDATE_AFTER_BIND
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::UniformBuffer => "ubo",
            Self::StorageBuffer => "buffer",
            Self::SampledImage => "texture",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|class| class.name() == name)
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_are_distinct_and_dense() {
        let mut bindings = ResourceClass::ALL
            .iter()
            .map(|class| class.binding())
            .collect::<Vec<_>>();
        bindings.sort();
        assert_eq!(bindings, vec![0, 1, 2]);
    }

    #[test]
    fn textures_bind_as_combined_image_samplers() {
        assert_eq!(
            ResourceClass::SampledImage.descriptor_type(),
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        );
    }

    #[test]
    fn every_class_is_update_after_bind() {
        for class in ResourceClass::ALL {
            let flags = class.descriptor_binding_flags();
            assert!(flags.contains(vk::DescriptorBindingFlags::UPDATE_AFTER_BIND));
            assert!(flags.contains(vk::DescriptorBindingFlags::PARTIALLY_BOUND));
        }
    }

    #[test]
    fn parse_round_trips_names() {
        for class in ResourceClass::ALL {
            assert_eq!(ResourceClass::parse(class.name()), Some(*class));
        }
        assert_eq!(ResourceClass::parse("sampler"), None);
    }
}
