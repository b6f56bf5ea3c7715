use std::fmt;
use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;

/// Stable index of a resource inside its class' binding. This is the value shaders receive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Handle {
    class: ResourceClass,
    index: u32,
}

impl Handle {
    /// Index reserved for the invalid sentinel. No class may be configured with this many slots.
    pub const INVALID_INDEX: u32 = u32::MAX;

    pub fn new(class: ResourceClass, index: u32) -> Self {
        Self { class, index }
    }

    pub fn invalid(class: ResourceClass) -> Self {
        Self::new(class, Self::INVALID_INDEX)
    }

    pub fn class(self) -> ResourceClass {
        self.class
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn is_valid(self) -> bool {
        self.index != Self::INVALID_INDEX
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}#{}", self.class, self.index)
        } else {
            write!(f, "{}#invalid", self.class)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_is_distinct_from_every_issued_index() {
        let invalid = Handle::invalid(ResourceClass::SampledImage);
        assert!(!invalid.is_valid());
        assert_ne!(invalid, Handle::new(ResourceClass::SampledImage, 0));
        assert!(Handle::new(ResourceClass::SampledImage, 0).is_valid());
    }

    #[test]
    fn handles_of_different_classes_never_compare_equal() {
        assert_ne!(
            Handle::new(ResourceClass::UniformBuffer, 3),
            Handle::new(ResourceClass::StorageBuffer, 3),
        );
    }

    #[test]
    fn display_names_class_and_index() {
        assert_eq!(Handle::new(ResourceClass::SampledImage, 7).to_string(), "texture#7");
        assert_eq!(Handle::invalid(ResourceClass::UniformBuffer).to_string(), "ubo#invalid");
    }
}
