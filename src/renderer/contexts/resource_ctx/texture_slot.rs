use ash::vk;

/// View + sampler pair a texture slot points at
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ImageBinding {
    pub view: vk::ImageView,
    pub sampler: vk::Sampler,
    pub layout: vk::ImageLayout,
}

impl ImageBinding {
    /// Binding for an image that was uploaded and transitioned for shader reads
    pub fn new(view: vk::ImageView, sampler: vk::Sampler) -> Self {
        Self {
            view,
            sampler,
            layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }
    }

    pub fn descriptor_info(&self) -> vk::DescriptorImageInfo {
        vk::DescriptorImageInfo::default()
            .image_view(self.view)
            .sampler(self.sampler)
            .image_layout(self.layout)
    }
}

/// Content of a texture slot. A slot created as a stand-in for content that is still loading
/// starts as `Placeholder`; the only legal change afterwards is resolving it in place.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureSlot {
    Placeholder(ImageBinding),
    Resolved(ImageBinding),
}

impl TextureSlot {
    pub fn view(&self) -> &ImageBinding {
        match self {
            Self::Placeholder(view) | Self::Resolved(view) => view,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Swaps the stand-in for real content and returns the view it retired.
    /// Returns `None` and leaves the slot untouched if it was already resolved.
    pub fn resolve(&mut self, view: ImageBinding) -> Option<ImageBinding> {
        match *self {
            Self::Placeholder(retired) => {
                *self = Self::Resolved(view);
                Some(retired)
            }
            Self::Resolved(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle as VkHandle;

    fn image(raw: u64) -> ImageBinding {
        ImageBinding::new(vk::ImageView::from_raw(raw), vk::Sampler::from_raw(100))
    }

    #[test]
    fn resolving_a_placeholder_retires_the_stand_in() {
        let mut slot = TextureSlot::Placeholder(image(1));
        assert!(slot.is_placeholder());

        assert_eq!(slot.resolve(image(2)), Some(image(1)));
        assert_eq!(slot, TextureSlot::Resolved(image(2)));
        assert!(!slot.is_placeholder());
    }

    #[test]
    fn resolved_slot_cannot_be_resolved_again() {
        let mut slot = TextureSlot::Resolved(image(1));
        assert_eq!(slot.resolve(image(2)), None);
        assert_eq!(slot.view(), &image(1));
    }

    #[test]
    fn descriptor_info_uses_shader_read_layout() {
        let info = image(5).descriptor_info();
        assert_eq!(info.image_view, vk::ImageView::from_raw(5));
        assert_eq!(info.image_layout, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
    }
}
