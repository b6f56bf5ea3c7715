// Vulkan implementation of the binding tables.

pub mod backend;
pub mod descriptor_device;

pub use backend::AshBindingBackend;
