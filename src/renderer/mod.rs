pub mod config;
pub mod console;
pub mod contexts;
pub mod shader_data;
pub mod vk;

pub use config::{ClassCapacities, RegistryConfig};
pub use contexts::resource_ctx::{
    BindingBackend,
    BindlessRegistry,
    BufferBinding,
    Handle,
    ImageBinding,
    RecordingBackend,
    RegistryError,
    RegistryStats,
    ResourceClass,
    ResourceView,
};
