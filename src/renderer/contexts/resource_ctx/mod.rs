//! Responsibilities:
//! - Issue stable bindless handles for buffers and textures
//! - Deduplicate resources by logical name
//! - Keep one binding table per frame in flight consistent
//! - Track placeholder textures until their real content is resolved in place

pub mod binding_table;
pub mod descriptor_set_layout_builder;
pub mod error;
pub mod handle;
mod name_index;
pub mod recording;
pub mod registry;
pub mod resource_type;
pub mod slot_arena;
pub mod storage;
pub mod texture_slot;

pub use binding_table::{BindingBackend, BindingTableSet};
pub use error::RegistryError;
pub use handle::Handle;
pub use recording::{RecordedTable, RecordedTableId, RecordingBackend};
pub use registry::{BindlessRegistry, RegistryStats};
pub use resource_type::ResourceClass;
pub use slot_arena::SlotArena;
pub use storage::{BufferBinding, RenderResourceStorage, ResourceView, SlotRecord};
pub use texture_slot::{ImageBinding, TextureSlot};

/// Names of the deferred-rendering targets. They are ordinary named texture slots.
pub mod render_targets {
    pub const GBUFFER_ALBEDO: &str = "gbuffer/albedo";
    pub const GBUFFER_NORMAL: &str = "gbuffer/normal";
    pub const GBUFFER_DEPTH: &str = "gbuffer/depth";

    pub const ALL: &[&str] = &[GBUFFER_ALBEDO, GBUFFER_NORMAL, GBUFFER_DEPTH];
}
