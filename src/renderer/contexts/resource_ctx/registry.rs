use std::fmt;
use crate::renderer::config::{ClassCapacities, RegistryConfig};
use crate::renderer::contexts::resource_ctx::binding_table::{BindingBackend, BindingTableSet};
use crate::renderer::contexts::resource_ctx::error::RegistryError;
use crate::renderer::contexts::resource_ctx::handle::Handle;
use crate::renderer::contexts::resource_ctx::name_index::NameIndex;
use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;
use crate::renderer::contexts::resource_ctx::slot_arena::SlotArena;
use crate::renderer::contexts::resource_ctx::storage::{
    BufferBinding,
    RenderResourceStorage,
    ResourceView,
    SlotRecord,
};
use crate::renderer::contexts::resource_ctx::texture_slot::{ImageBinding, TextureSlot};

/// Per-class bookkeeping that only exists once the layout has been initialized
struct ResourceLayout {
    arenas: [SlotArena; ResourceClass::COUNT],
    names: [NameIndex; ResourceClass::COUNT],
    storage: RenderResourceStorage,
}

impl ResourceLayout {
    fn new(capacities: &ClassCapacities) -> Self {
        Self {
            arenas: [
                SlotArena::new(ResourceClass::UniformBuffer, capacities.uniform_buffers),
                SlotArena::new(ResourceClass::StorageBuffer, capacities.storage_buffers),
                SlotArena::new(ResourceClass::SampledImage, capacities.sampled_images),
            ],
            names: Default::default(),
            storage: RenderResourceStorage::new(capacities),
        }
    }

    fn arena(&self, class: ResourceClass) -> &SlotArena {
        &self.arenas[class.index()]
    }

    fn names(&self, class: ResourceClass) -> &NameIndex {
        &self.names[class.index()]
    }

    fn allocate(&mut self, class: ResourceClass) -> Result<Handle, RegistryError> {
        self.arenas[class.index()].allocate().inspect_err(|err| {
            log::error!("Refusing to register another {}: {}", class, err);
        })
    }

    fn ensure_issued(&self, handle: Handle) -> Result<(), RegistryError> {
        if self.arena(handle.class()).is_issued(handle) {
            Ok(())
        } else {
            Err(RegistryError::InvalidHandle(handle))
        }
    }
}

/// Snapshot of how full the registry is
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RegistryStats {
    pub uniform_buffers: u32,
    pub storage_buffers: u32,
    pub sampled_images: u32,
    pub placeholders: u32,
    pub names: u32,
    pub table_writes: u64,
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ubo: {}, buffer: {}, texture: {} ({} placeholder), names: {}, writes: {}",
            self.uniform_buffers,
            self.storage_buffers,
            self.sampled_images,
            self.placeholders,
            self.names,
            self.table_writes,
        )
    }
}

/// Bindless resource registry.
///
/// Hands out stable handles for buffers and textures, deduplicates them by logical name and
/// keeps one binding table per frame in flight in sync. All registration happens on the
/// loading thread; render code only ever sees the integer handles.
pub struct BindlessRegistry<B: BindingBackend> {
    tables: BindingTableSet<B>,
    frames_in_flight: usize,
    layout: Option<ResourceLayout>,
}

impl<B: BindingBackend> BindlessRegistry<B> {
    pub fn new(backend: B, frames_in_flight: usize) -> Result<Self, RegistryError> {
        if frames_in_flight == 0 {
            return Err(RegistryError::InvalidConfig(
                "at least one frame in flight is required".into(),
            ));
        }

        Ok(Self {
            tables: BindingTableSet::new(backend),
            frames_in_flight,
            layout: None,
        })
    }

    /// Creates the registry and initializes its layout in one go
    pub fn from_config(backend: B, config: RegistryConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new(backend, config.frames_in_flight)?;
        registry.initialize_layout(config.capacities)?;
        Ok(registry)
    }

    /// Builds the binding layout and the per-frame tables. Must run exactly once, before any
    /// resource is stored.
    pub fn initialize_layout(&mut self, capacities: ClassCapacities) -> Result<(), RegistryError> {
        if self.layout.is_some() {
            return Err(RegistryError::AlreadyInitialized);
        }
        if let Some(class) = ResourceClass::ALL
            .iter()
            .find(|class| capacities.get(**class) >= Handle::INVALID_INDEX)
        {
            return Err(RegistryError::InvalidConfig(format!(
                "{} capacity must stay below {}",
                class,
                Handle::INVALID_INDEX,
            )));
        }

        self.tables
            .create(capacities, self.frames_in_flight)
            .map_err(RegistryError::Backend)?;
        self.layout = Some(ResourceLayout::new(&capacities));

        log::info!(
            "Initialized bindless layout for {} frames in flight ({} ubo, {} buffer, {} texture slots)",
            self.frames_in_flight,
            capacities.uniform_buffers,
            capacities.storage_buffers,
            capacities.sampled_images,
        );
        Ok(())
    }

    pub fn store_ubo(
        &mut self,
        buffer: BufferBinding,
        name: Option<&str>,
    ) -> Result<Handle, RegistryError> {
        self.store_buffer_of(ResourceClass::UniformBuffer, buffer, name)
    }

    pub fn store_buffer(
        &mut self,
        buffer: BufferBinding,
        name: Option<&str>,
    ) -> Result<Handle, RegistryError> {
        self.store_buffer_of(ResourceClass::StorageBuffer, buffer, name)
    }

    /// Registers a texture.
    ///
    /// - A `designated` handle resolves that placeholder slot in place; the handle value does
    ///   not change. `name` may already be bound to the designated handle but to no other.
    ///   Once the slot is resolved, a repeated request under its own name is a plain reuse.
    ///   Use [`Self::replace_at_handle`] to get the retired stand-in back.
    /// - Otherwise a `name` that is already registered returns the existing handle without
    ///   touching the binding tables, and a new slot is allocated for anything else.
    pub fn store_texture(
        &mut self,
        image: ImageBinding,
        name: Option<&str>,
        designated: Option<Handle>,
    ) -> Result<Handle, RegistryError> {
        let Some(handle) = designated else {
            if let Some(existing) = self.dedup(ResourceClass::SampledImage, name)? {
                return Ok(existing);
            }
            return self.store_texture_slot(TextureSlot::Resolved(image), name);
        };

        let reused = name.and_then(|name| self.lookup_by_name(ResourceClass::SampledImage, name));
        if reused == Some(handle) && !self.check_missing(handle) {
            log::debug!("Reusing resolved {}", handle);
            return Ok(handle);
        }

        let retired = self.resolve(handle, image, name)?;
        log::debug!("Stand-in view {:?} of {} is no longer referenced", retired.view, handle);
        Ok(handle)
    }

    /// Registers a stand-in texture whose real content is still loading
    pub fn store_placeholder(
        &mut self,
        image: ImageBinding,
        name: Option<&str>,
    ) -> Result<Handle, RegistryError> {
        if let Some(existing) = self.dedup(ResourceClass::SampledImage, name)? {
            return Ok(existing);
        }
        self.store_texture_slot(TextureSlot::Placeholder(image), name)
    }

    /// Resolves the placeholder at `handle` with `image`.
    ///
    /// Returns the retired stand-in view. The registry no longer references it, so the caller
    /// may destroy it once no submitted frame uses it anymore.
    pub fn replace_at_handle(
        &mut self,
        handle: Handle,
        image: ImageBinding,
    ) -> Result<ImageBinding, RegistryError> {
        self.resolve(handle, image, None)
    }

    pub fn lookup_by_name(&self, class: ResourceClass, name: &str) -> Option<Handle> {
        self.layout
            .as_ref()
            .and_then(|layout| layout.names(class).lookup(name))
    }

    /// True only for an issued texture slot that still holds its placeholder.
    /// Handles that were never issued are unbound, not missing.
    pub fn check_missing(&self, handle: Handle) -> bool {
        if handle.class() != ResourceClass::SampledImage {
            return false;
        }
        self.layout
            .as_ref()
            .and_then(|layout| layout.storage.texture(handle.index()))
            .is_some_and(TextureSlot::is_placeholder)
    }

    /// Acknowledges that the caller is about to destroy the resource behind `handle`.
    /// Slots are never reclaimed, so the handle stays issued and keeps its last binding.
    pub fn unregister(&mut self, handle: Handle) -> Result<(), RegistryError> {
        let layout = self.layout.as_ref().ok_or(RegistryError::NotInitialized)?;
        layout.ensure_issued(handle)?;
        log::debug!("Unregistered {}; the slot is kept and not reused", handle);
        Ok(())
    }

    pub fn slot(&self, handle: Handle) -> Option<SlotRecord> {
        self.layout
            .as_ref()
            .and_then(|layout| layout.storage.record(handle))
    }

    pub fn name_of(&self, handle: Handle) -> Option<&str> {
        self.layout
            .as_ref()
            .and_then(|layout| layout.names(handle.class()).name_of(handle))
    }

    pub fn issued(&self, class: ResourceClass) -> u32 {
        self.layout
            .as_ref()
            .map_or(0, |layout| layout.arena(class).issued())
    }

    pub fn capacity(&self, class: ResourceClass) -> u32 {
        self.layout
            .as_ref()
            .map_or(0, |layout| layout.arena(class).capacity())
    }

    pub fn is_initialized(&self) -> bool {
        self.layout.is_some()
    }

    pub fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Binding table the render loop binds while recording `frame_index`
    pub fn table(&self, frame_index: usize) -> Option<&B::Table> {
        self.tables.table(frame_index)
    }

    pub fn stats(&self) -> RegistryStats {
        let Some(layout) = self.layout.as_ref() else {
            return RegistryStats::default();
        };

        RegistryStats {
            uniform_buffers: layout.arena(ResourceClass::UniformBuffer).issued(),
            storage_buffers: layout.arena(ResourceClass::StorageBuffer).issued(),
            sampled_images: layout.arena(ResourceClass::SampledImage).issued(),
            placeholders: layout.storage.placeholder_count() as u32,
            names: layout.names.iter().map(|names| names.len() as u32).sum(),
            table_writes: self.tables.writes(),
        }
    }

    pub fn backend(&self) -> &B {
        self.tables.backend()
    }

    pub fn backend_mut(&mut self) -> &mut B {
        self.tables.backend_mut()
    }

    /// Returns the handle already registered under `name`, if any
    fn dedup(
        &self,
        class: ResourceClass,
        name: Option<&str>,
    ) -> Result<Option<Handle>, RegistryError> {
        let layout = self.layout.as_ref().ok_or(RegistryError::NotInitialized)?;
        let existing = name.and_then(|name| layout.names(class).lookup(name));
        if let (Some(name), Some(existing)) = (name, existing) {
            log::debug!("Reusing {} for \"{}\"", existing, name);
        }
        Ok(existing)
    }

    fn store_buffer_of(
        &mut self,
        class: ResourceClass,
        buffer: BufferBinding,
        name: Option<&str>,
    ) -> Result<Handle, RegistryError> {
        if let Some(existing) = self.dedup(class, name)? {
            return Ok(existing);
        }

        let layout = self.layout.as_mut().ok_or(RegistryError::NotInitialized)?;
        let handle = layout.allocate(class)?;
        layout.storage.push_buffer(handle, buffer);
        self.tables.write(handle, &ResourceView::Buffer(buffer));
        if let Some(name) = name {
            layout.names[class.index()].insert(name, handle)?;
        }
        Ok(handle)
    }

    fn store_texture_slot(
        &mut self,
        slot: TextureSlot,
        name: Option<&str>,
    ) -> Result<Handle, RegistryError> {
        let class = ResourceClass::SampledImage;
        let layout = self.layout.as_mut().ok_or(RegistryError::NotInitialized)?;
        let handle = layout.allocate(class)?;
        layout.storage.push_texture(handle, slot);
        self.tables.write(handle, &ResourceView::Image(*slot.view()));
        if let Some(name) = name {
            layout.names[class.index()].insert(name, handle)?;
        }
        Ok(handle)
    }

    fn resolve(
        &mut self,
        handle: Handle,
        image: ImageBinding,
        name: Option<&str>,
    ) -> Result<ImageBinding, RegistryError> {
        let layout = self.layout.as_mut().ok_or(RegistryError::NotInitialized)?;
        if handle.class() != ResourceClass::SampledImage {
            return Err(RegistryError::InvalidHandle(handle));
        }
        layout.ensure_issued(handle)?;
        if let Some(name) = name {
            layout.names(handle.class()).check(name, handle)?;
        }

        let slot = layout
            .storage
            .texture_mut(handle.index())
            .ok_or(RegistryError::InvalidHandle(handle))?;
        let retired = slot
            .resolve(image)
            .ok_or(RegistryError::AlreadyResolved(handle))?;
        self.tables.write(handle, &ResourceView::Image(image));
        if let Some(name) = name {
            layout.names[handle.class().index()].insert(name, handle)?;
        }

        log::info!("Resolved placeholder {} in place", handle);
        Ok(retired)
    }
}
