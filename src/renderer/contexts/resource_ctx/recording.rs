use std::cell::Cell;
use std::rc::Rc;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use crate::renderer::config::ClassCapacities;
use crate::renderer::contexts::resource_ctx::binding_table::BindingBackend;
use crate::renderer::contexts::resource_ctx::handle::Handle;
use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;
use crate::renderer::contexts::resource_ctx::storage::ResourceView;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RecordedTableId(usize);

/// Host-memory copy of one binding table
#[derive(Debug, Clone, Default)]
pub struct RecordedTable {
    slots: [Vec<Option<ResourceView>>; ResourceClass::COUNT],
}

impl RecordedTable {
    fn new(capacities: &ClassCapacities) -> Self {
        let mut table = Self::default();
        for class in ResourceClass::ALL {
            table.slots[class.index()] = vec![None; capacities.get(*class) as usize];
        }
        table
    }

    pub fn get(&self, handle: Handle) -> Option<ResourceView> {
        self.slots[handle.class().index()]
            .get(handle.index() as usize)
            .copied()
            .flatten()
    }

    /// Number of slots of `class` that were written at least once
    pub fn bound(&self, class: ResourceClass) -> usize {
        self.slots[class.index()]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn capacity(&self, class: ResourceClass) -> usize {
        self.slots[class.index()].len()
    }
}

/// Backend that keeps its binding tables in host memory and counts every write.
/// Used to inspect replication in tests and to drive the registry without a device.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    tables: Vec<RecordedTable>,
    batches: u64,
    table_writes: u64,
    destroyed: Rc<Cell<usize>>,
    fail_table_creation: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose table creation always fails
    pub fn failing() -> Self {
        Self {
            fail_table_creation: true,
            ..Self::default()
        }
    }

    pub fn table(&self, id: RecordedTableId) -> Option<&RecordedTable> {
        self.tables.get(id.0)
    }

    pub fn tables(&self) -> &[RecordedTable] {
        &self.tables
    }

    /// Number of `write_binding` calls
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Number of individual table slot updates across all frames
    pub fn table_writes(&self) -> u64 {
        self.table_writes
    }

    /// Counter of destroyed tables that stays readable after the backend is dropped
    pub fn destroyed_tables(&self) -> Rc<Cell<usize>> {
        self.destroyed.clone()
    }
}

impl BindingBackend for RecordingBackend {
    type Table = RecordedTableId;

    fn create_tables(
        &mut self,
        capacities: &ClassCapacities,
        frames_in_flight: usize,
    ) -> Result<Vec<Self::Table>> {
        if self.fail_table_creation {
            return Err(eyre!("Recording backend configured to fail table creation"));
        }

        let first = self.tables.len();
        self.tables
            .extend((0..frames_in_flight).map(|_| RecordedTable::new(capacities)));
        Ok((first..self.tables.len()).map(RecordedTableId).collect())
    }

    fn write_binding(
        &mut self,
        tables: &[Self::Table],
        handle: Handle,
        view: &ResourceView,
    ) {
        self.batches += 1;
        for id in tables {
            let slot = self.tables[id.0].slots[handle.class().index()]
                .get_mut(handle.index() as usize)
                .expect("Recorded table slot out of range");
            *slot = Some(*view);
            self.table_writes += 1;
        }
    }

    fn destroy_tables(&mut self, tables: Vec<Self::Table>) {
        self.destroyed.set(self.destroyed.get() + tables.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk;
    use ash::vk::Handle as VkHandle;
    use crate::renderer::contexts::resource_ctx::storage::BufferBinding;

    #[test]
    fn tables_are_sized_per_class() {
        let mut backend = RecordingBackend::new();
        let capacities = ClassCapacities {
            uniform_buffers: 1,
            storage_buffers: 2,
            sampled_images: 3,
        };
        let ids = backend.create_tables(&capacities, 2).unwrap();

        assert_eq!(ids.len(), 2);
        let table = backend.table(ids[1]).unwrap();
        assert_eq!(table.capacity(ResourceClass::UniformBuffer), 1);
        assert_eq!(table.capacity(ResourceClass::StorageBuffer), 2);
        assert_eq!(table.capacity(ResourceClass::SampledImage), 3);
        assert_eq!(table.bound(ResourceClass::SampledImage), 0);
    }

    #[test]
    fn one_batch_updates_each_table_once() {
        let mut backend = RecordingBackend::new();
        let ids = backend.create_tables(&ClassCapacities::default(), 3).unwrap();
        let handle = Handle::new(ResourceClass::StorageBuffer, 0);
        let view = ResourceView::Buffer(BufferBinding::whole(vk::Buffer::from_raw(4)));

        backend.write_binding(&ids, handle, &view);

        assert_eq!(backend.batches(), 1);
        assert_eq!(backend.table_writes(), 3);
        assert!(backend.tables().iter().all(|table| table.get(handle) == Some(view)));
    }

    #[test]
    fn failing_backend_refuses_creation() {
        let mut backend = RecordingBackend::failing();
        assert!(backend.create_tables(&ClassCapacities::default(), 2).is_err());
        assert!(backend.tables().is_empty());
    }
}
