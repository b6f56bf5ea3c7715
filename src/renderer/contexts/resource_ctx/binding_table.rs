use color_eyre::eyre::eyre;
use color_eyre::Result;
use crate::renderer::config::ClassCapacities;
use crate::renderer::contexts::resource_ctx::handle::Handle;
use crate::renderer::contexts::resource_ctx::storage::ResourceView;

/// Graphics-API side of the binding tables. This is the only place that talks to the GPU API.
///
/// Implementations must honour update-after-bind semantics: writing one slot of a table must
/// not disturb in-flight GPU reads of the other slots of that table.
pub trait BindingBackend {
    /// One per-frame binding table, e.g. a descriptor set
    type Table;

    /// Builds the layout and `frames_in_flight` identical tables sized for `capacities`
    fn create_tables(
        &mut self,
        capacities: &ClassCapacities,
        frames_in_flight: usize,
    ) -> Result<Vec<Self::Table>>;

    /// Points slot `handle` of every table in `tables` at `view`.
    /// All tables must reflect the new content once this returns.
    fn write_binding(
        &mut self,
        tables: &[Self::Table],
        handle: Handle,
        view: &ResourceView,
    );

    fn destroy_tables(&mut self, tables: Vec<Self::Table>);
}

/// Responsibilities:
/// - Own the per-frame binding tables and the backend that writes them
/// - Replicate every slot write into all frames in flight
pub struct BindingTableSet<B: BindingBackend> {
    backend: B,
    tables: Vec<B::Table>,
    capacities: Option<ClassCapacities>,
    writes: u64,
}

impl<B: BindingBackend> BindingTableSet<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            tables: Vec::new(),
            capacities: None,
            writes: 0,
        }
    }

    pub fn is_created(&self) -> bool {
        self.capacities.is_some()
    }

    pub fn create(
        &mut self,
        capacities: ClassCapacities,
        frames_in_flight: usize,
    ) -> Result<()> {
        if self.is_created() {
            return Err(eyre!("Binding tables were already created"));
        }

        let tables = self.backend.create_tables(&capacities, frames_in_flight)?;
        if tables.len() != frames_in_flight {
            let count = tables.len();
            self.backend.destroy_tables(tables);
            return Err(eyre!(
                "Backend created {} binding tables, expected {}",
                count,
                frames_in_flight,
            ));
        }

        self.tables = tables;
        self.capacities = Some(capacities);
        Ok(())
    }

    /// Writes `view` into slot `handle` of every frame's table.
    ///
    /// Panics if the slot lies outside the reserved capacity or the view does not match the
    /// handle's class. Both indicate a bug in the registry, never bad input.
    pub fn write(&mut self, handle: Handle, view: &ResourceView) {
        let capacities = self
            .capacities
            .as_ref()
            .expect("Binding tables written before creation");
        assert!(
            handle.index() < capacities.get(handle.class()),
            "{} lies outside the reserved {} capacity of {}",
            handle,
            handle.class(),
            capacities.get(handle.class()),
        );
        assert!(view.fits(handle.class()), "{:?} cannot be bound to {}", view, handle);

        self.backend.write_binding(&self.tables, handle, view);
        self.writes += 1;
        log::debug!("Wrote {} into {} binding tables", handle, self.tables.len());
    }

    /// Table the render loop binds for `frame_index`
    pub fn table(&self, frame_index: usize) -> Option<&B::Table> {
        self.tables.get(frame_index)
    }

    /// Number of slot writes, each replicated into all tables
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: BindingBackend> Drop for BindingTableSet<B> {
    fn drop(&mut self) {
        let tables = std::mem::take(&mut self.tables);
        if !tables.is_empty() {
            self.backend.destroy_tables(tables);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk;
    use ash::vk::Handle as VkHandle;
    use crate::renderer::contexts::resource_ctx::recording::RecordingBackend;
    use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;
    use crate::renderer::contexts::resource_ctx::storage::BufferBinding;
    use crate::renderer::contexts::resource_ctx::texture_slot::ImageBinding;

    fn created(frames_in_flight: usize) -> BindingTableSet<RecordingBackend> {
        let mut set = BindingTableSet::new(RecordingBackend::new());
        set.create(ClassCapacities::default().with(ResourceClass::SampledImage, 4), frames_in_flight)
            .unwrap();
        set
    }

    fn image(raw: u64) -> ResourceView {
        ResourceView::Image(ImageBinding::new(vk::ImageView::from_raw(raw), vk::Sampler::null()))
    }

    #[test]
    fn write_reaches_every_frame() {
        let mut set = created(3);
        let handle = Handle::new(ResourceClass::SampledImage, 2);
        set.write(handle, &image(7));

        for frame in 0..3 {
            let table = set.backend().table(*set.table(frame).unwrap()).unwrap();
            assert_eq!(table.get(handle), Some(image(7)));
        }
        assert_eq!(set.writes(), 1);
        assert_eq!(set.backend().table_writes(), 3);
    }

    #[test]
    fn out_of_range_frame_has_no_table() {
        let set = created(2);
        assert!(set.table(1).is_some());
        assert!(set.table(2).is_none());
    }

    #[test]
    fn creating_twice_is_rejected() {
        let mut set = created(2);
        assert!(set.create(ClassCapacities::default(), 2).is_err());
        assert!(set.table(1).is_some());
        assert!(set.table(2).is_none());
    }

    #[test]
    #[should_panic(expected = "outside the reserved")]
    fn writing_past_capacity_is_a_logic_fault() {
        let mut set = created(2);
        set.write(Handle::new(ResourceClass::SampledImage, 4), &image(1));
    }

    #[test]
    #[should_panic(expected = "cannot be bound")]
    fn writing_a_mismatched_view_is_a_logic_fault() {
        let mut set = created(2);
        set.write(
            Handle::new(ResourceClass::SampledImage, 0),
            &ResourceView::Buffer(BufferBinding::whole(vk::Buffer::from_raw(1))),
        );
    }

    #[test]
    fn dropping_releases_the_tables() {
        let set = created(2);
        let destroyed = set.backend().destroyed_tables();
        drop(set);
        assert_eq!(destroyed.get(), 2);
    }
}
