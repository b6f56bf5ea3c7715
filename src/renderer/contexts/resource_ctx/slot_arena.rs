use crate::renderer::contexts::resource_ctx::error::RegistryError;
use crate::renderer::contexts::resource_ctx::handle::Handle;
use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;

/// Append-only handle issuer for a single class.
/// Indices are never compacted or handed out twice.
pub struct SlotArena {
    class: ResourceClass,
    next: u32,
    capacity: u32,
}

impl SlotArena {
    pub fn new(class: ResourceClass, capacity: u32) -> Self {
        debug_assert!(capacity < Handle::INVALID_INDEX);
        Self {
            class,
            next: 0,
            capacity,
        }
    }

    pub fn allocate(&mut self) -> Result<Handle, RegistryError> {
        if self.next >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                class: self.class,
                capacity: self.capacity,
            });
        }

        let handle = Handle::new(self.class, self.next);
        self.next += 1;
        Ok(handle)
    }

    pub fn is_issued(&self, handle: Handle) -> bool {
        handle.class() == self.class && handle.index() < self.next
    }

    pub fn issued(&self) -> u32 {
        self.next
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_increasing_indices_from_zero() {
        let mut arena = SlotArena::new(ResourceClass::StorageBuffer, 8);
        let indices = (0..8)
            .map(|_| arena.allocate().unwrap().index())
            .collect::<Vec<_>>();
        assert_eq!(indices, (0..8).collect::<Vec<_>>());
        assert_eq!(arena.issued(), arena.capacity());
    }

    #[test]
    fn exhausted_arena_fails_without_bumping() {
        let mut arena = SlotArena::new(ResourceClass::UniformBuffer, 1);
        arena.allocate().unwrap();

        let err = arena.allocate().unwrap_err();
        assert!(matches!(
            err,
            RegistryError::CapacityExceeded { class: ResourceClass::UniformBuffer, capacity: 1 }
        ));
        assert_eq!(arena.issued(), 1);
    }

    #[test]
    fn zero_capacity_refuses_everything() {
        let mut arena = SlotArena::new(ResourceClass::SampledImage, 0);
        assert!(arena.allocate().is_err());
    }

    #[test]
    fn is_issued_checks_class_and_range() {
        let mut arena = SlotArena::new(ResourceClass::SampledImage, 4);
        let handle = arena.allocate().unwrap();

        assert!(arena.is_issued(handle));
        assert!(!arena.is_issued(Handle::new(ResourceClass::SampledImage, 1)));
        assert!(!arena.is_issued(Handle::new(ResourceClass::StorageBuffer, 0)));
        assert!(!arena.is_issued(Handle::invalid(ResourceClass::SampledImage)));
    }
}
