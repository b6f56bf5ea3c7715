use std::collections::HashMap;
use crate::renderer::contexts::resource_ctx::error::RegistryError;
use crate::renderer::contexts::resource_ctx::handle::Handle;

/// Maps logical names (usually file paths) to issued handles so that repeated requests for
/// the same content reuse one slot. A name binds to at most one handle and a handle carries
/// at most one name.
#[derive(Debug, Default)]
pub struct NameIndex {
    handles: HashMap<String, Handle>,
    names: HashMap<Handle, String>,
}

impl NameIndex {
    pub fn lookup(&self, name: &str) -> Option<Handle> {
        self.handles.get(name).copied()
    }

    pub fn name_of(&self, handle: Handle) -> Option<&str> {
        self.names.get(&handle).map(String::as_str)
    }

    /// Validates that `name` may be bound to `handle` without changing anything
    pub fn check(&self, name: &str, handle: Handle) -> Result<(), RegistryError> {
        if let Some(existing) = self.lookup(name) {
            if existing != handle {
                return Err(RegistryError::DuplicateName {
                    name: name.to_owned(),
                    existing,
                    requested: handle,
                });
            }
        }

        match self.name_of(handle) {
            Some(current) if current != name => Err(RegistryError::HandleAlreadyNamed {
                handle,
                name: current.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    /// Binds `name` to `handle`. Binding the same pair again is a no-op.
    pub fn insert(&mut self, name: &str, handle: Handle) -> Result<(), RegistryError> {
        self.check(name, handle)?;

        if self.handles.insert(name.to_owned(), handle).is_none() {
            self.names.insert(handle, name.to_owned());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}
