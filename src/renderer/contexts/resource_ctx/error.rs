use thiserror::Error;
use crate::renderer::contexts::resource_ctx::handle::Handle;
use crate::renderer::contexts::resource_ctx::resource_type::ResourceClass;

/// Failures surfaced by the registry. None of them are transient; the loader is expected to
/// abort content loading when one is returned.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("all {capacity} {class} slots are in use")]
    CapacityExceeded { class: ResourceClass, capacity: u32 },
    #[error("name \"{name}\" is bound to {existing}, cannot rebind it to {requested}")]
    DuplicateName {
        name: String,
        existing: Handle,
        requested: Handle,
    },
    #[error("handle {0} was never issued")]
    InvalidHandle(Handle),
    #[error("handle {handle} is already named \"{name}\"")]
    HandleAlreadyNamed { handle: Handle, name: String },
    #[error("texture slot {0} is already resolved and cannot be replaced")]
    AlreadyResolved(Handle),
    #[error("binding layout has not been initialized")]
    NotInitialized,
    #[error("binding layout was already initialized")]
    AlreadyInitialized,
    #[error("invalid registry configuration: {0}")]
    InvalidConfig(String),
    #[error("binding backend failure: {0}")]
    Backend(color_eyre::Report),
}
