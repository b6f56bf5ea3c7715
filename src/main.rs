use ash::vk;
use ash::vk::Handle as VkHandle;
use color_eyre::Result;
use bindless_registry::renderer::console::registry_commands;
use bindless_registry::renderer::contexts::resource_ctx::render_targets;
use bindless_registry::renderer::{
    BindlessRegistry,
    BufferBinding,
    ImageBinding,
    RecordingBackend,
    RegistryConfig,
};

/// Walks a loading session against an in-memory backend and prints what the registry holds
fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let mut registry = BindlessRegistry::from_config(RecordingBackend::new(), RegistryConfig::default())?;
    let sampler = vk::Sampler::from_raw(1);
    let image = |raw: u64| ImageBinding::new(vk::ImageView::from_raw(raw), sampler);

    registry.store_ubo(BufferBinding::whole(vk::Buffer::from_raw(10)), Some("camera"))?;
    registry.store_buffer(BufferBinding::whole(vk::Buffer::from_raw(11)), Some("objects"))?;

    for (raw, name) in (100..).zip(render_targets::ALL.iter().copied()) {
        registry.store_texture(image(raw), Some(name), None)?;
    }

    let pending = registry.store_placeholder(image(200), Some("textures/rock.png"))?;
    registry.store_texture(image(201), Some("textures/grass.png"), None)?;
    let reused = registry.store_texture(image(202), Some("textures/grass.png"), None)?;
    log::info!("Second load of textures/grass.png reused {}", reused);

    let retired = registry.replace_at_handle(pending, image(300))?;
    log::info!("Retired stand-in view {:?}", retired.view);

    let mut commands = registry_commands()?;
    for line in [
        "registry.stats",
        "registry.lookup texture textures/rock.png",
        "registry.missing 3",
    ] {
        println!("> {}\n{}", line, commands.execute(&mut registry, line)?);
    }

    Ok(())
}
