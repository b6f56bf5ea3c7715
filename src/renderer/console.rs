use std::collections::BTreeMap;
use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use crate::renderer::contexts::resource_ctx::{
    BindingBackend,
    BindlessRegistry,
    Handle,
    ResourceClass,
};

/// Console command operating on a context of type `C`. Receives the arguments after the
/// command name and returns the text to print.
pub type ConsoleCommand<C> = Box<dyn FnMut(&mut C, &[&str]) -> Result<String>>;

/// Table of named console commands
pub struct ConsoleCommands<C> {
    commands: BTreeMap<String, ConsoleCommand<C>>,
}

impl<C> ConsoleCommands<C> {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, command: F) -> Result<()>
    where
        F: FnMut(&mut C, &[&str]) -> Result<String> + 'static,
    {
        if self.commands.contains_key(name) {
            bail!("Console command '{}' is already registered", name);
        }
        self.commands.insert(name.to_owned(), Box::new(command));
        Ok(())
    }

    /// Runs `line` as `<command> [args...]` against `ctx`
    pub fn execute(&mut self, ctx: &mut C, line: &str) -> Result<String> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or_else(|| eyre!("Empty console command"))?;
        let args = words.collect::<Vec<_>>();

        let command = self
            .commands
            .get_mut(name)
            .ok_or_else(|| eyre!("Unknown console command '{}'", name))?;
        command(ctx, args.as_slice())
    }

    /// Registered command names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}

impl<C> Default for ConsoleCommands<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Inspection commands for a registry
pub fn registry_commands<B: BindingBackend + 'static>() -> Result<ConsoleCommands<BindlessRegistry<B>>> {
    let mut commands = ConsoleCommands::new();

    commands.register("registry.stats", |registry: &mut BindlessRegistry<B>, _args| {
        Ok(registry.stats().to_string())
    })?;
    commands.register("registry.lookup", |registry: &mut BindlessRegistry<B>, args| {
        let [class, name] = args else {
            bail!("usage: registry.lookup <ubo|buffer|texture> <name>");
        };
        let class = ResourceClass::parse(class)
            .ok_or_else(|| eyre!("Unknown resource class '{}'", class))?;
        Ok(match registry.lookup_by_name(class, name) {
            Some(handle) => handle.to_string(),
            None => format!("no {} named \"{}\"", class, name),
        })
    })?;
    commands.register("registry.missing", |registry: &mut BindlessRegistry<B>, args| {
        let [index] = args else {
            bail!("usage: registry.missing <texture index>");
        };
        let index = index.parse::<u32>()?;
        let handle = Handle::new(ResourceClass::SampledImage, index);
        Ok(registry.check_missing(handle).to_string())
    })?;

    Ok(commands)
}
