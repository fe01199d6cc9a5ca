use flowlog_core::Flow;

/// Factory for configured hook instances.
///
/// Plugins are registered once at startup and configured from JSON, the same
/// way a host proxy would bind an addon to its settings.
pub trait Plugin: Send + Sync {
    /// Plugin name (must be unique).
    fn name(&self) -> &str;

    /// Create a configured instance from JSON config.
    fn configure(&self, config: &serde_json::Value) -> anyhow::Result<Box<dyn PluginInstance>>;
}

/// A configured hook the host calls into.
///
/// Hosts may dispatch from several worker threads at once, hence
/// `Send + Sync`; instances guard their own shared state.
pub trait PluginInstance: Send + Sync {
    /// Plugin name.
    fn name(&self) -> &str;

    /// Priority (higher = runs first).
    fn priority(&self) -> i32 { 0 }

    /// Called once per exchange whose response has completed.
    ///
    /// Errors are the host's to surface; they never stop other hooks.
    fn response(&self, flow: &Flow) -> anyhow::Result<()>;

    /// Called once when the host shuts down.
    fn done(&self) -> anyhow::Result<()> { Ok(()) }
}
