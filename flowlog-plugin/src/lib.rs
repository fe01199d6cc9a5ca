pub mod pipeline;
pub mod plugin;
pub mod registry;

pub use pipeline::{DispatchOutcome, PluginPipeline};
pub use plugin::{Plugin, PluginInstance};
pub use registry::PluginRegistry;
