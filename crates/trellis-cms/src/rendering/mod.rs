//! Placeholder and plugin rendering
//!
//! ```text
//! render_placeholder
//!   ├── plugin selection (language, fallback languages)
//!   ├── render_plugins ── for each plugin, in its own context scope:
//!   │     ├── context processors: built-in, configured, call-site
//!   │     ├── plugin kind context + template
//!   │     └── content processors: configured, call-site, mark_safe
//!   └── edit mode: toolbar bar + draggables
//! ```

mod context;
mod placeholder;
mod plugin;
mod pool;
mod processors;
mod renderer;
mod safe;
mod templates;
mod toolbar;

pub use context::{RenderContext, build_plugin_context};
pub use plugin::{PluginKind, PluginTemplate};
pub use pool::{PluginPool, ToolbarPluginEntry};
pub use processors::{
	ContentProcessor, ContextProcessor, DEFAULT_PLUGIN_CONTEXT_PROCESSORS, ProcessorRegistry,
	RenderProcessors, mark_safe, plugin_meta_context_processor, toolbar_plugin_processor,
};
pub use renderer::Renderer;
pub use safe::SafeString;
pub use templates::{ParsedTemplate, TemplateEngine, title_case};
