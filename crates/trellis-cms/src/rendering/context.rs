//! Layered render context

use super::processors::{ContextProcessor, DEFAULT_PLUGIN_CONTEXT_PROCESSORS};
use crate::error::CmsResult;
use crate::models::{CmsPlugin, Placeholder};
use crate::request::RenderRequest;
use serde_json::{Map, Value};
use tracing::trace;

/// Request-scoped stack of variable layers
///
/// Lookups search the layers from the top down. [`push`](Self::push) and
/// [`pop`](Self::pop) open and close scopes; the base layer is never popped.
#[derive(Debug, Clone)]
pub struct RenderContext {
	request: RenderRequest,
	layers: Vec<Map<String, Value>>,
}

impl RenderContext {
	/// Context with an empty base layer
	pub fn new(request: RenderRequest) -> Self {
		Self {
			request,
			layers: vec![Map::new()],
		}
	}

	/// Context whose base layer holds `values`
	pub fn with_values(request: RenderRequest, values: Map<String, Value>) -> Self {
		Self {
			request,
			layers: vec![values],
		}
	}

	/// Request being rendered
	pub fn request(&self) -> &RenderRequest {
		&self.request
	}

	/// Innermost value of `key`
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.layers.iter().rev().find_map(|layer| layer.get(key))
	}

	/// Whether any layer defines `key`
	pub fn contains_key(&self, key: &str) -> bool {
		self.layers.iter().any(|layer| layer.contains_key(key))
	}

	/// Set `key` in the top layer
	pub fn insert(&mut self, key: impl Into<String>, value: Value) {
		if let Some(top) = self.layers.last_mut() {
			top.insert(key.into(), value);
		}
	}

	/// Push `values` as a new layer
	pub fn update(&mut self, values: Map<String, Value>) {
		self.layers.push(values);
	}

	/// Open an empty scope
	pub fn push(&mut self) {
		self.layers.push(Map::new());
	}

	/// Close the innermost scope
	pub fn pop(&mut self) -> Option<Map<String, Value>> {
		if self.layers.len() > 1 {
			self.layers.pop()
		} else {
			None
		}
	}

	/// Number of layers
	pub fn depth(&self) -> usize {
		self.layers.len()
	}

	/// Run `f` in a fresh scope, restoring the layer stack afterwards
	///
	/// Layers left open by `f` are dropped too, whether it succeeded or not.
	pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
		let depth = self.depth();
		self.push();
		let result = f(self);
		self.layers.truncate(depth);
		result
	}

	/// All layers merged, inner values winning
	pub fn flatten(&self) -> Map<String, Value> {
		let mut merged = Map::new();
		for layer in &self.layers {
			for (key, value) in layer {
				merged.insert(key.clone(), value.clone());
			}
		}
		merged
	}

	/// Tera context with every variable plus `request`
	pub fn to_tera(&self) -> CmsResult<tera::Context> {
		let mut values = self.flatten();
		values
			.entry("request")
			.or_insert_with(|| self.request.to_value());
		Ok(tera::Context::from_value(Value::Object(values))?)
	}
}

/// Populate the plugin scope of `context`
///
/// Runs the built-in processors, then `configured`, then `call_site`. Each
/// result is pushed as a new layer so later processors see and override
/// earlier keys. The first failing processor aborts the build.
pub fn build_plugin_context(
	context: &mut RenderContext,
	instance: &CmsPlugin,
	placeholder: Option<&Placeholder>,
	configured: &[ContextProcessor],
	call_site: &[ContextProcessor],
) -> CmsResult<()> {
	let processors = DEFAULT_PLUGIN_CONTEXT_PROCESSORS
		.iter()
		.chain(configured)
		.chain(call_site);
	for processor in processors {
		let values = processor(instance, placeholder, &*context)?;
		context.update(values);
	}
	trace!(plugin = %instance.id, depth = context.depth(), "built plugin context");
	Ok(())
}
