//! mind-map-graph: interactive mind-map layout and viewport engine.
//!
//! This crate provides a WASM-based mind-map component that turns test-case
//! trees and node/edge graphs into tree, radial or force-directed diagrams with
//! zoom, pan, drag and structural editing.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde_json::Value;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::mind_map::{
	Graph, LayoutMode, MindMapCanvas, MindMapConfig, MindMapEvent, MindMapState, Node, NodeKind,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("mind-map: logging initialized");
}

/// Text content of a `<script>` element, typically `type="application/json"`.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the mind-map payload from a script element with id="mind-map-data".
/// Either `{ nodes: [...], edges: [...] }` or a nested `{ children: [...] }` tree.
fn load_payload() -> Option<Value> {
	let json_text = script_text("mind-map-data")?;
	match serde_json::from_str::<Value>(&json_text) {
		Ok(data) => {
			info!("mind-map: loaded payload ({} bytes)", json_text.len());
			Some(data)
		}
		Err(e) => {
			warn!("mind-map: failed to parse payload: {}", e);
			None
		}
	}
}

/// Load options from a script element with id="mind-map-config".
fn load_config() -> MindMapConfig {
	let Some(json_text) = script_text("mind-map-config") else {
		return MindMapConfig::default();
	};
	MindMapConfig::from_json(&json_text).unwrap_or_else(|e| {
		warn!("mind-map: ignoring config: {}", e);
		MindMapConfig::default()
	})
}

/// Main application component.
/// Loads the payload and options from the DOM and renders the mind map.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let payload = load_payload().unwrap_or(Value::Null);
	let data = RwSignal::new(payload);
	let config = load_config();

	let on_structure_change = Callback::new(move |graph: Graph| {
		info!("mind-map: structure changed, {} nodes", graph.len());
	});
	let on_node_edit = Callback::new(move |node: Node| {
		info!("mind-map: edit requested for {}", node.id);
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Mind Map" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-mind-map">
			<MindMapCanvas
				data=data
				config=config
				fullscreen=true
				on_structure_change=on_structure_change
				on_node_edit=on_node_edit
			/>
			<div class="mind-map-overlay">
				<p class="subtitle">
					"Drag nodes to move them. Scroll to zoom. Double-click to edit."
				</p>
			</div>
		</div>
	}
}
