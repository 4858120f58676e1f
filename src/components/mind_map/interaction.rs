//! Structural edits, drag pinning and the events they produce.
//!
//! Commands operate on a [`Graph`] directly and report what changed; the
//! engine in `state` decides which layout or redraw each change needs.

use std::collections::HashSet;

use log::{info, warn};
use serde_json::{Map, Value};

use super::error::{Error, Result};
use super::graph::{Graph, Node, NodeKind, Point};

/// Label given to nodes created without one.
pub const DEFAULT_CHILD_LABEL: &str = "New node";

/// Notifications for the UI and persistence collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum MindMapEvent {
	/// A node was clicked; carries the full node.
	NodeClick(Node),
	/// The user asked to edit a node (double click).
	NodeEdit(Node),
	/// A node was added or removed; carries the mutated graph.
	StructureChange(Graph),
	/// The viewport scale changed.
	ZoomChange(f64),
}

/// In-place changes applied by [`edit_node`]. `None` fields are left alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeEdit {
	pub label: Option<String>,
	pub description: Option<String>,
}

/// Appends a child under `parent_id` and links it. Returns the new id.
pub fn add_child(
	graph: &mut Graph,
	parent_id: &str,
	label: Option<&str>,
	kind: Option<NodeKind>,
) -> Result<String> {
	let Some(parent) = graph.node(parent_id) else {
		return Err(Error::UnknownNode {
			id: parent_id.to_string(),
		});
	};
	// Start next to the parent, fanned out by sibling count, so a running
	// simulation does not begin with coincident nodes.
	let angle = parent.children.len() as f64 * 0.9;
	let offset = parent.radius() * 3.0;
	let position = Point::new(
		parent.position.x + offset * angle.cos(),
		parent.position.y + offset * angle.sin(),
	);
	let level = parent.level + 1;

	let id = graph.fresh_id("node");
	let mut child = Node::new(
		id.clone(),
		label.unwrap_or(DEFAULT_CHILD_LABEL),
		kind.unwrap_or(NodeKind::TestCase),
	)
	.with_level(level);
	child.position = position;
	graph.insert_node(child);
	graph.add_link(parent_id, &id, None, None);
	info!("mind-map: added `{id}` under `{parent_id}`");
	Ok(id)
}

/// Removes `id`, all of its descendants and every incident link. Returns the
/// removed ids, the target first. The root cannot be deleted.
pub fn delete_node(graph: &mut Graph, id: &str) -> Result<Vec<String>> {
	if !graph.contains(id) {
		return Err(Error::UnknownNode { id: id.to_string() });
	}
	if graph.root() == Some(id) {
		warn!("mind-map: refusing to delete root node `{id}`");
		return Err(Error::RootDeletion { id: id.to_string() });
	}
	let mut removed = vec![id.to_string()];
	// On cyclic input the root may be reachable from `id`; it stays.
	let root = graph.root().map(str::to_string);
	removed.extend(
		graph
			.descendants(id)
			.into_iter()
			.filter(|d| Some(d) != root.as_ref()),
	);
	let set: HashSet<String> = removed.iter().cloned().collect();
	graph.remove_nodes(&set);
	info!("mind-map: deleted `{id}` and {} descendant(s)", removed.len() - 1);
	Ok(removed)
}

/// Updates label and/or description in place. Never touches ids or positions.
pub fn edit_node(graph: &mut Graph, id: &str, edit: &NodeEdit) -> Result<()> {
	let Some(node) = graph.node_mut(id) else {
		return Err(Error::UnknownNode { id: id.to_string() });
	};
	if let Some(label) = &edit.label {
		node.label = label.clone();
	}
	if let Some(description) = &edit.description {
		let payload = node
			.payload
			.get_or_insert_with(|| Value::Object(Map::new()));
		match payload {
			Value::Object(map) => {
				map.insert("description".into(), Value::String(description.clone()));
			}
			other => {
				warn!("mind-map: `{id}` has a non-object payload, wrapping it for a description");
				let mut map = Map::new();
				map.insert("value".into(), other.take());
				map.insert("description".into(), Value::String(description.clone()));
				*other = Value::Object(map);
			}
		}
	}
	Ok(())
}

/// Tracks an in-progress node drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<String>,
	/// Screen point where the press happened.
	pub start: Point,
	/// Set once the pointer travelled past the click threshold.
	pub moved: bool,
}

/// Screen pixels a press may wander before it stops counting as a click.
pub const CLICK_SLOP: f64 = 3.0;

impl DragState {
	pub fn is_active(&self) -> bool {
		self.node.is_some()
	}

	/// Pins the node where it currently is.
	pub fn start(&mut self, graph: &mut Graph, id: &str, screen: Point) -> Result<()> {
		let Some(node) = graph.node_mut(id) else {
			return Err(Error::UnknownNode { id: id.to_string() });
		};
		node.pinned = Some(node.position);
		self.node = Some(id.to_string());
		self.start = screen;
		self.moved = false;
		Ok(())
	}

	/// Moves the pin to `content`. Returns `false` when no drag is active.
	pub fn drag_to(&mut self, graph: &mut Graph, screen: Point, content: Point) -> bool {
		let Some(node) = self.node.as_deref().and_then(|id| graph.node_mut(id)) else {
			return false;
		};
		if !self.moved && screen.distance(self.start) <= CLICK_SLOP {
			return true;
		}
		self.moved = true;
		node.pinned = Some(content);
		true
	}

	/// Clears the pin and returns the dragged id and whether it moved.
	pub fn end(&mut self, graph: &mut Graph) -> Option<(String, bool)> {
		let id = self.node.take()?;
		if let Some(node) = graph.node_mut(&id) {
			node.pinned = None;
		}
		Some((id, std::mem::take(&mut self.moved)))
	}
}

/// Tracks an in-progress background pan.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	/// Screen point where the pan began.
	pub start: Point,
	/// Screen point of the previous pointer move.
	pub last: Point,
}
