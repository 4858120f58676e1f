//! Normalizes heterogeneous payloads into a [`Graph`].
//!
//! Shapes are tried in order: explicit `{nodes, edges}`, then a rooted
//! `{children: [...]}` tree. Anything else yields an empty graph. The input is
//! never mutated and this module never fails; problems are logged and skipped.

use log::{debug, warn};
use serde_json::Value;

use super::graph::{Graph, Node, NodeKind};
use super::types::{RawEdge, RawGraph, RawNode, RawTreeNode};

/// Label used when a node carries neither `label` nor `title`.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Builds a graph from any recognized payload shape.
pub fn transform(raw: &Value) -> Graph {
	let graph = if is_explicit(raw) {
		from_explicit(raw)
	} else if is_tree(raw) {
		from_tree(raw)
	} else {
		warn!("mind-map: unrecognized payload shape, using an empty graph");
		Graph::new()
	};
	debug!(
		"mind-map: transformed payload into {} nodes, {} links",
		graph.len(),
		graph.links().len()
	);
	graph
}

/// Parses JSON text and transforms it; invalid JSON yields an empty graph.
pub fn transform_str(json: &str) -> Graph {
	match serde_json::from_str::<Value>(json) {
		Ok(raw) => transform(&raw),
		Err(e) => {
			warn!("mind-map: failed to parse payload: {}", e);
			Graph::new()
		}
	}
}

fn is_explicit(raw: &Value) -> bool {
	raw.get("nodes").is_some_and(Value::is_array)
}

fn is_tree(raw: &Value) -> bool {
	raw.is_object() && raw.get("children").is_some_and(Value::is_array)
}

fn from_explicit(raw: &Value) -> Graph {
	let mut graph = Graph::new();
	let Ok(shape) = serde_json::from_value::<RawGraph>(raw.clone()) else {
		warn!("mind-map: malformed node/edge payload, using an empty graph");
		return graph;
	};

	for (i, value) in shape.nodes.iter().enumerate() {
		let raw_node = match serde_json::from_value::<RawNode>(value.clone()) {
			Ok(n) => n,
			Err(e) => {
				warn!("mind-map: skipping node #{i}: {e}");
				continue;
			}
		};
		let label = raw_node
			.label
			.or(raw_node.title)
			.unwrap_or_else(|| UNKNOWN_LABEL.to_string());
		let kind = raw_node
			.kind
			.as_deref()
			.map(NodeKind::parse)
			.unwrap_or_default();
		let node = Node::new(raw_node.id.to_string(), label, kind)
			.with_level(raw_node.level.unwrap_or(0))
			.with_payload(raw_node.data);
		let id = node.id.clone();
		if !graph.insert_node(node) {
			warn!("mind-map: duplicate node id `{id}`, keeping the first");
		}
	}

	for (i, value) in shape.edges.iter().enumerate() {
		let edge = match serde_json::from_value::<RawEdge>(value.clone()) {
			Ok(e) => e,
			Err(e) => {
				warn!("mind-map: skipping edge #{i}: {e}");
				continue;
			}
		};
		let (source, target) = (edge.source.to_string(), edge.target.to_string());
		if !graph.add_link(
			&source,
			&target,
			edge.id.map(|id| id.to_string()),
			edge.kind,
		) {
			warn!("mind-map: dropping edge {source} -> {target} with unknown endpoint");
		}
	}
	graph
}

fn from_tree(raw: &Value) -> Graph {
	let mut graph = Graph::new();
	if let Some(root) = walk(&mut graph, raw, None, "root", 0) {
		graph.set_root(&root);
	}
	graph
}

/// Depth-first insertion of `value` and its subtree. Returns the id the node
/// was inserted under, or `None` when it was skipped.
fn walk(
	graph: &mut Graph,
	value: &Value,
	parent: Option<&str>,
	fallback_id: &str,
	level: u32,
) -> Option<String> {
	let raw = match serde_json::from_value::<RawTreeNode>(value.clone()) {
		Ok(raw) => raw,
		Err(e) => {
			warn!("mind-map: skipping tree node `{fallback_id}`: {e}");
			return None;
		}
	};
	let id = raw
		.id
		.as_ref()
		.map(ToString::to_string)
		.unwrap_or_else(|| fallback_id.to_string());
	let label = raw
		.label
		.clone()
		.or_else(|| raw.title.clone())
		.unwrap_or_else(|| UNKNOWN_LABEL.to_string());
	let kind = match raw.kind.as_deref() {
		Some(kind) => NodeKind::parse(kind),
		None if parent.is_none() => NodeKind::Root,
		None => NodeKind::Default,
	};
	let node = Node::new(id.clone(), label, kind)
		.with_level(level)
		.with_payload(raw.payload());
	if !graph.insert_node(node) {
		warn!("mind-map: duplicate node id `{id}`, dropping its subtree");
		return None;
	}
	if let Some(parent) = parent {
		graph.add_link(parent, &id, None, None);
	}
	for (i, child) in raw.children.iter().enumerate() {
		walk(graph, child, Some(&id), &format!("{id}.{i}"), level + 1);
	}
	Some(id)
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn summary(g: &Graph) -> Vec<(String, String, NodeKind, u32)> {
		g.nodes()
			.map(|n| (n.id.clone(), n.label.clone(), n.kind, n.level))
			.collect()
	}

	#[test]
	fn tree_payload_assigns_levels_and_links() {
		let raw = json!({
			"id": "root", "title": "R",
			"children": [
				{"id": "a", "title": "A", "type": "category", "children": [
					{"id": "a1", "label": "Login works", "type": "test_case"}
				]},
				{"id": "b", "title": "B"}
			]
		});
		let g = transform(&raw);
		assert_eq!(
			summary(&g),
			vec![
				("root".into(), "R".into(), NodeKind::Root, 0),
				("a".into(), "A".into(), NodeKind::Category, 1),
				("a1".into(), "Login works".into(), NodeKind::TestCase, 2),
				("b".into(), "B".into(), NodeKind::Default, 1),
			]
		);
		let edges: Vec<_> = g
			.links()
			.iter()
			.map(|l| (l.source.as_str(), l.target.as_str()))
			.collect();
		assert_eq!(edges, vec![("root", "a"), ("a", "a1"), ("root", "b")]);
		assert_eq!(g.root(), Some("root"));
	}

	#[test]
	fn explicit_payload_applies_defaults() {
		let raw = json!({
			"nodes": [
				{"id": "1", "label": "One", "type": "module", "level": 2},
				{"id": 2, "title": "Two"},
				{"id": "3"}
			],
			"edges": [{"source": "1", "target": 2}, {"source": "2", "target": "3", "id": "e"}]
		});
		let g = transform(&raw);
		assert_eq!(
			summary(&g),
			vec![
				("1".into(), "One".into(), NodeKind::Module, 2),
				("2".into(), "Two".into(), NodeKind::Default, 0),
				("3".into(), UNKNOWN_LABEL.into(), NodeKind::Default, 0),
			]
		);
		assert_eq!(g.links().len(), 2);
		assert_eq!(g.links()[1].id, "e");
	}

	#[test]
	fn dangling_edges_and_bad_nodes_are_dropped() {
		let raw = json!({
			"nodes": [{"id": "a"}, {"label": "no id"}, {"id": "a", "label": "dup"}, {"id": "b"}],
			"links": [
				{"source": "a", "target": "b"},
				{"source": "a", "target": "ghost"},
				{"oops": 1}
			]
		});
		let g = transform(&raw);
		assert_eq!(g.node_ids().collect::<Vec<_>>(), vec!["a", "b"]);
		assert_eq!(g.node("a").unwrap().label, UNKNOWN_LABEL);
		assert_eq!(g.links().len(), 1);
	}

	#[test]
	fn null_edge_list_keeps_nodes() {
		let g = transform(&json!({"nodes": [{"id": "a"}, {"id": "b"}], "edges": null}));
		assert_eq!(g.node_ids().collect::<Vec<_>>(), vec!["a", "b"]);
		assert!(g.links().is_empty());
	}

	#[test]
	fn oddly_typed_optional_fields_fall_back() {
		let g = transform(&json!({
			"nodes": [
				{"id": "a", "level": 1.0, "type": null},
				{"id": "b", "title": 42, "label": null, "level": "deep"},
				{"id": "c", "label": ["x"], "level": -2}
			],
			"edges": [
				{"source": "a", "target": "b", "id": {"weird": true}, "type": 7},
				{"source": "a", "target": "c"}
			]
		}));
		assert_eq!(
			summary(&g),
			vec![
				("a".into(), UNKNOWN_LABEL.into(), NodeKind::Default, 1),
				("b".into(), "42".into(), NodeKind::Default, 0),
				("c".into(), UNKNOWN_LABEL.into(), NodeKind::Default, 0),
			]
		);
		assert_eq!(g.links().len(), 2);
		assert_eq!(g.links()[0].id, "a->b");
		assert_eq!(g.links()[0].kind.as_deref(), Some("7"));
	}

	#[test]
	fn null_children_keep_the_tree_node() {
		let g = transform(&json!({
			"id": "root", "title": "R",
			"children": [
				{"id": "a", "title": "A", "children": null},
				{"id": null, "title": "Anonymous"},
				{"id": "b", "title": "B"}
			]
		}));
		assert_eq!(g.node_ids().collect::<Vec<_>>(), vec!["root", "a", "root.1", "b"]);
		assert_eq!(g.node("root").unwrap().children, vec!["a", "root.1", "b"]);
	}

	#[test]
	fn unrecognized_shapes_yield_empty_graph() {
		for raw in [json!(null), json!(42), json!("tree"), json!({"id": "x"}), json!([1, 2])] {
			let g = transform(&raw);
			assert!(g.is_empty());
			assert!(g.links().is_empty());
		}
		assert!(transform_str("{not json").is_empty());
	}

	#[test]
	fn transform_is_repeatable_and_leaves_input_alone() {
		let raw = json!({
			"id": "root", "title": "R",
			"children": [{"title": "no id"}, {"id": "b", "title": "B", "children": []}]
		});
		let before = raw.clone();
		let first = transform(&raw);
		let second = transform(&raw);
		assert_eq!(summary(&first), summary(&second));
		assert_eq!(raw, before);
		assert!(first.contains("root.0"));
	}

	#[test]
	fn tree_payload_keeps_extra_fields() {
		let raw = json!({
			"id": "root", "title": "R",
			"children": [
				{"id": "t", "title": "T", "description": "checks login", "priority": "high"},
				{"id": "d", "title": "D", "data": {"steps": 3}}
			]
		});
		let g = transform(&raw);
		assert_eq!(g.node("t").unwrap().description(), Some("checks login"));
		assert_eq!(g.node("t").unwrap().payload.as_ref().unwrap()["priority"], "high");
		assert_eq!(g.node("d").unwrap().payload, Some(json!({"steps": 3})));
		assert_eq!(g.node("root").unwrap().payload, None);
	}

	#[test]
	fn duplicate_tree_ids_drop_the_subtree() {
		let raw = json!({
			"id": "root",
			"children": [
				{"id": "a", "children": [{"id": "x"}]},
				{"id": "a", "children": [{"id": "y"}]}
			]
		});
		let g = transform(&raw);
		assert_eq!(g.node_ids().collect::<Vec<_>>(), vec!["root", "a", "x"]);
	}

	#[test]
	fn payload_round_trips_through_transform() {
		let raw = json!({
			"id": "root", "title": "R",
			"children": [{"id": "a", "title": "A", "type": "module", "data": {"tags": ["smoke"]}}]
		});
		let g = transform(&raw);
		let again = transform(&g.to_payload());
		assert_eq!(summary(&g), summary(&again));
		assert_eq!(again.node("a").unwrap().payload, Some(json!({"tags": ["smoke"]})));
		assert_eq!(again.links().len(), 1);
	}
}
