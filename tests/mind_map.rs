//! End-to-end behaviour of the engine through its public API.

#![allow(unused_crate_dependencies)]

use mind_map_graph::components::mind_map::{
	Error, LayoutMode, LayoutPhase, MindMapConfig, MindMapEvent, MindMapState, SimulationStatus,
};
use serde_json::{Value, json};

const WIDTH: f64 = 1200.0;
const HEIGHT: f64 = 800.0;

fn config(mode: LayoutMode) -> MindMapConfig {
	MindMapConfig {
		mode,
		..MindMapConfig::default()
	}
}

fn suite() -> Value {
	json!({
		"id": "root", "title": "Checkout",
		"children": [
			{"id": "a", "title": "Payments", "type": "category", "children": [
				{"id": "a1", "label": "Card accepted", "type": "test_case"},
				{"id": "a2", "label": "Card declined", "type": "test_case"}
			]},
			{"id": "b", "title": "Shipping", "type": "category"}
		]
	})
}

/// Drives frames 16ms apart until the layout settles or `max` frames pass.
fn settle(state: &mut MindMapState, max: usize) -> usize {
	let mut now = 0.0;
	for frame in 1..=max {
		now += 16.0;
		state.frame(now);
		if state.phase() == LayoutPhase::Idle {
			return frame;
		}
	}
	max
}

#[test]
fn horizontal_tree_places_siblings_symmetrically() {
	let raw = json!({
		"id": "root", "title": "R",
		"children": [{"id": "a", "title": "A"}, {"id": "b", "title": "B"}]
	});
	let mut state = MindMapState::new(&raw, config(LayoutMode::Horizontal), WIDTH, HEIGHT);
	settle(&mut state, 1);

	let levels: Vec<u32> = ["root", "a", "b"]
		.iter()
		.map(|id| state.graph.node(id).unwrap().level)
		.collect();
	assert_eq!(levels, vec![0, 1, 1]);

	let root = state.graph.node("root").unwrap().position;
	let a = state.graph.node("a").unwrap().position;
	let b = state.graph.node("b").unwrap().position;
	assert_ne!(a.y, b.y);
	assert!(((a.y + b.y) / 2.0 - root.y).abs() < 1e-9);
	assert!(a.x > root.x && (a.x - b.x).abs() < 1e-9);
}

#[test]
fn fitted_layout_stays_inside_the_margin() {
	for mode in [LayoutMode::Horizontal, LayoutMode::Vertical, LayoutMode::Radial] {
		let mut state = MindMapState::new(&suite(), config(mode), WIDTH, HEIGHT);
		settle(&mut state, 1);

		let bbox = state.graph.bounding_box().unwrap();
		let screen = state.viewport.project(bbox);
		let margin = state.config.margin_factor;
		assert!(screen.width <= WIDTH * margin * 1.01, "{mode:?}");
		assert!(screen.height <= HEIGHT * margin * 1.01, "{mode:?}");
		assert!(screen.x >= 0.0 && screen.right() <= WIDTH, "{mode:?}");
		assert!(screen.y >= 0.0 && screen.bottom() <= HEIGHT, "{mode:?}");
	}
}

#[test]
fn force_layout_ends_and_refits() {
	let mut state = MindMapState::new(&suite(), config(LayoutMode::Force), WIDTH, HEIGHT);
	let frames = settle(&mut state, 500);

	assert!(frames < 500);
	let sim = state.simulation().unwrap();
	assert_eq!(sim.status(), SimulationStatus::Ended);
	assert!(state.graph.nodes().all(|n| n.position.x.is_finite() && n.position.y.is_finite()));
	assert!(
		state
			.drain_events()
			.iter()
			.any(|e| matches!(e, MindMapEvent::ZoomChange(_)))
	);
}

#[test]
fn deleting_a_branch_cascades() {
	let mut state = MindMapState::new(&suite(), config(LayoutMode::Horizontal), WIDTH, HEIGHT);
	settle(&mut state, 1);
	state.drain_events();

	let removed = state.delete_node("a").unwrap();
	assert_eq!(removed.len(), 3);
	assert_eq!(removed[0], "a");
	assert_eq!(state.graph.len(), 2);
	assert_eq!(state.graph.links().len(), 1);
	assert!(state.graph.contains("root"));

	let events = state.drain_events();
	assert!(matches!(
		events.as_slice(),
		[MindMapEvent::StructureChange(g)] if g.len() == 2
	));
}

#[test]
fn root_cannot_be_deleted() {
	let mut state = MindMapState::new(&suite(), config(LayoutMode::Horizontal), WIDTH, HEIGHT);
	settle(&mut state, 1);
	state.drain_events();
	let before = state.graph.clone();

	let err = state.delete_node("root").unwrap_err();
	assert!(matches!(err, Error::RootDeletion { .. }));
	assert_eq!(state.graph, before);
	assert!(state.notice.is_some());
	assert!(state.drain_events().is_empty());
}

#[test]
fn added_child_is_linked_and_laid_out() {
	let mut state = MindMapState::new(&suite(), config(LayoutMode::Horizontal), WIDTH, HEIGHT);
	settle(&mut state, 1);
	let (nodes, links) = (state.graph.len(), state.graph.links().len());

	let id = state.add_child("b", None, None).unwrap();
	assert_eq!(state.graph.len(), nodes + 1);
	assert_eq!(state.graph.links().len(), links + 1);
	let link = state.graph.links().last().unwrap();
	assert_eq!((link.source.as_str(), link.target.as_str()), ("b", id.as_str()));
	assert_eq!(state.phase(), LayoutPhase::LayoutRequested);

	settle(&mut state, 1);
	let parent = state.graph.node("b").unwrap().position;
	let child = state.graph.node(&id).unwrap().position;
	assert!(child.x > parent.x);
}

#[test]
fn clicking_a_node_selects_it() {
	let mut state = MindMapState::new(&suite(), config(LayoutMode::Horizontal), WIDTH, HEIGHT);
	settle(&mut state, 1);
	state.drain_events();

	let at = state.viewport.to_screen(state.graph.node("a1").unwrap().position);
	state.pointer_down(at);
	state.pointer_up(at);

	assert_eq!(state.selected.as_deref(), Some("a1"));
	let events = state.drain_events();
	assert!(matches!(
		events.as_slice(),
		[MindMapEvent::NodeClick(node)] if node.id == "a1"
	));
}

#[test]
fn unrecognized_payload_renders_nothing() {
	let mut state = MindMapState::new(&json!("not a map"), MindMapConfig::default(), WIDTH, HEIGHT);
	settle(&mut state, 1);
	assert!(state.graph.is_empty());
	assert_eq!(state.viewport.scale, 1.0);
	assert!(state.viewport.scale.is_finite());
}
