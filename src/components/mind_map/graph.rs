//! Canonical in-memory graph: an id-indexed node arena plus a link list.
//!
//! Nodes are stored in an insertion-ordered map so iteration order is stable
//! across runs, and tree structure is kept as parent/children id lists rather
//! than nested values. Links refer to nodes by id only.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A 2D point in content coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}
}

/// An axis-aligned rectangle, `x`/`y` being the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn center(&self) -> Point {
		Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}
}

/// Closed set of node categories. Only affects size lookup and colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	Root,
	Category,
	Module,
	TestCase,
	Step,
	#[default]
	Default,
}

impl NodeKind {
	/// Lenient parse of the payload's `type` field; unknown names map to `Default`.
	pub fn parse(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
			"root" => NodeKind::Root,
			"category" => NodeKind::Category,
			"module" => NodeKind::Module,
			"test_case" | "testcase" => NodeKind::TestCase,
			"step" => NodeKind::Step,
			_ => NodeKind::Default,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Root => "root",
			NodeKind::Category => "category",
			NodeKind::Module => "module",
			NodeKind::TestCase => "test_case",
			NodeKind::Step => "step",
			NodeKind::Default => "default",
		}
	}

	/// Default node radius in content units.
	pub fn default_radius(self) -> f64 {
		match self {
			NodeKind::Root => 28.0,
			NodeKind::Category => 22.0,
			NodeKind::Module => 18.0,
			NodeKind::TestCase => 14.0,
			NodeKind::Step => 10.0,
			NodeKind::Default => 12.0,
		}
	}
}

/// A node in the mind map.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub id: String,
	pub label: String,
	pub kind: NodeKind,
	/// Depth from the root as assigned by the transformer.
	pub level: u32,
	/// Opaque data (description, priority, steps, tags), passed through untouched.
	pub payload: Option<Value>,
	/// Written by whichever layout ran last.
	pub position: Point,
	/// While set, the force layout holds the node here (drag).
	pub pinned: Option<Point>,
	pub parent: Option<String>,
	pub children: Vec<String>,
}

impl Node {
	pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			kind,
			level: 0,
			payload: None,
			position: Point::default(),
			pinned: None,
			parent: None,
			children: Vec::new(),
		}
	}

	pub fn with_level(mut self, level: u32) -> Self {
		self.level = level;
		self
	}

	pub fn with_payload(mut self, payload: Option<Value>) -> Self {
		self.payload = payload;
		self
	}

	pub fn radius(&self) -> f64 {
		self.kind.default_radius()
	}

	/// The `description` entry of an object payload, if any.
	pub fn description(&self) -> Option<&str> {
		self.payload
			.as_ref()
			.and_then(|p| p.get("description"))
			.and_then(Value::as_str)
	}
}

/// A directed edge, resolved by id lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub id: String,
	pub source: String,
	pub target: String,
	pub kind: Option<String>,
}

/// Nodes and links of one mind map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	nodes: IndexMap<String, Node>,
	links: Vec<Link>,
	root: Option<String>,
}

impl Graph {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
		self.nodes.get_mut(id)
	}

	pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
		self.nodes.values()
	}

	pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
		self.nodes.values_mut()
	}

	pub fn node_ids(&self) -> impl Iterator<Item = &str> {
		self.nodes.keys().map(String::as_str)
	}

	pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
		self.nodes.get_index_of(id)
	}

	pub(crate) fn node_at_index_mut(&mut self, index: usize) -> Option<&mut Node> {
		self.nodes.get_index_mut(index).map(|(_, node)| node)
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Inserts a node; returns `false` and leaves the graph untouched when the
	/// id is already taken.
	pub fn insert_node(&mut self, node: Node) -> bool {
		if self.nodes.contains_key(&node.id) {
			return false;
		}
		self.nodes.insert(node.id.clone(), node);
		true
	}

	/// Adds a link between two existing nodes. Links with an unknown endpoint
	/// are dropped and `false` is returned.
	pub fn add_link(
		&mut self,
		source: &str,
		target: &str,
		id: Option<String>,
		kind: Option<String>,
	) -> bool {
		if !self.contains(source) || !self.contains(target) {
			return false;
		}
		let id = id.unwrap_or_else(|| format!("{source}->{target}"));
		if let Some(node) = self.nodes.get_mut(source) {
			node.children.push(target.to_string());
		}
		if let Some(node) = self.nodes.get_mut(target) {
			if node.parent.is_none() {
				node.parent = Some(source.to_string());
			}
		}
		self.links.push(Link {
			id,
			source: source.to_string(),
			target: target.to_string(),
			kind,
		});
		true
	}

	pub fn set_root(&mut self, id: &str) {
		if self.contains(id) {
			self.root = Some(id.to_string());
		}
	}

	/// The root id: the explicitly set root, else the first `root`-kind node,
	/// else the first parentless node, else the first node.
	pub fn root(&self) -> Option<&str> {
		if let Some(root) = self.root.as_deref().filter(|id| self.contains(id)) {
			return Some(root);
		}
		self.nodes
			.values()
			.find(|n| n.kind == NodeKind::Root)
			.or_else(|| self.nodes.values().find(|n| n.parent.is_none()))
			.or_else(|| self.nodes.values().next())
			.map(|n| n.id.as_str())
	}

	/// Ids of every node reachable from `id` through child links, in
	/// breadth-first order, excluding `id` itself.
	pub fn descendants(&self, id: &str) -> Vec<String> {
		let mut seen: HashSet<&str> = HashSet::from([id]);
		let mut queue: VecDeque<&str> = VecDeque::from([id]);
		let mut out = Vec::new();
		while let Some(current) = queue.pop_front() {
			let Some(node) = self.nodes.get(current) else {
				continue;
			};
			for child in &node.children {
				if seen.insert(child.as_str()) {
					out.push(child.clone());
					queue.push_back(child.as_str());
				}
			}
		}
		out
	}

	/// Removes the given nodes and every link touching them, keeping the
	/// remaining parent/children lists consistent.
	pub(crate) fn remove_nodes(&mut self, ids: &HashSet<String>) {
		self.nodes.retain(|id, _| !ids.contains(id));
		self.links
			.retain(|l| !ids.contains(&l.source) && !ids.contains(&l.target));
		for node in self.nodes.values_mut() {
			node.children.retain(|c| !ids.contains(c));
			if node.parent.as_ref().is_some_and(|p| ids.contains(p)) {
				node.parent = None;
			}
		}
		if self.root.as_ref().is_some_and(|r| ids.contains(r)) {
			self.root = None;
		}
	}

	/// Smallest `"{prefix}-{n}"` id not yet in use, `n` counting from 1.
	pub fn fresh_id(&self, prefix: &str) -> String {
		let mut n = 1;
		loop {
			let candidate = format!("{prefix}-{n}");
			if !self.contains(&candidate) {
				return candidate;
			}
			n += 1;
		}
	}

	/// Bounding box of all nodes, each inflated by its radius.
	pub fn bounding_box(&self) -> Option<Rect> {
		let mut iter = self.nodes.values();
		let first = iter.next()?;
		let r = first.radius();
		let (mut min_x, mut min_y) = (first.position.x - r, first.position.y - r);
		let (mut max_x, mut max_y) = (first.position.x + r, first.position.y + r);
		for node in iter {
			let r = node.radius();
			min_x = min_x.min(node.position.x - r);
			min_y = min_y.min(node.position.y - r);
			max_x = max_x.max(node.position.x + r);
			max_y = max_y.max(node.position.y + r);
		}
		Some(Rect {
			x: min_x,
			y: min_y,
			width: max_x - min_x,
			height: max_y - min_y,
		})
	}

	/// Serializes back into the explicit `{nodes, edges}` payload shape,
	/// including current positions.
	pub fn to_payload(&self) -> Value {
		let nodes: Vec<Value> = self
			.nodes
			.values()
			.map(|n| {
				let mut obj = json!({
					"id": n.id,
					"label": n.label,
					"type": n.kind.as_str(),
					"level": n.level,
					"x": n.position.x,
					"y": n.position.y,
				});
				if let (Some(payload), Some(map)) = (&n.payload, obj.as_object_mut()) {
					map.insert("data".into(), payload.clone());
				}
				obj
			})
			.collect();
		let edges: Vec<Value> = self
			.links
			.iter()
			.map(|l| {
				let mut obj = json!({ "id": l.id, "source": l.source, "target": l.target });
				if let (Some(kind), Some(map)) = (&l.kind, obj.as_object_mut()) {
					map.insert("type".into(), Value::String(kind.clone()));
				}
				obj
			})
			.collect();
		json!({ "nodes": nodes, "edges": edges })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Graph {
		let mut g = Graph::new();
		g.insert_node(Node::new("root", "Root", NodeKind::Root));
		g.insert_node(Node::new("a", "A", NodeKind::Category).with_level(1));
		g.insert_node(Node::new("b", "B", NodeKind::Category).with_level(1));
		g.insert_node(Node::new("a1", "A1", NodeKind::TestCase).with_level(2));
		g.add_link("root", "a", None, None);
		g.add_link("root", "b", None, None);
		g.add_link("a", "a1", None, None);
		g
	}

	#[test]
	fn links_maintain_parent_and_children() {
		let g = sample();
		assert_eq!(g.node("root").unwrap().children, vec!["a", "b"]);
		assert_eq!(g.node("a1").unwrap().parent.as_deref(), Some("a"));
		assert_eq!(g.links()[0].id, "root->a");
	}

	#[test]
	fn dangling_links_are_refused() {
		let mut g = sample();
		assert!(!g.add_link("a", "ghost", None, None));
		assert!(!g.add_link("ghost", "a", None, None));
		assert_eq!(g.links().len(), 3);
	}

	#[test]
	fn duplicate_ids_are_refused() {
		let mut g = sample();
		assert!(!g.insert_node(Node::new("a", "Other", NodeKind::Step)));
		assert_eq!(g.node("a").unwrap().label, "A");
	}

	#[test]
	fn root_falls_back_to_first_parentless_node() {
		let mut g = Graph::new();
		g.insert_node(Node::new("x", "X", NodeKind::Module));
		g.insert_node(Node::new("y", "Y", NodeKind::Module));
		g.add_link("y", "x", None, None);
		assert_eq!(g.root(), Some("y"));
		assert_eq!(sample().root(), Some("root"));
	}

	#[test]
	fn descendants_terminate_on_cycles() {
		let mut g = sample();
		g.add_link("a1", "root", None, None);
		let mut d = g.descendants("a");
		d.sort();
		assert_eq!(d, vec!["a1", "b", "root"]);
	}

	#[test]
	fn fresh_id_skips_taken_ids() {
		let mut g = sample();
		assert_eq!(g.fresh_id("node"), "node-1");
		g.insert_node(Node::new("node-1", "taken", NodeKind::Default));
		g.insert_node(Node::new("node-2", "taken", NodeKind::Default));
		g.insert_node(Node::new("node-4", "taken", NodeKind::Default));
		assert_eq!(g.fresh_id("node"), "node-3");
	}

	#[test]
	fn bounding_box_includes_node_radius() {
		let mut g = Graph::new();
		g.insert_node(Node::new("a", "A", NodeKind::Default));
		let mut b = Node::new("b", "B", NodeKind::Default);
		b.position = Point::new(100.0, 50.0);
		g.insert_node(b);
		let bbox = g.bounding_box().unwrap();
		assert_eq!(bbox.x, -12.0);
		assert_eq!(bbox.y, -12.0);
		assert_eq!(bbox.width, 124.0);
		assert_eq!(bbox.height, 74.0);
		assert!(Graph::new().bounding_box().is_none());
	}

	#[test]
	fn kind_parse_is_lenient() {
		assert_eq!(NodeKind::parse("test-case"), NodeKind::TestCase);
		assert_eq!(NodeKind::parse(" Module "), NodeKind::Module);
		assert_eq!(NodeKind::parse("whatever"), NodeKind::Default);
	}
}
