//! Deterministic, non-physical tree placement.
//!
//! Horizontal and vertical modes place each level at a fixed distance along
//! the primary axis and centre every parent over its children on the cross
//! axis. Radial mode puts the root's children on a circle with equal
//! angular increments; deeper descendants go on concentric rings inside their
//! parent's angular sector.
//!
//! Output depends only on graph structure, mode and spacing, so re-running on
//! an unchanged tree reproduces identical coordinates.

use std::collections::HashSet;
use std::f64::consts::TAU;

use log::debug;

use super::graph::{Graph, Point};

/// Tree placement variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeMode {
	/// Root on the left, levels grow to the right.
	Horizontal,
	/// Root on top, levels grow downwards.
	Vertical,
	/// Root in the centre, levels on concentric rings.
	Radial,
}

/// Spacing used by [`layout_tree`].
#[derive(Clone, Debug, PartialEq)]
pub struct TreeLayoutConfig {
	/// Cross-axis distance between adjacent siblings.
	pub node_spacing: f64,
	/// Primary-axis distance between levels.
	pub level_spacing: f64,
	/// Radius of the first ring in radial mode.
	pub radial_radius: f64,
	/// Where the root is placed.
	pub anchor: Point,
}

impl Default for TreeLayoutConfig {
	fn default() -> Self {
		Self {
			node_spacing: 80.0,
			level_spacing: 180.0,
			radial_radius: 200.0,
			anchor: Point::default(),
		}
	}
}

/// Positions every node of `graph` in place.
///
/// The graph is expected to be a rooted tree. Nodes unreachable from the root
/// are laid out as further trees stacked after it, and a node reachable along
/// several paths is placed under the first parent that reaches it, so the call
/// always terminates and assigns every position exactly once.
pub fn layout_tree(graph: &mut Graph, mode: TreeMode, config: &TreeLayoutConfig) {
	let Some(root) = graph.root().map(str::to_string) else {
		return;
	};

	let mut visited: HashSet<String> = HashSet::new();
	let mut placed: Vec<(String, Point)> = Vec::with_capacity(graph.len());
	let mut stack_edge: Option<f64> = None;
	let mut trees = 0usize;

	let starts: Vec<String> = std::iter::once(root)
		.chain(
			graph
				.nodes()
				.filter(|n| n.parent.is_none())
				.map(|n| n.id.clone()),
		)
		.chain(graph.node_ids().map(str::to_string))
		.collect();

	for start in starts {
		if visited.contains(&start) {
			continue;
		}
		let local = match mode {
			TreeMode::Horizontal => linear(graph, &start, &mut visited, config, |depth, cross| {
				Point::new(depth, cross)
			}),
			TreeMode::Vertical => linear(graph, &start, &mut visited, config, |depth, cross| {
				Point::new(cross, depth)
			}),
			TreeMode::Radial => radial(graph, &start, &mut visited, config),
		};

		let offset = match stack_edge {
			None => config.anchor,
			Some(edge) => {
				let gap = 2.0 * config.node_spacing;
				match mode {
					TreeMode::Horizontal => Point::new(
						config.anchor.x,
						edge + gap - min_of(&local, |p| p.y),
					),
					TreeMode::Vertical | TreeMode::Radial => Point::new(
						edge + gap - min_of(&local, |p| p.x),
						config.anchor.y,
					),
				}
			}
		};
		for (id, p) in local {
			let p = Point::new(p.x + offset.x, p.y + offset.y);
			let edge = match mode {
				TreeMode::Horizontal => p.y,
				TreeMode::Vertical | TreeMode::Radial => p.x,
			};
			stack_edge = Some(stack_edge.map_or(edge, |e| e.max(edge)));
			placed.push((id, p));
		}
		trees += 1;
	}

	for (id, p) in placed {
		if let Some(node) = graph.node_mut(&id) {
			node.position = p;
		}
	}
	debug!(
		"mind-map: tree layout ({mode:?}) placed {} nodes in {trees} tree(s)",
		graph.len()
	);
}

fn min_of(points: &[(String, Point)], axis: impl Fn(&Point) -> f64) -> f64 {
	points
		.iter()
		.map(|(_, p)| axis(p))
		.fold(f64::INFINITY, f64::min)
}

/// Children of `id` not claimed by another parent yet, marked as claimed.
fn claim_children(graph: &Graph, id: &str, visited: &mut HashSet<String>) -> Vec<String> {
	let Some(node) = graph.node(id) else {
		return Vec::new();
	};
	node.children
		.iter()
		.filter(|c| visited.insert((*c).clone()))
		.cloned()
		.collect()
}

/// Horizontal/vertical placement relative to `start` at the origin. `orient`
/// maps `(primary, cross)` to a point.
///
/// Every leaf gets its own cross-axis slot and every parent sits midway
/// between its first and last child, so subtrees never overlap.
fn linear(
	graph: &Graph,
	start: &str,
	visited: &mut HashSet<String>,
	config: &TreeLayoutConfig,
	orient: impl Fn(f64, f64) -> Point,
) -> Vec<(String, Point)> {
	visited.insert(start.to_string());
	// Pre-order: (id, depth, indices of children in `order`).
	let mut order: Vec<(String, u32, Vec<usize>)> = Vec::new();
	let mut stack = vec![(start.to_string(), 0u32, None::<usize>)];
	while let Some((id, depth, parent)) = stack.pop() {
		let index = order.len();
		if let Some(parent) = parent {
			order[parent].2.push(index);
		}
		let children = claim_children(graph, &id, visited);
		for child in children.into_iter().rev() {
			stack.push((child, depth + 1, Some(index)));
		}
		order.push((id, depth, Vec::new()));
	}

	// Children always follow their parent in pre-order, so a reverse pass
	// sees every child before its parent.
	let mut cross = vec![0.0f64; order.len()];
	let mut next_slot = 0.0;
	for (i, (_, _, children)) in order.iter().enumerate() {
		if children.is_empty() {
			cross[i] = next_slot;
			next_slot += 1.0;
		}
	}
	for i in (0..order.len()).rev() {
		let children = &order[i].2;
		if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
			cross[i] = (cross[first] + cross[last]) / 2.0;
		}
	}

	let origin = cross[0];
	order
		.into_iter()
		.zip(cross)
		.map(|((id, depth, _), c)| {
			let p = orient(
				depth as f64 * config.level_spacing,
				(c - origin) * config.node_spacing,
			);
			(id, p)
		})
		.collect()
}

/// Radial placement relative to `start` at the origin.
fn radial(
	graph: &Graph,
	start: &str,
	visited: &mut HashSet<String>,
	config: &TreeLayoutConfig,
) -> Vec<(String, Point)> {
	visited.insert(start.to_string());
	let mut out = vec![(start.to_string(), Point::default())];

	let first = claim_children(graph, start, visited);
	let step = TAU / first.len().max(1) as f64;
	// (id, depth, angle, sector width)
	let mut stack: Vec<(String, u32, f64, f64)> = first
		.into_iter()
		.enumerate()
		.rev()
		.map(|(i, id)| (id, 1, i as f64 * step, step))
		.collect();

	while let Some((id, depth, angle, sector)) = stack.pop() {
		let r = depth as f64 * config.radial_radius;
		out.push((id.clone(), Point::new(r * angle.cos(), r * angle.sin())));
		let children = claim_children(graph, &id, visited);
		let slice = sector / children.len().max(1) as f64;
		let from = angle - sector / 2.0;
		for (j, child) in children.into_iter().enumerate().rev() {
			stack.push((child, depth + 1, from + (j as f64 + 0.5) * slice, slice));
		}
	}
	out
}
