//! Force-directed layout simulation.
//!
//! Each tick cools the temperature `alpha` towards its target, accumulates
//! link attraction, many-body repulsion and collision avoidance into node
//! velocities, recentres the layout on the bounds centre, then integrates
//! velocities into positions. Once alpha drops below `alpha_min` the
//! simulation reports [`TickEvent::End`] once and goes idle.
//!
//! The simulation never schedules itself. The host calls [`Simulation::tick`]
//! once per frame (or iterates [`Simulation::ticks`] in tests), which keeps it
//! independent of any timer.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, warn};

use super::graph::{Graph, Point};

/// Physical parameters of the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
	/// Rest length of links.
	pub link_distance: f64,
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Per-node collision radius.
	pub collision_radius: f64,
	/// Distance below which repulsion stops growing.
	pub distance_min: f64,
	/// Fraction of the centroid offset removed each tick.
	pub center_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick (friction).
	pub velocity_decay: f64,
	/// Alpha target while the simulation is reheated by a drag.
	pub reheat_alpha: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			link_distance: 110.0,
			charge_strength: -350.0,
			collision_radius: 55.0,
			distance_min: 1.0,
			center_strength: 1.0,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			reheat_alpha: 0.3,
		}
	}
}

/// Size of the area the layout is centred in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub width: f64,
	pub height: f64,
}

impl Bounds {
	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Outcome of a single [`Simulation::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickEvent {
	/// Positions moved; the simulation is still warm.
	Tick { alpha: f64 },
	/// Alpha crossed `alpha_min`. Emitted once per cooling.
	End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationStatus {
	Running,
	Ended,
	Stopped,
}

#[derive(Clone, Copy, Debug)]
struct LinkTerm {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

/// Handle to a running force layout over one [`Graph`].
#[derive(Clone, Debug)]
pub struct Simulation {
	config: ForceConfig,
	center: Point,
	alpha: f64,
	alpha_target: f64,
	status: SimulationStatus,
	ids: Vec<String>,
	link_count: usize,
	links: Vec<LinkTerm>,
	velocities: Vec<Point>,
	seed: u64,
	ticks: usize,
}

/// Seeds positions on a phyllotaxis spiral and returns a running simulation.
pub fn layout_force(graph: &mut Graph, bounds: Bounds, config: ForceConfig) -> Simulation {
	let sim = Simulation::new(graph, bounds, config);
	sim.seed_positions(graph);
	debug!("mind-map: force layout started for {} nodes", graph.len());
	sim
}

impl Simulation {
	/// Creates a running simulation that starts from the graph's current positions.
	pub fn new(graph: &Graph, bounds: Bounds, config: ForceConfig) -> Self {
		let mut sim = Self {
			config,
			center: bounds.center(),
			alpha: 1.0,
			alpha_target: 0.0,
			status: SimulationStatus::Running,
			ids: Vec::new(),
			link_count: 0,
			links: Vec::new(),
			velocities: Vec::new(),
			seed: 1,
			ticks: 0,
		};
		sim.rebuild(graph);
		sim
	}

	/// Places nodes on a sunflower spiral around the centre so no two start
	/// on top of each other.
	pub fn seed_positions(&self, graph: &mut Graph) {
		let golden = PI * (3.0 - 5.0_f64.sqrt());
		for (i, node) in graph.nodes_mut().enumerate() {
			let radius = 10.0 * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden;
			node.position = Point::new(
				self.center.x + radius * angle.cos(),
				self.center.y + radius * angle.sin(),
			);
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn status(&self) -> SimulationStatus {
		self.status
	}

	pub fn is_running(&self) -> bool {
		self.status == SimulationStatus::Running
	}

	/// Ticks performed since creation.
	pub fn tick_count(&self) -> usize {
		self.ticks
	}

	/// Keeps the simulation warm (drag start) and wakes it if it had ended.
	pub fn reheat(&mut self) {
		self.alpha_target = self.config.reheat_alpha;
		if self.status != SimulationStatus::Stopped {
			self.status = SimulationStatus::Running;
		}
	}

	/// Lets the simulation cool down to its end (drag release).
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Resumes with a fresh temperature, keeping current positions.
	pub fn restart(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.status = SimulationStatus::Running;
	}

	/// Cancels the simulation; further ticks do nothing.
	pub fn stop(&mut self) {
		self.status = SimulationStatus::Stopped;
	}

	/// Moves the centring target, e.g. after the container is resized.
	pub fn set_bounds(&mut self, bounds: Bounds) {
		self.center = bounds.center();
	}

	/// Advances one step. Returns `None` once ended or stopped.
	pub fn tick(&mut self, graph: &mut Graph) -> Option<TickEvent> {
		if self.status != SimulationStatus::Running {
			return None;
		}
		if self.is_stale(graph) {
			self.rebuild(graph);
		}
		self.ticks += 1;
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		let mut pos: Vec<Point> = graph.nodes().map(|n| n.position).collect();
		let pins: Vec<Option<Point>> = graph.nodes().map(|n| n.pinned).collect();

		self.apply_links(&pos);
		self.apply_charge(&pos);
		self.apply_collision(&pos);
		self.apply_center(&mut pos);

		let friction = 1.0 - self.config.velocity_decay;
		for (i, p) in pos.iter_mut().enumerate() {
			let v = &mut self.velocities[i];
			if let Some(pin) = pins[i] {
				*p = pin;
				*v = Point::default();
				continue;
			}
			v.x *= friction;
			v.y *= friction;
			p.x += v.x;
			p.y += v.y;
			if !(p.x.is_finite() && p.y.is_finite()) {
				warn!("mind-map: node #{i} left the finite plane, reseating at centre");
				*p = self.center;
				*v = Point::default();
			}
		}
		for (i, p) in pos.into_iter().enumerate() {
			if let Some(node) = graph.node_at_index_mut(i) {
				node.position = p;
			}
		}

		if self.alpha < self.config.alpha_min {
			self.status = SimulationStatus::Ended;
			debug!("mind-map: force layout converged after {} ticks", self.ticks);
			return Some(TickEvent::End);
		}
		Some(TickEvent::Tick { alpha: self.alpha })
	}

	/// Iterator yielding alpha for each tick until the simulation ends.
	pub fn ticks<'a>(&'a mut self, graph: &'a mut Graph) -> Ticks<'a> {
		Ticks { sim: self, graph }
	}

	/// Ticks until the end signal or `max_ticks`, returning how many ran.
	pub fn run(&mut self, graph: &mut Graph, max_ticks: usize) -> usize {
		let mut n = 0;
		while n < max_ticks {
			match self.tick(graph) {
				Some(TickEvent::Tick { .. }) => n += 1,
				Some(TickEvent::End) => return n + 1,
				None => break,
			}
		}
		n
	}

	fn is_stale(&self, graph: &Graph) -> bool {
		self.ids.len() != graph.len()
			|| self.link_count != graph.links().len()
			|| !self.ids.iter().map(String::as_str).eq(graph.node_ids())
	}

	/// Re-resolves links to indices and carries velocities over by id.
	fn rebuild(&mut self, graph: &Graph) {
		let previous: HashMap<String, Point> = self
			.ids
			.drain(..)
			.zip(self.velocities.drain(..))
			.collect();
		self.ids = graph.node_ids().map(str::to_string).collect();
		self.velocities = self
			.ids
			.iter()
			.map(|id| previous.get(id).copied().unwrap_or_default())
			.collect();

		let mut degree = vec![0usize; self.ids.len()];
		let resolved: Vec<(usize, usize)> = graph
			.links()
			.iter()
			.filter_map(|l| Some((graph.index_of(&l.source)?, graph.index_of(&l.target)?)))
			.filter(|(s, t)| s != t)
			.collect();
		for &(s, t) in &resolved {
			degree[s] += 1;
			degree[t] += 1;
		}
		self.links = resolved
			.into_iter()
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				LinkTerm {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();
		self.link_count = graph.links().len();
	}

	/// Tiny deterministic offset used to separate coincident nodes.
	fn jiggle(&mut self) -> f64 {
		self.seed = (self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223)) % (1 << 32);
		(self.seed as f64 / (1u64 << 32) as f64 - 0.5) * 1e-6
	}

	fn apply_links(&mut self, pos: &[Point]) {
		let distance = self.config.link_distance;
		for k in 0..self.links.len() {
			let LinkTerm {
				source,
				target,
				strength,
				bias,
			} = self.links[k];
			let (vs, vt) = (self.velocities[source], self.velocities[target]);
			let mut x = pos[target].x + vt.x - pos[source].x - vs.x;
			let mut y = pos[target].y + vt.y - pos[source].y - vs.y;
			if x == 0.0 {
				x = self.jiggle();
			}
			if y == 0.0 {
				y = self.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let f = (l - distance) / l * self.alpha * strength;
			x *= f;
			y *= f;
			self.velocities[target].x -= x * bias;
			self.velocities[target].y -= y * bias;
			self.velocities[source].x += x * (1.0 - bias);
			self.velocities[source].y += y * (1.0 - bias);
		}
	}

	/// Exact all-pairs repulsion.
	fn apply_charge(&mut self, pos: &[Point]) {
		let strength = self.config.charge_strength * self.alpha;
		let min2 = self.config.distance_min * self.config.distance_min;
		for i in 0..pos.len() {
			for j in 0..pos.len() {
				if i == j {
					continue;
				}
				let mut x = pos[j].x - pos[i].x;
				let mut y = pos[j].y - pos[i].y;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				let w = strength / l;
				self.velocities[i].x += x * w;
				self.velocities[i].y += y * w;
			}
		}
	}

	fn apply_collision(&mut self, pos: &[Point]) {
		let r = self.config.collision_radius;
		let reach = 2.0 * r;
		for i in 0..pos.len() {
			let xi = pos[i].x + self.velocities[i].x;
			let yi = pos[i].y + self.velocities[i].y;
			for j in (i + 1)..pos.len() {
				let mut x = xi - pos[j].x - self.velocities[j].x;
				let mut y = yi - pos[j].y - self.velocities[j].y;
				let mut l = x * x + y * y;
				if l >= reach * reach {
					continue;
				}
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				let l = l.sqrt();
				let f = (reach - l) / l;
				x *= f;
				y *= f;
				// Equal radii split the correction evenly.
				self.velocities[i].x += x * 0.5;
				self.velocities[i].y += y * 0.5;
				self.velocities[j].x -= x * 0.5;
				self.velocities[j].y -= y * 0.5;
			}
		}
	}

	fn apply_center(&self, pos: &mut [Point]) {
		if pos.is_empty() {
			return;
		}
		let n = pos.len() as f64;
		let (sx, sy) = pos
			.iter()
			.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
		let dx = (sx / n - self.center.x) * self.config.center_strength;
		let dy = (sy / n - self.center.y) * self.config.center_strength;
		for p in pos {
			p.x -= dx;
			p.y -= dy;
		}
	}
}

/// Iterator over the remaining ticks of a [`Simulation`].
pub struct Ticks<'a> {
	sim: &'a mut Simulation,
	graph: &'a mut Graph,
}

impl Iterator for Ticks<'_> {
	type Item = f64;

	fn next(&mut self) -> Option<f64> {
		match self.sim.tick(self.graph)? {
			TickEvent::Tick { alpha } => Some(alpha),
			TickEvent::End => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::{Value, json};

	use super::super::graph::{Node, NodeKind};
	use super::super::transform::transform;
	use super::*;

	const BOUNDS: Bounds = Bounds {
		width: 800.0,
		height: 600.0,
	};

	/// Balanced tree with `n` nodes, each parent having up to `fanout` children.
	fn tree(n: usize, fanout: usize) -> Graph {
		let nodes: Vec<Value> = (0..n).map(|i| json!({"id": i.to_string()})).collect();
		let edges: Vec<Value> = (1..n)
			.map(|i| json!({"source": ((i - 1) / fanout).to_string(), "target": i.to_string()}))
			.collect();
		transform(&json!({"nodes": nodes, "edges": edges}))
	}

	fn all_finite(g: &Graph) -> bool {
		g.nodes()
			.all(|n| n.position.x.is_finite() && n.position.y.is_finite())
	}

	#[test]
	fn converges_within_bounded_ticks() {
		for (n, fanout) in [(2, 1), (30, 3), (200, 4)] {
			let mut g = tree(n, fanout);
			let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
			let ticks = sim.run(&mut g, 500);
			assert!(ticks <= 500, "{n} nodes took {ticks} ticks");
			assert_eq!(sim.status(), SimulationStatus::Ended);
			assert!(all_finite(&g));
		}
	}

	#[test]
	fn end_is_signalled_exactly_once() {
		let mut g = tree(10, 2);
		let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
		let mut ends = 0;
		for _ in 0..1000 {
			if sim.tick(&mut g) == Some(TickEvent::End) {
				ends += 1;
			}
		}
		assert_eq!(ends, 1);
		assert_eq!(sim.tick(&mut g), None);
	}

	#[test]
	fn ticks_iterator_stops_at_convergence() {
		let mut g = tree(12, 3);
		let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
		let alphas: Vec<f64> = sim.ticks(&mut g).collect();
		assert!(!alphas.is_empty() && alphas.len() < 500);
		assert!(alphas.windows(2).all(|w| w[1] < w[0]));
		assert!(!sim.is_running());
	}

	#[test]
	fn converged_layout_spreads_nodes_apart() {
		let mut g = tree(20, 19);
		let config = ForceConfig::default();
		let radius = config.collision_radius;
		let mut sim = layout_force(&mut g, BOUNDS, config);
		sim.run(&mut g, 500);
		let positions: Vec<Point> = g.nodes().map(|n| n.position).collect();
		for (i, a) in positions.iter().enumerate() {
			for b in &positions[i + 1..] {
				assert!(a.distance(*b) > radius, "{a:?} and {b:?} overlap");
			}
		}
	}

	#[test]
	fn layout_is_centred_on_bounds() {
		let mut g = tree(15, 2);
		let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
		sim.run(&mut g, 500);
		let n = g.len() as f64;
		let cx = g.nodes().map(|n| n.position.x).sum::<f64>() / n;
		let cy = g.nodes().map(|n| n.position.y).sum::<f64>() / n;
		assert!((cx - 400.0).abs() < 1.0, "cx = {cx}");
		assert!((cy - 300.0).abs() < 1.0, "cy = {cy}");
	}

	#[test]
	fn pinned_nodes_stay_put() {
		let mut g = tree(8, 2);
		let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
		let pin = Point::new(700.0, 50.0);
		g.node_mut("3").unwrap().pinned = Some(pin);
		for _ in 0..50 {
			sim.tick(&mut g);
			assert_eq!(g.node("3").unwrap().position, pin);
		}
		g.node_mut("3").unwrap().pinned = None;
		sim.tick(&mut g);
		assert_ne!(g.node("3").unwrap().position, pin);
	}

	#[test]
	fn reheat_keeps_running_until_cooled() {
		let mut g = tree(6, 2);
		let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
		sim.run(&mut g, 500);
		assert_eq!(sim.status(), SimulationStatus::Ended);

		sim.reheat();
		assert_eq!(sim.run(&mut g, 1000), 1000);
		assert!((sim.alpha() - 0.3).abs() < 0.01);

		sim.cool();
		let ticks = sim.run(&mut g, 1000);
		assert!(ticks < 1000);
		assert_eq!(sim.status(), SimulationStatus::Ended);
	}

	#[test]
	fn stopped_simulation_does_not_move_nodes() {
		let mut g = tree(5, 2);
		let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
		sim.stop();
		let before: Vec<Point> = g.nodes().map(|n| n.position).collect();
		assert_eq!(sim.tick(&mut g), None);
		sim.reheat();
		assert_eq!(sim.tick(&mut g), None);
		let after: Vec<Point> = g.nodes().map(|n| n.position).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn nodes_added_mid_run_join_the_simulation() {
		let mut g = tree(4, 2);
		let mut sim = layout_force(&mut g, BOUNDS, ForceConfig::default());
		sim.run(&mut g, 10);
		g.insert_node(Node::new("new", "New", NodeKind::Step));
		g.add_link("0", "new", None, None);
		sim.run(&mut g, 500);
		assert!(all_finite(&g));
		let root = g.node("0").unwrap().position;
		let new = g.node("new").unwrap().position;
		assert!(root.distance(new) < 400.0);
	}

	#[test]
	fn coincident_nodes_are_separated() {
		let mut g = tree(3, 2);
		let mut sim = Simulation::new(&g, BOUNDS, ForceConfig::default());
		sim.run(&mut g, 500);
		assert!(all_finite(&g));
		let a = g.node("1").unwrap().position;
		let b = g.node("2").unwrap().position;
		assert!(a.distance(b) > 10.0);
	}
}
