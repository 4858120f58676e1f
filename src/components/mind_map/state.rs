//! Mind-map engine state and frame driver.
//!
//! [`MindMapState`] owns the live [`Graph`] together with the active layout,
//! the viewport, pointer tracking and the outgoing event queue. Every entry
//! point takes `&mut self`, so layout ticks, edits and camera changes are
//! serialized through whoever drives [`MindMapState::frame`]. Nothing here
//! touches the DOM.
//!
//! Layout follows a small state machine: loading data, editing structure or
//! switching mode moves to [`LayoutPhase::LayoutRequested`]; the next frame
//! runs the layout (tree layouts complete immediately, the force layout enters
//! [`LayoutPhase::LayingOut`] until its end signal) and returns to
//! [`LayoutPhase::Idle`].

use log::{debug, info, warn};
use serde_json::Value;

use super::config::{LayoutMode, MindMapConfig};
use super::error::{Error, Result};
use super::force::{Bounds, Simulation, TickEvent, layout_force};
use super::graph::{Graph, Node, NodeKind, Point};
use super::interaction::{self, CLICK_SLOP, DragState, MindMapEvent, NodeEdit, PanState};
use super::transform::transform;
use super::tree_layout::layout_tree;
use super::viewport::{Size, Viewport};

/// Zoom step of the toolbar buttons.
pub const ZOOM_STEP: f64 = 1.2;

/// Minimum on-screen hit radius, so tiny nodes stay clickable when zoomed out.
const MIN_HIT_RADIUS_PX: f64 = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutPhase {
	Idle,
	LayoutRequested,
	LayingOut,
}

/// The engine behind one rendered mind map.
pub struct MindMapState {
	pub graph: Graph,
	pub config: MindMapConfig,
	pub viewport: Viewport,
	pub drag: DragState,
	pub pan: PanState,
	pub selected: Option<String>,
	pub hovered: Option<String>,
	/// Last user-facing warning, e.g. a refused root deletion.
	pub notice: Option<String>,
	mode: LayoutMode,
	phase: LayoutPhase,
	simulation: Option<Simulation>,
	/// Whether the next force layout starts from scratch instead of the
	/// current positions.
	reseed: bool,
	container: Size,
	pending_resize: Option<(Size, f64)>,
	events: Vec<MindMapEvent>,
	dirty: bool,
}

impl MindMapState {
	pub fn new(raw: &Value, config: MindMapConfig, width: f64, height: f64) -> Self {
		Self::from_graph(transform(raw), config, width, height)
	}

	pub fn from_graph(graph: Graph, config: MindMapConfig, width: f64, height: f64) -> Self {
		let config = config.validated();
		info!(
			"mind-map: engine created with {} nodes in {} mode",
			graph.len(),
			config.mode.as_str()
		);
		Self {
			graph,
			mode: config.mode,
			config,
			viewport: Viewport::identity(),
			drag: DragState::default(),
			pan: PanState::default(),
			selected: None,
			hovered: None,
			notice: None,
			phase: LayoutPhase::LayoutRequested,
			simulation: None,
			reseed: true,
			container: Size::new(width, height),
			pending_resize: None,
			events: Vec::new(),
			dirty: true,
		}
	}

	pub fn mode(&self) -> LayoutMode {
		self.mode
	}

	pub fn phase(&self) -> LayoutPhase {
		self.phase
	}

	pub fn simulation(&self) -> Option<&Simulation> {
		self.simulation.as_ref()
	}

	pub fn container(&self) -> Size {
		self.container
	}

	/// Takes all events produced since the last call.
	pub fn drain_events(&mut self) -> Vec<MindMapEvent> {
		std::mem::take(&mut self.events)
	}

	/// Replaces the graph with a new payload and lays it out from scratch.
	pub fn load(&mut self, raw: &Value) {
		self.stop_simulation();
		self.graph = transform(raw);
		self.drag = DragState::default();
		self.pan = PanState::default();
		self.selected = None;
		self.hovered = None;
		self.notice = None;
		self.request_layout(true);
	}

	/// Switches layout algorithm, cancelling any running simulation first.
	pub fn set_mode(&mut self, mode: LayoutMode) {
		if mode == self.mode {
			return;
		}
		debug!("mind-map: switching layout {} -> {}", self.mode.as_str(), mode.as_str());
		self.stop_simulation();
		if let Some((id, _)) = self.drag.end(&mut self.graph) {
			debug!("mind-map: drag of `{id}` cancelled by mode switch");
		}
		self.mode = mode;
		self.request_layout(true);
	}

	fn request_layout(&mut self, reseed: bool) {
		self.reseed |= reseed;
		self.phase = LayoutPhase::LayoutRequested;
		self.dirty = true;
	}

	fn stop_simulation(&mut self) {
		if let Some(mut sim) = self.simulation.take() {
			sim.stop();
		}
	}

	/// Forces a redraw on the next frame, e.g. after the canvas was cleared
	/// by a size change.
	pub fn invalidate(&mut self) {
		self.dirty = true;
	}

	/// Advances the engine by one frame. Returns whether a redraw is needed.
	pub fn frame(&mut self, now_ms: f64) -> bool {
		self.apply_pending_resize(now_ms);
		if self.phase == LayoutPhase::LayoutRequested {
			self.run_layout();
		} else {
			self.step_simulation();
		}
		std::mem::take(&mut self.dirty)
	}

	fn run_layout(&mut self) {
		match self.mode.tree_mode() {
			Some(tree) => {
				self.stop_simulation();
				layout_tree(&mut self.graph, tree, &self.config.tree_settings());
				self.phase = LayoutPhase::Idle;
				if self.config.auto_fit {
					self.fit_view();
				}
			}
			None => {
				let reuse = !self.reseed;
				match self.simulation.as_mut().filter(|_| reuse) {
					// Structural edits keep the current arrangement and re-energize it.
					Some(sim) => sim.restart(1.0),
					None => {
						let bounds = Bounds {
							width: self.container.width,
							height: self.container.height,
						};
						let settings = self.config.force_settings();
						let sim = layout_force(&mut self.graph, bounds, settings);
						self.simulation = Some(sim);
					}
				}
				self.phase = LayoutPhase::LayingOut;
			}
		}
		self.reseed = false;
		self.dirty = true;
	}

	fn step_simulation(&mut self) {
		let Some(sim) = self.simulation.as_mut() else {
			return;
		};
		match sim.tick(&mut self.graph) {
			Some(TickEvent::Tick { .. }) => self.dirty = true,
			Some(TickEvent::End) => {
				self.dirty = true;
				// Only a requested layout refits; cooling after a drag leaves
				// the camera where the user put it.
				if self.phase == LayoutPhase::LayingOut {
					self.phase = LayoutPhase::Idle;
					if self.config.auto_fit {
						self.fit_view();
					}
				}
			}
			None => {
				if self.phase == LayoutPhase::LayingOut {
					self.phase = LayoutPhase::Idle;
				}
			}
		}
	}

	/// Records a container resize; applied once no further resize arrives
	/// for `resize_debounce_ms`.
	pub fn resize(&mut self, width: f64, height: f64, now_ms: f64) {
		let deadline = now_ms + self.config.resize_debounce_ms;
		self.pending_resize = Some((Size::new(width, height), deadline));
	}

	fn apply_pending_resize(&mut self, now_ms: f64) {
		let Some((size, deadline)) = self.pending_resize else {
			return;
		};
		if now_ms < deadline {
			return;
		}
		self.pending_resize = None;
		self.container = size;
		if let Some(sim) = self.simulation.as_mut() {
			sim.set_bounds(Bounds {
				width: size.width,
				height: size.height,
			});
		}
		if self.config.auto_fit {
			self.fit_view();
		}
		self.dirty = true;
	}

	fn set_viewport(&mut self, viewport: Viewport) {
		if (viewport.scale - self.viewport.scale).abs() > f64::EPSILON {
			self.events.push(MindMapEvent::ZoomChange(viewport.scale));
		}
		if viewport != self.viewport {
			self.viewport = viewport;
			self.dirty = true;
		}
	}

	pub fn zoom_in(&mut self) {
		self.zoom_by(ZOOM_STEP);
	}

	pub fn zoom_out(&mut self) {
		self.zoom_by(1.0 / ZOOM_STEP);
	}

	/// Zooms around the container centre.
	pub fn zoom_by(&mut self, factor: f64) {
		let v = self
			.viewport
			.zoom_by(factor, self.container, self.config.zoom_extent());
		self.set_viewport(v);
	}

	/// Wheel zoom around the pointer.
	pub fn wheel(&mut self, delta_y: f64, screen: Point) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let v = self
			.viewport
			.zoom_at(factor, screen, self.config.zoom_extent());
		self.set_viewport(v);
	}

	pub fn reset_view(&mut self) {
		self.set_viewport(Viewport::reset());
	}

	/// Fits all content, leaving room for the toolbar.
	pub fn fit_view(&mut self) {
		let v = match self.graph.bounding_box() {
			Some(bbox) => {
				Viewport::fit_to_view(bbox, self.container, &self.config.viewport_settings())
			}
			None => Viewport::identity(),
		};
		self.set_viewport(v);
	}

	/// Centres and fits all content without the toolbar offset.
	pub fn center_view(&mut self) {
		let v = match self.graph.bounding_box() {
			Some(bbox) => {
				Viewport::center_view(bbox, self.container, &self.config.viewport_settings())
			}
			None => Viewport::identity(),
		};
		self.set_viewport(v);
	}

	/// Topmost node under a screen point.
	pub fn node_at(&self, screen: Point) -> Option<&Node> {
		let p = self.viewport.to_content(screen);
		let min_radius = MIN_HIT_RADIUS_PX / self.viewport.scale;
		self.graph
			.nodes()
			.rev()
			.find(|n| n.position.distance(p) <= n.radius().max(min_radius))
	}

	pub fn pointer_down(&mut self, screen: Point) {
		match self.node_at(screen).map(|n| n.id.clone()) {
			Some(id) => {
				if self.drag.start(&mut self.graph, &id, screen).is_ok() {
					if let Some(sim) = self.simulation.as_mut() {
						sim.reheat();
					}
				}
			}
			None => {
				self.pan = PanState {
					active: true,
					start: screen,
					last: screen,
				};
			}
		}
	}

	pub fn pointer_move(&mut self, screen: Point) {
		if self.drag.is_active() {
			let content = self.viewport.to_content(screen);
			self.drag.drag_to(&mut self.graph, screen, content);
			if self.mode.tree_mode().is_some() && self.drag.moved {
				// No simulation applies the pin in tree modes.
				let dragged = self.drag.node.as_deref();
				if let Some(node) = dragged.and_then(|id| self.graph.node_mut(id)) {
					node.position = content;
				}
			}
			self.dirty = true;
		} else if self.pan.active {
			let (dx, dy) = (screen.x - self.pan.last.x, screen.y - self.pan.last.y);
			self.pan.last = screen;
			let v = self.viewport.pan_by(dx, dy);
			self.set_viewport(v);
		} else {
			let hovered = self.node_at(screen).map(|n| n.id.clone());
			if hovered != self.hovered {
				self.hovered = hovered;
				self.dirty = true;
			}
		}
	}

	pub fn pointer_up(&mut self, screen: Point) {
		if let Some((id, moved)) = self.drag.end(&mut self.graph) {
			if let Some(sim) = self.simulation.as_mut() {
				sim.cool();
			}
			if moved {
				if self.mode.tree_mode().is_some() {
					self.request_layout(false);
				}
				self.dirty = true;
			} else {
				self.select(&id);
			}
		} else if self.pan.active && screen.distance(self.pan.start) <= CLICK_SLOP {
			if self.selected.take().is_some() {
				self.dirty = true;
			}
		}
		self.pan.active = false;
	}

	/// Pointer left the canvas: abandon any drag or pan without clicking.
	pub fn pointer_leave(&mut self) {
		if let Some((_, moved)) = self.drag.end(&mut self.graph) {
			if let Some(sim) = self.simulation.as_mut() {
				sim.cool();
			}
			if moved && self.mode.tree_mode().is_some() {
				self.request_layout(false);
			}
		}
		self.pan.active = false;
		if self.hovered.take().is_some() {
			self.dirty = true;
		}
	}

	/// Double click asks the UI to open an editor for the node under the pointer.
	pub fn double_click(&mut self, screen: Point) {
		if let Some(node) = self.node_at(screen).cloned() {
			self.events.push(MindMapEvent::NodeEdit(node));
		}
	}

	/// Selects a node and emits `NodeClick`. Never mutates the graph.
	pub fn select(&mut self, id: &str) {
		let Some(node) = self.graph.node(id) else {
			return;
		};
		self.events.push(MindMapEvent::NodeClick(node.clone()));
		self.selected = Some(id.to_string());
		self.dirty = true;
	}

	/// Emits `NodeEdit` for the selected node.
	pub fn edit_selection(&mut self) {
		if let Some(node) = self.selected.as_deref().and_then(|id| self.graph.node(id)) {
			self.events.push(MindMapEvent::NodeEdit(node.clone()));
		}
	}

	pub fn add_child(
		&mut self,
		parent_id: &str,
		label: Option<&str>,
		kind: Option<NodeKind>,
	) -> Result<String> {
		let id = interaction::add_child(&mut self.graph, parent_id, label, kind)?;
		self.selected = Some(id.clone());
		self.structure_changed();
		Ok(id)
	}

	pub fn add_child_to_selection(&mut self) -> Option<String> {
		let parent = self.selected.clone()?;
		self.add_child(&parent, None, None).ok()
	}

	/// Deletes a node and its subtree. A refused root deletion leaves the
	/// graph untouched and sets [`MindMapState::notice`].
	pub fn delete_node(&mut self, id: &str) -> Result<Vec<String>> {
		let removed = match interaction::delete_node(&mut self.graph, id) {
			Ok(removed) => removed,
			Err(e) => {
				if matches!(e, Error::RootDeletion { .. }) {
					self.notice = Some(e.to_string());
					self.dirty = true;
				}
				return Err(e);
			}
		};
		if self.selected.as_ref().is_some_and(|s| removed.contains(s)) {
			self.selected = None;
		}
		if self.hovered.as_ref().is_some_and(|h| removed.contains(h)) {
			self.hovered = None;
		}
		if self.drag.node.as_ref().is_some_and(|d| removed.contains(d)) {
			self.drag = DragState::default();
		}
		self.structure_changed();
		Ok(removed)
	}

	pub fn delete_selection(&mut self) -> Option<Vec<String>> {
		let id = self.selected.clone()?;
		match self.delete_node(&id) {
			Ok(removed) => Some(removed),
			Err(e) => {
				warn!("mind-map: {e}");
				None
			}
		}
	}

	/// Renames or re-describes a node. Positions are unaffected, so only a
	/// redraw follows.
	pub fn edit_node(&mut self, id: &str, edit: &NodeEdit) -> Result<()> {
		interaction::edit_node(&mut self.graph, id, edit)?;
		self.dirty = true;
		Ok(())
	}

	fn structure_changed(&mut self) {
		self.notice = None;
		self.events
			.push(MindMapEvent::StructureChange(self.graph.clone()));
		self.request_layout(false);
	}
}
