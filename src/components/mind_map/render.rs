//! Canvas rendering for the mind map.
//!
//! Drawing happens in passes for correct z-ordering:
//! 1. Background and dot grid (screen space)
//! 2. Links, then nodes with labels (content space, under the viewport transform)
//! 3. Selection and hover rings on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::config::LayoutMode;
use super::graph::{Node, Point};
use super::scale::{ScaleConfig, ScaledValues};
use super::state::MindMapState;
use super::theme::{Color, Theme};
use super::viewport::Size;

/// Renders the complete mind map to the canvas.
pub fn render(
	state: &MindMapState,
	ctx: &CanvasRenderingContext2d,
	size: Size,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let viewport = state.viewport;
	let scale = ScaledValues::new(config, viewport.scale);

	draw_background(state, ctx, size, theme);

	ctx.save();
	let _ = ctx.translate(viewport.translate_x, viewport.translate_y);
	let _ = ctx.scale(viewport.scale, viewport.scale);

	draw_links(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(
	state: &MindMapState,
	ctx: &CanvasRenderingContext2d,
	size: Size,
	theme: &Theme,
) {
	ctx.set_fill_style_str(&theme.background.color.to_css());
	ctx.fill_rect(0.0, 0.0, size.width, size.height);

	let spacing = theme.background.grid_spacing * state.viewport.scale;
	// Too dense to read once zoomed far out.
	if spacing < 8.0 {
		return;
	}
	let offset_x = state.viewport.translate_x.rem_euclid(spacing);
	let offset_y = state.viewport.translate_y.rem_euclid(spacing);
	ctx.set_fill_style_str(&theme.background.grid_color.to_css());
	let mut x = offset_x;
	while x < size.width {
		let mut y = offset_y;
		while y < size.height {
			ctx.fill_rect(x - 1.0, y - 1.0, 2.0, 2.0);
			y += spacing;
		}
		x += spacing;
	}
}

fn draw_links(
	state: &MindMapState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let selected = state.selected.as_deref();
	ctx.set_line_width(scale.edge_line_width);

	for link in state.graph.links() {
		let (Some(source), Some(target)) =
			(state.graph.node(&link.source), state.graph.node(&link.target))
		else {
			continue;
		};

		let touches_selection = selected
			.is_some_and(|id| id == link.source.as_str() || id == link.target.as_str());
		let color = if touches_selection {
			theme.edge.highlight_color
		} else {
			theme.edge.color
		};
		ctx.set_stroke_style_str(&color.to_css());
		draw_link(ctx, state.mode(), source, target);
	}
}

/// Tree modes draw elbow-like cubic curves along the growth axis; radial and
/// force layouts use straight segments between the node rims.
fn draw_link(ctx: &CanvasRenderingContext2d, mode: LayoutMode, source: &Node, target: &Node) {
	let (s, t) = (source.position, target.position);
	let dist = s.distance(t);
	if dist < 0.001 {
		return;
	}

	ctx.begin_path();
	match mode {
		LayoutMode::Horizontal => {
			let mid_x = (s.x + t.x) / 2.0;
			ctx.move_to(s.x, s.y);
			ctx.bezier_curve_to(mid_x, s.y, mid_x, t.y, t.x, t.y);
		}
		LayoutMode::Vertical => {
			let mid_y = (s.y + t.y) / 2.0;
			ctx.move_to(s.x, s.y);
			ctx.bezier_curve_to(s.x, mid_y, t.x, mid_y, t.x, t.y);
		}
		LayoutMode::Radial | LayoutMode::Force => {
			let (ux, uy) = ((t.x - s.x) / dist, (t.y - s.y) / dist);
			let from = Point::new(s.x + ux * source.radius(), s.y + uy * source.radius());
			let to = Point::new(t.x - ux * target.radius(), t.y - uy * target.radius());
			ctx.move_to(from.x, from.y);
			ctx.line_to(to.x, to.y);
		}
	}
	ctx.stroke();
}

fn draw_nodes(
	state: &MindMapState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let selected = state.selected.as_deref();
	let hovered = state.hovered.as_deref();
	let dragged = state.drag.node.as_deref();

	for node in state.graph.nodes() {
		draw_node(ctx, node, scale, theme);
	}

	// Rings go last so neighbours never paint over them.
	for node in state.graph.nodes() {
		let id = Some(node.id.as_str());
		if id == selected || id == dragged {
			draw_ring(ctx, node, scale, theme.node.selection_color);
		} else if id == hovered {
			draw_ring(ctx, node, scale, theme.node.hover_color);
		}
	}
}

/// Fill colour for a node: an explicit `color` in its payload wins over the
/// kind palette.
fn node_color(node: &Node, theme: &Theme) -> Color {
	node.payload
		.as_ref()
		.and_then(|p| p.get("color"))
		.and_then(|c| c.as_str())
		.and_then(Color::parse)
		.unwrap_or_else(|| theme.node.palette.get(node.kind))
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &Node, scale: &ScaledValues, theme: &Theme) {
	let Point { x, y } = node.position;
	let radius = node.radius();
	let color = node_color(node, theme);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	let gradient = theme
		.node
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &color.to_css());
			let _ = gradient.add_color_stop(1.0, &color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&color.to_css()),
	}
	ctx.fill();

	if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / scale.k);
		ctx.stroke();
	}

	if scale.show_labels {
		ctx.set_fill_style_str(&theme.node.label_color.to_css());
		ctx.set_font(&scale.label_font);
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(&node.label, x + radius + 4.0 / scale.k, y);
	}
}

fn draw_ring(ctx: &CanvasRenderingContext2d, node: &Node, scale: &ScaledValues, color: Color) {
	let Point { x, y } = node.position;
	ctx.begin_path();
	let _ = ctx.arc(x, y, node.radius() + scale.ring_offset, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(scale.ring_width);
	ctx.stroke();
}
