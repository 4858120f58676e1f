//! Leptos component wrapping the mind-map canvas.
//!
//! The component creates a canvas plus a small toolbar and wires mouse and
//! wheel events into [`MindMapState`]. A `requestAnimationFrame` loop drives
//! [`MindMapState::frame`] and redraws only when the engine reports a change.
//! Engine events are drained after the state borrow is released and handed to
//! the optional callbacks, so a callback may safely call back into the page.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::{LayoutMode, MindMapConfig};
use super::graph::{Graph, Node, Point};
use super::interaction::MindMapEvent;
use super::render;
use super::scale::ScaleConfig;
use super::state::MindMapState;
use super::theme::Theme;
use super::viewport::Size;

/// Bundles the engine with visual configuration.
struct MindMapContext {
	state: MindMapState,
	scale: ScaleConfig,
	theme: Theme,
}

type SharedContext = Rc<RefCell<Option<MindMapContext>>>;

/// Outgoing callbacks plus the notice signal shown above the canvas.
#[derive(Clone)]
struct EventHandlers {
	on_node_click: Option<Callback<Node>>,
	on_node_edit: Option<Callback<Node>>,
	on_structure_change: Option<Callback<Graph>>,
	on_zoom_change: Option<Callback<f64>>,
	notice: RwSignal<Option<String>>,
}

impl EventHandlers {
	fn dispatch(&self, events: Vec<MindMapEvent>) {
		for event in events {
			match event {
				MindMapEvent::NodeClick(node) => {
					if let Some(cb) = &self.on_node_click {
						cb.run(node);
					}
				}
				MindMapEvent::NodeEdit(node) => {
					if let Some(cb) = &self.on_node_edit {
						cb.run(node);
					}
				}
				MindMapEvent::StructureChange(graph) => {
					if let Some(cb) = &self.on_structure_change {
						cb.run(graph);
					}
				}
				MindMapEvent::ZoomChange(scale) => {
					if let Some(cb) = &self.on_zoom_change {
						cb.run(scale);
					}
				}
			}
		}
	}
}

/// Runs `f` against the engine, then publishes its events and notice.
fn with_state(
	context: &SharedContext,
	handlers: &EventHandlers,
	f: impl FnOnce(&mut MindMapState),
) {
	let (events, notice) = match context.borrow_mut().as_mut() {
		Some(c) => {
			f(&mut c.state);
			(c.state.drain_events(), c.state.notice.clone())
		}
		None => return,
	};
	if handlers.notice.get_untracked() != notice {
		handlers.notice.set(notice);
	}
	handlers.dispatch(events);
}

/// Canvas-relative pointer position of a mouse event.
fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn canvas_size(canvas: &HtmlCanvasElement) -> Size {
	Size::new(canvas.width() as f64, canvas.height() as f64)
}

/// Renders an interactive mind map on a canvas element.
///
/// Pass the raw mind-map payload (explicit `nodes`/`edges` or a nested
/// `children` tree) via the reactive `data` signal; every change reloads the
/// engine. The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the window and follow its resizes. Explicit
/// `width`/`height` override automatic sizing.
#[component]
pub fn MindMapCanvas(
	#[prop(into)] data: Signal<Value>,
	#[prop(optional)] config: Option<MindMapConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_node_click: Option<Callback<Node>>,
	#[prop(optional)] on_node_edit: Option<Callback<Node>>,
	#[prop(optional)] on_structure_change: Option<Callback<Graph>>,
	#[prop(optional)] on_zoom_change: Option<Callback<f64>>,
) -> impl IntoView {
	let config = config.unwrap_or_default().validated();
	let theme = Theme::default();
	let notice_style = format!(
		"position: absolute; bottom: 8px; left: 8px; color: {};",
		theme.notice_color.to_css()
	);
	let initial_mode = config.mode;
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let notice = RwSignal::new(None::<String>);
	let handlers = EventHandlers {
		on_node_click,
		on_node_edit,
		on_structure_change,
		on_zoom_change,
		notice,
	};
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init, handlers_init) =
		(context.clone(), animate.clone(), resize_cb.clone(), handlers.clone());

	Effect::new(move |_| {
		let payload = data.get();
		if let Some(c) = context_init.borrow_mut().as_mut() {
			c.state.load(&payload);
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("mind-map: canvas 2d context unavailable");
			return;
		};

		*context_init.borrow_mut() = Some(MindMapContext {
			state: MindMapState::new(&payload, config.clone(), w, h),
			scale: ScaleConfig::default(),
			theme: theme.clone(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(c) = context_resize.borrow_mut().as_mut() {
					c.state.resize(nw, nh, js_sys::Date::now());
					// Resizing clears the canvas; redraw before the debounce settles.
					c.state.invalidate();
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, handlers_anim) =
			(context_init.clone(), animate_init.clone(), handlers_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let events = match context_anim.borrow_mut().as_mut() {
				Some(c) => {
					if c.state.frame(js_sys::Date::now()) {
						render::render(&c.state, &ctx, canvas_size(&canvas), &c.scale, &c.theme);
					}
					c.state.drain_events()
				}
				None => Vec::new(),
			};
			handlers_anim.dispatch(events);
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let pointer = {
		let context = context.clone();
		let handlers = handlers.clone();
		move |f: fn(&mut MindMapState, Point)| {
			let context = context.clone();
			let handlers = handlers.clone();
			move |ev: MouseEvent| {
				if let Some(p) = local_point(canvas_ref, &ev) {
					with_state(&context, &handlers, |s| f(s, p));
				}
			}
		}
	};
	let on_mousedown = pointer(MindMapState::pointer_down);
	let on_mousemove = pointer(MindMapState::pointer_move);
	let on_mouseup = pointer(MindMapState::pointer_up);
	let on_dblclick = pointer(MindMapState::double_click);

	let (context_ml, handlers_ml) = (context.clone(), handlers.clone());
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&context_ml, &handlers_ml, MindMapState::pointer_leave);
	};

	let (context_wh, handlers_wh) = (context.clone(), handlers.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = local_point(canvas_ref, &ev) {
			let delta_y = ev.delta_y();
			with_state(&context_wh, &handlers_wh, |s| s.wheel(delta_y, p));
		}
	};

	let action = {
		let context = context.clone();
		let handlers = handlers.clone();
		move |f: fn(&mut MindMapState)| {
			let context = context.clone();
			let handlers = handlers.clone();
			move |_: MouseEvent| with_state(&context, &handlers, f)
		}
	};

	let (context_mode, handlers_mode) = (context.clone(), handlers.clone());
	let on_mode_change = move |ev: web_sys::Event| {
		match LayoutMode::parse(&event_target_value(&ev)) {
			Some(mode) => with_state(&context_mode, &handlers_mode, |s| s.set_mode(mode)),
			None => log::warn!("mind-map: unknown layout mode selected"),
		}
	};

	let mode_options = [
		LayoutMode::Horizontal,
		LayoutMode::Vertical,
		LayoutMode::Radial,
		LayoutMode::Force,
	]
	.into_iter()
	.map(|mode| {
		view! {
			<option value=mode.as_str() selected={mode == initial_mode}>
				{mode.as_str()}
			</option>
		}
	})
	.collect_view();

	view! {
		<div class="mind-map" style="position: relative; width: 100%; height: 100%;">
			<div
				class="mind-map-toolbar"
				style="position: absolute; top: 8px; left: 8px; display: flex; gap: 4px;"
			>
				<button title="Zoom in" on:click=action(MindMapState::zoom_in)>"+"</button>
				<button title="Zoom out" on:click=action(MindMapState::zoom_out)>"−"</button>
				<button title="Reset view" on:click=action(MindMapState::reset_view)>"1:1"</button>
				<button title="Fit to view" on:click=action(MindMapState::fit_view)>"Fit"</button>
				<button title="Center" on:click=action(MindMapState::center_view)>"Center"</button>
				<select title="Layout" on:change=on_mode_change>{mode_options}</select>
				<button
					title="Add child to selection"
					on:click=action(|s| {
						s.add_child_to_selection();
					})
				>
					"Add"
				</button>
				<button
					title="Delete selection"
					on:click=action(|s| {
						s.delete_selection();
					})
				>
					"Delete"
				</button>
			</div>
			{move || {
				notice
					.get()
					.map(|text| {
						view! {
							<div class="mind-map-notice" style=notice_style.clone()>
								{text}
							</div>
						}
					})
			}}
			<canvas
				node_ref=canvas_ref
				class="mind-map-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:dblclick=on_dblclick
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}
