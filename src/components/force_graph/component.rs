//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, selection, panning, and zooming. An animation
//! loop runs via `requestAnimationFrame`, ticking the simulation and repainting
//! each frame. Once the canvas leaves the document the loop stops the
//! simulation and unhooks itself.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::EngineConfig;
use super::error::GraphError;
use super::render;
use super::state::{EngineEvent, ForceGraphState};
use super::types::{GraphData, GraphNode};
use super::viewport::Point;

type Engine = Rc<RefCell<Option<ForceGraphState>>>;
type Slot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Renders an interactive force-directed graph on a canvas element.
///
/// Pass graph data and the active metric via reactive signals; changing either
/// restarts the layout. Clicking a node reports its full record through
/// `on_select`, and a dataset that fails validation is reported through
/// `on_error` while the previous layout stays up. The host owns the selection:
/// feeding the selected node id back through `selected` keeps the highlighted
/// node in step, and setting it to `None` is the only way to deselect.
///
/// The component sizes itself to its parent container by default; set
/// `fullscreen = true` to fill the viewport and resize automatically with the
/// window. Explicit `width`/`height` override automatic sizing.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] metric: Signal<String>,
	#[prop(optional)] on_select: Option<Callback<Option<GraphNode>>>,
	#[prop(optional)] on_error: Option<Callback<GraphError>>,
	#[prop(optional, into)] selected: Option<Signal<Option<String>>>,
	#[prop(optional)] config: Option<EngineConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine: Engine = Rc::new(RefCell::new(None));
	let animate: Slot = Rc::new(RefCell::new(None));
	let resize_cb: Slot = Rc::new(RefCell::new(None));
	let (engine_init, animate_init, resize_cb_init) =
		(engine.clone(), animate.clone(), resize_cb.clone());

	let emit = move |event: Option<EngineEvent>| {
		if let (Some(EngineEvent::SelectionChanged(node)), Some(cb)) = (event, on_select) {
			cb.run(node);
		}
	};
	let fail = move |err: GraphError| {
		warn!("pubnet-graph: {err}");
		if let Some(cb) = on_error {
			cb.run(err);
		}
	};

	Effect::new(move |_| {
		let data = data.get();
		let metric = metric.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		// Host callbacks run after the borrow is released; they may well
		// update the signals this effect tracks.
		let mut existing = engine_init.borrow_mut();
		if let Some(state) = existing.as_mut() {
			let outcome = state.replace(&data, &metric);
			drop(existing);
			match outcome {
				Ok(event) => emit(event),
				Err(err) => fail(err),
			}
			return;
		}

		let window: Window = web_sys::window().unwrap();
		let (w, h) = canvas_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		match ForceGraphState::new(&data, &metric, w, h, config.clone().unwrap_or_default()) {
			Ok(state) => *existing = Some(state),
			Err(err) => {
				drop(existing);
				fail(err);
				return;
			}
		}
		drop(existing);

		if animate_init.borrow().is_some() {
			return;
		}

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		if fullscreen {
			let (engine_resize, canvas_resize) = (engine_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(state) = engine_resize.borrow_mut().as_mut() {
					state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (engine_anim, animate_inner, resize_teardown) =
			(engine_init.clone(), animate_init.clone(), resize_cb_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let win: Window = web_sys::window().unwrap();
			if !canvas.is_connected() {
				if let Some(state) = engine_anim.borrow_mut().as_mut() {
					state.stop();
				}
				if let Some(cb) = resize_teardown.borrow_mut().take() {
					let _ = win
						.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				return;
			}
			if let Some(state) = engine_anim.borrow_mut().as_mut() {
				state.tick();
				render::render(state, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	if let Some(selected) = selected {
		let engine_sel = engine.clone();
		Effect::new(move |_| {
			let id = selected.get();
			// The host already knows; nothing to report back.
			if let Some(state) = engine_sel.borrow_mut().as_mut() {
				let _ = state.set_selection(id.as_deref());
			}
		});
	}

	let engine_md = engine.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(state) = engine_md.borrow_mut().as_mut() {
			state.pointer_down(at);
		}
	};

	let engine_mm = engine.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(state) = engine_mm.borrow_mut().as_mut() {
			state.pointer_move(at);
		}
	};

	let engine_mu = engine.clone();
	let on_mouseup = move |_: MouseEvent| {
		let event = engine_mu.borrow_mut().as_mut().and_then(|state| state.pointer_up());
		emit(event);
	};

	let engine_ml = engine.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(state) = engine_ml.borrow_mut().as_mut() {
			state.pointer_cancel();
		}
	};

	let engine_wh = engine;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(at) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(state) = engine_wh.borrow_mut().as_mut() {
			state.wheel(at, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// Pointer position relative to the canvas' top-left corner.
fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> (f64, f64) {
	(
		window.inner_width().unwrap().as_f64().unwrap(),
		window.inner_height().unwrap().as_f64().unwrap(),
	)
}

fn canvas_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		return window_size(window);
	}
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
}
