//! The interactive graph viewport: engine lifecycle, zoom commands, and
//! manual drag-resizing of the hosting box.
//!
//! The component owns exactly one engine handle per mount. Data arrival
//! triggers a full-replace render; teardown disposes the handle before any
//! still-pending deferred callback can touch it.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use send_wrapper::SendWrapper;
use leptos::html::Div;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;
use wasm_bindgen::prelude::*;
use web_sys::{MouseEvent, ResizeObserver};

use crate::session::Session;

use super::data;
use super::engine::{EchartsHandle, GraphEngine};
use super::render::ViewportBinding;
use super::state::{ResizeDrag, ResizeMode, ZoomState};
use super::types::GraphData;

/// Delay before the first render after data arrival, letting the surface
/// element finish its own layout pass.
const FIRST_RENDER_DELAY_MS: u32 = 100;

type SharedBinding = Rc<RefCell<ViewportBinding<EchartsHandle>>>;
type SharedZoom = Rc<RefCell<ZoomState>>;
type SharedDrag = Rc<RefCell<ResizeDrag>>;
type SharedCapture = Rc<RefCell<Option<DragCapture>>>;

/// Document-level listeners held for the duration of one resize drag.
struct DragCapture {
	mousemove: Closure<dyn FnMut(MouseEvent)>,
	mouseup: Closure<dyn FnMut(MouseEvent)>,
}

/// Renders one graph in a resizable, zoomable viewport box.
///
/// The graph id is fixed for the component's lifetime; the hosting page
/// re-keys on the id so a different graph means a fresh mount.
#[component]
pub fn GraphViewport(graph_id: i64) -> impl IntoView {
	let session = Session::expect();
	let navigate = use_navigate();

	let container_ref = NodeRef::<Div>::new();
	let surface_ref = NodeRef::<Div>::new();

	let binding: SharedBinding = Rc::new(RefCell::new(ViewportBinding::new()));
	let zoom: SharedZoom = Rc::new(RefCell::new(ZoomState::new()));
	let drag: SharedDrag = Rc::new(RefCell::new(ResizeDrag::default()));
	let capture: SharedCapture = Rc::new(RefCell::new(None));

	let loading = RwSignal::new(true);
	let graph_name = RwSignal::new(String::from("Loading…"));
	let node_count = RwSignal::new(0usize);
	// Once a manual size is set it overrides flex sizing for this mount.
	let manual_size = RwSignal::new(None::<(f64, f64)>);

	// Auth gate, then fetch. Re-runs if the in-memory login state flips.
	{
		let binding = binding.clone();
		let zoom = zoom.clone();
		let navigate = navigate.clone();
		Effect::new(move |_| {
			if !session.has_any_credential() {
				navigate("/login", Default::default());
				return;
			}
			loading.set(true);
			let binding = binding.clone();
			let zoom = zoom.clone();
			spawn_local(async move {
				match data::load_graph(graph_id).await {
					Ok(data) => {
						node_count.set(data.nodes.len());
						graph_name.set(format!("Graph #{graph_id}"));
						schedule_first_render(binding, zoom, surface_ref, data);
					}
					Err(err) => log::error!("failed to load graph {graph_id}: {err}"),
				}
				loading.set(false);
			});
		});
	}

	// Always-on geometry watcher, independent of the manual drag: any
	// reflow of the box re-measures the engine canvas.
	let observer: Rc<RefCell<Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array, ResizeObserver)>)>>> =
		Rc::new(RefCell::new(None));
	{
		let observer = observer.clone();
		let binding = binding.clone();
		Effect::new(move |_| {
			let Some(container) = container_ref.get() else {
				return;
			};
			if observer.borrow().is_some() {
				return;
			}
			let callback: Closure<dyn FnMut(js_sys::Array, ResizeObserver)> = Closure::new({
				let binding = binding.clone();
				move |_entries: js_sys::Array, _observer: ResizeObserver| {
					binding.borrow().resize();
				}
			});
			match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
				Ok(obs) => {
					obs.observe(&container);
					*observer.borrow_mut() = Some((obs, callback));
				}
				Err(err) => log::warn!("ResizeObserver unavailable: {err:?}"),
			}
		});
	}

	{
		let binding = binding.clone();
		let drag = drag.clone();
		let capture = capture.clone();
		let observer = observer.clone();
		// `on_cleanup` requires a `Send + Sync` closure, but the captured
		// handles are `Rc`-based and single-threaded (this is a CSR app).
		// `SendWrapper` carries them across that bound; access stays on the
		// one wasm thread, so it never panics.
		let guard = SendWrapper::new((drag, binding, capture, observer));
		on_cleanup(move || {
			let (drag, binding, capture, observer) = &*guard;
			end_drag(drag, binding, capture);
			if let Some((obs, _callback)) = observer.borrow_mut().take() {
				obs.disconnect();
			}
			binding.borrow_mut().dispose();
		});
	}

	let zoom_in = {
		let zoom = zoom.clone();
		let binding = binding.clone();
		move |_: MouseEvent| apply_zoom_step(&zoom, &binding, 1.2)
	};
	let zoom_out = {
		let zoom = zoom.clone();
		let binding = binding.clone();
		move |_: MouseEvent| apply_zoom_step(&zoom, &binding, 0.8)
	};
	let go_back = {
		let navigate = navigate.clone();
		move |_: MouseEvent| navigate("/", Default::default())
	};

	let start_drag = {
		let drag = drag.clone();
		let binding = binding.clone();
		let capture = capture.clone();
		move |mode: ResizeMode| {
			let drag = drag.clone();
			let binding = binding.clone();
			let capture = capture.clone();
			move |ev: MouseEvent| {
				begin_drag(mode, &ev, container_ref, &drag, &binding, &capture, manual_size)
			}
		}
	};

	view! {
		<div class="player">
			<header class="player-header">
				<button class="icon-button" on:click=go_back>"←"</button>
				<div>
					<h2>{move || graph_name.get()}</h2>
					<span class="player-meta">{move || format!("{} songs", node_count.get())}</span>
				</div>
			</header>

			<div
				class="viewport-frame"
				node_ref=container_ref
				style=move || match manual_size.get() {
					Some((width, height)) => {
						format!("width: {width}px; height: {height}px; flex: none;")
					}
					None => String::new(),
				}
			>
				{move || {
					loading.get().then(|| {
						view! {
							<div class="viewport-loading">
								<div class="spinner"></div>
								<p>"Loading the star map…"</p>
							</div>
						}
					})
				}}

				<div class="viewport-surface" node_ref=surface_ref></div>

				<div class="zoom-controls">
					<button on:click=zoom_in>"+"</button>
					<button on:click=zoom_out>"−"</button>
				</div>

				<div class="resize-handle resize-handle-e" on:mousedown=start_drag(ResizeMode::Width)></div>
				<div class="resize-handle resize-handle-s" on:mousedown=start_drag(ResizeMode::Height)></div>
				<div class="resize-handle resize-handle-se" on:mousedown=start_drag(ResizeMode::Both)></div>
			</div>
		</div>
	}
}

fn schedule_first_render(binding: SharedBinding, zoom: SharedZoom, surface_ref: NodeRef<Div>, data: GraphData) {
	Timeout::new(FIRST_RENDER_DELAY_MS, move || {
		render_now(&binding, &zoom, surface_ref, &data);
	})
	.forget();
}

fn render_now(binding: &SharedBinding, zoom: &SharedZoom, surface_ref: NodeRef<Div>, data: &GraphData) {
	let level = zoom.borrow().level();
	let applied = binding.borrow_mut().render(
		|| {
			let surface = surface_ref.get_untracked()?;
			let handle = EchartsHandle::init(&surface);
			handle.on_node_click(Box::new(|name| log::info!("selected song: {name}")));
			let gesture_zoom = Rc::clone(zoom);
			handle.on_roam_zoom(Box::new(move |delta| {
				gesture_zoom.borrow_mut().absorb_gesture(delta);
			}));
			Some(handle)
		},
		&data.nodes,
		&data.links,
		level,
	);
	if applied {
		// engines of this class compute internal pixel geometry lazily and
		// can under-size themselves if measured mid-layout; nudge exactly
		// once after the layout pass has committed
		let binding = Rc::clone(binding);
		after_layout(move || binding.borrow().resize());
	} else {
		log::debug!("viewport surface not attached yet; skipping render");
	}
}

fn apply_zoom_step(zoom: &SharedZoom, binding: &SharedBinding, ratio: f64) {
	if let Some(level) = zoom.borrow_mut().step(ratio) {
		binding.borrow().push_zoom(level);
	}
}

fn begin_drag(
	mode: ResizeMode,
	ev: &MouseEvent,
	container_ref: NodeRef<Div>,
	drag: &SharedDrag,
	binding: &SharedBinding,
	capture: &SharedCapture,
	manual_size: RwSignal<Option<(f64, f64)>>,
) {
	let Some(container) = container_ref.get_untracked() else {
		return;
	};
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return;
	};
	ev.prevent_default();

	let rect = container.get_bounding_client_rect();
	drag.borrow_mut().begin(
		mode,
		ev.client_x() as f64,
		ev.client_y() as f64,
		rect.width(),
		rect.height(),
	);

	// Process-wide drag affordances; end_drag restores them on every exit.
	if let Some(body) = document.body() {
		let style = body.style();
		let _ = style.set_property("user-select", "none");
		let _ = style.set_property("cursor", mode.cursor());
	}

	// The pointer may leave the box mid-drag, so both listeners go on the
	// document and stay there until the drag ends.
	let mousemove: Closure<dyn FnMut(MouseEvent)> = Closure::new({
		let drag = Rc::clone(drag);
		move |ev: MouseEvent| {
			let moved = drag.borrow_mut().update(ev.client_x() as f64, ev.client_y() as f64);
			if let Some((width, height)) = moved {
				manual_size.set(Some((width, height)));
			}
		}
	});
	let mouseup: Closure<dyn FnMut(MouseEvent)> = Closure::new({
		let drag = Rc::clone(drag);
		let binding = Rc::clone(binding);
		let capture = Rc::clone(capture);
		move |_ev: MouseEvent| end_drag(&drag, &binding, &capture)
	});
	let _ = document.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref());
	let _ = document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref());
	*capture.borrow_mut() = Some(DragCapture { mousemove, mouseup });
}

/// Single exit path for a resize drag: releases the document capture,
/// restores the global selection/cursor state, and fires the terminal
/// engine resize. Runs from pointer-up and from component cleanup, so an
/// interrupted drag cannot leave the page stuck in its dragging visuals.
fn end_drag(drag: &SharedDrag, binding: &SharedBinding, capture: &SharedCapture) {
	if let Some(capture) = capture.borrow_mut().take() {
		if let Some(document) = web_sys::window().and_then(|w| w.document()) {
			let _ = document
				.remove_event_listener_with_callback("mousemove", capture.mousemove.as_ref().unchecked_ref());
			let _ = document
				.remove_event_listener_with_callback("mouseup", capture.mouseup.as_ref().unchecked_ref());
			if let Some(body) = document.body() {
				let style = body.style();
				let _ = style.remove_property("user-select");
				let _ = style.remove_property("cursor");
			}
		}
	}
	if drag.borrow_mut().finish() {
		binding.borrow().resize();
	}
}

/// Run `f` once, right after the browser commits its next layout pass.
fn after_layout(f: impl FnOnce() + 'static) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let holder: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let holder_in_cb = Rc::clone(&holder);
	let mut f = Some(f);
	let callback: Closure<dyn FnMut()> = Closure::new(move || {
		if let Some(f) = f.take() {
			f();
		}
		holder_in_cb.borrow_mut().take();
	});
	if window
		.request_animation_frame(callback.as_ref().unchecked_ref())
		.is_ok()
	{
		*holder.borrow_mut() = Some(callback);
	}
}
