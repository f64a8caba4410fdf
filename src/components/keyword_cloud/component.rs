//! Leptos component wrapping the keyword cloud canvas.
//!
//! The component creates an HTML canvas and wires up pointer handlers for
//! trackball rotation, wheel zoom, hover and click. Whenever the keyword signal
//! changes, a local task fetches embeddings and runs the layout; only the most
//! recently started task may publish its result. An animation loop via
//! `requestAnimationFrame` advances hover easing, streams simulation ticks in
//! continuous mode, and redraws when something changed.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::{CloudConfig, LayoutMode};
use super::embedding::HttpEmbeddingProvider;
use super::pipeline::{LayoutGeneration, prepare_simulation};
use super::render;
use super::simulation::Simulation;
use super::state::CloudState;
use super::theme::Theme;
use super::types::{Keyword, KeywordSelection};

/// Scene state plus the simulation still streaming ticks, if any.
struct CloudContext {
	state: CloudState,
	simulation: Option<Simulation>,
	config: CloudConfig,
	theme: Theme,
}

impl CloudContext {
	/// Advance a continuous-mode simulation by one tick.
	fn step_simulation(&mut self) {
		let Some(simulation) = self.simulation.as_mut() else {
			return;
		};
		let nodes = simulation.step();
		self.state
			.update_positions(nodes.iter().map(|n| (n.id.as_str(), n.position)));
		if simulation.is_finished() {
			debug!(
				"keyword-cloud: continuous layout settled after {} ticks",
				simulation.ticks_run()
			);
			self.simulation = None;
			self.state.fit_camera(&self.config.scale);
		}
	}
}

/// Renders an interactive 3D keyword cloud on a canvas element.
///
/// Pass keywords via the reactive `keywords` signal. Embeddings are fetched
/// from `provider`, or from the endpoint configured in `config` relative to the
/// page origin. The canvas fills its parent's width unless `width` is given.
#[component]
pub fn KeywordCloud(
	/// Keywords to lay out. A new value starts a new layout.
	#[prop(into)]
	keywords: Signal<Vec<Keyword>>,
	/// Called with the keyword under the pointer on click.
	#[prop(optional, into)]
	on_keyword_click: Option<Callback<KeywordSelection>>,
	/// Embedding source. Defaults to HTTP against the configured endpoint.
	#[prop(optional)]
	provider: Option<HttpEmbeddingProvider>,
	/// Layout, camera and endpoint settings.
	#[prop(default = CloudConfig::default())]
	config: CloudConfig,
	/// Colors and shading.
	#[prop(default = Theme::default())]
	theme: Theme,
	/// Canvas width in pixels. Follows the parent's width when unset.
	#[prop(default = None)]
	width: Option<f64>,
	/// Canvas height in pixels.
	#[prop(default = 600.0)]
	height: f64,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = config.validated();
	let provider = provider.unwrap_or_else(|| {
		let origin = web_sys::window()
			.and_then(|w| w.location().origin().ok())
			.unwrap_or_default();
		HttpEmbeddingProvider::new(config.endpoint_for(&origin))
	});
	info!("keyword-cloud: embeddings from {}", provider.endpoint());

	let context = Rc::new(RefCell::new(CloudContext {
		state: CloudState::new(width.unwrap_or(800.0), height, &config.scale),
		simulation: None,
		config,
		theme,
	}));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let generation = LayoutGeneration::new();

	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let fit_width = move |canvas: &HtmlCanvasElement| {
			width.unwrap_or_else(|| {
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.filter(|w| *w > 0.0)
					.unwrap_or(800.0)
			})
		};
		let w = fit_width(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(height as u32);
		context_init.borrow_mut().state.resize(w, height);

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("keyword-cloud: canvas 2d context unavailable");
				return;
			}
		};

		if width.is_none() {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let nw = fit_width(&canvas_resize);
				canvas_resize.set_width(nw as u32);
				context_resize.borrow_mut().state.resize(nw, height);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut guard = context_anim.borrow_mut();
				let c = &mut *guard;
				let dt = 0.016;
				c.step_simulation();
				c.state.tick(dt);
				if c.state.dirty {
					render::render(&c.state, &ctx, &c.config.scale, &c.theme);
					c.state.dirty = false;
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_layout = context.clone();
	Effect::new(move |_| {
		let keywords = keywords.get();
		let ticket = generation.begin();
		let config = {
			let mut c = context_layout.borrow_mut();
			c.simulation = None;
			c.state.pending = !keywords.is_empty();
			c.state.dirty = true;
			c.config.clone()
		};

		let (context_task, generation_task, provider) =
			(context_layout.clone(), generation.clone(), provider.clone());
		spawn_local(async move {
			let started = js_sys::Date::now();
			let mut rng = rand::thread_rng();
			let mut simulation = prepare_simulation(&provider, &keywords, &config, &mut rng).await;
			if !generation_task.is_current(ticket) {
				debug!("keyword-cloud: keyword set changed during fetch, dropping result");
				return;
			}
			if config.mode == LayoutMode::Upfront {
				if let Some(sim) = simulation.as_mut() {
					sim.run();
				}
			}

			generation_task.apply_if_current(ticket, simulation, |simulation| {
				let mut guard = context_task.borrow_mut();
				let c = &mut *guard;
				c.state.pending = false;
				match simulation {
					Some(sim) => {
						c.state.set_nodes(&sim.positioned(), &c.config.scale, &c.theme);
						if !sim.is_finished() {
							c.simulation = Some(sim);
						}
						info!(
							"keyword-cloud: {} keywords placed in {:.0} ms",
							c.state.nodes.len(),
							js_sys::Date::now() - started
						);
					}
					None => c.state.clear(),
				}
			});
		});
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		context_md.borrow_mut().state.begin_drag(x, y);
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut guard = context_mm.borrow_mut();
		let c = &mut *guard;
		if c.state.drag.active {
			c.state.drag_to(x, y, &c.config.scale);
		}
		if !c.state.drag.moved {
			let hovered = c.state.node_at_position(x, y, &c.config.scale);
			c.state.set_hover(hovered);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let clicked = {
			let mut guard = context_mu.borrow_mut();
			let c = &mut *guard;
			c.state.end_drag(x, y, &c.config.scale)
		};
		if let (Some(selection), Some(cb)) = (clicked, on_keyword_click) {
			debug!("keyword-cloud: clicked {:?}", selection.name);
			cb.run(selection);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut c = context_ml.borrow_mut();
		c.state.drag = Default::default();
		c.state.set_hover(None);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let mut guard = context_wh.borrow_mut();
		let c = &mut *guard;
		c.state.zoom(ev.delta_y() < 0.0, &c.config.scale);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="keyword-cloud-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

/// Pointer position relative to the canvas.
fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
