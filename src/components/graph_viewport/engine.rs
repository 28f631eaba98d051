//! The rendering-engine capability and its ECharts-backed implementation.
//!
//! Layout, painting, hit-testing, and native roam gestures all live in an
//! external JS engine. This module pins down the narrow capability the
//! viewport needs from it and adapts the `echarts` global (loaded by
//! `index.html`) to that shape.

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::render::EngineOption;

/// What the viewport requires from a live rendering-engine instance.
pub trait GraphEngine {
	/// Apply `option`. With `full_replace`, all prior option state is
	/// discarded instead of merged into.
	fn set_option(&self, option: &EngineOption, full_replace: bool);
	/// Subscribe to clicks on node markers. Diagnostic only.
	fn on_node_click(&self, handler: Box<dyn Fn(String)>);
	/// Subscribe to the multiplicative zoom deltas reported by the
	/// engine's native roam gesture.
	fn on_roam_zoom(&self, handler: Box<dyn Fn(f64)>);
	/// Re-measure the internal canvas against the host element.
	fn resize(&self);
	/// Tear the instance down. It must receive no further calls.
	fn dispose(&self);
}

#[wasm_bindgen]
extern "C" {
	/// A live chart instance returned by `echarts.init`.
	pub type JsChart;

	#[wasm_bindgen(js_namespace = echarts, js_name = init)]
	fn echarts_init(surface: &web_sys::HtmlElement) -> JsChart;

	#[wasm_bindgen(method, js_name = setOption)]
	fn js_set_option(this: &JsChart, option: &JsValue, opts: &JsValue);

	#[wasm_bindgen(method, js_name = on)]
	fn js_on(this: &JsChart, event: &str, handler: &js_sys::Function);

	#[wasm_bindgen(method, js_name = resize)]
	fn js_resize(this: &JsChart);

	#[wasm_bindgen(method, js_name = dispose)]
	fn js_dispose(this: &JsChart);
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SetOptionOpts {
	not_merge: bool,
}

/// ECharts-backed engine handle.
///
/// Keeps its event closures alive for as long as the chart instance is;
/// dropping the handle releases them together with the chart.
pub struct EchartsHandle {
	chart: JsChart,
	listeners: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl EchartsHandle {
	/// Bind a fresh chart instance to `surface`.
	pub fn init(surface: &web_sys::HtmlElement) -> Self {
		Self {
			chart: echarts_init(surface),
			listeners: RefCell::new(Vec::new()),
		}
	}

	fn subscribe(&self, event: &str, handler: impl FnMut(JsValue) + 'static) {
		let closure: Closure<dyn FnMut(JsValue)> = Closure::new(handler);
		self.chart.js_on(event, closure.as_ref().unchecked_ref());
		self.listeners.borrow_mut().push(closure);
	}
}

fn field(value: &JsValue, key: &str) -> Option<JsValue> {
	js_sys::Reflect::get(value, &JsValue::from_str(key)).ok()
}

impl GraphEngine for EchartsHandle {
	fn set_option(&self, option: &EngineOption, full_replace: bool) {
		let option = match serde_wasm_bindgen::to_value(option) {
			Ok(value) => value,
			Err(err) => {
				log::error!("engine option failed to serialize: {err}");
				return;
			}
		};
		let opts = serde_wasm_bindgen::to_value(&SetOptionOpts {
			not_merge: full_replace,
		})
		.unwrap_or(JsValue::UNDEFINED);
		self.chart.js_set_option(&option, &opts);
	}

	fn on_node_click(&self, handler: Box<dyn Fn(String)>) {
		self.subscribe("click", move |params| {
			let clicked_node = field(&params, "dataType")
				.and_then(|v| v.as_string())
				.is_some_and(|t| t == "node");
			if !clicked_node {
				return;
			}
			if let Some(name) = field(&params, "data")
				.and_then(|data| field(&data, "name"))
				.and_then(|v| v.as_string())
			{
				handler(name);
			}
		});
	}

	fn on_roam_zoom(&self, handler: Box<dyn Fn(f64)>) {
		self.subscribe("graphRoam", move |params| {
			// roam events without a zoom component are plain pans
			if let Some(delta) = field(&params, "zoom").and_then(|v| v.as_f64()) {
				handler(delta);
			}
		});
	}

	fn resize(&self) {
		self.chart.js_resize();
	}

	fn dispose(&self) {
		self.chart.js_dispose();
	}
}
