//! WASM API exports for JavaScript interop
//!
//! `#[wasm_bindgen]` wrapper for building a sunburst from JSON and running it
//! in a page canvas. Only compiled when targeting wasm32.

#![cfg(target_arch = "wasm32")]

use parking_lot::Mutex;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

use crate::core::HierarchyNode;
use crate::options::SunburstOptions;
use crate::runtime::run_sunburst;
use crate::scene::{Scene, Selection};
use crate::sunburst::Sunburst;

fn js_error(report: error_stack::Report<crate::ChartError>) -> JsValue {
    JsValue::from_str(&format!("{report:?}"))
}

/// JavaScript-accessible sunburst wrapper
#[wasm_bindgen]
pub struct JsSunburst {
    data: Arc<Mutex<Vec<HierarchyNode>>>,
    options: SunburstOptions,
    /// Canvas ID for rendering
    canvas_id: String,
    started: bool,
}

#[wasm_bindgen]
impl JsSunburst {
    /// * `data` - hierarchy JSON, a root node or a one-element array
    /// * `options` - sunburst options JSON, `"{}"` for defaults
    /// * `canvas_id` - HTML canvas element ID (without #)
    #[wasm_bindgen(constructor)]
    pub fn new(data: &str, options: &str, canvas_id: &str) -> Result<JsSunburst, JsValue> {
        let data = HierarchyNode::from_json(data).map_err(js_error)?;
        let options = SunburstOptions::from_json(options).map_err(js_error)?;
        Ok(JsSunburst {
            data: Arc::new(Mutex::new(data)),
            options,
            canvas_id: canvas_id.to_string(),
            started: false,
        })
    }

    /// Start the Bevy render loop. Only the first call has an effect.
    #[wasm_bindgen]
    pub fn start(&mut self) {
        if self.started {
            web_sys::console::warn_1(&"Sunburst already started".into());
            return;
        }
        self.started = true;
        let data = self.data.lock().clone();
        run_sunburst(Sunburst::new(self.options.clone()), data, &self.canvas_id);
    }

    /// Replace the hierarchy shown on the next start.
    #[wasm_bindgen]
    pub fn set_data(&mut self, json: &str) -> Result<(), JsValue> {
        *self.data.lock() = HierarchyNode::from_json(json).map_err(js_error)?;
        Ok(())
    }

    /// Render off-screen and return the SVG markup.
    #[wasm_bindgen]
    pub fn to_svg(&self) -> Result<String, JsValue> {
        let mut chart = Sunburst::new(self.options.clone());
        let mut scene = Scene::new();
        let root = scene.root();
        let data = self.data.lock().clone();
        chart
            .render(&mut scene, &Selection::single(root, data))
            .map_err(js_error)?;
        Ok(scene.to_svg())
    }

    #[wasm_bindgen(getter)]
    pub fn canvas_id(&self) -> String {
        self.canvas_id.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn is_started(&self) -> bool {
        self.started
    }
}
