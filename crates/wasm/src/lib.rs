use trail_chart_core::model::ChangeBatch;
use trail_chart_core::{ChartConfig, ChartController};
use trail_chart_protocol::Point;
use wasm_bindgen::prelude::*;

fn js_err(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// A live chart driven from JavaScript: the page forwards snapshot changes
/// and pointer events, and draws the returned SVG or render commands.
#[wasm_bindgen]
pub struct LiveChart {
    controller: ChartController,
}

#[wasm_bindgen]
impl LiveChart {
    /// Create a chart from an optional JSON config. Missing fields take
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<LiveChart, JsError> {
        let config = match config_json {
            Some(json) => ChartConfig::from_json_slice(json.as_bytes()).map_err(js_err)?,
            None => ChartConfig::default(),
        };
        Ok(Self {
            controller: ChartController::new(config),
        })
    }

    /// Apply one batch of `{type, doc}` changes and redraw. Returns the
    /// batch report as JSON.
    pub fn apply_batch(&mut self, changes_json: &str) -> Result<String, JsError> {
        let batch = ChangeBatch::from_json_str(changes_json).map_err(js_err)?;
        let report = self.controller.apply_batch(batch);
        serde_json::to_string(&report).map_err(js_err)
    }

    pub fn select_activity(&mut self, activity: &str) {
        self.controller.select_activity(activity);
    }

    /// Activities present in the mirrored snapshot, as a JSON array.
    pub fn activities(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.controller.store().activities()).map_err(js_err)
    }

    /// Returns whether the hovered marker changed.
    pub fn pointer_moved(&mut self, x: f64, y: f64, now_ms: f64) -> bool {
        self.controller.pointer_moved(Point::new(x, y), now_ms)
    }

    pub fn pointer_left(&mut self, now_ms: f64) {
        self.controller.pointer_left(now_ms);
    }

    /// Whether a hover transition is still running, so the page knows to
    /// keep requesting frames.
    pub fn is_animating(&self, now_ms: f64) -> bool {
        self.controller.is_animating(now_ms)
    }

    pub fn render_svg(&self, now_ms: f64) -> String {
        self.controller.to_svg(now_ms)
    }

    /// Render commands for the frame at `now_ms`, as JSON.
    pub fn render_commands(&self, now_ms: f64) -> Result<String, JsError> {
        serde_json::to_string(&self.controller.frame(now_ms)).map_err(js_err)
    }
}
