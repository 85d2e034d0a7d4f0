// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine ("The Brain")

#[macro_use]
mod logging;

pub mod config;
pub mod types;
pub mod field;
pub mod physics;
pub mod cascade;
pub mod packets;
pub mod render;
pub mod input;
pub mod scene;
pub mod simulation;

pub use config::{ConfigError, SimConfig};
pub use types::*;
pub use simulation::HeroSimulation;

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl HeroSimulation {
    /// Build the default scene for a `width` x `height` viewport.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        HeroSimulation::build(seed, SimConfig::default(), width, height)
    }

    /// Build from a partial JSON configuration; missing keys keep defaults.
    pub fn with_config(seed: u64, width: f32, height: f32, json: &str) -> Result<HeroSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = SimConfig::from_json(json).map_err(|e| {
            console_log!(true, "config rejected: {}", e);
            JsValue::from_str(&e.to_string())
        })?;
        HeroSimulation::from_config(seed, config, width, height).map_err(|e| {
            console_log!(true, "config rejected: {}", e);
            JsValue::from_str(&e.to_string())
        })
    }

    /// `now` is the frame clock in seconds.
    pub fn tick(&mut self, now: f64) -> JsValue {
        let result = self.tick_core(now);
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    pub fn set_pointer(&self, client_x: f32, client_y: f32) { self.input.set_pointer(client_x, client_y); }
    pub fn clear_pointer(&self) { self.input.clear_pointer(); }
    pub fn set_scroll_progress(&self, progress: f32) { self.input.set_scroll_progress(progress); }

    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        self.apply_viewport(width, height)
    }

    /// Ignored for indices outside the field.
    pub fn fire(&mut self, node: u32) -> bool {
        self.fire_at(node as usize)
    }

    pub fn node_positions(&self) -> Vec<f32> { self.buffers.node_positions.clone() }
    pub fn node_colors(&self) -> Vec<f32> { self.buffers.node_colors.clone() }
    pub fn node_scales(&self) -> Vec<f32> { self.buffers.node_scales.clone() }
    pub fn halo_colors(&self) -> Vec<f32> { self.buffers.halo_colors.clone() }
    pub fn halo_scales(&self) -> Vec<f32> { self.buffers.halo_scales.clone() }
    pub fn line_positions(&self) -> Vec<f32> { self.buffers.line_positions.clone() }
    pub fn line_colors(&self) -> Vec<f32> { self.buffers.line_colors.clone() }
    pub fn packet_positions(&self) -> Vec<f32> { self.buffers.packet_positions.clone() }
    pub fn packet_colors(&self) -> Vec<f32> { self.buffers.packet_colors.clone() }
    pub fn packet_scales(&self) -> Vec<f32> { self.buffers.packet_scales.clone() }
    pub fn packet_count(&self) -> u32 { self.buffers.packet_count as u32 }
    pub fn star_positions(&self) -> Vec<f32> { self.stars.positions().to_vec() }

    pub fn projection_matrix(&self) -> Vec<f32> { self.camera.projection_matrix().to_vec() }
    pub fn view_matrix(&self) -> Vec<f32> { self.camera.view_matrix().to_vec() }

    pub fn node_count(&self) -> u32 { self.field.len() as u32 }
    pub fn edge_count(&self) -> u32 { self.graph.edge_count() as u32 }

    pub fn transform(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.transform).unwrap_or(JsValue::NULL)
    }

    pub fn stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.frame_stats()).unwrap_or(JsValue::NULL)
    }

    pub fn nodes(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.node_snapshots()).unwrap_or(JsValue::NULL)
    }

    /// Run N frames at a fixed step without returning results
    pub fn run_batch(&mut self, frames: u32, dt: f64) {
        for _ in 0..frames {
            let now = self.time + dt;
            self.tick_core(now);
        }
    }

    /// Rebuild the scene from its seed and configuration
    pub fn reset(&mut self) {
        self.restart();
    }

    /// Stop ticking; pending delayed fires are dropped.
    pub fn teardown(&mut self) {
        self.shutdown();
    }
}
