// Browser-side checks of the exported surface. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use synapse_engine::HeroSimulation;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn constructor_fills_buffers() {
    let sim = HeroSimulation::new(1, 1280.0, 720.0);
    assert_eq!(sim.node_count(), 62);
    assert_eq!(sim.node_positions().len(), 62 * 3);
    assert_eq!(sim.line_positions().len(), sim.edge_count() as usize * 6);
    assert_eq!(sim.projection_matrix().len(), 16);
}

#[wasm_bindgen_test]
fn tick_returns_stats_object() {
    let mut sim = HeroSimulation::new(2, 1280.0, 720.0);
    sim.set_pointer(640.0, 360.0);
    let stats = sim.tick(0.0);
    assert!(stats.is_object());
    assert!(sim.nodes().is_object());
}

#[wasm_bindgen_test]
fn bad_config_rejects_with_message() {
    let err = HeroSimulation::with_config(3, 800.0, 600.0, r#"{"field": {"node_count": 0}}"#)
        .err()
        .unwrap_or(JsValue::NULL);
    assert!(err.as_string().map(|m| m.contains("node count")).unwrap_or(false));
}

#[wasm_bindgen_test]
fn teardown_freezes_ticks() {
    let mut sim = HeroSimulation::new(4, 800.0, 600.0);
    sim.run_batch(30, 1.0 / 60.0);
    sim.teardown();
    let before = sim.node_positions();
    sim.tick(100.0);
    assert_eq!(sim.node_positions(), before);
}
