// Scenario Definitions: idle, pointer, scroll, topology and lifecycle stress
// All scenario logic lives in config builders, input paths and setup/event closures

use synapse_engine::{HeroSimulation, SimConfig};

pub const VIEWPORT: (f32, f32) = (1600.0, 900.0);

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    /// Simulated seconds on the frame clock.
    pub seconds: f64,
    pub fps: f64,
    /// Relative frame-time jitter, e.g. 0.25 for +/-12.5%.
    pub frame_jitter: f64,
    pub config: fn() -> SimConfig,
    /// Client coordinates at time t; `None` means the pointer left the page.
    /// Scenarios without a path leave the pointer parked at the center.
    pub pointer_path: Option<fn(f64) -> Option<(f32, f32)>>,
    pub scroll_curve: Option<fn(f64) -> f32>,
    pub criteria: PassCriteria,
    pub setup: Option<Box<dyn Fn(&mut HeroSimulation) + Send + Sync>>,
    /// Called before each frame with the frame index.
    pub mid_event: Option<Box<dyn Fn(&mut HeroSimulation, u64) + Send + Sync>>,
}

pub struct PassCriteria {
    pub min_cascades: Option<u64>,
    pub min_packets_spawned: Option<u64>,
    pub max_packets_spawned: Option<u64>,
    /// Largest node offset from rest after the final frame.
    pub max_final_displacement: Option<f32>,
    pub min_peak_displacement: Option<f32>,
    pub final_scale: Option<f32>,
    pub final_frame: Option<u64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            min_cascades: None,
            min_packets_spawned: None,
            max_packets_spawned: None,
            max_final_displacement: None,
            min_peak_displacement: None,
            final_scale: None,
            final_frame: None,
        }
    }
}

// ─── Config Builders ────────────────────────────────────────────────────────

fn default_config() -> SimConfig {
    quiet(SimConfig::default())
}

fn quiet(mut config: SimConfig) -> SimConfig {
    config.log_events = false;
    config
}

fn dense_config() -> SimConfig {
    let mut c = default_config();
    c.field.node_count = 200;
    c
}

fn no_edges_config() -> SimConfig {
    let mut c = default_config();
    c.field.max_edge_distance = 0.0;
    c
}

fn single_node_config() -> SimConfig {
    let mut c = default_config();
    c.field.node_count = 1;
    c
}

fn echo_storm_config() -> SimConfig {
    let mut c = default_config();
    c.cascade.echo_probability = 1.0;
    c.cascade.fire_interval_min = 0.3;
    c.cascade.fire_interval_jitter = 0.1;
    c.cascade.max_hop_min = 20;
    c.cascade.max_hop_max = 30;
    c
}

fn tight_pool_config() -> SimConfig {
    let mut c = default_config();
    c.packets.capacity = 2;
    c.packets.spawn_interval = 0.0;
    c
}

fn slow_decay_config() -> SimConfig {
    let mut c = default_config();
    c.cascade.decay = 0.999;
    c.cascade.hop_excitation = 1.0;
    c
}

// ─── Input Paths ────────────────────────────────────────────────────────────

fn pointer_absent(_t: f64) -> Option<(f32, f32)> {
    None
}

fn pointer_orbit(t: f64) -> Option<(f32, f32)> {
    let (w, h) = VIEWPORT;
    let a = t * 0.8;
    Some((
        w * 0.5 + (a.cos() * 0.35 * w as f64) as f32,
        h * 0.5 + (a.sin() * 0.35 * h as f64) as f32,
    ))
}

/// Sweeps for ten seconds, then leaves the page.
fn pointer_sweep_then_leave(t: f64) -> Option<(f32, f32)> {
    if t < 10.0 {
        let (w, h) = VIEWPORT;
        let u = ((t * 0.4).sin() * 0.5 + 0.5) as f32;
        Some((u * w, h * 0.5))
    } else {
        None
    }
}

fn pointer_jitter(t: f64) -> Option<(f32, f32)> {
    let (w, h) = VIEWPORT;
    // Fast flicker across the whole viewport, including the edges.
    let x = ((t * 37.0).sin() * 0.5 + 0.5) as f32 * w;
    let y = ((t * 23.0).cos() * 0.5 + 0.5) as f32 * h;
    Some((x, y))
}

fn scroll_ramp(t: f64) -> f32 {
    (t / 10.0).min(1.0) as f32
}

fn scroll_overshoot(t: f64) -> f32 {
    // Host rubber-banding reports values outside [0, 1].
    ((t * 0.5).sin() * 1.5) as f32
}

// ─── All Scenarios ──────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        // ─── Baseline ───────────────────────────────────────────────────────
        Scenario { name: "IDLE_DEFAULT", label: "Idle, Pointer Absent", category: "baseline",
            seconds: 60.0, fps: 60.0, frame_jitter: 0.0,
            config: default_config, pointer_path: Some(pointer_absent), scroll_curve: None,
            criteria: PassCriteria {
                min_cascades: Some(10),
                min_packets_spawned: Some(100),
                max_final_displacement: Some(1e-3),
                ..Default::default()
            },
            setup: None, mid_event: None },
        Scenario { name: "IDLE_JITTERED", label: "Idle, Jittered Frame Clock", category: "baseline",
            seconds: 60.0, fps: 60.0, frame_jitter: 0.5,
            config: default_config, pointer_path: Some(pointer_absent), scroll_curve: None,
            criteria: PassCriteria { min_cascades: Some(10), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "LOW_FPS", label: "Idle at 20 fps", category: "baseline",
            seconds: 60.0, fps: 20.0, frame_jitter: 0.2,
            config: default_config, pointer_path: Some(pointer_absent), scroll_curve: None,
            criteria: PassCriteria { min_cascades: Some(10), ..Default::default() },
            setup: None, mid_event: None },

        // ─── Pointer ────────────────────────────────────────────────────────
        Scenario { name: "POINTER_PARKED", label: "Pointer Parked at Center", category: "pointer",
            seconds: 30.0, fps: 60.0, frame_jitter: 0.1,
            config: default_config, pointer_path: None, scroll_curve: None,
            criteria: PassCriteria::default(),
            setup: None, mid_event: None },
        Scenario { name: "POINTER_ORBIT", label: "Pointer Orbiting", category: "pointer",
            seconds: 30.0, fps: 60.0, frame_jitter: 0.1,
            config: default_config, pointer_path: Some(pointer_orbit), scroll_curve: None,
            criteria: PassCriteria { min_peak_displacement: Some(0.01), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "POINTER_LEAVE", label: "Sweep Then Leave (Spring Return)", category: "pointer",
            seconds: 45.0, fps: 60.0, frame_jitter: 0.1,
            config: default_config, pointer_path: Some(pointer_sweep_then_leave), scroll_curve: None,
            criteria: PassCriteria {
                min_peak_displacement: Some(0.01),
                max_final_displacement: Some(1e-3),
                ..Default::default()
            },
            setup: None, mid_event: None },
        Scenario { name: "POINTER_JITTER", label: "Pointer Flicker", category: "pointer",
            seconds: 20.0, fps: 60.0, frame_jitter: 0.3,
            config: default_config, pointer_path: Some(pointer_jitter), scroll_curve: None,
            criteria: PassCriteria::default(),
            setup: None, mid_event: None },

        // ─── Scroll ─────────────────────────────────────────────────────────
        Scenario { name: "SCROLL_OUT", label: "Scroll Past Hero", category: "scroll",
            seconds: 15.0, fps: 60.0, frame_jitter: 0.1,
            config: default_config, pointer_path: None, scroll_curve: Some(scroll_ramp),
            criteria: PassCriteria { final_scale: Some(0.78), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "SCROLL_OVERSHOOT", label: "Scroll Rubber-Banding", category: "scroll",
            seconds: 15.0, fps: 60.0, frame_jitter: 0.1,
            config: default_config, pointer_path: None, scroll_curve: Some(scroll_overshoot),
            criteria: PassCriteria::default(),
            setup: None, mid_event: None },

        // ─── Topology ───────────────────────────────────────────────────────
        Scenario { name: "DENSE_FIELD", label: "200-Node Field", category: "topology",
            seconds: 30.0, fps: 60.0, frame_jitter: 0.1,
            config: dense_config, pointer_path: Some(pointer_orbit), scroll_curve: None,
            criteria: PassCriteria { min_cascades: Some(5), min_packets_spawned: Some(50), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "NO_EDGES", label: "Isolated Nodes", category: "topology",
            seconds: 30.0, fps: 60.0, frame_jitter: 0.1,
            config: no_edges_config, pointer_path: Some(pointer_orbit), scroll_curve: None,
            criteria: PassCriteria { min_cascades: Some(5), max_packets_spawned: Some(0), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "SINGLE_NODE", label: "Single Node", category: "topology",
            seconds: 20.0, fps: 60.0, frame_jitter: 0.1,
            config: single_node_config, pointer_path: Some(pointer_orbit), scroll_curve: None,
            criteria: PassCriteria { max_packets_spawned: Some(0), ..Default::default() },
            setup: None, mid_event: None },

        // ─── Cascade / Packet Stress ────────────────────────────────────────
        Scenario { name: "ECHO_STORM", label: "Echo Storm", category: "stress",
            seconds: 30.0, fps: 60.0, frame_jitter: 0.1,
            config: echo_storm_config, pointer_path: None, scroll_curve: None,
            criteria: PassCriteria { min_cascades: Some(100), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "SLOW_DECAY", label: "Near-Unit Decay Saturation", category: "stress",
            seconds: 30.0, fps: 60.0, frame_jitter: 0.1,
            config: slow_decay_config, pointer_path: None, scroll_curve: None,
            criteria: PassCriteria::default(),
            setup: None, mid_event: None },
        Scenario { name: "TIGHT_POOL", label: "Packet Pool of Two", category: "stress",
            seconds: 20.0, fps: 60.0, frame_jitter: 0.1,
            config: tight_pool_config, pointer_path: None, scroll_curve: None,
            criteria: PassCriteria { min_packets_spawned: Some(2), ..Default::default() },
            setup: None, mid_event: None },
        Scenario { name: "FIRE_EVERY_NODE", label: "Manual Fire on Every Node", category: "stress",
            seconds: 10.0, fps: 60.0, frame_jitter: 0.0,
            config: default_config, pointer_path: None, scroll_curve: None,
            criteria: PassCriteria { min_cascades: Some(62), ..Default::default() },
            setup: None,
            mid_event: Some(Box::new(|sim: &mut HeroSimulation, frame: u64| {
                if frame == 120 {
                    for node in 0..sim.field().len() {
                        sim.fire_at(node);
                    }
                }
            })) },

        // ─── Lifecycle ──────────────────────────────────────────────────────
        Scenario { name: "RESIZE_CHURN", label: "Viewport Resize Churn", category: "lifecycle",
            seconds: 20.0, fps: 60.0, frame_jitter: 0.1,
            config: default_config, pointer_path: Some(pointer_orbit), scroll_curve: None,
            criteria: PassCriteria::default(),
            setup: None,
            mid_event: Some(Box::new(|sim: &mut HeroSimulation, frame: u64| {
                if frame % 30 == 0 {
                    let k = (frame / 30) % 4;
                    match k {
                        0 => { sim.apply_viewport(1600.0, 900.0); }
                        1 => { sim.apply_viewport(390.0, 844.0); }
                        2 => { sim.apply_viewport(0.0, 844.0); }
                        _ => { sim.apply_viewport(2560.0, 1080.0); }
                    }
                }
            })) },
        Scenario { name: "TEARDOWN_MIDWAY", label: "Teardown at Frame 600", category: "lifecycle",
            seconds: 20.0, fps: 60.0, frame_jitter: 0.0,
            config: echo_storm_config, pointer_path: None, scroll_curve: None,
            criteria: PassCriteria { final_frame: Some(600), ..Default::default() },
            setup: None,
            mid_event: Some(Box::new(|sim: &mut HeroSimulation, frame: u64| {
                if frame == 600 {
                    sim.shutdown();
                }
            })) },
        Scenario { name: "RESET_MIDWAY", label: "Reset at Frame 300", category: "lifecycle",
            seconds: 20.0, fps: 60.0, frame_jitter: 0.0,
            config: default_config, pointer_path: Some(pointer_orbit), scroll_curve: None,
            criteria: PassCriteria { min_cascades: Some(2), ..Default::default() },
            setup: Some(Box::new(|sim: &mut HeroSimulation| {
                sim.schedule_fire(1.0, Some(0));
            })),
            mid_event: Some(Box::new(|sim: &mut HeroSimulation, frame: u64| {
                if frame == 300 {
                    sim.restart();
                }
            })) },
    ]
}
