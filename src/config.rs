// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Configuration
//
// Every tuned constant of the hero scene lives here. `SimConfig::default()`
// reproduces the shipped look; partial JSON documents override only the
// fields they name.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("malformed configuration document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("node count must be at least 1")]
    EmptyField,
    #[error("shell radius range [{min}, {max}] is invalid")]
    InvalidShell { min: f32, max: f32 },
    #[error("{field} must lie in {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f64,
    },
    #[error("max hop range {min}..={max} is inverted")]
    InvalidHopRange { min: u32, max: u32 },
    #[error("packet capacity must be at least 1")]
    ZeroPacketCapacity,
    #[error("viewport {width}x{height} must be positive and finite")]
    InvalidViewport { width: f32, height: f32 },
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Node field generation: point cloud shape and edge threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub node_count: usize,
    pub shell_min_radius: f32,
    pub shell_max_radius: f32,
    /// Applied to the y coordinate to give the cloud its oblate shape.
    pub flatten: f32,
    pub scale_min: f32,
    pub scale_max: f32,
    /// Pairs closer than this at generation time are connected.
    pub max_edge_distance: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            node_count: 62,
            shell_min_radius: 3.0,
            shell_max_radius: 7.0,
            flatten: 0.6,
            scale_min: 0.7,
            scale_max: 1.3,
            max_edge_distance: 3.1,
        }
    }
}

/// Spring and repulsion constants for the explicit Euler step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    pub spring_k: f32,
    pub damping: f32,
    pub repel_radius: f32,
    pub repel_force: f32,
    /// Weight of dz² in the repulsor distance metric.
    pub depth_metric: f32,
    /// Share of the repulsion push applied along z.
    pub depth_push: f32,
    /// Squared distances below this skip the repulsion term.
    pub epsilon_sq: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            spring_k: 0.022,
            damping: 0.87,
            repel_radius: 3.8,
            repel_force: 0.09,
            depth_metric: 0.25,
            depth_push: 0.3,
            epsilon_sq: 0.001,
        }
    }
}

/// Cascade propagation, excitation decay and the auto-fire timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeParams {
    /// Seconds between hops of a single cascade.
    pub hop_delay: f64,
    /// Excitation floor applied to newly reached neighbors.
    pub hop_excitation: f32,
    /// Per-frame multiplicative excitation decay.
    pub decay: f32,
    pub max_hop_min: u32,
    pub max_hop_max: u32,
    pub fire_interval_min: f64,
    pub fire_interval_jitter: f64,
    /// Chance that an auto-fire schedules a second, delayed fire.
    pub echo_probability: f64,
    pub echo_delay_min: f64,
    pub echo_delay_jitter: f64,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            hop_delay: 0.26,
            hop_excitation: 0.88,
            decay: 0.952,
            max_hop_min: 8,
            max_hop_max: 13,
            fire_interval_min: 2.4,
            fire_interval_jitter: 1.8,
            echo_probability: 0.4,
            echo_delay_min: 0.7,
            echo_delay_jitter: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketParams {
    pub capacity: usize,
    /// Minimum seconds between two spawns.
    pub spawn_interval: f64,
    pub speed_min: f32,
    pub speed_jitter: f32,
}

impl Default for PacketParams {
    fn default() -> Self {
        Self {
            capacity: 22,
            spawn_interval: 0.32,
            speed_min: 0.008,
            speed_jitter: 0.013,
        }
    }
}

/// Viewport-to-simulation mapping. These are visual tuning values, not a
/// derived projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerParams {
    pub rotation_scale_x: f32,
    pub rotation_scale_y: f32,
    pub network_scale_x: f32,
    pub network_scale_y: f32,
    pub smoothing: f32,
}

impl Default for PointerParams {
    fn default() -> Self {
        Self {
            rotation_scale_x: 0.5,
            rotation_scale_y: 0.3,
            network_scale_x: 9.0,
            network_scale_y: 6.0,
            smoothing: 0.04,
        }
    }
}

/// Whole-scene transform, camera, starfield and lighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub drift_rate: f32,
    pub tilt: f32,
    /// Scale lost at full scroll progress.
    pub scroll_shrink: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_distance: f32,
    pub camera_sway_x: f32,
    pub camera_sway_y: f32,
    pub camera_rate_x: f32,
    pub camera_rate_y: f32,
    pub star_count: usize,
    pub star_min_radius: f32,
    pub star_max_radius: f32,
    pub star_spin_y: f32,
    pub star_spin_x: f32,
    pub key_light_base: f32,
    pub key_light_swing: f32,
    pub key_light_rate: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            drift_rate: 0.038,
            tilt: 0.5,
            scroll_shrink: 0.22,
            fov_degrees: 56.0,
            near: 0.1,
            far: 200.0,
            camera_distance: 12.0,
            camera_sway_x: 0.5,
            camera_sway_y: 0.3,
            camera_rate_x: 0.07,
            camera_rate_y: 0.05,
            star_count: 400,
            star_min_radius: 18.0,
            star_max_radius: 46.0,
            star_spin_y: 0.008,
            star_spin_x: 0.005,
            key_light_base: 4.5,
            key_light_swing: 0.8,
            key_light_rate: 0.9,
        }
    }
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub field: FieldParams,
    pub physics: PhysicsParams,
    pub cascade: CascadeParams,
    pub packets: PacketParams,
    pub pointer: PointerParams,
    pub scene: SceneParams,
    /// Write lifecycle events to the host console.
    pub log_events: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field: FieldParams::default(),
            physics: PhysicsParams::default(),
            cascade: CascadeParams::default(),
            packets: PacketParams::default(),
            pointer: PointerParams::default(),
            scene: SceneParams::default(),
            log_events: true,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(doc)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.field;
        if f.node_count == 0 {
            return Err(ConfigError::EmptyField);
        }
        if !(f.shell_min_radius >= 0.0 && f.shell_min_radius <= f.shell_max_radius) {
            return Err(ConfigError::InvalidShell {
                min: f.shell_min_radius,
                max: f.shell_max_radius,
            });
        }
        check_range("field.scale_min", "(0, scale_max]", f.scale_min as f64, 0.0, f.scale_max as f64, false)?;

        let p = &self.physics;
        check_range("physics.damping", "(0, 1)", p.damping as f64, 0.0, 1.0, true)?;
        check_range("physics.spring_k", "(0, 1)", p.spring_k as f64, 0.0, 1.0, true)?;

        let c = &self.cascade;
        check_range("cascade.decay", "(0, 1)", c.decay as f64, 0.0, 1.0, true)?;
        check_range("cascade.hop_excitation", "(0, 1]", c.hop_excitation as f64, 0.0, 1.0, false)?;
        if !(0.0..=1.0).contains(&c.echo_probability) {
            return Err(ConfigError::OutOfRange {
                field: "cascade.echo_probability",
                range: "[0, 1]",
                value: c.echo_probability,
            });
        }
        check_non_negative("cascade.fire_interval_min", c.fire_interval_min)?;
        check_non_negative("cascade.fire_interval_jitter", c.fire_interval_jitter)?;
        check_non_negative("cascade.echo_delay_min", c.echo_delay_min)?;
        check_non_negative("cascade.echo_delay_jitter", c.echo_delay_jitter)?;
        if !(c.hop_delay > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "cascade.hop_delay",
                range: "(0, inf)",
                value: c.hop_delay,
            });
        }
        if c.max_hop_min > c.max_hop_max {
            return Err(ConfigError::InvalidHopRange {
                min: c.max_hop_min,
                max: c.max_hop_max,
            });
        }

        let k = &self.packets;
        if k.capacity == 0 {
            return Err(ConfigError::ZeroPacketCapacity);
        }
        check_non_negative("packets.spawn_interval", k.spawn_interval)?;
        // A zero-speed packet never reaches its endpoint and never frees its slot.
        if !(k.speed_min > 0.0 && k.speed_min.is_finite()) {
            return Err(ConfigError::OutOfRange {
                field: "packets.speed_min",
                range: "(0, inf)",
                value: k.speed_min as f64,
            });
        }
        check_non_negative("packets.speed_jitter", k.speed_jitter as f64)?;
        check_range("pointer.smoothing", "(0, 1]", self.pointer.smoothing as f64, 0.0, 1.0, false)?;
        Ok(())
    }
}

/// Lower bound is always exclusive; `open_upper` makes the upper one exclusive too.
fn check_range(
    field: &'static str,
    range: &'static str,
    value: f64,
    lo: f64,
    hi: f64,
    open_upper: bool,
) -> Result<(), ConfigError> {
    let upper_ok = if open_upper { value < hi } else { value <= hi };
    if value > lo && upper_ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, range, value })
    }
}

/// Durations, jitters and rates: finite and `>= 0`. Rejects NaN.
fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, range: "[0, inf)", value })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
