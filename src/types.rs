// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Type Definitions

use glam::Vec3;
use serde::{Deserialize, Serialize};

// ─── Edge ────────────────────────────────────────────────────────────────────

/// Unordered connection between two nodes, stored with `a < b`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
}

impl Edge {
    /// Normalizes the pair so that `a < b`. Returns `None` for self-loops.
    pub fn new(i: usize, j: usize) -> Option<Self> {
        match i.cmp(&j) {
            std::cmp::Ordering::Less => Some(Self { a: i, b: j }),
            std::cmp::Ordering::Greater => Some(Self { a: j, b: i }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

// ─── Cascade lifecycle ───────────────────────────────────────────────────────

/// Result of asking a cascade to hop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HopOutcome {
    /// Hop delay has not elapsed yet.
    Waiting = 0,
    /// Frontier advanced and the cascade stays active.
    Advanced = 1,
    /// Frontier emptied or the hop budget ran out.
    Terminated = 2,
}

impl HopOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

// ─── NodeSnapshot ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub index: usize,
    pub base_position: Vec3,
    pub position: Vec3,
    pub velocity: Vec3,
    pub excitation: f32,
    pub base_scale: f32,
    pub degree: usize,
}

// ─── SceneTransform ──────────────────────────────────────────────────────────

/// Whole-scene values applied after the per-node attributes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SceneTransform {
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub scale: f32,
    pub camera_position: Vec3,
    pub star_rotation_x: f32,
    pub star_rotation_y: f32,
    pub key_light_intensity: f32,
}

impl Default for SceneTransform {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 1.0,
            camera_position: Vec3::ZERO,
            star_rotation_x: 0.0,
            star_rotation_y: 0.0,
            key_light_intensity: 0.0,
        }
    }
}

// ─── FrameStats ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameStats {
    pub frame: u64,
    pub time: f64,
    pub active_cascades: usize,
    pub scheduled_fires: usize,
    pub live_packets: usize,
    /// Nodes with excitation above one half.
    pub hot_nodes: usize,
    pub mean_excitation: f32,
    pub max_excitation: f32,
    pub cascades_spawned: u64,
    pub cascades_finished: u64,
    pub packets_spawned: u64,
    pub packets_retired: u64,
    #[serde(default)]
    pub transform: SceneTransform,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_normalizes_order() {
        assert_eq!(Edge::new(5, 2), Some(Edge { a: 2, b: 5 }));
        assert_eq!(Edge::new(2, 5), Edge::new(5, 2));
    }

    #[test]
    fn test_edge_rejects_self_loop() {
        assert_eq!(Edge::new(3, 3), None);
    }

    #[test]
    fn test_only_terminated_is_terminal() {
        assert!(HopOutcome::Terminated.is_terminal());
        assert!(!HopOutcome::Advanced.is_terminal());
        assert!(!HopOutcome::Waiting.is_terminal());
    }
}
