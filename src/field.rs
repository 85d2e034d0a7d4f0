// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Node Field Generator
//
// Builds the fixed node cloud and its static adjacency graph once at startup.
// Node arrays are stored column-wise and owned by the simulation aggregate;
// every later step borrows them.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::FieldParams;
use crate::types::{Edge, NodeSnapshot};

/// Excitation below this is flushed to exactly zero after decay.
pub const EXCITATION_FLOOR: f32 = 1e-4;

// ---------------------------------------------------------------------------
// NodeField
// ---------------------------------------------------------------------------

/// Per-node state. Index `i` in every array refers to the same node.
#[derive(Debug, Clone)]
pub struct NodeField {
    pub(crate) base: Vec<Vec3>,
    pub(crate) position: Vec<Vec3>,
    pub(crate) velocity: Vec<Vec3>,
    pub(crate) excitation: Vec<f32>,
    pub(crate) base_scale: Vec<f32>,
}

impl NodeField {
    /// Sample `params.node_count` nodes on a jittered, flattened sphere shell.
    pub fn generate<R: Rng + ?Sized>(params: &FieldParams, rng: &mut R) -> Self {
        let n = params.node_count;
        let mut base = Vec::with_capacity(n);
        let mut base_scale = Vec::with_capacity(n);
        for _ in 0..n {
            base.push(sample_shell(
                rng,
                params.shell_min_radius,
                params.shell_max_radius,
                params.flatten,
            ));
            base_scale.push(params.scale_min + rng.gen::<f32>() * (params.scale_max - params.scale_min));
        }
        Self::from_base(base, base_scale)
    }

    /// Build a field at rest from explicit positions. Missing scales default to 1.0.
    pub fn from_base(base: Vec<Vec3>, mut base_scale: Vec<f32>) -> Self {
        let n = base.len();
        base_scale.resize(n, 1.0);
        Self {
            position: base.clone(),
            velocity: vec![Vec3::ZERO; n],
            excitation: vec![0.0; n],
            base,
            base_scale,
        }
    }

    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn base_positions(&self) -> &[Vec3] {
        &self.base
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.position
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocity
    }

    pub fn excitation(&self) -> &[f32] {
        &self.excitation
    }

    pub fn base_scales(&self) -> &[f32] {
        &self.base_scale
    }

    /// Move a node away from rest without touching its base position.
    pub fn displace(&mut self, index: usize, offset: Vec3) {
        if let Some(p) = self.position.get_mut(index) {
            *p += offset;
        }
    }

    /// Raise a node's excitation to at least `level`; never lowers it.
    pub fn excite(&mut self, index: usize, level: f32) {
        if let Some(e) = self.excitation.get_mut(index) {
            *e = e.max(level.clamp(0.0, 1.0));
        }
    }

    /// Multiplicative decay applied to every node once per frame.
    pub fn decay_excitation(&mut self, factor: f32) {
        for e in self.excitation.iter_mut() {
            *e *= factor;
            if *e < EXCITATION_FLOOR {
                *e = 0.0;
            }
        }
    }

    pub fn snapshot(&self, graph: &Graph) -> Vec<NodeSnapshot> {
        (0..self.len())
            .map(|i| NodeSnapshot {
                index: i,
                base_position: self.base[i],
                position: self.position[i],
                velocity: self.velocity[i],
                excitation: self.excitation[i],
                base_scale: self.base_scale[i],
                degree: graph.degree(i),
            })
            .collect()
    }
}

/// Uniform direction, radius uniform in `[min, max)`, y scaled by `flatten`.
pub fn sample_shell<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32, flatten: f32) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    let r = min + rng.gen::<f32>() * (max - min);
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin() * flatten,
        r * phi.cos(),
    )
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Static edge set plus a per-node neighbor list derived from it.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    edges: Vec<Edge>,
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Connect every pair whose distance is strictly below `max_distance`.
    pub fn from_positions(points: &[Vec3], max_distance: f32) -> Self {
        let limit_sq = max_distance * max_distance;
        let mut graph = Self::empty(points.len());
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if points[i].distance_squared(points[j]) < limit_sq {
                    graph.link(i, j);
                }
            }
        }
        graph
    }

    /// Build from explicit pairs. Self-loops, duplicates and out-of-range
    /// indices are skipped.
    pub fn from_pairs(node_count: usize, pairs: &[(usize, usize)]) -> Self {
        let mut graph = Self::empty(node_count);
        for &(i, j) in pairs {
            if i < node_count && j < node_count && !graph.contains(i, j) {
                graph.link(i, j);
            }
        }
        graph
    }

    fn empty(node_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
        }
    }

    fn link(&mut self, i: usize, j: usize) {
        if let Some(edge) = Edge::new(i, j) {
            self.edges.push(edge);
            self.adjacency[i].push(j);
            self.adjacency[j].push(i);
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, node: usize) -> usize {
        self.neighbors(node).len()
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.neighbors(i).contains(&j)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edges(&self) -> bool {
        !self.edges.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
