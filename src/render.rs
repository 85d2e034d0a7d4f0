// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Render Projector
//
// Stateless mapping from simulation state to flat attribute buffers. The
// buffers are sized once and overwritten in full every frame, so projecting
// the same state twice yields identical bytes.

use glam::Vec3;

use crate::field::{Graph, NodeField};
use crate::packets::PacketPool;

// Red at the bottom of the cloud, gold at the top.
pub const GRADIENT_LOW: Vec3 = Vec3::new(1.0, 0.17, 0.02);
pub const GRADIENT_HIGH: Vec3 = Vec3::new(1.0, 0.84, 0.04);
const GRADIENT_FLOOR_Y: f32 = -5.0;
const GRADIENT_SPAN_Y: f32 = 10.0;

/// White-gold that excited nodes blend toward.
pub const HOT: Vec3 = Vec3::new(1.0, 0.98, 0.85);
const HALO_TINT: Vec3 = Vec3::new(0.7, 0.5, 0.2);
const LINE_BOOST: Vec3 = Vec3::new(0.6, 0.7, 0.5);

pub const NODE_FLARE: f32 = 1.6;
pub const HALO_FLARE: f32 = 5.0;
const PACKET_SWELL: f32 = 1.8;

// ---------------------------------------------------------------------------
// Mapping functions
// ---------------------------------------------------------------------------

/// Height gradient between the two endpoint colors, clamped at both ends.
pub fn base_color(y: f32) -> Vec3 {
    let t = ((y - GRADIENT_FLOOR_Y) / GRADIENT_SPAN_Y).clamp(0.0, 1.0);
    GRADIENT_LOW.lerp(GRADIENT_HIGH, t)
}

pub fn node_color(y: f32, excitation: f32) -> Vec3 {
    base_color(y).lerp(HOT, excitation)
}

pub fn halo_color(node_color: Vec3) -> Vec3 {
    node_color * HALO_TINT
}

pub fn node_scale(base_scale: f32, excitation: f32) -> f32 {
    base_scale * (1.0 + excitation * NODE_FLARE)
}

pub fn halo_scale(base_scale: f32, excitation: f32) -> f32 {
    base_scale * (1.0 + excitation * HALO_FLARE)
}

/// Midpoint-height gradient brightened by the mean endpoint excitation.
pub fn line_color(mid_y: f32, mean_excitation: f32) -> Vec3 {
    (base_color(mid_y) + LINE_BOOST * mean_excitation).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Red at the ends of the flight, gold burst at the midpoint.
pub fn packet_color(pulse: f32) -> Vec3 {
    Vec3::new(1.0, 0.17 + pulse * 0.67, pulse * 0.1)
}

pub fn packet_scale(pulse: f32) -> f32 {
    1.0 + pulse * PACKET_SWELL
}

// ---------------------------------------------------------------------------
// FrameBuffers
// ---------------------------------------------------------------------------

/// Flat per-attribute float buffers handed to the presentation layer.
/// Packet buffers always span the full pool capacity; only the first
/// `packet_count` entries are meaningful and the rest are zeroed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBuffers {
    pub node_positions: Vec<f32>,
    pub node_colors: Vec<f32>,
    pub node_scales: Vec<f32>,
    pub halo_colors: Vec<f32>,
    pub halo_scales: Vec<f32>,
    pub line_positions: Vec<f32>,
    pub line_colors: Vec<f32>,
    pub packet_positions: Vec<f32>,
    pub packet_colors: Vec<f32>,
    pub packet_scales: Vec<f32>,
    pub packet_count: usize,
}

impl FrameBuffers {
    pub fn new(node_count: usize, edge_count: usize, packet_capacity: usize) -> Self {
        Self {
            node_positions: vec![0.0; node_count * 3],
            node_colors: vec![0.0; node_count * 3],
            node_scales: vec![0.0; node_count],
            halo_colors: vec![0.0; node_count * 3],
            halo_scales: vec![0.0; node_count],
            line_positions: vec![0.0; edge_count * 6],
            line_colors: vec![0.0; edge_count * 6],
            packet_positions: vec![0.0; packet_capacity * 3],
            packet_colors: vec![0.0; packet_capacity * 3],
            packet_scales: vec![0.0; packet_capacity],
            packet_count: 0,
        }
    }
}

fn put3(buf: &mut [f32], index: usize, v: Vec3) {
    buf[index * 3..index * 3 + 3].copy_from_slice(&v.to_array());
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Overwrite `out` with the visual attributes of the current state.
/// `out` must have been sized by `FrameBuffers::new` for the same field,
/// graph and pool.
pub fn project(field: &NodeField, graph: &Graph, packets: &PacketPool, out: &mut FrameBuffers) {
    for i in 0..field.len() {
        let pos = field.position[i];
        let e = field.excitation[i];
        let color = node_color(pos.y, e);
        let scale = field.base_scale[i];

        put3(&mut out.node_positions, i, pos);
        put3(&mut out.node_colors, i, color);
        put3(&mut out.halo_colors, i, halo_color(color));
        out.node_scales[i] = node_scale(scale, e);
        out.halo_scales[i] = halo_scale(scale, e);
    }

    for (k, edge) in graph.edges().iter().enumerate() {
        let pa = field.position[edge.a];
        let pb = field.position[edge.b];
        let mean = (field.excitation[edge.a] + field.excitation[edge.b]) * 0.5;
        let color = line_color((pa.y + pb.y) * 0.5, mean);
        put3(&mut out.line_positions, 2 * k, pa);
        put3(&mut out.line_positions, 2 * k + 1, pb);
        put3(&mut out.line_colors, 2 * k, color);
        put3(&mut out.line_colors, 2 * k + 1, color);
    }

    let mut count = 0;
    for packet in packets.iter() {
        let pulse = packet.pulse();
        put3(&mut out.packet_positions, count, packet.position());
        put3(&mut out.packet_colors, count, packet_color(pulse));
        out.packet_scales[count] = packet_scale(pulse);
        count += 1;
    }
    out.packet_count = count;
    out.packet_positions[count * 3..].fill(0.0);
    out.packet_colors[count * 3..].fill(0.0);
    out.packet_scales[count..].fill(0.0);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
