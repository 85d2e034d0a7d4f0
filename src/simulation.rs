// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Simulation Core (Frame Driver)

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

use crate::cascade::CascadeEngine;
use crate::config::{ConfigError, SimConfig};
use crate::field::{Graph, NodeField};
use crate::input::{map_pointer, InputChannel, PointerSmoother};
use crate::packets::PacketPool;
use crate::physics;
use crate::render::{self, FrameBuffers};
use crate::scene::{self, Camera, Starfield};
use crate::types::*;

// ─── HeroSimulation struct ───────────────────────────────────────────────────

/// Owns every array of the hero scene. Each frame step borrows the parts it
/// needs in a fixed order; nothing lives outside this aggregate.
#[wasm_bindgen]
pub struct HeroSimulation {
    pub(crate) config: SimConfig,
    pub(crate) seed: u64,
    pub(crate) rng: ChaCha8Rng,

    pub(crate) field: NodeField,
    pub(crate) graph: Graph,
    pub(crate) cascades: CascadeEngine,
    pub(crate) packets: PacketPool,
    pub(crate) buffers: FrameBuffers,

    pub(crate) input: Arc<InputChannel>,
    pub(crate) smoother: PointerSmoother,
    pub(crate) camera: Camera,
    pub(crate) stars: Starfield,
    pub(crate) transform: SceneTransform,

    pub(crate) frame: u64,
    pub(crate) time: f64,
    pub(crate) running: bool,
    pub(crate) last_repelled: usize,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl HeroSimulation {
    /// Validate `config` and build the scene for a `width` x `height` viewport.
    pub fn from_config(seed: u64, config: SimConfig, width: f32, height: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(ConfigError::InvalidViewport { width, height });
        }
        Ok(Self::build(seed, config, width, height))
    }

    /// Assumes `config` is valid. Unusable viewports fall back to 1x1.
    pub(crate) fn build(seed: u64, config: SimConfig, width: f32, height: f32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let field = NodeField::generate(&config.field, &mut rng);
        let graph = Graph::from_positions(field.base_positions(), config.field.max_edge_distance);
        let stars = Starfield::generate(&config.scene, &mut rng);
        let packets = PacketPool::with_capacity(config.packets.capacity);
        let buffers = FrameBuffers::new(field.len(), graph.edge_count(), packets.capacity());
        let camera = Camera::new(&config.scene, width, height);

        console_log!(
            config.log_events,
            "scene ready: seed={} nodes={} edges={} stars={}",
            seed,
            field.len(),
            graph.edge_count(),
            stars.len()
        );

        let mut sim = Self {
            seed,
            rng,
            field,
            graph,
            cascades: CascadeEngine::new(),
            packets,
            buffers,
            input: Arc::new(InputChannel::new(width, height)),
            smoother: PointerSmoother::default(),
            camera,
            stars,
            transform: SceneTransform::default(),
            frame: 0,
            time: 0.0,
            running: true,
            last_repelled: 0,
            config,
        };
        render::project(&sim.field, &sim.graph, &sim.packets, &mut sim.buffers);
        sim.transform = scene::scene_transform(0.0, Vec2::ZERO, 0.0, &sim.camera, &sim.config.scene);
        sim
    }

    /// Run one frame at frame-clock time `now` (seconds since start).
    /// After teardown this only reports the last stats.
    pub fn tick_core(&mut self, now: f64) -> FrameStats {
        if !self.running {
            return self.frame_stats();
        }
        // The frame clock never runs backwards.
        let now = if now.is_finite() { now.max(self.time) } else { self.time };
        self.time = now;
        let input = self.input.snapshot();

        // 1. Cascade timers, then hops
        self.cascades
            .update_timers(now, &mut self.field, &self.config.cascade, &mut self.rng);
        self.cascades
            .process_hops(now, &self.graph, &mut self.field, &self.config.cascade);

        // 2. Global excitation decay
        self.field.decay_excitation(self.config.cascade.decay);

        // 3. Pointer: smoothed rotation target, raw repulsor
        let targets = input
            .pointer
            .map(|p| map_pointer(p, input.viewport, &self.config.pointer));
        let rotation_target = targets.map(|t| t.rotation).unwrap_or(Vec2::ZERO);
        let smoothed = self
            .smoother
            .step(rotation_target, self.config.pointer.smoothing);

        // 4. Physics
        self.last_repelled = physics::integrate(
            &mut self.field,
            targets.map(|t| t.repulsor),
            &self.config.physics,
        );

        // 5. Packets
        self.packets.try_spawn(
            now,
            &self.graph,
            &self.field,
            &self.config.packets,
            &mut self.rng,
        );
        self.packets.advance();

        // 6. Projection
        render::project(&self.field, &self.graph, &self.packets, &mut self.buffers);

        // 7. Whole-scene transform
        self.camera.update(now, &self.config.scene);
        self.transform = scene::scene_transform(
            now,
            smoothed,
            input.scroll_progress,
            &self.camera,
            &self.config.scene,
        );

        self.frame += 1;
        self.frame_stats()
    }

    /// Fire a cascade at `node` on the current frame clock.
    pub fn fire_at(&mut self, node: usize) -> bool {
        self.cascades
            .fire(Some(node), self.time, &mut self.field, &self.config.cascade, &mut self.rng)
            .is_some()
    }

    /// Queue a cascade at `node` (or a random node) `delay` seconds from now.
    pub fn schedule_fire(&mut self, delay: f64, node: Option<usize>) {
        self.cascades.schedule(self.time + delay.max(0.0), node);
    }

    pub fn frame_stats(&self) -> FrameStats {
        let excitation = self.field.excitation();
        let n = excitation.len().max(1) as f32;
        FrameStats {
            frame: self.frame,
            time: self.time,
            active_cascades: self.cascades.active().len(),
            scheduled_fires: self.cascades.scheduled_len(),
            live_packets: self.packets.live(),
            hot_nodes: excitation.iter().filter(|&&e| e > 0.5).count(),
            mean_excitation: excitation.iter().sum::<f32>() / n,
            max_excitation: excitation.iter().copied().fold(0.0, f32::max),
            cascades_spawned: self.cascades.spawned(),
            cascades_finished: self.cascades.finished(),
            packets_spawned: self.packets.spawned(),
            packets_retired: self.packets.retired(),
            transform: self.transform,
        }
    }

    pub fn node_snapshots(&self) -> Vec<NodeSnapshot> {
        self.field.snapshot(&self.graph)
    }

    /// Stop the frame loop, abandon pending delayed fires and release every
    /// in-flight packet. Returns how many scheduled fires were dropped.
    pub fn shutdown(&mut self) -> usize {
        self.running = false;
        let dropped = self.cascades.cancel_scheduled();
        let released = self.packets.live();
        self.packets.clear();
        render::project(&self.field, &self.graph, &self.packets, &mut self.buffers);
        console_log!(
            self.config.log_events,
            "teardown after {} frames, {} pending fires dropped, {} packets released",
            self.frame,
            dropped,
            released
        );
        dropped
    }

    /// Rebuild from the stored seed and configuration. The input channel
    /// survives so host handles stay connected.
    pub fn restart(&mut self) {
        let input = Arc::clone(&self.input);
        let viewport = input.snapshot().viewport;
        console_log!(self.config.log_events, "reset at frame {}", self.frame);
        *self = Self::build(self.seed, self.config.clone(), viewport.x, viewport.y);
        self.input = input;
    }

    /// Apply a new viewport to both the input mapping and the projection.
    pub fn apply_viewport(&mut self, width: f32, height: f32) -> bool {
        let ok = self.input.set_viewport(width, height) && self.camera.resize(width, height);
        if ok {
            console_log!(self.config.log_events, "resize to {}x{}", width, height);
        } else {
            console_log!(self.config.log_events, "ignored resize to {}x{}", width, height);
        }
        ok
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn field(&self) -> &NodeField {
        &self.field
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn cascades(&self) -> &CascadeEngine {
        &self.cascades
    }

    pub fn packets(&self) -> &PacketPool {
        &self.packets
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn starfield(&self) -> &Starfield {
        &self.stars
    }

    pub fn scene_transform(&self) -> SceneTransform {
        self.transform
    }

    /// Shared handle for hosts that deliver input from their own event loop.
    pub fn input(&self) -> Arc<InputChannel> {
        Arc::clone(&self.input)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn nodes_repelled_last_frame(&self) -> usize {
        self.last_repelled
    }

    /// Test and bench hook: move a node off its rest position.
    pub fn displace_node(&mut self, node: usize, offset: glam::Vec3) {
        self.field.displace(node, offset);
    }
}
