// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Packet Emitter
//
// Short-lived points sliding along one edge. Endpoints are copied at spawn
// time, so packets never follow the physics afterwards. Storage is a
// fixed-capacity arena with an intrusive free list; spawning past capacity
// is silently refused.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::PI;

use crate::config::PacketParams;
use crate::field::{Graph, NodeField};

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Packet {
    pub from: Vec3,
    pub to: Vec3,
    /// In `[0, 1)` while alive.
    pub progress: f32,
    pub speed: f32,
}

impl Packet {
    pub fn position(&self) -> Vec3 {
        self.from.lerp(self.to, self.progress)
    }

    /// `sin(progress * pi)`: zero at both ends, one at the midpoint.
    pub fn pulse(&self) -> f32 {
        (self.progress * PI).sin().max(0.0)
    }
}

// ---------------------------------------------------------------------------
// PacketPool
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Free { next: Option<usize> },
    Live(Packet),
}

#[derive(Debug, Clone)]
pub struct PacketPool {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    live: usize,
    last_spawn: f64,
    spawned: u64,
    retired: u64,
}

impl PacketPool {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|i| Slot::Free {
                next: if i + 1 < capacity { Some(i + 1) } else { None },
            })
            .collect();
        Self {
            slots,
            free_head: if capacity > 0 { Some(0) } else { None },
            live: 0,
            // The first spawn waits one full interval, like the page load.
            last_spawn: 0.0,
            spawned: 0,
            retired: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn retired(&self) -> u64 {
        self.retired
    }

    /// Live packets in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Live(p) => Some(p),
            Slot::Free { .. } => None,
        })
    }

    /// Put a packet into a free slot. Returns the slot, or `None` at capacity.
    pub fn insert(&mut self, packet: Packet) -> Option<usize> {
        let index = self.free_head?;
        if let Slot::Free { next } = self.slots[index] {
            self.free_head = next;
        }
        self.slots[index] = Slot::Live(packet);
        self.live += 1;
        self.spawned += 1;
        Some(index)
    }

    fn release(&mut self, index: usize) {
        self.slots[index] = Slot::Free {
            next: self.free_head,
        };
        self.free_head = Some(index);
        self.live -= 1;
        self.retired += 1;
    }

    /// Spawn on a random edge once the cadence allows it. No-op when the
    /// graph has no edges or the pool is full.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        graph: &Graph,
        field: &NodeField,
        params: &PacketParams,
        rng: &mut R,
    ) -> Option<usize> {
        if now - self.last_spawn <= params.spawn_interval || self.is_full() || !graph.has_edges() {
            return None;
        }
        let edge = graph.edges()[rng.gen_range(0..graph.edge_count())];
        let packet = Packet {
            from: field.position[edge.a],
            to: field.position[edge.b],
            progress: 0.0,
            speed: params.speed_min + rng.gen::<f32>() * params.speed_jitter,
        };
        let slot = self.insert(packet)?;
        self.last_spawn = now;
        Some(slot)
    }

    /// Move every packet forward and retire the ones that arrived.
    /// Returns how many were retired.
    pub fn advance(&mut self) -> usize {
        let mut retired = 0;
        for i in 0..self.slots.len() {
            let arrived = match &mut self.slots[i] {
                Slot::Live(p) => {
                    p.progress += p.speed;
                    p.progress >= 1.0
                }
                Slot::Free { .. } => false,
            };
            if arrived {
                self.release(i);
                retired += 1;
            }
        }
        retired
    }

    pub fn clear(&mut self) {
        for i in 0..self.slots.len() {
            if matches!(self.slots[i], Slot::Live(_)) {
                self.release(i);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn packet(speed: f32) -> Packet {
        Packet {
            from: Vec3::ZERO,
            to: Vec3::new(2.0, 0.0, 0.0),
            progress: 0.0,
            speed,
        }
    }

    fn line() -> (NodeField, Graph) {
        let field = NodeField::from_base(vec![Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0)], vec![]);
        let graph = Graph::from_positions(field.base_positions(), 10.0);
        (field, graph)
    }

    #[test]
    fn test_position_interpolates() {
        let mut p = packet(0.1);
        p.progress = 0.25;
        assert_eq!(p.position(), Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_pulse_peaks_mid_flight() {
        let mut p = packet(0.1);
        assert_eq!(p.pulse(), 0.0);
        p.progress = 0.5;
        assert!((p.pulse() - 1.0).abs() < 1e-6);
        p.progress = 0.999;
        assert!(p.pulse() < 0.01);
    }

    #[test]
    fn test_insert_refuses_past_capacity() {
        let mut pool = PacketPool::with_capacity(2);
        assert!(pool.insert(packet(0.1)).is_some());
        assert!(pool.insert(packet(0.1)).is_some());
        assert!(pool.is_full());
        assert_eq!(pool.insert(packet(0.1)), None);
        assert_eq!(pool.live(), 2);
    }

    #[test]
    fn test_advance_retires_exactly_on_arrival() {
        let mut pool = PacketPool::with_capacity(4);
        pool.insert(packet(0.25));
        let mut last = 0.0;
        for step in 1..=3 {
            assert_eq!(pool.advance(), 0, "step {}", step);
            let p = pool.iter().next().unwrap().progress;
            assert!(p > last);
            last = p;
        }
        assert_eq!(pool.advance(), 1);
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.advance(), 0);
        assert_eq!(pool.retired(), 1);
    }

    #[test]
    fn test_freed_slots_are_recycled() {
        let mut pool = PacketPool::with_capacity(1);
        assert_eq!(pool.insert(packet(1.0)), Some(0));
        pool.advance();
        assert_eq!(pool.insert(packet(1.0)), Some(0));
        assert_eq!(pool.spawned(), 2);
    }

    #[test]
    fn test_spawn_cadence() {
        let params = PacketParams::default();
        let (field, graph) = line();
        let mut pool = PacketPool::with_capacity(params.capacity);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert!(pool.try_spawn(0.1, &graph, &field, &params, &mut rng).is_none());
        assert!(pool.try_spawn(0.4, &graph, &field, &params, &mut rng).is_some());
        assert!(pool.try_spawn(0.5, &graph, &field, &params, &mut rng).is_none());
        assert!(pool.try_spawn(0.8, &graph, &field, &params, &mut rng).is_some());
        assert_eq!(pool.live(), 2);
    }

    #[test]
    fn test_spawn_snapshots_endpoints() {
        let params = PacketParams::default();
        let (mut field, graph) = line();
        let mut pool = PacketPool::with_capacity(params.capacity);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        pool.try_spawn(1.0, &graph, &field, &params, &mut rng);
        field.displace(1, Vec3::new(5.0, 0.0, 0.0));
        let p = pool.iter().next().unwrap();
        assert_eq!(p.from, Vec3::ZERO);
        assert_eq!(p.to, Vec3::new(1.0, 2.0, 3.0));
        assert!(p.speed >= params.speed_min && p.speed <= params.speed_min + params.speed_jitter);
    }

    #[test]
    fn test_no_edges_is_noop() {
        let params = PacketParams::default();
        let field = NodeField::from_base(vec![Vec3::ZERO, Vec3::ONE], vec![]);
        let graph = Graph::from_positions(field.base_positions(), 0.0);
        let mut pool = PacketPool::with_capacity(params.capacity);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(pool.try_spawn(5.0, &graph, &field, &params, &mut rng).is_none());
        assert_eq!(pool.live(), 0);
    }

    #[test]
    fn test_live_count_never_exceeds_capacity() {
        let params = PacketParams {
            capacity: 3,
            spawn_interval: 0.0,
            ..PacketParams::default()
        };
        let (field, graph) = line();
        let mut pool = PacketPool::with_capacity(params.capacity);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut t = 0.0;
        for _ in 0..500 {
            t += 1.0 / 60.0;
            pool.try_spawn(t, &graph, &field, &params, &mut rng);
            pool.advance();
            assert!(pool.live() <= 3);
        }
        assert_eq!(pool.spawned() - pool.retired(), pool.live() as u64);
    }

    #[test]
    fn test_clear_frees_everything() {
        let mut pool = PacketPool::with_capacity(3);
        pool.insert(packet(0.1));
        pool.insert(packet(0.1));
        pool.clear();
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.iter().count(), 0);
        assert!(pool.insert(packet(0.1)).is_some());
    }
}
