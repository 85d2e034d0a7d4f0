// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Cascade Engine
//
// Breadth-first excitation over the static graph. Each cascade owns its own
// visited set and frontier; many can run at once and only meet through the
// max-combine on node excitation. Delayed fires sit in a min-heap keyed by
// trigger time and are drained by the frame driver.

use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::config::CascadeParams;
use crate::field::{Graph, NodeField};
use crate::types::HopOutcome;

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Cascade {
    visited: HashSet<usize>,
    frontier: Vec<usize>,
    last_hop_time: f64,
    hop_count: u32,
    max_hop: u32,
}

impl Cascade {
    /// Fire `start` at full excitation and open a cascade rooted there.
    pub fn spawn(start: usize, now: f64, max_hop: u32, field: &mut NodeField) -> Self {
        if let Some(e) = field.excitation.get_mut(start) {
            *e = 1.0;
        }
        let mut visited = HashSet::new();
        visited.insert(start);
        Self {
            visited,
            frontier: vec![start],
            last_hop_time: now,
            hop_count: 0,
            max_hop,
        }
    }

    /// Spread one ring outward once `hop_delay` has elapsed since the last hop.
    pub fn hop(
        &mut self,
        now: f64,
        graph: &Graph,
        field: &mut NodeField,
        params: &CascadeParams,
    ) -> HopOutcome {
        if now - self.last_hop_time < params.hop_delay {
            return HopOutcome::Waiting;
        }

        let mut next = Vec::new();
        for &node in &self.frontier {
            for &neighbor in graph.neighbors(node) {
                if self.visited.insert(neighbor) {
                    field.excite(neighbor, params.hop_excitation);
                    next.push(neighbor);
                }
            }
        }

        self.frontier = next;
        self.last_hop_time = now;
        self.hop_count += 1;

        if self.frontier.is_empty() || self.hop_count >= self.max_hop {
            HopOutcome::Terminated
        } else {
            HopOutcome::Advanced
        }
    }

    pub fn visited(&self) -> &HashSet<usize> {
        &self.visited
    }

    pub fn frontier(&self) -> &[usize] {
        &self.frontier
    }

    pub fn hop_count(&self) -> u32 {
        self.hop_count
    }

    pub fn max_hop(&self) -> u32 {
        self.max_hop
    }

    pub fn last_hop_time(&self) -> f64 {
        self.last_hop_time
    }
}

// ---------------------------------------------------------------------------
// Scheduled fires (min-heap on trigger time)
// ---------------------------------------------------------------------------

/// A one-shot delayed cascade spawn. `start == None` picks a random node.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledFire {
    pub at: f64,
    pub start: Option<usize>,
    seq: u64,
}

impl Ord for ScheduledFire {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the earliest trigger; FIFO on ties.
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledFire {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledFire {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledFire {}

// ---------------------------------------------------------------------------
// CascadeEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CascadeEngine {
    active: Vec<Cascade>,
    schedule: BinaryHeap<ScheduledFire>,
    next_auto_fire: f64,
    seq: u64,
    spawned: u64,
    finished: u64,
}

impl Default for CascadeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CascadeEngine {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            schedule: BinaryHeap::new(),
            // First frame always fires.
            next_auto_fire: f64::NEG_INFINITY,
            seq: 0,
            spawned: 0,
            finished: 0,
        }
    }

    /// Start a cascade now. Returns the start node, or `None` when the field
    /// is empty or `start` is out of range.
    pub fn fire<R: Rng + ?Sized>(
        &mut self,
        start: Option<usize>,
        now: f64,
        field: &mut NodeField,
        params: &CascadeParams,
        rng: &mut R,
    ) -> Option<usize> {
        if field.is_empty() {
            return None;
        }
        let node = match start {
            Some(i) if i < field.len() => i,
            Some(_) => return None,
            None => rng.gen_range(0..field.len()),
        };
        let max_hop = rng.gen_range(params.max_hop_min..=params.max_hop_max);
        self.active.push(Cascade::spawn(node, now, max_hop, field));
        self.spawned += 1;
        Some(node)
    }

    /// Queue a fire for `at` seconds on the frame clock.
    pub fn schedule(&mut self, at: f64, start: Option<usize>) {
        self.seq += 1;
        self.schedule.push(ScheduledFire {
            at,
            start,
            seq: self.seq,
        });
    }

    /// Auto-fire timer plus every scheduled fire that has come due.
    /// Returns how many cascades were spawned.
    pub fn update_timers<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        field: &mut NodeField,
        params: &CascadeParams,
        rng: &mut R,
    ) -> usize {
        let mut spawned = 0;

        if now >= self.next_auto_fire {
            if self.fire(None, now, field, params, rng).is_some() {
                spawned += 1;
            }
            self.next_auto_fire = now + params.fire_interval_min + rng.gen::<f64>() * params.fire_interval_jitter;
            if rng.gen_bool(params.echo_probability) {
                let delay = params.echo_delay_min + rng.gen::<f64>() * params.echo_delay_jitter;
                self.schedule(now + delay, None);
            }
        }

        while let Some(due) = self.schedule.peek().copied() {
            if due.at > now {
                break;
            }
            self.schedule.pop();
            if self.fire(due.start, now, field, params, rng).is_some() {
                spawned += 1;
            }
        }
        spawned
    }

    /// Hop every active cascade and drop the ones that terminated.
    /// Returns how many finished this frame.
    pub fn process_hops(
        &mut self,
        now: f64,
        graph: &Graph,
        field: &mut NodeField,
        params: &CascadeParams,
    ) -> usize {
        let mut finished = 0;
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].hop(now, graph, field, params).is_terminal() {
                self.active.swap_remove(i);
                finished += 1;
            } else {
                i += 1;
            }
        }
        self.finished += finished as u64;
        finished
    }

    /// Abandon every pending delayed fire. Returns how many were dropped.
    pub fn cancel_scheduled(&mut self) -> usize {
        let dropped = self.schedule.len();
        self.schedule.clear();
        dropped
    }

    pub fn active(&self) -> &[Cascade] {
        &self.active
    }

    pub fn scheduled_len(&self) -> usize {
        self.schedule.len()
    }

    pub fn next_auto_fire(&self) -> f64 {
        self.next_auto_fire
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn finished(&self) -> u64 {
        self.finished
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn field(n: usize) -> NodeField {
        NodeField::from_base(vec![Vec3::ZERO; n], vec![])
    }

    /// 0 -> {1, 2}, 1 -> {3}
    fn diamond() -> Graph {
        Graph::from_pairs(4, &[(0, 1), (0, 2), (1, 3)])
    }

    fn sorted(set: &HashSet<usize>) -> Vec<usize> {
        let mut v: Vec<usize> = set.iter().copied().collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_spawn_sets_full_excitation() {
        let mut f = field(4);
        let c = Cascade::spawn(2, 1.0, 8, &mut f);
        assert_eq!(f.excitation()[2], 1.0);
        assert_eq!(c.frontier(), &[2]);
        assert_eq!(sorted(c.visited()), vec![2]);
        assert_eq!(c.hop_count(), 0);
        assert_eq!(c.last_hop_time(), 1.0);
    }

    #[test]
    fn test_hop_waits_for_delay() {
        let params = CascadeParams::default();
        let graph = diamond();
        let mut f = field(4);
        let mut c = Cascade::spawn(0, 0.0, 8, &mut f);
        assert_eq!(c.hop(0.1, &graph, &mut f, &params), HopOutcome::Waiting);
        assert_eq!(c.hop_count(), 0);
        assert_eq!(f.excitation()[1], 0.0);
    }

    #[test]
    fn test_breadth_first_scenario() {
        let params = CascadeParams::default();
        let graph = diamond();
        let mut f = field(4);
        let mut c = Cascade::spawn(0, 0.0, 8, &mut f);

        assert_eq!(c.hop(0.3, &graph, &mut f, &params), HopOutcome::Advanced);
        assert_eq!(sorted(c.visited()), vec![0, 1, 2]);
        assert_eq!(c.frontier(), &[1, 2]);
        assert_eq!(f.excitation()[1], 0.88);
        assert_eq!(f.excitation()[2], 0.88);

        assert_eq!(c.hop(0.6, &graph, &mut f, &params), HopOutcome::Advanced);
        assert_eq!(sorted(c.visited()), vec![0, 1, 2, 3]);
        assert_eq!(c.frontier(), &[3]);

        assert_eq!(c.hop(0.9, &graph, &mut f, &params), HopOutcome::Terminated);
        assert!(c.frontier().is_empty());
        assert_eq!(c.hop_count(), 3);
    }

    #[test]
    fn test_hop_budget_terminates() {
        let params = CascadeParams::default();
        // Path 0-1-2-3-4-5
        let graph = Graph::from_pairs(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        let mut f = field(6);
        let mut c = Cascade::spawn(0, 0.0, 2, &mut f);
        assert_eq!(c.hop(1.0, &graph, &mut f, &params), HopOutcome::Advanced);
        assert_eq!(c.hop(2.0, &graph, &mut f, &params), HopOutcome::Terminated);
        assert_eq!(sorted(c.visited()), vec![0, 1, 2]);
        assert_eq!(f.excitation()[3], 0.0);
    }

    #[test]
    fn test_hop_never_lowers_hotter_node() {
        let params = CascadeParams::default();
        let graph = diamond();
        let mut f = field(4);
        f.excite(1, 1.0);
        let mut c = Cascade::spawn(0, 0.0, 8, &mut f);
        c.hop(0.3, &graph, &mut f, &params);
        assert_eq!(f.excitation()[1], 1.0);
        assert_eq!(f.excitation()[2], 0.88);
    }

    #[test]
    fn test_isolated_start_terminates_on_first_hop() {
        let params = CascadeParams::default();
        let graph = Graph::from_pairs(3, &[]);
        let mut f = field(3);
        let mut c = Cascade::spawn(1, 0.0, 8, &mut f);
        assert_eq!(c.hop(0.3, &graph, &mut f, &params), HopOutcome::Terminated);
    }

    #[test]
    fn test_scheduled_fires_pop_earliest_first() {
        let mut heap = BinaryHeap::new();
        for (seq, at) in [3.0, 1.0, 2.0, 1.0].into_iter().enumerate() {
            heap.push(ScheduledFire {
                at,
                start: Some(seq),
                seq: seq as u64,
            });
        }
        let order: Vec<Option<usize>> = std::iter::from_fn(|| heap.pop().map(|f| f.start)).collect();
        assert_eq!(order, vec![Some(1), Some(3), Some(2), Some(0)]);
    }

    #[test]
    fn test_first_update_fires_immediately() {
        let params = CascadeParams::default();
        let mut engine = CascadeEngine::new();
        let mut f = field(10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(engine.update_timers(0.0, &mut f, &params, &mut rng), 1);
        assert_eq!(engine.active().len(), 1);
        let next = engine.next_auto_fire();
        assert!(next >= 2.4 && next <= 4.2, "next auto fire at {}", next);
        let m = engine.active()[0].max_hop();
        assert!((8..=13).contains(&m));
    }

    #[test]
    fn test_auto_fire_respects_interval() {
        let params = CascadeParams::default();
        let mut engine = CascadeEngine::new();
        let mut f = field(10);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        engine.update_timers(0.0, &mut f, &params, &mut rng);
        engine.cancel_scheduled();
        assert_eq!(engine.update_timers(2.0, &mut f, &params, &mut rng), 0);
        assert_eq!(engine.spawned(), 1);
    }

    #[test]
    fn test_echo_always_scheduled_at_probability_one() {
        let params = CascadeParams {
            echo_probability: 1.0,
            ..CascadeParams::default()
        };
        let mut engine = CascadeEngine::new();
        let mut f = field(10);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        engine.update_timers(0.0, &mut f, &params, &mut rng);
        assert_eq!(engine.scheduled_len(), 1);

        // Echo delay is at least 0.7s.
        assert_eq!(engine.update_timers(0.69, &mut f, &params, &mut rng), 0);
        assert_eq!(engine.scheduled_len(), 1);
        assert_eq!(engine.update_timers(1.6, &mut f, &params, &mut rng), 1);
        assert_eq!(engine.scheduled_len(), 0);
        assert_eq!(engine.spawned(), 2);
    }

    #[test]
    fn test_echo_never_scheduled_at_probability_zero() {
        let params = CascadeParams {
            echo_probability: 0.0,
            ..CascadeParams::default()
        };
        let mut engine = CascadeEngine::new();
        let mut f = field(10);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        engine.update_timers(0.0, &mut f, &params, &mut rng);
        assert_eq!(engine.scheduled_len(), 0);
    }

    #[test]
    fn test_explicit_schedule_targets_node() {
        let params = CascadeParams::default();
        let mut engine = CascadeEngine::new();
        let mut f = field(5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        engine.update_timers(0.0, &mut f, &params, &mut rng);
        engine.cancel_scheduled();
        engine.schedule(1.0, Some(4));
        engine.update_timers(1.0, &mut f, &params, &mut rng);
        assert!(engine.active().iter().any(|c| c.frontier() == [4]));
        assert_eq!(f.excitation()[4], 1.0);
    }

    #[test]
    fn test_fire_out_of_range_ignored() {
        let params = CascadeParams::default();
        let mut engine = CascadeEngine::new();
        let mut f = field(3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(engine.fire(Some(3), 0.0, &mut f, &params, &mut rng), None);
        assert!(engine.active().is_empty());
    }

    #[test]
    fn test_fire_on_empty_field_is_noop() {
        let params = CascadeParams::default();
        let mut engine = CascadeEngine::new();
        let mut f = field(0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(engine.update_timers(0.0, &mut f, &params, &mut rng), 0);
        assert!(engine.active().is_empty());
    }

    #[test]
    fn test_concurrent_cascades_are_independent() {
        let params = CascadeParams::default();
        let graph = diamond();
        let mut engine = CascadeEngine::new();
        let mut f = field(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        engine.fire(Some(0), 0.0, &mut f, &params, &mut rng);
        engine.fire(Some(3), 0.1, &mut f, &params, &mut rng);

        // Only the first is due.
        engine.process_hops(0.3, &graph, &mut f, &params);
        assert_eq!(engine.active().len(), 2);
        engine.process_hops(0.4, &graph, &mut f, &params);
        for c in engine.active() {
            assert!(c.hop_count() == 1);
        }
    }

    #[test]
    fn test_process_hops_drops_terminated() {
        let params = CascadeParams::default();
        let graph = diamond();
        let mut engine = CascadeEngine::new();
        let mut f = field(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        engine.fire(Some(0), 0.0, &mut f, &params, &mut rng);
        let mut t = 0.0;
        let mut total = 0;
        for _ in 0..5 {
            t += 0.3;
            total += engine.process_hops(t, &graph, &mut f, &params);
        }
        assert_eq!(total, 1);
        assert!(engine.active().is_empty());
        assert_eq!(engine.finished(), 1);
    }
}
