// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Run i uses scene seed base+i; frame-time jitter comes from a separate stream

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use synapse_engine::physics::max_displacement;
use synapse_engine::*;

use crate::report::*;
use crate::scenarios::{Scenario, VIEWPORT};
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Keeps the frame-clock stream independent of the scene stream.
const CLOCK_STREAM: u64 = 0x5EED_C10C;

/// Per-frame invariant audit over the whole field and pool.
#[derive(Debug, Default)]
struct InvariantAudit {
    excitation_violations: u32,
    capacity_violations: u32,
    non_finite_frames: u32,
}

impl InvariantAudit {
    fn check(&mut self, sim: &HeroSimulation) {
        if sim
            .field()
            .excitation()
            .iter()
            .any(|e| !(0.0..=1.0).contains(e))
        {
            self.excitation_violations += 1;
        }
        let packets = sim.packets();
        if packets.live() > packets.capacity() || sim.buffers().packet_count != packets.live() {
            self.capacity_violations += 1;
        }
        let finite = sim.field().positions().iter().all(|p| p.is_finite())
            && sim.buffers().node_positions.iter().all(|v| v.is_finite())
            && sim.scene_transform().scale.is_finite();
        if !finite {
            self.non_finite_frames += 1;
        }
    }

    fn total(&self) -> u32 {
        self.excitation_violations + self.capacity_violations + self.non_finite_frames
    }
}

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> BenchResult {
    let start = Instant::now();
    let config = (scenario.config)();
    let mut sim = match HeroSimulation::from_config(seed, config, VIEWPORT.0, VIEWPORT.1) {
        Ok(sim) => sim,
        Err(e) => return failed_run(scenario, seed, format!("config rejected: {}", e)),
    };
    let mut clock = ChaCha8Rng::seed_from_u64(seed ^ CLOCK_STREAM);
    let input = sim.input();

    let mut audit = InvariantAudit::default();
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    let mut peak_active_cascades = 0usize;
    let mut peak_live_packets = 0usize;
    let mut peak_hot_nodes = 0usize;
    let mut peak_displacement = 0.0f32;
    let mut excitation_sum = 0.0f64;
    let mut frames = 0u64;
    let mut last = sim.frame_stats();

    if let Some(setup) = &scenario.setup {
        setup(&mut sim);
    }

    let base_dt = 1.0 / scenario.fps;
    let mut now = 0.0f64;
    while now < scenario.seconds {
        if let Some(event) = &scenario.mid_event {
            event(&mut sim, frames);
        }

        if let Some(path) = scenario.pointer_path {
            match path(now) {
                Some((x, y)) => input.set_pointer(x, y),
                None => input.clear_pointer(),
            }
        }
        if let Some(curve) = scenario.scroll_curve {
            input.set_scroll_progress(curve(now));
        }

        let stats = sim.tick_core(now);
        audit.check(&sim);

        let displacement = max_displacement(sim.field());
        peak_displacement = peak_displacement.max(displacement);
        peak_active_cascades = peak_active_cascades.max(stats.active_cascades);
        peak_live_packets = peak_live_packets.max(stats.live_packets);
        peak_hot_nodes = peak_hot_nodes.max(stats.hot_nodes);
        excitation_sum += stats.mean_excitation as f64;

        if let Some(ts) = time_series.as_mut() {
            ts.record(&stats, displacement, sim.nodes_repelled_last_frame());
        }

        last = stats;
        frames += 1;
        let jitter = 1.0 + scenario.frame_jitter * (clock.gen::<f64>() - 0.5);
        now += base_dt * jitter;
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        if let Err(e) = ts.write_jsonl(&path) {
            eprintln!("  Warning: failed to write time series: {}", e);
        }
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);
    let final_displacement = max_displacement(sim.field());

    // ─── Pass/fail ──────────────────────────────────────────────────────
    let mut failures = Vec::new();
    if audit.total() > 0 {
        failures.push(format!(
            "invariants broken: excitation {} / capacity {} / non-finite {} frames",
            audit.excitation_violations, audit.capacity_violations, audit.non_finite_frames
        ));
    }
    let c = &scenario.criteria;
    if let Some(min) = c.min_cascades {
        if last.cascades_spawned < min {
            failures.push(format!("{} cascades < {}", last.cascades_spawned, min));
        }
    }
    if let Some(min) = c.min_packets_spawned {
        if last.packets_spawned < min {
            failures.push(format!("{} packets < {}", last.packets_spawned, min));
        }
    }
    if let Some(max) = c.max_packets_spawned {
        if last.packets_spawned > max {
            failures.push(format!("{} packets > {}", last.packets_spawned, max));
        }
    }
    if let Some(max) = c.max_final_displacement {
        if final_displacement > max {
            failures.push(format!("final displacement {:.2e} > {:.2e}", final_displacement, max));
        }
    }
    if let Some(min) = c.min_peak_displacement {
        if peak_displacement < min {
            failures.push(format!("peak displacement {:.2e} < {:.2e}", peak_displacement, min));
        }
    }
    if let Some(scale) = c.final_scale {
        if (last.transform.scale - scale).abs() > 1e-4 {
            failures.push(format!("final scale {} != {}", last.transform.scale, scale));
        }
    }
    if let Some(frame) = c.final_frame {
        if last.frame != frame {
            failures.push(format!("final frame {} != {}", last.frame, frame));
        }
    }

    BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass: failures.is_empty(),
        failures,
        frames,
        sim_seconds: last.time,
        node_count: sim.field().len(),
        edge_count: sim.graph().edge_count(),
        cascades_spawned: last.cascades_spawned,
        cascades_finished: last.cascades_finished,
        peak_active_cascades,
        packets_spawned: last.packets_spawned,
        packets_retired: last.packets_retired,
        peak_live_packets,
        mean_excitation: excitation_sum / frames.max(1) as f64,
        peak_hot_nodes,
        peak_displacement: peak_displacement as f64,
        final_displacement: final_displacement as f64,
        final_scale: last.transform.scale as f64,
        excitation_violations: audit.excitation_violations,
        capacity_violations: audit.capacity_violations,
        non_finite_frames: audit.non_finite_frames,
        elapsed_ms: elapsed.as_millis(),
        frames_per_sec: frames as f64 / elapsed_secs,
    }
}

fn failed_run(scenario: &Scenario, seed: u64, reason: String) -> BenchResult {
    BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass: false,
        failures: vec![reason],
        frames: 0,
        sim_seconds: 0.0,
        node_count: 0,
        edge_count: 0,
        cascades_spawned: 0,
        cascades_finished: 0,
        peak_active_cascades: 0,
        packets_spawned: 0,
        packets_retired: 0,
        peak_live_packets: 0,
        mean_excitation: 0.0,
        peak_hot_nodes: 0,
        peak_displacement: 0.0,
        final_displacement: 0.0,
        final_scale: 0.0,
        excitation_violations: 0,
        capacity_violations: 0,
        non_finite_frames: 0,
        elapsed_ms: 0,
        frames_per_sec: 0.0,
    }
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&std::path::Path>,
) -> MonteCarloReport {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let results: Vec<BenchResult> = (0..n_runs)
        .map(|i| run_single(scenario, base_seed + i as u64, ts_dir.as_deref()))
        .collect();

    aggregate(scenario, results)
}

fn stats_of(results: &[BenchResult], metric: impl Fn(&BenchResult) -> f64) -> Stats {
    Stats::from_samples(&results.iter().map(metric).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let invariant_violations = results
        .iter()
        .map(|r| r.excitation_violations + r.capacity_violations + r.non_finite_frames)
        .sum();

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate: passed as f64 / n.max(1) as f64,
        cascades_spawned: stats_of(&results, |r| r.cascades_spawned as f64),
        packets_spawned: stats_of(&results, |r| r.packets_spawned as f64),
        mean_excitation: stats_of(&results, |r| r.mean_excitation),
        peak_hot_nodes: stats_of(&results, |r| r.peak_hot_nodes as f64),
        peak_displacement: stats_of(&results, |r| r.peak_displacement),
        final_displacement: stats_of(&results, |r| r.final_displacement),
        elapsed_ms: stats_of(&results, |r| r.elapsed_ms as f64),
        frames_per_sec: stats_of(&results, |r| r.frames_per_sec),
        invariant_violations,
        individual_runs: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::scenarios;

    fn find(name: &str) -> Scenario {
        scenarios()
            .into_iter()
            .find(|s| s.name == name)
            .expect("scenario exists")
    }

    #[test]
    fn test_idle_run_passes() {
        let result = run_single(&find("IDLE_DEFAULT"), 1, None);
        assert!(result.pass, "failures: {:?}", result.failures);
        assert_eq!(result.final_displacement, 0.0);
    }

    #[test]
    fn test_no_edges_spawns_no_packets() {
        let result = run_single(&find("NO_EDGES"), 2, None);
        assert_eq!(result.edge_count, 0);
        assert_eq!(result.packets_spawned, 0);
        assert!(result.pass, "failures: {:?}", result.failures);
    }

    #[test]
    fn test_teardown_freezes_frame_count() {
        let result = run_single(&find("TEARDOWN_MIDWAY"), 3, None);
        assert!(result.pass, "failures: {:?}", result.failures);
        assert!(result.frames > 600);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let s = find("POINTER_ORBIT");
        let a = run_single(&s, 9, None);
        let b = run_single(&s, 9, None);
        assert_eq!(a.cascades_spawned, b.cascades_spawned);
        assert_eq!(a.packets_spawned, b.packets_spawned);
        assert_eq!(a.peak_displacement, b.peak_displacement);
    }

    #[test]
    fn test_audit_counts_nothing_on_fresh_scene() {
        let config = SimConfig { log_events: false, ..SimConfig::default() };
        let sim = HeroSimulation::from_config(0, config, 800.0, 600.0).unwrap();
        let mut audit = InvariantAudit::default();
        audit.check(&sim);
        assert_eq!(audit.total(), 0);
    }
}
