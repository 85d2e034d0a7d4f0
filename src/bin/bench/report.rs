// Benchmark Report Types
// Structured output for independent analysis of scene invariants and load

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let half_width = 1.96 * std_dev / (n as f64).sqrt(); // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub failures: Vec<String>,
    pub frames: u64,
    pub sim_seconds: f64,
    pub node_count: usize,
    pub edge_count: usize,
    pub cascades_spawned: u64,
    pub cascades_finished: u64,
    pub peak_active_cascades: usize,
    pub packets_spawned: u64,
    pub packets_retired: u64,
    pub peak_live_packets: usize,
    pub mean_excitation: f64,
    pub peak_hot_nodes: usize,
    pub peak_displacement: f64,
    pub final_displacement: f64,
    pub final_scale: f64,
    pub excitation_violations: u32,
    pub capacity_violations: u32,
    pub non_finite_frames: u32,
    pub elapsed_ms: u128,
    pub frames_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub cascades_spawned: Stats,
    pub packets_spawned: Stats,
    pub mean_excitation: Stats,
    pub peak_hot_nodes: Stats,
    pub peak_displacement: Stats,
    pub final_displacement: Stats,
    pub elapsed_ms: Stats,
    pub frames_per_sec: Stats,
    pub invariant_violations: u32,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Invariant Summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InvariantValidation {
    pub excitation_bounded: bool,
    pub packet_capacity_respected: bool,
    pub positions_finite: bool,
    pub max_final_displacement: f64,
}

impl InvariantValidation {
    pub fn all_pass(&self) -> bool {
        self.excitation_bounded && self.packet_capacity_respected && self.positions_finite
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub summary: Summary,
    pub invariant_validation: InvariantValidation,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}
