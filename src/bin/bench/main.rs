// Synapse Bench Runner v0.1.0: scene invariants under scripted input
// Monte Carlo (N=30), jittered frame clock, seedable PRNG, per-frame audit trail
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- POINTER          # Filter by name, label or category
//   cargo run --release --bin bench -- --time-series    # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42        # Custom base seed

mod report;
mod scenarios;
mod monte_carlo;
mod time_series;

use report::*;
use scenarios::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    time_series: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        time_series: false,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30).max(1);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let ts_dir = cli
        .time_series
        .then(|| std::path::Path::new("benchmark-results/time-series").to_path_buf());

    println!("\n  Synapse Bench Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<36} {:>5} {:>12} {:>12} {:>9} {:>9} {:>7}",
        "Scenario", "Pass%", "Cascades", "Packets", "PeakDisp", "Inv", "Time");
    println!("  {}", "-".repeat(96));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(
            scenario,
            cli.runs,
            cli.seed,
            ts_dir.as_deref(),
        );

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };

        println!("  {:<36} {:>4}% {:>7.1}±{:<4.1} {:>7.1}±{:<4.1} {:>9.3} {:>9} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.cascades_spawned.mean, report.cascades_spawned.half_width(),
            report.packets_spawned.mean, report.packets_spawned.half_width(),
            report.peak_displacement.mean,
            report.invariant_violations,
            report.elapsed_ms.mean,
            status,
        );
        if report.pass_rate < 1.0 {
            if let Some(run) = report.individual_runs.iter().find(|r| !r.pass) {
                println!("      seed {}: {}", run.seed, run.failures.join("; "));
            }
        }

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Invariant Validation ───────────────────────────────────────────

    let runs = || mc_reports.iter().flat_map(|r| r.individual_runs.iter());
    let invariants = InvariantValidation {
        excitation_bounded: runs().all(|r| r.excitation_violations == 0),
        packet_capacity_respected: runs().all(|r| r.capacity_violations == 0),
        positions_finite: runs().all(|r| r.non_finite_frames == 0),
        max_final_displacement: runs().map(|r| r.final_displacement).fold(0.0_f64, f64::max),
    };

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 1.0).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(96));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    let verdict = |ok: bool| if ok { "PASS" } else { "FAIL" };
    println!("  Invariants:");
    println!("    Excitation in [0, 1]:  {}", verdict(invariants.excitation_bounded));
    println!("    Packet pool capacity:  {}", verdict(invariants.packet_capacity_respected));
    println!("    Finite positions:      {}", verdict(invariants.positions_finite));
    println!("    Max final displacement: {:.2e}", invariants.max_final_displacement);
    println!("    Overall:               {}\n", verdict(invariants.all_pass()));

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        invariant_validation: invariants,
        scenarios: mc_reports,
    };

    let dir = std::path::Path::new("benchmark-results");
    if !dir.exists() {
        std::fs::create_dir_all(dir).expect("Failed to create benchmark-results/");
    }
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize");
    std::fs::write(&path, &json).expect("Failed to write benchmark file");
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
}
