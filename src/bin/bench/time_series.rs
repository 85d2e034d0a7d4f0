// Per-Frame JSONL Time Series Recorder
// Outputs one JSON line per frame for independent analysis

use serde::Serialize;
use synapse_engine::FrameStats;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub time: f64,
    pub active_cascades: usize,
    pub scheduled_fires: usize,
    pub live_packets: usize,
    pub hot_nodes: usize,
    pub mean_excitation: f32,
    pub max_excitation: f32,
    pub cascades_spawned: u64,
    pub packets_spawned: u64,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub scale: f32,
    pub key_light_intensity: f32,
    pub max_displacement: f32,
    pub repelled_nodes: usize,
}

impl FrameSnapshot {
    pub fn from_stats(stats: &FrameStats, max_displacement: f32, repelled_nodes: usize) -> Self {
        Self {
            frame: stats.frame,
            time: stats.time,
            active_cascades: stats.active_cascades,
            scheduled_fires: stats.scheduled_fires,
            live_packets: stats.live_packets,
            hot_nodes: stats.hot_nodes,
            mean_excitation: stats.mean_excitation,
            max_excitation: stats.max_excitation,
            cascades_spawned: stats.cascades_spawned,
            packets_spawned: stats.packets_spawned,
            rotation_x: stats.transform.rotation_x,
            rotation_y: stats.transform.rotation_y,
            scale: stats.transform.scale,
            key_light_intensity: stats.transform.key_light_intensity,
            max_displacement,
            repelled_nodes,
        }
    }
}

/// Accumulates frame snapshots and writes them as JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<FrameSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, stats: &FrameStats, max_displacement: f32, repelled_nodes: usize) {
        self.snapshots
            .push(FrameSnapshot::from_stats(stats, max_displacement, repelled_nodes));
    }

    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }
}
