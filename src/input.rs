// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Host Input Channel
//
// Pointer, scroll and viewport arrive from host event handlers at any time;
// the frame driver reads them once per frame. Each value pair is bit-packed
// into a single atomic word so a reader can never observe half of an update.

use glam::Vec2;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::config::PointerParams;

fn pack(a: f32, b: f32) -> u64 {
    ((a.to_bits() as u64) << 32) | b.to_bits() as u64
}

fn unpack(word: u64) -> (f32, f32) {
    (f32::from_bits((word >> 32) as u32), f32::from_bits(word as u32))
}

// ---------------------------------------------------------------------------
// InputChannel
// ---------------------------------------------------------------------------

/// Latest host input, one writer and one reader.
#[derive(Debug)]
pub struct InputChannel {
    /// Client coordinates; NaN means the pointer left the page.
    pointer: AtomicU64,
    viewport: AtomicU64,
    scroll: AtomicU32,
}

/// What the frame driver sees for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    pub pointer: Option<Vec2>,
    pub viewport: Vec2,
    pub scroll_progress: f32,
}

impl InputChannel {
    /// Pointer starts parked at the viewport center.
    pub fn new(width: f32, height: f32) -> Self {
        let (w, h) = if valid_extent(width, height) { (width, height) } else { (1.0, 1.0) };
        Self {
            pointer: AtomicU64::new(pack(w * 0.5, h * 0.5)),
            viewport: AtomicU64::new(pack(w, h)),
            scroll: AtomicU32::new(0.0f32.to_bits()),
        }
    }

    pub fn set_pointer(&self, client_x: f32, client_y: f32) {
        if client_x.is_finite() && client_y.is_finite() {
            self.pointer.store(pack(client_x, client_y), Ordering::Release);
        }
    }

    /// Pointer left the page: no repulsor until the next move.
    pub fn clear_pointer(&self) {
        self.pointer.store(pack(f32::NAN, f32::NAN), Ordering::Release);
    }

    /// Progress is clamped to `[0, 1]`; NaN counts as zero.
    pub fn set_scroll_progress(&self, progress: f32) {
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.scroll.store(p.to_bits(), Ordering::Release);
    }

    /// Returns `false` and keeps the previous size for non-positive extents.
    pub fn set_viewport(&self, width: f32, height: f32) -> bool {
        if !valid_extent(width, height) {
            return false;
        }
        self.viewport.store(pack(width, height), Ordering::Release);
        true
    }

    pub fn snapshot(&self) -> InputSnapshot {
        let (px, py) = unpack(self.pointer.load(Ordering::Acquire));
        let (w, h) = unpack(self.viewport.load(Ordering::Acquire));
        InputSnapshot {
            pointer: if px.is_nan() || py.is_nan() { None } else { Some(Vec2::new(px, py)) },
            viewport: Vec2::new(w, h),
            scroll_progress: f32::from_bits(self.scroll.load(Ordering::Acquire)),
        }
    }
}

fn valid_extent(width: f32, height: f32) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

// ---------------------------------------------------------------------------
// Pointer mapping
// ---------------------------------------------------------------------------

/// Pointer expressed in the two spaces the frame driver needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTargets {
    /// Scene rotation target, before smoothing.
    pub rotation: Vec2,
    /// Repulsor position in the network plane (y up).
    pub repulsor: Vec2,
}

pub fn map_pointer(client: Vec2, viewport: Vec2, params: &PointerParams) -> PointerTargets {
    let n = client / viewport - Vec2::splat(0.5);
    PointerTargets {
        rotation: Vec2::new(n.x * params.rotation_scale_x, n.y * params.rotation_scale_y),
        repulsor: Vec2::new(n.x * params.network_scale_x, -n.y * params.network_scale_y),
    }
}

/// Exponential follow toward the rotation target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSmoother {
    value: Vec2,
}

impl PointerSmoother {
    pub fn step(&mut self, target: Vec2, smoothing: f32) -> Vec2 {
        self.value += (target - self.value) * smoothing;
        self.value
    }

    pub fn value(&self) -> Vec2 {
        self.value
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
