// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Physics Integrator
//
// Fixed-step explicit Euler: spring toward rest, radial push away from the
// pointer, damping, then position update. Stability comes from the tuned
// constants in `PhysicsParams`; there is no sub-stepping and no dt.

use glam::{Vec2, Vec3};

use crate::config::PhysicsParams;
use crate::field::NodeField;

/// Advance every node by one frame. Returns how many nodes the repulsor touched.
pub fn integrate(field: &mut NodeField, repulsor: Option<Vec2>, params: &PhysicsParams) -> usize {
    let radius_sq = params.repel_radius * params.repel_radius;
    let mut repelled = 0;

    for i in 0..field.len() {
        let pos = field.position[i];
        let mut vel = field.velocity[i];

        vel += (field.base[i] - pos) * params.spring_k;

        if let Some(r) = repulsor {
            if let Some(push) = repulsion(pos, r, params, radius_sq) {
                vel += push;
                repelled += 1;
            }
        }

        vel *= params.damping;
        field.velocity[i] = vel;
        field.position[i] = pos + vel;
    }
    repelled
}

/// Push on a node at `pos` from a repulsor lying in the z = 0 plane.
/// `None` when out of range or too close to define a direction.
fn repulsion(pos: Vec3, repulsor: Vec2, params: &PhysicsParams, radius_sq: f32) -> Option<Vec3> {
    let d = Vec3::new(pos.x - repulsor.x, pos.y - repulsor.y, pos.z);
    let d2 = d.x * d.x + d.y * d.y + d.z * d.z * params.depth_metric;
    if d2 >= radius_sq || d2 <= params.epsilon_sq {
        return None;
    }
    let dist = d2.sqrt();
    let f = params.repel_force * (1.0 - dist / params.repel_radius);
    Some(Vec3::new(
        d.x / dist * f,
        d.y / dist * f,
        d.z / dist * f * params.depth_push,
    ))
}

/// Largest distance of any node from its rest position.
pub fn max_displacement(field: &NodeField) -> f32 {
    field
        .position
        .iter()
        .zip(field.base.iter())
        .map(|(p, b)| p.distance(*b))
        .fold(0.0, f32::max)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn single(at: Vec3) -> NodeField {
        NodeField::from_base(vec![at], vec![1.0])
    }

    #[test]
    fn test_spring_converges_from_offset() {
        let params = PhysicsParams::default();
        let mut field = single(Vec3::new(2.0, -1.0, 0.5));
        field.displace(0, Vec3::new(1.5, 2.0, -1.0));
        for _ in 0..200 {
            integrate(&mut field, None, &params);
        }
        assert!(max_displacement(&field) < 1e-3, "residual {}", max_displacement(&field));
        assert!(field.velocities()[0].length() < 1e-3);
    }

    #[test]
    fn test_at_rest_without_pointer_stays_put() {
        let params = PhysicsParams::default();
        let mut field = single(Vec3::new(3.0, 1.0, -2.0));
        for _ in 0..10 {
            integrate(&mut field, None, &params);
        }
        assert_eq!(field.positions()[0], Vec3::new(3.0, 1.0, -2.0));
    }

    #[test]
    fn test_repulsor_on_node_is_skipped() {
        let params = PhysicsParams::default();
        let mut field = single(Vec3::new(1.0, 1.0, 0.0));
        let touched = integrate(&mut field, Some(Vec2::new(1.0, 1.0)), &params);
        assert_eq!(touched, 0);
        let v = field.velocities()[0];
        assert!(v.is_finite());
        assert_eq!(v, Vec3::ZERO);
        assert_eq!(field.positions()[0], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_repulsor_pushes_away() {
        let params = PhysicsParams::default();
        let mut field = single(Vec3::new(1.0, 0.0, 0.0));
        let touched = integrate(&mut field, Some(Vec2::ZERO), &params);
        assert_eq!(touched, 1);
        let p = field.positions()[0];
        assert!(p.x > 1.0);
        assert_eq!(p.y, 0.0);
        // 0.09 * (1 - 1/3.8) * 0.87
        assert!((p.x - 1.0 - 0.057_71).abs() < 1e-4, "dx = {}", p.x - 1.0);
    }

    #[test]
    fn test_repulsor_out_of_range_ignored() {
        let params = PhysicsParams::default();
        let mut field = single(Vec3::new(10.0, 0.0, 0.0));
        let touched = integrate(&mut field, Some(Vec2::ZERO), &params);
        assert_eq!(touched, 0);
        assert_eq!(field.positions()[0], Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_depth_push_is_weighted_down() {
        let weighted = PhysicsParams::default();
        let flat = PhysicsParams {
            depth_push: 1.0,
            ..PhysicsParams::default()
        };
        let mut a = single(Vec3::new(0.5, 0.0, 2.0));
        let mut b = single(Vec3::new(0.5, 0.0, 2.0));
        integrate(&mut a, Some(Vec2::ZERO), &weighted);
        integrate(&mut b, Some(Vec2::ZERO), &flat);
        let za = a.velocities()[0].z;
        let zb = b.velocities()[0].z;
        assert!(za > 0.0);
        assert!((za / zb - 0.3).abs() < 1e-4);
        assert_eq!(a.velocities()[0].x, b.velocities()[0].x);
    }

    #[test]
    fn test_sustained_pointer_stays_bounded() {
        let params = PhysicsParams::default();
        let mut field = NodeField::from_base(
            (0..16)
                .map(|i| Vec3::new((i % 4) as f32 - 1.5, (i / 4) as f32 - 1.5, 0.3))
                .collect(),
            vec![],
        );
        for frame in 0..600 {
            let t = frame as f32 * 0.05;
            integrate(&mut field, Some(Vec2::new(t.cos() * 2.0, t.sin() * 1.5)), &params);
        }
        assert!(field.positions().iter().all(|p| p.is_finite()));
        assert!(max_displacement(&field) < 2.0 * params.repel_radius);
    }
}
