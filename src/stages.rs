//! Per-cell pipeline stages. Each stage reads one or more source fields and
//! fully overwrites a caller-provided output field; sources and outputs are
//! always distinct buffers, which the double-buffer split guarantees.
//!
//! All finite differences use unit cell spacing and clamped neighbor reads,
//! so edges pick up a zero-gradient boundary condition for free.

use crate::{ColorField2, Field2, Vec2, VecField2};

/// Semi-Lagrangian transport of a vector field. For each output cell, trace
/// backward along `vel` by `dt` in normalized coordinates, sample `src`
/// there, and scale by `dissipation` (1.0 = no decay).
pub fn advect_vector_into(
    out: &mut VecField2,
    src: &VecField2,
    vel: &VecField2,
    dt: f32,
    dissipation: f32,
) {
    let grid = out.grid();
    out.fill_with_index(|x, y| {
        let pos = grid.cell_center(x, y);
        let v = vel.sample_linear(pos);
        let back = (pos.0 - v.x * dt, pos.1 - v.y * dt);
        src.sample_linear(back).scale(dissipation)
    });
}

/// Semi-Lagrangian transport of the dye field. `src` may live on a finer
/// grid than `vel`; the normalized coordinate space bridges the two.
pub fn advect_color_into(
    out: &mut ColorField2,
    src: &ColorField2,
    vel: &VecField2,
    dt: f32,
    dissipation: f32,
) {
    let grid = out.grid();
    out.fill_with_index(|x, y| {
        let pos = grid.cell_center(x, y);
        let v = vel.sample_linear(pos);
        let back = (pos.0 - v.x * dt, pos.1 - v.y * dt);
        src.sample_linear(back).scale(dissipation)
    });
}

/// Central-difference divergence of the velocity field.
pub fn divergence_into(out: &mut Field2, vel: &VecField2) {
    let u = vel.u();
    let v = vel.v();
    out.fill_with_index(|x, y| {
        let x = x as i32;
        let y = y as i32;
        let du = u.sample_clamped(x + 1, y) - u.sample_clamped(x - 1, y);
        let dv = v.sample_clamped(x, y + 1) - v.sample_clamped(x, y - 1);
        0.5 * (du + dv)
    });
}

/// One Jacobi relaxation sweep for the discrete Poisson equation
/// `lap(p) = div`. The caller iterates and swaps.
pub fn pressure_jacobi_into(out: &mut Field2, pressure: &Field2, div: &Field2) {
    out.fill_with_index(|x, y| {
        let xi = x as i32;
        let yi = y as i32;
        let left = pressure.sample_clamped(xi - 1, yi);
        let right = pressure.sample_clamped(xi + 1, yi);
        let bottom = pressure.sample_clamped(xi, yi - 1);
        let top = pressure.sample_clamped(xi, yi + 1);
        (left + right + bottom + top - div.get(x, y)) * 0.25
    });
}

/// Projection: subtract the pressure gradient so the velocity field becomes
/// approximately divergence free.
pub fn subtract_gradient_into(out: &mut VecField2, vel: &VecField2, pressure: &Field2) {
    out.fill_with_index(|x, y| {
        let xi = x as i32;
        let yi = y as i32;
        let grad = Vec2::new(
            0.5 * (pressure.sample_clamped(xi + 1, yi) - pressure.sample_clamped(xi - 1, yi)),
            0.5 * (pressure.sample_clamped(xi, yi + 1) - pressure.sample_clamped(xi, yi - 1)),
        );
        vel.get(x, y).sub(grad)
    });
}

/// Scalar 2D curl of the velocity field. Diagnostic only; the engine never
/// feeds it back into the dynamics.
pub fn curl_into(out: &mut Field2, vel: &VecField2) {
    let u = vel.u();
    let v = vel.v();
    out.fill_with_index(|x, y| {
        let x = x as i32;
        let y = y as i32;
        let dv_dx = v.sample_clamped(x + 1, y) - v.sample_clamped(x - 1, y);
        let du_dy = u.sample_clamped(x, y + 1) - u.sample_clamped(x, y - 1);
        0.5 * (dv_dx - du_dy)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid2;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn advection_keeps_constant_field() {
        let grid = Grid2::new(8, 8);
        let vel = VecField2::new(grid, Vec2::new(0.7, -0.3));
        let src = VecField2::new(grid, Vec2::new(2.0, 5.0));
        let mut out = VecField2::new(grid, Vec2::zero());
        advect_vector_into(&mut out, &src, &vel, 0.25, 1.0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(out.get(x, y), Vec2::new(2.0, 5.0));
            }
        }
    }

    #[test]
    fn advection_shifts_spike_downstream() {
        let grid = Grid2::new(8, 1);
        // Uniform rightward flow; dt chosen so the back trace lands exactly
        // one cell to the left.
        let vel = VecField2::new(grid, Vec2::new(1.0, 0.0));
        let src = VecField2::from_fn(grid, |x, _y| {
            if x == 3 {
                Vec2::new(0.0, 9.0)
            } else {
                Vec2::zero()
            }
        });
        let mut out = VecField2::new(grid, Vec2::zero());
        advect_vector_into(&mut out, &src, &vel, 1.0 / 8.0, 1.0);
        assert_close(out.get(4, 0).y, 9.0, 1e-5);
        assert_close(out.get(3, 0).y, 0.0, 1e-5);
    }

    #[test]
    fn advection_applies_dissipation() {
        let grid = Grid2::new(4, 4);
        let vel = VecField2::new(grid, Vec2::zero());
        let src = VecField2::new(grid, Vec2::new(2.0, 0.0));
        let mut out = VecField2::new(grid, Vec2::zero());
        advect_vector_into(&mut out, &src, &vel, 0.016, 0.5);
        assert_close(out.get(2, 2).x, 1.0, 1e-6);
    }

    #[test]
    fn divergence_of_uniform_flow_is_zero() {
        let grid = Grid2::new(8, 6);
        let vel = VecField2::new(grid, Vec2::new(1.0, -1.0));
        let mut div = Field2::new(grid, 0.0);
        divergence_into(&mut div, &vel);
        assert_close(div.abs_sum(), 0.0, 1e-6);
    }

    #[test]
    fn divergence_of_expanding_flow_is_positive() {
        let grid = Grid2::new(8, 8);
        let vel = VecField2::from_fn(grid, |x, y| Vec2::new(x as f32, y as f32));
        let mut div = Field2::new(grid, 0.0);
        divergence_into(&mut div, &vel);
        // Interior cells see du/dx = dv/dy = 1.
        assert_close(div.get(4, 4), 2.0, 1e-6);
    }

    #[test]
    fn jacobi_keeps_zero_pressure_for_zero_divergence() {
        let grid = Grid2::new(6, 6);
        let pressure = Field2::new(grid, 0.0);
        let div = Field2::new(grid, 0.0);
        let mut out = Field2::new(grid, 1.0);
        pressure_jacobi_into(&mut out, &pressure, &div);
        assert_close(out.abs_sum(), 0.0, 1e-6);
    }

    #[test]
    fn projection_removes_most_divergence() {
        // Smooth divergent blob; the central-difference stencils only see
        // gradients spanning two cells, so single-cell spikes are invisible
        // to the projection and stay out of this test.
        let grid = Grid2::new(16, 16);
        let vel = VecField2::from_fn(grid, |x, y| {
            let (cx, cy) = grid.cell_center(x, y);
            let d2 = (cx - 0.5) * (cx - 0.5) + (cy - 0.5) * (cy - 0.5);
            let falloff = (-d2 / 0.02).exp();
            Vec2::new(falloff, 0.4 * falloff)
        });
        let mut div = Field2::new(grid, 0.0);
        divergence_into(&mut div, &vel);
        let before = div.mean_abs();

        let mut pressure = Field2::new(grid, 0.0);
        let mut scratch = Field2::new(grid, 0.0);
        for _ in 0..100 {
            pressure_jacobi_into(&mut scratch, &pressure, &div);
            std::mem::swap(&mut pressure, &mut scratch);
        }
        let mut projected = VecField2::new(grid, Vec2::zero());
        subtract_gradient_into(&mut projected, &vel, &pressure);
        divergence_into(&mut div, &projected);
        let after = div.mean_abs();
        assert!(
            after < before * 0.5,
            "expected projection to cut divergence, before {before} after {after}"
        );
    }

    #[test]
    fn curl_of_rigid_rotation_is_constant() {
        let grid = Grid2::new(9, 9);
        let vel = VecField2::from_fn(grid, |x, y| {
            Vec2::new(-(y as f32 - 4.0), x as f32 - 4.0)
        });
        let mut curl = Field2::new(grid, 0.0);
        curl_into(&mut curl, &vel);
        for y in 1..8 {
            for x in 1..8 {
                assert_close(curl.get(x, y), 2.0, 1e-5);
            }
        }
    }

    #[test]
    fn curl_of_uniform_flow_is_zero() {
        let grid = Grid2::new(8, 8);
        let vel = VecField2::new(grid, Vec2::new(3.0, -2.0));
        let mut curl = Field2::new(grid, 0.0);
        curl_into(&mut curl, &vel);
        assert_close(curl.abs_sum(), 0.0, 1e-6);
    }

    #[test]
    fn dye_advection_crosses_resolutions() {
        let sim_grid = Grid2::new(4, 4);
        let dye_grid = Grid2::new(16, 16);
        let vel = VecField2::new(sim_grid, Vec2::new(0.0, 0.0));
        let mut src = ColorField2::new(dye_grid, crate::Vec3::zero());
        src.fill_with_index(|x, y| crate::Vec3::new((x + y) as f32, 0.0, 0.0));
        let mut out = ColorField2::new(dye_grid, crate::Vec3::zero());
        advect_color_into(&mut out, &src, &vel, 0.016, 1.0);
        // Zero velocity: values land exactly on their own cell centers.
        assert_eq!(out, src);
    }
}
