//! Spiral galaxy point-field generation.
//!
//! Each particle sits on a spiral arm whose radius is drawn with a power
//! law (`u^gravity`), so higher gravity packs particles toward the core.
//! The angular offset grows with the particle index rather than cycling
//! through `branches` buckets, which interleaves the arms across the whole
//! index range. That offset reaches the order of 1e5 radians for large
//! counts, so angles are computed in `f64` and only the stored positions
//! are narrowed to `f32`.

use std::f64::consts::TAU;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::params::ParameterSet;

/// Generated particle buffers, 3 floats per particle each.
#[derive(Debug, Clone, PartialEq)]
pub struct PointField {
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl PointField {
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> [f32; 3] {
        let i3 = index * 3;
        [self.positions[i3], self.positions[i3 + 1], self.positions[i3 + 2]]
    }

    pub fn color(&self, index: usize) -> [f32; 3] {
        let i3 = index * 3;
        [self.colors[i3], self.colors[i3 + 1], self.colors[i3 + 2]]
    }

    /// Interleaved `[x, y, z, r, g, b]` per particle, the layout the GPU
    /// instance buffer expects.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.positions.len() * 2);
        for (position, color) in self.positions.chunks_exact(3).zip(self.colors.chunks_exact(3)) {
            data.extend_from_slice(position);
            data.extend_from_slice(color);
        }
        data
    }
}

/// Builds a fresh point field from `params`, drawing every random value
/// from `rng`.
///
/// Per particle the draws are: radius, then magnitude and sign for each
/// of x, y and z.
pub fn generate<R: Rng + ?Sized>(params: &ParameterSet, rng: &mut R) -> PointField {
    let count = params.count as usize;
    let mut positions = vec![0.0f32; count * 3];
    let mut colors = vec![0.0f32; count * 3];

    let angle_step = TAU / f64::from(params.branches);

    for i in 0..count {
        let i3 = i * 3;

        let radius = rng.gen::<f32>().powf(params.gravity) * params.radius;
        let spin_angle = f64::from(radius) * f64::from(params.spin);
        let branch_angle = angle_step * i as f64;
        let (sin, cos) = (spin_angle + branch_angle).sin_cos();

        let random_x = jitter(params, rng);
        let random_y = jitter(params, rng);
        let random_z = jitter(params, rng);

        positions[i3] = (f64::from(radius) * sin) as f32 + random_x;
        positions[i3 + 1] = random_y;
        positions[i3 + 2] = (f64::from(radius) * cos) as f32 + random_z;

        let mixed = params
            .inside_color
            .lerp(params.outside_color, radius / params.radius);
        colors[i3] = mixed.r;
        colors[i3 + 1] = mixed.g;
        colors[i3 + 2] = mixed.b;
    }

    PointField { positions, colors }
}

fn jitter<R: Rng + ?Sized>(params: &ParameterSet, rng: &mut R) -> f32 {
    let magnitude = rng.gen::<f32>().powf(params.gravity);
    let sign = (rng.gen::<f32>() - 0.5) * 2.0;
    magnitude * params.randomness * sign
}

/// Owns the random source used across regenerations.
pub struct GalaxyGenerator {
    rng: StdRng,
}

impl GalaxyGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Replaces the random source so the next galaxy differs from the
    /// sequence seeded at startup.
    pub fn reseed(&mut self) {
        self.rng = StdRng::from_entropy();
    }

    pub fn generate(&mut self, params: &ParameterSet) -> PointField {
        let started = Instant::now();
        let field = generate(params, &mut self.rng);
        log::debug!(
            "Generated {} particles in {:.2?}",
            field.len(),
            started.elapsed()
        );
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_layout() {
        let params = ParameterSet { count: 100, ..Default::default() };
        let field = generate(&params, &mut StdRng::seed_from_u64(1));
        let data = field.interleaved();

        assert_eq!(data.len(), 600);
        assert_eq!(&data[0..3], &field.position(0));
        assert_eq!(&data[3..6], &field.color(0));
        assert_eq!(&data[594..597], &field.position(99));
        assert_eq!(&data[597..600], &field.color(99));
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let params = ParameterSet { count: 500, ..Default::default() };
        let first = GalaxyGenerator::new(Some(7)).generate(&params);
        let second = GalaxyGenerator::new(Some(7)).generate(&params);
        assert_eq!(first, second);
    }

    #[test]
    fn test_consecutive_calls_differ() {
        let params = ParameterSet { count: 500, ..Default::default() };
        let mut generator = GalaxyGenerator::new(Some(7));
        let first = generator.generate(&params);
        let second = generator.generate(&params);
        assert_ne!(first, second);
    }
}
