//! Test utilities and fixture types for Strata development.
//!
//! Provides simple [`VelocityField`] implementations and signed-distance
//! geometry builders (see [`fixtures`]) for constructing test scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::{MaterialId, PointId, Vec3, VelocityField};

pub use fixtures::{aabb, grid, plane, sphere};

/// The same scalar and vector velocity everywhere, for every material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantVelocity {
    pub scalar: f64,
    pub vector: Vec3,
}

impl ConstantVelocity {
    pub fn scalar(scalar: f64) -> Self {
        Self {
            scalar,
            vector: [0.0; 3],
        }
    }

    pub fn vector(vector: Vec3) -> Self {
        Self {
            scalar: 0.0,
            vector,
        }
    }
}

impl VelocityField for ConstantVelocity {
    fn scalar_velocity(&self, _: Vec3, _: MaterialId, _: Vec3, _: PointId) -> f64 {
        self.scalar
    }

    fn vector_velocity(&self, _: Vec3, _: MaterialId, _: Vec3, _: PointId) -> Vec3 {
        self.vector
    }
}

/// A scalar rate per material; materials without an entry do not move.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialSelectiveVelocity {
    pub rates: Vec<f64>,
}

impl MaterialSelectiveVelocity {
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates }
    }
}

impl VelocityField for MaterialSelectiveVelocity {
    fn scalar_velocity(&self, _: Vec3, material: MaterialId, _: Vec3, _: PointId) -> f64 {
        self.rates.get(material.0).copied().unwrap_or(0.0)
    }
}

/// `base` plus uniform noise in `[-amplitude, amplitude)`.
///
/// The noise is a pure function of `seed` and the queried coordinate, so
/// repeated and concurrent queries agree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoisyVelocity {
    pub base: f64,
    pub amplitude: f64,
    pub seed: u64,
}

impl NoisyVelocity {
    pub fn new(base: f64, amplitude: f64, seed: u64) -> Self {
        Self {
            base,
            amplitude,
            seed,
        }
    }
}

impl VelocityField for NoisyVelocity {
    fn scalar_velocity(&self, coordinate: Vec3, _: MaterialId, _: Vec3, _: PointId) -> f64 {
        let key = coordinate
            .iter()
            .fold(self.seed, |h, c| h.rotate_left(21) ^ c.to_bits());
        let mut rng = ChaCha8Rng::seed_from_u64(key);
        let r: f64 = rng.random();
        self.base + self.amplitude * (2.0 * r - 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_selective_defaults_to_zero() {
        let v = MaterialSelectiveVelocity::new(vec![0.0, -1.0]);
        assert_eq!(v.scalar_velocity([0.0; 3], MaterialId(1), [0.0; 3], PointId(0)), -1.0);
        assert_eq!(v.scalar_velocity([0.0; 3], MaterialId(4), [0.0; 3], PointId(0)), 0.0);
    }

    #[test]
    fn noise_is_deterministic_and_bounded() {
        let v = NoisyVelocity::new(-1.0, 0.25, 7);
        let a = v.scalar_velocity([1.0, 2.0, 0.0], MaterialId(0), [0.0; 3], PointId(0));
        let b = v.scalar_velocity([1.0, 2.0, 0.0], MaterialId(0), [0.0; 3], PointId(3));
        assert_eq!(a, b);
        assert!((-1.25..=-0.75).contains(&a));
    }
}
