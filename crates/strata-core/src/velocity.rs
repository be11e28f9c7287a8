//! The [`VelocityField`] capability supplied by callers of the engine.

use crate::id::{MaterialId, PointId, Vec3};

/// Caller-supplied surface velocities.
///
/// The engine queries this from every rate-computation worker at once, so
/// implementations must be `Send + Sync` and must not rely on call order.
/// A single point may be queried many times per step (stencil schemes sample
/// neighbouring coordinates and perturbed normals).
///
/// Every method has a default returning zero, so an implementation only
/// overrides the terms it uses.
///
/// # Examples
///
/// ```
/// use strata_core::{MaterialId, PointId, Vec3, VelocityField};
///
/// /// Isotropic etch: every surface recedes at one unit per time unit.
/// struct Etch;
///
/// impl VelocityField for Etch {
///     fn scalar_velocity(&self, _: Vec3, _: MaterialId, _: Vec3, _: PointId) -> f64 {
///         -1.0
///     }
/// }
///
/// let v = Etch.scalar_velocity([0.0; 3], MaterialId(0), [0.0, 0.0, 1.0], PointId(0));
/// assert_eq!(v, -1.0);
/// assert_eq!(Etch.vector_velocity([0.0; 3], MaterialId(0), [0.0; 3], PointId(0)), [0.0; 3]);
/// ```
pub trait VelocityField: Send + Sync {
    /// Normal speed at `coordinate` for `material`.
    ///
    /// Positive values grow the material, negative values recede it.
    /// `normal` is the unit outward normal (all zero when normal
    /// computation is disabled).
    fn scalar_velocity(
        &self,
        coordinate: Vec3,
        material: MaterialId,
        normal: Vec3,
        point: PointId,
    ) -> f64 {
        let _ = (coordinate, material, normal, point);
        0.0
    }

    /// Directional velocity at `coordinate` for `material`.
    fn vector_velocity(
        &self,
        coordinate: Vec3,
        material: MaterialId,
        normal: Vec3,
        point: PointId,
    ) -> Vec3 {
        let _ = (coordinate, material, normal, point);
        [0.0; 3]
    }

    /// Analytic dissipation coefficient along axis `direction`.
    ///
    /// Only consulted by the analytical local Lax-Friedrichs scheme.
    /// `central_differences` holds the central-difference gradient of the
    /// field at the sampled stencil point.
    fn dissipation_alpha(
        &self,
        direction: usize,
        material: MaterialId,
        central_differences: Vec3,
    ) -> f64 {
        let _ = (direction, material, central_differences);
        0.0
    }
}

impl<T: VelocityField + ?Sized> VelocityField for std::sync::Arc<T> {
    fn scalar_velocity(
        &self,
        coordinate: Vec3,
        material: MaterialId,
        normal: Vec3,
        point: PointId,
    ) -> f64 {
        (**self).scalar_velocity(coordinate, material, normal, point)
    }

    fn vector_velocity(
        &self,
        coordinate: Vec3,
        material: MaterialId,
        normal: Vec3,
        point: PointId,
    ) -> Vec3 {
        (**self).vector_velocity(coordinate, material, normal, point)
    }

    fn dissipation_alpha(
        &self,
        direction: usize,
        material: MaterialId,
        central_differences: Vec3,
    ) -> f64 {
        (**self).dissipation_alpha(direction, material, central_differences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Sideways;

    impl VelocityField for Sideways {
        fn vector_velocity(&self, _: Vec3, m: MaterialId, _: Vec3, _: PointId) -> Vec3 {
            [m.0 as f64, 0.0, 0.0]
        }
    }

    #[test]
    fn defaults_are_zero() {
        let v = Sideways;
        assert_eq!(v.scalar_velocity([1.0; 3], MaterialId(0), [0.0; 3], PointId(0)), 0.0);
        assert_eq!(v.dissipation_alpha(0, MaterialId(0), [1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn arc_forwards_to_inner() {
        let v: Arc<dyn VelocityField> = Arc::new(Sideways);
        let vec = v.vector_velocity([0.0; 3], MaterialId(3), [0.0; 3], PointId(1));
        assert_eq!(vec, [3.0, 0.0, 0.0]);
    }
}
