//! Finite differences on a narrow-band field.
//!
//! Field values are in grid units, so every difference is divided by the
//! grid spacing; a signed distance field has gradient magnitude
//! `1 / delta`.

use strata_core::Vec3;
use strata_field::NarrowBandField;

/// Offset of `step` cells along `axis`.
pub fn unit<const D: usize>(axis: usize, step: i64) -> [i64; D] {
    let mut o = [0; D];
    o[axis] = step;
    o
}

fn add<const D: usize>(a: [i64; D], b: [i64; D]) -> [i64; D] {
    let mut out = a;
    for (o, b) in out.iter_mut().zip(b) {
        *o += b;
    }
    out
}

/// Forward and backward differences of `field` at `lin` along `axis`.
///
/// With `order == 2` each one-sided difference gets the ENO correction:
/// the smaller of the two neighbouring second differences (when both have
/// the same sign) is folded in.
///
/// ```text
/// diff_pos = (phi[+1] - phi[0]) / delta
/// diff_neg = (phi[0] - phi[-1]) / delta
/// ```
pub fn one_sided<const D: usize>(
    field: &NarrowBandField<D>,
    lin: usize,
    axis: usize,
    order: usize,
) -> (f64, f64) {
    let delta = field.grid().delta();
    let delta_pos = delta;
    let delta_neg = -delta;

    let phi0 = field.value(lin);
    let phi_pos = field.neighbor_value(lin, unit(axis, 1));
    let phi_neg = field.neighbor_value(lin, unit(axis, -1));

    let mut diff_pos = (phi_pos - phi0) / delta_pos;
    let mut diff_neg = (phi_neg - phi0) / delta_neg;

    if order == 2 {
        let delta_pos_pos = 2.0 * delta;
        let delta_neg_neg = -2.0 * delta;
        let phi_pos_pos = field.neighbor_value(lin, unit(axis, 2));
        let phi_neg_neg = field.neighbor_value(lin, unit(axis, -2));

        let diff00 = ((delta_neg * phi_pos - delta_pos * phi_neg) / (delta_pos - delta_neg) + phi0)
            / (delta_pos * delta_neg);
        let diff_neg_neg = ((delta_neg * phi_neg_neg - delta_neg_neg * phi_neg)
            / (delta_neg_neg - delta_neg)
            + phi0)
            / (delta_neg_neg * delta_neg);
        let diff_pos_pos = ((delta_pos * phi_pos_pos - delta_pos_pos * phi_pos)
            / (delta_pos_pos - delta_pos)
            + phi0)
            / (delta_pos_pos * delta_pos);

        if diff00.is_sign_negative() == diff_pos_pos.is_sign_negative() {
            if (diff_pos_pos * delta_pos).abs() < (diff00 * delta_neg).abs() {
                diff_pos -= delta_pos * diff_pos_pos;
            } else {
                diff_pos += delta_neg * diff00;
            }
        }

        if diff00.is_sign_negative() == diff_neg_neg.is_sign_negative() {
            if (diff_neg_neg * delta_neg).abs() < (diff00 * delta_pos).abs() {
                diff_neg -= delta_neg * diff_neg_neg;
            } else {
                diff_neg += delta_pos * diff00;
            }
        }
    }

    (diff_pos, diff_neg)
}

const WENO_EPSILON: f64 = 1e-6;

/// Values along `axis` centred on `lin`, `N / 2` cells to each side.
pub fn axis_stencil<const N: usize, const D: usize>(
    field: &NarrowBandField<D>,
    lin: usize,
    axis: usize,
) -> [f64; N] {
    let radius = (N / 2) as i64;
    let mut out = [0.0; N];
    for (k, v) in out.iter_mut().enumerate() {
        *v = field.neighbor_value(lin, unit(axis, k as i64 - radius));
    }
    out
}

/// Third-order WENO one-sided difference over `x[-2] .. x[+2]`.
///
/// `plus` selects the forward (right-biased) difference.
pub fn weno3(x: &[f64; 5], delta: f64, plus: bool) -> f64 {
    let d = if plus {
        [x[2] - x[1], x[3] - x[2], x[4] - x[3]]
    } else {
        [x[1] - x[0], x[2] - x[1], x[3] - x[2]]
    };
    let square = |v: f64| v * v;
    let (smooth, rough) = if plus {
        (square(d[1] - d[0]), square(d[2] - d[1]))
    } else {
        (square(d[2] - d[1]), square(d[1] - d[0]))
    };
    let n = WENO_EPSILON + rough;
    let dd = WENO_EPSILON + smooth;
    let weight = dd * dd / (dd * dd + 2.0 * n * n);
    let result = if plus {
        d[0] + d[1] - weight * (d[2] - 2.0 * d[1] + d[0])
    } else {
        d[1] + d[2] - weight * (d[0] - 2.0 * d[1] + d[2])
    };
    result / (2.0 * delta)
}

/// Fifth-order WENO one-sided difference over `x[-3] .. x[+3]`.
///
/// `plus` selects the forward (right-biased) difference, which mirrors the
/// stencil and reuses the backward weights.
pub fn weno5(x: &[f64; 7], delta: f64, plus: bool) -> f64 {
    let mut d = [0.0; 5];
    for (i, di) in d.iter_mut().enumerate() {
        *di = if plus { x[6 - i] - x[5 - i] } else { x[i + 1] - x[i] };
    }
    let square = |v: f64| v * v;

    let s1 = 13.0 / 12.0 * square(d[0] - 2.0 * d[1] + d[2])
        + 0.25 * square(d[0] - 4.0 * d[1] + 3.0 * d[2]);
    let s2 = 13.0 / 12.0 * square(d[1] - 2.0 * d[2] + d[3]) + 0.25 * square(d[1] - d[3]);
    let s3 = 13.0 / 12.0 * square(d[2] - 2.0 * d[3] + d[4])
        + 0.25 * square(3.0 * d[2] - 4.0 * d[3] + d[4]);

    let eps = WENO_EPSILON * delta * delta;
    let a1 = 0.1 / (eps + s1);
    let a2 = 0.6 / (eps + s2);
    let a3 = 0.3 / (eps + s3);

    let p1 = (2.0 * d[0] - 7.0 * d[1] + 11.0 * d[2]) / 6.0;
    let p2 = (-d[1] + 5.0 * d[2] + 2.0 * d[3]) / 6.0;
    let p3 = (2.0 * d[2] + 5.0 * d[3] - d[4]) / 6.0;

    (a1 * p1 + a2 * p2 + a3 * p3) / ((a1 + a2 + a3) * delta)
}

/// Upwind derivative data shared by the Lax-Friedrichs family.
#[derive(Clone, Copy, Debug)]
pub struct Derivatives<const D: usize> {
    /// Backward differences, the upwind choice for positive velocity.
    pub grad_pos: [f64; D],
    /// Forward differences, the upwind choice for negative velocity.
    pub grad_neg: [f64; D],
    /// Squared magnitude of the averaged (central) gradient.
    pub central_sq: f64,
    /// Unit normal from the averaged gradient, zero if degenerate.
    pub normal: Vec3,
}

impl<const D: usize> Derivatives<D> {
    /// Evaluate at `lin` with one-sided differences of `order`.
    pub fn at(field: &NarrowBandField<D>, lin: usize, order: usize) -> Self {
        let mut grad_pos = [0.0; D];
        let mut grad_neg = [0.0; D];
        let mut central_sq = 0.0;
        let mut normal = [0.0; 3];
        for axis in 0..D {
            let (diff_pos, diff_neg) = one_sided(field, lin, axis, order);
            grad_pos[axis] = diff_neg;
            grad_neg[axis] = diff_pos;
            let central = (diff_neg + diff_pos) * 0.5;
            normal[axis] = central;
            central_sq += central * central;
        }
        normalize(&mut normal);
        Self {
            grad_pos,
            grad_neg,
            central_sq,
            normal,
        }
    }

    /// Upwinded advection term `Σ vec_i * grad_i`.
    pub fn upwind(&self, vector: Vec3) -> f64 {
        (0..D)
            .map(|w| {
                if vector[w] > 0.0 {
                    vector[w] * self.grad_pos[w]
                } else {
                    vector[w] * self.grad_neg[w]
                }
            })
            .sum()
    }

    /// Half the jump between forward and backward differences on `axis`.
    pub fn half_jump(&self, axis: usize) -> f64 {
        (self.grad_neg[axis] - self.grad_pos[axis]) * 0.5
    }
}

/// Central-difference gradient at `offset` from `lin`.
pub fn central_gradient<const D: usize>(
    field: &NarrowBandField<D>,
    lin: usize,
    offset: [i64; D],
) -> [f64; D] {
    let delta = field.grid().delta();
    let mut out = [0.0; D];
    for (axis, g) in out.iter_mut().enumerate() {
        let neg = field.neighbor_value(lin, add(offset, unit(axis, -1)));
        let center = field.neighbor_value(lin, offset);
        let pos = field.neighbor_value(lin, add(offset, unit(axis, 1)));
        *g = normal_component(neg, center, pos, delta);
    }
    out
}

/// Average of forward and backward differences.
pub fn normal_component(neg: f64, center: f64, pos: f64, delta: f64) -> f64 {
    let diff_pos = (pos - center) / delta;
    let diff_neg = (center - neg) / delta;
    (diff_pos + diff_neg) * 0.5
}

/// Half the difference between forward and backward differences at `lin`,
/// per axis.
///
/// ```text
/// gradient_diff = ((phi[+1] - phi[0]) / delta - (phi[0] - phi[-1]) / delta) / 2
/// ```
pub fn gradient_diff<const D: usize>(field: &NarrowBandField<D>, lin: usize) -> [f64; D] {
    let delta = field.grid().delta();
    let center = field.value(lin);
    let mut out = [0.0; D];
    for (axis, g) in out.iter_mut().enumerate() {
        let neg = field.neighbor_value(lin, unit(axis, -1));
        let pos = field.neighbor_value(lin, unit(axis, 1));
        *g = ((pos - center) / delta - (center - neg) / delta) * 0.5;
    }
    out
}

/// Scale `v` to unit length; a zero vector is left unchanged.
pub fn normalize(v: &mut Vec3) {
    let modulus = v.iter().map(|c| c * c).sum::<f64>().sqrt();
    if modulus > 0.0 {
        v.iter_mut().for_each(|c| *c /= modulus);
    }
}

/// Pad a `D`-component vector to three components.
pub fn pad<const D: usize>(v: [f64; D]) -> Vec3 {
    let mut out = [0.0; 3];
    out[..D.min(3)].copy_from_slice(&v[..D.min(3)]);
    out
}

/// All offsets of the box `[-radius, radius]^D`, axis 0 varying fastest.
pub fn box_offsets<const D: usize>(radius: i64) -> Vec<[i64; D]> {
    let side = (2 * radius + 1) as usize;
    let count = side.pow(D as u32);
    let mut out = Vec::with_capacity(count);
    let mut current = [-radius; D];
    for _ in 0..count {
        out.push(current);
        for c in current.iter_mut() {
            if *c < radius {
                *c += 1;
                break;
            }
            *c = -radius;
        }
    }
    out
}
