//! Per-axis boundary handling for grid lookups.

/// How a grid axis resolves indices outside its `[min, max]` range.
///
/// Boundary conditions only affect neighbour *lookups*; points are never
/// stored outside the grid box.
///
/// # Examples
///
/// ```
/// use strata_field::BoundaryCondition;
///
/// let r = BoundaryCondition::Reflective;
/// assert_eq!(r.resolve(-2, 0, 9), 2);
/// assert_eq!(r.resolve(11, 0, 9), 7);
///
/// let p = BoundaryCondition::Periodic;
/// assert_eq!(p.resolve(-1, 0, 9), 9);
/// assert_eq!(p.resolve(10, 0, 9), 0);
///
/// let i = BoundaryCondition::Infinite;
/// assert_eq!(i.resolve(-5, 0, 9), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundaryCondition {
    /// Mirror about the boundary grid point (`min - k` reads `min + k`).
    Reflective,
    /// Wrap to the opposite side (`max + 1` reads `min`).
    Periodic,
    /// Open boundary: the field continues with zero gradient, so lookups
    /// beyond the box read the nearest in-box cell.
    #[default]
    Infinite,
}

impl BoundaryCondition {
    /// Resolve `val` into `[min, max]` under this boundary condition.
    ///
    /// `min <= max` is required.
    pub fn resolve(self, val: i64, min: i64, max: i64) -> i64 {
        if val >= min && val <= max {
            return val;
        }
        let span = max - min;
        match self {
            Self::Infinite => val.clamp(min, max),
            Self::Periodic => min + (val - min).rem_euclid(span + 1),
            Self::Reflective => {
                if span == 0 {
                    return min;
                }
                let period = 2 * span;
                let r = (val - min).rem_euclid(period);
                min + if r <= span { r } else { period - r }
            }
        }
    }
}
