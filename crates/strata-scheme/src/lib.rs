//! Spatial discretisation schemes for level-set advection.
//!
//! Each scheme turns the neighbourhood of one narrow-band point into a
//! Hamilton-Jacobi flux and a numerical dissipation term. The engine
//! clones one [`Scheme`] per worker and merges their time-step limits
//! under a lock.
//!
//! | Scheme | Dissipation |
//! |--------|-------------|
//! | [`EngquistOsher`] | none (upwind) |
//! | [`LaxFriedrichs`] | global coefficients from [`global_alphas`] |
//! | [`LocalLocalLaxFriedrichs`] | the point's own coefficients |
//! | [`LocalLaxFriedrichs`] | largest over the `3^D` box, sampled or analytic |
//! | [`StencilLocalLaxFriedrichs`] | velocity sensitivity over the stencil |
//! | [`Weno`] | none (upwind, WENO differences) |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod differences;
pub mod engquist_osher;
pub mod lax_friedrichs;
pub mod local_lax_friedrichs;
pub mod scheme;
pub mod stencil;
pub mod weno;

pub use engquist_osher::EngquistOsher;
pub use lax_friedrichs::{global_alphas, LaxFriedrichs, LocalLocalLaxFriedrichs};
pub use local_lax_friedrichs::LocalLaxFriedrichs;
pub use scheme::{prepare, FieldView, Scheme, SchemeParams, SpatialScheme};
pub use stencil::{
    finalize_stencil_local_lax_friedrichs, prepare_stencil_local_lax_friedrichs,
    StencilLocalLaxFriedrichs,
};
pub use weno::Weno;
