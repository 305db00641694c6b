//!
//! globally-available parts
//!
pub use crate::error::{Degeneracy, HmmError, Result};
pub use crate::hmm::{
    FitConfig, GaussianEmission, HmmModel, HmmParams, InitialDistribution, Simulation,
    TransitionModel,
};
pub use crate::linalg::{LinearAlgebraProvider, NativeLinalg};
