//!
//! Continuous-emission hidden Markov model with Gaussian emissions
//!
//! * `hmm`: model, forward/backward/posterior passes, Baum-Welch training and sampling
//! * `linalg`: linear algebra injected into the model
//! * `error`: error types
//!
pub mod error;
pub mod hmm;
pub mod linalg;
pub mod prelude;
pub mod utils;
