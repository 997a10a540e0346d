pub mod engine;

pub use engine::{compute, compute_for_key, reference_bands, Error};
