// Core modules: error modeling and PCM sample decoding.
pub mod error;
pub mod samples;
