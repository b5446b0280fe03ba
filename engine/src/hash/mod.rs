pub mod poseidon;

pub use poseidon::*;
