pub mod commission;

pub use commission::*;
