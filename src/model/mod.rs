pub mod commission;
pub mod common;
pub mod rule;
pub mod sale;
pub mod vendor;

pub use commission::*;
pub use common::*;
pub use rule::*;
pub use sale::*;
pub use vendor::*;
