pub mod sql;
pub mod traits;

pub use sql::*;
pub use traits::*;
