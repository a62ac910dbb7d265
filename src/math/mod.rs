//! Mathematical utilities: polynomial evaluation, grids, and point-set distances.

pub mod chamfer;
pub mod poly;

pub use chamfer::*;
pub use poly::*;
