//! Core rust implementation of polylp, a modeling layer for linear and
//! mixed-integer (and low-degree quadratic) optimization problems solved
//! through an external HiGHS binary.

pub mod algebra;
pub mod configuration;
pub mod io;
pub mod optimize;
