//! Application services: the pad operations and the two background loops.

pub mod error;
pub mod flush;
pub mod pad;
pub mod refresh;
pub mod repos;
pub mod tokens;
