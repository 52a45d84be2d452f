//! CLI command implementations.

pub mod common;
pub mod ir;
pub mod preset;
pub mod rt;
pub mod rta;
pub mod sim;
pub mod sweep;
