//! Colored Petri net simulation: places hold colored tokens, transitions
//! move them atomically along colored arcs.

pub mod config;
pub mod net;
pub mod options;
pub mod parser;
pub mod report;
pub mod simulator;
