//! Traffic Simulation Library
//!
//! A concurrent road traffic engine: cities spawn vehicles on timers, roads
//! move them along, and the whole network can be edited while it runs.

pub mod simulation;
