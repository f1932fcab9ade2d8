//! Command line front end for the acoustic handshake simulator: a small
//! scenario file format plus canned simulations and per-node result reports.

pub mod cli;
pub mod report;
pub mod scenario;
pub mod simulations;
