//! Hireboard Utils - helpers shared by Hireboard binaries

pub mod config;

pub use config::*;
