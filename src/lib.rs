// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;

pub mod aggregate;
pub mod csv;
pub mod extract;
pub mod fetch;
pub mod file;
pub mod gui;
pub mod period;
pub mod pipeline;
pub mod progress;
pub mod roster;
pub mod sink;
pub mod store;
pub mod table;
